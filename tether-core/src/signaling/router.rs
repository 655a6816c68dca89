use crate::model::ConnectionId;
use crate::signaling::{
    EnvelopeKind, EnvelopePayload, OutboundSignal, RemoteCandidate, SignalEvent, SignalingEnvelope,
};
use serde_json::Value;

/// Decodes one text frame. Framing problems come back as
/// [`SignalEvent::DecodeError`] instead of an `Err`, so a bad frame never
/// stops the reader.
pub fn decode_text(text: &str) -> SignalEvent {
    match serde_json::from_str::<SignalingEnvelope>(text) {
        Ok(envelope) => decode(&envelope),
        Err(e) => SignalEvent::DecodeError {
            reason: e.to_string(),
        },
    }
}

pub fn decode(envelope: &SignalingEnvelope) -> SignalEvent {
    let Some(kind) = envelope.kind() else {
        return SignalEvent::Unrecognized {
            kind: envelope.kind.clone(),
        };
    };

    let data = envelope.data.as_ref();

    match kind {
        EnvelopeKind::Connect => {
            let Some(connection_id) = connection_of(envelope) else {
                return missing(kind, "connectionId");
            };
            let polite = envelope
                .polite
                .or_else(|| data.and_then(|d| d.polite))
                .unwrap_or(false);
            SignalEvent::Connect {
                connection_id,
                polite,
            }
        }

        EnvelopeKind::Disconnect => match connection_of(envelope) {
            Some(connection_id) => SignalEvent::Disconnect { connection_id },
            None => missing(kind, "connectionId"),
        },

        EnvelopeKind::Offer => {
            let Some(connection_id) = sender_of(envelope) else {
                return missing(kind, "from");
            };
            let Some(sdp) = data.and_then(|d| d.sdp.clone()) else {
                return missing(kind, "data.sdp");
            };
            SignalEvent::Offer {
                connection_id,
                sdp,
                polite: data.and_then(|d| d.polite).unwrap_or(false),
            }
        }

        EnvelopeKind::Answer => {
            let Some(connection_id) = sender_of(envelope) else {
                return missing(kind, "from");
            };
            let Some(sdp) = data.and_then(|d| d.sdp.clone()) else {
                return missing(kind, "data.sdp");
            };
            SignalEvent::Answer { connection_id, sdp }
        }

        EnvelopeKind::Candidate => {
            let Some(connection_id) = sender_of(envelope) else {
                return missing(kind, "from");
            };
            let Some(data) = data else {
                return missing(kind, "data");
            };
            let Some(candidate) = data.candidate.clone() else {
                return missing(kind, "data.candidate");
            };
            SignalEvent::Candidate(RemoteCandidate {
                connection_id,
                candidate,
                sdp_mid: data.sdp_mid.clone(),
                sdp_m_line_index: data.sdp_m_line_index.clone(),
            })
        }

        EnvelopeKind::Error => SignalEvent::Error {
            message: envelope
                .message
                .clone()
                .unwrap_or_else(|| "unspecified relay error".to_owned()),
        },
    }
}

pub fn encode(signal: &OutboundSignal) -> SignalingEnvelope {
    match signal {
        OutboundSignal::Connect { connection_id } => SignalingEnvelope {
            connection_id: Some(connection_id.to_string()),
            ..SignalingEnvelope::new(EnvelopeKind::Connect)
        },

        OutboundSignal::Disconnect { connection_id } => SignalingEnvelope {
            connection_id: Some(connection_id.to_string()),
            ..SignalingEnvelope::new(EnvelopeKind::Disconnect)
        },

        OutboundSignal::Offer { connection_id, sdp } => SignalingEnvelope {
            from: Some(connection_id.to_string()),
            data: Some(EnvelopePayload {
                sdp: Some(sdp.clone()),
                connection_id: Some(connection_id.to_string()),
                ..Default::default()
            }),
            ..SignalingEnvelope::new(EnvelopeKind::Offer)
        },

        OutboundSignal::Answer { connection_id, sdp } => SignalingEnvelope {
            from: Some(connection_id.to_string()),
            data: Some(EnvelopePayload {
                sdp: Some(sdp.clone()),
                connection_id: Some(connection_id.to_string()),
                ..Default::default()
            }),
            ..SignalingEnvelope::new(EnvelopeKind::Answer)
        },

        OutboundSignal::Candidate {
            connection_id,
            candidate,
        } => SignalingEnvelope {
            from: Some(connection_id.to_string()),
            data: Some(EnvelopePayload {
                candidate: Some(crate::codec::CandidatePayload::Text(candidate.serialize())),
                sdp_mid: candidate.sdp_mid.clone().map(Value::String),
                sdp_m_line_index: candidate.sdp_m_line_index.map(Value::from),
                connection_id: Some(connection_id.to_string()),
                ..Default::default()
            }),
            ..SignalingEnvelope::new(EnvelopeKind::Candidate)
        },
    }
}

pub fn encode_text(signal: &OutboundSignal) -> Result<String, serde_json::Error> {
    serde_json::to_string(&encode(signal))
}

fn sender_of(envelope: &SignalingEnvelope) -> Option<ConnectionId> {
    non_empty(envelope.from.as_deref())
        .or_else(|| non_empty(envelope.connection_id.as_deref()))
        .or_else(|| {
            non_empty(
                envelope
                    .data
                    .as_ref()
                    .and_then(|d| d.connection_id.as_deref()),
            )
        })
}

fn connection_of(envelope: &SignalingEnvelope) -> Option<ConnectionId> {
    non_empty(envelope.connection_id.as_deref()).or_else(|| sender_of(envelope))
}

fn non_empty(id: Option<&str>) -> Option<ConnectionId> {
    id.filter(|id| !id.is_empty()).map(ConnectionId::from)
}

fn missing(kind: EnvelopeKind, field: &str) -> SignalEvent {
    SignalEvent::DecodeError {
        reason: format!("{} envelope without {}", kind.as_str(), field),
    }
}
