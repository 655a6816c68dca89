use crate::codec::{CandidateError, CandidatePayload, IceCandidateRecord};
use crate::model::ConnectionId;
use serde_json::Value;

/// Inbound relay message, flattened and addressed by connection id.
#[derive(Debug, Clone, PartialEq)]
pub enum SignalEvent {
    Connect {
        connection_id: ConnectionId,
        polite: bool,
    },
    Disconnect {
        connection_id: ConnectionId,
    },
    Offer {
        connection_id: ConnectionId,
        sdp: String,
        polite: bool,
    },
    Answer {
        connection_id: ConnectionId,
        sdp: String,
    },
    Candidate(RemoteCandidate),
    Error {
        message: String,
    },
    /// The envelope parsed but its kind is unknown.
    Unrecognized {
        kind: String,
    },
    /// The frame was not a usable envelope.
    DecodeError {
        reason: String,
    },
}

impl SignalEvent {
    pub fn connection_id(&self) -> Option<&ConnectionId> {
        match self {
            SignalEvent::Connect { connection_id, .. }
            | SignalEvent::Disconnect { connection_id }
            | SignalEvent::Offer { connection_id, .. }
            | SignalEvent::Answer { connection_id, .. } => Some(connection_id),
            SignalEvent::Candidate(candidate) => Some(&candidate.connection_id),
            _ => None,
        }
    }
}

/// A remote candidate exactly as the relay delivered it. Parsing is deferred
/// until the candidate is applied, so a bad one only costs itself.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteCandidate {
    pub connection_id: ConnectionId,
    pub candidate: CandidatePayload,
    pub sdp_mid: Option<Value>,
    pub sdp_m_line_index: Option<Value>,
}

impl RemoteCandidate {
    pub fn parse(&self) -> Result<IceCandidateRecord, CandidateError> {
        IceCandidateRecord::from_payload(
            &self.candidate,
            self.sdp_mid.as_ref(),
            self.sdp_m_line_index.as_ref(),
        )
    }

    pub fn is_end_of_candidates(&self) -> bool {
        self.candidate.is_end_of_candidates()
    }
}

/// Message this client sends to the relay.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundSignal {
    Connect {
        connection_id: ConnectionId,
    },
    Disconnect {
        connection_id: ConnectionId,
    },
    Offer {
        connection_id: ConnectionId,
        sdp: String,
    },
    Answer {
        connection_id: ConnectionId,
        sdp: String,
    },
    Candidate {
        connection_id: ConnectionId,
        candidate: IceCandidateRecord,
    },
}

impl OutboundSignal {
    pub fn connection_id(&self) -> &ConnectionId {
        match self {
            OutboundSignal::Connect { connection_id }
            | OutboundSignal::Disconnect { connection_id }
            | OutboundSignal::Offer { connection_id, .. }
            | OutboundSignal::Answer { connection_id, .. }
            | OutboundSignal::Candidate { connection_id, .. } => connection_id,
        }
    }
}
