use crate::codec::CandidatePayload;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Envelope kinds the relay understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeKind {
    Connect,
    Disconnect,
    Offer,
    Answer,
    Candidate,
    Error,
}

impl EnvelopeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EnvelopeKind::Connect => "connect",
            EnvelopeKind::Disconnect => "disconnect",
            EnvelopeKind::Offer => "offer",
            EnvelopeKind::Answer => "answer",
            EnvelopeKind::Candidate => "candidate",
            EnvelopeKind::Error => "error",
        }
    }

    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            "connect" => Some(EnvelopeKind::Connect),
            "disconnect" => Some(EnvelopeKind::Disconnect),
            "offer" => Some(EnvelopeKind::Offer),
            "answer" => Some(EnvelopeKind::Answer),
            "candidate" => Some(EnvelopeKind::Candidate),
            "error" => Some(EnvelopeKind::Error),
            _ => None,
        }
    }
}

/// One relay message as it appears on the wire.
///
/// `kind` stays a plain string so that envelopes of unknown kinds still
/// deserialize and can be reported.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalingEnvelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polite: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<EnvelopePayload>,
}

impl SignalingEnvelope {
    pub fn new(kind: EnvelopeKind) -> Self {
        Self {
            kind: kind.as_str().to_owned(),
            ..Default::default()
        }
    }

    pub fn kind(&self) -> Option<EnvelopeKind> {
        EnvelopeKind::parse(&self.kind)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polite: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate: Option<CandidatePayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdp_mid: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdp_m_line_index: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_id: Option<String>,
}
