use crate::codec::CandidateError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::fmt::Write;
use std::str::FromStr;

const CANDIDATE_PREFIX: &str = "candidate:";
const DEFAULT_TYPE: &str = "host";
const DEFAULT_PROTOCOL: &str = "udp";
const MIN_FIELDS: usize = 6;

/// One ICE candidate, parsed from the `candidate:` attribute text or built
/// from structured relay fields.
///
/// `sdp_mid` and `sdp_m_line_index` travel next to the candidate text, never
/// inside it, so `parse` leaves them empty and `serialize` ignores them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IceCandidateRecord {
    pub foundation: String,
    pub component: u16,
    pub protocol: String,
    pub priority: u32,
    pub ip: String,
    pub port: u16,
    pub typ: String,
    pub related_address: Option<String>,
    pub related_port: Option<u16>,
    pub tcp_type: Option<String>,
    pub sdp_mid: Option<String>,
    pub sdp_m_line_index: Option<u16>,
}

impl IceCandidateRecord {
    /// Parses `[candidate:]<foundation> <component> <protocol> <priority> <ip> <port> [typ <type>] ...`.
    ///
    /// The type is found by searching for the `typ` marker rather than by
    /// position, and defaults to `host` when the marker is missing or has no
    /// value after it.
    pub fn parse(candidate: &str) -> Result<Self, CandidateError> {
        let body = candidate.trim();
        let body = body.strip_prefix(CANDIDATE_PREFIX).unwrap_or(body);
        let tokens: Vec<&str> = body.split_whitespace().collect();

        if tokens.len() < MIN_FIELDS {
            return Err(CandidateError::TooFewFields(tokens.len()));
        }

        // Markers only count after the six positional fields.
        let extensions = &tokens[MIN_FIELDS..];
        let related_port = match marker_value(extensions, "rport") {
            Some(port) => Some(parse_number(port, "rport")?),
            None => None,
        };

        Ok(Self {
            foundation: tokens[0].to_owned(),
            component: parse_number(tokens[1], "component")?,
            protocol: tokens[2].to_owned(),
            priority: parse_number(tokens[3], "priority")?,
            ip: tokens[4].to_owned(),
            port: parse_number(tokens[5], "port")?,
            typ: marker_value(extensions, "typ").unwrap_or(DEFAULT_TYPE).to_owned(),
            related_address: marker_value(extensions, "raddr").map(str::to_owned),
            related_port,
            tcp_type: marker_value(extensions, "tcptype").map(str::to_owned),
            sdp_mid: None,
            sdp_m_line_index: None,
        })
    }

    /// Builds a record from whatever shape the relay put in `data.candidate`,
    /// applying the neighbouring `sdpMid` / `sdpMLineIndex` values.
    pub fn from_payload(
        payload: &CandidatePayload,
        sdp_mid: Option<&Value>,
        sdp_m_line_index: Option<&Value>,
    ) -> Result<Self, CandidateError> {
        let mut sdp_mid = sdp_mid.and_then(coerce_sdp_mid);
        let mut sdp_m_line_index = match sdp_m_line_index {
            Some(value) => coerce_sdp_m_line_index(value)?,
            None => None,
        };

        let mut record = match payload {
            CandidatePayload::Text(text) if text.trim_start().starts_with('{') => {
                let init: CandidateInit = serde_json::from_str(text)
                    .map_err(|e| CandidateError::InvalidInit(e.to_string()))?;
                if let Some(mid) = init.sdp_mid.as_ref().and_then(coerce_sdp_mid) {
                    sdp_mid = Some(mid);
                }
                if let Some(index) = init.sdp_m_line_index.as_ref() {
                    sdp_m_line_index = coerce_sdp_m_line_index(index)?.or(sdp_m_line_index);
                }
                Self::parse(&init.candidate)?
            }
            CandidatePayload::Text(text) => Self::parse(text)?,
            CandidatePayload::Fields(fields) => fields.to_record()?,
        };

        record.sdp_mid = sdp_mid;
        record.sdp_m_line_index = sdp_m_line_index;
        Ok(record)
    }

    pub fn with_sdp_mid(mut self, sdp_mid: Option<String>) -> Self {
        self.sdp_mid = sdp_mid;
        self
    }

    pub fn with_sdp_m_line_index(mut self, index: Option<u16>) -> Self {
        self.sdp_m_line_index = index;
        self
    }

    /// Renders the attribute text, always with the `candidate:` prefix and an
    /// explicit `typ` marker.
    pub fn serialize(&self) -> String {
        let mut out = format!(
            "{}{} {} {} {} {} {} typ {}",
            CANDIDATE_PREFIX,
            self.foundation,
            self.component,
            self.protocol,
            self.priority,
            self.ip,
            self.port,
            self.typ
        );
        if let Some(addr) = &self.related_address {
            let _ = write!(out, " raddr {addr}");
        }
        if let Some(port) = self.related_port {
            let _ = write!(out, " rport {port}");
        }
        if let Some(tcp_type) = &self.tcp_type {
            let _ = write!(out, " tcptype {tcp_type}");
        }
        out
    }
}

impl fmt::Display for IceCandidateRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}

impl FromStr for IceCandidateRecord {
    type Err = CandidateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// `data.candidate` as the relay sends it: attribute text (possibly a JSON
/// encoded `RTCIceCandidateInit`), or fields that were already split out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CandidatePayload {
    Text(String),
    Fields(CandidateFields),
}

impl CandidatePayload {
    /// An empty candidate string marks the end of the remote candidates.
    pub fn is_end_of_candidates(&self) -> bool {
        matches!(self, CandidatePayload::Text(text) if text.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateFields {
    pub foundation: Option<String>,
    pub component: Option<u16>,
    pub protocol: Option<String>,
    pub priority: Option<u32>,
    pub ip: Option<String>,
    pub port: Option<u16>,
    #[serde(rename = "type")]
    pub typ: Option<String>,
}

impl CandidateFields {
    fn to_record(&self) -> Result<IceCandidateRecord, CandidateError> {
        Ok(IceCandidateRecord {
            foundation: self
                .foundation
                .clone()
                .ok_or(CandidateError::MissingField("foundation"))?,
            component: self.component.unwrap_or(1),
            protocol: self
                .protocol
                .clone()
                .unwrap_or_else(|| DEFAULT_PROTOCOL.to_owned()),
            priority: self.priority.unwrap_or(0),
            ip: self.ip.clone().ok_or(CandidateError::MissingField("ip"))?,
            port: self.port.ok_or(CandidateError::MissingField("port"))?,
            typ: self.typ.clone().unwrap_or_else(|| DEFAULT_TYPE.to_owned()),
            related_address: None,
            related_port: None,
            tcp_type: None,
            sdp_mid: None,
            sdp_m_line_index: None,
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CandidateInit {
    candidate: String,
    #[serde(default)]
    sdp_mid: Option<Value>,
    #[serde(default)]
    sdp_m_line_index: Option<Value>,
}

/// `sdpMid` may arrive as a string, a number or null; non-strings keep their
/// JSON text form.
pub fn coerce_sdp_mid(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(mid) => Some(mid.clone()),
        other => Some(other.to_string()),
    }
}

/// `sdpMLineIndex` may arrive as a number or a numeric string.
pub fn coerce_sdp_m_line_index(value: &Value) -> Result<Option<u16>, CandidateError> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_u64()
            .and_then(|n| u16::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| CandidateError::InvalidLineIndex(n.to_string())),
        Value::String(s) => s
            .trim()
            .parse::<u16>()
            .map(Some)
            .map_err(|_| CandidateError::InvalidLineIndex(s.clone())),
        other => Err(CandidateError::InvalidLineIndex(other.to_string())),
    }
}

fn marker_value<'a>(tokens: &[&'a str], marker: &str) -> Option<&'a str> {
    let index = tokens.iter().position(|token| *token == marker)?;
    tokens.get(index + 1).copied()
}

fn parse_number<T: FromStr>(value: &str, field: &'static str) -> Result<T, CandidateError> {
    value.parse().map_err(|_| CandidateError::InvalidNumber {
        field,
        value: value.to_owned(),
    })
}
