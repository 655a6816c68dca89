mod envelope;
mod router;
mod signal_event;

pub use envelope::{EnvelopeKind, EnvelopePayload, SignalingEnvelope};
pub use router::{decode, decode_text, encode, encode_text};
pub use signal_event::{OutboundSignal, RemoteCandidate, SignalEvent};
