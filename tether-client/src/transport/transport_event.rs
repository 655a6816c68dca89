use crate::media::MediaFrame;
use bytes::Bytes;
use tether_core::{ConnectionState, IceCandidateRecord};

/// Events an engine pushes to the session that owns it, in the order the
/// engine emitted them.
#[derive(Debug)]
pub enum TransportEvent {
    /// The engine wants a new offer.
    NegotiationNeeded,

    /// A gathered local candidate; `None` once gathering is complete.
    LocalCandidate(Option<IceCandidateRecord>),

    ConnectionStateChanged(ConnectionState),

    /// One encoded frame from a remote track.
    Frame(MediaFrame),

    /// A data channel with this label is open.
    DataChannelOpen(String),

    /// A message arrived on the named data channel.
    ChannelMessage(String, Bytes),
}
