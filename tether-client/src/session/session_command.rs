use tether_core::RemoteCandidate;

/// Commands routed to a session from the signaling dispatcher.
#[derive(Debug)]
pub enum SessionCommand {
    /// The remote side sent an SDP offer.
    RemoteOffer { sdp: String },

    /// The remote side answered our offer.
    RemoteAnswer { sdp: String },

    /// Trickled remote ICE candidate, still unparsed.
    RemoteCandidate(RemoteCandidate),

    /// Start a new offer, as if the engine had asked for one.
    Negotiate,

    /// The relay reported the connection gone, or the client is shutting down.
    Close,
}
