use anyhow::Result;
use async_trait::async_trait;
use tether_core::{IceCandidateRecord, SessionDescription, SignalingState};

/// The peer connection as the negotiator sees it.
///
/// Implementations report everything else (candidates, state changes,
/// frames) through the `TransportEvent` channel they were created with.
#[async_trait]
pub trait TransportEngine: Send + Sync {
    async fn create_offer(&self) -> Result<SessionDescription>;

    async fn create_answer(&self) -> Result<SessionDescription>;

    async fn set_local_description(&self, description: SessionDescription) -> Result<()>;

    /// Applying an offer while a local offer is pending rolls the local one
    /// back first.
    async fn set_remote_description(&self, description: SessionDescription) -> Result<()>;

    async fn add_ice_candidate(&self, candidate: IceCandidateRecord) -> Result<()>;

    fn signaling_state(&self) -> SignalingState;

    async fn close(&self) -> Result<()>;
}
