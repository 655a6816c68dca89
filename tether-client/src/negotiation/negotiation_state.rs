use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationState {
    Stable,
    MakingOffer,
    /// Terminal. Nothing is processed after this.
    Closed,
}

impl fmt::Display for NegotiationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NegotiationState::Stable => f.write_str("stable"),
            NegotiationState::MakingOffer => f.write_str("making-offer"),
            NegotiationState::Closed => f.write_str("closed"),
        }
    }
}

/// Holds the state at `MakingOffer` for as long as it lives.
///
/// Dropping the guard (normal return, `?`, or a cancelled future) puts the
/// state back to `Stable`, unless the session was closed in the meantime.
pub struct MakingOfferGuard<'a> {
    state: &'a mut NegotiationState,
}

impl<'a> MakingOfferGuard<'a> {
    /// Returns `None` unless the state is `Stable`.
    pub fn enter(state: &'a mut NegotiationState) -> Option<Self> {
        if *state != NegotiationState::Stable {
            return None;
        }
        *state = NegotiationState::MakingOffer;
        Some(Self { state })
    }
}

impl Drop for MakingOfferGuard<'_> {
    fn drop(&mut self) {
        if *self.state == NegotiationState::MakingOffer {
            *self.state = NegotiationState::Stable;
        }
    }
}
