use tether_client::{TransportEngine, TransportEvent};
use tether_core::{SessionDescription, SignalingState};

use crate::integration::{create_test_session, init_tracing};
use crate::utils::{EngineCall, MOCK_OFFER_SDP, MockEngine, wait_for_offer};

#[tokio::test]
async fn test_negotiation_needed_sends_offer() {
    init_tracing();

    let mut session = create_test_session(false, MockEngine::new());

    session
        .transport
        .send(TransportEvent::NegotiationNeeded)
        .await
        .expect("Failed to send negotiation event");

    let offer = wait_for_offer(&mut session.signal_rx)
        .await
        .expect("No offer sent");

    // H.264 and its retransmission types lead the video line
    assert!(
        offer.contains("m=video 9 UDP/TLS/RTP/SAVPF 120 109 96 97"),
        "unexpected offer: {offer}"
    );
    assert_eq!(
        session.engine.signaling_state(),
        SignalingState::HaveLocalOffer
    );

    let (engine, _, _) = session.finish().await;
    let calls = engine.calls();
    assert_eq!(calls[0], EngineCall::CreateOffer);
    // The engine keeps the offer it generated; only the sent copy is reordered.
    assert_eq!(
        calls[1],
        EngineCall::SetLocal(SessionDescription::offer(MOCK_OFFER_SDP))
    );
    assert_ne!(offer, MOCK_OFFER_SDP);
}
