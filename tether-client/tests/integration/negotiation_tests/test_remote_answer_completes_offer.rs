use tether_client::{SessionCommand, TransportEngine, TransportEvent};
use tether_core::{SessionDescription, SignalingState};

use crate::integration::{create_test_session, init_tracing};
use crate::utils::{EngineCall, MOCK_ANSWER_SDP, MockEngine, SIGNAL_TIMEOUT_MS, wait_for_offer, wait_until};

#[tokio::test]
async fn test_remote_answer_completes_offer() {
    init_tracing();

    let mut session = create_test_session(false, MockEngine::new());

    session
        .transport
        .send(TransportEvent::NegotiationNeeded)
        .await
        .expect("Failed to send negotiation event");
    wait_for_offer(&mut session.signal_rx)
        .await
        .expect("No offer sent");

    session
        .commands
        .send(SessionCommand::RemoteAnswer {
            sdp: MOCK_ANSWER_SDP.to_owned(),
        })
        .await
        .expect("Failed to send answer");

    let engine = session.engine.clone();
    assert!(wait_until(SIGNAL_TIMEOUT_MS, || engine.set_remote_count() == 1).await);
    assert_eq!(engine.signaling_state(), SignalingState::Stable);

    // Back in stable, the next negotiation produces a fresh offer.
    session
        .transport
        .send(TransportEvent::NegotiationNeeded)
        .await
        .expect("Failed to send negotiation event");
    wait_for_offer(&mut session.signal_rx)
        .await
        .expect("No second offer sent");

    let connection_id = session.connection_id.clone();
    let (engine, signaling, _) = session.finish().await;
    assert_eq!(signaling.get_offers_for(&connection_id).await.len(), 2);
    assert!(
        engine
            .calls()
            .contains(&EngineCall::SetRemote(SessionDescription::answer(MOCK_ANSWER_SDP)))
    );
}
