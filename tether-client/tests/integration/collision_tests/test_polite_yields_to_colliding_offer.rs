use tether_client::SessionCommand;
use tether_core::{SdpKind, SessionDescription};

use crate::integration::{create_test_session, init_tracing};
use crate::utils::{EngineCall, MOCK_ANSWER_SDP, MockEngine, wait_for_answer};

const REMOTE_OFFER: &str = "v=0\r\no=- 7 7 IN IP4 10.0.0.3\r\n";

#[tokio::test]
async fn test_polite_yields_to_colliding_offer() {
    init_tracing();

    let mut session = create_test_session(true, MockEngine::with_local_offer());

    session
        .commands
        .send(SessionCommand::RemoteOffer {
            sdp: REMOTE_OFFER.to_owned(),
        })
        .await
        .expect("Failed to send offer");

    let answer = wait_for_answer(&mut session.signal_rx)
        .await
        .expect("Polite side did not answer");
    assert_eq!(answer, MOCK_ANSWER_SDP);

    let (engine, _, _) = session.finish().await;

    assert_eq!(engine.set_remote_count(), 1);
    assert_eq!(engine.count(|c| matches!(c, EngineCall::CreateAnswer)), 1);
    assert_eq!(
        engine.count(|c| matches!(c, EngineCall::SetLocal(d) if d.kind == SdpKind::Answer)),
        1
    );
    assert!(
        engine
            .calls()
            .contains(&EngineCall::SetRemote(SessionDescription::offer(REMOTE_OFFER)))
    );
}
