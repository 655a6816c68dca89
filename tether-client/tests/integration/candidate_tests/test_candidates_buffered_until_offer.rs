use tether_client::SessionCommand;

use crate::integration::{create_test_session, init_tracing};
use crate::utils::{EngineCall, MockEngine, remote_candidate, wait_for_answer};

#[tokio::test]
async fn test_candidates_buffered_until_offer() {
    init_tracing();

    let mut session = create_test_session(true, MockEngine::new());
    let id = session.connection_id.as_str().to_owned();

    for port in [5000, 5001, 5002] {
        session
            .commands
            .send(SessionCommand::RemoteCandidate(remote_candidate(&id, port)))
            .await
            .expect("Failed to send candidate");
    }

    session
        .commands
        .send(SessionCommand::RemoteOffer {
            sdp: "v=0\r\n".to_owned(),
        })
        .await
        .expect("Failed to send offer");

    wait_for_answer(&mut session.signal_rx)
        .await
        .expect("No answer sent");

    let (engine, _, _) = session.finish().await;
    let calls = engine.calls();

    // Flushed in receipt order, after the offer is applied and before the
    // answer is created.
    assert!(matches!(calls[0], EngineCall::SetRemote(_)));
    let ports: Vec<u16> = calls[1..4]
        .iter()
        .map(|call| match call {
            EngineCall::AddCandidate(candidate) => candidate.port,
            other => panic!("expected a candidate, got {other:?}"),
        })
        .collect();
    assert_eq!(ports, vec![5000, 5001, 5002]);
    assert_eq!(calls[4], EngineCall::CreateAnswer);

    let first = &engine.added_candidates()[0];
    assert_eq!(first.sdp_mid.as_deref(), Some("0"));
    assert_eq!(first.sdp_m_line_index, Some(0));
}
