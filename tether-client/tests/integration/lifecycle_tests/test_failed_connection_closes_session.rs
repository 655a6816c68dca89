use std::time::Duration;

use tether_client::{SessionCommand, TransportEvent};
use tether_core::{ConnectionState, SessionDescription};

use crate::integration::{create_test_session, init_tracing};
use crate::utils::{EngineCall, MockEngine, ObservedEvent};

#[tokio::test]
async fn test_failed_connection_closes_session() {
    init_tracing();

    let session = create_test_session(false, MockEngine::new());

    for state in [ConnectionState::Connecting, ConnectionState::Failed] {
        session
            .transport
            .send(TransportEvent::ConnectionStateChanged(state))
            .await
            .expect("Failed to send state change");
    }

    tokio::time::timeout(Duration::from_secs(2), session.task)
        .await
        .expect("Session did not stop")
        .expect("Session task panicked");

    assert_eq!(session.engine.count(|c| matches!(c, EngineCall::Close)), 1);
    assert_eq!(session.observer.closed_count(&session.connection_id).await, 1);

    let states: Vec<ConnectionState> = session
        .observer
        .get_events()
        .await
        .into_iter()
        .filter_map(|e| match e {
            ObservedEvent::StateChange { state, .. } => Some(state),
            _ => None,
        })
        .collect();
    assert_eq!(
        states,
        vec![ConnectionState::Connecting, ConnectionState::Failed]
    );

    // Nothing is accepted once the session is gone.
    let late = session
        .commands
        .send(SessionCommand::RemoteAnswer {
            sdp: "v=0\r\n".to_owned(),
        })
        .await;
    assert!(late.is_err());
    assert!(
        !session
            .engine
            .calls()
            .contains(&EngineCall::SetRemote(SessionDescription::answer("v=0\r\n")))
    );
}

#[tokio::test]
async fn test_dropped_command_channel_closes_session() {
    init_tracing();

    let session = create_test_session(true, MockEngine::new());
    drop(session.commands);

    tokio::time::timeout(Duration::from_secs(2), session.task)
        .await
        .expect("Session did not stop")
        .expect("Session task panicked");

    assert_eq!(session.engine.calls(), vec![EngineCall::Close]);
    assert_eq!(session.observer.closed_count(&session.connection_id).await, 1);
}
