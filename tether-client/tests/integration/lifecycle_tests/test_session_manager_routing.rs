use std::sync::Arc;
use std::time::Duration;

use tether_client::{SessionManager, SessionStats};
use tether_core::{CodecPreference, ConnectionId, SignalEvent};

use crate::integration::init_tracing;
use crate::utils::{
    EngineCall, MockEngineFactory, MockSignalingOutput, RecordingObserver, SIGNAL_TIMEOUT_MS,
    wait_for_answer,
};

fn create_manager() -> (
    SessionManager,
    MockEngineFactory,
    MockSignalingOutput,
    tokio::sync::mpsc::UnboundedReceiver<tether_core::OutboundSignal>,
    RecordingObserver,
) {
    let factory = MockEngineFactory::new();
    let (signaling, signal_rx) = MockSignalingOutput::new();
    let observer = RecordingObserver::new();

    let manager = SessionManager::new(
        Arc::new(factory.clone()),
        Arc::new(signaling.clone()),
        Arc::new(observer.clone()),
        CodecPreference::h264(),
    );

    (manager, factory, signaling, signal_rx, observer)
}

async fn wait_for_closed(observer: &RecordingObserver, connection_id: &ConnectionId, count: usize) {
    let deadline = tokio::time::Instant::now() + Duration::from_millis(SIGNAL_TIMEOUT_MS);
    while observer.closed_count(connection_id).await < count {
        assert!(
            tokio::time::Instant::now() < deadline,
            "session {connection_id} did not close"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn test_disconnect_closes_session() {
    init_tracing();

    let (manager, factory, _signaling, _signal_rx, observer) = create_manager();
    let mut stats = manager.watch_stats();
    let connection_id = ConnectionId::from("peer-a");

    manager
        .handle_signal(SignalEvent::Connect {
            connection_id: connection_id.clone(),
            polite: false,
        })
        .await;
    assert!(manager.contains(&connection_id));
    assert_eq!(factory.created(), vec![connection_id.clone()]);

    manager
        .handle_signal(SignalEvent::Disconnect {
            connection_id: connection_id.clone(),
        })
        .await;
    assert!(manager.is_empty());

    wait_for_closed(&observer, &connection_id, 1).await;
    let engine = factory.engine(&connection_id).expect("engine was created");
    assert_eq!(engine.count(|c| matches!(c, EngineCall::Close)), 1);

    assert_eq!(
        *stats.borrow_and_update(),
        SessionStats {
            active: 0,
            opened: 1
        }
    );
}

#[tokio::test]
async fn test_duplicate_connect_replaces_session() {
    init_tracing();

    let (manager, factory, _signaling, _signal_rx, observer) = create_manager();
    let connection_id = ConnectionId::from("peer-b");
    let connect = SignalEvent::Connect {
        connection_id: connection_id.clone(),
        polite: true,
    };

    manager.handle_signal(connect.clone()).await;
    let first = factory.engine(&connection_id).expect("first engine");

    manager.handle_signal(connect).await;
    let second = factory.engine(&connection_id).expect("second engine");

    wait_for_closed(&observer, &connection_id, 1).await;
    assert_eq!(first.count(|c| matches!(c, EngineCall::Close)), 1);

    // The replaced session's exit must not unregister its successor.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(factory.created().len(), 2);
    assert_eq!(manager.len(), 1);
    assert!(manager.contains(&connection_id));
    assert!(second.calls().is_empty());

    manager.close_all().await;
    wait_for_closed(&observer, &connection_id, 2).await;
    assert_eq!(second.calls(), vec![EngineCall::Close]);
}

#[tokio::test]
async fn test_offer_opens_unknown_session() {
    init_tracing();

    let (manager, factory, signaling, mut signal_rx, _observer) = create_manager();
    let connection_id = ConnectionId::from("peer-c");

    manager
        .handle_signal(SignalEvent::Offer {
            connection_id: connection_id.clone(),
            sdp: "v=0\r\n".to_owned(),
            polite: true,
        })
        .await;

    wait_for_answer(&mut signal_rx).await.expect("No answer sent");
    assert_eq!(factory.created(), vec![connection_id.clone()]);
    assert!(signaling.get_answer_for(&connection_id).await.is_some());

    manager.close_all().await;
}

#[tokio::test]
async fn test_signals_for_unknown_connection_dropped() {
    init_tracing();

    let (manager, factory, _signaling, _signal_rx, _observer) = create_manager();

    manager
        .handle_signal(SignalEvent::Answer {
            connection_id: ConnectionId::from("nobody"),
            sdp: "v=0\r\n".to_owned(),
        })
        .await;
    manager
        .handle_signal(SignalEvent::Disconnect {
            connection_id: ConnectionId::from("nobody"),
        })
        .await;

    assert!(manager.is_empty());
    assert!(factory.created().is_empty());
}
