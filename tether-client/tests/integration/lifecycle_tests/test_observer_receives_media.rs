use bytes::Bytes;
use tether_client::{MediaFrame, MediaKind, TransportEvent};

use crate::integration::{create_test_session, init_tracing};
use crate::utils::{MockEngine, ObservedEvent};

#[tokio::test]
async fn test_observer_receives_media() {
    init_tracing();

    let session = create_test_session(false, MockEngine::new());

    let frame = MediaFrame {
        kind: MediaKind::Video,
        payload_type: 120,
        timestamp: 90_000,
        data: Bytes::from_static(&[0, 0, 0, 1, 0x65]),
    };

    let events = [
        TransportEvent::DataChannelOpen("input".to_owned()),
        TransportEvent::Frame(frame.clone()),
        TransportEvent::ChannelMessage("input".to_owned(), Bytes::from_static(b"ping")),
    ];
    for event in events {
        session
            .transport
            .send(event)
            .await
            .expect("Failed to send transport event");
    }

    assert!(session.observer.wait_for_events(3, 2000).await);

    let recorded = session.observer.get_events().await;
    assert!(matches!(
        &recorded[0],
        ObservedEvent::ChannelOpen { label, .. } if label == "input"
    ));
    assert!(matches!(
        &recorded[2],
        ObservedEvent::ChannelMessage { label, data, .. } if label == "input" && data.as_ref() == b"ping"
    ));
    assert_eq!(
        session.observer.frames_from(&session.connection_id).await,
        vec![frame]
    );

    session.finish().await;
}
