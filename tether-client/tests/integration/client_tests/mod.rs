
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use tether_client::{ClientConfig, SignalingOutput, StreamingClient};
use tether_core::OutboundSignal;

use crate::utils::{MockEngineFactory, MockSignalingOutput, RecordingObserver};

pub const CLIENT_CONNECTION_ID: &str = "client-1";

/// A `serve` loop fed from a channel instead of a websocket.
pub struct TestClient {
    pub inbound: mpsc::UnboundedSender<String>,
    pub signal_rx: mpsc::UnboundedReceiver<OutboundSignal>,
    pub signaling: MockSignalingOutput,
    pub factory: MockEngineFactory,
    pub observer: RecordingObserver,
    pub stop: Option<oneshot::Sender<()>>,
    pub task: JoinHandle<anyhow::Result<()>>,
}

pub fn start_test_client(exit_on_session_close: bool) -> TestClient {
    let config = ClientConfig {
        connection_id: Some(CLIENT_CONNECTION_ID.into()),
        exit_on_session_close,
        ..ClientConfig::default()
    };

    let factory = MockEngineFactory::new();
    let observer = RecordingObserver::new();
    let (signaling, signal_rx) = MockSignalingOutput::new();
    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    let client = StreamingClient::new(config, Arc::new(observer.clone()))
        .with_engine_factory(Arc::new(factory.clone()));
    let output: Arc<dyn SignalingOutput> = Arc::new(signaling.clone());

    let task = tokio::spawn(async move {
        client
            .serve(inbound_rx, output, async {
                let _ = stop_rx.await;
            })
            .await
    });

    TestClient {
        inbound: inbound_tx,
        signal_rx,
        signaling,
        factory,
        observer,
        stop: Some(stop_tx),
        task,
    }
}
