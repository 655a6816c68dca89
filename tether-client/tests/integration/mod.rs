pub mod client_tests;

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::Level;

use tether_client::{Negotiator, Session, SessionCommand, TransportEvent};
use tether_core::{CodecPreference, ConnectionId, OutboundSignal};

use crate::utils::{MockEngine, MockSignalingOutput, RecordingObserver};

pub const TEST_CONNECTION_ID: &str = "test-connection";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// A running session wired to mocks on every side.
pub struct TestSession {
    pub connection_id: ConnectionId,
    pub commands: mpsc::Sender<SessionCommand>,
    pub transport: mpsc::Sender<TransportEvent>,
    pub engine: MockEngine,
    pub signaling: MockSignalingOutput,
    pub signal_rx: mpsc::UnboundedReceiver<OutboundSignal>,
    pub observer: RecordingObserver,
    pub task: JoinHandle<()>,
}

impl TestSession {
    /// Closes the session and waits until it has processed everything sent
    /// before the close.
    pub async fn finish(self) -> (MockEngine, MockSignalingOutput, RecordingObserver) {
        let _ = self.commands.send(SessionCommand::Close).await;
        let _ = tokio::time::timeout(std::time::Duration::from_secs(2), self.task).await;
        (self.engine, self.signaling, self.observer)
    }
}

pub fn create_test_session(polite: bool, engine: MockEngine) -> TestSession {
    let connection_id = ConnectionId::from(TEST_CONNECTION_ID);
    let (command_tx, command_rx) = mpsc::channel::<SessionCommand>(100);
    let (transport_tx, transport_rx) = mpsc::channel::<TransportEvent>(100);
    let (signaling, signal_rx) = MockSignalingOutput::new();
    let observer = RecordingObserver::new();

    let negotiator = Negotiator::new(
        connection_id.clone(),
        polite,
        Box::new(engine.clone()),
        Arc::new(signaling.clone()),
        CodecPreference::h264(),
    );
    let session = Session::new(
        negotiator,
        command_rx,
        transport_rx,
        Arc::new(observer.clone()),
    );

    let task = tokio::spawn(async move {
        session.run().await;
    });

    TestSession {
        connection_id,
        commands: command_tx,
        transport: transport_tx,
        engine,
        signaling,
        signal_rx,
        observer,
        task,
    }
}
