use crate::signaling::SignalingService;
use anyhow::{Context, Result};
use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

const CLOSE_FLUSH_TIMEOUT: Duration = Duration::from_secs(1);

/// An open relay websocket, driven by a writer task and a reader task.
///
/// Each text frame carries exactly one JSON envelope in both directions.
pub struct RelayConnection {
    outbound: mpsc::UnboundedSender<Message>,
    inbound: mpsc::UnboundedReceiver<String>,
    send_task: JoinHandle<()>,
    recv_task: JoinHandle<()>,
}

impl RelayConnection {
    /// A handle that queues encoded signals on this connection.
    pub fn signaling(&self) -> SignalingService {
        SignalingService::new(self.outbound.clone())
    }

    /// Hands out the stream of text frames. `None` once the relay is gone.
    pub fn take_inbound(&mut self) -> mpsc::UnboundedReceiver<String> {
        let (_, closed) = mpsc::unbounded_channel();
        std::mem::replace(&mut self.inbound, closed)
    }

    /// Sends a close frame after everything already queued, waits briefly
    /// for the writer to flush it and stops the reader.
    pub async fn close(self) {
        let _ = self.outbound.send(Message::Close(None));
        drop(self.outbound);

        if tokio::time::timeout(CLOSE_FLUSH_TIMEOUT, self.send_task)
            .await
            .is_err()
        {
            warn!("Relay writer did not finish in time");
        }
        self.recv_task.abort();
    }
}

pub async fn ws_connect(url: &str) -> Result<RelayConnection> {
    let (ws_stream, _) = connect_async(url)
        .await
        .with_context(|| format!("failed to connect to signaling relay at {url}"))?;
    info!("Connected to signaling relay {}", url);

    let (mut sender, mut receiver) = ws_stream.split();
    let (outbound, mut rx) = mpsc::unbounded_channel::<Message>();
    let (inbound_tx, inbound) = mpsc::unbounded_channel::<String>();

    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let is_close = matches!(msg, Message::Close(_));
            if sender.send(msg).await.is_err() || is_close {
                break;
            }
        }
    });

    let recv_task = tokio::spawn(async move {
        while let Some(frame) = receiver.next().await {
            match frame {
                Ok(Message::Text(text)) => {
                    if inbound_tx.send(text.to_string()).is_err() {
                        break;
                    }
                }
                Ok(Message::Close(reason)) => {
                    info!("Relay closed the connection: {:?}", reason);
                    break;
                }
                Ok(Message::Binary(data)) => {
                    debug!("Ignoring {} byte binary frame from relay", data.len());
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("Relay read failed: {}", e);
                    break;
                }
            }
        }
    });

    Ok(RelayConnection {
        outbound,
        inbound,
        send_task,
        recv_task,
    })
}
