use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tether_client::{MediaFrame, SessionObserver};
use tether_core::{ConnectionId, ConnectionState};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Logs session activity and, when given a directory, appends every frame to
/// `<dir>/<connection id>-<kind>.raw`.
pub struct FrameSink {
    dir: Option<PathBuf>,
    files: Mutex<HashMap<String, File>>,
}

impl FrameSink {
    pub async fn new(dir: Option<PathBuf>) -> Result<Self> {
        if let Some(dir) = &dir {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("cannot create {}", dir.display()))?;
        }

        Ok(Self {
            dir,
            files: Mutex::new(HashMap::new()),
        })
    }

    async fn append(&self, dir: &Path, connection_id: &ConnectionId, frame: &MediaFrame) -> Result<()> {
        let name = format!("{}-{}.raw", connection_id, frame.kind);
        let mut files = self.files.lock().await;

        if !files.contains_key(&name) {
            let path = dir.join(&name);
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .await
                .with_context(|| format!("cannot open {}", path.display()))?;
            info!("Writing {} frames to {}", frame.kind, path.display());
            files.insert(name.clone(), file);
        }

        if let Some(file) = files.get_mut(&name) {
            file.write_all(&frame.data).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl SessionObserver for FrameSink {
    async fn on_connection_state_change(&self, connection_id: &ConnectionId, state: ConnectionState) {
        info!("Connection {} is {}", connection_id, state);
    }

    async fn on_frame(&self, connection_id: &ConnectionId, frame: MediaFrame) {
        debug!(
            "{} frame from {}: {} bytes, ts {}",
            frame.kind,
            connection_id,
            frame.data.len(),
            frame.timestamp
        );

        let Some(dir) = &self.dir else {
            return;
        };
        if let Err(e) = self.append(dir, connection_id, &frame).await {
            warn!("Dropping frame from {}: {:#}", connection_id, e);
        }
    }

    async fn on_channel_open(&self, connection_id: &ConnectionId, label: &str) {
        info!("Channel '{}' open on {}", label, connection_id);
    }

    async fn on_channel_message(&self, connection_id: &ConnectionId, label: &str, data: Bytes) {
        debug!("{} bytes on '{}' from {}", data.len(), label, connection_id);
    }

    async fn on_closed(&self, connection_id: &ConnectionId) {
        let prefix = format!("{}-", connection_id);
        let mut files = self.files.lock().await;

        let names: Vec<String> = files
            .keys()
            .filter(|name| name.starts_with(&prefix))
            .cloned()
            .collect();
        for name in names {
            if let Some(mut file) = files.remove(&name) {
                if let Err(e) = file.flush().await {
                    warn!("Failed to flush {}: {}", name, e);
                }
            }
        }

        info!("Session {} closed", connection_id);
    }
}
