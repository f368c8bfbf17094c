use async_trait::async_trait;
use publisher_client::{SignalingError, SignalingOutput};
use publisher_core::{OutboundMessage, PublishStream};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

/// Mock SignalingOutput that captures every outgoing envelope.
#[derive(Clone)]
pub struct MockSignalingOutput {
    tx: mpsc::UnboundedSender<OutboundMessage>,
    sent: Arc<Mutex<Vec<OutboundMessage>>>,
}

impl MockSignalingOutput {
    /// Create a new MockSignalingOutput and its receiver channel.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<OutboundMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let signaling = Self {
            tx,
            sent: Arc::new(Mutex::new(Vec::new())),
        };
        (signaling, rx)
    }

    pub async fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().await.clone()
    }

    /// Message types in the order they were sent.
    pub async fn sent_types(&self) -> Vec<&'static str> {
        self.sent
            .lock()
            .await
            .iter()
            .map(OutboundMessage::message_type)
            .collect()
    }

    pub async fn published_streams(&self) -> Vec<PublishStream> {
        self.sent
            .lock()
            .await
            .iter()
            .filter_map(|m| match m {
                OutboundMessage::PublishStream([stream]) => Some(stream.clone()),
                _ => None,
            })
            .collect()
    }

    /// Wait until at least `count` messages were sent.
    pub async fn wait_for_messages(&self, count: usize, timeout_ms: u64) -> bool {
        let start = std::time::Instant::now();
        let timeout = std::time::Duration::from_millis(timeout_ms);

        loop {
            if self.sent.lock().await.len() >= count {
                return true;
            }
            if start.elapsed() > timeout {
                return false;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
    }
}

#[async_trait]
impl SignalingOutput for MockSignalingOutput {
    async fn send(&self, msg: OutboundMessage) -> Result<(), SignalingError> {
        tracing::debug!("[MockSignaling] send {}", msg.message_type());

        self.sent.lock().await.push(msg.clone());
        let _ = self.tx.send(msg);
        Ok(())
    }
}
