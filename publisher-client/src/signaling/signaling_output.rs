use crate::error::SignalingError;
use async_trait::async_trait;
use publisher_core::OutboundMessage;

/// Outbound half of the signaling connection, as seen by the session.
///
/// Implementations must serialize concurrent sends so that envelopes are
/// never interleaved on the wire.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    async fn send(&self, msg: OutboundMessage) -> Result<(), SignalingError>;
}
