mod description;
mod envelope;
mod identity;
mod session;

pub use description::{SdpType, SessionDescription};
pub use envelope::{ConnectionInfo, EnvelopeError, InboundMessage, OutboundMessage, PublishStream};
pub use identity::{Identity, MediaSessionId, PEER_ID_MAX, PEER_ID_MIN};
pub use session::{SessionState, StreamStatus};
