use publisher_core::EnvelopeError;
use thiserror::Error;
use tokio_tungstenite::tungstenite;

#[derive(Debug, Error)]
pub enum SignalingError {
    #[error("invalid signaling url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("TLS setup failed: {0}")]
    Tls(#[from] native_tls::Error),

    #[error("connection to {url} failed: {source}")]
    Connection {
        url: String,
        #[source]
        source: tungstenite::Error,
    },

    #[error("send failed: {0}")]
    Send(#[source] tungstenite::Error),

    #[error("receive failed: {0}")]
    Receive(#[source] tungstenite::Error),

    #[error("inbound stream was already taken")]
    AlreadyReceiving,

    #[error(transparent)]
    Envelope(#[from] EnvelopeError),
}

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("unknown pad {0}")]
    UnknownPad(String),

    #[error("invalid SDP: {0}")]
    Sdp(String),

    #[error(transparent)]
    Webrtc(#[from] webrtc::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Signaling(#[from] SignalingError),

    #[error(transparent)]
    Media(#[from] MediaError),
}
