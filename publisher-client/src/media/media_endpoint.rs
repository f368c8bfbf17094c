use crate::error::MediaError;
use crate::media::PipelineEvent;
use async_trait::async_trait;
use publisher_core::SessionDescription;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadDirection {
    Src,
    Sink,
}

/// A connection point on the endpoint carrying one inbound stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemotePad {
    pub id: String,
    pub direction: PadDirection,
    /// Negotiated media type, e.g. `video/vp8` or `audio/opus`.
    pub caps: Option<String>,
}

impl RemotePad {
    pub fn src(id: impl Into<String>, caps: Option<String>) -> Self {
        Self {
            id: id.into(),
            direction: PadDirection::Src,
            caps,
        }
    }
}

/// Where a demuxed inbound stream ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    Display,
    Playback,
}

impl SinkKind {
    /// Chooses a sink from a caps name; `None` for anything that is neither video nor audio.
    pub fn for_caps(caps: &str) -> Option<Self> {
        if caps.starts_with("video") {
            Some(SinkKind::Display)
        } else if caps.starts_with("audio") {
            Some(SinkKind::Playback)
        } else {
            None
        }
    }
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkKind::Display => f.write_str("display"),
            SinkKind::Playback => f.write_str("playback"),
        }
    }
}

/// State fields of the endpoint reported on every `ping`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointField {
    ConnectionState,
    SignalingState,
    IceGatheringState,
    IceConnectionState,
}

impl EndpointField {
    pub const ALL: [EndpointField; 4] = [
        EndpointField::ConnectionState,
        EndpointField::SignalingState,
        EndpointField::IceGatheringState,
        EndpointField::IceConnectionState,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EndpointField::ConnectionState => "connection-state",
            EndpointField::SignalingState => "signaling-state",
            EndpointField::IceGatheringState => "ice-gathering-state",
            EndpointField::IceConnectionState => "ice-connection-state",
        }
    }
}

/// Builds and starts the media pipeline.
#[async_trait]
pub trait MediaPipeline: Send + Sync {
    /// Constructs the pipeline, starts it, and returns its WebRTC endpoint.
    /// From then on the pipeline reports through `events`.
    async fn start(
        &self,
        events: mpsc::Sender<PipelineEvent>,
    ) -> Result<Arc<dyn MediaEndpoint>, MediaError>;
}

/// The WebRTC element of a running pipeline.
#[async_trait]
pub trait MediaEndpoint: Send + Sync {
    async fn create_offer(&self) -> Result<SessionDescription, MediaError>;

    async fn set_local_description(&self, desc: SessionDescription) -> Result<(), MediaError>;

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<(), MediaError>;

    /// Attaches a demuxing stage to an inbound pad. The result is reported
    /// later as [`PipelineEvent::DemuxedPadAdded`].
    async fn attach_demuxer(&self, pad: &RemotePad) -> Result<(), MediaError>;

    /// Attaches a sink chain to a demuxed pad.
    async fn attach_sink(&self, pad: &RemotePad, kind: SinkKind) -> Result<(), MediaError>;

    fn endpoint_state(&self, field: EndpointField) -> String;

    async fn close(&self) -> Result<(), MediaError>;
}
