use crate::model::identity::{Identity, MediaSessionId};
use crate::model::session::StreamStatus;
use crate::utils::{APP_KEY, CLIENT_VERSION, MEDIA_PROVIDER};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// First entry of the `connection` envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionInfo {
    pub app_key: String,
    pub media_providers: Vec<String>,
    pub client_version: String,
}

impl ConnectionInfo {
    pub fn new(app_key: impl Into<String>, client_version: impl Into<String>) -> Self {
        Self {
            app_key: app_key.into(),
            media_providers: vec![MEDIA_PROVIDER.to_owned()],
            client_version: client_version.into(),
        }
    }
}

impl Default for ConnectionInfo {
    fn default() -> Self {
        Self::new(APP_KEY, CLIENT_VERSION)
    }
}

/// First entry of the `publishStream` envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishStream {
    pub media_session_id: String,
    pub name: String,
    pub published: bool,
    pub has_video: bool,
    pub has_audio: bool,
    pub record: bool,
    pub status: StreamStatus,
    pub sdp: String,
    pub bitrate: u32,
    pub min_bitrate: u32,
    pub max_bitrate: u32,
}

impl PublishStream {
    /// Announcement of a freshly created offer: audio and video, not recorded, pending.
    pub fn pending(media_session_id: &MediaSessionId, identity: &Identity, sdp: String) -> Self {
        Self {
            media_session_id: media_session_id.to_string(),
            name: identity.to_string(),
            published: true,
            has_video: true,
            has_audio: true,
            record: false,
            status: StreamStatus::Pending,
            sdp,
            bitrate: 0,
            min_bitrate: 0,
            max_bitrate: 0,
        }
    }
}

/// Control messages this client sends, serialized as `{"message": .., "data": [..]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "message", content = "data", rename_all = "camelCase")]
pub enum OutboundMessage {
    Connection([ConnectionInfo; 1]),
    PublishStream([PublishStream; 1]),
    Pong([(); 1]),
}

impl OutboundMessage {
    pub fn connection(info: ConnectionInfo) -> Self {
        Self::Connection([info])
    }

    pub fn publish_stream(stream: PublishStream) -> Self {
        Self::PublishStream([stream])
    }

    pub fn pong() -> Self {
        Self::Pong([()])
    }

    pub fn message_type(&self) -> &'static str {
        match self {
            OutboundMessage::Connection(_) => "connection",
            OutboundMessage::PublishStream(_) => "publishStream",
            OutboundMessage::Pong(_) => "pong",
        }
    }

    pub fn to_json(&self) -> Result<String, EnvelopeError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("envelope has no string `message` field")]
    MissingMessage,
}

/// Control messages received from the signaling server.
///
/// Only the fields a handler needs are extracted; everything else in `data`
/// is ignored. Tags outside the known set land in [`InboundMessage::Unknown`].
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    GetUserData,
    GetVersion,
    Ping,
    /// `data[1]` carries the SDP answer text.
    SetRemoteSdp { sdp: Option<String> },
    /// `data[0].status` carries the stream status.
    NotifyStreamStatus { status: Option<StreamStatus> },
    Unknown(String),
}

impl InboundMessage {
    pub fn parse(text: &str) -> Result<Self, EnvelopeError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self, EnvelopeError> {
        let tag = value
            .get("message")
            .and_then(Value::as_str)
            .ok_or(EnvelopeError::MissingMessage)?;
        let data = value.get("data");

        let msg = match tag {
            "getUserData" => InboundMessage::GetUserData,
            "getVersion" => InboundMessage::GetVersion,
            "ping" => InboundMessage::Ping,
            "setRemoteSDP" => InboundMessage::SetRemoteSdp {
                sdp: data
                    .and_then(|d| d.get(1))
                    .and_then(Value::as_str)
                    .map(str::to_owned),
            },
            "notifyStreamStatusEvent" => InboundMessage::NotifyStreamStatus {
                status: data
                    .and_then(|d| d.get(0))
                    .and_then(|d| d.get("status"))
                    .and_then(|s| serde_json::from_value(s.clone()).ok()),
            },
            other => InboundMessage::Unknown(other.to_owned()),
        };

        Ok(msg)
    }
}
