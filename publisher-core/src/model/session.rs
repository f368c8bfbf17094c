use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of the publishing session.
///
/// Moves forward only, except that a `FAILED` stream status returns the
/// session to [`SessionState::Connected`] so the next `ping` publishes again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Init,
    Connected,
    Publish,
    Streaming,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Init => "init",
            SessionState::Connected => "connected",
            SessionState::Publish => "publish",
            SessionState::Streaming => "streaming",
        };
        f.write_str(name)
    }
}

/// Stream status as reported by `notifyStreamStatusEvent` and sent in `publishStream`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StreamStatus {
    Pending,
    Publishing,
    Failed,
    Unpublished,
    #[serde(other)]
    Other,
}
