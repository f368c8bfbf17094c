use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Lower bound (inclusive) of generated numeric peer ids.
pub const PEER_ID_MIN: u32 = 10;
/// Upper bound (exclusive) of generated numeric peer ids.
pub const PEER_ID_MAX: u32 = 10_000;

/// Who this client publishes as. Sent as `name` in every `publishStream`.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identity {
    PeerId(u32),
    StreamName(String),
}

impl Identity {
    pub fn random() -> Self {
        Self::PeerId(rand::thread_rng().gen_range(PEER_ID_MIN..PEER_ID_MAX))
    }

    /// Uses the caller supplied name, falling back to a random peer id.
    pub fn from_name(name: Option<String>) -> Self {
        match name {
            Some(name) if !name.trim().is_empty() => Self::StreamName(name),
            _ => Self::random(),
        }
    }
}

impl From<&str> for Identity {
    fn from(s: &str) -> Self {
        Self::StreamName(s.to_owned())
    }
}

impl From<String> for Identity {
    fn from(s: String) -> Self {
        Self::StreamName(s)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identity::PeerId(id) => write!(f, "{}", id),
            Identity::StreamName(name) => f.write_str(name),
        }
    }
}

/// Identifier of the media session, fixed for the lifetime of the process.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq)]
pub struct MediaSessionId(pub Uuid);

impl MediaSessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MediaSessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MediaSessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
