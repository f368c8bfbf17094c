/// Signaling server used when none is given.
pub const DEFAULT_SERVER_URL: &str = "wss://192.168.1.1:8443";

pub const APP_KEY: &str = "defaultApp";
pub const CLIENT_VERSION: &str = "0.0.1";
pub const MEDIA_PROVIDER: &str = "WebRTC";

pub const DEFAULT_STUN_ADDR: &str = "stun:stun.l.google.com:19302";
