use crate::media::TransportConfig;
use publisher_core::ConnectionInfo;
use publisher_core::utils::{APP_KEY, CLIENT_VERSION, DEFAULT_SERVER_URL, DEFAULT_STUN_ADDR};

/// Settings for the signaling side of the client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server_url: String,
    /// Accept any server certificate and host name. Insecure.
    pub skip_certificate_validation: bool,
    pub app_key: String,
    pub client_version: String,
    pub ice_servers: Vec<String>,
}

impl ClientConfig {
    pub fn new(server_url: Option<String>, skip_certificate_validation: bool) -> Self {
        Self {
            server_url: server_url.unwrap_or_else(|| DEFAULT_SERVER_URL.to_owned()),
            skip_certificate_validation,
            ..Default::default()
        }
    }

    pub fn connection_info(&self) -> ConnectionInfo {
        ConnectionInfo::new(self.app_key.clone(), self.client_version.clone())
    }

    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            ice_servers: self.ice_servers.clone(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_owned(),
            skip_certificate_validation: false,
            app_key: APP_KEY.to_owned(),
            client_version: CLIENT_VERSION.to_owned(),
            ice_servers: vec![DEFAULT_STUN_ADDR.to_owned()],
        }
    }
}
