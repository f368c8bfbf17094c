use publisher_core::utils::DEFAULT_STUN_ADDR;

/// Settings for the WebRTC endpoint.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub ice_servers: Vec<String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec![DEFAULT_STUN_ADDR.to_owned()],
        }
    }
}
