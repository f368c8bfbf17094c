use crate::error::MediaError;
use crate::media::webrtc_pipeline::{build_api, local_tracks, rtc_config};
use crate::media::TransportConfig;
use std::sync::Arc;
use tracing::debug;
use webrtc::track::track_local::TrackLocal;

/// A feature the publisher cannot work without, and how to spot it in an offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capability {
    pub name: &'static str,
    marker: &'static str,
}

impl Capability {
    const fn new(name: &'static str, marker: &'static str) -> Self {
        Self { name, marker }
    }
}

pub const REQUIRED_CAPABILITIES: [Capability; 7] = [
    Capability::new("opus", "opus/48000"),
    Capability::new("vp8", "vp8/90000"),
    Capability::new("ice", "a=ice-ufrag:"),
    Capability::new("dtls", "a=fingerprint:"),
    Capability::new("rtp", "rtp/savpf"),
    Capability::new("rtcp-mux", "a=rtcp-mux"),
    Capability::new("bundle", "a=group:bundle"),
];

/// Names of the required capabilities missing from `sdp`.
pub fn missing_in_offer(sdp: &str) -> Vec<&'static str> {
    let sdp = sdp.to_lowercase();
    REQUIRED_CAPABILITIES
        .iter()
        .filter(|c| !sdp.contains(c.marker))
        .map(|c| c.name)
        .collect()
}

/// Builds a throwaway endpoint with the publishing tracks and checks its
/// offer for every required capability.
pub async fn missing_capabilities(
    config: &TransportConfig,
) -> Result<Vec<&'static str>, MediaError> {
    let api = build_api()?;
    let pc = api.new_peer_connection(rtc_config(config)).await?;

    for (track, _) in local_tracks() {
        pc.add_track(track as Arc<dyn TrackLocal + Send + Sync>).await?;
    }

    let offer = pc.create_offer(None).await;
    pc.close().await?;
    let offer = offer?;

    let missing = missing_in_offer(&offer.sdp);
    debug!("Capability probe offer:\n{}", offer.sdp);
    Ok(missing)
}
