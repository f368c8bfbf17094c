use crate::media::SinkKind;
use std::sync::Arc;
use tracing::{debug, info};
use webrtc::track::track_remote::TrackRemote;

const REPORT_EVERY_PACKETS: u64 = 500;

/// Running totals of what a sink received.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkStats {
    pub packets: u64,
    pub bytes: u64,
}

impl SinkStats {
    /// Accounts one packet; returns whether a progress report is due.
    pub fn record(&mut self, payload_len: usize) -> bool {
        self.packets += 1;
        self.bytes += payload_len as u64;
        self.packets % REPORT_EVERY_PACKETS == 0
    }
}

/// Terminal stage for an inbound track. Rendering is left to the platform;
/// this drains RTP so the receiver keeps flowing and accounts what arrived.
pub struct RemoteSink {
    kind: SinkKind,
    track: Arc<TrackRemote>,
}

impl RemoteSink {
    pub fn new(kind: SinkKind, track: Arc<TrackRemote>) -> Self {
        Self { kind, track }
    }

    pub async fn run(self) {
        let mut stats = SinkStats::default();

        info!("{} sink attached to track {}", self.kind, self.track.id());

        loop {
            match self.track.read_rtp().await {
                Ok((packet, _)) => {
                    if stats.record(packet.payload.len()) {
                        debug!(
                            "{} sink: {} packets, {} bytes",
                            self.kind, stats.packets, stats.bytes
                        );
                    }
                }
                Err(e) => {
                    info!(
                        "{} sink finished after {} packets ({} bytes): {}",
                        self.kind, stats.packets, stats.bytes, e
                    );
                    break;
                }
            }
        }
    }
}
