use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use webrtc::media::Sample;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

pub const VIDEO_FRAME_INTERVAL: Duration = Duration::from_millis(33);
pub const AUDIO_FRAME_INTERVAL: Duration = Duration::from_millis(20);

/// A single 20ms Opus frame of silence (TOC 0xF8, code 0).
pub const OPUS_SILENCE_FRAME: [u8; 3] = [0xF8, 0xFF, 0xFE];

/// Width of the placeholder video frame the ball moves across.
pub const BALL_FRAME_WIDTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestPattern {
    /// Placeholder video payload: one bright byte bouncing across the frame.
    /// It is not a VP8 bitstream, so receivers cannot decode it; it only
    /// keeps RTP flowing on the video track.
    Ball,
    /// Opus silence.
    Silence,
}

impl TestPattern {
    pub fn interval(&self) -> Duration {
        match self {
            TestPattern::Ball => VIDEO_FRAME_INTERVAL,
            TestPattern::Silence => AUDIO_FRAME_INTERVAL,
        }
    }

    pub fn frame(&self, index: u64) -> Bytes {
        match self {
            TestPattern::Ball => {
                let mut frame = vec![0u8; BALL_FRAME_WIDTH];
                frame[ball_position(index)] = 0xFF;
                Bytes::from(frame)
            }
            TestPattern::Silence => Bytes::from_static(&OPUS_SILENCE_FRAME),
        }
    }
}

fn ball_position(index: u64) -> usize {
    let span = (BALL_FRAME_WIDTH - 1) as u64;
    let step = index % (2 * span);
    (if step <= span { step } else { 2 * span - step }) as usize
}

/// Paced live source feeding one local track.
pub struct SyntheticSource {
    track: Arc<TrackLocalStaticSample>,
    pattern: TestPattern,
}

impl SyntheticSource {
    pub fn new(track: Arc<TrackLocalStaticSample>, pattern: TestPattern) -> Self {
        Self { track, pattern }
    }

    /// Writes one frame per interval until the track refuses a sample.
    pub async fn run(self) {
        let interval = self.pattern.interval();
        let mut ticker = tokio::time::interval(interval);
        let mut index: u64 = 0;

        debug!("Synthetic {:?} source started on {}", self.pattern, self.track.id());

        loop {
            ticker.tick().await;
            let sample = Sample {
                data: self.pattern.frame(index),
                duration: interval,
                ..Default::default()
            };
            if let Err(e) = self.track.write_sample(&sample).await {
                warn!("Synthetic {:?} source stopped: {}", self.pattern, e);
                break;
            }
            index = index.wrapping_add(1);
        }
    }
}
