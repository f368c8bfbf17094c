pub mod session_tests;
pub mod webrtc_tests;

use futures::StreamExt;
use futures::channel::mpsc as stream_mpsc;
use publisher_client::{ClientError, InboundStream, Session, SessionExit, SignalingError};
use publisher_core::Identity;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::Level;

use crate::utils::{FakePipeline, MockSignalingOutput};

pub const WAIT_MS: u64 = 5000;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// A running session fed from a test-controlled inbound stream.
pub struct TestSession {
    pub inbound: stream_mpsc::UnboundedSender<Result<String, SignalingError>>,
    pub signaling: MockSignalingOutput,
    pub pipeline: FakePipeline,
    pub handle: JoinHandle<Result<SessionExit, ClientError>>,
}

impl TestSession {
    pub fn send(&self, text: String) {
        self.inbound
            .unbounded_send(Ok(text))
            .expect("Session stopped reading");
    }

    /// Ends the inbound stream and waits for the session to return.
    pub async fn finish(self) -> Result<SessionExit, ClientError> {
        self.inbound.close_channel();
        self.join().await
    }

    pub async fn join(self) -> Result<SessionExit, ClientError> {
        tokio::time::timeout(std::time::Duration::from_millis(WAIT_MS), self.handle)
            .await
            .expect("Session did not finish")
            .expect("Session task panicked")
    }
}

pub fn create_test_session(pipeline: FakePipeline) -> TestSession {
    let (inbound_tx, inbound_rx) = stream_mpsc::unbounded();
    let (signaling, _sent_rx) = MockSignalingOutput::new();

    let session = Session::new(
        Identity::from("test-stream"),
        Arc::new(signaling.clone()),
        Arc::new(pipeline.clone()),
    );
    let inbound: InboundStream = inbound_rx.boxed();
    let handle = tokio::spawn(session.run(inbound));

    TestSession {
        inbound: inbound_tx,
        signaling,
        pipeline,
        handle,
    }
}
