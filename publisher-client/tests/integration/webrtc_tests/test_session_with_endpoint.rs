use futures::StreamExt;
use futures::channel::mpsc as stream_mpsc;
use publisher_client::{Session, SessionExit, TransportConfig, WebRtcPipeline};
use publisher_core::{Identity, StreamStatus};
use std::sync::Arc;
use std::time::Duration;

use crate::integration::{WAIT_MS, init_tracing};
use crate::utils::{MockSignalingOutput, ping};

#[tokio::test]
async fn test_real_endpoint_publishes_exactly_once() {
    init_tracing();

    let (inbound_tx, inbound_rx) = stream_mpsc::unbounded();
    let (signaling, _sent_rx) = MockSignalingOutput::new();
    let pipeline = WebRtcPipeline::new(TransportConfig {
        ice_servers: Vec::new(),
    });

    let session = Session::new(
        Identity::from("camera"),
        Arc::new(signaling.clone()),
        Arc::new(pipeline),
    );
    let handle = tokio::spawn(session.run(inbound_rx.boxed()));

    inbound_tx.unbounded_send(Ok(ping())).unwrap();
    assert!(signaling.wait_for_messages(2, WAIT_MS).await, "no publishStream");

    // Both tracks are added before the first offer; late negotiation
    // requests must not produce a second announcement.
    tokio::time::sleep(Duration::from_millis(1000)).await;

    let streams = signaling.published_streams().await;
    assert_eq!(streams.len(), 1, "sent: {:?}", signaling.sent_types().await);
    let stream = &streams[0];
    assert_eq!(stream.status, StreamStatus::Pending);
    assert_eq!(stream.name, "camera");
    assert!(stream.sdp.contains("m=video"));
    assert!(stream.sdp.contains("m=audio"));

    inbound_tx.close_channel();
    let exit = tokio::time::timeout(Duration::from_millis(WAIT_MS), handle)
        .await
        .expect("Session did not finish")
        .expect("Session task panicked");
    assert_eq!(exit.unwrap(), SessionExit::StreamEnded);
}
