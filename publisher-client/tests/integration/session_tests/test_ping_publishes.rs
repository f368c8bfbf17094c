use publisher_client::SessionExit;
use publisher_core::{OutboundMessage, SdpType, StreamStatus};

use crate::integration::{WAIT_MS, create_test_session, init_tracing};
use crate::utils::{EndpointCall, FAKE_OFFER_SDP, FakePipeline, ping};

#[tokio::test]
async fn test_ping_answers_pong_then_publishes_after_offer() {
    init_tracing();

    let session = create_test_session(FakePipeline::new().with_gated_offers());

    session.send(ping());
    assert!(session.signaling.wait_for_messages(1, WAIT_MS).await);
    assert_eq!(session.signaling.sent().await, vec![OutboundMessage::pong()]);
    assert_eq!(session.pipeline.starts(), 1);

    // No publishStream until the offer exists.
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    assert!(session.signaling.published_streams().await.is_empty());

    session.pipeline.release_offer();
    assert!(session.signaling.wait_for_messages(2, WAIT_MS).await);

    let streams = session.signaling.published_streams().await;
    assert_eq!(streams.len(), 1);
    let stream = &streams[0];
    assert_eq!(stream.status, StreamStatus::Pending);
    assert_eq!(stream.sdp, FAKE_OFFER_SDP);
    assert_eq!(stream.name, "test-stream");
    assert!(stream.published && stream.has_video && stream.has_audio);
    assert!(!stream.record);
    assert_eq!((stream.bitrate, stream.min_bitrate, stream.max_bitrate), (0, 0, 0));

    // The offer became the local description before it was announced.
    let calls = session.pipeline.call_log().await;
    assert!(calls.iter().any(|c| matches!(
        c,
        EndpointCall::SetLocal(desc) if desc.sdp_type == SdpType::Offer && desc.sdp == FAKE_OFFER_SDP
    )));

    assert_eq!(session.finish().await.unwrap(), SessionExit::StreamEnded);
}

#[tokio::test]
async fn test_repeated_ping_starts_pipeline_once() {
    init_tracing();

    let session = create_test_session(FakePipeline::new());

    for _ in 0..3 {
        session.send(ping());
    }
    // Three pongs and one publishStream.
    assert!(session.signaling.wait_for_messages(4, WAIT_MS).await);
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    assert_eq!(session.pipeline.starts(), 1);
    assert_eq!(
        session.signaling.sent_types().await.iter().filter(|t| **t == "pong").count(),
        3
    );
    assert_eq!(session.signaling.published_streams().await.len(), 1);

    let pipeline = session.pipeline.clone();
    assert_eq!(session.finish().await.unwrap(), SessionExit::StreamEnded);

    // Session end closes the endpoint.
    assert_eq!(pipeline.call_log().await.last(), Some(&EndpointCall::Close));
}

#[tokio::test]
async fn test_every_publish_stream_uses_the_same_media_session_id() {
    init_tracing();

    let session = create_test_session(FakePipeline::new());

    session.send(ping());
    assert!(session.signaling.wait_for_messages(2, WAIT_MS).await);
    session.send(crate::utils::stream_status("FAILED"));
    session.send(ping());
    assert!(session.signaling.wait_for_messages(4, WAIT_MS).await);

    let streams = session.signaling.published_streams().await;
    assert_eq!(streams.len(), 2);
    assert_eq!(streams[0].media_session_id, streams[1].media_session_id);
    assert!(uuid_like(&streams[0].media_session_id));

    session.finish().await.unwrap();
}

fn uuid_like(s: &str) -> bool {
    s.len() == 36 && s.chars().filter(|c| *c == '-').count() == 4
}
