use publisher_client::SessionExit;

use crate::integration::{create_test_session, init_tracing};
use crate::utils::{BROKEN_ANSWER_SDP, FakePipeline, set_remote_sdp};

#[tokio::test]
async fn test_unknown_and_malformed_messages_change_nothing() {
    init_tracing();

    let session = create_test_session(FakePipeline::new());

    for text in [
        r#"{"message":"getUserData","data":[]}"#,
        r#"{"message":"getVersion"}"#,
        r#"{"message":"somethingNew","data":[{"x":1}]}"#,
        r#"{"data":["no tag"]}"#,
        r#"{"message":42}"#,
        "definitely not json",
        r#"{"message":"notifyStreamStatusEvent","data":[]}"#,
        r#"{"message":"notifyStreamStatusEvent","data":[{"status":"SOMETHING_ELSE"}]}"#,
    ] {
        session.send(text.to_string());
    }

    let pipeline = session.pipeline.clone();
    let signaling = session.signaling.clone();
    assert_eq!(session.finish().await.unwrap(), SessionExit::StreamEnded);

    assert!(signaling.sent().await.is_empty());
    assert_eq!(pipeline.starts(), 0);
    assert!(pipeline.calls().await.is_empty());
}

#[tokio::test]
async fn test_remote_sdp_before_publish_is_dropped() {
    init_tracing();

    let session = create_test_session(FakePipeline::new());

    session.send(set_remote_sdp(BROKEN_ANSWER_SDP));

    let pipeline = session.pipeline.clone();
    session.finish().await.unwrap();

    assert_eq!(pipeline.starts(), 0);
    assert!(pipeline.calls().await.is_empty());
}
