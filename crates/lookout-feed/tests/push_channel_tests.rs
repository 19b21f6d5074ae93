//! Push channel transport tests against a stubbed HTTP backend.

use lookout_feed::{EventSource, HttpPushSource, PushEvent};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn delivers_each_line_as_one_alert_then_closes() {
    let server = MockServer::start().await;
    let body = concat!(
        r#"{"id":"p1","type":"Gun","confidence":0.8,"timestamp":1,"presignedUrl":"u"}"#,
        "\n",
        "this line is not json\n",
        r#"{"id":"p2","type":"Gun","confidence":0.7,"timestamp":2,"presignedUrl":"u"}"#,
        "\n",
    );
    Mock::given(method("GET"))
        .and(path("/api/push"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let mut source = HttpPushSource::new(format!("{}/api/push", server.uri())).unwrap();

    assert_eq!(source.next_event().await, Some(PushEvent::Connected));

    // One alert per line; the malformed line is skipped, not fatal.
    match source.next_event().await {
        Some(PushEvent::Message(alert)) => assert_eq!(alert.id, "p1"),
        other => panic!("expected first alert, got {other:?}"),
    }
    match source.next_event().await {
        Some(PushEvent::Message(alert)) => assert_eq!(alert.id, "p2"),
        other => panic!("expected second alert, got {other:?}"),
    }

    // The stub body ends, so the channel closes exactly once.
    assert!(matches!(
        source.next_event().await,
        Some(PushEvent::Closed { .. })
    ));
    assert_eq!(source.next_event().await, None);
}

#[tokio::test]
async fn connect_failure_closes_without_panicking() {
    // Nothing listening on this address.
    let mut source = HttpPushSource::new("http://127.0.0.1:1/api/push").unwrap();

    assert_eq!(source.next_event().await.map(|e| matches!(e, PushEvent::Closed { .. })), Some(true));
    assert_eq!(source.next_event().await, None);
}

#[tokio::test]
async fn error_status_closes_the_channel() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/push"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let mut source = HttpPushSource::new(format!("{}/api/push", server.uri())).unwrap();

    match source.next_event().await {
        Some(PushEvent::Closed { reason }) => assert!(reason.contains("404")),
        other => panic!("expected close, got {other:?}"),
    }
    assert_eq!(source.next_event().await, None);
}
