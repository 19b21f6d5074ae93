//! Snapshot fetching and feed lifecycle tests against a stubbed HTTP
//! backend.
//!
//! These cover the transport-level failure taxonomy: a whole-response
//! failure retains the previous state, while a malformed entry inside an
//! otherwise valid batch is dropped without blocking the batch.

use std::time::Duration;

use lookout_core::config::DashboardConfig;
use lookout_core::error::LookoutError;
use lookout_feed::{FeedCoordinator, FeedSnapshot, SnapshotFetcher};
use tokio::sync::watch;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn alerts_body(entries: &str) -> String {
    format!(r#"{{"alerts":[{entries}]}}"#)
}

async fn mount_alerts(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/api/alerts"))
        .respond_with(template)
        .mount(server)
        .await;
}

async fn wait_for<F>(rx: &mut watch::Receiver<FeedSnapshot>, mut pred: F) -> FeedSnapshot
where
    F: FnMut(&FeedSnapshot) -> bool,
{
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            {
                let current = rx.borrow();
                if pred(&current) {
                    return current.clone();
                }
            }
            rx.changed().await.expect("feed closed");
        }
    })
    .await
    .expect("condition not reached in time")
}

#[tokio::test]
async fn fetch_decodes_wire_field_names() {
    let server = MockServer::start().await;
    mount_alerts(
        &server,
        ResponseTemplate::new(200).set_body_string(alerts_body(
            r#"{"id":"alert-1","type":"Gun Detected","confidence":0.91,"timestamp":1700000000000,"presignedUrl":"https://clips.example/1.mp4"}"#,
        )),
    )
    .await;

    let fetcher = SnapshotFetcher::new(
        format!("{}/api/alerts", server.uri()),
        Duration::from_secs(5),
    )
    .unwrap();

    let alerts = fetcher.fetch().await.unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].id, "alert-1");
    assert_eq!(alerts[0].category, "Gun Detected");
    assert_eq!(alerts[0].confidence, 0.91);
    assert_eq!(alerts[0].clip_reference, "https://clips.example/1.mp4");
}

#[tokio::test]
async fn malformed_entry_does_not_block_the_batch() {
    let server = MockServer::start().await;
    // Middle entry has confidence 1.7: dropped, neighbors survive.
    mount_alerts(
        &server,
        ResponseTemplate::new(200).set_body_string(alerts_body(
            r#"{"id":"a","type":"Gun","confidence":0.9,"timestamp":1,"presignedUrl":"u"},
               {"id":"bad","type":"Gun","confidence":1.7,"timestamp":2,"presignedUrl":"u"},
               {"id":"b","type":"Gun","confidence":0.5,"timestamp":3,"presignedUrl":"u"}"#,
        )),
    )
    .await;

    let fetcher = SnapshotFetcher::new(
        format!("{}/api/alerts", server.uri()),
        Duration::from_secs(5),
    )
    .unwrap();

    let alerts = fetcher.fetch().await.unwrap();
    let ids: Vec<&str> = alerts.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
}

#[tokio::test]
async fn http_error_status_fails_the_whole_fetch() {
    let server = MockServer::start().await;
    mount_alerts(&server, ResponseTemplate::new(500)).await;

    let fetcher = SnapshotFetcher::new(
        format!("{}/api/alerts", server.uri()),
        Duration::from_secs(5),
    )
    .unwrap();

    let err = fetcher.fetch().await.unwrap_err();
    assert!(matches!(err, LookoutError::SnapshotStatus { status: 500 }));
    assert!(err.is_transient());
}

#[tokio::test]
async fn unparseable_body_fails_the_whole_fetch() {
    let server = MockServer::start().await;
    mount_alerts(
        &server,
        ResponseTemplate::new(200).set_body_string("not json at all"),
    )
    .await;

    let fetcher = SnapshotFetcher::new(
        format!("{}/api/alerts", server.uri()),
        Duration::from_secs(5),
    )
    .unwrap();

    let err = fetcher.fetch().await.unwrap_err();
    assert!(matches!(err, LookoutError::SnapshotParse { .. }));
    assert!(err.is_transient());
}

#[tokio::test]
async fn slow_response_counts_as_timeout() {
    let server = MockServer::start().await;
    mount_alerts(
        &server,
        ResponseTemplate::new(200)
            .set_body_string(alerts_body(""))
            .set_delay(Duration::from_secs(3)),
    )
    .await;

    let fetcher = SnapshotFetcher::new(
        format!("{}/api/alerts", server.uri()),
        Duration::from_secs(1),
    )
    .unwrap();

    let err = fetcher.fetch().await.unwrap_err();
    assert!(matches!(
        err,
        LookoutError::SnapshotTimeout { timeout_secs: 1 }
    ));
}

#[tokio::test]
async fn coordinator_applies_polled_snapshot() {
    let server = MockServer::start().await;
    mount_alerts(
        &server,
        ResponseTemplate::new(200).set_body_string(alerts_body(
            r#"{"id":"a","type":"Gun","confidence":0.9,"timestamp":1,"presignedUrl":"u"},
               {"id":"b","type":"Gun","confidence":0.5,"timestamp":2,"presignedUrl":"u"}"#,
        )),
    )
    .await;

    let config = DashboardConfig::default()
        .with_alerts_url(format!("{}/api/alerts", server.uri()))
        .with_poll_interval_ms(200);

    let handle = FeedCoordinator::spawn(&config, None).unwrap();
    let mut rx = handle.subscribe();

    let state = wait_for(&mut rx, |s| s.loaded).await;
    assert_eq!(state.alerts.len(), 2);
    assert_eq!(state.alerts[0].id, "a");
    assert!(state.fetch_error.is_none());

    handle.shutdown().await;
}

#[tokio::test]
async fn coordinator_recovers_on_next_tick_after_failure() {
    let server = MockServer::start().await;

    // First poll fails, every later poll succeeds. No backoff: the fixed
    // interval is self-healing.
    Mock::given(method("GET"))
        .and(path("/api/alerts"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_alerts(
        &server,
        ResponseTemplate::new(200).set_body_string(alerts_body(
            r#"{"id":"a","type":"Gun","confidence":0.9,"timestamp":1,"presignedUrl":"u"}"#,
        )),
    )
    .await;

    let config = DashboardConfig::default()
        .with_alerts_url(format!("{}/api/alerts", server.uri()))
        .with_poll_interval_ms(200);

    let handle = FeedCoordinator::spawn(&config, None).unwrap();
    let mut rx = handle.subscribe();

    let failed = wait_for(&mut rx, |s| s.fetch_error.is_some()).await;
    assert!(failed.alerts.is_empty());
    assert!(!failed.loaded);

    let recovered = wait_for(&mut rx, |s| s.loaded).await;
    assert_eq!(recovered.alerts.len(), 1);
    assert!(recovered.fetch_error.is_none());

    handle.shutdown().await;
}

#[tokio::test]
async fn manual_refresh_triggers_immediate_fetch() {
    let server = MockServer::start().await;
    mount_alerts(
        &server,
        ResponseTemplate::new(200).set_body_string(alerts_body(
            r#"{"id":"a","type":"Gun","confidence":0.9,"timestamp":1,"presignedUrl":"u"}"#,
        )),
    )
    .await;

    // Hour-long poll interval: only the immediate first tick and the manual
    // refresh can fetch.
    let config = DashboardConfig::default()
        .with_alerts_url(format!("{}/api/alerts", server.uri()))
        .with_poll_interval_ms(3_600_000);

    let handle = FeedCoordinator::spawn(&config, None).unwrap();
    let mut rx = handle.subscribe();
    wait_for(&mut rx, |s| s.loaded).await;

    let refresh = handle.refresh_sender();
    refresh.try_send(()).unwrap();

    // The refreshed fetch flows through the same serialized path; watch for
    // the second request hitting the stub.
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if server.received_requests().await.unwrap_or_default().len() >= 2 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("refresh fetch never reached the endpoint");

    handle.shutdown().await;
}
