//! Token reuse, expiry and the one-shot re-authentication

use chrono::Duration;

use crate::common::{harness, samples, FakeSastServer, CREATED};
use sastwatch::metrics::api::{ENGINES_METRIC, SCANS_FULL_METRIC};

const ENGINES: &str = r#"[{"id": 1, "name": "Engine-A", "maxScans": 2}]"#;

fn queued_scan() -> String {
    format!(
        r#"[{{"id": 5, "stage": {{"id": 3}}, "engine": {{"id": 1}}, "dateCreated": "{}"}}]"#,
        CREATED
    )
}

#[tokio::test]
async fn test_token_reused_within_ttl_and_renewed_after() {
    let h = harness(FakeSastServer::new(ENGINES, "[]"), 0, 60);

    h.collector.collect().await.unwrap();
    h.clock.advance(Duration::seconds(60));
    h.collector.collect().await.unwrap();
    h.server.with(|state| assert_eq!(state.logons, 1));

    h.clock.advance(Duration::seconds(1));
    h.collector.collect().await.unwrap();

    h.server.with(|state| {
        assert_eq!(state.logons, 2);
        assert_eq!(state.tokens_seen.last().map(String::as_str), Some("Bearer token-2"));
    });
}

#[tokio::test]
async fn test_empty_engine_list_retries_once_with_fresh_token() {
    let server = FakeSastServer::new(ENGINES, "[]");
    server.with(|state| state.empty_engine_responses = 1);
    let h = harness(server, 0, 1400);

    let text = h.collector.collect().await.unwrap();

    assert_eq!(samples(&text, ENGINES_METRIC).len(), 2);
    h.server.with(|state| {
        assert_eq!(state.logons, 2);
        assert_eq!(state.engine_calls, 2);
        assert_eq!(
            state.tokens_seen[..2],
            ["Bearer token-1".to_string(), "Bearer token-2".to_string()]
        );
    });
}

#[tokio::test]
async fn test_engine_error_retries_once_then_gives_up() {
    let server = FakeSastServer::new(ENGINES, &queued_scan());
    server.with(|state| state.fail_engines = true);
    let h = harness(server, 0, 1400);

    let text = h.collector.collect().await.unwrap();

    assert!(samples(&text, ENGINES_METRIC).is_empty());
    assert!(samples(&text, SCANS_FULL_METRIC).is_empty());
    h.server.with(|state| {
        assert_eq!(state.engine_calls, 2);
        assert_eq!(state.scan_calls, 0);
    });
}

#[tokio::test]
async fn test_unavailable_engines_keep_slots_but_release_them() {
    let server = FakeSastServer::new(ENGINES, &queued_scan());
    let h = harness(server.clone(), 0, 1400);
    let text = h.collector.collect().await.unwrap();
    assert!(text.contains(r#"slotIndex="1",state="Queued"} 1"#));

    server.with(|state| state.empty_engine_responses = 2);
    let text = h.collector.collect().await.unwrap();

    assert_eq!(
        samples(&text, ENGINES_METRIC),
        vec![
            r#"checkmarx_sast_engines{engineId="1",engineName="Engine-A",slotIndex="1",state="Idle"} 0"#,
            r#"checkmarx_sast_engines{engineId="1",engineName="Engine-A",slotIndex="2",state="Idle"} 0"#,
        ]
    );
    assert!(samples(&text, SCANS_FULL_METRIC).is_empty());

    // Engines come back: the still-queued scan reoccupies the first slot
    let text = h.collector.collect().await.unwrap();
    assert!(text.contains(r#"slotIndex="1",state="Queued"} 1"#));
}

#[tokio::test]
async fn test_logon_failure_yields_empty_pass() {
    let server = FakeSastServer::new(ENGINES, &queued_scan());
    server.with(|state| state.fail_logon = true);
    let h = harness(server.clone(), 0, 1400);

    let text = h.collector.collect().await.unwrap();
    assert!(samples(&text, ENGINES_METRIC).is_empty());

    server.with(|state| state.fail_logon = false);
    let text = h.collector.collect().await.unwrap();
    assert_eq!(samples(&text, ENGINES_METRIC).len(), 2);
}

#[tokio::test]
async fn test_scan_queue_failure_keeps_engine_metrics() {
    let server = FakeSastServer::new(ENGINES, &queued_scan());
    server.with(|state| state.fail_scans = true);
    let h = harness(server, 0, 1400);

    let text = h.collector.collect().await.unwrap();

    assert_eq!(samples(&text, ENGINES_METRIC).len(), 2);
    assert!(samples(&text, ENGINES_METRIC).iter().all(|s| s.ends_with(" 0")));
    assert!(samples(&text, SCANS_FULL_METRIC).is_empty());
}
