//! Engine slot and scan duration scenarios

use crate::common::{harness, minutes_later, samples, FakeSastServer, CREATED};
use sastwatch::metrics::api::{
    ENGINES_METRIC, SCANS_FULL_METRIC, SCANS_PULLING_METRIC, SCANS_QUEUED_METRIC,
    SCANS_SCANNING_METRIC,
};

const ENGINE_1: &str = r#"[{"id": 1, "name": "Engine-A", "minLoc": 0, "maxLoc": 250000, "maxScans": 2}]"#;

fn scan_json(id: i64, stage: i64, engine: Option<i64>, extra: &str) -> String {
    let engine = match engine {
        Some(id) => format!(r#"{{"id": {}}}"#, id),
        None => "null".to_string(),
    };
    format!(
        r#"{{"id": {}, "stage": {{"id": {}}}, "engine": {}, "dateCreated": "{}"{}}}"#,
        id, stage, engine, CREATED, extra
    )
}

fn queue(scans: &[String]) -> String {
    format!("[{}]", scans.join(","))
}

#[tokio::test]
async fn test_idle_engine_publishes_zero_slots() {
    let h = harness(FakeSastServer::new(ENGINE_1, "[]"), 0, 1400);

    let text = h.collector.collect().await.unwrap();

    let slots = samples(&text, ENGINES_METRIC);
    assert_eq!(
        slots,
        vec![
            r#"checkmarx_sast_engines{engineId="1",engineName="Engine-A",slotIndex="1",state="Idle"} 0"#,
            r#"checkmarx_sast_engines{engineId="1",engineName="Engine-A",slotIndex="2",state="Idle"} 0"#,
        ]
    );
    assert!(samples(&text, SCANS_FULL_METRIC).is_empty());
}

#[tokio::test]
async fn test_scanning_scan_occupies_slot_and_reports_durations() {
    let started = format!(r#", "engineStartedOn": "{}""#, minutes_later(5));
    let scans = queue(&[scan_json(100, 4, Some(1), &started)]);
    let h = harness(FakeSastServer::new(ENGINE_1, &scans), 20, 1400);

    let text = h.collector.collect().await.unwrap();

    assert!(text.contains(
        r#"checkmarx_sast_engines{engineId="1",engineName="Engine-A",slotIndex="1",state="Scanning"} 1"#
    ));
    assert!(text.contains(
        r#"checkmarx_sast_engines{engineId="1",engineName="Engine-A",slotIndex="2",state="Idle"} 0"#
    ));
    assert_eq!(
        samples(&text, SCANS_SCANNING_METRIC),
        vec![
            r#"checkmarx_sast_scans_scanning{engineId="1",engineName="Engine-A",locMax="250000",locMin="0",scanId="100"} 15"#
        ]
    );
    assert_eq!(
        samples(&text, SCANS_FULL_METRIC),
        vec![
            r#"checkmarx_sast_scans_full{engineId="1",engineName="Engine-A",locMax="250000",locMin="0",scanId="100"} 20"#
        ]
    );
    assert!(samples(&text, SCANS_PULLING_METRIC).is_empty());
    assert!(samples(&text, SCANS_QUEUED_METRIC).is_empty());
}

#[tokio::test]
async fn test_unparsable_queue_time_omits_queued_duration() {
    let scans = queue(&[scan_json(200, 3, Some(1), r#", "queuedOn": "not a date""#)]);
    let h = harness(FakeSastServer::new(ENGINE_1, &scans), 7, 1400);

    let text = h.collector.collect().await.unwrap();

    assert_eq!(samples(&text, SCANS_FULL_METRIC).len(), 1);
    assert!(samples(&text, SCANS_QUEUED_METRIC).is_empty());
    assert!(text.contains(r#"slotIndex="1",state="Queued"} 1"#));
}

#[tokio::test]
async fn test_queued_scan_keeps_its_slot_when_it_starts_scanning() {
    let first = scan_json(7, 4, Some(1), "");
    let second = scan_json(8, 3, Some(1), &format!(r#", "queuedOn": "{}""#, minutes_later(1)));
    let server = FakeSastServer::new(ENGINE_1, &queue(&[first, second]));
    let h = harness(server.clone(), 10, 1400);

    let text = h.collector.collect().await.unwrap();
    assert!(text.contains(r#"slotIndex="2",state="Queued"} 1"#));
    assert!(samples(&text, SCANS_QUEUED_METRIC)[0].ends_with(" 9"));

    // Scan 7 finished; scan 8 is now scanning and must stay on slot 2
    server.respond(
        ENGINE_1,
        &queue(&[scan_json(7, 7, Some(1), ""), scan_json(8, 4, Some(1), "")]),
    );
    let text = h.collector.collect().await.unwrap();

    assert!(text.contains(r#"slotIndex="1",state="Idle"} 0"#));
    assert!(text.contains(r#"slotIndex="2",state="Scanning"} 1"#));
    assert!(samples(&text, SCANS_QUEUED_METRIC).is_empty());
}

#[tokio::test]
async fn test_capacity_shrink_drops_slot() {
    let busy = queue(&[scan_json(10, 4, Some(1), ""), scan_json(11, 4, Some(1), "")]);
    let server = FakeSastServer::new(ENGINE_1, &busy);
    let h = harness(server.clone(), 3, 1400);
    h.collector.collect().await.unwrap();

    let shrunk = r#"[{"id": 1, "name": "Engine-A", "minLoc": 0, "maxLoc": 250000, "maxScans": 1}]"#;
    server.respond(shrunk, &queue(&[scan_json(11, 4, Some(1), "")]));
    let text = h.collector.collect().await.unwrap();

    let slots = samples(&text, ENGINES_METRIC);
    assert_eq!(slots.len(), 1);
    assert!(slots[0].contains(r#"slotIndex="1""#));
    let cached = h.collector.slots().await;
    assert_eq!(cached.len(), 1);
    assert_eq!(cached[0].assigned_scan, Some(11));
}

#[tokio::test]
async fn test_pulling_scan_without_engine_uses_placeholder_labels() {
    let scans = queue(&[scan_json(300, 10, None, "")]);
    let h = harness(FakeSastServer::new(ENGINE_1, &scans), 4, 1400);

    let text = h.collector.collect().await.unwrap();

    assert_eq!(
        samples(&text, SCANS_PULLING_METRIC),
        vec![
            r#"checkmarx_sast_scans_pulling{engineId="0",engineName="",locMax="999999999",locMin="0",scanId="300"} 4"#
        ]
    );
    assert!(text.contains(r#"slotIndex="1",state="Idle"} 0"#));
    assert!(text.contains(r#"slotIndex="2",state="Idle"} 0"#));
}

#[tokio::test]
async fn test_scan_on_unknown_engine_is_unresolved() {
    let scans = queue(&[scan_json(400, 4, Some(99), "")]);
    let h = harness(FakeSastServer::new(ENGINE_1, &scans), 2, 1400);

    let text = h.collector.collect().await.unwrap();

    assert!(samples(&text, SCANS_FULL_METRIC)[0].contains(r#"engineId="0""#));
    assert!(samples(&text, ENGINES_METRIC).iter().all(|s| s.ends_with(" 0")));
}

#[tokio::test]
async fn test_invalid_records_are_skipped() {
    let engines = r#"[{"id": 1, "name": "Engine-A", "maxScans": 1},
                      {"id": 2, "name": "Broken", "maxScans": -1}]"#;
    let scans = queue(&[
        scan_json(1, 4, Some(1), ""),
        r#"{"id": 2, "stage": {"id": 3}, "engine": {"id": 1}, "dateCreated": "yesterday"}"#
            .to_string(),
    ]);
    let h = harness(FakeSastServer::new(engines, &scans), 1, 1400);

    let text = h.collector.collect().await.unwrap();

    assert_eq!(samples(&text, ENGINES_METRIC).len(), 1);
    assert_eq!(samples(&text, SCANS_FULL_METRIC).len(), 1);
}

#[tokio::test]
async fn test_terminal_scans_produce_no_samples() {
    let scans = queue(&[
        scan_json(1, 7, Some(1), ""),
        scan_json(2, 8, Some(1), ""),
        scan_json(3, 9, Some(1), ""),
        scan_json(4, 1001, Some(1), ""),
    ]);
    let h = harness(FakeSastServer::new(ENGINE_1, &scans), 1, 1400);

    let text = h.collector.collect().await.unwrap();

    assert!(samples(&text, SCANS_FULL_METRIC).is_empty());
    assert!(samples(&text, ENGINES_METRIC).iter().all(|s| s.ends_with(" 0")));
}

#[tokio::test]
async fn test_null_fields_drop_only_their_own_records() {
    let engines = r#"[{"id": 1, "name": "Engine-A", "minLoc": 0, "maxLoc": 250000, "maxScans": 1},
                      {"id": 2, "name": null, "minLoc": null, "maxLoc": null, "maxScans": 1}]"#;
    let scans = format!(
        r#"[{}, {{"id": 301, "stage": null, "engine": {{"id": 2}}, "dateCreated": "{}"}}]"#,
        scan_json(300, 4, Some(1), ""),
        CREATED
    );
    let h = harness(FakeSastServer::new(engines, &scans), 3, 1400);

    let text = h.collector.collect().await.unwrap();

    assert_eq!(h.server.with(|state| state.logons), 1);
    assert_eq!(
        samples(&text, ENGINES_METRIC),
        vec![
            r#"checkmarx_sast_engines{engineId="1",engineName="Engine-A",slotIndex="1",state="Scanning"} 1"#,
            r#"checkmarx_sast_engines{engineId="2",engineName="",slotIndex="1",state="Idle"} 0"#,
        ]
    );
    assert_eq!(
        samples(&text, SCANS_FULL_METRIC),
        vec![
            r#"checkmarx_sast_scans_full{engineId="1",engineName="Engine-A",locMax="250000",locMin="0",scanId="300"} 3"#
        ]
    );
}
