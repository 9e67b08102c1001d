//! Overlapping scrapes

use std::sync::Arc;

use crate::common::{harness, FakeSastServer, CREATED};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_scrapes_never_double_book() {
    let engines = r#"[{"id": 1, "name": "Engine-A", "maxScans": 2},
                      {"id": 2, "name": "Engine-B", "maxScans": 1}]"#;
    let scans: Vec<String> = (1..=5)
        .map(|id| {
            format!(
                r#"{{"id": {}, "stage": {{"id": 4}}, "engine": {{"id": {}}}, "dateCreated": "{}"}}"#,
                id,
                if id % 2 == 0 { 2 } else { 1 },
                CREATED
            )
        })
        .collect();
    let h = harness(FakeSastServer::new(engines, &format!("[{}]", scans.join(","))), 1, 1400);
    let collector = Arc::new(h.collector);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let collector = collector.clone();
            tokio::spawn(async move { collector.collect().await.unwrap() })
        })
        .collect();
    let mut bodies = Vec::new();
    for handle in handles {
        bodies.push(handle.await.unwrap());
    }

    assert!(bodies.windows(2).all(|pair| pair[0] == pair[1]));
    let slots = collector.slots().await;
    assert_eq!(slots.len(), 3);
    let mut assigned: Vec<_> = slots.iter().filter_map(|s| s.assigned_scan).collect();
    assigned.sort();
    assert_eq!(assigned, vec![1, 2, 3]);
}
