//! Fixtures shared by the engine slot cache tests

use chrono::{DateTime, TimeZone, Utc};

use crate::sast::api::{EngineDescriptor, ScanId, ScanSnapshot};
use crate::scans::stage::Stage;

pub fn created() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 3, 8, 0, 0).unwrap()
}

pub fn engine(id: u64, max_scans: u32) -> EngineDescriptor {
    EngineDescriptor::new(id, format!("Engine-{}", id), max_scans).with_loc_range(0, 250_000)
}

pub fn scan(id: ScanId, stage_code: i64, engine_id: Option<u64>) -> ScanSnapshot {
    let snapshot = ScanSnapshot::new(id, Stage::from_code(stage_code), created());
    match engine_id {
        Some(engine_id) => snapshot.on_engine(engine_id),
        None => snapshot,
    }
}
