//! Scan classification API

pub use crate::scans::classifier::{
    classify, minutes_between, resolve_engine, ClassifiedScan, DurationKind, EngineLabels,
    ScanDurations,
};
pub use crate::scans::stage::Stage;
