//! Scan duration classifier
//!
//! Maps one scan-queue entry to the lifecycle-phase durations it currently
//! contributes, in minutes. Pure: the caller supplies `now`.

use chrono::{DateTime, Utc};

use crate::sast::types::{
    EngineDescriptor, EngineId, ScanId, ScanSnapshot, DEFAULT_MAX_LOC, DEFAULT_MIN_LOC,
    UNRESOLVED_ENGINE_ID,
};

/// Lifecycle phase a duration sample describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::EnumIter, strum_macros::AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum DurationKind {
    Pulling,
    Queued,
    Scanning,
    Full,
}

/// Durations present for a scan, in minutes
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScanDurations {
    pub full: Option<f64>,
    pub pulling: Option<f64>,
    pub queued: Option<f64>,
    pub scanning: Option<f64>,
}

impl ScanDurations {
    pub fn get(&self, kind: DurationKind) -> Option<f64> {
        match kind {
            DurationKind::Pulling => self.pulling,
            DurationKind::Queued => self.queued,
            DurationKind::Scanning => self.scanning,
            DurationKind::Full => self.full,
        }
    }

    /// Present durations, in [`DurationKind`] order
    pub fn present(&self) -> impl Iterator<Item = (DurationKind, f64)> + '_ {
        use strum::IntoEnumIterator;
        DurationKind::iter().filter_map(move |kind| self.get(kind).map(|value| (kind, value)))
    }

    pub fn is_empty(&self) -> bool {
        self.present().next().is_none()
    }
}

/// Engine identity attached to a scan's duration samples
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineLabels {
    pub engine_id: EngineId,
    pub engine_name: String,
    pub min_loc: i64,
    pub max_loc: i64,
}

impl EngineLabels {
    /// Labels for a resolved engine, or the placeholder set when unresolved
    pub fn resolve(engine: Option<&EngineDescriptor>) -> Self {
        match engine {
            Some(engine) => Self {
                engine_id: engine.id,
                engine_name: engine.name.clone(),
                min_loc: engine.min_loc,
                max_loc: engine.max_loc,
            },
            None => Self::unresolved(),
        }
    }

    pub fn unresolved() -> Self {
        Self {
            engine_id: UNRESOLVED_ENGINE_ID,
            engine_name: String::new(),
            min_loc: DEFAULT_MIN_LOC,
            max_loc: DEFAULT_MAX_LOC,
        }
    }
}

/// Classifier output for one scan
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedScan {
    pub scan_id: ScanId,
    pub engine: EngineLabels,
    pub durations: ScanDurations,
}

/// Find the engine a scan references in the current engine list
pub fn resolve_engine<'a>(
    scan: &ScanSnapshot,
    engines: &'a [EngineDescriptor],
) -> Option<&'a EngineDescriptor> {
    let engine_id = scan.engine_id?;
    engines.iter().find(|engine| engine.id == engine_id)
}

/// Compute the duration samples a scan contributes at `now`
///
/// Absent or unparsable phase timestamps omit that duration; they are never
/// an error.
pub fn classify(
    scan: &ScanSnapshot,
    resolved_engine: Option<&EngineDescriptor>,
    now: DateTime<Utc>,
) -> ClassifiedScan {
    let stage = scan.stage;
    let since_creation = minutes_between(scan.created_at, now);

    let mut durations = ScanDurations::default();
    if stage.is_in_flight() {
        durations.full = Some(since_creation);
    }
    if stage.is_pulling() {
        durations.pulling = Some(since_creation);
    } else if stage == crate::scans::stage::Stage::Queued {
        durations.queued = scan.queued_at.map(|queued_at| minutes_between(queued_at, now));
    } else if stage.is_scanning() {
        durations.scanning = scan.engine_started_at.map(|started_at| {
            let end = scan.completed_at.unwrap_or(now);
            minutes_between(started_at, end)
        });
    }

    ClassifiedScan {
        scan_id: scan.id,
        engine: EngineLabels::resolve(resolved_engine),
        durations,
    }
}

/// Elapsed minutes from `start` to `end`, floored at zero
pub fn minutes_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    let elapsed = (end - start).num_milliseconds() as f64 / 60_000.0;
    elapsed.max(0.0)
}
