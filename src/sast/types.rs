//! SAST wire records and the typed snapshots built from them
//!
//! Wire records mirror the REST JSON loosely; conversion into
//! [`EngineDescriptor`] and [`ScanSnapshot`] is where malformed input is
//! rejected, so the core only ever sees well-typed data.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use crate::core::timestamp::{parse_optional, parse_sast_timestamp};
use crate::sast::error::SastError;
use crate::scans::stage::Stage;

pub type EngineId = u64;
pub type ScanId = u64;

/// Engine id label used when a scan's engine cannot be resolved
pub const UNRESOLVED_ENGINE_ID: EngineId = 0;
/// Lower LOC bound reported for unresolved engines
pub const DEFAULT_MIN_LOC: i64 = 0;
/// Upper LOC bound reported for unresolved engines
pub const DEFAULT_MAX_LOC: i64 = 999_999_999;

/// Entry from `cxrestapi/sast/engineServers`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineRecord {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    pub max_scans: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub min_loc: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub max_loc: i64,
}

/// Treat an explicit JSON `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// `{ "id": n }` reference used for stage and engine fields
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct IdRef {
    pub id: i64,
}

/// Entry from `cxrestapi/sast/scansQueue`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRecord {
    pub id: i64,
    pub stage: IdRef,
    #[serde(default)]
    pub engine: Option<IdRef>,
    #[serde(default)]
    pub date_created: Option<String>,
    #[serde(default)]
    pub queued_on: Option<String>,
    #[serde(default)]
    pub engine_started_on: Option<String>,
    #[serde(default)]
    pub completed_on: Option<String>,
}

/// A physical scan engine and its declared concurrency
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineDescriptor {
    pub id: EngineId,
    pub name: String,
    pub max_scans: u32,
    pub min_loc: i64,
    pub max_loc: i64,
}

impl EngineDescriptor {
    pub fn new(id: EngineId, name: impl Into<String>, max_scans: u32) -> Self {
        Self {
            id,
            name: name.into(),
            max_scans,
            min_loc: DEFAULT_MIN_LOC,
            max_loc: DEFAULT_MAX_LOC,
        }
    }

    pub fn with_loc_range(mut self, min_loc: i64, max_loc: i64) -> Self {
        self.min_loc = min_loc;
        self.max_loc = max_loc;
        self
    }
}

impl TryFrom<EngineRecord> for EngineDescriptor {
    type Error = SastError;

    fn try_from(record: EngineRecord) -> Result<Self, Self::Error> {
        let invalid = |reason: String| SastError::InvalidRecord {
            kind: "engine",
            id: record.id,
            reason,
        };
        if record.id <= 0 {
            return Err(invalid("id must be positive".to_string()));
        }
        let max_scans = u32::try_from(record.max_scans)
            .map_err(|_| invalid(format!("maxScans {} out of range", record.max_scans)))?;

        Ok(Self {
            id: record.id as EngineId,
            name: record.name,
            max_scans,
            min_loc: record.min_loc,
            max_loc: record.max_loc,
        })
    }
}

/// One scan-queue entry at the moment it was fetched
#[derive(Debug, Clone, PartialEq)]
pub struct ScanSnapshot {
    pub id: ScanId,
    pub stage: Stage,
    pub engine_id: Option<EngineId>,
    pub created_at: DateTime<Utc>,
    pub queued_at: Option<DateTime<Utc>>,
    pub engine_started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ScanSnapshot {
    pub fn new(id: ScanId, stage: Stage, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            stage,
            engine_id: None,
            created_at,
            queued_at: None,
            engine_started_at: None,
            completed_at: None,
        }
    }

    pub fn on_engine(mut self, engine_id: EngineId) -> Self {
        self.engine_id = Some(engine_id);
        self
    }

    pub fn queued_at(mut self, at: DateTime<Utc>) -> Self {
        self.queued_at = Some(at);
        self
    }

    pub fn engine_started_at(mut self, at: DateTime<Utc>) -> Self {
        self.engine_started_at = Some(at);
        self
    }

    pub fn completed_at(mut self, at: DateTime<Utc>) -> Self {
        self.completed_at = Some(at);
        self
    }
}

impl TryFrom<ScanRecord> for ScanSnapshot {
    type Error = SastError;

    fn try_from(record: ScanRecord) -> Result<Self, Self::Error> {
        if record.id <= 0 {
            return Err(SastError::InvalidRecord {
                kind: "scan",
                id: record.id,
                reason: "id must be positive".to_string(),
            });
        }
        let created_at = record
            .date_created
            .as_deref()
            .and_then(parse_sast_timestamp)
            .ok_or_else(|| SastError::InvalidRecord {
                kind: "scan",
                id: record.id,
                reason: format!("unparsable dateCreated {:?}", record.date_created),
            })?;

        Ok(Self {
            id: record.id as ScanId,
            stage: Stage::from_code(record.stage.id),
            // A zero or negative engine id means no engine has been assigned
            engine_id: record
                .engine
                .filter(|engine| engine.id > 0)
                .map(|engine| engine.id as EngineId),
            created_at,
            queued_at: parse_optional(record.queued_on.as_deref()),
            engine_started_at: parse_optional(record.engine_started_on.as_deref()),
            completed_at: parse_optional(record.completed_on.as_deref()),
        })
    }
}

/// Convert wire records, logging and dropping the ones that fail validation
pub fn validate_records<R, T>(records: Vec<R>) -> Vec<T>
where
    T: TryFrom<R, Error = SastError>,
{
    records
        .into_iter()
        .filter_map(|record| match T::try_from(record) {
            Ok(valid) => Some(valid),
            Err(e) => {
                log::warn!("Skipping record: {}", e);
                None
            }
        })
        .collect()
}

/// Decode a JSON array one element at a time
///
/// Elements that do not match the wire record shape are logged and dropped
/// like any other invalid record, so one bad entry never costs the rest of
/// the snapshot.
pub fn decode_records<R, T>(kind: &str, values: Vec<serde_json::Value>) -> Vec<T>
where
    R: DeserializeOwned,
    T: TryFrom<R, Error = SastError>,
{
    let records: Vec<R> = values
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<R>(value) {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!("Skipping malformed {} record: {}", kind, e);
                None
            }
        })
        .collect();
    validate_records(records)
}
