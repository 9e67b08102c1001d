//! Engine slot types

use crate::sast::types::{EngineId, ScanId};

/// Occupancy of one concurrency slot
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, strum_macros::Display, strum_macros::AsRefStr,
)]
pub enum SlotState {
    #[default]
    Idle,
    Queued,
    Scanning,
}

impl SlotState {
    pub fn is_busy(self) -> bool {
        self != SlotState::Idle
    }
}

/// Slot identity: engine id, then 1-based slot index
///
/// The derived ordering (engine id first, then slot index) is the order in
/// which free slots are handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotKey {
    pub engine_id: EngineId,
    pub slot_index: u32,
}

impl SlotKey {
    pub fn new(engine_id: EngineId, slot_index: u32) -> Self {
        Self {
            engine_id,
            slot_index,
        }
    }
}

impl std::fmt::Display for SlotKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.engine_id, self.slot_index)
    }
}

/// One concurrency unit of one physical engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSlot {
    pub key: SlotKey,
    pub engine_name: String,
    pub min_loc: i64,
    pub max_loc: i64,
    /// Scan occupying the slot, `None` when free
    pub assigned_scan: Option<ScanId>,
    pub state: SlotState,
}

impl EngineSlot {
    pub fn idle(key: SlotKey, engine_name: impl Into<String>, min_loc: i64, max_loc: i64) -> Self {
        Self {
            key,
            engine_name: engine_name.into(),
            min_loc,
            max_loc,
            assigned_scan: None,
            state: SlotState::Idle,
        }
    }

    /// Scan id in the wire convention, 0 meaning free
    pub fn assigned_scan_id(&self) -> ScanId {
        self.assigned_scan.unwrap_or(0)
    }

    pub fn is_free(&self) -> bool {
        self.assigned_scan.is_none()
    }

    pub(crate) fn release(&mut self) {
        self.assigned_scan = None;
        self.state = SlotState::Idle;
    }

    pub(crate) fn occupy(&mut self, scan_id: ScanId, state: SlotState) {
        self.assigned_scan = Some(scan_id);
        self.state = state;
    }
}
