//! Engine slot cache and its reconciliation pass
//!
//! The cache lives for the whole process. Each scrape reconciles it against a
//! fresh engine list and scan queue in four steps: prune, grow, release stale
//! assignments, assign occupancy.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use crate::engines::slot::{EngineSlot, SlotKey, SlotState};
use crate::sast::types::{EngineDescriptor, EngineId, ScanSnapshot};
use crate::scans::stage::Stage;

/// Per-slot occupancy cache keyed by (engine id, slot index)
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EngineSlotCache {
    slots: BTreeMap<SlotKey, EngineSlot>,
}

impl EngineSlotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a full reconciliation pass and return the resulting slots
    pub fn reconcile(
        &mut self,
        engines: &[EngineDescriptor],
        scans: &[ScanSnapshot],
    ) -> Vec<EngineSlot> {
        self.prune(engines);
        self.grow(engines);
        self.release_stale(scans);
        self.assign(scans);
        self.snapshot()
    }

    /// Drop slots whose engine is gone or no longer declares that capacity
    pub fn prune(&mut self, engines: &[EngineDescriptor]) {
        let before = self.slots.len();
        self.slots.retain(|key, _| {
            engines
                .iter()
                .any(|engine| engine.id == key.engine_id && engine.max_scans >= key.slot_index)
        });
        let removed = before - self.slots.len();
        if removed > 0 {
            log::debug!("Pruned {} engine slot(s)", removed);
        }
    }

    /// Ensure every engine has slots 1..=max_scans
    ///
    /// Existing slots keep their occupancy; their engine name and LOC bounds
    /// follow the latest engine record.
    pub fn grow(&mut self, engines: &[EngineDescriptor]) {
        for engine in engines {
            for slot_index in 1..=engine.max_scans {
                let key = SlotKey::new(engine.id, slot_index);
                let slot = self.slots.entry(key).or_insert_with(|| {
                    log::debug!("New engine slot {} ({})", key, engine.name);
                    EngineSlot::idle(key, engine.name.clone(), engine.min_loc, engine.max_loc)
                });
                slot.engine_name.clone_from(&engine.name);
                slot.min_loc = engine.min_loc;
                slot.max_loc = engine.max_loc;
            }
        }
    }

    /// Free slots whose scan is no longer active on that slot's engine
    ///
    /// This is the only step that runs when the engine list is unavailable.
    pub fn release_stale(&mut self, scans: &[ScanSnapshot]) {
        for slot in self.slots.values_mut() {
            let Some(scan_id) = slot.assigned_scan else {
                continue;
            };
            let still_running = scans.iter().any(|scan| {
                scan.id == scan_id
                    && scan.stage.is_active()
                    && scan.engine_id == Some(slot.key.engine_id)
            });
            if !still_running {
                log::debug!("Releasing slot {} from scan {}", slot.key, scan_id);
                slot.release();
            }
        }
    }

    /// Record queued/scanning scans against their engine's slots
    ///
    /// A scan already holding a slot keeps it and has its state refreshed;
    /// otherwise it takes the lowest-indexed free slot of its engine.
    pub fn assign(&mut self, scans: &[ScanSnapshot]) {
        for scan in scans {
            let (Some(engine_id), Some(state)) = (scan.engine_id, engine_visible_state(scan.stage))
            else {
                continue;
            };

            let range = Self::engine_range(engine_id);
            if let Some(slot) = self
                .slots
                .range_mut(range.clone())
                .map(|(_, slot)| slot)
                .find(|slot| slot.assigned_scan == Some(scan.id))
            {
                slot.state = state;
                continue;
            }

            match self
                .slots
                .range_mut(range)
                .map(|(_, slot)| slot)
                .find(|slot| slot.is_free())
            {
                Some(slot) => slot.occupy(scan.id, state),
                None => log::debug!(
                    "No free slot on engine {} for scan {} ({})",
                    engine_id,
                    scan.id,
                    scan.stage
                ),
            }
        }
    }

    /// All slots in key order
    pub fn snapshot(&self) -> Vec<EngineSlot> {
        self.slots.values().cloned().collect()
    }

    pub fn slots(&self) -> impl Iterator<Item = &EngineSlot> {
        self.slots.values()
    }

    pub fn get(&self, key: SlotKey) -> Option<&EngineSlot> {
        self.slots.get(&key)
    }

    /// Slots currently held for one engine
    pub fn slots_for(&self, engine_id: EngineId) -> impl Iterator<Item = &EngineSlot> {
        self.slots
            .range(Self::engine_range(engine_id))
            .map(|(_, slot)| slot)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn engine_range(engine_id: EngineId) -> RangeInclusive<SlotKey> {
        SlotKey::new(engine_id, 0)..=SlotKey::new(engine_id, u32::MAX)
    }
}

/// Slot state implied by a scan stage, `None` when the scan holds no slot
pub fn engine_visible_state(stage: Stage) -> Option<SlotState> {
    if stage == Stage::Queued {
        Some(SlotState::Queued)
    } else if stage.is_scanning() {
        Some(SlotState::Scanning)
    } else {
        None
    }
}
