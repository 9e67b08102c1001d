//! Engine slot cache API
//!
//! Public surface of the engines module.

pub use crate::engines::cache::{engine_visible_state, EngineSlotCache};
pub use crate::engines::slot::{EngineSlot, SlotKey, SlotState};
