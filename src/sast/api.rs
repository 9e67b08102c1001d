//! SAST API
//!
//! Public surface of the SAST collaborator. Other modules import from here
//! rather than from the internal modules.

pub use crate::sast::client::{SastApi, SastClient, SastSettings};
pub use crate::sast::error::{SastError, SastResult};
pub use crate::sast::token::{TokenManager, DEFAULT_TOKEN_TTL_SECS};
pub use crate::sast::types::{
    decode_records, validate_records, EngineDescriptor, EngineId, EngineRecord, ScanId,
    ScanRecord, ScanSnapshot, DEFAULT_MAX_LOC, DEFAULT_MIN_LOC, UNRESOLVED_ENGINE_ID,
};
