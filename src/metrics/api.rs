//! Metrics public API

pub use crate::metrics::collector::Collector;
pub use crate::metrics::emitter::{
    MetricsEmitter, ENGINES_METRIC, SCANS_FULL_METRIC, SCANS_PULLING_METRIC,
    SCANS_QUEUED_METRIC, SCANS_SCANNING_METRIC, TEXT_CONTENT_TYPE,
};
pub use crate::metrics::error::{MetricsError, MetricsResult};
pub use crate::metrics::server::{router, serve};
