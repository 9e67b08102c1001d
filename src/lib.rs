pub mod app;
pub mod core;
pub mod engines;
pub mod metrics;
pub mod sast;
pub mod scans;
