//! Scan Duration Classifier
//!
//! Stage vocabulary of the SAST scan queue and the classification of each
//! queued scan into lifecycle-phase durations.

pub mod api;
pub mod classifier;
pub mod stage;
