//! Collector and endpoint tests
