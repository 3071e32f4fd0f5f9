//! Fuzzing library for journal-metrics.
//!
//! This crate provides fuzzing targets for the registry and graph record
//! decoders and for period expression parsing.
//!
//! # Usage
//!
//! ```bash
//! cd crates/metrics-fuzz
//! cargo +nightly fuzz run fuzz_registry_parse -- -max_total_time=60
//! ```

pub use journal_metrics::models;
