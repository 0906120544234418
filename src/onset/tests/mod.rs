//! Scenario tests for the onset engine.
//!
//! Unit tests live beside each component; the tests here drive a whole
//! [`OnsetEngine`] through block sequences.

use super::{OnsetConfig, OnsetEngine};


/// Quiet level used as the steady baseline in the scenarios.
pub(crate) const QUIET: f32 = 0.01;

/// Engine with default settings and debouncing disabled.
pub(crate) fn raw_engine() -> OnsetEngine {
    OnsetEngine::new(OnsetConfig::default().with_time_threshold_enabled(false))
        .expect("default config is valid")
}

/// Feed the same strength to all three features.
pub(crate) fn feed(engine: &mut OnsetEngine, strength: f32, now_ms: f64) -> bool {
    engine.compute_block_at(strength, strength, strength, now_ms)
}
