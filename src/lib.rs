// Correctness and logic
#![warn(clippy::unit_cmp)] // Detects comparing unit types
#![warn(clippy::match_same_arms)]
// Duplicate match arms

// Performance-focused
#![warn(clippy::inefficient_to_string)] // `format!("{}", x)` vs `x.to_string()`
#![warn(clippy::map_clone)] // Cloning inside `map()` unnecessarily
#![warn(clippy::unnecessary_to_owned)] // Detects redundant `.to_owned()` or `.clone()`
#![warn(clippy::needless_collect)] // Avoids `.collect().iter()` chains

// Style and idiomatic Rust
#![warn(clippy::redundant_clone)] // Detects unnecessary `.clone()`
#![warn(clippy::needless_return)] // Avoids `return` at the end of functions
#![warn(clippy::manual_map)] // Use `.map()` instead of manual `match`
#![warn(clippy::unwrap_used)] // Avoids using `unwrap()`

// Maintainability
#![warn(clippy::missing_panics_doc)] // Docs for functions that might panic
#![deny(missing_docs)] // Documentation is a must for release

//! # onset_engine
//!
//! A real-time onset detector that fuses three per-block onset-strength
//! features (high-frequency content, complex-domain deviation and spectral
//! flux) into one onset/no-onset decision per analysis block.
//!
//! ## Overview
//!
//! Each feature is normalized against its own running maximum and kept in a
//! short sliding history. The histories are averaged into a detection sum, the
//! newest fused value is compared against `median + alpha * mean` of the
//! window, and confirmed onsets can be debounced by wall-clock time or by
//! block count.
//!
//! The features themselves are computed upstream; this crate only consumes
//! three non-negative scalars per block.
//!
//! ## Real-time Use
//!
//! - [`OnsetEngine::compute_block`] never allocates, locks or fails.
//! - Tunable parameters live in an [`OnsetParameters`] block of atomics that a
//!   host or UI thread can update through [`OnsetEngine::parameters`]. The
//!   engine reads them once per block.
//!
//! ## Error Handling
//!
//! Configuration mistakes are rejected up front:
//!
//! ```rust
//! use onset_engine::{OnsetConfig, OnsetEngine, OnsetError};
//!
//! let result = OnsetEngine::new(OnsetConfig::new().with_detection_buffer_size(0));
//!
//! match result {
//!     Ok(_) => unreachable!(),
//!     Err(OnsetError::InvalidParameter { parameter, .. }) => {
//!         assert_eq!(parameter, "detection_buffer_size")
//!     }
//!     Err(other) => panic!("unexpected error: {other}"),
//! }
//! ```
//!
//! ## Quick Start
//!
//! ### Streaming
//!
//! ```rust
//! use onset_engine::{DebounceMode, OnsetConfig, OnsetEngine};
//!
//! # fn example() -> onset_engine::OnsetResult<()> {
//! let config = OnsetConfig::default()
//!     .with_block_format(48_000, 256)
//!     .with_debounce_mode(DebounceMode::BufferCountBased)
//!     .with_buffer_num_threshold(10);
//! let mut engine = OnsetEngine::new(config)?;
//!
//! // Called once per block from the audio thread.
//! let is_onset = engine.compute_block(0.12, 0.08, 0.10);
//! assert!(!is_onset);
//!
//! // Tuned from elsewhere.
//! let params = engine.parameters();
//! params.set_alpha(0.2)?;
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ### Offline
//!
//! ```rust
//! use ndarray::Array2;
//! use onset_engine::{OnsetConfig, detect_onset_times};
//!
//! let strengths = Array2::<f32>::from_shape_fn((64, 3), |(block, _)| {
//!     if block == 40 { 0.9 } else { 0.01 }
//! });
//! let times = detect_onset_times(strengths.view(), &OnsetConfig::default()).unwrap();
//! assert_eq!(times.len(), 1);
//! ```
//!
//! ## License
//!
//! MIT License

mod error;

pub mod onset;

pub use crate::error::{OnsetError, OnsetResult};

pub use crate::onset::{
    ChannelSetting, Clock, DebounceDecision, DebounceMode, Debouncer, DetectionSum,
    FeatureChannel, ManualClock, OnsetAnalyzer, OnsetConfig, OnsetEngine, OnsetFeature, OnsetParameters,
    ParameterSnapshot, SlidingWindow, SystemClock, ThresholdEvaluation, detect_onset_times,
    detect_onsets,
};
