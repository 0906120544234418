//! Onset detection by fusion of per-block onset-strength features.
//!
//! The engine consumes three onset-strength scores per analysis block (high
//! frequency content, complex-domain deviation and spectral flux, computed
//! upstream) and answers one question per block: does this block start a new
//! sound event?
//!
//! ## Algorithm
//!
//! ### Adaptive normalization
//!
//! Each feature keeps a running maximum `M` and a sliding history of
//! normalized values. For an incoming score `x`:
//!
//! ```text
//! if x > M > 0:   history /= x / M;  M = x
//! if x > M == 0:  M = x;  history = 1        (fresh baseline)
//! push(x / M)                                (0 while M == 0)
//! ```
//!
//! ### Fused adaptive threshold
//!
//! The enabled features are averaged slot by slot into a detection sum, values
//! below the silence threshold are clamped to zero, and the newest slot is a
//! candidate when it exceeds `median(sum) + alpha · mean(sum)`.
//!
//! ### Debouncing
//!
//! Candidates are optionally gated by a minimum gap since the last confirmed
//! onset, measured in milliseconds ([`DebounceMode::TimeBased`]) or in blocks
//! ([`DebounceMode::BufferCountBased`]).
//!
//! ## Module Organization
//!
//! - [`engine`] - The [`OnsetEngine`] driving everything per block
//! - [`channel`] - Per-feature running-maximum normalization
//! - [`window`] - Fixed-capacity sliding history
//! - [`threshold`] - Fused detection sum and threshold comparison
//! - [`statistics`] - Allocation-free median and mean
//! - [`debounce`] - Time-based and block-count debounce state machines
//! - [`params`] - Lock-free shared parameters
//! - [`config`] - Construction-time configuration
//! - [`clock`] - Timestamp sources
//! - [`batch`] - Offline processing of strength matrices
//! - [`analyzer`] - One engine per audio channel

pub mod analyzer;
pub mod batch;
pub mod channel;
pub mod clock;
pub mod config;
pub mod debounce;
pub mod engine;
pub mod params;
pub mod statistics;
pub mod threshold;
pub mod window;

#[cfg(test)]
mod tests;

pub use analyzer::OnsetAnalyzer;
pub use batch::{detect_onset_times, detect_onsets};
pub use channel::{FeatureChannel, OnsetFeature};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ChannelSetting, OnsetConfig};
pub use debounce::{DebounceDecision, DebounceMode, Debouncer};
pub use engine::OnsetEngine;
pub use params::{OnsetParameters, ParameterSnapshot};
pub use threshold::{DetectionSum, ThresholdEvaluation};
pub use window::SlidingWindow;
