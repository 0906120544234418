//! Temporal debouncing of raw onset candidates.
//!
//! Two mutually exclusive policies are supported:
//!
//! - [`DebounceMode::TimeBased`]: a candidate is confirmed only if more than
//!   `time_threshold_ms` milliseconds have elapsed since the last confirmed onset.
//! - [`DebounceMode::BufferCountBased`]: a candidate is confirmed only if more
//!   than `buffer_num_threshold` blocks have elapsed since the last confirmed
//!   onset, counted by a block counter that advances once per processed block
//!   while this mode is selected.
//!
//! The very first candidate seen by either policy is always confirmed. Each
//! policy keeps its own marker; switching modes leaves the other one untouched.

use serde::{Deserialize, Serialize};

/// Debounce policy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DebounceMode {
    /// Minimum wall-clock gap between confirmed onsets.
    #[default]
    TimeBased,
    /// Minimum number of analysis blocks between confirmed onsets.
    BufferCountBased,
}

impl DebounceMode {
    pub(crate) const fn to_u8(self) -> u8 {
        match self {
            DebounceMode::TimeBased => 0,
            DebounceMode::BufferCountBased => 1,
        }
    }

    pub(crate) const fn from_u8(raw: u8) -> Self {
        match raw {
            1 => DebounceMode::BufferCountBased,
            _ => DebounceMode::TimeBased,
        }
    }
}

/// Outcome of gating one raw candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceDecision {
    /// The candidate is reported as an onset.
    Confirmed,
    /// The candidate fell inside the minimum gap and is dropped.
    Suppressed,
}

impl DebounceDecision {
    /// Returns `true` for [`DebounceDecision::Confirmed`].
    pub const fn is_confirmed(self) -> bool {
        matches!(self, DebounceDecision::Confirmed)
    }
}

/// State for both debounce policies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Debouncer {
    last_onset_ms: Option<f64>,
    last_onset_block: Option<u64>,
    block_counter: u64,
}

impl Debouncer {
    /// Create a debouncer that has never confirmed an onset.
    pub const fn new() -> Self {
        Self {
            last_onset_ms: None,
            last_onset_block: None,
            block_counter: 0,
        }
    }

    /// Timestamp of the last onset confirmed in time-based mode.
    pub const fn last_onset_ms(&self) -> Option<f64> {
        self.last_onset_ms
    }

    /// Block index of the last onset confirmed in block-count mode.
    pub const fn last_onset_block(&self) -> Option<u64> {
        self.last_onset_block
    }

    /// Current value of the block counter.
    pub const fn block_counter(&self) -> u64 {
        self.block_counter
    }

    /// Gate a raw candidate under the time-based policy.
    pub fn gate_time(&mut self, now_ms: f64, min_gap_ms: f32) -> DebounceDecision {
        let confirmed = match self.last_onset_ms {
            None => true,
            Some(last) => now_ms - last > f64::from(min_gap_ms),
        };
        if confirmed {
            self.last_onset_ms = Some(now_ms);
            DebounceDecision::Confirmed
        } else {
            DebounceDecision::Suppressed
        }
    }

    /// Gate a raw candidate under the block-count policy, at the current counter value.
    pub fn gate_blocks(&mut self, min_gap_blocks: u32) -> DebounceDecision {
        let confirmed = match self.last_onset_block {
            None => true,
            Some(last) => self.block_counter.saturating_sub(last) > u64::from(min_gap_blocks),
        };
        if confirmed {
            self.last_onset_block = Some(self.block_counter);
            DebounceDecision::Confirmed
        } else {
            DebounceDecision::Suppressed
        }
    }

    /// Gate a raw candidate with the given policy.
    pub fn gate(
        &mut self,
        mode: DebounceMode,
        now_ms: f64,
        min_gap_ms: f32,
        min_gap_blocks: u32,
    ) -> DebounceDecision {
        match mode {
            DebounceMode::TimeBased => self.gate_time(now_ms, min_gap_ms),
            DebounceMode::BufferCountBased => self.gate_blocks(min_gap_blocks),
        }
    }

    /// Advance the block counter by one block.
    pub fn advance_block(&mut self) {
        self.block_counter = self.block_counter.wrapping_add(1);
    }

    /// Zero the block counter and forget the block marker that was relative to it.
    ///
    /// The time-based marker is kept: wall-clock time does not restart.
    pub fn reset_blocks(&mut self) {
        self.block_counter = 0;
        self.last_onset_block = None;
    }
}
