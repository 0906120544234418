//! Per-feature adaptive normalization.
//!
//! Each [`FeatureChannel`] tracks the running maximum of one onset-strength
//! feature and keeps the normalized history of that feature. When a new maximum
//! is observed the whole history is rescaled, so every stored value stays on a
//! `[0, 1]` scale relative to the current dynamic range rather than the one in
//! force when it was recorded.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::window::SlidingWindow;

/// The onset-strength features fused by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OnsetFeature {
    /// High-frequency content.
    Hfc,
    /// Complex-domain deviation.
    Complex,
    /// Spectral flux.
    Flux,
}

impl OnsetFeature {
    /// All features in channel order.
    pub const ALL: [OnsetFeature; 3] = [OnsetFeature::Hfc, OnsetFeature::Complex, OnsetFeature::Flux];

    /// Number of fused features.
    pub const COUNT: usize = 3;

    /// Stable channel index (0 = HFC, 1 = complex, 2 = flux).
    pub const fn index(self) -> usize {
        match self {
            OnsetFeature::Hfc => 0,
            OnsetFeature::Complex => 1,
            OnsetFeature::Flux => 2,
        }
    }

    /// Short lowercase name.
    pub const fn name(self) -> &'static str {
        match self {
            OnsetFeature::Hfc => "hfc",
            OnsetFeature::Complex => "complex",
            OnsetFeature::Flux => "flux",
        }
    }
}

impl fmt::Display for OnsetFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Running-maximum normalizer plus sliding history for one feature.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureChannel {
    feature: OnsetFeature,
    running_max: f32,
    history: SlidingWindow,
}

impl FeatureChannel {
    /// Create a channel with a zeroed history of `history_len` slots.
    pub fn new(feature: OnsetFeature, history_len: usize) -> Self {
        Self {
            feature,
            running_max: 0.0,
            history: SlidingWindow::new(history_len),
        }
    }

    /// The feature this channel normalizes.
    pub const fn feature(&self) -> OnsetFeature {
        self.feature
    }

    /// Current running maximum. Zero until the first nonzero sample.
    pub const fn running_max(&self) -> f32 {
        self.running_max
    }

    /// Normalized history, oldest first.
    pub const fn history(&self) -> &SlidingWindow {
        &self.history
    }

    /// Normalized value at history slot `index`, or `0.0` past the end.
    pub fn value_at(&self, index: usize) -> f32 {
        self.history.get(index).unwrap_or(0.0)
    }

    /// Normalize `raw`, push it into the history and return the normalized value.
    ///
    /// Negative and non-finite inputs are treated as silence. The first nonzero
    /// sample after construction or [`reset`](Self::reset) becomes the running
    /// maximum and re-baselines the history: every slot is set to `1.0`, since
    /// values recorded against a zero maximum carry no scale information.
    /// The returned value is always in `[0, 1]`.
    pub fn push(&mut self, raw: f32) -> f32 {
        let incoming = sanitize(raw);

        if incoming > self.running_max {
            if self.running_max > 0.0 {
                // old / new is below 1 and can only underflow toward 0
                let factor = self.running_max / incoming;
                self.running_max = incoming;
                self.history.rescale(factor);
            } else {
                self.running_max = incoming;
                self.history.fill(1.0);
            }
        }

        let normalized = if self.running_max > 0.0 {
            (incoming / self.running_max).clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.history.push(normalized);
        normalized
    }

    /// Zero the running maximum and the history.
    pub fn reset(&mut self) {
        self.running_max = 0.0;
        self.history.clear();
    }
}

fn sanitize(raw: f32) -> f32 {
    if raw.is_finite() && raw > 0.0 { raw } else { 0.0 }
}
