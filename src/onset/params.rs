//! Lock-free parameter block shared between the audio thread and a host thread.
//!
//! Every tunable is an atomic scalar accessed with `Ordering::Relaxed`: only
//! visibility is required, not ordering relative to other memory. The engine
//! takes one [`ParameterSnapshot`] at the top of each block, so a block always
//! sees a consistent set of values and an update lands on the next block at
//! the latest.

use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU32, Ordering};

use super::channel::OnsetFeature;
use super::config::{ChannelSetting, OnsetConfig};
use super::debounce::DebounceMode;
use crate::error::{OnsetError, OnsetResult, ensure_non_negative};

/// `f32` stored as its bit pattern in an [`AtomicU32`].
#[derive(Debug)]
struct AtomicF32(AtomicU32);

impl AtomicF32 {
    fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

#[derive(Debug)]
struct AtomicChannel {
    enabled: AtomicBool,
    weight: AtomicF32,
}

/// Shared, thread-safe onset engine parameters.
///
/// Obtain the engine's instance with [`OnsetEngine::parameters`](super::OnsetEngine::parameters)
/// and move the `Arc` to any thread that needs to tune the engine. Setters
/// validate their input and leave the previous value in place on error.
#[derive(Debug)]
pub struct OnsetParameters {
    silence_threshold: AtomicF32,
    alpha: AtomicF32,
    use_time_threshold: AtomicBool,
    debounce_mode: AtomicU8,
    time_threshold_ms: AtomicF32,
    buffer_num_threshold: AtomicU32,
    channels: [AtomicChannel; OnsetFeature::COUNT],
}

/// Plain copy of [`OnsetParameters`] taken once per block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterSnapshot {
    /// Silence floor for fused values.
    pub silence_threshold: f32,
    /// Weight of the mean in the adaptive threshold.
    pub alpha: f32,
    /// Whether debouncing is applied.
    pub use_time_threshold: bool,
    /// Active debounce policy.
    pub debounce_mode: DebounceMode,
    /// Time-based minimum gap in milliseconds.
    pub time_threshold_ms: f32,
    /// Block-count minimum gap.
    pub buffer_num_threshold: u32,
    /// Per-feature fusion settings.
    pub channels: [ChannelSetting; OnsetFeature::COUNT],
}

impl OnsetParameters {
    /// Build the parameter block from a configuration's tunables.
    ///
    /// The configuration is not validated here; [`OnsetEngine::new`](super::OnsetEngine::new)
    /// does that before calling this.
    pub fn from_config(config: &OnsetConfig) -> Self {
        Self {
            silence_threshold: AtomicF32::new(config.silence_threshold),
            alpha: AtomicF32::new(config.alpha),
            use_time_threshold: AtomicBool::new(config.use_time_threshold),
            debounce_mode: AtomicU8::new(config.debounce_mode.to_u8()),
            time_threshold_ms: AtomicF32::new(config.time_threshold_ms),
            buffer_num_threshold: AtomicU32::new(config.buffer_num_threshold),
            channels: config.channels.map(|setting| AtomicChannel {
                enabled: AtomicBool::new(setting.enabled),
                weight: AtomicF32::new(setting.weight),
            }),
        }
    }

    /// Read every parameter once.
    pub fn snapshot(&self) -> ParameterSnapshot {
        ParameterSnapshot {
            silence_threshold: self.silence_threshold.load(),
            alpha: self.alpha.load(),
            use_time_threshold: self.use_time_threshold.load(Ordering::Relaxed),
            debounce_mode: self.debounce_mode(),
            time_threshold_ms: self.time_threshold_ms.load(),
            buffer_num_threshold: self.buffer_num_threshold.load(Ordering::Relaxed),
            channels: OnsetFeature::ALL.map(|feature| self.channel(feature)),
        }
    }

    /// Silence floor for fused values.
    pub fn silence_threshold(&self) -> f32 {
        self.silence_threshold.load()
    }

    /// Set the silence floor. Must be finite and `>= 0`.
    pub fn set_silence_threshold(&self, threshold: f32) -> OnsetResult<()> {
        ensure_non_negative("silence_threshold", threshold).inspect_err(log_rejected)?;
        self.silence_threshold.store(threshold);
        tracing::debug!(threshold, "onset silence threshold updated");
        Ok(())
    }

    /// Weight of the mean in the adaptive threshold.
    pub fn alpha(&self) -> f32 {
        self.alpha.load()
    }

    /// Set alpha. Must be finite and `>= 0`.
    pub fn set_alpha(&self, alpha: f32) -> OnsetResult<()> {
        ensure_non_negative("alpha", alpha).inspect_err(log_rejected)?;
        self.alpha.store(alpha);
        tracing::debug!(alpha, "onset alpha updated");
        Ok(())
    }

    /// Whether debouncing is applied.
    pub fn use_time_threshold(&self) -> bool {
        self.use_time_threshold.load(Ordering::Relaxed)
    }

    /// Enable or disable debouncing.
    pub fn set_use_time_threshold(&self, enabled: bool) {
        self.use_time_threshold.store(enabled, Ordering::Relaxed);
        tracing::debug!(enabled, "onset debouncing toggled");
    }

    /// Active debounce policy.
    pub fn debounce_mode(&self) -> DebounceMode {
        DebounceMode::from_u8(self.debounce_mode.load(Ordering::Relaxed))
    }

    /// Select the debounce policy.
    pub fn set_debounce_mode(&self, mode: DebounceMode) {
        self.debounce_mode.store(mode.to_u8(), Ordering::Relaxed);
        tracing::debug!(?mode, "onset debounce mode updated");
    }

    /// Minimum gap for time-based debouncing, in milliseconds.
    pub fn time_threshold_ms(&self) -> f32 {
        self.time_threshold_ms.load()
    }

    /// Set the time-based gap. Must be finite and `>= 0`.
    pub fn set_time_threshold_ms(&self, ms: f32) -> OnsetResult<()> {
        ensure_non_negative("time_threshold_ms", ms).inspect_err(log_rejected)?;
        self.time_threshold_ms.store(ms);
        tracing::debug!(ms, "onset time threshold updated");
        Ok(())
    }

    /// Minimum gap for block-count debouncing, in blocks.
    pub fn buffer_num_threshold(&self) -> u32 {
        self.buffer_num_threshold.load(Ordering::Relaxed)
    }

    /// Set the block-count gap.
    pub fn set_buffer_num_threshold(&self, blocks: u32) {
        self.buffer_num_threshold.store(blocks, Ordering::Relaxed);
        tracing::debug!(blocks, "onset buffer count threshold updated");
    }

    /// Set alpha, the silence floor, the time-based gap and the debounce
    /// switch together.
    ///
    /// All three real values are validated before any is stored, so a
    /// rejected call changes nothing.
    pub fn set_onset_parameters(
        &self,
        alpha: f32,
        silence_threshold: f32,
        time_threshold_ms: f32,
        use_time_threshold: bool,
    ) -> OnsetResult<()> {
        ensure_non_negative("alpha", alpha)
            .and_then(|()| ensure_non_negative("silence_threshold", silence_threshold))
            .and_then(|()| ensure_non_negative("time_threshold_ms", time_threshold_ms))
            .inspect_err(log_rejected)?;

        self.alpha.store(alpha);
        self.silence_threshold.store(silence_threshold);
        self.time_threshold_ms.store(time_threshold_ms);
        self.use_time_threshold
            .store(use_time_threshold, Ordering::Relaxed);
        tracing::debug!(
            alpha,
            silence_threshold,
            time_threshold_ms,
            use_time_threshold,
            "onset parameters updated"
        );
        Ok(())
    }

    /// Fusion settings for one feature.
    pub fn channel(&self, feature: OnsetFeature) -> ChannelSetting {
        let channel = &self.channels[feature.index()];
        ChannelSetting {
            enabled: channel.enabled.load(Ordering::Relaxed),
            weight: channel.weight.load(),
        }
    }

    /// Whether a feature contributes to the detection sum.
    pub fn feature_enabled(&self, feature: OnsetFeature) -> bool {
        self.channels[feature.index()].enabled.load(Ordering::Relaxed)
    }

    /// Include or exclude a feature from the detection sum.
    pub fn set_feature_enabled(&self, feature: OnsetFeature, enabled: bool) {
        self.channels[feature.index()]
            .enabled
            .store(enabled, Ordering::Relaxed);
        tracing::debug!(%feature, enabled, "onset feature toggled");
    }

    /// Fusion weight of a feature.
    pub fn feature_weight(&self, feature: OnsetFeature) -> f32 {
        self.channels[feature.index()].weight.load()
    }

    /// Set a feature's fusion weight. Must be finite and `>= 0`.
    pub fn set_feature_weight(&self, feature: OnsetFeature, weight: f32) -> OnsetResult<()> {
        ensure_non_negative("weight", weight).inspect_err(log_rejected)?;
        self.channels[feature.index()].weight.store(weight);
        tracing::debug!(%feature, weight, "onset feature weight updated");
        Ok(())
    }
}

impl Default for OnsetParameters {
    fn default() -> Self {
        Self::from_config(&OnsetConfig::default())
    }
}

fn log_rejected(err: &OnsetError) {
    tracing::warn!(%err, "rejected onset parameter update");
}
