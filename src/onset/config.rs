//! Construction-time configuration for the onset engine.

use serde::{Deserialize, Serialize};

use super::channel::OnsetFeature;
use super::debounce::DebounceMode;
use crate::error::{OnsetError, OnsetResult, ensure_non_negative};

/// Default number of slots in each detection history.
pub const DEFAULT_DETECTION_BUFFER_SIZE: usize = 32;
/// Default floor below which the fused detection value is treated as silence.
pub const DEFAULT_SILENCE_THRESHOLD: f32 = 0.02;
/// Default weight of the mean term in the adaptive threshold.
pub const DEFAULT_ALPHA: f32 = 0.1;
/// Default minimum gap between onsets in time-based mode, in milliseconds.
pub const DEFAULT_TIME_THRESHOLD_MS: f32 = 100.0;
/// Default minimum gap between onsets in block-count mode, in blocks.
pub const DEFAULT_BUFFER_NUM_THRESHOLD: u32 = 7;

/// Per-feature fusion settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelSetting {
    /// Whether the feature contributes to the detection sum.
    pub enabled: bool,
    /// Relative weight of the feature in the detection sum (>= 0).
    pub weight: f32,
}

impl ChannelSetting {
    /// Enabled with unit weight.
    pub const fn new() -> Self {
        Self {
            enabled: true,
            weight: 1.0,
        }
    }
}

impl Default for ChannelSetting {
    fn default() -> Self {
        Self::new()
    }
}

/// Onset engine configuration.
///
/// `detection_buffer_size`, `sample_rate` and `frame_size` are fixed once an
/// engine is built. The remaining fields seed the engine's shared parameters and
/// can be changed later through [`OnsetEngine`](super::OnsetEngine) or its
/// [`OnsetParameters`](super::OnsetParameters) handle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OnsetConfig {
    /// Number of blocks kept in each detection history (> 0).
    pub detection_buffer_size: usize,
    /// Sample rate of the analysed audio in Hz (> 0).
    pub sample_rate: u32,
    /// Samples per analysis block (> 0).
    pub frame_size: usize,
    /// Fused values below this floor are forced to exactly zero.
    pub silence_threshold: f32,
    /// Weight of the window mean in `threshold = median + alpha * mean`.
    pub alpha: f32,
    /// Whether confirmed onsets are debounced.
    pub use_time_threshold: bool,
    /// Which debounce policy is active.
    pub debounce_mode: DebounceMode,
    /// Minimum gap in milliseconds for [`DebounceMode::TimeBased`].
    pub time_threshold_ms: f32,
    /// Minimum gap in blocks for [`DebounceMode::BufferCountBased`].
    pub buffer_num_threshold: u32,
    /// Fusion settings indexed by [`OnsetFeature::index`].
    pub channels: [ChannelSetting; OnsetFeature::COUNT],
}

impl OnsetConfig {
    /// Create a configuration with the default settings:
    /// - 32-block detection history
    /// - 44.1 kHz, 512-sample blocks (about 11.6 ms per block)
    /// - silence threshold 0.02, alpha 0.1
    /// - time-based debouncing at 100 ms (7 blocks in block-count mode)
    /// - all three features enabled with equal weight
    pub const fn new() -> Self {
        Self {
            detection_buffer_size: DEFAULT_DETECTION_BUFFER_SIZE,
            sample_rate: 44_100,
            frame_size: 512,
            silence_threshold: DEFAULT_SILENCE_THRESHOLD,
            alpha: DEFAULT_ALPHA,
            use_time_threshold: true,
            debounce_mode: DebounceMode::TimeBased,
            time_threshold_ms: DEFAULT_TIME_THRESHOLD_MS,
            buffer_num_threshold: DEFAULT_BUFFER_NUM_THRESHOLD,
            channels: [ChannelSetting::new(); OnsetFeature::COUNT],
        }
    }

    /// Set the detection history length.
    pub const fn with_detection_buffer_size(mut self, size: usize) -> Self {
        self.detection_buffer_size = size;
        self
    }

    /// Set the sample rate and block size.
    pub const fn with_block_format(mut self, sample_rate: u32, frame_size: usize) -> Self {
        self.sample_rate = sample_rate;
        self.frame_size = frame_size;
        self
    }

    /// Set the silence threshold.
    pub const fn with_silence_threshold(mut self, threshold: f32) -> Self {
        self.silence_threshold = threshold;
        self
    }

    /// Set alpha.
    pub const fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    /// Enable or disable debouncing.
    pub const fn with_time_threshold_enabled(mut self, enabled: bool) -> Self {
        self.use_time_threshold = enabled;
        self
    }

    /// Select the debounce policy.
    pub const fn with_debounce_mode(mut self, mode: DebounceMode) -> Self {
        self.debounce_mode = mode;
        self
    }

    /// Set the time-based debounce gap.
    pub const fn with_time_threshold_ms(mut self, ms: f32) -> Self {
        self.time_threshold_ms = ms;
        self
    }

    /// Set the block-count debounce gap.
    pub const fn with_buffer_num_threshold(mut self, blocks: u32) -> Self {
        self.buffer_num_threshold = blocks;
        self
    }

    /// Enable or disable one feature.
    pub const fn with_feature_enabled(mut self, feature: OnsetFeature, enabled: bool) -> Self {
        self.channels[feature.index()].enabled = enabled;
        self
    }

    /// Set the fusion weight of one feature.
    pub const fn with_feature_weight(mut self, feature: OnsetFeature, weight: f32) -> Self {
        self.channels[feature.index()].weight = weight;
        self
    }

    /// Settings for one feature.
    pub const fn channel(&self, feature: OnsetFeature) -> ChannelSetting {
        self.channels[feature.index()]
    }

    /// Duration of one analysis block in milliseconds.
    pub fn block_duration_ms(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frame_size as f64 * 1000.0 / f64::from(self.sample_rate)
    }

    /// Convert a block index to seconds from the start of the stream.
    pub fn block_to_seconds(&self, block_index: usize) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        block_index as f64 * self.frame_size as f64 / f64::from(self.sample_rate)
    }

    /// Number of whole blocks needed to span at least `ms` milliseconds.
    ///
    /// Useful for deriving a block-count debounce gap from a time gap.
    pub fn ms_to_blocks(&self, ms: f32) -> u32 {
        let block_ms = self.block_duration_ms();
        if block_ms <= 0.0 || !ms.is_finite() || ms <= 0.0 {
            return 0;
        }
        (f64::from(ms) / block_ms).ceil().min(f64::from(u32::MAX)) as u32
    }

    /// Validate the configuration.
    pub fn validate(&self) -> OnsetResult<()> {
        if self.detection_buffer_size == 0 {
            return Err(OnsetError::invalid_parameter(
                "detection_buffer_size",
                "must be greater than 0",
            ));
        }
        if self.sample_rate == 0 {
            return Err(OnsetError::invalid_parameter(
                "sample_rate",
                "must be greater than 0",
            ));
        }
        if self.frame_size == 0 {
            return Err(OnsetError::invalid_parameter(
                "frame_size",
                "must be greater than 0",
            ));
        }
        ensure_non_negative("silence_threshold", self.silence_threshold)?;
        ensure_non_negative("alpha", self.alpha)?;
        ensure_non_negative("time_threshold_ms", self.time_threshold_ms)?;
        for setting in &self.channels {
            ensure_non_negative("weight", setting.weight)?;
        }
        Ok(())
    }
}

impl Default for OnsetConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx_eq::assert_approx_eq;

    #[test]
    fn test_default_config_is_valid() {
        let config = OnsetConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.detection_buffer_size, 32);
        assert_eq!(config.silence_threshold, 0.02);
        assert_eq!(config.alpha, 0.1);
        assert_eq!(config.time_threshold_ms, 100.0);
        assert_eq!(config.buffer_num_threshold, 7);
        assert!(config.use_time_threshold);
        assert_eq!(config.debounce_mode, DebounceMode::TimeBased);
        assert!(config.channels.iter().all(|c| c.enabled && c.weight == 1.0));
    }

    #[test]
    fn test_config_validation() {
        let err = OnsetConfig::new().with_detection_buffer_size(0).validate().unwrap_err();
        assert_eq!(err.parameter(), Some("detection_buffer_size"));

        let err = OnsetConfig::new().with_block_format(0, 512).validate().unwrap_err();
        assert_eq!(err.parameter(), Some("sample_rate"));

        let err = OnsetConfig::new().with_block_format(44_100, 0).validate().unwrap_err();
        assert_eq!(err.parameter(), Some("frame_size"));

        let err = OnsetConfig::new().with_silence_threshold(-0.1).validate().unwrap_err();
        assert_eq!(err.parameter(), Some("silence_threshold"));

        let err = OnsetConfig::new().with_alpha(f32::NAN).validate().unwrap_err();
        assert_eq!(err.parameter(), Some("alpha"));

        let err = OnsetConfig::new().with_time_threshold_ms(-5.0).validate().unwrap_err();
        assert_eq!(err.parameter(), Some("time_threshold_ms"));

        let err = OnsetConfig::new()
            .with_feature_weight(OnsetFeature::Flux, -1.0)
            .validate()
            .unwrap_err();
        assert_eq!(err.parameter(), Some("weight"));
    }

    #[test]
    fn test_block_timing() {
        let config = OnsetConfig::new();
        assert_approx_eq!(config.block_duration_ms(), 11.609977, 1e-5);
        assert_approx_eq!(config.block_to_seconds(86), 86.0 * 512.0 / 44_100.0, 1e-12);
        // 100 ms at 11.6 ms per block needs 9 blocks.
        assert_eq!(config.ms_to_blocks(100.0), 9);
        assert_eq!(config.ms_to_blocks(0.0), 0);
    }

    #[test]
    fn test_block_to_seconds_does_not_overflow() {
        let config = OnsetConfig::new().with_block_format(48_000, usize::MAX / 2);
        let seconds = config.block_to_seconds(usize::MAX / 2);
        assert!(seconds.is_finite());
        assert!(seconds > 1e10);
    }

    #[test]
    fn test_partial_config_deserializes_with_defaults() {
        let json = r#"{ "alpha": 0.25, "debounce_mode": "BufferCountBased",
                        "channels": [{ "enabled": false }, {}, { "weight": 2.0 }] }"#;
        let config: OnsetConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.alpha, 0.25);
        assert_eq!(config.debounce_mode, DebounceMode::BufferCountBased);
        assert_eq!(config.detection_buffer_size, 32);
        assert!(!config.channel(OnsetFeature::Hfc).enabled);
        assert!(config.channel(OnsetFeature::Complex).enabled);
        assert_eq!(config.channel(OnsetFeature::Flux).weight, 2.0);
        assert!(config.validate().is_ok());
    }
}
