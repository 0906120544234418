//! Fused detection sum and adaptive threshold comparison.
//!
//! Slot `i` of the detection sum is the weighted average of the enabled
//! channels' normalized values at history slot `i`:
//!
//! ```text
//! sum[i] = Σ w_c · x_c[i] / Σ w_c        (enabled channels c)
//! sum[i] = 0                              if Σ w_c == 0 or sum[i] < silence_threshold
//! ```
//!
//! The whole window is recomputed every block, since a new running maximum may
//! rescale any historical value. The newest slot is an onset candidate when
//!
//! ```text
//! sum[N-1] > median(sum) + alpha · mean(sum)
//! ```

use super::channel::FeatureChannel;
use super::params::ParameterSnapshot;
use super::statistics::{mean, median_mean_threshold, median_with_scratch};

/// Statistics of one threshold evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ThresholdEvaluation {
    /// Median of the detection sum window.
    pub median: f32,
    /// Mean of the detection sum window.
    pub mean: f32,
    /// `median + alpha * mean`.
    pub threshold: f32,
    /// Fused value of the newest slot.
    pub current: f32,
    /// Whether `current > threshold`.
    pub is_candidate: bool,
}

/// Fixed-capacity fused detection buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionSum {
    values: Box<[f32]>,
    scratch: Box<[f32]>,
}

impl DetectionSum {
    /// Create a zeroed buffer with `len` slots.
    pub fn new(len: usize) -> Self {
        Self {
            values: vec![0.0; len].into_boxed_slice(),
            scratch: vec![0.0; len].into_boxed_slice(),
        }
    }

    /// Number of slots.
    pub const fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the buffer has no slots.
    pub const fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Fused values, oldest first.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Zero every slot.
    pub fn clear(&mut self) {
        self.values.fill(0.0);
    }

    /// Recompute every slot from the channel histories.
    pub fn recompute(&mut self, channels: &[FeatureChannel], params: &ParameterSnapshot) {
        let mut total_weight = 0.0f32;
        for channel in channels {
            let setting = params.channels[channel.feature().index()];
            if setting.enabled {
                total_weight += setting.weight;
            }
        }

        for (i, slot) in self.values.iter_mut().enumerate() {
            if !(total_weight > 0.0 && total_weight.is_finite()) {
                *slot = 0.0;
                continue;
            }

            let mut sum = 0.0f32;
            for channel in channels {
                let setting = params.channels[channel.feature().index()];
                if setting.enabled {
                    sum += setting.weight * channel.value_at(i);
                }
            }
            let fused = sum / total_weight;

            *slot = if fused.is_finite() && fused >= params.silence_threshold {
                fused
            } else {
                0.0
            };
        }
    }

    /// Compare the newest slot against `median + alpha * mean` of the window.
    pub fn evaluate(&mut self, alpha: f32) -> ThresholdEvaluation {
        let Some(&current) = self.values.last() else {
            return ThresholdEvaluation::default();
        };

        let median = median_with_scratch(&self.values, &mut self.scratch);
        let mean = mean(&self.values);
        let threshold = median_mean_threshold(median, mean, alpha);

        ThresholdEvaluation {
            median,
            mean,
            threshold,
            current,
            is_candidate: current > threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onset::channel::OnsetFeature;
    use crate::onset::config::OnsetConfig;
    use crate::onset::params::OnsetParameters;
    use approx_eq::assert_approx_eq;

    fn channels_with(values: [&[f32]; 3], len: usize) -> Vec<FeatureChannel> {
        OnsetFeature::ALL
            .iter()
            .zip(values)
            .map(|(&feature, inputs)| {
                let mut channel = FeatureChannel::new(feature, len);
                for &raw in inputs {
                    channel.push(raw);
                }
                channel
            })
            .collect()
    }

    fn snapshot(config: &OnsetConfig) -> ParameterSnapshot {
        OnsetParameters::from_config(config).snapshot()
    }

    #[test]
    fn test_sum_averages_enabled_channels() {
        let channels = channels_with([&[1.0, 0.5], &[1.0, 1.0], &[1.0, 0.0]], 4);
        let mut sum = DetectionSum::new(4);
        sum.recompute(&channels, &snapshot(&OnsetConfig::new()));

        assert_eq!(sum.len(), 4);
        assert_approx_eq!(sum.values()[3] as f64, 0.5, 1e-6);
        assert_approx_eq!(sum.values()[0] as f64, 1.0, 1e-6);
    }

    #[test]
    fn test_single_enabled_channel_is_passed_through() {
        let channels = channels_with([&[1.0, 0.3, 0.6], &[1.0, 0.9, 0.1], &[1.0, 0.2, 0.8]], 4);
        let config = OnsetConfig::new()
            .with_feature_enabled(OnsetFeature::Hfc, false)
            .with_feature_enabled(OnsetFeature::Flux, false);
        let mut sum = DetectionSum::new(4);
        sum.recompute(&channels, &snapshot(&config));

        let complex = channels[OnsetFeature::Complex.index()].history().to_vec();
        for (fused, expected) in sum.values().iter().zip(complex) {
            assert_approx_eq!(*fused as f64, expected as f64, 1e-6);
        }
    }

    #[test]
    fn test_weights_bias_the_average() {
        let channels = channels_with([&[1.0], &[0.0], &[0.0]], 2);
        let config = OnsetConfig::new().with_feature_weight(OnsetFeature::Hfc, 2.0);
        let mut sum = DetectionSum::new(2);
        sum.recompute(&channels, &snapshot(&config));

        // (2 * 1.0 + 0 + 0) / 4
        assert_approx_eq!(sum.values()[1] as f64, 0.5, 1e-6);
    }

    #[test]
    fn test_silence_clamp_is_exact_zero() {
        let channels = channels_with([&[1.0, 0.01], &[1.0, 0.01], &[1.0, 0.01]], 3);
        let mut sum = DetectionSum::new(3);
        sum.recompute(&channels, &snapshot(&OnsetConfig::new()));

        assert_eq!(sum.values()[2], 0.0);
        assert_eq!(sum.values()[2].to_bits(), 0.0f32.to_bits());
        assert_eq!(sum.values()[1], 1.0);
    }

    #[test]
    fn test_no_enabled_channels_gives_zero_sum() {
        let channels = channels_with([&[1.0], &[1.0], &[1.0]], 3);
        let config = OnsetConfig::new()
            .with_feature_enabled(OnsetFeature::Hfc, false)
            .with_feature_enabled(OnsetFeature::Complex, false)
            .with_feature_enabled(OnsetFeature::Flux, false);
        let mut sum = DetectionSum::new(3);
        sum.recompute(&channels, &snapshot(&config));
        assert!(sum.values().iter().all(|&v| v == 0.0));

        let evaluation = sum.evaluate(0.1);
        assert!(!evaluation.is_candidate);
        assert_eq!(evaluation.threshold, 0.0);
    }

    #[test]
    fn test_zero_weights_give_zero_sum() {
        let channels = channels_with([&[1.0], &[1.0], &[1.0]], 2);
        let mut config = OnsetConfig::new();
        for feature in OnsetFeature::ALL {
            config = config.with_feature_weight(feature, 0.0);
        }
        let mut sum = DetectionSum::new(2);
        sum.recompute(&channels, &snapshot(&config));
        assert!(sum.values().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_evaluate_flags_spike_over_quiet_window() {
        let mut sum = DetectionSum::new(4);
        sum.values.copy_from_slice(&[0.0, 0.0, 0.0, 1.0]);
        let evaluation = sum.evaluate(0.1);

        assert_eq!(evaluation.median, 0.0);
        assert_approx_eq!(evaluation.mean as f64, 0.25, 1e-6);
        assert_approx_eq!(evaluation.threshold as f64, 0.025, 1e-6);
        assert!(evaluation.is_candidate);
        // The scratch sort must not disturb time order.
        assert_eq!(sum.values(), &[0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_evaluate_rejects_steady_window() {
        let mut sum = DetectionSum::new(4);
        sum.values.fill(1.0);
        let evaluation = sum.evaluate(0.1);
        assert_approx_eq!(evaluation.threshold as f64, 1.1, 1e-6);
        assert!(!evaluation.is_candidate);
    }

    #[test]
    fn test_equal_to_threshold_is_not_a_candidate() {
        let mut sum = DetectionSum::new(2);
        sum.values.fill(0.5);
        assert!(!sum.evaluate(0.0).is_candidate);
    }

    #[test]
    fn test_clear_zeroes_slots() {
        let mut sum = DetectionSum::new(3);
        sum.values.fill(0.4);
        sum.clear();
        assert_eq!(sum.values(), &[0.0; 3]);
    }
}
