//! The onset engine: adaptive normalization, fused thresholding and debouncing.

use std::sync::Arc;

use super::channel::{FeatureChannel, OnsetFeature};
use super::clock::{Clock, SystemClock};
use super::config::OnsetConfig;
use super::debounce::{DebounceMode, Debouncer};
use super::params::{OnsetParameters, ParameterSnapshot};
use super::threshold::{DetectionSum, ThresholdEvaluation};
use crate::error::OnsetResult;

/// Block-by-block onset detector fusing HFC, complex-domain and flux strengths.
///
/// Drive it from one thread with [`compute_block`](Self::compute_block), once
/// per analysis block. All buffers are sized at construction; processing a
/// block never allocates, locks or fails. Tunable parameters live in a shared
/// [`OnsetParameters`] block that other threads may update at any time through
/// [`parameters`](Self::parameters).
///
/// # Example
///
/// ```rust
/// use onset_engine::{OnsetConfig, OnsetEngine};
///
/// # fn example() -> onset_engine::OnsetResult<()> {
/// let mut engine = OnsetEngine::new(OnsetConfig::default().with_time_threshold_enabled(false))?;
///
/// let mut onsets = Vec::new();
/// for block in 0..40 {
///     let strength = if block == 20 { 1.0 } else { 0.01 };
///     if engine.compute_block(strength, strength, strength) {
///         onsets.push(block);
///     }
/// }
/// assert_eq!(onsets, vec![20]);
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
#[derive(Debug)]
pub struct OnsetEngine<C: Clock = SystemClock> {
    config: OnsetConfig,
    params: Arc<OnsetParameters>,
    channels: [FeatureChannel; OnsetFeature::COUNT],
    detection_sum: DetectionSum,
    debouncer: Debouncer,
    clock: C,
    last_evaluation: ThresholdEvaluation,
    value: bool,
}

impl OnsetEngine<SystemClock> {
    /// Build an engine that timestamps blocks with a [`SystemClock`].
    ///
    /// # Errors
    ///
    /// Returns [`OnsetError::InvalidParameter`](crate::OnsetError::InvalidParameter)
    /// if the configuration does not validate.
    pub fn new(config: OnsetConfig) -> OnsetResult<Self> {
        Self::with_clock(config, SystemClock::new())
    }
}

impl<C: Clock> OnsetEngine<C> {
    /// Build an engine that reads time from `clock`.
    ///
    /// # Errors
    ///
    /// Returns [`OnsetError::InvalidParameter`](crate::OnsetError::InvalidParameter)
    /// if the configuration does not validate.
    pub fn with_clock(config: OnsetConfig, clock: C) -> OnsetResult<Self> {
        config.validate()?;

        let size = config.detection_buffer_size;
        tracing::debug!(
            detection_buffer_size = size,
            sample_rate = config.sample_rate,
            frame_size = config.frame_size,
            "creating onset engine"
        );

        Ok(Self {
            params: Arc::new(OnsetParameters::from_config(&config)),
            channels: OnsetFeature::ALL.map(|feature| FeatureChannel::new(feature, size)),
            detection_sum: DetectionSum::new(size),
            debouncer: Debouncer::new(),
            clock,
            last_evaluation: ThresholdEvaluation::default(),
            value: false,
            config,
        })
    }

    /// Process one block, timestamped by the engine's clock.
    ///
    /// Returns `true` if the block is judged to contain an onset.
    pub fn compute_block(&mut self, hfc: f32, complex: f32, flux: f32) -> bool {
        let now_ms = self.clock.now_ms();
        self.compute_block_at(hfc, complex, flux, now_ms)
    }

    /// Process one block with an explicit timestamp in milliseconds.
    ///
    /// The timestamp is only consulted by time-based debouncing.
    pub fn compute_block_at(&mut self, hfc: f32, complex: f32, flux: f32, now_ms: f64) -> bool {
        let params = self.params.snapshot();

        let is_candidate = self.evaluate_candidate([hfc, complex, flux], &params);

        self.value = if is_candidate && params.use_time_threshold {
            let decision = self.debouncer.gate(
                params.debounce_mode,
                now_ms,
                params.time_threshold_ms,
                params.buffer_num_threshold,
            );
            tracing::trace!(
                ?decision,
                mode = ?params.debounce_mode,
                now_ms,
                block = self.debouncer.block_counter(),
                "onset candidate gated"
            );
            decision.is_confirmed()
        } else {
            is_candidate
        };

        if params.debounce_mode == DebounceMode::BufferCountBased {
            self.debouncer.advance_block();
        }

        self.value
    }

    fn evaluate_candidate(
        &mut self,
        strengths: [f32; OnsetFeature::COUNT],
        params: &ParameterSnapshot,
    ) -> bool {
        for (channel, raw) in self.channels.iter_mut().zip(strengths) {
            channel.push(raw);
        }

        self.detection_sum.recompute(&self.channels, params);
        self.last_evaluation = self.detection_sum.evaluate(params.alpha);
        self.last_evaluation.is_candidate
    }

    /// Clear the adaptive state.
    ///
    /// Zeros the running maxima, the channel histories, the detection sum and
    /// the block counter. Parameters, the debounce mode and the time-based
    /// marker are kept. The first nonzero sample of each channel afterwards
    /// establishes a fresh baseline.
    pub fn reset(&mut self) {
        for channel in &mut self.channels {
            channel.reset();
        }
        self.detection_sum.clear();
        self.debouncer.reset_blocks();
        self.last_evaluation = ThresholdEvaluation::default();
        tracing::debug!("onset engine reset");
    }

    /// Result of the most recent block.
    pub const fn value(&self) -> bool {
        self.value
    }

    /// Shared parameter block, for tuning from other threads.
    pub fn parameters(&self) -> Arc<OnsetParameters> {
        Arc::clone(&self.params)
    }

    /// Construction-time configuration. Tunables may since have changed; read
    /// them through the accessors below.
    pub const fn config(&self) -> &OnsetConfig {
        &self.config
    }

    /// Duration of one analysis block in milliseconds.
    pub fn block_duration_ms(&self) -> f64 {
        self.config.block_duration_ms()
    }

    /// Normalizer state for one feature.
    pub fn channel(&self, feature: OnsetFeature) -> &FeatureChannel {
        &self.channels[feature.index()]
    }

    /// Fused detection values of the most recent block, oldest first.
    pub fn detection_sum(&self) -> &[f32] {
        self.detection_sum.values()
    }

    /// Threshold statistics of the most recent block.
    pub const fn last_evaluation(&self) -> &ThresholdEvaluation {
        &self.last_evaluation
    }

    /// Debounce state.
    pub const fn debouncer(&self) -> &Debouncer {
        &self.debouncer
    }

    /// Blocks counted while in [`DebounceMode::BufferCountBased`] since the last reset.
    pub const fn block_counter(&self) -> u64 {
        self.debouncer.block_counter()
    }

    /// The engine's clock.
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// Silence floor for fused values.
    pub fn silence_threshold(&self) -> f32 {
        self.params.silence_threshold()
    }

    /// Set the silence floor.
    ///
    /// # Errors
    ///
    /// Rejects negative or non-finite values.
    pub fn set_silence_threshold(&self, threshold: f32) -> OnsetResult<()> {
        self.params.set_silence_threshold(threshold)
    }

    /// Weight of the mean in the adaptive threshold.
    pub fn alpha(&self) -> f32 {
        self.params.alpha()
    }

    /// Set alpha.
    ///
    /// # Errors
    ///
    /// Rejects negative or non-finite values.
    pub fn set_alpha(&self, alpha: f32) -> OnsetResult<()> {
        self.params.set_alpha(alpha)
    }

    /// Minimum gap for time-based debouncing, in milliseconds.
    pub fn time_threshold_ms(&self) -> f32 {
        self.params.time_threshold_ms()
    }

    /// Set the time-based debounce gap.
    ///
    /// # Errors
    ///
    /// Rejects negative or non-finite values.
    pub fn set_time_threshold_ms(&self, ms: f32) -> OnsetResult<()> {
        self.params.set_time_threshold_ms(ms)
    }

    /// Minimum gap for block-count debouncing.
    pub fn buffer_num_threshold(&self) -> u32 {
        self.params.buffer_num_threshold()
    }

    /// Set the block-count debounce gap.
    pub fn set_buffer_num_threshold(&self, blocks: u32) {
        self.params.set_buffer_num_threshold(blocks);
    }

    /// Whether debouncing is applied.
    pub fn use_time_threshold(&self) -> bool {
        self.params.use_time_threshold()
    }

    /// Enable or disable debouncing.
    pub fn set_use_time_threshold(&self, enabled: bool) {
        self.params.set_use_time_threshold(enabled);
    }

    /// Active debounce policy.
    pub fn debounce_mode(&self) -> DebounceMode {
        self.params.debounce_mode()
    }

    /// Select the debounce policy.
    pub fn set_debounce_mode(&self, mode: DebounceMode) {
        self.params.set_debounce_mode(mode);
    }

    /// Whether a feature contributes to the detection sum.
    pub fn feature_enabled(&self, feature: OnsetFeature) -> bool {
        self.params.feature_enabled(feature)
    }

    /// Include or exclude a feature from the detection sum.
    pub fn set_feature_enabled(&self, feature: OnsetFeature, enabled: bool) {
        self.params.set_feature_enabled(feature, enabled);
    }

    /// Set alpha, the silence floor, the time-based gap and the debounce
    /// switch in one validated update.
    ///
    /// # Errors
    ///
    /// Rejects negative or non-finite values; nothing is changed on error.
    pub fn set_onset_parameters(
        &self,
        alpha: f32,
        silence_threshold: f32,
        time_threshold_ms: f32,
        use_time_threshold: bool,
    ) -> OnsetResult<()> {
        self.params.set_onset_parameters(
            alpha,
            silence_threshold,
            time_threshold_ms,
            use_time_threshold,
        )
    }

    /// Fusion weight of a feature.
    pub fn feature_weight(&self, feature: OnsetFeature) -> f32 {
        self.params.feature_weight(feature)
    }

    /// Set a feature's fusion weight.
    ///
    /// # Errors
    ///
    /// Rejects negative or non-finite values.
    pub fn set_feature_weight(&self, feature: OnsetFeature, weight: f32) -> OnsetResult<()> {
        self.params.set_feature_weight(feature, weight)
    }
}
