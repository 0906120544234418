//! Multi-channel front end: one onset engine per audio channel.
//!
//! Audio channels are independent. Each has its own normalizers, history,
//! debounce state and parameter block, addressed by a zero-based channel index
//! (0 and 1 for a stereo setup).

use super::clock::{Clock, SystemClock};
use super::config::OnsetConfig;
use super::engine::OnsetEngine;
use crate::error::{OnsetError, OnsetResult};

/// A bank of [`OnsetEngine`]s, one per audio channel.
///
/// # Example
///
/// ```rust
/// use onset_engine::{OnsetAnalyzer, OnsetConfig};
///
/// # fn example() -> onset_engine::OnsetResult<()> {
/// let mut analyzer = OnsetAnalyzer::new(2, OnsetConfig::default())?;
/// analyzer.set_parameters(1, 0.2, 0.05, 80.0, true)?;
///
/// analyzer.compute_block(0, 0.1, 0.1, 0.1)?;
/// assert!(!analyzer.value(0)?);
/// assert!(analyzer.value(2).is_err());
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
#[derive(Debug)]
pub struct OnsetAnalyzer<C: Clock = SystemClock> {
    engines: Vec<OnsetEngine<C>>,
}

impl OnsetAnalyzer<SystemClock> {
    /// Build `channels` engines sharing one configuration, each timestamped by
    /// its own [`SystemClock`].
    ///
    /// # Errors
    ///
    /// Returns [`OnsetError::InvalidParameter`] if `channels` is zero or the
    /// configuration does not validate.
    pub fn new(channels: usize, config: OnsetConfig) -> OnsetResult<Self> {
        Self::with_clock(channels, config, SystemClock::new())
    }
}

impl<C: Clock + Clone> OnsetAnalyzer<C> {
    /// Build `channels` engines, each reading time from a clone of `clock`.
    ///
    /// # Errors
    ///
    /// Returns [`OnsetError::InvalidParameter`] if `channels` is zero or the
    /// configuration does not validate.
    pub fn with_clock(channels: usize, config: OnsetConfig, clock: C) -> OnsetResult<Self> {
        if channels == 0 {
            return Err(OnsetError::invalid_parameter(
                "channels",
                "must be greater than 0",
            ));
        }

        let engines = (0..channels)
            .map(|_| OnsetEngine::with_clock(config.clone(), clock.clone()))
            .collect::<OnsetResult<Vec<_>>>()?;

        tracing::debug!(channels, "creating onset analyzer");
        Ok(Self { engines })
    }
}

impl<C: Clock> OnsetAnalyzer<C> {
    /// Number of audio channels.
    pub fn channel_count(&self) -> usize {
        self.engines.len()
    }

    /// Engine of one channel.
    ///
    /// # Errors
    ///
    /// Returns [`OnsetError::InvalidParameter`] if `channel` is out of range.
    pub fn engine(&self, channel: usize) -> OnsetResult<&OnsetEngine<C>> {
        let count = self.engines.len();
        self.engines
            .get(channel)
            .ok_or_else(|| channel_out_of_range(channel, count))
    }

    /// Mutable engine of one channel.
    ///
    /// # Errors
    ///
    /// Returns [`OnsetError::InvalidParameter`] if `channel` is out of range.
    pub fn engine_mut(&mut self, channel: usize) -> OnsetResult<&mut OnsetEngine<C>> {
        let count = self.engines.len();
        self.engines
            .get_mut(channel)
            .ok_or_else(|| channel_out_of_range(channel, count))
    }

    /// Process one block of `channel`, timestamped by that engine's clock.
    ///
    /// # Errors
    ///
    /// Returns [`OnsetError::InvalidParameter`] if `channel` is out of range.
    pub fn compute_block(
        &mut self,
        channel: usize,
        hfc: f32,
        complex: f32,
        flux: f32,
    ) -> OnsetResult<bool> {
        Ok(self.engine_mut(channel)?.compute_block(hfc, complex, flux))
    }

    /// Process one block of `channel` with an explicit timestamp in milliseconds.
    ///
    /// # Errors
    ///
    /// Returns [`OnsetError::InvalidParameter`] if `channel` is out of range.
    pub fn compute_block_at(
        &mut self,
        channel: usize,
        hfc: f32,
        complex: f32,
        flux: f32,
        now_ms: f64,
    ) -> OnsetResult<bool> {
        Ok(self
            .engine_mut(channel)?
            .compute_block_at(hfc, complex, flux, now_ms))
    }

    /// Whether the last block of `channel` was an onset.
    ///
    /// # Errors
    ///
    /// Returns [`OnsetError::InvalidParameter`] if `channel` is out of range.
    pub fn value(&self, channel: usize) -> OnsetResult<bool> {
        Ok(self.engine(channel)?.value())
    }

    /// Reset the adaptive state of `channel`. Other channels are untouched.
    ///
    /// # Errors
    ///
    /// Returns [`OnsetError::InvalidParameter`] if `channel` is out of range.
    pub fn reset(&mut self, channel: usize) -> OnsetResult<()> {
        self.engine_mut(channel)?.reset();
        Ok(())
    }

    /// Reset every channel.
    pub fn reset_all(&mut self) {
        for engine in &mut self.engines {
            engine.reset();
        }
    }

    /// Set alpha, the silence floor, the time-based gap and the debounce switch
    /// of `channel` in one validated update.
    ///
    /// # Errors
    ///
    /// Returns [`OnsetError::InvalidParameter`] if `channel` is out of range or
    /// any value is negative or non-finite. Nothing is changed on error.
    pub fn set_parameters(
        &self,
        channel: usize,
        alpha: f32,
        silence_threshold: f32,
        time_threshold_ms: f32,
        use_time_threshold: bool,
    ) -> OnsetResult<()> {
        self.engine(channel)?.set_onset_parameters(
            alpha,
            silence_threshold,
            time_threshold_ms,
            use_time_threshold,
        )
    }
}

fn channel_out_of_range(channel: usize, count: usize) -> OnsetError {
    OnsetError::invalid_parameter(
        "channel",
        format!("index {channel} out of bounds for {count} channels"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onset::clock::ManualClock;

    fn stereo() -> OnsetAnalyzer<ManualClock> {
        let config = OnsetConfig::default().with_time_threshold_enabled(false);
        OnsetAnalyzer::with_clock(2, config, ManualClock::default()).unwrap()
    }

    #[test]
    fn test_zero_channels_is_rejected() {
        let err = OnsetAnalyzer::new(0, OnsetConfig::default()).unwrap_err();
        assert_eq!(err.parameter(), Some("channels"));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let result = OnsetAnalyzer::new(2, OnsetConfig::new().with_detection_buffer_size(0));
        assert!(result.is_err());
    }

    #[test]
    fn test_out_of_range_channel_is_rejected() {
        let mut analyzer = stereo();
        assert_eq!(analyzer.channel_count(), 2);

        for err in [
            analyzer.value(2).unwrap_err(),
            analyzer.reset(2).unwrap_err(),
            analyzer.compute_block(5, 0.1, 0.1, 0.1).unwrap_err(),
            analyzer.compute_block_at(2, 0.1, 0.1, 0.1, 0.0).unwrap_err(),
            analyzer.set_parameters(2, 0.1, 0.02, 100.0, true).unwrap_err(),
        ] {
            assert_eq!(err.parameter(), Some("channel"));
        }
        assert!(analyzer.engine(1).is_ok());
    }

    #[test]
    fn test_channels_detect_independently() {
        let mut analyzer = stereo();
        for block in 0..40 {
            let left = if block == 20 { 1.0 } else { 0.01 };
            let right = if block == 30 { 1.0 } else { 0.01 };
            let left_onset = analyzer.compute_block_at(0, left, left, left, 0.0).unwrap();
            let right_onset = analyzer.compute_block_at(1, right, right, right, 0.0).unwrap();

            assert_eq!(left_onset, block == 20, "left channel at block {block}");
            assert_eq!(right_onset, block == 30, "right channel at block {block}");
            assert_eq!(analyzer.value(0).unwrap(), left_onset);
            assert_eq!(analyzer.value(1).unwrap(), right_onset);
        }
    }

    #[test]
    fn test_reset_only_touches_one_channel() {
        let mut analyzer = stereo();
        analyzer.compute_block_at(0, 0.5, 0.5, 0.5, 0.0).unwrap();
        analyzer.compute_block_at(1, 0.5, 0.5, 0.5, 0.0).unwrap();

        analyzer.reset(0).unwrap();
        assert_eq!(analyzer.engine(0).unwrap().detection_sum(), &[0.0; 32]);
        assert_eq!(analyzer.engine(1).unwrap().detection_sum(), &[1.0; 32]);

        analyzer.reset_all();
        assert_eq!(analyzer.engine(1).unwrap().detection_sum(), &[0.0; 32]);
    }

    #[test]
    fn test_set_parameters_targets_one_channel() {
        let analyzer = stereo();
        analyzer.set_parameters(1, 0.3, 0.05, 40.0, true).unwrap();

        let right = analyzer.engine(1).unwrap();
        assert_eq!(right.alpha(), 0.3);
        assert_eq!(right.silence_threshold(), 0.05);
        assert_eq!(right.time_threshold_ms(), 40.0);
        assert!(right.use_time_threshold());

        let left = analyzer.engine(0).unwrap();
        assert_eq!(left.alpha(), 0.1);
        assert!(!left.use_time_threshold());
    }

    #[test]
    fn test_rejected_parameters_leave_channel_unchanged() {
        let analyzer = stereo();
        let err = analyzer
            .set_parameters(0, 0.5, f32::NAN, 40.0, true)
            .unwrap_err();
        assert_eq!(err.parameter(), Some("silence_threshold"));

        let left = analyzer.engine(0).unwrap();
        assert_eq!(left.alpha(), 0.1);
        assert_eq!(left.silence_threshold(), 0.02);
        assert_eq!(left.time_threshold_ms(), 100.0);
        assert!(!left.use_time_threshold());
    }

    #[test]
    fn test_channels_share_manual_clock() {
        let clock = ManualClock::new(0.0);
        let mut analyzer =
            OnsetAnalyzer::with_clock(2, OnsetConfig::default(), clock.clone()).unwrap();

        analyzer.compute_block(0, 0.01, 0.01, 0.01).unwrap();
        clock.set_ms(250.0);
        assert!(analyzer.compute_block(0, 1.0, 1.0, 1.0).unwrap());
        assert_eq!(
            analyzer.engine(0).unwrap().debouncer().last_onset_ms(),
            Some(250.0)
        );
        assert_eq!(analyzer.engine(1).unwrap().debouncer().last_onset_ms(), None);
    }
}
