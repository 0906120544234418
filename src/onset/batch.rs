//! Offline onset detection over precomputed onset-strength sequences.
//!
//! Time-based debouncing uses block-derived timestamps
//! (`block_index * block_duration_ms`), so results depend only on the input and
//! the configuration, never on how fast the loop runs.

use ndarray::ArrayView2;

use super::channel::OnsetFeature;
use super::clock::ManualClock;
use super::config::OnsetConfig;
use super::engine::OnsetEngine;
use crate::error::{OnsetError, OnsetResult};

/// Run a fresh engine over a `(blocks, 3)` matrix of onset strengths.
///
/// Columns are `hfc`, `complex` and `flux`, in [`OnsetFeature::ALL`] order.
/// Returns the indices of blocks reported as onsets.
///
/// # Errors
///
/// Returns [`OnsetError::DimensionMismatch`] if the matrix does not have
/// exactly three columns, or [`OnsetError::InvalidParameter`] if the
/// configuration does not validate.
///
/// # Example
///
/// ```rust
/// use ndarray::Array2;
/// use onset_engine::{OnsetConfig, detect_onsets};
///
/// let strengths = Array2::<f32>::from_shape_fn((40, 3), |(block, _)| if block == 20 { 1.0 } else { 0.01 });
/// let onsets = detect_onsets(strengths.view(), &OnsetConfig::default()).unwrap();
/// assert_eq!(onsets, vec![20]);
/// ```
pub fn detect_onsets(strengths: ArrayView2<'_, f32>, config: &OnsetConfig) -> OnsetResult<Vec<usize>> {
    let (blocks, columns) = strengths.dim();
    if columns != OnsetFeature::COUNT {
        return Err(OnsetError::DimensionMismatch(format!(
            "onset strengths must have {} columns (hfc, complex, flux), got {}",
            OnsetFeature::COUNT,
            columns
        )));
    }

    let mut engine = OnsetEngine::with_clock(config.clone(), ManualClock::default())?;
    let block_ms = config.block_duration_ms();

    let mut onsets = Vec::new();
    for (index, row) in strengths.outer_iter().enumerate() {
        let now_ms = index as f64 * block_ms;
        if engine.compute_block_at(row[0], row[1], row[2], now_ms) {
            onsets.push(index);
        }
    }

    tracing::debug!(blocks, onsets = onsets.len(), "batch onset detection finished");
    Ok(onsets)
}

/// Like [`detect_onsets`], returning onset times in seconds.
///
/// # Errors
///
/// Same as [`detect_onsets`].
pub fn detect_onset_times(strengths: ArrayView2<'_, f32>, config: &OnsetConfig) -> OnsetResult<Vec<f64>> {
    let onsets = detect_onsets(strengths, config)?;
    Ok(onsets
        .into_iter()
        .map(|index| config.block_to_seconds(index))
        .collect())
}
