//! Allocation-free window statistics for adaptive thresholding.

/// Arithmetic mean of `values`; `0.0` for an empty slice.
pub fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f32>() / values.len() as f32
}

/// Median of `values`, sorting the slice in place.
///
/// Even-length slices average the two middle values. Returns `0.0` for an
/// empty slice. NaN values sort last via [`f32::total_cmp`] and are never
/// produced by the engine.
pub fn median_in_place(values: &mut [f32]) -> f32 {
    let len = values.len();
    if len == 0 {
        return 0.0;
    }
    values.sort_unstable_by(|a, b| a.total_cmp(b));
    if len % 2 == 0 {
        (values[len / 2 - 1] + values[len / 2]) * 0.5
    } else {
        values[len / 2]
    }
}

/// Median of `values` computed in the caller-provided `scratch` buffer.
///
/// Only the first `values.len()` slots of `scratch` are used; if `scratch` is
/// shorter the median is taken over the prefix that fits.
pub fn median_with_scratch(values: &[f32], scratch: &mut [f32]) -> f32 {
    let n = values.len().min(scratch.len());
    let scratch = &mut scratch[..n];
    scratch.copy_from_slice(&values[..n]);
    median_in_place(scratch)
}

/// Adaptive onset threshold: `median + alpha * mean`.
///
/// An overflowing or NaN result saturates to `f32::MAX`, which no window value can exceed.
pub fn median_mean_threshold(median: f32, mean: f32, alpha: f32) -> f32 {
    let threshold = median + alpha * mean;
    if threshold.is_finite() { threshold } else { f32::MAX }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx_eq::assert_approx_eq;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), 0.0);
        assert_approx_eq!(mean(&[1.0, 2.0, 3.0, 6.0]) as f64, 3.0, 1e-6);
    }

    #[test]
    fn test_median_odd_and_even() {
        let mut odd = [5.0, 1.0, 3.0];
        assert_eq!(median_in_place(&mut odd), 3.0);

        let mut even = [4.0, 1.0, 3.0, 2.0];
        assert_approx_eq!(median_in_place(&mut even) as f64, 2.5, 1e-6);

        let mut empty: [f32; 0] = [];
        assert_eq!(median_in_place(&mut empty), 0.0);
    }

    #[test]
    fn test_median_of_zero_window_is_zero() {
        let values = [0.0f32; 32];
        let mut scratch = [0.0f32; 32];
        assert_eq!(median_with_scratch(&values, &mut scratch), 0.0);
    }

    #[test]
    fn test_median_with_scratch_leaves_input_untouched() {
        let values = [0.9, 0.1, 0.5];
        let mut scratch = [0.0; 3];
        assert_eq!(median_with_scratch(&values, &mut scratch), 0.5);
        assert_eq!(values, [0.9, 0.1, 0.5]);
    }

    #[test]
    fn test_threshold_combines_median_and_mean() {
        assert_approx_eq!(median_mean_threshold(0.5, 0.4, 0.1) as f64, 0.54, 1e-6);
        assert_eq!(median_mean_threshold(0.0, 0.0, 0.1), 0.0);
        assert_eq!(median_mean_threshold(f32::MAX, f32::MAX, 2.0), f32::MAX);
    }
}
