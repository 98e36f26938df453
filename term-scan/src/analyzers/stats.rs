//! Numeric helpers shared by the detectors.

/// Arithmetic mean, or `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Standard deviation with `ddof` delta degrees of freedom.
///
/// `ddof = 0` gives the population standard deviation, `ddof = 1` the sample
/// standard deviation. Returns `None` when `values.len() <= ddof`.
pub fn std_dev(values: &[f64], ddof: usize) -> Option<f64> {
    if values.len() <= ddof {
        return None;
    }
    let mean = mean(values)?;
    let sum_sq = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
    Some((sum_sq / (values.len() - ddof) as f64).sqrt())
}

/// Quantile of already sorted values using linear interpolation between the
/// two nearest order statistics.
///
/// `q` must lie in `[0, 1]`. Returns `None` for an empty slice.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    let position = (sorted.len() - 1) as f64 * q;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Centered rolling mean and sample standard deviation.
///
/// The window for point `i` covers `[i - window / 2, i + (window - 1) / 2]`.
/// Points whose window would extend past either end of the series get
/// `None`; they are never padded or approximated.
pub fn centered_rolling(values: &[f64], window: usize) -> Vec<Option<(f64, f64)>> {
    let n = values.len();
    if window == 0 {
        return vec![None; n];
    }
    let before = window / 2;
    let after = (window - 1) / 2;

    (0..n)
        .map(|i| {
            if i < before || i + after >= n {
                return None;
            }
            let slice = &values[i - before..=i + after];
            Some((mean(slice)?, std_dev(slice, 1)?))
        })
        .collect()
}
