use ndarray::Array2;

/// Elastic-match similarity in [0, 1] between two numeric series.
///
/// Each series is resampled to at most `max_points` and min-max normalized
/// on its own, so only the contour shape is compared. An empty side scores 0.
pub fn dtw_similarity(lhs: &[f64], rhs: &[f64], max_points: usize) -> f64 {
    if lhs.is_empty() || rhs.is_empty() {
        return 0.0;
    }
    let a = min_max_normalize(&resample_linear(lhs, max_points));
    let b = min_max_normalize(&resample_linear(rhs, max_points));
    let cost = accumulated_cost(&a, &b);
    let longest = a.len().max(b.len()) as f64;
    (1.0 - (cost / longest).min(1.0)).clamp(0.0, 1.0)
}

/// Linear interpolation down to `max_points`; shorter series pass through.
pub fn resample_linear(series: &[f64], max_points: usize) -> Vec<f64> {
    let len = series.len();
    if len <= max_points || max_points == 0 {
        return series.to_vec();
    }
    if max_points == 1 {
        return vec![series[0]];
    }
    let step = (len - 1) as f64 / (max_points - 1) as f64;
    (0..max_points)
        .map(|i| {
            let position = i as f64 * step;
            let lower = position.floor() as usize;
            let upper = (lower + 1).min(len - 1);
            let weight = position - lower as f64;
            series[lower] * (1.0 - weight) + series[upper] * weight
        })
        .collect()
}

/// Scales into [0, 1]; a flat series is divided by one instead of zero.
pub fn min_max_normalize(series: &[f64]) -> Vec<f64> {
    let Some(low) = series.iter().copied().reduce(f64::min) else {
        return Vec::new();
    };
    let high = series.iter().copied().fold(low, f64::max);
    let span = if high - low > 0.0 { high - low } else { 1.0 };
    series.iter().map(|v| (v - low) / span).collect()
}

fn accumulated_cost(a: &[f64], b: &[f64]) -> f64 {
    let (n, m) = (a.len(), b.len());
    let mut dp = Array2::from_elem((n + 1, m + 1), f64::INFINITY);
    dp[[0, 0]] = 0.0;
    for i in 1..=n {
        for j in 1..=m {
            let step = dp[[i - 1, j]].min(dp[[i, j - 1]]).min(dp[[i - 1, j - 1]]);
            dp[[i, j]] = (a[i - 1] - b[j - 1]).abs() + step;
        }
    }
    dp[[n, m]]
}
