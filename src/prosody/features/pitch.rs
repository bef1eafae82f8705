use ndarray::Array1;

use crate::prosody::frames::FrameGrid;
use crate::prosody::{AnalysisSettings, F0Contour};
use crate::types::AudioData;

/// Per-frame F0 using a cumulative-mean-normalized difference function.
pub fn extract_f0_contour(audio: &AudioData, settings: &AnalysisSettings) -> F0Contour {
    let grid = FrameGrid::new(audio.samples.len(), audio.sample_rate);
    let lags = LagRange::new(audio.sample_rate, grid.frame_len, settings);
    let mut times = Vec::with_capacity(grid.count);
    let mut frequencies = Vec::with_capacity(grid.count);
    for (index, frame) in grid.frames(&audio.samples).enumerate() {
        times.push(grid.time_of(index));
        let f0 = lags
            .and_then(|lags| estimate_frame(frame, lags, settings.voicing_threshold))
            .map(|lag| audio.sample_rate as f64 / lag)
            .unwrap_or(0.0);
        frequencies.push(f0);
    }
    F0Contour {
        times: Array1::from(times),
        frequencies: Array1::from(frequencies),
    }
}

#[derive(Debug, Clone, Copy)]
struct LagRange {
    min: usize,
    max: usize,
}

impl LagRange {
    fn new(sample_rate: u32, frame_len: usize, settings: &AnalysisSettings) -> Option<Self> {
        let rate = sample_rate as f64;
        let min = (rate / settings.max_f0_hz).floor().max(2.0) as usize;
        let max = (rate / settings.min_f0_hz).ceil() as usize;
        let max = max.min(frame_len.saturating_sub(1));
        // Parabolic refinement needs a neighbor on each side of the search range.
        if max < min + 1 {
            return None;
        }
        Some(Self { min, max })
    }
}

/// Returns the refined period in samples, or `None` for unvoiced frames.
fn estimate_frame(frame: &[f32], lags: LagRange, threshold: f64) -> Option<f64> {
    let cmndf = cumulative_mean_normalized(&difference(frame, lags));
    let mut tau = (lags.min..=lags.max).find(|&tau| cmndf[tau] < threshold)?;
    while tau < lags.max && cmndf[tau + 1] < cmndf[tau] {
        tau += 1;
    }
    Some(parabolic_refine(&cmndf, tau))
}

/// Squared difference between the frame and its own `tau`-shifted copy,
/// summed over the whole overlap.
fn difference(frame: &[f32], lags: LagRange) -> Vec<f64> {
    let mut diff = vec![0.0; lags.max + 1];
    for (tau, slot) in diff.iter_mut().enumerate().skip(1) {
        *slot = frame
            .iter()
            .zip(&frame[tau..])
            .map(|(&a, &b)| {
                let delta = a as f64 - b as f64;
                delta * delta
            })
            .sum();
    }
    diff
}

fn cumulative_mean_normalized(diff: &[f64]) -> Vec<f64> {
    let mut cmndf = vec![1.0; diff.len()];
    let mut running = 0.0;
    for tau in 1..diff.len() {
        running += diff[tau];
        cmndf[tau] = if running > 0.0 {
            diff[tau] * tau as f64 / running
        } else {
            1.0
        };
    }
    cmndf
}

fn parabolic_refine(cmndf: &[f64], tau: usize) -> f64 {
    if tau == 0 || tau + 1 >= cmndf.len() {
        return tau as f64;
    }
    let (left, centre, right) = (cmndf[tau - 1], cmndf[tau], cmndf[tau + 1]);
    let curvature = left - 2.0 * centre + right;
    if curvature.abs() < f64::EPSILON {
        return tau as f64;
    }
    let shift = 0.5 * (left - right) / curvature;
    tau as f64 + shift.clamp(-1.0, 1.0)
}
