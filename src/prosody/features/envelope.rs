use ndarray::Array1;

use crate::prosody::frames::FrameGrid;
use crate::prosody::{AnalysisSettings, IntensityContour, SpeakingRate};
use crate::types::AudioData;

const DB_EPSILON: f64 = 1e-10;

pub fn extract_intensity(audio: &AudioData) -> IntensityContour {
    let grid = FrameGrid::new(audio.samples.len(), audio.sample_rate);
    let values: Vec<f64> = grid
        .frames(&audio.samples)
        .map(|frame| 20.0 * (rms(frame) + DB_EPSILON).log10())
        .collect();
    let mean = mean(&values);
    let dynamic_range = match min_max(&values) {
        Some((low, high)) => high - low,
        None => 0.0,
    };
    IntensityContour {
        values: Array1::from(values),
        mean,
        dynamic_range,
    }
}

/// Counts envelope peaks above the mean level as syllable nuclei.
pub fn estimate_speaking_rate(audio: &AudioData, settings: &AnalysisSettings) -> SpeakingRate {
    rate_from_intensity(&extract_intensity(audio), audio.duration_secs(), settings)
}

/// Speaking rate from an already computed intensity contour.
pub fn rate_from_intensity(
    intensity: &IntensityContour,
    duration: f64,
    settings: &AnalysisSettings,
) -> SpeakingRate {
    let raw = intensity.values.as_slice().unwrap_or_default();
    let smoothed = smooth(raw, settings.smoothing_window);
    let level = mean(raw);
    let estimated_syllables = (1..smoothed.len().saturating_sub(1))
        .filter(|&i| {
            smoothed[i] > smoothed[i - 1] && smoothed[i] >= smoothed[i + 1] && smoothed[i] > level
        })
        .count();
    let syllables_per_second = if duration > 0.0 {
        estimated_syllables as f64 / duration
    } else {
        0.0
    };
    SpeakingRate {
        syllables_per_second,
        estimated_syllables,
        duration,
    }
}

fn rms(frame: &[f32]) -> f64 {
    if frame.is_empty() {
        return 0.0;
    }
    let energy: f64 = frame.iter().map(|&s| (s as f64) * (s as f64)).sum();
    (energy / frame.len() as f64).sqrt()
}

/// Centered moving average; the window shrinks at the edges.
fn smooth(values: &[f64], window: usize) -> Vec<f64> {
    if values.is_empty() || window < 2 {
        return values.to_vec();
    }
    let radius = window / 2;
    (0..values.len())
        .map(|idx| {
            let start = idx.saturating_sub(radius);
            let end = (idx + radius + 1).min(values.len());
            values[start..end].iter().sum::<f64>() / (end - start) as f64
        })
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    values.iter().fold(None, |acc, &v| match acc {
        None => Some((v, v)),
        Some((low, high)) => Some((low.min(v), high.max(v))),
    })
}
