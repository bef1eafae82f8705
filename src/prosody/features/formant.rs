use std::f64::consts::PI;

use ndarray::Array1;
use num_complex::Complex64;

use crate::prosody::frames::FrameGrid;
use crate::prosody::{AnalysisSettings, FormantContour};
use crate::types::AudioData;

const FORMANT_SLOTS: usize = 3;

/// Linear-prediction solution for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct LpcSolution {
    /// `a[0] == 1`; the prediction polynomial in descending powers.
    pub coefficients: Vec<f64>,
    /// Prediction error energy after each order, `errors[0] == r[0]`.
    pub errors: Vec<f64>,
}

/// Per-frame F1-F3 from LPC pole locations.
pub fn extract_formants(audio: &AudioData, settings: &AnalysisSettings) -> FormantContour {
    let grid = FrameGrid::new(audio.samples.len(), audio.sample_rate);
    let window = hamming(grid.frame_len);
    let mut tracks: [Vec<f64>; FORMANT_SLOTS] = Default::default();
    for frame in grid.frames(&audio.samples) {
        let slots = frame_formants(frame, &window, audio.sample_rate, settings);
        for (track, value) in tracks.iter_mut().zip(slots) {
            track.push(value);
        }
    }
    let [f1, f2, f3] = tracks;
    FormantContour {
        f1_mean: valid_mean(&f1),
        f2_mean: valid_mean(&f2),
        f3_mean: valid_mean(&f3),
        f1: Array1::from(f1),
        f2: Array1::from(f2),
        f3: Array1::from(f3),
    }
}

fn frame_formants(
    frame: &[f32],
    window: &[f64],
    sample_rate: u32,
    settings: &AnalysisSettings,
) -> [f64; FORMANT_SLOTS] {
    let shaped = pre_emphasize(&apply_window(frame, window), settings.pre_emphasis);
    let r = autocorrelation(&shaped, settings.lpc_order);
    let Some(lpc) = levinson_durbin(&r, settings.lpc_order) else {
        return [0.0; FORMANT_SLOTS];
    };
    let roots = durand_kerner_roots(
        &lpc.coefficients,
        settings.root_iterations,
        settings.root_start_radius,
    );
    select_formants(&roots, sample_rate, settings)
}

pub fn hamming(len: usize) -> Vec<f64> {
    if len < 2 {
        return vec![1.0; len];
    }
    let denom = (len - 1) as f64;
    (0..len)
        .map(|i| 0.54 - 0.46 * (2.0 * PI * i as f64 / denom).cos())
        .collect()
}

fn apply_window(frame: &[f32], window: &[f64]) -> Vec<f64> {
    frame
        .iter()
        .zip(window.iter())
        .map(|(&s, &w)| s as f64 * w)
        .collect()
}

fn pre_emphasize(samples: &[f64], coefficient: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(samples.len());
    let mut previous = 0.0;
    for &sample in samples {
        out.push(sample - coefficient * previous);
        previous = sample;
    }
    out
}

fn autocorrelation(samples: &[f64], order: usize) -> Vec<f64> {
    (0..=order)
        .map(|lag| {
            if lag >= samples.len() {
                return 0.0;
            }
            samples[..samples.len() - lag]
                .iter()
                .zip(&samples[lag..])
                .map(|(a, b)| a * b)
                .sum()
        })
        .collect()
}

/// Solves the normal equations order by order. `None` when the frame has
/// no energy or the recursion turns unstable.
pub fn levinson_durbin(r: &[f64], order: usize) -> Option<LpcSolution> {
    if r.len() < order + 1 || r[0] <= 0.0 {
        return None;
    }
    let mut a = vec![0.0; order + 1];
    a[0] = 1.0;
    let mut error = r[0];
    let mut errors = Vec::with_capacity(order + 1);
    errors.push(error);
    for i in 1..=order {
        let acc: f64 = r[i] + (1..i).map(|j| a[j] * r[i - j]).sum::<f64>();
        let k = -acc / error;
        let previous = a.clone();
        a[i] = k;
        for j in 1..i {
            a[j] = previous[j] + k * previous[i - j];
        }
        error *= 1.0 - k * k;
        if error <= 0.0 {
            return None;
        }
        errors.push(error);
    }
    Some(LpcSolution {
        coefficients: a,
        errors,
    })
}

/// All complex roots of the polynomial `coefficients[0]·z^n + … + coefficients[n]`.
///
/// Starts evenly spaced on a circle of `radius` and runs the full iteration
/// budget; the result is best effort.
pub fn durand_kerner_roots(coefficients: &[f64], iterations: usize, radius: f64) -> Vec<Complex64> {
    let Some((&lead, _)) = coefficients.split_first() else {
        return Vec::new();
    };
    let degree = coefficients.len() - 1;
    if degree == 0 || lead == 0.0 {
        return Vec::new();
    }
    let monic: Vec<f64> = coefficients.iter().map(|c| c / lead).collect();
    // In-place updates break the conjugate symmetry of the evenly spaced start.
    let mut roots: Vec<Complex64> = (0..degree)
        .map(|k| Complex64::from_polar(radius, 2.0 * PI * k as f64 / degree as f64))
        .collect();
    for _ in 0..iterations {
        for i in 0..degree {
            let mut denom = Complex64::new(1.0, 0.0);
            for j in 0..degree {
                if i != j {
                    denom *= roots[i] - roots[j];
                }
            }
            let value = poly_eval(&monic, roots[i]);
            let delta = if denom.norm() < 1e-12 {
                Complex64::new(1e-6, 1e-6)
            } else {
                value / denom
            };
            roots[i] -= delta;
        }
    }
    roots
}

fn poly_eval(coefficients: &[f64], z: Complex64) -> Complex64 {
    coefficients
        .iter()
        .fold(Complex64::new(0.0, 0.0), |acc, &c| acc * z + c)
}

fn select_formants(
    roots: &[Complex64],
    sample_rate: u32,
    settings: &AnalysisSettings,
) -> [f64; FORMANT_SLOTS] {
    let rate = sample_rate as f64;
    let mut candidates: Vec<f64> = roots
        .iter()
        .filter(|root| root.im > 0.0 && root.is_finite())
        .filter_map(|root| {
            let frequency = root.im.atan2(root.re) * rate / (2.0 * PI);
            let bandwidth = -root.norm().ln() * rate / PI;
            let plausible = frequency > settings.formant_min_hz
                && frequency < settings.formant_max_hz
                && bandwidth < settings.max_bandwidth_hz;
            plausible.then_some(frequency)
        })
        .collect();
    candidates.sort_by(f64::total_cmp);
    let mut slots = [0.0; FORMANT_SLOTS];
    for (slot, frequency) in slots.iter_mut().zip(candidates) {
        *slot = frequency;
    }
    slots
}

fn valid_mean(track: &[f64]) -> f64 {
    let (sum, count) = track
        .iter()
        .filter(|&&v| v > 0.0)
        .fold((0.0, 0usize), |(sum, count), &v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}
