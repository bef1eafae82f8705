use tracing::debug;

use crate::prosody::alignment::dtw::dtw_similarity;
use crate::prosody::{AnalysisSettings, FeatureBundle, ScoreSet};

const F1_TOLERANCE_HZ: f64 = 500.0;
const F2_TOLERANCE_HZ: f64 = 800.0;
const RATE_TOLERANCE_SPS: f64 = 3.0;
const SPAN_TOLERANCE_HZ: f64 = 100.0;
const NEUTRAL_SCORE: f64 = 0.5;

const F0_WEIGHT: f64 = 0.25;
const FORMANT_WEIGHT: f64 = 0.20;
const INTENSITY_WEIGHT: f64 = 0.15;
const RATE_WEIGHT: f64 = 0.15;
const PITCH_RANGE_WEIGHT: f64 = 0.15;
const DURATION_WEIGHT: f64 = 0.10;

/// Scores a user bundle against a target bundle, dimension by dimension.
#[derive(Debug, Clone)]
pub struct ProsodyComparator {
    dtw_max_points: usize,
}

impl Default for ProsodyComparator {
    fn default() -> Self {
        Self::new(&AnalysisSettings::default())
    }
}

impl ProsodyComparator {
    pub fn new(settings: &AnalysisSettings) -> Self {
        Self {
            dtw_max_points: settings.dtw_max_points,
        }
    }

    pub fn compare(&self, target: &FeatureBundle, user: &FeatureBundle) -> ScoreSet {
        let f0 = dtw_similarity(&target.f0.voiced(), &user.f0.voiced(), self.dtw_max_points);
        let formants = formant_score(target, user);
        let intensity = self.intensity_score(target, user);
        let speaking_rate = rate_score(target, user);
        let pitch_range = pitch_range_score(target, user);
        let duration = duration_score(target.duration, user.duration);
        let overall = F0_WEIGHT * f0
            + FORMANT_WEIGHT * formants
            + INTENSITY_WEIGHT * intensity
            + RATE_WEIGHT * speaking_rate
            + PITCH_RANGE_WEIGHT * pitch_range
            + DURATION_WEIGHT * duration;
        let scores = ScoreSet {
            f0: unit(f0),
            formants: unit(formants),
            intensity: unit(intensity),
            speaking_rate: unit(speaking_rate),
            pitch_range: unit(pitch_range),
            duration: unit(duration),
            overall: unit(overall),
        };
        debug!(
            f0 = scores.f0,
            formants = scores.formants,
            intensity = scores.intensity,
            speaking_rate = scores.speaking_rate,
            pitch_range = scores.pitch_range,
            duration = scores.duration,
            overall = scores.overall,
            "compared prosody"
        );
        scores
    }

    /// Contours are compared by shape only; DTW normalizes each side.
    fn intensity_score(&self, target: &FeatureBundle, user: &FeatureBundle) -> f64 {
        dtw_similarity(
            target.intensity.values.as_slice().unwrap_or_default(),
            user.intensity.values.as_slice().unwrap_or_default(),
            self.dtw_max_points,
        )
    }
}

/// Compare with default settings.
pub fn compare_prosody(target: &FeatureBundle, user: &FeatureBundle) -> ScoreSet {
    ProsodyComparator::default().compare(target, user)
}

fn formant_score(target: &FeatureBundle, user: &FeatureBundle) -> f64 {
    let f1 = closeness(target.formants.f1_mean, user.formants.f1_mean, F1_TOLERANCE_HZ);
    let f2 = closeness(target.formants.f2_mean, user.formants.f2_mean, F2_TOLERANCE_HZ);
    (f1 + f2) / 2.0
}

fn closeness(target: f64, user: f64, tolerance: f64) -> f64 {
    1.0 - ((target - user).abs() / tolerance).min(1.0)
}

fn rate_score(target: &FeatureBundle, user: &FeatureBundle) -> f64 {
    let delta = (target.speaking_rate.syllables_per_second
        - user.speaking_rate.syllables_per_second)
        .abs();
    (1.0 - delta / RATE_TOLERANCE_SPS).max(0.0)
}

fn pitch_range_score(target: &FeatureBundle, user: &FeatureBundle) -> f64 {
    match (target.pitch_range, user.pitch_range) {
        (Some(target), Some(user)) => {
            (1.0 - (target.span() - user.span()).abs() / SPAN_TOLERANCE_HZ).max(0.0)
        }
        _ => NEUTRAL_SCORE,
    }
}

/// Shorter over longer; symmetric.
pub fn duration_score(target: f64, user: f64) -> f64 {
    let longest = target.max(user);
    if longest <= 0.0 {
        return 0.0;
    }
    target.min(user) / longest
}

fn unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prosody::features::analyze_audio;
    use crate::types::AudioData;

    #[test]
    fn duration_ratio_is_symmetric() {
        assert_eq!(duration_score(2.0, 4.0), 0.5);
        assert_eq!(duration_score(4.0, 2.0), 0.5);
        assert_eq!(duration_score(0.0, 0.0), 0.0);
    }

    #[test]
    fn closeness_saturates() {
        assert_eq!(closeness(500.0, 1500.0, F1_TOLERANCE_HZ), 0.0);
        assert_eq!(closeness(500.0, 750.0, F1_TOLERANCE_HZ), 0.5);
    }

    #[test]
    fn weights_sum_to_one() {
        let total = F0_WEIGHT
            + FORMANT_WEIGHT
            + INTENSITY_WEIGHT
            + RATE_WEIGHT
            + PITCH_RANGE_WEIGHT
            + DURATION_WEIGHT;
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn intensity_ignores_level_offset_and_gain() {
        let samples = (0..16_000)
            .map(|i| {
                let t = i as f64 / 16_000.0;
                let envelope = 0.1 + 0.9 * (std::f64::consts::PI * 3.0 * t).sin().powi(2);
                (envelope * (2.0 * std::f64::consts::PI * 180.0 * t).sin() * 0.5) as f32
            })
            .collect();
        let target = analyze_audio(&AudioData::new(samples, 16_000)).unwrap();
        let mut user = target.clone();
        user.intensity.values.mapv_inplace(|db| 2.0 * db + 6.0);

        let score = ProsodyComparator::default().intensity_score(&target, &user);
        assert!((score - 1.0).abs() < 1e-9, "score={score}");
    }
}
