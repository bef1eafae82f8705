pub mod envelope;
pub mod formant;
pub mod pitch;

use std::time::Instant;

use tracing::debug;

use crate::prosody::{AnalysisSettings, F0Contour, FeatureBundle, PitchRange, ProsodyError, Result};
use crate::types::AudioData;

/// Runs the pitch, resonance and envelope extractors over one buffer.
#[derive(Debug, Default, Clone)]
pub struct FeatureAnalyzer {
    settings: AnalysisSettings,
}

impl FeatureAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: AnalysisSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }

    pub fn analyze(&self, audio: &AudioData) -> Result<FeatureBundle> {
        ensure_samples(audio)?;
        let started = Instant::now();
        let f0 = pitch::extract_f0_contour(audio, &self.settings);
        let formants = formant::extract_formants(audio, &self.settings);
        let intensity = envelope::extract_intensity(audio);
        let duration = audio.duration_secs();
        let speaking_rate = envelope::rate_from_intensity(&intensity, duration, &self.settings);
        let pitch_range = pitch_range(&f0);
        debug!(
            frames = f0.frame_count(),
            voiced = f0.voiced_count(),
            duration_s = duration,
            syllables = speaking_rate.estimated_syllables,
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "analyzed buffer"
        );
        Ok(FeatureBundle {
            f0,
            formants,
            intensity,
            duration,
            speaking_rate,
            pitch_range,
        })
    }
}

/// Analyze with default settings.
pub fn analyze_audio(audio: &AudioData) -> Result<FeatureBundle> {
    FeatureAnalyzer::new().analyze(audio)
}

fn ensure_samples(audio: &AudioData) -> Result<()> {
    if audio.samples.is_empty() {
        return Err(ProsodyError::InvalidAudio(
            "sample buffer is empty".to_string(),
        ));
    }
    if audio.sample_rate == 0 {
        return Err(ProsodyError::InvalidAudio(
            "sample rate must be positive".to_string(),
        ));
    }
    if let Some(index) = audio.samples.iter().position(|s| !s.is_finite()) {
        return Err(ProsodyError::InvalidAudio(format!(
            "sample {index} is not a finite number"
        )));
    }
    Ok(())
}

/// Min, max, mean and population variance of voiced frames.
pub fn pitch_range(f0: &F0Contour) -> Option<PitchRange> {
    let voiced = f0.voiced();
    if voiced.is_empty() {
        return None;
    }
    let count = voiced.len() as f64;
    let mean = voiced.iter().sum::<f64>() / count;
    let variance = voiced.iter().map(|f| (f - mean).powi(2)).sum::<f64>() / count;
    let min = voiced.iter().copied().fold(f64::INFINITY, f64::min);
    let max = voiced.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Some(PitchRange {
        min,
        max,
        mean,
        variance,
    })
}
