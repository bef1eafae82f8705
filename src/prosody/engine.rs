use std::thread;

use serde::Serialize;
use tracing::{info, warn};

use super::features::FeatureAnalyzer;
use super::feedback::generate_feedback;
use super::metrics::ProsodyComparator;
use super::{
    AnalysisSettings, FeatureBundle, PitchRange, ProsodyError, Result, ScoreSet, SpeakingRate,
};
use crate::types::AudioData;

/// Stateless entry point tying analysis, comparison and feedback together.
#[derive(Debug, Clone, Default)]
pub struct ProsodyEngine {
    analyzer: FeatureAnalyzer,
    comparator: ProsodyComparator,
}

/// Outcome of one target-versus-user evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub scores: ScoreSet,
    pub feedback: Vec<String>,
    pub target: BundleSummary,
    pub user: BundleSummary,
}

/// Compact, printable view of a feature bundle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BundleSummary {
    pub duration: f64,
    pub frame_count: usize,
    pub voiced_frames: usize,
    pub pitch_range: Option<PitchRange>,
    pub formant_means: [f64; 3],
    pub intensity_mean_db: f64,
    pub intensity_range_db: f64,
    pub speaking_rate: SpeakingRate,
}

impl From<&FeatureBundle> for BundleSummary {
    fn from(bundle: &FeatureBundle) -> Self {
        Self {
            duration: bundle.duration,
            frame_count: bundle.f0.frame_count(),
            voiced_frames: bundle.f0.voiced_count(),
            pitch_range: bundle.pitch_range,
            formant_means: [
                bundle.formants.f1_mean,
                bundle.formants.f2_mean,
                bundle.formants.f3_mean,
            ],
            intensity_mean_db: bundle.intensity.mean,
            intensity_range_db: bundle.intensity.dynamic_range,
            speaking_rate: bundle.speaking_rate,
        }
    }
}

impl ProsodyEngine {
    pub fn new(settings: AnalysisSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            comparator: ProsodyComparator::new(&settings),
            analyzer: FeatureAnalyzer::with_settings(settings),
        })
    }

    pub fn settings(&self) -> &AnalysisSettings {
        self.analyzer.settings()
    }

    pub fn analyze(&self, audio: &AudioData) -> Result<FeatureBundle> {
        self.analyzer.analyze(audio)
    }

    pub fn compare(&self, target: &FeatureBundle, user: &FeatureBundle) -> ScoreSet {
        self.comparator.compare(target, user)
    }

    pub fn feedback(
        &self,
        scores: &ScoreSet,
        target: &FeatureBundle,
        user: &FeatureBundle,
    ) -> Vec<String> {
        generate_feedback(scores, target, user)
    }

    /// Analyzes both buffers on separate workers, then compares once both finish.
    pub fn evaluate(&self, target: &AudioData, user: &AudioData) -> Result<ComparisonReport> {
        let (target_bundle, user_bundle) = thread::scope(|scope| {
            let target_worker = thread::Builder::new()
                .name("analyze-target".to_string())
                .spawn_scoped(scope, || self.analyze(target))
                .map_err(|err| ProsodyError::Worker(err.to_string()))?;
            let user_bundle = self.analyze(user);
            let target_bundle = target_worker
                .join()
                .unwrap_or_else(|panic| std::panic::resume_unwind(panic));
            Ok::<_, ProsodyError>((target_bundle, user_bundle))
        })?;
        let target_bundle =
            target_bundle.inspect_err(|err| warn!(error = %err, "target analysis failed"))?;
        let user_bundle =
            user_bundle.inspect_err(|err| warn!(error = %err, "user analysis failed"))?;

        let scores = self.compare(&target_bundle, &user_bundle);
        let feedback = self.feedback(&scores, &target_bundle, &user_bundle);
        info!(
            overall = scores.overall,
            messages = feedback.len(),
            "evaluation complete"
        );
        Ok(ComparisonReport {
            scores,
            feedback,
            target: BundleSummary::from(&target_bundle),
            user: BundleSummary::from(&user_bundle),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_settings() {
        let settings = AnalysisSettings {
            dtw_max_points: 1,
            ..AnalysisSettings::default()
        };
        assert!(matches!(
            ProsodyEngine::new(settings),
            Err(ProsodyError::Config(_))
        ));
    }

    #[test]
    fn evaluate_surfaces_invalid_user_audio() {
        let engine = ProsodyEngine::default();
        let target = AudioData::new(vec![0.1; 4_000], 16_000);
        let user = AudioData::new(Vec::new(), 16_000);
        assert!(matches!(
            engine.evaluate(&target, &user),
            Err(ProsodyError::InvalidAudio(_))
        ));
    }
}
