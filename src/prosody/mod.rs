pub mod alignment;
pub mod cli;
pub mod engine;
pub mod features;
pub mod feedback;
pub mod frames;
pub mod metrics;

use std::path::Path;

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use engine::{BundleSummary, ComparisonReport, ProsodyEngine};
pub use features::{analyze_audio, FeatureAnalyzer};
pub use feedback::generate_feedback;
pub use metrics::{compare_prosody, ProsodyComparator};

/// Convenient alias for results returned by prosody modules.
pub type Result<T> = std::result::Result<T, ProsodyError>;

/// Failures surfaced by the prosody engine and its decoding boundary.
#[derive(Debug, Clone, Error)]
pub enum ProsodyError {
    /// The sample buffer is empty or holds values that are not audio samples.
    #[error("invalid audio: {0}")]
    InvalidAudio(String),
    /// Encoded bytes could not be turned into a sample buffer.
    #[error("failed to decode audio: {0}")]
    Decode(String),
    #[error("invalid analysis settings: {0}")]
    Config(String),
    #[error("analysis worker failed: {0}")]
    Worker(String),
}

/// Tuning parameters for the feature extractors and the comparator.
///
/// Frame and hop sizes are deliberately absent: every contour shares the
/// fixed 25 ms / 10 ms grid defined in [`frames`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    pub min_f0_hz: f64,
    pub max_f0_hz: f64,
    /// Absolute CMNDF threshold below which a lag counts as periodic.
    pub voicing_threshold: f64,
    pub lpc_order: usize,
    pub pre_emphasis: f64,
    /// Fixed Durand-Kerner iteration budget; no early exit.
    pub root_iterations: usize,
    pub root_start_radius: f64,
    pub formant_min_hz: f64,
    pub formant_max_hz: f64,
    pub max_bandwidth_hz: f64,
    /// Centered moving-average width (frames) used before peak picking.
    pub smoothing_window: usize,
    /// Resampling cap applied to each sequence before DTW.
    pub dtw_max_points: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            min_f0_hz: 50.0,
            max_f0_hz: 400.0,
            voicing_threshold: 0.1,
            lpc_order: 12,
            pre_emphasis: 0.97,
            root_iterations: 50,
            root_start_radius: 0.9,
            formant_min_hz: 200.0,
            formant_max_hz: 5000.0,
            max_bandwidth_hz: 500.0,
            smoothing_window: 5,
            dtw_max_points: 100,
        }
    }
}

impl AnalysisSettings {
    pub fn validate(&self) -> Result<()> {
        if !(self.min_f0_hz > 0.0 && self.max_f0_hz > self.min_f0_hz) {
            return Err(ProsodyError::Config(format!(
                "pitch search range must satisfy 0 < min < max (got {}..{} Hz)",
                self.min_f0_hz, self.max_f0_hz
            )));
        }
        if !(self.voicing_threshold > 0.0 && self.voicing_threshold < 1.0) {
            return Err(ProsodyError::Config(format!(
                "voicing_threshold must lie in (0, 1), got {}",
                self.voicing_threshold
            )));
        }
        if self.lpc_order == 0 || self.root_iterations == 0 {
            return Err(ProsodyError::Config(
                "lpc_order and root_iterations must be positive".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.pre_emphasis) {
            return Err(ProsodyError::Config(format!(
                "pre_emphasis must lie in [0, 1), got {}",
                self.pre_emphasis
            )));
        }
        if !(self.root_start_radius > 0.0 && self.root_start_radius < 1.0) {
            return Err(ProsodyError::Config(format!(
                "root_start_radius must lie in (0, 1), got {}",
                self.root_start_radius
            )));
        }
        if !(self.formant_min_hz >= 0.0 && self.formant_max_hz > self.formant_min_hz) {
            return Err(ProsodyError::Config(format!(
                "formant band must satisfy 0 <= min < max (got {}..{} Hz)",
                self.formant_min_hz, self.formant_max_hz
            )));
        }
        if self.max_bandwidth_hz <= 0.0 {
            return Err(ProsodyError::Config(format!(
                "max_bandwidth_hz must be positive, got {}",
                self.max_bandwidth_hz
            )));
        }
        if self.smoothing_window == 0 {
            return Err(ProsodyError::Config(
                "smoothing_window must be at least one frame".to_string(),
            ));
        }
        if self.dtw_max_points < 2 {
            return Err(ProsodyError::Config(format!(
                "dtw_max_points must be at least 2, got {}",
                self.dtw_max_points
            )));
        }
        Ok(())
    }

    /// Parse settings from JSON; absent fields keep their defaults.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(raw)
            .map_err(|err| ProsodyError::Config(format!("failed to parse settings JSON: {err}")))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|err| {
            ProsodyError::Config(format!("failed to read settings file {:?}: {err}", path))
        })?;
        Self::from_json_str(&raw)
    }
}

/// Per-frame fundamental frequency; zero marks an unvoiced frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct F0Contour {
    pub times: Array1<f64>,
    pub frequencies: Array1<f64>,
}

impl F0Contour {
    pub fn frame_count(&self) -> usize {
        self.frequencies.len()
    }

    /// Voiced frequencies in frame order.
    pub fn voiced(&self) -> Vec<f64> {
        self.frequencies
            .iter()
            .copied()
            .filter(|&f| f > 0.0)
            .collect()
    }

    pub fn voiced_count(&self) -> usize {
        self.frequencies.iter().filter(|&&f| f > 0.0).count()
    }
}

/// F1-F3 per frame plus each series' mean over frames where it was found.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormantContour {
    pub f1: Array1<f64>,
    pub f2: Array1<f64>,
    pub f3: Array1<f64>,
    pub f1_mean: f64,
    pub f2_mean: f64,
    pub f3_mean: f64,
}

impl FormantContour {
    pub fn frame_count(&self) -> usize {
        self.f1.len()
    }
}

/// Short-term energy in dB per frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntensityContour {
    pub values: Array1<f64>,
    pub mean: f64,
    pub dynamic_range: f64,
}

impl IntensityContour {
    pub fn frame_count(&self) -> usize {
        self.values.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpeakingRate {
    pub syllables_per_second: f64,
    pub estimated_syllables: usize,
    pub duration: f64,
}

/// Statistics over voiced F0 values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PitchRange {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub variance: f64,
}

impl PitchRange {
    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// Everything the comparator needs to know about one recording.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureBundle {
    pub f0: F0Contour,
    pub formants: FormantContour,
    pub intensity: IntensityContour,
    pub duration: f64,
    pub speaking_rate: SpeakingRate,
    /// `None` when no frame was voiced.
    pub pitch_range: Option<PitchRange>,
}

/// Per-dimension similarity in [0, 1] and their weighted blend.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSet {
    pub f0: f64,
    pub formants: f64,
    pub intensity: f64,
    pub speaking_rate: f64,
    pub pitch_range: f64,
    pub duration: f64,
    pub overall: f64,
}

impl ScoreSet {
    /// Labelled dimensions in reporting order, excluding `overall`.
    pub fn dimensions(&self) -> [(&'static str, f64); 6] {
        [
            ("f0", self.f0),
            ("formants", self.formants),
            ("intensity", self.intensity),
            ("speakingRate", self.speaking_rate),
            ("pitchRange", self.pitch_range),
            ("duration", self.duration),
        ]
    }
}
