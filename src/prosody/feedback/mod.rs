use crate::prosody::{FeatureBundle, ScoreSet};

const WEAK_SCORE: f64 = 0.6;
/// Relative mean-F0 offset before pitch is called too low or too high.
const PITCH_LEVEL_TOLERANCE: f64 = 0.1;
/// User span below this fraction of the target span reads as monotone.
const NARROW_SPAN_RATIO: f64 = 0.7;

pub const AFFIRMATION: &str =
    "Great job! Your pronunciation closely matches the target rhythm and intonation.";

/// Coaching lines in fixed priority: pitch, resonance, rate, stress, intonation.
pub fn generate_feedback(
    scores: &ScoreSet,
    target: &FeatureBundle,
    user: &FeatureBundle,
) -> Vec<String> {
    let mut feedback = Vec::new();
    if scores.f0 < WEAK_SCORE {
        feedback.extend(pitch_feedback(target, user));
    }
    if scores.formants < WEAK_SCORE {
        feedback.push(
            "Your vowel sounds differ from the target accent. Pay attention to mouth shape and \
             tongue position."
                .to_string(),
        );
    }
    if scores.speaking_rate < WEAK_SCORE {
        feedback.push(rate_feedback(target, user));
    }
    if scores.intensity < WEAK_SCORE {
        feedback.push(
            "Your stress pattern differs from the target. Emphasize the same syllables the \
             target speaker stresses."
                .to_string(),
        );
    }
    if scores.pitch_range < WEAK_SCORE {
        feedback.push(
            "Your intonation pattern differs from the target. Listen for where the voice rises \
             and falls at the ends of phrases."
                .to_string(),
        );
    }
    if feedback.is_empty() {
        feedback.push(AFFIRMATION.to_string());
    }
    feedback
}

fn pitch_feedback(target: &FeatureBundle, user: &FeatureBundle) -> Vec<String> {
    let (Some(target_range), Some(user_range)) = (target.pitch_range, user.pitch_range) else {
        return vec![
            "Your pitch contour does not follow the target. Try voicing the phrase clearly and \
             following its melody."
                .to_string(),
        ];
    };
    let mut lines = Vec::new();
    if user_range.mean < target_range.mean * (1.0 - PITCH_LEVEL_TOLERANCE) {
        lines.push(
            "Your pitch is lower than the target. Try raising your voice slightly.".to_string(),
        );
    } else if user_range.mean > target_range.mean * (1.0 + PITCH_LEVEL_TOLERANCE) {
        lines.push(
            "Your pitch is higher than the target. Try lowering your voice slightly.".to_string(),
        );
    }
    if user_range.span() < target_range.span() * NARROW_SPAN_RATIO {
        lines.push(
            "Your pitch range is too narrow. Try adding more variation to your melody.".to_string(),
        );
    }
    if lines.is_empty() {
        lines.push(
            "Your pitch movement differs from the target. Follow where the target rises and falls."
                .to_string(),
        );
    }
    lines
}

fn rate_feedback(target: &FeatureBundle, user: &FeatureBundle) -> String {
    if user.speaking_rate.syllables_per_second < target.speaking_rate.syllables_per_second {
        "You are speaking more slowly than the target. Try a slightly faster pace.".to_string()
    } else {
        "You are speaking faster than the target. Try slowing down a little.".to_string()
    }
}
