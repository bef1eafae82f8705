use std::f64::consts::PI;

use approx::assert_abs_diff_eq;
use prosodyzer::prosody::features::envelope::{estimate_speaking_rate, extract_intensity};
use prosodyzer::prosody::features::formant::extract_formants;
use prosodyzer::prosody::features::FeatureAnalyzer;
use prosodyzer::prosody::{AnalysisSettings, ProsodyError};
use prosodyzer::types::AudioData;

const SAMPLE_RATE: u32 = 16_000;

#[test]
fn synthetic_vowel_exposes_first_formant() {
    let audio = vowel(&[(700.0, 100.0), (1_220.0, 120.0), (2_600.0, 160.0)], 0.6);
    let contour = extract_formants(&audio, &AnalysisSettings::default());

    let frames = contour.frame_count();
    let near_f1 = (0..frames)
        .filter(|&i| {
            [contour.f1[i], contour.f2[i], contour.f3[i]]
                .iter()
                .any(|&f| (f - 700.0).abs() < 100.0)
        })
        .count();
    assert!(
        near_f1 * 10 >= frames * 8,
        "only {near_f1} of {frames} frames resolved a pole near 700 Hz"
    );
}

#[test]
fn formant_slots_are_ordered_and_bounded() {
    let audio = vowel(&[(500.0, 90.0), (1_500.0, 110.0), (2_500.0, 150.0)], 0.5);
    let contour = extract_formants(&audio, &AnalysisSettings::default());

    for i in 0..contour.frame_count() {
        let slots = [contour.f1[i], contour.f2[i], contour.f3[i]];
        for &f in slots.iter().filter(|&&f| f > 0.0) {
            assert!(f > 200.0 && f < 5_000.0, "frame {i} reported {f} Hz");
        }
        let found: Vec<f64> = slots.iter().copied().filter(|&f| f > 0.0).collect();
        assert!(found.windows(2).all(|pair| pair[0] <= pair[1]));
        // missing slots only ever trail
        let first_gap = slots.iter().position(|&f| f == 0.0).unwrap_or(3);
        assert!(slots[first_gap..].iter().all(|&f| f == 0.0));
    }
    assert!(contour.f1_mean > 0.0);
    assert!(contour.f1_mean <= contour.f2_mean);
}

#[test]
fn silent_frames_have_no_formants() {
    let audio = AudioData::new(vec![0.0; 8_000], SAMPLE_RATE);
    let contour = extract_formants(&audio, &AnalysisSettings::default());
    assert!(contour.frame_count() > 0);
    assert!(contour.f1.iter().chain(contour.f2.iter()).all(|&f| f == 0.0));
    assert_eq!(contour.f1_mean, 0.0);
}

#[test]
fn intensity_tracks_level_changes() {
    // 200 Hz fills each 25 ms frame with whole periods
    let mut samples = tone(200.0, 0.1, 0.5);
    samples.extend(tone(200.0, 1.0, 0.5));
    let contour = extract_intensity(&AudioData::new(samples, SAMPLE_RATE));

    let first = contour.values[5];
    let last = contour.values[contour.frame_count() - 5];
    assert_abs_diff_eq!(last - first, 20.0, epsilon = 0.5);
    assert!(contour.dynamic_range >= 19.5);
    assert!(contour.mean > first && contour.mean < last);
}

#[test]
fn syllable_bursts_set_speaking_rate() {
    // sin^2 envelope at 4 Hz gives four loudness peaks per second
    let seconds = 2.0;
    let total = (SAMPLE_RATE as f64 * seconds) as usize;
    let samples = (0..total)
        .map(|i| {
            let t = i as f64 / SAMPLE_RATE as f64;
            let envelope = 0.05 + 0.95 * (PI * 4.0 * t).sin().powi(2);
            (envelope * (2.0 * PI * 200.0 * t).sin() * 0.8) as f32
        })
        .collect();
    let rate = estimate_speaking_rate(
        &AudioData::new(samples, SAMPLE_RATE),
        &AnalysisSettings::default(),
    );

    assert!(
        (7..=9).contains(&rate.estimated_syllables),
        "estimated {} syllables",
        rate.estimated_syllables
    );
    assert_abs_diff_eq!(rate.duration, 2.0, epsilon = 1e-12);
    assert_abs_diff_eq!(rate.syllables_per_second, rate.estimated_syllables as f64 / 2.0);
}

#[test]
fn silence_has_no_syllable_peaks() {
    let rate = estimate_speaking_rate(
        &AudioData::new(vec![0.0; 16_000], SAMPLE_RATE),
        &AnalysisSettings::default(),
    );
    assert_eq!(rate.estimated_syllables, 0);
    assert_eq!(rate.syllables_per_second, 0.0);
}

#[test]
fn bundle_contours_share_one_grid() {
    let audio = vowel(&[(600.0, 100.0), (1_100.0, 120.0)], 0.75);
    let bundle = FeatureAnalyzer::new().analyze(&audio).unwrap();

    let frames = bundle.f0.frame_count();
    assert_eq!(bundle.formants.frame_count(), frames);
    assert_eq!(bundle.intensity.frame_count(), frames);
    assert_abs_diff_eq!(bundle.duration, 0.75, epsilon = 1e-9);
    assert_eq!(bundle.speaking_rate.duration, bundle.duration);

    let range = bundle.pitch_range.expect("pulse train is voiced");
    assert!(range.min <= range.mean && range.mean <= range.max);
    assert!(range.variance >= 0.0);
}

#[test]
fn zero_sample_rate_is_invalid_audio() {
    let err = FeatureAnalyzer::new()
        .analyze(&AudioData::new(vec![0.1; 100], 0))
        .unwrap_err();
    assert!(matches!(err, ProsodyError::InvalidAudio(_)));
}

#[test]
fn buffer_shorter_than_a_frame_yields_empty_contours() {
    let bundle = FeatureAnalyzer::new()
        .analyze(&AudioData::new(vec![0.2; 100], SAMPLE_RATE))
        .unwrap();
    assert_eq!(bundle.f0.frame_count(), 0);
    assert_eq!(bundle.intensity.frame_count(), 0);
    assert!(bundle.pitch_range.is_none());
    assert_eq!(bundle.speaking_rate.estimated_syllables, 0);
}

fn tone(frequency: f64, amplitude: f64, seconds: f64) -> Vec<f32> {
    let total = (SAMPLE_RATE as f64 * seconds) as usize;
    (0..total)
        .map(|i| {
            let t = i as f64 / SAMPLE_RATE as f64;
            (amplitude * (2.0 * PI * frequency * t).sin()) as f32
        })
        .collect()
}

/// 120 Hz impulse train through a cascade of two-pole resonators.
fn vowel(resonances: &[(f64, f64)], seconds: f64) -> AudioData {
    let rate = SAMPLE_RATE as f64;
    let total = (rate * seconds) as usize;
    let period = (rate / 120.0) as usize;
    let mut signal: Vec<f64> = (0..total)
        .map(|i| if i % period == 0 { 1.0 } else { 0.0 })
        .collect();
    for &(frequency, bandwidth) in resonances {
        let radius = (-PI * bandwidth / rate).exp();
        let a1 = 2.0 * radius * (2.0 * PI * frequency / rate).cos();
        let a2 = -radius * radius;
        let (mut y1, mut y2) = (0.0, 0.0);
        for sample in signal.iter_mut() {
            let y = *sample + a1 * y1 + a2 * y2;
            y2 = y1;
            y1 = y;
            *sample = y;
        }
    }
    let peak = signal.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    let samples = signal.iter().map(|v| (v / peak * 0.5) as f32).collect();
    AudioData::new(samples, SAMPLE_RATE)
}
