use approx::assert_relative_eq;
use prosodyzer::prosody::alignment::{dtw_similarity, min_max_normalize, resample_linear};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const MAX_POINTS: usize = 100;

#[test]
fn identical_nonconstant_series_score_exactly_one() {
    let series = [110.0, 130.0, 180.0, 150.0, 120.0];
    assert_eq!(dtw_similarity(&series, &series, MAX_POINTS), 1.0);

    let long: Vec<f64> = (0..450).map(|i| (i as f64 * 0.05).sin() * 40.0 + 180.0).collect();
    assert_eq!(dtw_similarity(&long, &long, MAX_POINTS), 1.0);
}

#[test]
fn empty_side_scores_zero() {
    assert_eq!(dtw_similarity(&[], &[1.0, 2.0], MAX_POINTS), 0.0);
    assert_eq!(dtw_similarity(&[1.0, 2.0], &[], MAX_POINTS), 0.0);
    assert_eq!(dtw_similarity(&[], &[], MAX_POINTS), 0.0);
}

#[test]
fn similarity_ignores_offset_and_scale() {
    let base: Vec<f64> = (0..80).map(|i| (i as f64 * 0.1).cos()).collect();
    let shifted: Vec<f64> = base.iter().map(|v| v * 35.0 + 200.0).collect();
    assert_relative_eq!(dtw_similarity(&base, &shifted, MAX_POINTS), 1.0, epsilon = 1e-9);
}

#[test]
fn time_stretched_contour_stays_similar() {
    let short: Vec<f64> = (0..40).map(|i| (i as f64 / 39.0 * 3.0).sin()).collect();
    let long: Vec<f64> = (0..90).map(|i| (i as f64 / 89.0 * 3.0).sin()).collect();
    let similarity = dtw_similarity(&short, &long, MAX_POINTS);
    assert!(similarity > 0.9, "similarity={similarity}");
}

#[test]
fn random_series_stay_within_unit_interval() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..200 {
        let lhs = random_series(&mut rng);
        let rhs = random_series(&mut rng);
        let similarity = dtw_similarity(&lhs, &rhs, MAX_POINTS);
        assert!(
            (0.0..=1.0).contains(&similarity),
            "similarity {similarity} out of range for {} vs {} points",
            lhs.len(),
            rhs.len()
        );
    }
}

#[test]
fn resampling_caps_length_and_passes_short_series() {
    let short = vec![1.0, 2.0, 3.0];
    assert_eq!(resample_linear(&short, MAX_POINTS), short);
    let long: Vec<f64> = (0..1_000).map(f64::from).collect();
    let capped = resample_linear(&long, MAX_POINTS);
    assert_eq!(capped.len(), MAX_POINTS);
    assert_relative_eq!(capped[50], 50.0 * 999.0 / 99.0, epsilon = 1e-9);
}

#[test]
fn normalization_spans_unit_interval() {
    let normalized = min_max_normalize(&[-3.0, 1.0, 5.0]);
    assert_eq!(normalized, vec![0.0, 0.5, 1.0]);
    assert!(min_max_normalize(&[]).is_empty());
}

fn random_series(rng: &mut StdRng) -> Vec<f64> {
    let len = rng.random_range(1..=250);
    (0..len).map(|_| rng.random_range(-500.0..500.0)).collect()
}
