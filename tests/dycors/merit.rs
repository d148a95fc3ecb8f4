use recas::merit::{euclidean_distance, min_distances};
use recas::prelude::*;

use super::schedule;

/// A 1-D grid `0.0, 0.1, ..., 1.0` as candidates.
fn grid() -> Vec<Vec<f64>> {
    (0..=10).map(|i| vec![f64::from(i) / 10.0]).collect()
}

#[test]
fn pure_prediction_weight_takes_ranked_minima() {
    let candidates = grid();
    let surrogate = |x: &[f64]| (x[0] - 0.62).abs();
    let batch = weighted_distance_merit(
        &surrogate,
        &candidates,
        ExistingPoints::default(),
        &schedule(&[1.0, 1.0, 1.0]),
        0.0,
    )
    .unwrap();
    assert_eq!(batch, vec![vec![0.6], vec![0.7], vec![0.5]]);
}

#[test]
fn pure_distance_weight_spreads_points() {
    let candidates = grid();
    let evaluated = vec![vec![0.0]];
    let batch = weighted_distance_merit(
        &|x: &[f64]| x[0],
        &candidates,
        ExistingPoints::new(&evaluated),
        &schedule(&[0.0, 0.0]),
        1e-3,
    )
    .unwrap();
    assert_eq!(batch[0], vec![1.0]);
    assert_eq!(batch[1], vec![0.5]);
}

#[test]
fn pending_points_repel_like_evaluated_ones() {
    let candidates = grid();
    let pending = vec![vec![1.0]];
    let existing = ExistingPoints::new(&[]).with_pending(&pending);
    assert!(!existing.is_empty());

    let batch = weighted_distance_merit(
        &|_: &[f64]| 0.0,
        &candidates,
        existing,
        &schedule(&[0.5]),
        1e-3,
    )
    .unwrap();
    assert_eq!(batch, vec![vec![0.0]]);
}

#[test]
fn no_history_flat_surrogate_picks_first_candidate() {
    // Every merit ties; the earliest pool entry wins.
    let candidates = vec![vec![0.3, 0.3], vec![0.9, 0.1], vec![0.2, 0.7]];
    let batch = MeritSelector::default()
        .select(
            &|_: &[f64]| 1.0,
            &candidates,
            ExistingPoints::default(),
            &schedule(&[0.5]),
        )
        .unwrap();
    assert_eq!(batch, vec![vec![0.3, 0.3]]);
}

#[test]
fn selected_points_are_distinct_pool_members() {
    let mut rng = fastrand::Rng::with_seed(17);
    let candidates: Vec<Vec<f64>> = (0..200).map(|_| vec![rng.f64(), rng.f64()]).collect();
    let evaluated = vec![vec![0.5, 0.5]];
    let batch = weighted_distance_merit(
        &|x: &[f64]| x[0] * x[1],
        &candidates,
        ExistingPoints::new(&evaluated),
        &schedule(&[0.3, 0.5, 0.8, 0.95, 0.3, 0.5]),
        1e-3,
    )
    .unwrap();
    assert_eq!(batch.len(), 6);
    for (i, a) in batch.iter().enumerate() {
        assert!(candidates.contains(a));
        for b in &batch[i + 1..] {
            assert!(euclidean_distance(a, b) >= 1e-3);
        }
    }
}

#[test]
fn duplicate_candidates_are_picked_once() {
    let candidates = vec![vec![0.4]; 5];
    let batch = weighted_distance_merit(
        &|_: &[f64]| 0.0,
        &candidates,
        ExistingPoints::default(),
        &schedule(&[0.5, 0.5, 0.5]),
        1e-3,
    )
    .unwrap();
    assert_eq!(batch, vec![vec![0.4]]);
}

#[test]
fn min_distances_cover_evaluated_and_pending() {
    let evaluated = vec![vec![0.0, 0.0]];
    let pending = vec![vec![3.0, 4.0]];
    let d = min_distances(
        &[vec![3.0, 0.0], vec![3.0, 5.0]],
        ExistingPoints::new(&evaluated).with_pending(&pending),
    );
    assert!((d[0] - 3.0).abs() < 1e-12);
    assert!((d[1] - 1.0).abs() < 1e-12);
}

#[test]
fn invalid_tolerance_is_rejected() {
    assert!(matches!(
        MeritSelector::new(-1.0),
        Err(Error::InvalidTolerance(_))
    ));
    assert!(MeritSelector::new(f64::NAN).is_err());
    assert!(MeritSelector::new(0.0).is_ok());
}

#[test]
fn surrogate_with_wrong_output_length_is_rejected() {
    struct Short;
    impl Surrogate for Short {
        fn predict(&self, points: &[Vec<f64>]) -> Vec<f64> {
            vec![0.0; points.len() - 1]
        }
    }
    let err = weighted_distance_merit(
        &Short,
        &grid(),
        ExistingPoints::default(),
        &schedule(&[0.5]),
        1e-3,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        Error::PredictionLengthMismatch { expected: 11, got: 10 }
    ));
}
