use recas::merit::euclidean_distance;
use recas::prelude::*;

use super::{schedule, unit_cube};

#[test]
fn flat_surrogate_yields_one_point_away_from_history() {
    let problem = unit_cube(2);
    let evaluated = vec![vec![0.5, 0.5]];
    let mut rng = fastrand::Rng::with_seed(1);
    let batch = candidate_dycors(
        &problem,
        &|_: &[f64]| 0.0,
        &evaluated[0],
        ExistingPoints::new(&evaluated),
        &schedule(&[0.5]),
        Budget::new(1, 50, 1).unwrap(),
        &DycorsConfig::default(),
        &mut rng,
    )
    .unwrap();
    assert_eq!(batch.len(), 1);
    assert!(euclidean_distance(&batch[0], &evaluated[0]) >= 1e-3);
}

#[test]
fn weight_trades_exploration_for_prediction() {
    let evaluated = vec![vec![0.0, 0.0]];
    let far = vec![0.9, 0.9];
    let near = vec![0.1, 0.1];
    let middle = vec![0.5, 0.5];
    let candidates = vec![far.clone(), near.clone(), middle.clone()];
    let surrogate = |x: &[f64]| {
        if x[0] > 0.8 {
            5.0
        } else if x[0] < 0.2 {
            0.0
        } else {
            2.0
        }
    };
    let select = |w: &[f64]| {
        weighted_distance_merit(
            &surrogate,
            &candidates,
            ExistingPoints::new(&evaluated),
            &schedule(w),
            1e-3,
        )
        .unwrap()
    };

    assert_eq!(select(&[0.0]), vec![far.clone()]);
    assert_eq!(select(&[1.0]), vec![near.clone()]);
    assert_eq!(select(&[0.0, 0.5, 1.0]), vec![far, middle, near]);
}

#[test]
fn crowded_pool_yields_empty_batch() {
    let evaluated = vec![vec![0.5, 0.5]];
    let candidates: Vec<Vec<f64>> = (0..20)
        .map(|i| vec![0.5 + f64::from(i) * 1e-5, 0.5])
        .collect();
    let batch = weighted_distance_merit(
        &|x: &[f64]| x[0],
        &candidates,
        ExistingPoints::new(&evaluated),
        &schedule(&[0.3, 0.5, 0.8]),
        1e-3,
    )
    .unwrap();
    assert!(batch.is_empty());
}

#[test]
fn probability_starts_at_upper_clamp() {
    for (dim, expected) in [(4, 1.0), (20, 1.0), (40, 0.5), (200, 0.1)] {
        let p = perturbation_probability(dim, Budget::new(10, 100, 10).unwrap());
        assert!((p - expected).abs() < 1e-12, "dim {dim}: {p}");
    }
}

#[test]
fn probability_ends_at_floor() {
    for dim in [1, 4, 40, 200] {
        let floor = (1.0 / dim as f64).min(1.0);
        let at_end = perturbation_probability(dim, Budget::new(10, 100, 100).unwrap());
        let near_end = perturbation_probability(dim, Budget::new(10, 100, 99).unwrap());
        assert!((at_end - floor).abs() < 1e-12);
        assert!((near_end - floor).abs() < 1e-2);
        assert!(near_end >= floor);
    }
}

#[test]
fn unit_rescale_is_affine_invariant() {
    let x = [3.0, -1.0, 7.5, 2.0, 0.0];
    let base = unit_rescale(&x);
    assert!(base.iter().all(|v| (0.0..=1.0).contains(v)));
    for (a, b) in [(2.0, 0.0), (0.01, 100.0), (1e6, -3.0)] {
        let y: Vec<f64> = x.iter().map(|v| a * v + b).collect();
        for (p, q) in unit_rescale(&y).iter().zip(&base) {
            assert!((p - q).abs() < 1e-9);
        }
    }
}

#[test]
fn batch_grows_as_tolerance_shrinks() {
    let candidates: Vec<Vec<f64>> = (0..=10).map(|i| vec![f64::from(i) / 10.0]).collect();
    let evaluated = vec![vec![0.5]];
    let weights = schedule(&[1.0; 11]);
    let mut prev = 0;
    for dtol in [0.55, 0.35, 0.25, 0.15, 0.05, 0.0] {
        let n = weighted_distance_merit(
            &|x: &[f64]| x[0],
            &candidates,
            ExistingPoints::new(&evaluated),
            &weights,
            dtol,
        )
        .unwrap()
        .len();
        assert!(n <= weights.len());
        assert!(n >= prev, "dtol {dtol}: {n} < {prev}");
        prev = n;
    }
    assert_eq!(prev, 11);
}

#[test]
fn every_batch_point_is_feasible_across_seeds() {
    let problem = BoxProblem::new(vec![-1.0, 0.0, 5.0], vec![1.0, 9.0, 6.0])
        .unwrap()
        .with_int_var(vec![1])
        .unwrap();
    let xbest = [0.0, 4.0, 5.5];
    let evaluated = vec![xbest.to_vec()];
    for seed in 0..10 {
        let mut rng = fastrand::Rng::with_seed(seed);
        let batch = candidate_dycors(
            &problem,
            &|x: &[f64]| x[0] - x[2],
            &xbest,
            ExistingPoints::new(&evaluated),
            &schedule(&[0.3, 0.5, 0.8, 0.95]),
            Budget::new(1, 60, 30).unwrap(),
            &DycorsConfig::default(),
            &mut rng,
        )
        .unwrap();
        assert!(batch.len() <= 4);
        for x in &batch {
            assert!((-1.0..=1.0).contains(&x[0]));
            assert!((0.0..=9.0).contains(&x[1]) && x[1].fract() == 0.0);
            assert!((5.0..=6.0).contains(&x[2]));
        }
    }
}
