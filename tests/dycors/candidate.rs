use recas::merit::euclidean_distance;
use recas::prelude::*;

use super::{schedule, unit_cube};

fn mixed_problem() -> BoxProblem {
    BoxProblem::new(vec![-3.0, 0.0, -10.5, 2.0], vec![3.0, 1.0, 10.5, 2.6])
        .unwrap()
        .with_int_var(vec![0, 2])
        .unwrap()
}

#[test]
fn batch_respects_bounds_and_integrality() {
    let problem = mixed_problem();
    let xbest = [1.0, 0.5, -4.0, 2.3];
    let evaluated = vec![xbest.to_vec(), vec![-2.0, 0.1, 7.0, 2.5]];
    let surrogate = |x: &[f64]| x.iter().map(|v| v.abs()).sum::<f64>();
    let mut rng = fastrand::Rng::with_seed(21);

    let batch = candidate_dycors(
        &problem,
        &surrogate,
        &xbest,
        ExistingPoints::new(&evaluated),
        &schedule(&[0.3, 0.5, 0.8, 0.95]),
        Budget::new(2, 40, 12).unwrap(),
        &DycorsConfig::default(),
        &mut rng,
    )
    .unwrap();

    assert_eq!(batch.len(), 4);
    for x in &batch {
        for (i, v) in x.iter().enumerate() {
            assert!(
                (problem.lower_bounds()[i]..=problem.upper_bounds()[i]).contains(v),
                "coordinate {i} out of bounds: {v}"
            );
        }
        assert_eq!(x[0], x[0].round());
        assert_eq!(x[2], x[2].round());
        // Integers inside [-10.5, 10.5] stop at +-10.
        assert!((-10.0..=10.0).contains(&x[2]));
    }
}

#[test]
fn batch_keeps_tolerance_from_known_points() {
    let problem = unit_cube(3);
    let evaluated = vec![vec![0.5, 0.5, 0.5], vec![0.2, 0.8, 0.4]];
    let pending = vec![vec![0.55, 0.45, 0.5]];
    let config = DycorsConfig::builder().dtol(0.05).build().unwrap();
    let mut rng = fastrand::Rng::with_seed(8);

    let batch = CandidateGenerator::new(config)
        .propose(
            &problem,
            &|x: &[f64]| x[0],
            &evaluated[0],
            ExistingPoints::new(&evaluated).with_pending(&pending),
            &schedule(&[0.2, 0.9, 0.9]),
            Budget::new(2, 30, 2).unwrap(),
            &mut rng,
        )
        .unwrap();

    assert!(batch.len() <= 3);
    for (i, x) in batch.iter().enumerate() {
        for p in evaluated.iter().chain(&pending).chain(&batch[..i]) {
            assert!(euclidean_distance(x, p) >= 0.05);
        }
    }
}

#[test]
fn seeded_runs_agree() {
    let problem = unit_cube(5);
    let xbest = vec![0.3; 5];
    let evaluated = vec![xbest.clone()];
    let run = |seed| {
        let mut rng = fastrand::Rng::with_seed(seed);
        candidate_dycors(
            &problem,
            &|x: &[f64]| x.iter().sum::<f64>(),
            &xbest,
            ExistingPoints::new(&evaluated),
            &schedule(&[0.5, 0.95]),
            Budget::new(1, 100, 50).unwrap(),
            &DycorsConfig::default(),
            &mut rng,
        )
        .unwrap()
    };
    assert_eq!(run(99), run(99));
    assert_ne!(run(99), run(100));
}

#[test]
fn pool_perturbs_fewer_coordinates_late_in_the_run() {
    let problem = unit_cube(20);
    let xbest = vec![0.5; 20];
    let generator = CandidateGenerator::default();
    let changed = |evals| {
        let mut rng = fastrand::Rng::with_seed(4);
        let pool = generator
            .generate_pool(&problem, &xbest, Budget::new(0, 500, evals).unwrap(), &mut rng)
            .unwrap();
        pool.iter()
            .map(|c| c.iter().zip(&xbest).filter(|(a, b)| a != b).count())
            .sum::<usize>() as f64
            / pool.len() as f64
    };
    let early = changed(0);
    let late = changed(500);
    // All 20 coordinates early, about one late.
    assert!(early > 19.0, "early: {early}");
    assert!(late < 3.0, "late: {late}");
}

#[test]
fn single_eligible_coordinate_is_always_perturbed() {
    let problem = unit_cube(3);
    let xbest = [0.5, 0.5, 0.5];
    let config = DycorsConfig::builder().subset(vec![2]).build().unwrap();
    let mut rng = fastrand::Rng::with_seed(30);
    let pool = CandidateGenerator::new(config)
        .generate_pool(&problem, &xbest, Budget::new(0, 10, 10).unwrap(), &mut rng)
        .unwrap();
    assert_eq!(pool.len(), 300);
    assert!(pool.iter().all(|c| c[2] != 0.5 && c[0] == 0.5 && c[1] == 0.5));
}

#[test]
fn config_accessors_report_defaults() {
    let config = DycorsConfig::default();
    assert!((config.sampling_radius() - 0.2).abs() < f64::EPSILON);
    assert!((config.dtol() - 1e-3).abs() < f64::EPSILON);
    assert!(config.subset().is_none());

    let config = DycorsConfig::builder()
        .subset(vec![3, 1, 3])
        .build()
        .unwrap();
    assert_eq!(config.subset(), Some(&[1, 3][..]));
}

#[test]
fn errors_surface_through_the_free_function() {
    let problem = unit_cube(2);
    let mut rng = fastrand::Rng::with_seed(0);
    let err = candidate_dycors(
        &problem,
        &|_: &[f64]| 0.0,
        &[0.5, 1.5],
        ExistingPoints::default(),
        &schedule(&[0.5]),
        Budget::new(0, 10, 0).unwrap(),
        &DycorsConfig::default(),
        &mut rng,
    )
    .unwrap_err();
    assert!(matches!(err, Error::IncumbentOutOfBounds { index: 1, .. }));

    let bad = DycorsConfig::builder().subset(vec![0, 5]).build().unwrap();
    let err = candidate_dycors(
        &problem,
        &|_: &[f64]| 0.0,
        &[0.5, 0.5],
        ExistingPoints::default(),
        &schedule(&[0.5]),
        Budget::new(0, 10, 0).unwrap(),
        &bad,
        &mut rng,
    )
    .unwrap_err();
    assert!(matches!(err, Error::InvalidSubset { index: 5, dim: 2 }));
}

#[test]
fn integer_coordinate_outside_subset_is_still_rounded() {
    let problem = BoxProblem::new(vec![0.0, 0.0], vec![2.0, 1.0])
        .unwrap()
        .with_int_var(vec![0])
        .unwrap();
    let config = DycorsConfig::builder().subset(vec![1]).build().unwrap();
    let mut rng = fastrand::Rng::with_seed(2);
    let pool = CandidateGenerator::new(config)
        .generate_pool(&problem, &[0.6, 0.5], Budget::new(0, 10, 3).unwrap(), &mut rng)
        .unwrap();
    assert_eq!(pool.len(), 200);
    assert!(pool.iter().all(|c| c[0] == 1.0));

    let evaluated = vec![vec![0.6, 0.5]];
    let batch = CandidateGenerator::new(DycorsConfig::builder().subset(vec![1]).build().unwrap())
        .propose(
            &problem,
            &|x: &[f64]| x[1],
            &evaluated[0],
            ExistingPoints::new(&evaluated),
            &schedule(&[0.5, 0.9]),
            Budget::new(0, 10, 3).unwrap(),
            &mut rng,
        )
        .unwrap();
    assert!(batch.iter().all(|x| x[0] == 1.0));
}
