//! A full surrogate-assisted run on DTLZ2 with three objectives.
//!
//! The surrogate here is inverse-distance weighting over the scalarized
//! history, rebuilt before every batch. Any model exposing point
//! predictions can take its place.
//!
//! Run with: `cargo run --example dycors_loop`

use core::f64::consts::PI;

use recas::merit::euclidean_distance;
use recas::prelude::*;

const DIM: usize = 8;
const N_OBJ: usize = 3;

fn dtlz2(x: &[f64]) -> Vec<f64> {
    let k = N_OBJ - 1;
    let g: f64 = x[k..].iter().map(|xi| (xi - 0.5).powi(2)).sum();
    (0..N_OBJ)
        .map(|m| {
            let cos: f64 = x[..k - m].iter().map(|xi| (xi * PI / 2.0).cos()).product();
            let sin = if m > 0 { (x[k - m] * PI / 2.0).sin() } else { 1.0 };
            (1.0 + g) * cos * sin
        })
        .collect()
}

fn scalarize(f: &[f64]) -> f64 {
    f.iter().sum()
}

/// Inverse-distance-weighted interpolation of the scalarized objectives.
struct Idw {
    points: Vec<Vec<f64>>,
    values: Vec<f64>,
}

impl Idw {
    fn fit(history: &[Evaluation]) -> Self {
        Self {
            points: history.iter().map(|e| e.x.clone()).collect(),
            values: history.iter().map(|e| scalarize(&e.objectives)).collect(),
        }
    }
}

impl Surrogate for Idw {
    fn predict(&self, points: &[Vec<f64>]) -> Vec<f64> {
        points
            .iter()
            .map(|x| {
                let mut num = 0.0;
                let mut den = 0.0;
                for (p, v) in self.points.iter().zip(&self.values) {
                    let d = euclidean_distance(x, p);
                    if d < 1e-12 {
                        return *v;
                    }
                    let w = d.powi(-2);
                    num += w * v;
                    den += w;
                }
                num / den
            })
            .collect()
    }
}

fn main() -> recas::Result<()> {
    let problem = BoxProblem::new(vec![0.0; DIM], vec![1.0; DIM])?
        .with_name("DTLZ2")
        .with_n_objectives(N_OBJ);

    let session = DycorsSession::builder(problem)
        .max_evals(200)
        .batch_size(4)
        .incumbent_merit(scalarize)
        .seed(2024)
        .build()?;

    // Random initial design of init_evals points.
    let mut rng = fastrand::Rng::with_seed(7);
    for _ in 0..session.budget().init_evals {
        let x: Vec<f64> = (0..DIM).map(|_| rng.f64()).collect();
        let f = dtlz2(&x);
        session.tell(x, f)?;
    }
    let initial = session.best().map(|e| scalarize(&e.objectives));

    session.optimize(Idw::fit, dtlz2)?;

    let best = session.best().ok_or(Error::NoCompletedEvaluations)?;
    println!(
        "{} evaluations, best scalarized value {:.4} (initial design: {:.4})",
        session.n_evaluations(),
        scalarize(&best.objectives),
        initial.unwrap_or(f64::NAN),
    );

    let dir = std::env::temp_dir();
    match session.export_results(&dir, 1) {
        Ok(path) => println!("results written to {}", path.display()),
        Err(e) => eprintln!("could not write results: {e}"),
    }
    Ok(())
}
