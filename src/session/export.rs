use std::io::Write;
use std::path::{Path, PathBuf};

use crate::problem::OptimizationProblem;

use super::{DycorsSession, Evaluation};

/// Write evaluations as a whitespace-separated table.
///
/// One row per evaluation: the point's coordinates followed by its
/// objective values, each in scientific notation.
///
/// # Errors
///
/// Returns an I/O error if writing fails.
///
/// # Examples
///
/// ```
/// use recas::session::{Evaluation, write_results};
///
/// let evals = vec![Evaluation { x: vec![0.5, 1.0], objectives: vec![2.0] }];
/// let mut buf = Vec::new();
/// write_results(&mut buf, &evals).unwrap();
///
/// let row: Vec<f64> = String::from_utf8(buf)
///     .unwrap()
///     .split_whitespace()
///     .map(|v| v.parse().unwrap())
///     .collect();
/// assert_eq!(row, vec![0.5, 1.0, 2.0]);
/// ```
pub fn write_results(mut writer: impl Write, evaluations: &[Evaluation]) -> std::io::Result<()> {
    for eval in evaluations {
        let mut values = eval.x.iter().chain(&eval.objectives);
        if let Some(first) = values.next() {
            write!(writer, "{first:.18e}")?;
        }
        for v in values {
            write!(writer, " {v:.18e}")?;
        }
        writeln!(writer)?;
    }
    writer.flush()
}

/// Result file name: `{algorithm}_{problem}_{n_objectives}_{dim}_{trial}.txt`.
///
/// # Examples
///
/// ```
/// use recas::session::result_file_name;
///
/// assert_eq!(result_file_name("RECAS", "DTLZ2", 3, 10, 1), "RECAS_DTLZ2_3_10_1.txt");
/// ```
#[must_use]
pub fn result_file_name(
    algorithm: &str,
    problem: &str,
    n_objectives: usize,
    dim: usize,
    trial: usize,
) -> String {
    format!("{algorithm}_{problem}_{n_objectives}_{dim}_{trial}.txt")
}

impl<P: OptimizationProblem> DycorsSession<P> {
    /// Write all completed evaluations as a result table.
    ///
    /// See [`write_results`] for the format.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if writing fails.
    pub fn to_results(&self, writer: impl Write) -> std::io::Result<()> {
        write_results(writer, &self.evaluations())
    }

    /// Write the result table into `dir` under the name from
    /// [`result_file_name`] and return the file's path.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created or written.
    pub fn export_results(&self, dir: impl AsRef<Path>, trial: usize) -> std::io::Result<PathBuf> {
        let name = result_file_name(
            &self.algorithm_name,
            self.problem.name(),
            self.problem.n_objectives(),
            self.problem.dim(),
            trial,
        );
        let path = dir.as_ref().join(name);
        let file = std::fs::File::create(&path)?;
        self.to_results(std::io::BufWriter::new(file))?;
        Ok(path)
    }
}
