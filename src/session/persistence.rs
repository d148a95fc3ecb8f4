use std::path::Path;

use crate::problem::OptimizationProblem;

use super::{DycorsSession, Evaluation};

/// A serializable snapshot of a session's evaluations and pending points.
///
/// The problem, generator settings and RNG state are **not** included:
/// restore a snapshot into a session built with the same configuration.
///
/// # Schema versioning
///
/// The current version is `1`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SessionSnapshot {
    /// Schema version for forward compatibility.
    pub version: u32,
    /// Completed evaluations, in the order they were told.
    pub evaluations: Vec<Evaluation>,
    /// Points dispatched but not yet evaluated.
    pub pending: Vec<Vec<f64>>,
    /// Position in the cyclic weight pattern.
    #[serde(default)]
    pub weight_offset: usize,
}

impl<P: OptimizationProblem> DycorsSession<P> {
    /// Capture the current evaluations and pending points.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.lock();
        SessionSnapshot {
            version: 1,
            evaluations: state.evaluations(),
            pending: state.pending.clone(),
            weight_offset: state.weight_offset,
        }
    }

    /// Save the session state to a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created or written.
    pub fn save(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let path = path.as_ref();
        let snapshot = self.snapshot();

        // Write next to the target, then rename over it.
        let parent = path.parent().unwrap_or(Path::new("."));
        let tmp_path = parent.join(format!(
            ".{}.tmp",
            path.file_name().unwrap_or_default().to_string_lossy()
        ));
        let file = std::fs::File::create(&tmp_path)?;
        serde_json::to_writer_pretty(file, &snapshot).map_err(std::io::Error::other)?;
        std::fs::rename(&tmp_path, path)
    }

    /// Replace this session's evaluations and pending points with those
    /// stored in a JSON file written by [`save`](Self::save).
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read or parsed, or if a
    /// stored point or objective vector does not fit the problem.
    pub fn restore(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let file = std::fs::File::open(path)?;
        let snapshot: SessionSnapshot = serde_json::from_reader(file)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        self.restore_snapshot(snapshot)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    /// Replace this session's evaluations and pending points with a snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`DimensionMismatch`](crate::Error::DimensionMismatch),
    /// [`PointOutOfBounds`](crate::Error::PointOutOfBounds) or
    /// [`ObjectiveDimensionMismatch`](crate::Error::ObjectiveDimensionMismatch)
    /// if the snapshot does not fit the problem. The session is unchanged
    /// on error.
    pub fn restore_snapshot(&self, snapshot: SessionSnapshot) -> crate::Result<()> {
        let n_obj = self.problem.n_objectives();
        for eval in &snapshot.evaluations {
            self.check_point(&eval.x)?;
            if eval.objectives.len() != n_obj {
                return Err(crate::Error::ObjectiveDimensionMismatch {
                    expected: n_obj,
                    got: eval.objectives.len(),
                });
            }
        }
        for x in &snapshot.pending {
            self.check_point(x)?;
        }

        let mut state = self.state.lock();
        let (points, objectives) = snapshot
            .evaluations
            .into_iter()
            .map(|e| (e.x, e.objectives))
            .unzip();
        state.points = points;
        state.objectives = objectives;
        state.pending = snapshot.pending;
        state.weight_offset = snapshot.weight_offset;
        trace_info!(evals = state.points.len(), "session restored");
        Ok(())
    }
}
