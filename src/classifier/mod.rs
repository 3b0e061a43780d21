/// Trained binary classifier for the elevated ("High High") state.
///
/// `RiskModel` wraps the random forest behind the narrow contract the risk
/// service relies on: train once at startup, then score feature vectors to
/// continuous probabilities. The model is read-only after training — there
/// is no incremental retraining path.

pub mod forest;
pub mod tree;

pub use forest::{ForestParams, RandomForest};

use crate::model::{RiskError, FEATURE_COLUMNS};

#[derive(Debug)]
pub struct RiskModel {
    forest: RandomForest,
}

impl RiskModel {
    /// Trains the classifier on aligned feature vectors and labels.
    ///
    /// Fails with `TrainingDataInvalid` when either input is empty or the
    /// lengths disagree — the service cannot start without a usable model,
    /// so this is a fatal startup error rather than a degradable one.
    pub fn train(
        features: &[Vec<f64>],
        labels: &[bool],
        params: ForestParams,
    ) -> Result<Self, RiskError> {
        if features.is_empty() || features.len() != labels.len() {
            return Err(RiskError::TrainingDataInvalid {
                features: features.len(),
                labels: labels.len(),
            });
        }
        Ok(Self { forest: RandomForest::fit(features, labels, &params) })
    }

    /// Estimated probability that the given conditions produce an elevated
    /// state, in [0, 1]. Deterministic for a fixed trained state and input.
    ///
    /// A probability outside [0, 1] means the classifier contract was
    /// violated and is surfaced as an error rather than clamped: downstream
    /// clamping exists only to bound the per-sensor jitter, not to mask
    /// model misbehavior.
    pub fn score(&self, features: &[f64]) -> Result<f64, RiskError> {
        let p = self.forest.prob_elevated(features);
        if !(0.0..=1.0).contains(&p) || p.is_nan() {
            return Err(RiskError::ScoreOutOfRange(p));
        }
        Ok(p)
    }

    /// Feature importances paired with column names, sorted descending.
    /// Printed at startup so operators can see what drives the model.
    pub fn importance_ranking(&self) -> Vec<(&'static str, f64)> {
        let mut ranking: Vec<(&'static str, f64)> = FEATURE_COLUMNS
            .iter()
            .copied()
            .zip(self.forest.importances().iter().copied())
            .collect();
        ranking.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranking
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
