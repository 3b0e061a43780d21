/// Random forest over bootstrapped classification trees.
///
/// Trees are grown in parallel with rayon; each tree gets its own seeded
/// ChaCha stream (base seed + tree index) and its own bootstrap sample, so
/// training is deterministic for a fixed seed regardless of thread
/// scheduling. Probability estimates average the per-tree leaf
/// probabilities, which keeps the output continuous-valued instead of a
/// thresholded vote.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use super::tree::{ClassificationTree, TreeParams};

/// Forest hyperparameters.
///
/// Defaults match the training setup the service has always used:
/// 100 trees, depth cap 15, seed 42.
#[derive(Debug, Clone)]
pub struct ForestParams {
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 15,
            min_samples_split: 2,
            min_samples_leaf: 1,
            seed: 42,
        }
    }
}

#[derive(Debug)]
pub struct RandomForest {
    trees: Vec<ClassificationTree>,
    importances: Vec<f64>,
}

impl RandomForest {
    /// Fits the forest on the full training matrix. Callers validate shape;
    /// this assumes `x` is non-empty and aligned with `y`.
    pub fn fit(x: &[Vec<f64>], y: &[bool], params: &ForestParams) -> Self {
        let n_samples = x.len();
        let n_features = x.first().map(|row| row.len()).unwrap_or(0);
        // sqrt(n_features) candidates per split, the usual classification heuristic.
        let max_features = (n_features as f64).sqrt().ceil() as usize;

        let tree_params = TreeParams {
            max_depth: params.max_depth,
            min_samples_split: params.min_samples_split,
            min_samples_leaf: params.min_samples_leaf,
            max_features,
        };

        let trees: Vec<ClassificationTree> = (0..params.n_trees)
            .into_par_iter()
            .map(|i| {
                let tree_seed = params.seed.wrapping_add(i as u64);
                let mut rng = ChaCha8Rng::seed_from_u64(tree_seed);
                let sample: Vec<usize> =
                    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect();
                ClassificationTree::fit(x, y, &sample, &tree_params, &mut rng)
            })
            .collect();

        // Aggregate and renormalize per-feature importances across trees.
        let mut importances = vec![0.0; n_features];
        for tree in &trees {
            for (slot, imp) in importances.iter_mut().zip(tree.importances()) {
                *slot += imp;
            }
        }
        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            for imp in &mut importances {
                *imp /= total;
            }
        }

        Self { trees, importances }
    }

    /// Mean of the per-tree elevated-class probabilities, in [0, 1].
    pub fn prob_elevated(&self, features: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.5;
        }
        let sum: f64 = self.trees.iter().map(|t| t.prob_elevated(features)).sum();
        sum / self.trees.len() as f64
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Normalized per-feature importances, in feature-column order.
    pub fn importances(&self) -> &[f64] {
        &self.importances
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
