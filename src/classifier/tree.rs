/// Single CART-style classification tree.
///
/// Binary classification only: labels are "elevated" / "not elevated" and
/// leaves store the fraction of elevated samples that reached them, so a
/// traversal yields a continuous probability rather than a hard vote.
/// Splits minimize Gini impurity over midpoint thresholds; the feature
/// subset considered at each node is drawn from a seeded ChaCha stream, so
/// a fixed seed always grows the same tree.

use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

/// Growth limits for one tree.
#[derive(Debug, Clone)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Number of candidate features examined per split.
    pub max_features: usize,
}

#[derive(Debug)]
enum Node {
    Leaf {
        prob_elevated: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

#[derive(Debug)]
pub struct ClassificationTree {
    root: Node,
    importances: Vec<f64>,
}

impl ClassificationTree {
    /// Grows a tree over the given sample indices of `x`/`y`.
    ///
    /// `x` rows must all have the same length; `y[i]` labels `x[i]`.
    pub fn fit(
        x: &[Vec<f64>],
        y: &[bool],
        indices: &[usize],
        params: &TreeParams,
        rng: &mut ChaCha8Rng,
    ) -> Self {
        let n_features = x.first().map(|row| row.len()).unwrap_or(0);
        let mut importances = vec![0.0; n_features];
        let root = build(x, y, indices, 0, params, rng, &mut importances);

        // Normalize importances so trees contribute comparably to the forest.
        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            for imp in &mut importances {
                *imp /= total;
            }
        }

        Self { root, importances }
    }

    /// Probability that the sample belongs to the elevated class.
    pub fn prob_elevated(&self, features: &[f64]) -> f64 {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf { prob_elevated } => return *prob_elevated,
                Node::Split { feature, threshold, left, right } => {
                    node = if features[*feature] <= *threshold { left } else { right };
                }
            }
        }
    }

    /// Normalized per-feature importance accumulated from split gains.
    pub fn importances(&self) -> &[f64] {
        &self.importances
    }
}

fn gini(y: &[bool], indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.0;
    }
    let n = indices.len() as f64;
    let positives = indices.iter().filter(|&&i| y[i]).count() as f64;
    let p = positives / n;
    2.0 * p * (1.0 - p)
}

fn leaf(y: &[bool], indices: &[usize]) -> Node {
    let prob = if indices.is_empty() {
        0.5
    } else {
        indices.iter().filter(|&&i| y[i]).count() as f64 / indices.len() as f64
    };
    Node::Leaf { prob_elevated: prob }
}

fn build(
    x: &[Vec<f64>],
    y: &[bool],
    indices: &[usize],
    depth: usize,
    params: &TreeParams,
    rng: &mut ChaCha8Rng,
    importances: &mut [f64],
) -> Node {
    let impurity = gini(y, indices);
    if depth >= params.max_depth || indices.len() < params.min_samples_split || impurity < 1e-10 {
        return leaf(y, indices);
    }

    match find_best_split(x, y, indices, impurity, params, rng) {
        Some(split) => {
            if split.left.len() < params.min_samples_leaf
                || split.right.len() < params.min_samples_leaf
            {
                return leaf(y, indices);
            }
            importances[split.feature] += split.gain * indices.len() as f64;

            let left = build(x, y, &split.left, depth + 1, params, rng, importances);
            let right = build(x, y, &split.right, depth + 1, params, rng, importances);
            Node::Split {
                feature: split.feature,
                threshold: split.threshold,
                left: Box::new(left),
                right: Box::new(right),
            }
        }
        None => leaf(y, indices),
    }
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    left: Vec<usize>,
    right: Vec<usize>,
    gain: f64,
}

fn find_best_split(
    x: &[Vec<f64>],
    y: &[bool],
    indices: &[usize],
    parent_impurity: f64,
    params: &TreeParams,
    rng: &mut ChaCha8Rng,
) -> Option<BestSplit> {
    let n_features = x.first().map(|row| row.len()).unwrap_or(0);

    let mut candidates: Vec<usize> = (0..n_features).collect();
    candidates.shuffle(rng);
    candidates.truncate(params.max_features.max(1));

    let mut best: Option<BestSplit> = None;
    let mut best_gain = 0.0;

    for &feature in &candidates {
        let mut values: Vec<f64> = indices.iter().map(|&i| x[i][feature]).collect();
        values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        values.dedup();

        for pair in values.windows(2) {
            let threshold = (pair[0] + pair[1]) / 2.0;
            let (left, right): (Vec<usize>, Vec<usize>) =
                indices.iter().partition(|&&i| x[i][feature] <= threshold);
            if left.is_empty() || right.is_empty() {
                continue;
            }

            let n_left = left.len() as f64;
            let n_right = right.len() as f64;
            let weighted = (n_left * gini(y, &left) + n_right * gini(y, &right))
                / (n_left + n_right);
            let gain = parent_impurity - weighted;

            if gain > best_gain {
                best_gain = gain;
                best = Some(BestSplit { feature, threshold, left, right, gain });
            }
        }
    }

    best
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
