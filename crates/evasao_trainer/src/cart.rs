//! CART classification tree builder
//!
//! Exact-greedy Gini splits over `f64` features. Each node considers a
//! random subset of features; thresholds sit halfway between consecutive
//! distinct values. Leaves store the fraction of dropouts they hold, which
//! is what the forest averages at inference.

use evasao_core::{Node, Tree};

use crate::deterministic::LcgRng;

/// Training parameters for a single tree
#[derive(Clone, Debug)]
pub struct TreeConfig {
    /// `None` grows until leaves are pure or too small to split
    pub max_depth: Option<usize>,
    pub min_samples_leaf: usize,
    /// Candidate features drawn at each node
    pub max_features: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_leaf: 1,
            max_features: usize::MAX,
        }
    }
}

/// Split candidate; ties keep the earliest feature and lowest threshold
#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature_idx: usize,
    threshold: f64,
    impurity: f64,
}

/// Weighted Gini impurity of a node with `positives` dropouts out of `n`
fn gini(positives: usize, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let p = positives as f64 / n as f64;
    2.0 * p * (1.0 - p)
}

#[derive(Debug, Clone, Copy)]
enum Side {
    Left,
    Right,
}

/// Samples waiting to become a node, with the slot that will point at it
struct PendingNode {
    indices: Vec<usize>,
    depth: usize,
    parent: Option<(usize, Side)>,
}

/// Build a classification tree over (possibly repeated) sample indices
pub struct CartBuilder<'a> {
    features: &'a [Vec<f64>],
    labels: &'a [u8],
    config: TreeConfig,
    feature_count: usize,
}

impl<'a> CartBuilder<'a> {
    pub fn new(features: &'a [Vec<f64>], labels: &'a [u8], config: TreeConfig) -> Self {
        debug_assert_eq!(features.len(), labels.len());
        let feature_count = features.first().map_or(0, Vec::len);
        Self {
            features,
            labels,
            config,
            feature_count,
        }
    }

    /// Build tree from the given samples.
    ///
    /// Nodes are grown from an explicit work stack in pre-order, so node
    /// ids and random draws match a depth-first recursion while depth is
    /// bounded only by the heap.
    pub fn build(&self, indices: &[usize], rng: &mut LcgRng) -> Tree {
        let mut nodes: Vec<Node> = Vec::new();
        let mut stack = vec![PendingNode {
            indices: indices.to_vec(),
            depth: 0,
            parent: None,
        }];

        while let Some(pending) = stack.pop() {
            let current_idx = nodes.len() as i32;
            if let Some((parent, side)) = pending.parent {
                let node = &mut nodes[parent];
                match side {
                    Side::Left => node.left = current_idx,
                    Side::Right => node.right = current_idx,
                }
            }

            let indices = pending.indices;
            let positives = self.count_positives(&indices);
            let probability = if indices.is_empty() {
                0.0
            } else {
                positives as f64 / indices.len() as f64
            };

            let depth_reached = self.config.max_depth.map_or(false, |max| pending.depth >= max);
            if depth_reached
                || positives == 0
                || positives == indices.len()
                || indices.len() < 2 * self.config.min_samples_leaf
            {
                nodes.push(Node::leaf(current_idx, probability));
                continue;
            }

            let parent_impurity = gini(positives, indices.len());
            let split = match self.find_best_split(&indices, rng) {
                Some(s) if s.impurity < parent_impurity - 1e-12 => s,
                _ => {
                    nodes.push(Node::leaf(current_idx, probability));
                    continue;
                }
            };

            let (left, right): (Vec<usize>, Vec<usize>) = indices
                .iter()
                .partition(|&&i| self.features[i][split.feature_idx] <= split.threshold);

            // children are patched in when they are popped
            nodes.push(Node::internal(
                current_idx,
                split.feature_idx as i32,
                split.threshold,
                -1,
                -1,
            ));

            let parent = current_idx as usize;
            stack.push(PendingNode {
                indices: right,
                depth: pending.depth + 1,
                parent: Some((parent, Side::Right)),
            });
            stack.push(PendingNode {
                indices: left,
                depth: pending.depth + 1,
                parent: Some((parent, Side::Left)),
            });
        }

        Tree::new(nodes)
    }

    fn count_positives(&self, indices: &[usize]) -> usize {
        indices.iter().filter(|&&i| self.labels[i] == 1).count()
    }

    /// Best split among a random subset of features
    fn find_best_split(&self, indices: &[usize], rng: &mut LcgRng) -> Option<SplitCandidate> {
        let k = self.config.max_features.clamp(1, self.feature_count.max(1));
        let mut candidates = rng.sample_without_replacement(self.feature_count, k);
        candidates.sort_unstable();

        let mut best: Option<SplitCandidate> = None;
        for feature_idx in candidates {
            if let Some(candidate) = self.best_split_for_feature(indices, feature_idx) {
                if best.map_or(true, |b| candidate.impurity < b.impurity) {
                    best = Some(candidate);
                }
            }
        }
        best
    }

    fn best_split_for_feature(&self, indices: &[usize], feature_idx: usize) -> Option<SplitCandidate> {
        let mut column: Vec<(f64, u8)> = indices
            .iter()
            .map(|&i| (self.features[i][feature_idx], self.labels[i]))
            .collect();
        column.sort_by(|a, b| a.0.total_cmp(&b.0));

        let n = column.len();
        let total_positives = column.iter().filter(|(_, l)| *l == 1).count();
        let min_leaf = self.config.min_samples_leaf.max(1);

        let mut best: Option<SplitCandidate> = None;
        let mut left_positives = 0;

        for i in 0..n.saturating_sub(1) {
            left_positives += column[i].1 as usize;
            let left_n = i + 1;
            let right_n = n - left_n;

            if column[i].0 == column[i + 1].0 || left_n < min_leaf || right_n < min_leaf {
                continue;
            }

            let impurity = (left_n as f64 * gini(left_positives, left_n)
                + right_n as f64 * gini(total_positives - left_positives, right_n))
                / n as f64;

            if best.map_or(true, |b| impurity < b.impurity) {
                best = Some(SplitCandidate {
                    feature_idx,
                    threshold: (column[i].0 + column[i + 1].0) / 2.0,
                    impurity,
                });
            }
        }

        best
    }
}
