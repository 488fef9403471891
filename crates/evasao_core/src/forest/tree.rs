//! Decision tree structures for forest inference
//!
//! Internal nodes split on `features[feature_idx] <= threshold`; leaves
//! carry the fraction of dropout samples that reached them.

use serde::{Deserialize, Serialize};

/// One node of a tree, stored flat and addressed by position.
///
/// Leaves have `feature_idx == -1`, no children and a `leaf` probability.
/// Split nodes name a feature column and two child positions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    pub id: i32,
    pub left: i32,
    pub right: i32,
    pub feature_idx: i32,
    /// `value <= threshold` goes left
    pub threshold: f64,
    pub leaf: Option<f64>,
}

impl Node {
    pub fn internal(id: i32, feature_idx: i32, threshold: f64, left: i32, right: i32) -> Self {
        Self {
            id,
            left,
            right,
            feature_idx,
            threshold,
            leaf: None,
        }
    }

    pub fn leaf(id: i32, probability: f64) -> Self {
        Self {
            id,
            left: -1,
            right: -1,
            feature_idx: -1,
            threshold: 0.0,
            leaf: Some(probability),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.feature_idx == -1 || self.leaf.is_some()
    }
}

/// A single classification tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tree {
    /// Pre-order node list; position 0 is the root
    pub nodes: Vec<Node>,
}

impl Tree {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Dropout probability for a feature vector.
    ///
    /// Assumes a validated tree; a broken link yields 0.0.
    pub fn evaluate(&self, features: &[f64]) -> f64 {
        let mut idx = 0usize;

        loop {
            let Some(node) = self.nodes.get(idx) else {
                return 0.0;
            };

            if node.is_leaf() {
                return node.leaf.unwrap_or(0.0);
            }

            let Some(&value) = features.get(node.feature_idx as usize) else {
                return 0.0;
            };

            let next = if value <= node.threshold {
                node.left
            } else {
                node.right
            };
            if next < 0 {
                return 0.0;
            }
            idx = next as usize;
        }
    }

    /// Depth of the deepest leaf (root alone is depth 0)
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(0usize, 0usize)];

        while let Some((idx, depth)) = stack.pop() {
            let Some(node) = self.nodes.get(idx) else {
                continue;
            };
            deepest = deepest.max(depth);
            if node.is_leaf() {
                continue;
            }
            // only forward links are followed, so a malformed tree cannot cycle
            for child in [node.right, node.left] {
                if child > idx as i32 {
                    stack.push((child as usize, depth + 1));
                }
            }
        }

        deepest
    }

    /// Validate tree structure against a feature count
    pub fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("Tree has no nodes".to_string());
        }

        for (i, node) in self.nodes.iter().enumerate() {
            if node.is_leaf() {
                match node.leaf {
                    None => return Err(format!("Leaf node {i} has no leaf value")),
                    Some(p) if !(0.0..=1.0).contains(&p) => {
                        return Err(format!("Leaf node {i} probability {p} outside [0, 1]"))
                    }
                    Some(_) => {}
                }
                continue;
            }

            // children must point forward to keep traversal acyclic
            for (side, child) in [("left", node.left), ("right", node.right)] {
                if child <= i as i32 || child as usize >= self.nodes.len() {
                    return Err(format!("Node {i} has invalid {side} child: {child}"));
                }
            }

            if node.feature_idx < 0 || node.feature_idx as usize >= n_features {
                return Err(format!(
                    "Internal node {} has invalid feature index: {}",
                    i, node.feature_idx
                ));
            }

            if !node.threshold.is_finite() {
                return Err(format!("Internal node {i} has non-finite threshold"));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump() -> Tree {
        Tree::new(vec![
            Node::internal(0, 0, 0.5, 1, 2),
            Node::leaf(1, 0.2),
            Node::leaf(2, 0.9),
        ])
    }

    #[test]
    fn test_node_creation() {
        let internal = Node::internal(0, 3, 12.5, 1, 2);
        assert_eq!(internal.feature_idx, 3);
        assert!(!internal.is_leaf());

        let leaf = Node::leaf(1, 0.75);
        assert_eq!(leaf.feature_idx, -1);
        assert!(leaf.is_leaf());
        assert_eq!(leaf.leaf, Some(0.75));
    }

    #[test]
    fn test_tree_evaluation() {
        let tree = stump();
        assert_eq!(tree.evaluate(&[0.0]), 0.2);
        assert_eq!(tree.evaluate(&[0.5]), 0.2); // equal goes left
        assert_eq!(tree.evaluate(&[1.0]), 0.9);
    }

    #[test]
    fn test_tree_depth() {
        assert_eq!(stump().depth(), 1);
        assert_eq!(Tree::new(vec![Node::leaf(0, 0.0)]).depth(), 0);
        assert_eq!(Tree::new(Vec::new()).depth(), 0);
    }

    /// Right-leaning chain: every split sends one leaf left and continues right
    fn chain(levels: usize) -> Tree {
        let mut nodes = Vec::with_capacity(2 * levels + 1);
        for level in 0..levels {
            let id = (2 * level) as i32;
            nodes.push(Node::internal(id, 0, level as f64, id + 1, id + 2));
            nodes.push(Node::leaf(id + 1, 0.0));
        }
        nodes.push(Node::leaf((2 * levels) as i32, 1.0));
        Tree::new(nodes)
    }

    #[test]
    fn test_deep_chain_depth_and_evaluation() {
        let tree = chain(200_000);
        assert!(tree.validate(1).is_ok());
        assert_eq!(tree.depth(), 200_000);
        assert_eq!(tree.evaluate(&[1e9]), 1.0);
        assert_eq!(tree.evaluate(&[0.0]), 0.0);
    }

    #[test]
    fn test_tree_validation() {
        assert!(stump().validate(1).is_ok());

        // feature index beyond the vector
        assert!(stump().validate(0).is_err());

        // child pointing backwards
        let cyclic = Tree::new(vec![
            Node::internal(0, 0, 0.5, 0, 2),
            Node::leaf(1, 0.2),
            Node::leaf(2, 0.9),
        ]);
        assert!(cyclic.validate(1).is_err());

        let bad_leaf = Tree::new(vec![Node::leaf(0, 1.5)]);
        assert!(bad_leaf.validate(1).is_err());

        assert!(Tree::new(vec![]).validate(1).is_err());
    }
}
