//! Regression forest evaluation.
//!
//! Model:
//! - Each tree is a flat node array with the root at index 0.
//! - A sample goes left when `x[feature] <= threshold`, right otherwise.
//! - The forest output is the mean of all tree outputs.

use serde::{Deserialize, Serialize};

use crate::features::FEATURE_COUNT;
use crate::result::PredictError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<TreeNode>,
}

impl RegressionTree {
    pub fn new(nodes: Vec<TreeNode>) -> Result<Self, PredictError> {
        let tree = Self { nodes };
        tree.validate()?;
        Ok(tree)
    }

    /// Structural checks run once at load time.
    ///
    /// Children must point strictly forward, which rules out cycles and keeps
    /// evaluation bounded by the node count.
    fn validate(&self) -> Result<(), PredictError> {
        if self.nodes.is_empty() {
            return Err(PredictError::InvalidArtifact("tree has no nodes".to_string()));
        }

        let len = self.nodes.len();
        for (idx, node) in self.nodes.iter().enumerate() {
            match *node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if feature >= FEATURE_COUNT {
                        return Err(PredictError::InvalidArtifact(format!(
                            "node {idx}: feature index {feature} out of range"
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(PredictError::InvalidArtifact(format!(
                            "node {idx}: non-finite threshold"
                        )));
                    }
                    for child in [left, right] {
                        if child <= idx || child >= len {
                            return Err(PredictError::InvalidArtifact(format!(
                                "node {idx}: child index {child} must point forward within the tree"
                            )));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(PredictError::InvalidArtifact(format!(
                            "node {idx}: non-finite leaf value"
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    pub fn predict(&self, x: &[f64; FEATURE_COUNT]) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes[idx] {
                TreeNode::Leaf { value } => return value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if x[feature] <= threshold { left } else { right };
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionForest {
    trees: Vec<RegressionTree>,
}

impl RegressionForest {
    pub fn new(trees: Vec<RegressionTree>) -> Result<Self, PredictError> {
        let forest = Self { trees };
        forest.validate()?;
        Ok(forest)
    }

    pub fn validate(&self) -> Result<(), PredictError> {
        if self.trees.is_empty() {
            return Err(PredictError::InvalidArtifact("forest has no trees".to_string()));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate()
                .map_err(|e| PredictError::InvalidArtifact(format!("tree {i}: {e}")))?;
        }
        Ok(())
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    /// Mean of tree outputs (unclamped).
    pub fn predict(&self, x: &[f64; FEATURE_COUNT]) -> f64 {
        let sum: f64 = self.trees.iter().map(|t| t.predict(x)).sum();
        sum / self.trees.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump(feature: usize, threshold: f64, low: f64, high: f64) -> RegressionTree {
        RegressionTree::new(vec![
            TreeNode::Split {
                feature,
                threshold,
                left: 1,
                right: 2,
            },
            TreeNode::Leaf { value: low },
            TreeNode::Leaf { value: high },
        ])
        .unwrap()
    }

    #[test]
    fn threshold_is_inclusive_on_the_left() {
        let tree = stump(0, 10.0, 1.0, 2.0);
        assert_eq!(tree.predict(&[10.0, 0.0, 0.0, 0.0, 0.0]), 1.0);
        assert_eq!(tree.predict(&[10.5, 0.0, 0.0, 0.0, 0.0]), 2.0);
    }

    #[test]
    fn forest_averages_trees() {
        let forest =
            RegressionForest::new(vec![stump(0, 10.0, 100.0, 50.0), stump(1, 0.5, 20.0, 60.0)])
                .unwrap();
        // price 5 -> 100, promotion 1 -> 60
        assert_eq!(forest.predict(&[5.0, 1.0, 0.0, 0.0, 0.0]), 80.0);
    }

    #[test]
    fn rejects_backward_or_dangling_children() {
        let looped = RegressionTree::new(vec![TreeNode::Split {
            feature: 0,
            threshold: 1.0,
            left: 0,
            right: 0,
        }]);
        assert!(looped.is_err());

        let dangling = RegressionTree::new(vec![
            TreeNode::Split {
                feature: 0,
                threshold: 1.0,
                left: 1,
                right: 7,
            },
            TreeNode::Leaf { value: 1.0 },
        ]);
        assert!(dangling.is_err());
    }

    #[test]
    fn rejects_out_of_range_feature_and_empty_forest() {
        let bad = RegressionTree::new(vec![
            TreeNode::Split {
                feature: FEATURE_COUNT,
                threshold: 1.0,
                left: 1,
                right: 2,
            },
            TreeNode::Leaf { value: 1.0 },
            TreeNode::Leaf { value: 2.0 },
        ]);
        assert!(bad.is_err());
        assert!(RegressionForest::new(vec![]).is_err());
    }
}
