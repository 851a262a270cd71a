//! Tree traversal.

use tracing::debug;
use types::Outcome;

use crate::bucket::BucketedVector;
use crate::tree::{Node, round_outcome};

/// Predict an outcome for `sample`.
///
/// Descends while the sample's bucket for the split key matches a branch.
/// When it does not, the prediction is the mean of every leaf reachable from
/// the current node, rounded like a training leaf.
pub fn infer(tree: &Node, sample: &BucketedVector) -> Outcome {
    let mut node = tree;
    loop {
        match node {
            Node::Leaf(outcome) => return *outcome,
            Node::Split { key, .. } => {
                match sample.get(key).and_then(|bucket| node.branch(bucket)) {
                    Some(child) => node = child,
                    None => {
                        debug!(key = %key, "No branch for sample bucket, averaging subtree");
                        return subtree_average(node);
                    }
                }
            }
        }
    }
}

fn subtree_average(node: &Node) -> Outcome {
    let leaves = node.leaves();
    if leaves.is_empty() {
        return Outcome::Neutral;
    }
    let sum: i64 = leaves.iter().map(|o| o.value() as i64).sum();
    round_outcome(sum as f64 / leaves.len() as f64)
}
