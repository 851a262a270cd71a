//! Information-gain decision tree over bucketed features.
//!
//! One tree is grown per horizon from the same training samples.
//!
//! # Growth
//!
//! 1. The root key is the key with the highest gain over all training
//!    samples, gain clamped at zero, first key winning ties.
//! 2. Each bucket of the split key observed in the node's data becomes a
//!    branch over the subset `D` of data in that bucket:
//!    - `D` equal to the whole node data: leaf holding the rounded mean of the
//!      non-neutral outcomes;
//!    - `D` pure: leaf holding the majority outcome (first seen wins ties);
//!    - otherwise: split again on the best key other than the one just used.
//!
//! There is no depth or minimum-sample bound. Growth terminates because every
//! split either shrinks the data or produces a leaf.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use types::{FeatureKey, Horizon, Outcome};

use crate::bucket::Bucket;
use crate::entropy::{class_occurrence, information_gain};
use crate::model::Sample;

// =============================================================================
// Node
// =============================================================================

/// Decision tree node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    Leaf(Outcome),
    /// Branches cover exactly the buckets observed in the node's data and are
    /// pairwise distinct.
    Split { key: FeatureKey, branches: Vec<Branch> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub bucket: Bucket,
    pub node: Node,
}

impl Node {
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    /// Child for `bucket`, if this is a split with such a branch.
    pub fn branch(&self, bucket: Bucket) -> Option<&Node> {
        match self {
            Node::Leaf(_) => None,
            Node::Split { branches, .. } => branches
                .iter()
                .find(|b| b.bucket == bucket)
                .map(|b| &b.node),
        }
    }

    /// Outcomes of every leaf under this node, depth first.
    pub fn leaves(&self) -> Vec<Outcome> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves(&self, out: &mut Vec<Outcome>) {
        match self {
            Node::Leaf(outcome) => out.push(*outcome),
            Node::Split { branches, .. } => {
                for branch in branches {
                    branch.node.collect_leaves(out);
                }
            }
        }
    }

    pub fn node_count(&self) -> usize {
        match self {
            Node::Leaf(_) => 1,
            Node::Split { branches, .. } => {
                1 + branches.iter().map(|b| b.node.node_count()).sum::<usize>()
            }
        }
    }

    pub fn leaf_count(&self) -> usize {
        match self {
            Node::Leaf(_) => 1,
            Node::Split { branches, .. } => branches.iter().map(|b| b.node.leaf_count()).sum(),
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            Node::Leaf(_) => 0,
            Node::Split { branches, .. } => {
                1 + branches.iter().map(|b| b.node.depth()).max().unwrap_or(0)
            }
        }
    }

    /// Split key of this node, if any.
    pub fn key(&self) -> Option<FeatureKey> {
        match self {
            Node::Leaf(_) => None,
            Node::Split { key, .. } => Some(*key),
        }
    }
}

// =============================================================================
// Leaf rules
// =============================================================================

/// Round a mean outcome to the outcome scale.
///
/// Floors in `(-inf, -2.5)`, `(-2, -1.5)` and `(-1, -0.5)`; rounds half up
/// elsewhere. The result is clamped to `[-3, 3]`.
pub fn round_outcome(mean: f64) -> Outcome {
    let floored = mean < -2.5 || (mean > -2.0 && mean < -1.5) || (mean > -1.0 && mean < -0.5);
    let rounded = if floored {
        mean.floor()
    } else {
        (mean + 0.5).floor()
    };
    Outcome::saturating_from(rounded as i64)
}

/// Rounded mean of the non-neutral outcomes; neutral if there are none.
pub fn signed_average<I: IntoIterator<Item = Outcome>>(outcomes: I) -> Outcome {
    let (sum, count) = outcomes
        .into_iter()
        .filter(|o| *o != Outcome::Neutral)
        .fold((0i64, 0usize), |(sum, count), o| (sum + o.value() as i64, count + 1));

    if count == 0 {
        return Outcome::Neutral;
    }
    round_outcome(sum as f64 / count as f64)
}

/// Most frequent outcome; the first one seen wins ties.
pub fn majority<I: IntoIterator<Item = Outcome>>(outcomes: I) -> Outcome {
    let mut seen: Vec<(Outcome, usize)> = Vec::new();
    for outcome in outcomes {
        match seen.iter_mut().find(|(o, _)| *o == outcome) {
            Some((_, count)) => *count += 1,
            None => seen.push((outcome, 1)),
        }
    }

    let mut best: Option<(Outcome, usize)> = None;
    for (outcome, count) in seen {
        if best.is_none_or(|(_, top)| count > top) {
            best = Some((outcome, count));
        }
    }
    best.map(|(o, _)| o).unwrap_or_default()
}

// =============================================================================
// TreeBuilder
// =============================================================================

/// Grows one tree for one horizon.
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    horizon: Horizon,
    keys: Vec<FeatureKey>,
    /// Logarithm base for entropy: the label catalog length.
    base: f64,
}

impl TreeBuilder {
    pub fn new<I>(horizon: Horizon, keys: I, catalog_len: usize) -> Self
    where
        I: IntoIterator<Item = FeatureKey>,
    {
        Self {
            horizon,
            keys: keys.into_iter().collect(),
            base: catalog_len as f64,
        }
    }

    pub fn build(&self, samples: &[Sample]) -> Node {
        let data: Vec<&Sample> = samples.iter().collect();
        if data.is_empty() {
            return Node::Leaf(Outcome::Neutral);
        }

        let entropy = class_occurrence(&data, self.horizon).entropy(self.base);
        let root = self.best_key(&data, entropy, None, true);

        let tree = match root {
            Some((key, gain)) => {
                info!(horizon = %self.horizon, root = %key, gain, "Selected tree root");
                self.split(&data, key)
            }
            None => Node::Leaf(signed_average(self.outcomes(&data))),
        };

        debug!(
            horizon = %self.horizon,
            nodes = tree.node_count(),
            leaves = tree.leaf_count(),
            depth = tree.depth(),
            "Built tree"
        );
        tree
    }

    /// Highest-gain key, skipping `exclude`. Earlier keys win ties.
    ///
    /// With `clamp`, negative gains count as zero.
    fn best_key(
        &self,
        data: &[&Sample],
        entropy: f64,
        exclude: Option<FeatureKey>,
        clamp: bool,
    ) -> Option<(FeatureKey, f64)> {
        let mut best: Option<(FeatureKey, f64)> = None;
        for key in &self.keys {
            if Some(*key) == exclude {
                continue;
            }
            let mut gain = information_gain(data, key, self.horizon, entropy, self.base);
            if clamp {
                gain = gain.max(0.0);
            }
            if best.is_none_or(|(_, top)| gain > top) {
                best = Some((*key, gain));
            }
        }
        best
    }

    fn split(&self, data: &[&Sample], key: FeatureKey) -> Node {
        let mut subsets: BTreeMap<Bucket, Vec<&Sample>> = BTreeMap::new();
        for sample in data {
            if let Some(bucket) = sample.vector.get(&key) {
                subsets.entry(bucket).or_default().push(*sample);
            }
        }

        let branches = subsets
            .into_iter()
            .map(|(bucket, subset)| Branch {
                bucket,
                node: self.grow(data, &subset, key),
            })
            .collect();

        Node::Split { key, branches }
    }

    fn grow(&self, parent: &[&Sample], subset: &[&Sample], used: FeatureKey) -> Node {
        if subset.len() == parent.len() {
            return Node::Leaf(signed_average(self.outcomes(subset)));
        }

        let entropy = class_occurrence(subset, self.horizon).entropy(self.base);
        if entropy <= 0.0 {
            return Node::Leaf(majority(self.outcomes(subset)));
        }

        match self.best_key(subset, entropy, Some(used), false) {
            Some((key, _)) => self.split(subset, key),
            None => Node::Leaf(signed_average(self.outcomes(subset))),
        }
    }

    fn outcomes<'a>(&self, data: &'a [&'a Sample]) -> impl Iterator<Item = Outcome> + 'a {
        let horizon = self.horizon;
        data.iter().map(move |s| *s.label.get(horizon))
    }
}
