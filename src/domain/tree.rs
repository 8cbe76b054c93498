//! Queries over a finished phylogenetic tree.
//!
//! Depth and height helpers accept `Option<Index>` so callers can chain
//! lookups; a missing node yields `None`, which orders below every `Some`.
//! All traversals use explicit stacks, so deep trees do not exhaust the
//! call stack.

use std::collections::HashSet;

use generational_arena::Index;
use tracing::{debug, instrument};

use crate::domain::arena::PhyloTree;
use crate::domain::error::{DomainError, TreeResult};

impl<'a, E> PhyloTree<'a, E> {
    /// Find the node carrying `label` by depth-first search from the root.
    #[instrument(level = "trace", skip(self))]
    pub fn find_by_label(&self, label: &str) -> Option<Index> {
        self.iter()
            .find(|(_, node)| node.label == label)
            .map(|(idx, _)| idx)
    }

    /// Number of edges from the root to `node`; the root has depth 0.
    pub fn node_depth(&self, node: Option<Index>) -> Option<usize> {
        let idx = node?;
        self.get_node(idx)?;
        Some(self.ancestors(idx).count())
    }

    /// Sum of the edge weights of every strict ancestor of `node`.
    pub fn weighted_node_depth(&self, node: Option<Index>) -> Option<f64> {
        let idx = node?;
        self.get_node(idx)?;
        Some(
            self.ancestors(idx)
                .fold(0.0, |acc, (_, ancestor)| acc + ancestor.distance_to_child),
        )
    }

    /// Longest edge count from `node` down to a leaf; leaves have height 0.
    pub fn node_height(&self, node: Option<Index>) -> Option<usize> {
        let start = node?;
        self.get_node(start)?;
        let mut height = 0;
        let mut stack = vec![(start, 0usize)];
        while let Some((idx, edges)) = stack.pop() {
            if let Some(current) = self.get_node(idx) {
                if current.is_leaf() {
                    height = height.max(edges);
                }
                stack.extend(current.children().map(|child| (child, edges + 1)));
            }
        }
        Some(height)
    }

    /// Heaviest edge-weight sum from `node` down to a leaf; leaves have 0.
    pub fn weighted_node_height(&self, node: Option<Index>) -> Option<f64> {
        let start = node?;
        self.get_node(start)?;
        let mut height: f64 = 0.0;
        let mut stack = vec![(start, 0.0f64)];
        while let Some((idx, weight)) = stack.pop() {
            if let Some(current) = self.get_node(idx) {
                if current.is_leaf() {
                    height = height.max(weight);
                }
                let below = weight + current.distance_to_child;
                stack.extend(current.children().map(|child| (child, below)));
            }
        }
        Some(height)
    }

    /// Height of the whole tree.
    pub fn height(&self) -> usize {
        self.node_height(Some(self.root())).unwrap_or_default()
    }

    /// Sum of edge weights along the heaviest root-to-leaf path.
    pub fn weighted_height(&self) -> f64 {
        self.weighted_node_height(Some(self.root()))
            .unwrap_or_default()
    }

    /// Least common ancestor of two labelled nodes; None if either is absent.
    #[instrument(level = "debug", skip(self))]
    pub fn lca(&self, label_a: &str, label_b: &str) -> Option<Index> {
        let a = self.find_by_label(label_a)?;
        let b = self.find_by_label(label_b)?;
        self.lca_of(a, b)
    }

    /// Deepest node that is an ancestor of both `a` and `b`, where a node
    /// counts as its own ancestor.
    pub fn lca_of(&self, a: Index, b: Index) -> Option<Index> {
        self.get_node(a)?;
        self.get_node(b)?;
        let chain: HashSet<Index> = std::iter::once(a)
            .chain(self.ancestors(a).map(|(idx, _)| idx))
            .collect();
        std::iter::once(b)
            .chain(self.ancestors(b).map(|(idx, _)| idx))
            .find(|idx| chain.contains(idx))
    }

    /// Evolutionary distance: edge weights from each node up to their LCA.
    #[instrument(level = "debug", skip(self))]
    pub fn distance(&self, label_a: &str, label_b: &str) -> TreeResult<f64> {
        let a = self
            .find_by_label(label_a)
            .ok_or_else(|| DomainError::LabelNotFound(label_a.to_string()))?;
        let b = self
            .find_by_label(label_b)
            .ok_or_else(|| DomainError::LabelNotFound(label_b.to_string()))?;
        let ancestor = self
            .lca_of(a, b)
            .ok_or_else(|| DomainError::LabelNotFound(format!("{} / {}", label_a, label_b)))?;

        let d = self.path_weight(a, ancestor) + self.path_weight(b, ancestor);
        debug!("distance({}, {}) = {}", label_a, label_b, d);
        Ok(d)
    }

    /// Edge weights collected walking from `from` up to `ancestor`.
    fn path_weight(&self, from: Index, ancestor: Index) -> f64 {
        if from == ancestor {
            return 0.0;
        }
        let mut total = 0.0;
        for (idx, node) in self.ancestors(from) {
            total += node.distance_to_child;
            if idx == ancestor {
                break;
            }
        }
        total
    }
}
