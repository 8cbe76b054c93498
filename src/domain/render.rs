//! Textual renderings of a tree. Presentation only.
//!
//! Like the queries, every renderer walks the tree with an explicit stack.

use std::collections::HashMap;
use std::fmt::Write;

use generational_arena::Index;
use termtree::Tree;
use tracing::instrument;

use crate::domain::arena::PhyloTree;

/// Conversion into a `termtree` for box-drawing display.
pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl<E> TreeNodeConvert for PhyloTree<'_, E> {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self) -> Tree<String> {
        // Children finish before their parent, so each subtree is ready to attach
        let mut built: HashMap<Index, Tree<String>> = HashMap::new();
        for (idx, node) in self.iter_postorder() {
            let text = if node.is_leaf() {
                node.label.clone()
            } else {
                format!("{} ({})", node.label, node.distance_to_child)
            };
            let leaves: Vec<Tree<String>> = node
                .children()
                .filter_map(|child| built.remove(&child))
                .collect();
            built.insert(idx, Tree::new(text).with_leaves(leaves));
        }
        built
            .remove(&self.root())
            .unwrap_or_else(|| Tree::new(String::new()))
    }
}

/// Pending work in the indented listing; carries the node's weighted depth.
enum IndentStep {
    Expand(Index, f64),
    Emit(Index, f64),
}

enum NewickStep {
    Open(Index),
    Close(Index),
    Comma,
}

impl<E> PhyloTree<'_, E> {
    /// Indented listing, right subtree above its parent and left subtree below.
    ///
    /// Each line is prefixed with dots proportional to the node's weighted
    /// depth, so the deepest leaf gets `printing_depth` dots.
    #[instrument(level = "debug", skip(self))]
    pub fn to_indented_string(&self, printing_depth: usize) -> String {
        let max_depth = self.weighted_height();
        let mut out = String::new();
        let mut stack = vec![IndentStep::Expand(self.root(), 0.0)];

        while let Some(step) = stack.pop() {
            match step {
                IndentStep::Expand(idx, weighted_depth) => {
                    let Some(node) = self.get_node(idx) else {
                        continue;
                    };
                    let below = weighted_depth + node.distance_to_child;
                    // Popped in reverse: right, node, left
                    stack.extend(node.left.map(|left| IndentStep::Expand(left, below)));
                    stack.push(IndentStep::Emit(idx, weighted_depth));
                    stack.extend(node.right.map(|right| IndentStep::Expand(right, below)));
                }
                IndentStep::Emit(idx, weighted_depth) => {
                    let Some(node) = self.get_node(idx) else {
                        continue;
                    };
                    let dots = if max_depth > 0.0 {
                        (printing_depth as f64 * weighted_depth / max_depth) as usize
                    } else {
                        0
                    };
                    out.push_str(&".".repeat(dots));
                    let _ = writeln!(out, "{}", node);
                }
            }
        }
        out
    }

    /// Newick-style bracket form: `(right,left)` nesting, each non-root node
    /// suffixed with its parent's edge weight.
    #[instrument(level = "debug", skip(self))]
    pub fn to_newick(&self, precision: usize) -> String {
        let mut out = String::new();
        let mut stack = vec![NewickStep::Open(self.root())];

        while let Some(step) = stack.pop() {
            match step {
                NewickStep::Open(idx) => {
                    let Some(node) = self.get_node(idx) else {
                        continue;
                    };
                    if let (Some(left), Some(right)) = (node.left, node.right) {
                        out.push('(');
                        stack.push(NewickStep::Close(idx));
                        stack.push(NewickStep::Open(left));
                        stack.push(NewickStep::Comma);
                        stack.push(NewickStep::Open(right));
                    } else {
                        out.push_str(&node.label);
                        self.write_edge_weight(idx, precision, &mut out);
                    }
                }
                NewickStep::Close(idx) => {
                    out.push(')');
                    self.write_edge_weight(idx, precision, &mut out);
                }
                NewickStep::Comma => out.push(','),
            }
        }
        out
    }

    /// Append `:w`, the parent's edge weight; the root gets nothing.
    fn write_edge_weight(&self, idx: Index, precision: usize, out: &mut String) {
        let parent = self
            .get_node(idx)
            .and_then(|node| node.parent)
            .and_then(|p| self.get_node(p));
        if let Some(parent) = parent {
            let _ = write!(out, ":{:.*}", precision, parent.distance_to_child);
        }
    }
}
