use std::fmt;

use generational_arena::{Arena, Index};
use tracing::instrument;

/// Node of a strictly binary phylogenetic tree.
///
/// A node is a leaf iff it carries a species iff it has no children.
#[derive(Debug)]
pub struct PhyloNode<'a, E> {
    /// Unique label: the species name for leaves, the concatenation of the
    /// children's labels for internal nodes
    pub label: String,
    /// Species at a leaf, None for internal nodes
    pub species: Option<&'a E>,
    /// Index of the parent node in the arena, None for the root
    pub parent: Option<Index>,
    pub left: Option<Index>,
    pub right: Option<Index>,
    /// Edge weight from this node down to either child (0 for leaves)
    pub distance_to_child: f64,
    /// Number of leaves in the subtree rooted here
    pub leaf_count: usize,
}

impl<'a, E> PhyloNode<'a, E> {
    pub(crate) fn leaf(label: impl Into<String>, species: &'a E) -> Self {
        Self {
            label: label.into(),
            species: Some(species),
            parent: None,
            left: None,
            right: None,
            distance_to_child: 0.0,
            leaf_count: 1,
        }
    }

    pub(crate) fn internal(
        label: String,
        left: Index,
        right: Index,
        distance_to_child: f64,
        leaf_count: usize,
    ) -> Self {
        Self {
            label,
            species: None,
            parent: None,
            left: Some(left),
            right: Some(right),
            distance_to_child,
            leaf_count,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.species.is_some()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Children in left, right order (empty for leaves).
    pub fn children(&self) -> impl Iterator<Item = Index> {
        self.left.into_iter().chain(self.right)
    }
}

impl<E> fmt::Display for PhyloNode<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// Arena-backed phylogenetic tree produced by [`crate::domain::TreeBuilder`].
///
/// The arena owns every node; parent/child links are arena indices. A tree
/// always has a root: building from zero species fails instead.
/// The tree is immutable once built.
#[derive(Debug)]
pub struct PhyloTree<'a, E> {
    arena: Arena<PhyloNode<'a, E>>,
    root: Index,
    species: Vec<&'a E>,
}

impl<'a, E> PhyloTree<'a, E> {
    pub(crate) fn from_parts(
        arena: Arena<PhyloNode<'a, E>>,
        root: Index,
        species: Vec<&'a E>,
    ) -> Self {
        Self {
            arena,
            root,
            species,
        }
    }

    pub fn root(&self) -> Index {
        self.root
    }

    pub fn root_node(&self) -> &PhyloNode<'a, E> {
        &self.arena[self.root]
    }

    pub fn get_node(&self, idx: Index) -> Option<&PhyloNode<'a, E>> {
        self.arena.get(idx)
    }

    pub fn label(&self, idx: Index) -> Option<&str> {
        self.get_node(idx).map(|node| node.label.as_str())
    }

    /// Total number of nodes, leaves and internal: `2n - 1` for `n` species.
    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    /// Species the tree was built from, in input order.
    pub fn species(&self) -> &[&'a E] {
        &self.species
    }

    pub fn count_all_species(&self) -> usize {
        self.species.len()
    }

    /// Pre-order traversal from the root, left before right.
    pub fn iter(&self) -> TreeIterator<'_, 'a, E> {
        TreeIterator::new(self)
    }

    pub fn iter_postorder(&self) -> PostOrderIterator<'_, 'a, E> {
        PostOrderIterator::new(self)
    }

    /// Strict ancestors of `idx`, nearest first.
    pub fn ancestors(&self, idx: Index) -> Ancestors<'_, 'a, E> {
        Ancestors {
            tree: self,
            next: self.get_node(idx).and_then(|node| node.parent),
        }
    }

    /// Labels of all leaves, left to right.
    #[instrument(level = "debug", skip(self))]
    pub fn leaf_labels(&self) -> Vec<String> {
        self.iter()
            .filter(|(_, node)| node.is_leaf())
            .map(|(_, node)| node.label.clone())
            .collect()
    }

    /// Species at the leaves below `idx`, left to right.
    pub fn descendant_species(&self, idx: Index) -> Vec<&'a E> {
        SubtreeIterator::new(self, idx)
            .filter_map(|(_, node)| node.species)
            .collect()
    }
}

pub struct TreeIterator<'t, 'a, E> {
    inner: SubtreeIterator<'t, 'a, E>,
}

impl<'t, 'a, E> TreeIterator<'t, 'a, E> {
    fn new(tree: &'t PhyloTree<'a, E>) -> Self {
        Self {
            inner: SubtreeIterator::new(tree, tree.root),
        }
    }
}

impl<'t, 'a, E> Iterator for TreeIterator<'t, 'a, E> {
    type Item = (Index, &'t PhyloNode<'a, E>);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

/// Pre-order traversal of the subtree rooted at a given node.
struct SubtreeIterator<'t, 'a, E> {
    tree: &'t PhyloTree<'a, E>,
    stack: Vec<Index>,
}

impl<'t, 'a, E> SubtreeIterator<'t, 'a, E> {
    fn new(tree: &'t PhyloTree<'a, E>, start: Index) -> Self {
        Self {
            tree,
            stack: vec![start],
        }
    }
}

impl<'t, 'a, E> Iterator for SubtreeIterator<'t, 'a, E> {
    type Item = (Index, &'t PhyloNode<'a, E>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.tree.get_node(current_idx) {
                // Push right first so left is visited first
                self.stack.extend(node.right);
                self.stack.extend(node.left);
                return Some((current_idx, node));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'t, 'a, E> {
    tree: &'t PhyloTree<'a, E>,
    stack: Vec<(Index, bool)>,
}

impl<'t, 'a, E> PostOrderIterator<'t, 'a, E> {
    fn new(tree: &'t PhyloTree<'a, E>) -> Self {
        Self {
            tree,
            stack: vec![(tree.root, false)],
        }
    }
}

impl<'t, 'a, E> Iterator for PostOrderIterator<'t, 'a, E> {
    type Item = (Index, &'t PhyloNode<'a, E>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.tree.get_node(current_idx) {
                if visited {
                    return Some((current_idx, node));
                }
                self.stack.push((current_idx, true));
                self.stack.extend(node.right.map(|idx| (idx, false)));
                self.stack.extend(node.left.map(|idx| (idx, false)));
            }
        }
        None
    }
}

pub struct Ancestors<'t, 'a, E> {
    tree: &'t PhyloTree<'a, E>,
    next: Option<Index>,
}

impl<'t, 'a, E> Iterator for Ancestors<'t, 'a, E> {
    type Item = (Index, &'t PhyloNode<'a, E>);

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.next?;
        let node = self.tree.get_node(idx)?;
        self.next = node.parent;
        Some((idx, node))
    }
}
