//! UPGMA tree builder: agglomerative average-linkage clustering.

use std::collections::{BTreeMap, HashSet};

use generational_arena::{Arena, Index};
use itertools::Itertools;
use tracing::{debug, instrument, trace};

use crate::domain::arena::{PhyloNode, PhyloTree};
use crate::domain::entities::Entity;
use crate::domain::error::{DomainError, TreeResult};
use crate::domain::matrix::DistanceMatrix;

/// Constructs a phylogenetic tree by repeatedly merging the two closest
/// clusters of the active forest.
///
/// Merged distances are leaf-count weighted averages of the constituents'
/// distances. Among equally close pairs, the pair whose labels sort first
/// (`(X, Y)` with `X < Y`) is merged.
#[derive(Debug, Default)]
pub struct TreeBuilder;

/// Closest pair of active clusters.
struct Candidate {
    lo: Index,
    hi: Index,
    distance: f64,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Build using the entities' own distance function.
    pub fn build<'a, E: Entity>(&self, species: &'a [E]) -> TreeResult<PhyloTree<'a, E>> {
        self.build_with(species, |a, b| a.distance(b))
    }

    /// Build using an external distance function.
    #[instrument(level = "debug", skip_all, fields(n = species.len()))]
    pub fn build_with<'a, E, F>(&self, species: &'a [E], distance: F) -> TreeResult<PhyloTree<'a, E>>
    where
        E: Entity,
        F: Fn(&E, &E) -> f64,
    {
        if species.is_empty() {
            return Err(DomainError::EmptyInput);
        }

        let mut arena = Arena::with_capacity(2 * species.len() - 1);
        let mut labels = HashSet::new();
        // Active clusters ordered by label: the scan order fixes the tie-break
        let mut forest: BTreeMap<String, Index> = BTreeMap::new();

        for s in species {
            let label = s.name().to_string();
            if !labels.insert(label.clone()) {
                return Err(DomainError::DuplicateLabel(label));
            }
            let idx = arena.insert(PhyloNode::leaf(label.clone(), s));
            forest.insert(label, idx);
        }

        let mut matrix = DistanceMatrix::new();
        for ((label_a, &a), (label_b, &b)) in forest.iter().tuple_combinations() {
            let (Some(sa), Some(sb)) = (arena[a].species, arena[b].species) else {
                continue;
            };
            let d = distance(sa, sb);
            if !d.is_finite() || d < 0.0 {
                return Err(DomainError::InvalidDistance {
                    a: label_a.clone(),
                    b: label_b.clone(),
                    value: d,
                });
            }
            matrix.put(a, b, d);
        }
        debug!("initial distance matrix holds {} pairs", matrix.len());

        let mut root = forest.values().next().copied().ok_or(DomainError::EmptyInput)?;

        while forest.len() > 1 {
            let Some(Candidate { lo, hi, distance }) = Self::closest_pair(&arena, &forest, &matrix)? else {
                break;
            };
            root = Self::merge(&mut arena, &mut forest, &mut matrix, &mut labels, lo, hi, distance)?;
        }

        Ok(PhyloTree::from_parts(arena, root, species.iter().collect()))
    }

    /// Scan all active pairs in label order, keeping the first strictly smaller distance.
    fn closest_pair<E>(
        arena: &Arena<PhyloNode<'_, E>>,
        forest: &BTreeMap<String, Index>,
        matrix: &DistanceMatrix<Index>,
    ) -> TreeResult<Option<Candidate>> {
        let mut best: Option<Candidate> = None;
        for ((_, &a), (_, &b)) in forest.iter().tuple_combinations() {
            let d = Self::lookup(arena, matrix, a, b)?;
            if best.as_ref().map_or(true, |c| d < c.distance) {
                best = Some(Candidate {
                    lo: a,
                    hi: b,
                    distance: d,
                });
            }
        }
        Ok(best)
    }

    /// Matrix lookup that names the clusters by label when the pair is missing.
    fn lookup<E>(
        arena: &Arena<PhyloNode<'_, E>>,
        matrix: &DistanceMatrix<Index>,
        a: Index,
        b: Index,
    ) -> TreeResult<f64> {
        matrix.get(a, b).ok_or_else(|| {
            let label = |idx: Index| {
                arena
                    .get(idx)
                    .map_or_else(|| format!("{:?}", idx), |node| node.label.clone())
            };
            DomainError::MissingDistance {
                a: label(a),
                b: label(b),
            }
        })
    }

    /// Merge `lo` and `hi` into a new internal node and return its index.
    #[allow(clippy::too_many_arguments)]
    fn merge<E>(
        arena: &mut Arena<PhyloNode<'_, E>>,
        forest: &mut BTreeMap<String, Index>,
        matrix: &mut DistanceMatrix<Index>,
        labels: &mut HashSet<String>,
        lo: Index,
        hi: Index,
        distance: f64,
    ) -> TreeResult<Index> {
        let (lo_label, lo_count) = (arena[lo].label.clone(), arena[lo].leaf_count);
        let (hi_label, hi_count) = (arena[hi].label.clone(), arena[hi].leaf_count);
        let label = format!("{}{}", lo_label, hi_label);
        if !labels.insert(label.clone()) {
            return Err(DomainError::DuplicateLabel(label));
        }
        debug!("merging {} + {} at {} -> {}", lo_label, hi_label, distance, label);

        forest.remove(&lo_label);
        forest.remove(&hi_label);

        let total = (lo_count + hi_count) as f64;
        let (w_lo, w_hi) = (lo_count as f64 / total, hi_count as f64 / total);
        let mut merged = Vec::with_capacity(forest.len());
        for &other in forest.values() {
            let d = w_lo * Self::lookup(arena, matrix, lo, other)?
                + w_hi * Self::lookup(arena, matrix, hi, other)?;
            merged.push((other, d));
        }

        let node = PhyloNode::internal(label.clone(), lo, hi, distance / 2.0, lo_count + hi_count);
        let new_idx = arena.insert(node);
        arena[lo].parent = Some(new_idx);
        arena[hi].parent = Some(new_idx);

        matrix.remove_all_involving(lo);
        matrix.remove_all_involving(hi);
        for (other, d) in merged {
            trace!("d({}, {:?}) = {}", label, other, d);
            matrix.put(new_idx, other, d);
        }

        forest.insert(label, new_idx);
        Ok(new_idx)
    }
}

impl<'a, E: Entity> PhyloTree<'a, E> {
    /// Build a tree from `species` with [`TreeBuilder`].
    pub fn build(species: &'a [E]) -> TreeResult<Self> {
        TreeBuilder::new().build(species)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Species;

    #[test]
    fn test_lookup_reports_missing_pair_by_label() {
        let species = [Species::new("A", "AAAA"), Species::new("B", "TTTT")];
        let mut arena = Arena::new();
        let a = arena.insert(PhyloNode::leaf("A", &species[0]));
        let b = arena.insert(PhyloNode::leaf("B", &species[1]));
        let mut matrix = DistanceMatrix::new();

        let err = TreeBuilder::lookup(&arena, &matrix, a, b).unwrap_err();
        assert_eq!(
            err,
            DomainError::MissingDistance {
                a: "A".to_string(),
                b: "B".to_string(),
            }
        );
        assert_eq!(err.to_string(), "no distance recorded between A and B");

        matrix.put(a, b, 4.0);
        assert_eq!(TreeBuilder::lookup(&arena, &matrix, b, a), Ok(4.0));
    }
}
