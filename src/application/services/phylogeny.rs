//! Phylogeny service
//!
//! Loads species from FASTA files, builds the UPGMA tree and answers
//! queries against it.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::application::{ApplicationError, ApplicationResult};
use crate::config::Settings;
use crate::domain::{parse_fasta, DomainError, PhyloTree, Species, TreeBuilder};
use crate::infrastructure::traits::FileSystem;

/// Overall shape of a tree.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeSummary {
    pub species_count: usize,
    pub node_count: usize,
    pub root_label: String,
    pub height: usize,
    pub weighted_height: f64,
}

/// Position of a single node within a tree.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeReport {
    pub label: String,
    pub is_leaf: bool,
    pub leaf_count: usize,
    pub depth: usize,
    pub weighted_depth: f64,
    pub height: usize,
    pub weighted_height: f64,
}

/// Service for building and querying phylogenetic trees.
pub struct PhylogenyService {
    fs: Arc<dyn FileSystem>,
    settings: Arc<Settings>,
}

impl PhylogenyService {
    pub fn new(fs: Arc<dyn FileSystem>, settings: Arc<Settings>) -> Self {
        Self { fs, settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Read and parse a FASTA file. Unnamed records are skipped.
    #[instrument(level = "debug", skip(self))]
    pub fn load_species(&self, path: &Path) -> ApplicationResult<Vec<Species>> {
        let content = self
            .fs
            .read_to_string(path)
            .map_err(|e| ApplicationError::OperationFailed {
                context: format!("read species file: {}", path.display()),
                source: Box::new(e),
            })?;
        let species = parse_fasta(&content);
        if species.is_empty() {
            warn!("no species found in {}", path.display());
        }
        debug!("loaded {} species from {}", species.len(), path.display());
        Ok(species)
    }

    /// Build a tree using the configured distance metric.
    #[instrument(level = "debug", skip_all)]
    pub fn build_tree<'a>(&self, species: &'a [Species]) -> ApplicationResult<PhyloTree<'a, Species>> {
        let metric = self.settings.metric;
        debug!("building tree over {} species with {}", species.len(), metric);
        let tree = TreeBuilder::new().build_with(species, |a, b| a.distance_with(b, metric))?;
        Ok(tree)
    }

    pub fn summary(&self, tree: &PhyloTree<'_, Species>) -> TreeSummary {
        TreeSummary {
            species_count: tree.count_all_species(),
            node_count: tree.node_count(),
            root_label: tree.root_node().label.clone(),
            height: tree.height(),
            weighted_height: tree.weighted_height(),
        }
    }

    /// Describe the node carrying `label`.
    pub fn describe(&self, tree: &PhyloTree<'_, Species>, label: &str) -> ApplicationResult<NodeReport> {
        let idx = tree.find_by_label(label);
        let node = idx
            .and_then(|i| tree.get_node(i))
            .ok_or_else(|| DomainError::LabelNotFound(label.to_string()))?;
        Ok(NodeReport {
            label: node.label.clone(),
            is_leaf: node.is_leaf(),
            leaf_count: node.leaf_count,
            depth: tree.node_depth(idx).unwrap_or_default(),
            weighted_depth: tree.weighted_node_depth(idx).unwrap_or_default(),
            height: tree.node_height(idx).unwrap_or_default(),
            weighted_height: tree.weighted_node_height(idx).unwrap_or_default(),
        })
    }

    /// Label of the least common ancestor of two labelled nodes.
    pub fn lca(&self, tree: &PhyloTree<'_, Species>, label_a: &str, label_b: &str) -> ApplicationResult<String> {
        for label in [label_a, label_b] {
            if tree.find_by_label(label).is_none() {
                return Err(DomainError::LabelNotFound(label.to_string()).into());
            }
        }
        tree.lca(label_a, label_b)
            .and_then(|idx| tree.label(idx))
            .map(str::to_string)
            .ok_or_else(|| DomainError::LabelNotFound(format!("{} / {}", label_a, label_b)).into())
    }

    pub fn distance(&self, tree: &PhyloTree<'_, Species>, label_a: &str, label_b: &str) -> ApplicationResult<f64> {
        Ok(tree.distance(label_a, label_b)?)
    }
}
