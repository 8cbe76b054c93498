//! Phylogenetic tree inference.
//!
//! Species loaded from FASTA files are clustered bottom-up (UPGMA) into a
//! strictly binary, edge-weighted tree which can then be queried for
//! depths, heights, least common ancestors and evolutionary distances.
//!
//! ```
//! use phylotree::domain::{PhyloTree, Species};
//!
//! let species = vec![
//!     Species::new("A", "AAAA"),
//!     Species::new("B", "AAAT"),
//!     Species::new("C", "TTTT"),
//! ];
//! let tree = PhyloTree::build(&species).unwrap();
//! assert_eq!(tree.root_node().label, "ABC");
//! assert_eq!(tree.distance("A", "B").unwrap(), 1.0);
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
