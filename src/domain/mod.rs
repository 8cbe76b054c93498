//! Domain layer: entities, clustering and tree queries
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod entities;
pub mod error;
pub mod matrix;
pub mod render;
pub mod tree;

pub use arena::{PhyloNode, PhyloTree};
pub use builder::TreeBuilder;
pub use entities::*;
pub use error::{DomainError, TreeResult};
pub use matrix::DistanceMatrix;
pub use render::TreeNodeConvert;
