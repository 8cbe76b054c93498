//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

use crate::domain::DistanceMetric;

/// Infer UPGMA phylogenetic trees from FASTA sequences and query them
#[derive(Parser, Debug)]
#[command(name = "phylotree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output, repeat for more (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file layered over the global config
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Sequence distance metric (hamming, p-distance)
    #[arg(short, long, global = true)]
    pub metric: Option<DistanceMetric>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the tree as an indented listing
    Tree {
        /// FASTA species file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Dots before the deepest node
        #[arg(long)]
        depth: Option<usize>,
    },

    /// Print the tree in bracket (Newick-style) form
    Newick {
        /// FASTA species file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Decimal places for edge weights
        #[arg(long)]
        precision: Option<usize>,
    },

    /// Show the tree with box-drawing characters
    Show {
        /// FASTA species file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Show species count, node count and heights
    Info {
        /// FASTA species file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// List the species loaded from a file
    Species {
        /// FASTA species file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Describe the node with a given label
    Find {
        /// FASTA species file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Node label
        label: String,
    },

    /// Least common ancestor of two nodes
    Lca {
        /// FASTA species file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        label_a: String,
        label_b: String,
    },

    /// Evolutionary distance between two nodes
    Distance {
        /// FASTA species file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        label_a: String,
        label_b: String,
    },

    /// Show effective settings
    Config,

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
