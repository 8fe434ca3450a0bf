//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

use crate::config::OutputFormat;

/// Best-guess hierarchy inference for spatially positioned, loosely linked cards
#[derive(Parser, Debug)]
#[command(name = "cardtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug level: -d info, -dd debug, -ddd trace
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute the hierarchy of a snapshot
    Compute {
        /// Snapshot JSON file (default: configured snapshot)
        #[arg(value_hint = ValueHint::FilePath)]
        snapshot: Option<PathBuf>,

        /// Output format (default: configured output)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Print the flattened display list: "<level>\t<id>"
    Outline {
        /// Snapshot JSON file (default: configured snapshot)
        #[arg(value_hint = ValueHint::FilePath)]
        snapshot: Option<PathBuf>,

        /// Expand the node with this card id (repeatable)
        #[arg(short, long = "expand", value_name = "ID")]
        expand: Vec<String>,

        /// Collapse the node with this card id (repeatable)
        #[arg(short, long = "collapse", value_name = "ID")]
        collapse: Vec<String>,

        /// Expand every node that has children
        #[arg(short = 'a', long)]
        expand_all: bool,
    },

    /// Run only the validation gate
    Check {
        /// Snapshot JSON file (default: configured snapshot)
        #[arg(value_hint = ValueHint::FilePath)]
        snapshot: Option<PathBuf>,
    },

    /// Print the structural fingerprint of a snapshot
    Fingerprint {
        /// Snapshot JSON file (default: configured snapshot)
        #[arg(value_hint = ValueHint::FilePath)]
        snapshot: Option<PathBuf>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Print a config template
    Template,

    /// Show config paths
    Path,
}
