//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

/// Interactive editor for labeled taxonomy trees: view, filter, rename, restructure, export
#[derive(Parser, Debug)]
#[command(name = "taxedit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d, -dd, -ddd)
    #[arg(short = 'd', long = "debug", action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render the taxonomy tree to stdout
    Show {
        /// Taxonomy JSON file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Maximum visible depth (1..N or "all")
        #[arg(short, long, default_value = "all")]
        level: String,
        /// Expand every node instead of the collapsed default
        #[arg(long)]
        expanded: bool,
    },

    /// Show per-level node counts
    Stats {
        /// Taxonomy JSON file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Edit the taxonomy in an interactive session
    Edit {
        /// Taxonomy JSON file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Reconcile and write the export file without an interactive session
    Export {
        /// Taxonomy JSON file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Output file (default: from settings, taxonomy_updated.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
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

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
    },

    /// Show config paths
    Path,
}
