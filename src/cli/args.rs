//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// GraphPhys decay descriptions: validate, display, expand and re-emit decay trees
#[derive(Parser, Debug)]
#[command(name = "graphphys")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug logging, repeat for more (-d info, -dd debug, -ddd trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub debug: u8,

    /// Particle database (TOML), overrides the configured one
    #[arg(long, global = true, env = "GRAPHPHYS_DATABASE", value_hint = ValueHint::FilePath)]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse a document and report its roots
    Check {
        /// GraphPhys document
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Show the decay trees of a document
    Tree {
        /// GraphPhys document
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Enumerate every alternative decay tree with its branching fraction
    Expand {
        /// GraphPhys document
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Maximum number of trees per root (default: max_alternatives setting)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Re-emit a document in canonical GraphPhys form
    Emit {
        /// GraphPhys document
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Output file (default: stdout)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// List decays whose products are heavier than their parent
    Kinematics {
        /// GraphPhys document
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Check whether a name can be written as a bare identifier
    Id {
        /// Name to check
        name: String,
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
    Show {
        /// Document whose directory supplies the local config
        #[arg(value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
    },

    /// Print a config template
    Template,

    /// Show config paths
    Path,
}
