//! CLI argument definitions for tiller.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Tiller - resolve agent dependencies and merge steering rules.
///
/// Output is JSON by default; pass -H for human-readable text.
#[derive(Parser, Debug)]
#[command(name = "tlr")]
#[command(author, version, about = "Agent dependency resolution and steering rule merging", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve one typed artifact reference across the scope layers
    Resolve {
        /// Artifact type (procedure, template, checklist, data, util)
        #[arg(long = "type")]
        artifact_type: String,

        /// Declared artifact name (any recognized naming convention)
        #[arg(long)]
        name: String,

        /// Base framework root directory.
        /// Can also be set via the TLR_BASE environment variable.
        #[arg(long, env = "TLR_BASE")]
        base: PathBuf,

        /// Extension pack root directory (makes this an extension scope)
        #[arg(long)]
        pack: Option<PathBuf>,

        /// Shared common root directory
        #[arg(long)]
        common: Option<PathBuf>,
    },

    /// Scan every dependency an agent definition declares
    Scan {
        /// Path to the agent definition file
        #[arg(long)]
        agent: PathBuf,

        /// Base framework root directory.
        /// Can also be set via the TLR_BASE environment variable.
        #[arg(long, env = "TLR_BASE")]
        base: PathBuf,

        /// Extension pack root directory (makes this an extension scope)
        #[arg(long)]
        pack: Option<PathBuf>,

        /// Shared common root directory
        #[arg(long)]
        common: Option<PathBuf>,
    },

    /// Steering rule commands
    Steering {
        #[command(subcommand)]
        command: SteeringCommands,
    },
}

/// Steering subcommands
#[derive(Subcommand, Debug)]
pub enum SteeringCommands {
    /// Merge a directory of steering documents for one agent
    Merge {
        /// Directory containing steering documents
        #[arg(long)]
        dir: PathBuf,

        /// Agent id to merge for
        #[arg(long)]
        agent: String,

        /// Project context file (YAML or JSON) for conditional inclusion
        #[arg(long)]
        context_file: Option<PathBuf>,

        /// Project type for conditional inclusion (overrides the context file)
        #[arg(long)]
        project_type: Option<String>,

        /// Manually include a manual-inclusion document (repeatable)
        #[arg(long = "include")]
        include: Vec<String>,
    },

    /// Validate every steering document in a directory
    Validate {
        /// Directory containing steering documents
        #[arg(long)]
        dir: PathBuf,
    },
}
