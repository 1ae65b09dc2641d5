//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Reports page arguments.
#[derive(Debug, Default, Args)]
pub struct ReportsCommand {
    /// Also write the transcript JSON next to the page
    #[arg(short, long)]
    pub export: bool,
}

/// Improvement page arguments.
#[derive(Debug, Default, Args)]
pub struct ImprovementCommand {
    /// Keep running and re-fetch recommendations on demand
    #[arg(short, long)]
    pub interactive: bool,
}

/// API base override commands.
#[derive(Debug, Subcommand)]
pub enum ApiBaseCommand {
    /// Store an API base used by later runs
    Set {
        /// Base URL, e.g. `http://127.0.0.1:5000/api`
        #[arg(value_name = "URL")]
        base: String,
    },

    /// Remove the stored API base
    Clear,

    /// Show the API base that would be used
    Show,
}

/// Health check arguments.
#[derive(Debug, Default, Args)]
pub struct HealthCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Student directory arguments.
#[derive(Debug, Default, Args)]
pub struct StudentsCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}
