//! Command-line interface for eduvision.
//!
//! This module provides the CLI structure for the `eduv` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ApiBaseCommand, ConfigCommand, HealthCommand, ImprovementCommand, ReportsCommand,
    StudentsCommand,
};

use crate::logging::Verbosity;
use crate::session::{Page, SessionRequest};

/// eduv - Student analytics from the EduVision API
///
/// Renders the dashboard, progress, reports and improvement pages for a
/// student as static HTML.
#[derive(Debug, Parser)]
#[command(name = "eduv")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Student PRN (case-insensitive)
    #[arg(short, long, global = true, conflicts_with = "url")]
    pub prn: Option<String>,

    /// Page URL carrying a `prn` query parameter
    #[arg(short, long, global = true, value_name = "URL")]
    pub url: Option<String>,

    /// API base URL for this run
    #[arg(long, global = true, value_name = "URL")]
    pub api_base: Option<String>,

    /// Directory pages and exports are written to
    #[arg(short, long, global = true, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Render the dashboard page
    Dashboard,

    /// Render the progress page
    Progress,

    /// Render the reports page
    Reports(ReportsCommand),

    /// Render the improvement page
    Improvement(ImprovementCommand),

    /// Render all four pages
    All,

    /// Remember a student PRN
    Login {
        /// Student PRN
        #[arg(value_name = "PRN")]
        student: String,
    },

    /// Forget the remembered PRN
    Logout,

    /// Show the remembered PRN and API base
    Whoami,

    /// Manage the stored API base
    #[command(subcommand)]
    ApiBase(ApiBaseCommand),

    /// Check API and database health
    Health(HealthCommand),

    /// List known students
    Students(StudentsCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Command {
    /// Pages this command renders.
    #[must_use]
    pub fn pages(&self) -> Vec<Page> {
        match self {
            Self::Dashboard => vec![Page::Dashboard],
            Self::Progress => vec![Page::Progress],
            Self::Reports(_) => vec![Page::Reports],
            Self::Improvement(_) => vec![Page::Improvement],
            Self::All => Page::ALL.to_vec(),
            _ => Vec::new(),
        }
    }
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.verbose, self.quiet)
    }

    /// Session inputs given on the command line.
    #[must_use]
    pub fn session_request(&self) -> SessionRequest<'_> {
        SessionRequest {
            prn: self.prn.as_deref(),
            url: self.url.as_deref(),
            api_base: self.api_base.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn cli(verbose: u8, quiet: bool) -> Cli {
        Cli {
            config: None,
            verbose,
            quiet,
            prn: None,
            url: None,
            api_base: None,
            out: None,
            command: Command::Whoami,
        }
    }

    #[test]
    fn test_cli_name() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "eduv");
    }

    #[test]
    fn test_verbosity_quiet() {
        assert_eq!(cli(0, true).verbosity(), Verbosity::Quiet);
    }

    #[test]
    fn test_verbosity_normal() {
        assert_eq!(cli(0, false).verbosity(), Verbosity::Normal);
    }

    #[test]
    fn test_verbosity_verbose() {
        assert_eq!(cli(1, false).verbosity(), Verbosity::Verbose);
    }

    #[test]
    fn test_verbosity_trace() {
        assert_eq!(cli(2, false).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_dashboard_with_prn() {
        let cli = Cli::try_parse_from(["eduv", "--prn", "abc", "dashboard"]).unwrap();
        assert!(matches!(cli.command, Command::Dashboard));
        assert_eq!(cli.session_request().prn, Some("abc"));
    }

    #[test]
    fn test_prn_conflicts_with_url() {
        let result = Cli::try_parse_from([
            "eduv",
            "--prn",
            "abc",
            "--url",
            "dashboard.html?prn=x",
            "dashboard",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_reports_export() {
        let cli = Cli::try_parse_from(["eduv", "reports", "--export"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Reports(ReportsCommand { export: true })
        ));
    }

    #[test]
    fn test_parse_improvement_interactive() {
        let cli = Cli::try_parse_from(["eduv", "improvement", "-i"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Improvement(ImprovementCommand { interactive: true })
        ));
    }

    #[test]
    fn test_parse_api_base_set() {
        let cli = Cli::try_parse_from(["eduv", "api-base", "set", "http://h/api"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::ApiBase(ApiBaseCommand::Set { .. })
        ));
    }

    #[test]
    fn test_parse_login() {
        let cli = Cli::try_parse_from(["eduv", "login", "prn2024001"]).unwrap();
        assert!(matches!(cli.command, Command::Login { ref student } if student == "prn2024001"));
    }

    #[test]
    fn test_parse_global_flags_after_command() {
        let cli = Cli::try_parse_from([
            "eduv",
            "all",
            "--out",
            "/tmp/site",
            "--api-base",
            "http://h/api",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.out, Some(PathBuf::from("/tmp/site")));
        assert_eq!(cli.session_request().api_base, Some("http://h/api"));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_command_pages() {
        assert_eq!(Command::All.pages(), Page::ALL.to_vec());
        assert_eq!(
            Command::Reports(ReportsCommand::default()).pages(),
            vec![Page::Reports]
        );
        assert!(Command::Logout.pages().is_empty());
    }

    #[test]
    fn test_parse_with_config() {
        let cli = Cli::try_parse_from(["eduv", "-c", "/custom/config.toml", "whoami"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_health_json() {
        let cli = Cli::try_parse_from(["eduv", "health", "--json"]).unwrap();
        assert!(matches!(cli.command, Command::Health(HealthCommand { json: true })));
    }
}
