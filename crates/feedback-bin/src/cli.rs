// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Command line surface of the `feedback` binary.
//!
//! ```text
//! feedback [run]       serve HTTP until a termination signal
//! feedback validate    check a configuration file and exit
//! feedback token       mint a bearer credential without a server
//! feedback version     print component versions
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

// =============================================================================
// Main CLI Structure
// =============================================================================

/// Feedback service: collects customer feedback over HTTP.
#[derive(Parser, Debug)]
#[command(
    name = "feedback",
    author = "Sylvex <contact@sylvex.io>",
    version = feedback_core::VERSION,
    about = "Customer feedback service",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    /// Path to the YAML, TOML or JSON configuration
    #[arg(
        short,
        long,
        default_value = "feedback.yaml",
        env = "FEEDBACK_CONFIG",
        global = true
    )]
    pub config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Log format; overrides the config file
    #[arg(long, global = true)]
    pub log_format: Option<LogFormat>,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

// =============================================================================
// Subcommands
// =============================================================================

/// What the binary should do.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Serve the HTTP API (used when no subcommand is given)
    Run,

    /// Load and check the configuration, then exit
    Validate(ValidateArgs),

    /// Show component versions
    Version(VersionArgs),

    /// Mint a bearer credential with the configured secret
    Token(TokenArgs),
}

// =============================================================================
// Command Arguments
// =============================================================================

/// `validate` options.
#[derive(Args, Debug, Clone, Default)]
pub struct ValidateArgs {
    /// Show parsed configuration after validation (secrets redacted)
    #[arg(short, long)]
    pub show_config: bool,

    /// Report format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// `version` options.
#[derive(Args, Debug, Clone, Default)]
pub struct VersionArgs {
    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// `token` options.
#[derive(Args, Debug, Clone, Default)]
pub struct TokenArgs {
    /// Lifetime in minutes (defaults to the configured default)
    #[arg(short, long)]
    pub minutes: Option<String>,

    /// Role: read-only, write-only or unrestricted
    #[arg(short, long)]
    pub role: Option<String>,
}

// =============================================================================
// Enums
// =============================================================================

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Multi-field text with targets
    #[default]
    Text,
    /// One JSON object per event
    Json,
    /// Single-line text
    Compact,
}

impl From<feedback_config::LogFormat> for LogFormat {
    fn from(format: feedback_config::LogFormat) -> Self {
        match format {
            feedback_config::LogFormat::Text => LogFormat::Text,
            feedback_config::LogFormat::Json => LogFormat::Json,
            feedback_config::LogFormat::Compact => LogFormat::Compact,
        }
    }
}

/// How `validate` and `version` print their report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Plain text
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

// =============================================================================
// Helper Methods
// =============================================================================

impl Cli {
    /// Parses `std::env::args`, exiting on usage errors.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The chosen subcommand, or [`Commands::Run`].
    pub fn effective_command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Run)
    }

    /// `--quiet` and `--verbose` win over `--log-level`, which wins over `configured`.
    pub fn effective_log_level<'a>(&'a self, configured: &'a str) -> &'a str {
        if self.quiet {
            "warn"
        } else if self.verbose {
            "debug"
        } else {
            self.log_level.as_deref().unwrap_or(configured)
        }
    }

    /// `--log-format`, or `configured`.
    pub fn effective_log_format(&self, configured: feedback_config::LogFormat) -> LogFormat {
        self.log_format.unwrap_or_else(|| configured.into())
    }
}

// =============================================================================
// Tests
// =============================================================================
