//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! Apart from folding flags into a [`LogdropConfig`] it has no side effects.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use logdrop_core::config::{LogdropConfig, VALID_METHODS};

use crate::error::CliError;

/// Follow a thrashd log and drop or release offending addresses.
///
/// Prints the last N lines of FILE, runs an iptables or route command for every
/// "holding down" / "expired" line, and reports each address's last action on exit.
#[derive(Parser, Debug)]
#[command(name = "logdrop", version, about, long_about = None)]
pub struct Cli {
    /// Log file to watch (overrides `source.path`).
    pub file: Option<PathBuf>,

    /// Output appended data as the file grows; just like tail.
    #[arg(short, long)]
    pub follow: bool,

    /// Output the last N lines, instead of the last 10; just like tail.
    #[arg(short = 'n', long = "number", value_name = "N")]
    pub lines: Option<usize>,

    /// Use the specified method for interaction (iptables, route).
    #[arg(short, long, value_name = "METHOD")]
    pub method: Option<String>,

    /// Use the iptables method; equivalent to --method=iptables.
    #[arg(short = 'i', long)]
    pub iptables: bool,

    /// Use the route method; equivalent to --method=route.
    #[arg(short = 'r', long)]
    pub route: bool,

    /// Path to a logdrop.toml configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Build and log commands without executing them.
    #[arg(long)]
    pub dry_run: bool,

    /// Sleep between checks for new data while following (milliseconds).
    #[arg(long, value_name = "MS")]
    pub poll_interval_ms: Option<u64>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Override log format (compact, pretty, json).
    #[arg(long)]
    pub log_format: Option<String>,

    /// Summary output format.
    #[arg(long, default_value = "text")]
    pub output: OutputFormat,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Line echo, per-address status and a plain summary.
    Text,
    /// Machine-readable JSON summary only.
    Json,
}

impl Cli {
    /// Resolve the enforcement method from `-m`, `-i` and `-r`.
    ///
    /// `-i` and `-r` are shortcuts that win over `-m`; giving both is an error.
    pub fn selected_method(&self) -> Result<Option<String>, CliError> {
        if self.iptables && self.route {
            return Err(CliError::Config(
                "can't force -i and -r, pick one".to_owned(),
            ));
        }

        if let Some(method) = &self.method {
            if !VALID_METHODS.contains(&method.as_str()) {
                return Err(CliError::Config(format!(
                    "pick a valid method: {}",
                    VALID_METHODS.join(", ")
                )));
            }
        }

        if self.route {
            return Ok(Some("route".to_owned()));
        }
        if self.iptables {
            return Ok(Some("iptables".to_owned()));
        }
        Ok(self.method.clone())
    }

    /// Fold command-line flags over a loaded configuration.
    pub fn apply_overrides(&self, config: &mut LogdropConfig) -> Result<(), CliError> {
        if let Some(file) = &self.file {
            config.source.path = file.display().to_string();
        }
        if self.follow {
            config.source.follow = true;
        }
        if let Some(lines) = self.lines {
            config.source.lines = lines;
        }
        if let Some(ms) = self.poll_interval_ms {
            config.source.poll_interval_ms = ms;
        }
        if let Some(method) = self.selected_method()? {
            config.enforcement.method = method;
        }
        if self.dry_run {
            config.enforcement.dry_run = true;
        }
        if let Some(level) = &self.log_level {
            config.general.log_level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.general.log_format = format.clone();
        }
        Ok(())
    }
}
