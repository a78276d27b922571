//! CLI argument definitions using clap derive

use crate::http::Method;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// precache - cache-first offline proxy
///
/// Pre-caches a fixed asset manifest on install and answers requests
/// from the cache, falling back to the network.
#[derive(Parser, Debug)]
#[command(name = "precache")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "PRECACHE_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Deliver the install signal: pre-cache every manifest resource
    Install(InstallArgs),

    /// Deliver a fetch signal and write the response body to stdout
    Fetch(FetchArgs),

    /// List entries in the cache store
    List(ListArgs),

    /// Show the compiled-in manifest
    Manifest,

    /// Show or edit configuration
    Config(ConfigArgs),
}

/// Where the worker fetches from and stores to
#[derive(Args, Debug, Default, Clone)]
pub struct TargetArgs {
    /// Origin that relative identifiers resolve against
    #[arg(long, env = "PRECACHE_ORIGIN")]
    pub origin: Option<String>,

    /// Cache storage directory
    #[arg(long, env = "PRECACHE_STORE_DIR")]
    pub store_dir: Option<PathBuf>,
}

/// Arguments for the install command
#[derive(Parser, Debug)]
pub struct InstallArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

/// Arguments for the fetch command
#[derive(Parser, Debug)]
pub struct FetchArgs {
    /// Resource identifier, e.g. /style.css
    pub identifier: String,

    /// Request method
    #[arg(short = 'X', long, default_value = "GET", value_parser = parse_method)]
    pub method: Method,

    /// Request headers (Name: value)
    #[arg(short = 'H', long = "header", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Print status line and response headers to stderr
    #[arg(short, long)]
    pub include: bool,

    #[command(flatten)]
    pub target: TargetArgs,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,

    /// Cache storage directory
    #[arg(long, env = "PRECACHE_STORE_DIR")]
    pub store_dir: Option<PathBuf>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., network.origin)
        key: String,
        /// Value to set
        value: String,
    },
}

/// Output format for list command
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}

fn parse_method(s: &str) -> Result<Method, String> {
    s.parse().map_err(|e: crate::error::PrecacheError| e.to_string())
}

/// Parse a header in `Name: value` format
fn parse_header(s: &str) -> Result<(String, String), String> {
    let pos = s
        .find(':')
        .ok_or_else(|| format!("invalid header format: no ':' found in '{s}'"))?;
    let name = s[..pos].trim();
    if name.is_empty() {
        return Err(format!("invalid header format: empty name in '{s}'"));
    }
    Ok((name.to_string(), s[pos + 1..].trim().to_string()))
}
