use std::path::PathBuf;

use clap::Parser;

/// HTTP service that turns an arbitrary recipe web page into a
/// validated, persisted Recipe record.
#[derive(Debug, Parser)]
#[command(name = "cookbook-recipe-service", version)]
pub struct CliArgs {
    /// Path to a TOML configuration file. Falls back to environment
    /// variables (prefix `COOKBOOK_`) and built-in defaults when absent.
    #[arg(long, env = "COOKBOOK_CONFIG_FILE")]
    pub config_file: Option<PathBuf>,

    /// Bind address override; takes precedence over the config file.
    #[arg(long)]
    pub host: Option<String>,

    /// Port override; takes precedence over the config file.
    #[arg(long)]
    pub port: Option<u16>,

    /// Emit trace-level, span-annotated logs instead of the default
    /// compact format.
    #[arg(long)]
    pub debug_trace: bool,
}
