use crate::config::Config;

use clap::Parser;
use std::path::PathBuf;

/// Kubernetes state metrics options
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
    #[command(flatten)]
    pub options: Config,

    /// Path to a TOML file with the same options, overridden by flags
    #[arg(long = "config", value_name = "CONFIG")]
    pub config_path: Option<PathBuf>,

    /// Log level: debug, info, warn, error
    #[arg(long, value_name = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Show logs of all dependents
    #[arg(long, short)]
    pub verbose: bool,
}
