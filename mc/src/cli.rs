//! CLI argument parsing for musical chairs

use clap::Parser;
use std::path::PathBuf;

/// Musical chairs - one game, run to completion
#[derive(Parser, Debug)]
#[command(
    name = "mc",
    author,
    version,
    about = "Simulate a game of musical chairs with concurrent players",
    after_help = "Logs are written to: ~/.local/share/musicalchairs/logs/musicalchairs.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, help = "Log level (trace, debug, info, warn, error)")]
    pub log_level: Option<String>,
}
