//! # Lumi CLI Module
//!
//! This module implements the CLI interface for Lumi.
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `analyze` - Analyze a text or a journal file
//! - `samples` - Analyze the built-in sample texts
//! - `calibrate` - Grid-search cascade thresholds over labeled samples
//! - `config` - Print the effective configuration

mod commands;

use crate::config::LumiConfig;
use clap::{Parser, Subcommand};
use lumi_core::LumiError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Lumi - journal entry emotion and color server
///
/// Classifies a short journal entry into one of nine emotion categories and
/// maps it to a display hue.
#[derive(Parser, Debug)]
#[command(name = "lumi")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a TOML configuration file
    #[arg(short, long, global = true, env = "LUMI_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "8000")]
        port: u16,
    },

    /// Analyze a text, or a journal entry read from a file
    Analyze {
        /// Text to analyze
        #[arg(conflicts_with = "file")]
        text: Option<String>,

        /// File holding one journal entry; its lines are joined
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Analyze the built-in sample texts
    Samples,

    /// Grid-search cascade thresholds over a labeled sample file
    Calibrate {
        /// JSON array of {"text", "label"} objects
        #[arg(short, long)]
        samples: PathBuf,
    },

    /// Print the effective configuration
    Config,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), LumiError> {
    let config = LumiConfig::load(cli.config.as_deref())?;
    config.thresholds.validate()?;
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Server { host, port }) => cmd_server(&config, &host, port).await,
        Some(Commands::Analyze { text, file }) => {
            cmd_analyze(&config, json_mode, text.as_deref(), file.as_deref()).await
        }
        Some(Commands::Samples) => cmd_samples(&config, json_mode).await,
        Some(Commands::Calibrate { samples }) => cmd_calibrate(&config, json_mode, &samples).await,
        Some(Commands::Config) => cmd_config(&config, json_mode),
        None => cmd_server(&config, "127.0.0.1", 8000).await,
    }
}
