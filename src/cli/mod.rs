//! CLI interface for stepwave

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Four-track step sequencer with a terminal grid
#[derive(Parser)]
#[command(name = "stepwave")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Play through the audio device with the step grid UI
    Play {
        /// Configuration file path (defaults apply when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Play the configured patterns without the UI until Ctrl-C
        #[arg(long)]
        headless: bool,
    },

    /// Render the configured patterns to a WAV file
    Record {
        /// Configuration file path (defaults apply when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Duration in seconds
        #[arg(short, long, default_value = "16")]
        duration: f64,
    },

    /// List available output devices
    Devices,

    /// Validate a configuration file
    Check {
        /// Configuration file path
        #[arg(short, long, default_value = "stepwave.yaml")]
        config: PathBuf,
    },

    /// Generate an example configuration file
    Init,
}
