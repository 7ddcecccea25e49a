use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "cec-tv",
    version,
    about = "Control a TV over HDMI-CEC",
    long_about = "Power the TV on or off, query its power status and switch HDMI inputs \
                  by driving cec-client"
)]
pub struct Cli {
    /// JSON configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// CEC client executable, overrides the configuration file
    #[arg(long, global = true)]
    pub client: Option<String>,

    /// Log commands instead of sending them
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write JSON logs to a daily rolling file instead of stderr
    #[arg(long, global = true)]
    pub log_file: bool,

    /// Directory for --log-file output
    #[arg(long, global = true, requires = "log_file")]
    pub log_dir: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the TV power status (on, standby or unknown)
    Status,
    /// Turn the TV on
    On,
    /// Put the TV in standby
    Off,
    /// Switch to an HDMI input (1-4)
    Input {
        /// HDMI port number
        device: String,
        /// Rounds over all command formats
        #[arg(short, long, default_value = "3")]
        retries: u32,
        /// Single pass over three formats, no readiness wait
        #[arg(short, long)]
        simple: bool,
    },
    /// Wait until the TV answers power status queries
    #[command(name = "wait-ready")]
    WaitReady {
        #[arg(short, long, default_value = "10")]
        attempts: u32,
    },
    /// Report whether a CEC adapter answered at startup
    Detect,
}
