//! Clap CLI definitions for turbonet.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub const AFTER_HELP: &str = "\
\x1b[1;36mExamples:\x1b[0m
  turbonet console --user 10001      Chat with the bridge from the terminal
  turbonet send --user 10001 /getrun Send one command and print the reply
  turbonet check-config              Validate the configuration and exit

\x1b[1;36mEnvironment:\x1b[0m
  TURBONET_API_BASE    overrides api_base
  TURBONET_ADMIN_USER  overrides admin_user_id
  TURBONET_DB_PATH     overrides store.path";

/// turbonet: chat command bridge for the TurboNET arcade network.
#[derive(Parser)]
#[command(name = "turbonet", version, after_help = AFTER_HELP)]
pub struct Cli {
    /// Path to config file (default: ~/.turbonet/config.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read messages from stdin, one per line, and print each reply.
    Console {
        /// Platform user id the messages are sent as.
        #[arg(long)]
        user: String,
    },
    /// Handle a single message and print its reply.
    Send {
        /// Platform user id the message is sent as.
        #[arg(long)]
        user: String,
        /// Message text, e.g. "/run 2" or "fsj".
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },
    /// Load and validate the configuration, then print it.
    CheckConfig,
}
