//! Command-line argument parsing for the brlkeys binary
//!
//! Supports:
//! - Replaying key event scripts against a text screen
//! - Checking a key table for errors
//! - Listing bindable commands
//! - Printing the embedded default key table

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Braille display key table engine
#[derive(Parser, Debug)]
#[command(name = "brlkeys", version, about = "Braille display key table engine")]
pub struct CliArgs {
    /// Log debug output to the console
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Do not write a log file
    #[arg(long, global = true)]
    pub no_log_file: bool,

    /// Key table to load instead of the user or default table
    #[arg(short = 't', long, value_name = "FILE", global = true)]
    pub table: Option<PathBuf>,

    /// Preferences file to load instead of the user preferences
    #[arg(short = 'p', long, value_name = "FILE", global = true)]
    pub prefs: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    /// Replay a key event script and print what each step did
    Replay {
        /// Script file (YAML)
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,

        /// Braille window width in cells
        #[arg(long, value_name = "N", default_value_t = 40)]
        columns: usize,

        /// Braille window height in rows
        #[arg(long, value_name = "N", default_value_t = 1)]
        rows: usize,
    },

    /// Load the key table and report its contexts
    Check,

    /// List every command a key table can bind
    Commands,

    /// Print the embedded default key table
    DefaultTable,
}

impl CliArgs {
    /// Window geometry for replay, clamped to at least one cell
    pub fn geometry(&self) -> Option<(usize, usize)> {
        match self.command {
            CliCommand::Replay { columns, rows, .. } => Some((columns.max(1), rows.max(1))),
            _ => None,
        }
    }
}
