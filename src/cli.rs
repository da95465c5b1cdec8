//! # Command-Line Interface Module
//!
//! Defines the `replay` command surface using Clap derive macros. Parsing
//! happens in `main`, which routes each subcommand to the matching library
//! module.
//!
//! ## Commands
//!
//! - `import`: rebuild the store from streaming-history export files
//! - `report`: write CSV tables and the markdown summary
//! - `summary`: print the key numbers to stdout
//! - `trend`: daily listening hours for one artist
//! - `completion`: generate shell completions
//!
//! ## Examples
//!
//! ```bash
//! replay import --input ~/Downloads/my_spotify_data
//! replay report --out ./outputs --start 2021-01-01 --end 2021-12-31
//! replay summary
//! ```

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shell types supported for completion generation
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

impl Shell {
    /// The matching `clap_complete` generator.
    #[must_use]
    pub fn to_completion_shell(self) -> clap_complete::Shell {
        match self {
            Self::Bash => clap_complete::Shell::Bash,
            Self::Zsh => clap_complete::Shell::Zsh,
            Self::Fish => clap_complete::Shell::Fish,
            Self::PowerShell => clap_complete::Shell::PowerShell,
            Self::Elvish => clap_complete::Shell::Elvish,
        }
    }
}

/// Main application arguments structure.
///
/// The top level carries only the store location override and a subcommand;
/// all functionality is accessed through specific commands.
#[derive(Parser)]
#[command(name = "replay")]
#[command(about = "Replay: your streaming history, imported and analyzed")]
#[command(version)]
pub struct Args {
    /// Directory holding the published store (defaults to the platform
    /// data directory)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Enumeration of all available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Import streaming-history exports, atomically replacing the store
    ///
    /// Reads every StreamingHistory*.json file in the input directory,
    /// validates all records, and swaps the rebuilt store into place in a
    /// single rename. On any failure the previous store is left untouched.
    Import {
        /// Directory containing StreamingHistory*.json export files
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Write the CSV tables and the markdown summary report
    ///
    /// Runs the full analytics catalogue over the store and writes one CSV
    /// per query plus a markdown summary into the output directory.
    Report {
        /// Output directory for report artifacts
        #[arg(long)]
        out: Option<PathBuf>,

        /// Inclusive start date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Inclusive end date (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,

        /// artistName,genres side-table enabling the genre rollup
        #[arg(long)]
        genres: Option<PathBuf>,
    },

    /// Print the key listening numbers without writing anything
    Summary {
        /// Inclusive start date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Inclusive end date (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,
    },

    /// Daily listening hours for one artist
    Trend {
        /// Artist name, matched exactly
        artist: String,

        /// Inclusive start date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Inclusive end date (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,
    },

    /// Generate shell completions
    ///
    /// Usage: replay completion bash > ~/.local/share/bash-completion/completions/replay
    Completion {
        /// Shell to generate completions for
        shell: Shell,
    },
}
