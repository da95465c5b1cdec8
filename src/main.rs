//! # Replay - Streaming History Analytics
//!
//! Replay ingests a personal streaming-history export into a SQLite store
//! and produces descriptive analytics: top artists and tracks, temporal
//! habits, discovery trends, and loyalty concentration.
//!
//! ## Architecture
//!
//! - `cli`: command-line interface definitions
//! - `import`: atomic dataset-replace import
//! - `store`: the `listens` dataset store
//! - `analytics`: the aggregation query catalogue
//! - `report`: CSV and markdown artifacts
//! - `config`: explicit path configuration
//!
//! ## Usage
//!
//! ```bash
//! # Rebuild the store from export files
//! replay import --input ~/Downloads/my_spotify_data
//!
//! # Write the full report
//! replay report --out ./outputs
//!
//! # Quick look at the key numbers
//! replay summary
//! ```

use anyhow::Result;
use clap::{CommandFactory, Parser};
use log::info;
use replay::analytics::{Analytics, TimeRange};
use replay::cli::{Args, Command};
use replay::config::Config;
use replay::genres::GenreMap;
use replay::import::Importer;
use replay::report;

/// Main entry point for the Replay application.
///
/// Initializes logging, parses command-line arguments, and routes commands
/// to the appropriate module functions. Logging is controlled via
/// `RUST_LOG`, e.g. `RUST_LOG=debug replay import`.
fn main() -> Result<()> {
    // Initialize environment logger for debugging and monitoring
    env_logger::init();

    let args = Args::parse();

    let mut config = Config::new()?;
    if let Some(dir) = args.data_dir {
        config = config.with_data_dir(&dir)?;
    }

    match args.command {
        Command::Import { input } => {
            if let Some(dir) = input {
                config = config.with_input_dir(&dir)?;
            }
            info!(
                "Importing streaming history from {}",
                config.input_dir.display()
            );
            let count = Importer::new(&config).run()?;
            println!("Loaded {count} listens into {}", config.db_path().display());
        }

        Command::Report {
            out,
            start,
            end,
            genres,
        } => {
            if let Some(dir) = out {
                config = config.with_output_dir(&dir)?;
            }
            if let Some(path) = genres {
                config = config.with_genres_path(&path)?;
            }

            let range = TimeRange::new(start, end)?;
            let analytics = Analytics::open(&config)?;
            let genre_map = match &config.genres_path {
                Some(path) => GenreMap::load(path)?,
                None => None,
            };

            report::write_csvs(&analytics, &range, &config.output_dir)?;
            let report_path =
                report::write_markdown(&analytics, &range, genre_map.as_ref(), &config.output_dir)?;
            println!("Report written to {}", report_path.display());
        }

        Command::Summary { start, end } => {
            let range = TimeRange::new(start, end)?;
            let analytics = Analytics::open(&config)?;
            print_summary(&analytics, &range)?;
        }

        Command::Trend { artist, start, end } => {
            let range = TimeRange::new(start, end)?;
            let analytics = Analytics::open(&config)?;
            let days = analytics.artist_daily_hours(&artist, &range)?;

            if days.is_empty() {
                println!("No plays recorded for {artist}");
            }
            for day in days {
                println!("{}  {:>6.2}h", day.date, day.hours);
            }
        }

        Command::Completion { shell } => {
            let mut cmd = Args::command();
            clap_complete::generate(
                shell.to_completion_shell(),
                &mut cmd,
                "replay",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}

/// The key numbers, printed for a terminal rather than a report file.
fn print_summary(analytics: &Analytics, range: &TimeRange) -> Result<()> {
    let totals = analytics.totals(range)?;
    match (totals.first_date, totals.last_date) {
        (Some(first), Some(last)) => println!("Listening from {first} to {last}"),
        _ => {
            println!("No listening data in the selected range.");
            return Ok(());
        }
    }

    println!(
        "{} plays, {:.1} hours, {} artists, {} tracks",
        totals.plays, totals.hours, totals.unique_artists, totals.unique_tracks
    );

    if let Some(c) = analytics.concentration(range)? {
        println!("Concentration (HHI): {:.3} ({})", c.hhi, c.loyalty);
    }

    let skips = analytics.skip_proxy(range)?;
    println!(
        "Skip proxy: {:.1}% of plays under 30s, {:.1}% under 60s",
        skips.pct_lt_30s, skips.pct_lt_60s
    );
    println!(
        "Repeat rate: {:.2} plays per distinct track",
        analytics.repeat_rate(range)?
    );

    println!("\nTop artists:");
    for row in analytics.top_artists(range, 5)? {
        println!("  {:>7.2}h  {} ({} plays)", row.hours, row.artist, row.plays);
    }

    Ok(())
}
