//! Static report artifacts.
//!
//! Writes one CSV per catalogue query plus a markdown summary into the
//! configured output directory. Everything here consumes analytics tables
//! only; chart rendering and interactive views are a downstream concern.

use crate::analytics::{Analytics, TimeRange};
use crate::error::Result;
use crate::genres::GenreMap;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

/// Rows shown in the headline markdown tables.
const TABLE_LIMIT: usize = 10;
/// Rows shown in the long-tail tables (replays, binges, guilty pleasures).
const WIDE_TABLE_LIMIT: usize = 20;
/// Session threshold for the "most replayed" table.
const REPLAY_MIN_SESSIONS: u32 = 3;
/// Rows exported to the CSV tables.
const CSV_LIMIT: usize = 50;

/// File name of the markdown summary inside the output directory.
pub const REPORT_FILE: &str = "listening_report.md";

/// Export every catalogue table as CSV, mirroring the per-query result
/// tables the presentation layer consumes.
pub fn write_csvs(analytics: &Analytics, range: &TimeRange, out_dir: &Path) -> Result<()> {
    fs::create_dir_all(out_dir)?;

    let top_artists = analytics.top_artists(range, CSV_LIMIT)?;
    write_csv(
        &out_dir.join("top_artists.csv"),
        &["artistName", "hours_listened", "plays"],
        top_artists
            .iter()
            .map(|r| vec![r.artist.clone(), format!("{:.2}", r.hours), r.plays.to_string()])
            .collect(),
    )?;

    let top_tracks = analytics.top_tracks(range, CSV_LIMIT)?;
    write_csv(
        &out_dir.join("top_tracks.csv"),
        &["trackName", "artistName", "hours_listened", "plays"],
        top_tracks
            .iter()
            .map(|r| {
                vec![
                    r.track.clone(),
                    r.artist.clone(),
                    format!("{:.2}", r.hours),
                    r.plays.to_string(),
                ]
            })
            .collect(),
    )?;

    let by_hour = analytics.hours_by_hour_of_day(range)?;
    write_csv(
        &out_dir.join("by_hour.csv"),
        &["hour", "hours_listened"],
        by_hour
            .iter()
            .map(|b| vec![b.hour.to_string(), format!("{:.2}", b.hours)])
            .collect(),
    )?;

    let by_weekday = analytics.hours_by_weekday(range)?;
    write_csv(
        &out_dir.join("by_weekday.csv"),
        &["weekday", "hours_listened"],
        by_weekday
            .iter()
            .map(|b| vec![b.weekday.to_string(), format!("{:.2}", b.hours)])
            .collect(),
    )?;

    let by_month = analytics.hours_by_month(range)?;
    write_csv(
        &out_dir.join("by_month.csv"),
        &["month", "hours_listened", "plays", "unique_artists", "unique_tracks"],
        by_month
            .iter()
            .map(|b| {
                vec![
                    b.month.clone(),
                    format!("{:.2}", b.hours),
                    b.plays.to_string(),
                    b.unique_artists.to_string(),
                    b.unique_tracks.to_string(),
                ]
            })
            .collect(),
    )?;

    let binges = analytics.artist_binges(range)?;
    write_csv(
        &out_dir.join("artist_binges.csv"),
        &["month", "artistName", "month_share_pct"],
        binges
            .iter()
            .map(|b| vec![b.month.clone(), b.artist.clone(), format!("{:.1}", b.share_pct)])
            .collect(),
    )?;

    let skips = analytics.skip_proxy(range)?;
    write_csv(
        &out_dir.join("skips.csv"),
        &["total_plays", "plays_lt_30s", "pct_lt_30s", "plays_lt_60s", "pct_lt_60s"],
        vec![vec![
            skips.total_plays.to_string(),
            skips.plays_lt_30s.to_string(),
            format!("{:.1}", skips.pct_lt_30s),
            skips.plays_lt_60s.to_string(),
            format!("{:.1}", skips.pct_lt_60s),
        ]],
    )?;

    let totals = analytics.totals(range)?;
    let repeat = analytics.repeat_rate(range)?;
    write_csv(
        &out_dir.join("repeats.csv"),
        &["total_plays", "unique_tracks", "avg_plays_per_track"],
        vec![vec![
            totals.plays.to_string(),
            totals.unique_tracks.to_string(),
            format!("{repeat:.2}"),
        ]],
    )?;

    let replays = analytics.replays(range, REPLAY_MIN_SESSIONS, CSV_LIMIT)?;
    write_csv(
        &out_dir.join("top_replays.csv"),
        &["trackName", "artistName", "play_sessions", "minutes_listened"],
        replays
            .iter()
            .map(|r| {
                vec![
                    r.track.clone(),
                    r.artist.clone(),
                    r.sessions.to_string(),
                    format!("{:.1}", r.minutes),
                ]
            })
            .collect(),
    )?;

    let discovery = analytics.discovery_curve(range)?;
    write_csv(
        &out_dir.join("discovery.csv"),
        &["date", "new_artists", "cumulative_artists"],
        discovery
            .iter()
            .map(|p| {
                vec![
                    p.date.to_string(),
                    p.new_artists.to_string(),
                    p.cumulative_artists.to_string(),
                ]
            })
            .collect(),
    )?;

    info!("Wrote CSV tables to {}", out_dir.display());
    Ok(())
}

/// Render the markdown summary and return its path.
pub fn write_markdown(
    analytics: &Analytics,
    range: &TimeRange,
    genres: Option<&GenreMap>,
    out_dir: &Path,
) -> Result<PathBuf> {
    fs::create_dir_all(out_dir)?;

    let totals = analytics.totals(range)?;
    let mut md = String::new();

    md.push_str("# Listening Report\n\n");
    match (totals.first_date, totals.last_date) {
        (Some(first), Some(last)) => {
            md.push_str(&format!("Covering **{first}** to **{last}**.\n\n"));
        }
        _ => md.push_str("No listening data in the selected range.\n\n"),
    }

    md.push_str("## Key numbers\n\n");
    md.push_str(&format!("- **Total plays:** {}\n", totals.plays));
    md.push_str(&format!("- **Total hours:** {:.1}\n", totals.hours));
    md.push_str(&format!("- **Unique artists:** {}\n", totals.unique_artists));
    md.push_str(&format!("- **Unique tracks:** {}\n\n", totals.unique_tracks));

    md.push_str("## Top artists\n\n");
    let top_artists = analytics.top_artists(range, TABLE_LIMIT)?;
    md.push_str(&md_table(
        &["Artist", "Hours", "Plays"],
        &top_artists
            .iter()
            .map(|r| vec![r.artist.clone(), format!("{:.2}", r.hours), r.plays.to_string()])
            .collect::<Vec<_>>(),
    ));

    md.push_str("\n## Top tracks\n\n");
    let top_tracks = analytics.top_tracks(range, TABLE_LIMIT)?;
    md.push_str(&md_table(
        &["Track", "Artist", "Hours", "Plays"],
        &top_tracks
            .iter()
            .map(|r| {
                vec![
                    r.track.clone(),
                    r.artist.clone(),
                    format!("{:.2}", r.hours),
                    r.plays.to_string(),
                ]
            })
            .collect::<Vec<_>>(),
    ));

    md.push_str("\n## Loyalty vs. exploration\n\n");
    match analytics.concentration(range)? {
        Some(c) => md.push_str(&format!(
            "Concentration index (HHI): **{:.3}**, which makes you a **{}**.\n",
            c.hhi, c.loyalty
        )),
        None => md.push_str("No listening time recorded.\n"),
    }

    md.push_str("\n## Habits\n\n");
    let mut by_hour = analytics.hours_by_hour_of_day(range)?;
    by_hour.sort_by(|a, b| b.hours.partial_cmp(&a.hours).unwrap_or(std::cmp::Ordering::Equal));
    let peak_hours: Vec<String> = by_hour.iter().take(3).map(|b| format!("{}h", b.hour)).collect();
    if !peak_hours.is_empty() {
        md.push_str(&format!("- **Peak hours:** {}\n", peak_hours.join(", ")));
    }

    let mut by_weekday = analytics.hours_by_weekday(range)?;
    by_weekday.sort_by(|a, b| b.hours.partial_cmp(&a.hours).unwrap_or(std::cmp::Ordering::Equal));
    let top_weekdays: Vec<String> =
        by_weekday.iter().take(3).map(|b| b.weekday.to_string()).collect();
    if !top_weekdays.is_empty() {
        md.push_str(&format!("- **Top weekdays:** {}\n", top_weekdays.join(", ")));
    }

    let skips = analytics.skip_proxy(range)?;
    let repeat = analytics.repeat_rate(range)?;
    md.push_str(&format!(
        "- **Skipping proxy:** {:.1}% of plays under 30s, {:.1}% under 60s\n",
        skips.pct_lt_30s, skips.pct_lt_60s
    ));
    md.push_str(&format!("- **Repeat rate:** {repeat:.2} plays per distinct track\n"));

    md.push_str("\n## Most replayed\n\n");
    let replays = analytics.replays(range, REPLAY_MIN_SESSIONS, WIDE_TABLE_LIMIT)?;
    md.push_str(&md_table(
        &["Track", "Artist", "Sessions", "Minutes"],
        &replays
            .iter()
            .map(|r| {
                vec![
                    r.track.clone(),
                    r.artist.clone(),
                    r.sessions.to_string(),
                    format!("{:.1}", r.minutes),
                ]
            })
            .collect::<Vec<_>>(),
    ));

    md.push_str("\n## Guilty pleasures\n\n");
    md.push_str("Played again and again, but never for long:\n\n");
    let guilty = analytics.guilty_pleasures(range, WIDE_TABLE_LIMIT)?;
    md.push_str(&md_table(
        &["Track", "Artist", "Sessions", "Minutes"],
        &guilty
            .iter()
            .map(|r| {
                vec![
                    r.track.clone(),
                    r.artist.clone(),
                    r.sessions.to_string(),
                    format!("{:.1}", r.minutes),
                ]
            })
            .collect::<Vec<_>>(),
    ));

    md.push_str("\n## Artist binges\n\n");
    let binges = analytics.artist_binges(range)?;
    md.push_str(&md_table(
        &["Month", "Artist", "Share of month"],
        &binges
            .iter()
            .take(WIDE_TABLE_LIMIT)
            .map(|b| vec![b.month.clone(), b.artist.clone(), format!("{:.1}%", b.share_pct)])
            .collect::<Vec<_>>(),
    ));

    md.push_str("\n## Discovery\n\n");
    let discovery = analytics.discovery_curve(range)?;
    match discovery.last() {
        Some(last) => md.push_str(&format!(
            "**{}** artists discovered across **{}** listening days.\n",
            last.cumulative_artists,
            discovery.len()
        )),
        None => md.push_str("_(no data)_\n"),
    }

    md.push_str("\n## What if you dropped your top artist?\n\n");
    match analytics.what_if_drop_top(range)? {
        Some(what_if) => {
            md.push_str(&format!(
                "Without **{}** ({:.1}h), ",
                what_if.dropped_artist, what_if.dropped_hours
            ));
            match what_if.new_top {
                Some(new_top) => md.push_str(&format!(
                    "your top artist would be **{}** ({:.1}h).\n",
                    new_top.artist, new_top.hours
                )),
                None => md.push_str("nobody would be left.\n"),
            }
        }
        None => md.push_str("_(no data)_\n"),
    }

    if let Some(map) = genres {
        md.push_str("\n## Top genres\n\n");
        let top_genres = analytics.top_genres(range, map, 15)?;
        md.push_str(&md_table(
            &["Genre", "Hours"],
            &top_genres
                .iter()
                .map(|g| vec![g.genre.clone(), format!("{:.1}", g.hours)])
                .collect::<Vec<_>>(),
        ));
    }

    let path = out_dir.join(REPORT_FILE);
    fs::write(&path, md)?;
    info!("Wrote markdown report to {}", path.display());
    Ok(path)
}

/// Markdown table, or a placeholder when there are no rows.
fn md_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    if rows.is_empty() {
        return "_(no data)_\n".to_string();
    }

    let mut out = String::new();
    out.push_str(&format!("| {} |\n", headers.join(" | ")));
    out.push_str(&format!("|{}\n", "---|".repeat(headers.len())));
    for row in rows {
        let cells: Vec<String> = row.iter().map(|cell| cell.replace('|', "\\|")).collect();
        out.push_str(&format!("| {} |\n", cells.join(" | ")));
    }
    out
}

fn write_csv(path: &Path, headers: &[&str], rows: Vec<Vec<String>>) -> Result<()> {
    let mut out = String::new();
    out.push_str(&headers.join(","));
    out.push('\n');
    for row in rows {
        let fields: Vec<String> = row.iter().map(|field| csv_field(field)).collect();
        out.push_str(&fields.join(","));
        out.push('\n');
    }
    fs::write(path, out)?;
    Ok(())
}

/// Quote a CSV field only when it needs it.
fn csv_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
