//! # Integration Tests for Replay
//!
//! End-to-end tests driving the importer and the analytics catalogue the
//! way the CLI does: real export files on disk, a real store file, and
//! real reads through the published path.

use anyhow::Result;
use chrono::NaiveDate;
use replay::analytics::{Analytics, Loyalty, TimeRange};
use replay::config::Config;
use replay::error::Error;
use replay::import::Importer;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const HOUR_MS: i64 = 3_600_000;

/// Config rooted in a throwaway directory.
fn test_config(root: &Path) -> Config {
    Config {
        data_dir: root.join("db"),
        input_dir: root.join("data"),
        output_dir: root.join("outputs"),
        genres_path: None,
    }
}

/// Write one export file of (endTime, artistName, trackName, msPlayed)
/// records.
fn write_history(
    dir: &Path,
    name: &str,
    records: &[(&str, &str, &str, i64)],
) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let json: Vec<serde_json::Value> = records
        .iter()
        .map(|(end_time, artist, track, ms)| {
            serde_json::json!({
                "endTime": end_time,
                "artistName": artist,
                "trackName": track,
                "msPlayed": ms,
            })
        })
        .collect();
    let path = dir.join(name);
    fs::write(&path, serde_json::to_string_pretty(&json)?)?;
    Ok(path)
}

fn import(config: &Config, records: &[(&str, &str, &str, i64)]) -> Result<usize> {
    write_history(&config.input_dir, "StreamingHistory_music_0.json", records)?;
    Ok(Importer::new(config).run()?)
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

mod import_tests {
    use super::*;

    #[test]
    fn round_trip_preserves_every_field_exactly() -> Result<()> {
        let root = TempDir::new()?;
        let config = test_config(root.path());

        let records = [
            ("2021-01-01 10:00", "Big Thief", "Paul", 214_000),
            ("2021-01-01 10:04", "Big Thief", "Paul", 0),
            // Exact duplicate rows are legal: the history is a log.
            ("2021-01-01 10:04", "Big Thief", "Paul", 0),
            ("2021-02-11 23:59", "Órla Gartland", "Woman on the Internet (Live)", 185_432),
        ];
        let count = import(&config, &records)?;
        assert_eq!(count, 4);

        let conn = rusqlite::Connection::open(config.db_path())?;
        let mut stmt = conn.prepare(
            "SELECT endTime, artistName, trackName, msPlayed FROM listens ORDER BY rowid",
        )?;
        let rows: Vec<(String, String, String, i64)> = stmt
            .query_map([], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
            })?
            .collect::<rusqlite::Result<_>>()?;

        assert_eq!(rows.len(), records.len());
        for (got, want) in rows.iter().zip(records.iter()) {
            assert_eq!(got.0, want.0);
            assert_eq!(got.1, want.1);
            assert_eq!(got.2, want.2);
            assert_eq!(got.3, want.3);
        }
        Ok(())
    }

    #[test]
    fn files_load_in_stable_name_order() -> Result<()> {
        let root = TempDir::new()?;
        let config = test_config(root.path());

        write_history(
            &config.input_dir,
            "StreamingHistory_music_1.json",
            &[("2021-01-02 10:00", "second", "t", 1000)],
        )?;
        write_history(
            &config.input_dir,
            "StreamingHistory_music_0.json",
            &[("2021-01-01 10:00", "first", "t", 1000)],
        )?;

        Importer::new(&config).run()?;

        let conn = rusqlite::Connection::open(config.db_path())?;
        let first: String = conn.query_row(
            "SELECT artistName FROM listens ORDER BY rowid LIMIT 1",
            [],
            |row| row.get(0),
        )?;
        assert_eq!(first, "first");
        Ok(())
    }

    #[test]
    fn no_input_files_is_empty_input() {
        let root = TempDir::new().unwrap();
        let config = test_config(root.path());
        fs::create_dir_all(&config.input_dir).unwrap();

        let err = Importer::new(&config).run().unwrap_err();
        assert!(matches!(err, Error::EmptyInput(_)));
        assert!(!config.db_path().exists());
    }

    #[test]
    fn all_empty_files_is_empty_input() {
        let root = TempDir::new().unwrap();
        let config = test_config(root.path());
        write_history(&config.input_dir, "StreamingHistory_music_0.json", &[]).unwrap();
        write_history(&config.input_dir, "StreamingHistory_music_1.json", &[]).unwrap();

        let err = Importer::new(&config).run().unwrap_err();
        assert!(matches!(err, Error::EmptyInput(_)));
    }

    #[test]
    fn failed_import_leaves_previous_store_byte_identical() -> Result<()> {
        let root = TempDir::new()?;
        let config = test_config(root.path());

        import(&config, &[("2021-01-01 10:00", "keep", "me", 1000)])?;
        let before = fs::read(config.db_path())?;

        // Second batch carries a malformed record (no artistName).
        fs::write(
            config.input_dir.join("StreamingHistory_music_0.json"),
            r#"[{"endTime": "2021-06-01 10:00", "trackName": "broken", "msPlayed": 5}]"#,
        )?;
        let err = Importer::new(&config).run().unwrap_err();
        assert!(matches!(err, Error::MalformedRecord { .. }));

        let after = fs::read(config.db_path())?;
        assert_eq!(before, after);

        // Staging resources are gone: only the store file remains.
        let leftovers: Vec<_> = fs::read_dir(&config.data_dir)?
            .filter_map(std::result::Result::ok)
            .map(|entry| entry.file_name())
            .collect();
        assert_eq!(leftovers, ["listens.db"]);
        Ok(())
    }

    #[test]
    fn cleanup_failure_after_staging_surfaces_and_store_survives() -> Result<()> {
        let root = TempDir::new()?;
        let config = test_config(root.path());

        import(&config, &[("2021-01-01 10:00", "keep", "me", 1000)])?;
        let before = fs::read(config.db_path())?;

        // A directory where the -wal sidecar would be makes the cleanup's
        // remove_file fail with something other than "not found". That
        // failure happens after staging and must surface, not be swallowed.
        let blocker = root.path().join("db/listens.db-wal");
        fs::create_dir(&blocker)?;

        write_history(
            &config.input_dir,
            "StreamingHistory_music_0.json",
            &[("2022-01-01 10:00", "new", "t", 1000)],
        )?;
        let err = Importer::new(&config).run().unwrap_err();
        assert!(matches!(err, Error::Io(_)));

        // The published store is untouched and the staging dir is gone.
        let after = fs::read(config.db_path())?;
        assert_eq!(before, after);

        let mut leftovers: Vec<_> = fs::read_dir(&config.data_dir)?
            .filter_map(std::result::Result::ok)
            .map(|entry| entry.file_name())
            .collect();
        leftovers.sort();
        assert_eq!(leftovers, ["listens.db", "listens.db-wal"]);
        Ok(())
    }

    #[test]
    fn import_replaces_old_dataset_wholesale() -> Result<()> {
        let root = TempDir::new()?;
        let config = test_config(root.path());

        import(&config, &[("2021-01-01 10:00", "old", "t", 1000)])?;
        let count = import(
            &config,
            &[
                ("2022-01-01 10:00", "new", "t1", 1000),
                ("2022-01-02 10:00", "new", "t2", 1000),
            ],
        )?;
        assert_eq!(count, 2);

        let analytics = Analytics::open(&config)?;
        let totals = analytics.totals(&TimeRange::all())?;
        assert_eq!(totals.plays, 2);
        let top = analytics.top_artists(&TimeRange::all(), 10)?;
        assert_eq!(top[0].artist, "new");
        Ok(())
    }

    #[test]
    fn stale_sidecar_files_do_not_survive_the_swap() -> Result<()> {
        let root = TempDir::new()?;
        let config = test_config(root.path());
        fs::create_dir_all(&config.data_dir)?;

        let wal = root.path().join("db/listens.db-wal");
        let shm = root.path().join("db/listens.db-shm");
        fs::write(&wal, b"stale")?;
        fs::write(&shm, b"stale")?;

        import(&config, &[("2021-01-01 10:00", "a", "t", 1000)])?;

        assert!(!wal.exists());
        assert!(!shm.exists());
        assert!(config.db_path().exists());
        Ok(())
    }

    #[test]
    fn reader_holding_a_handle_keeps_its_snapshot_across_a_swap() -> Result<()> {
        let root = TempDir::new()?;
        let config = test_config(root.path());

        import(&config, &[("2021-01-01 10:00", "old", "t", 1000)])?;
        let reader = Analytics::open(&config)?;

        import(
            &config,
            &[
                ("2022-01-01 10:00", "new", "t1", 1000),
                ("2022-01-02 10:00", "new", "t2", 1000),
            ],
        )?;

        // The pre-swap handle still serves the old, complete dataset.
        let old_totals = reader.totals(&TimeRange::all())?;
        assert_eq!(old_totals.plays, 1);

        // A fresh open observes the new dataset, fully formed.
        let fresh = Analytics::open(&config)?;
        assert_eq!(fresh.totals(&TimeRange::all())?.plays, 2);
        Ok(())
    }
}

mod analytics_tests {
    use super::*;

    #[test]
    fn hhi_worked_example_labels_loyalist() -> Result<()> {
        let root = TempDir::new()?;
        let config = test_config(root.path());

        // Shares 0.5 / 0.3 / 0.2 of total listening time.
        import(
            &config,
            &[
                ("2021-01-01 08:00", "a", "t", 5 * HOUR_MS),
                ("2021-01-01 09:00", "b", "t", 3 * HOUR_MS),
                ("2021-01-01 10:00", "c", "t", 2 * HOUR_MS),
            ],
        )?;

        let analytics = Analytics::open(&config)?;
        let c = analytics.concentration(&TimeRange::all())?.unwrap();
        assert!((c.hhi - 0.38).abs() < 1e-9);
        assert_eq!(c.loyalty, Loyalty::Loyalist);
        Ok(())
    }

    #[test]
    fn skip_proxy_worked_example() -> Result<()> {
        let root = TempDir::new()?;
        let config = test_config(root.path());

        import(
            &config,
            &[
                ("2021-01-01 08:00", "a", "t1", 10_000),
                ("2021-01-01 08:01", "a", "t2", 20_000),
                ("2021-01-01 08:02", "a", "t3", 40_000),
                ("2021-01-01 08:03", "a", "t4", 70_000),
                ("2021-01-01 08:04", "a", "t5", 90_000),
            ],
        )?;

        let analytics = Analytics::open(&config)?;
        let proxy = analytics.skip_proxy(&TimeRange::all())?;
        assert_eq!(proxy.pct_lt_30s, 40.0);
        assert_eq!(proxy.pct_lt_60s, 60.0);
        Ok(())
    }

    #[test]
    fn discovery_curve_ends_at_the_distinct_artist_count() -> Result<()> {
        let root = TempDir::new()?;
        let config = test_config(root.path());

        import(
            &config,
            &[
                ("2021-03-01 08:00", "a", "t", HOUR_MS),
                ("2021-03-01 09:00", "b", "t", HOUR_MS),
                ("2021-03-02 08:00", "a", "t", HOUR_MS),
                ("2021-03-05 08:00", "c", "t", HOUR_MS),
                ("2021-03-06 08:00", "c", "t", HOUR_MS),
            ],
        )?;

        let analytics = Analytics::open(&config)?;
        let curve = analytics.discovery_curve(&TimeRange::all())?;

        for pair in curve.windows(2) {
            assert!(pair[1].cumulative_artists >= pair[0].cumulative_artists);
        }
        let totals = analytics.totals(&TimeRange::all())?;
        assert_eq!(curve.last().unwrap().cumulative_artists, totals.unique_artists);
        Ok(())
    }

    #[test]
    fn what_if_drop_top_promotes_the_runner_up() -> Result<()> {
        let root = TempDir::new()?;
        let config = test_config(root.path());

        import(
            &config,
            &[
                ("2021-01-01 08:00", "A", "t", 10 * HOUR_MS),
                ("2021-01-02 08:00", "B", "t", 6 * HOUR_MS),
                ("2021-01-03 08:00", "C", "t", 4 * HOUR_MS),
            ],
        )?;

        let analytics = Analytics::open(&config)?;
        let what_if = analytics.what_if_drop_top(&TimeRange::all())?.unwrap();
        assert_eq!(what_if.dropped_artist, "A");
        assert_eq!(what_if.new_top.unwrap().artist, "B");
        Ok(())
    }

    #[test]
    fn empty_store_answers_every_query_without_erroring() -> Result<()> {
        let root = TempDir::new()?;
        let config = test_config(root.path());

        // An importer never publishes an empty store, so build one directly.
        fs::create_dir_all(&config.data_dir)?;
        let conn = rusqlite::Connection::open(config.db_path())?;
        replay::store::create_listens_table(&conn)?;
        drop(conn);

        let analytics = Analytics::open(&config)?;
        let range = TimeRange::all();

        assert_eq!(analytics.totals(&range)?.plays, 0);
        assert!(analytics.top_artists(&range, 10)?.is_empty());
        assert!(analytics.top_tracks(&range, 10)?.is_empty());
        assert!(analytics.concentration(&range)?.is_none());
        assert_eq!(analytics.repeat_rate(&range)?, 0.0);
        assert_eq!(analytics.skip_proxy(&range)?.pct_lt_30s, 0.0);
        assert!(analytics.discovery_curve(&range)?.is_empty());
        assert!(analytics.artist_binges(&range)?.is_empty());
        assert!(analytics.what_if_drop_top(&range)?.is_none());
        Ok(())
    }

    #[test]
    fn missing_store_is_reported_as_unavailable() {
        let root = TempDir::new().unwrap();
        let config = test_config(root.path());

        let err = Analytics::open(&config).unwrap_err();
        assert!(matches!(err, Error::StoreUnavailable(_)));
    }

    #[test]
    fn range_filter_narrows_every_downstream_metric() -> Result<()> {
        let root = TempDir::new()?;
        let config = test_config(root.path());

        import(
            &config,
            &[
                ("2021-01-10 08:00", "january", "t", HOUR_MS),
                ("2021-02-10 08:00", "february", "t", 2 * HOUR_MS),
                ("2021-03-10 08:00", "march", "t", 3 * HOUR_MS),
            ],
        )?;

        let analytics = Analytics::open(&config)?;
        let range = TimeRange::new(Some(date("2021-02-01")), Some(date("2021-02-28")))?;

        let totals = analytics.totals(&range)?;
        assert_eq!(totals.plays, 1);
        let top = analytics.top_artists(&range, 10)?;
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].artist, "february");

        let months = analytics.hours_by_month(&range)?;
        assert_eq!(months.len(), 1);
        assert_eq!(months[0].month, "2021-02");
        Ok(())
    }

    #[test]
    fn backwards_range_fails_fast() {
        let err =
            TimeRange::new(Some(date("2021-12-01")), Some(date("2021-01-01"))).unwrap_err();
        assert!(matches!(err, Error::InvalidRange { .. }));
    }
}

mod report_tests {
    use super::*;
    use replay::genres::GenreMap;
    use replay::report;

    #[test]
    fn report_writes_all_csv_tables_and_the_markdown_summary() -> Result<()> {
        let root = TempDir::new()?;
        let config = test_config(root.path());

        import(
            &config,
            &[
                ("2021-01-01 08:00", "Big Thief", "Paul", HOUR_MS),
                ("2021-01-02 09:00", "Big Thief", "Shark Smile", HOUR_MS / 2),
                ("2021-01-03 21:00", "Caroline Polachek", "So Hot", HOUR_MS / 4),
            ],
        )?;

        let analytics = Analytics::open(&config)?;
        let range = TimeRange::all();
        report::write_csvs(&analytics, &range, &config.output_dir)?;
        let report_path =
            report::write_markdown(&analytics, &range, None, &config.output_dir)?;

        for name in [
            "top_artists.csv",
            "top_tracks.csv",
            "by_hour.csv",
            "by_weekday.csv",
            "by_month.csv",
            "artist_binges.csv",
            "skips.csv",
            "repeats.csv",
            "top_replays.csv",
            "discovery.csv",
        ] {
            assert!(config.output_dir.join(name).exists(), "missing {name}");
        }

        let md = fs::read_to_string(report_path)?;
        assert!(md.contains("# Listening Report"));
        assert!(md.contains("Big Thief"));
        assert!(md.contains("## Loyalty vs. exploration"));
        assert!(md.contains("## Discovery"));
        Ok(())
    }

    #[test]
    fn genre_table_appears_only_when_a_side_table_is_supplied() -> Result<()> {
        let root = TempDir::new()?;
        let config = test_config(root.path());

        import(
            &config,
            &[
                ("2021-01-01 08:00", "Big Thief", "Paul", 2 * HOUR_MS),
                ("2021-01-02 08:00", "Unmapped", "t", HOUR_MS),
            ],
        )?;

        let analytics = Analytics::open(&config)?;
        let range = TimeRange::all();

        let without = fs::read_to_string(report::write_markdown(
            &analytics,
            &range,
            None,
            &config.output_dir,
        )?)?;
        assert!(!without.contains("## Top genres"));

        let map = GenreMap::parse("artistName,genres\nBig Thief,indie rock|folk\n");
        let with = fs::read_to_string(report::write_markdown(
            &analytics,
            &range,
            Some(&map),
            &config.output_dir,
        )?)?;
        assert!(with.contains("## Top genres"));
        assert!(with.contains("Indie Rock"));
        assert!(with.contains("Unknown"));
        Ok(())
    }

    #[test]
    fn top_artists_csv_quotes_names_with_commas() -> Result<()> {
        let root = TempDir::new()?;
        let config = test_config(root.path());

        import(
            &config,
            &[("2021-01-01 08:00", "Crosby, Stills & Nash", "Helplessly Hoping", HOUR_MS)],
        )?;

        let analytics = Analytics::open(&config)?;
        report::write_csvs(&analytics, &TimeRange::all(), &config.output_dir)?;

        let csv = fs::read_to_string(config.output_dir.join("top_artists.csv"))?;
        assert!(csv.contains("\"Crosby, Stills & Nash\""));
        Ok(())
    }
}
