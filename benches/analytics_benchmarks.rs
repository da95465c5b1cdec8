//! # Replay Performance Benchmarks
//!
//! Benchmarks for the two hot paths: the atomic import and the analytics
//! catalogue over a realistically sized store.
//!
//! ## Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench
//!
//! # Run specific benchmark group
//! cargo bench import
//! cargo bench analytics
//! ```

use criterion::{criterion_group, criterion_main, Criterion};
use replay::analytics::{Analytics, TimeRange};
use replay::config::Config;
use replay::import::Importer;
use std::hint::black_box;
use std::path::Path;
use tempfile::TempDir;

const LISTENS: usize = 20_000;
const ARTISTS: usize = 120;
const TRACKS: usize = 900;

fn bench_config(root: &Path) -> Config {
    Config {
        data_dir: root.join("db"),
        input_dir: root.join("data"),
        output_dir: root.join("outputs"),
        genres_path: None,
    }
}

/// One export file with a deterministic spread of artists, tracks, dates
/// and durations.
fn write_synthetic_history(config: &Config) {
    std::fs::create_dir_all(&config.input_dir).expect("create input dir");

    let records: Vec<serde_json::Value> = (0..LISTENS)
        .map(|i| {
            let month = 1 + (i / 2000) % 12;
            let day = 1 + (i / 80) % 28;
            let hour = i % 24;
            serde_json::json!({
                "endTime": format!("2021-{month:02}-{day:02} {hour:02}:{:02}", i % 60),
                "artistName": format!("artist-{:03}", i % ARTISTS),
                "trackName": format!("track-{:04}", i % TRACKS),
                "msPlayed": 15_000 + (i as i64 * 7919) % 300_000,
            })
        })
        .collect();

    std::fs::write(
        config.input_dir.join("StreamingHistory_music_0.json"),
        serde_json::to_string(&records).expect("serialize"),
    )
    .expect("write export file");
}

fn populated_store() -> (TempDir, Config) {
    let root = TempDir::new().expect("temp dir");
    let config = bench_config(root.path());
    write_synthetic_history(&config);
    Importer::new(&config).run().expect("import");
    (root, config)
}

fn benchmark_import(c: &mut Criterion) {
    let root = TempDir::new().expect("temp dir");
    let config = bench_config(root.path());
    write_synthetic_history(&config);

    c.bench_function("import_20k_listens", |b| {
        b.iter(|| {
            let count = Importer::new(black_box(&config)).run().expect("import");
            black_box(count)
        });
    });
}

fn benchmark_catalogue(c: &mut Criterion) {
    let (_root, config) = populated_store();
    let analytics = Analytics::open(&config).expect("open store");
    let range = TimeRange::all();

    let mut group = c.benchmark_group("analytics");
    group.bench_function("totals", |b| {
        b.iter(|| analytics.totals(black_box(&range)).expect("totals"));
    });
    group.bench_function("top_artists", |b| {
        b.iter(|| analytics.top_artists(black_box(&range), 10).expect("top artists"));
    });
    group.bench_function("concentration", |b| {
        b.iter(|| analytics.concentration(black_box(&range)).expect("hhi"));
    });
    group.bench_function("discovery_curve", |b| {
        b.iter(|| analytics.discovery_curve(black_box(&range)).expect("discovery"));
    });
    group.bench_function("artist_binges", |b| {
        b.iter(|| analytics.artist_binges(black_box(&range)).expect("binges"));
    });
    group.finish();
}

criterion_group!(benches, benchmark_import, benchmark_catalogue);
criterion_main!(benches);
