//! Atomic dataset-replace import.
//!
//! The importer never touches the published store until the very last
//! step. Records from every export file are parsed and validated up front,
//! staged into a brand-new database file beside the destination, committed
//! in one transaction, and published with a single `rename`. A failure
//! anywhere before the rename leaves the previous store byte-identical;
//! staging resources are dropped on success and failure alike.
//!
//! A concurrent reader holding an open handle keeps reading the old file's
//! bytes through the swap and observes the new dataset, fully formed, the
//! next time it opens the store.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::listen::{Listen, RawListen};
use crate::store;
use log::{debug, info};
use rusqlite::Connection;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Side files tied to the old store's identity. A fresh data file next to
/// a stale `-wal` would desynchronize, so both go before the swap.
const SIDECAR_SUFFIXES: [&str; 2] = ["-wal", "-shm"];

/// Rebuilds the store from a set of export files.
pub struct Importer<'a> {
    config: &'a Config,
}

impl<'a> Importer<'a> {
    #[must_use]
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Import every matching export file in the configured input directory.
    /// Returns the number of records the store now holds.
    pub fn run(&self) -> Result<usize> {
        let files = discover_files(&self.config.input_dir)?;
        self.import_files(&files)
    }

    /// Import an explicit set of export files, replacing the store wholesale.
    pub fn import_files(&self, files: &[PathBuf]) -> Result<usize> {
        let listens = parse_files(files)?;
        if listens.is_empty() {
            return Err(Error::EmptyInput(format!(
                "all {} input file(s) were empty",
                files.len()
            )));
        }

        let db_path = self.config.db_path();
        fs::create_dir_all(&self.config.data_dir)?;

        // Staged beside the destination so the final publish is a rename
        // within one filesystem, which is where rename is atomic.
        let staging = tempfile::Builder::new()
            .prefix("listens-staging-")
            .tempdir_in(&self.config.data_dir)?;
        let staged_db = staging.path().join(crate::config::STORE_FILE);

        populate(&staged_db, &listens)?;
        debug!(
            "Staged {} listens in {}",
            listens.len(),
            staged_db.display()
        );

        remove_stale_sidecars(&db_path)?;
        fs::rename(&staged_db, &db_path)?;
        info!(
            "Published {} listens to {}",
            listens.len(),
            db_path.display()
        );

        // `staging` drops here and removes the directory; the `?` exits
        // above drop it just the same.
        Ok(listens.len())
    }
}

/// All `StreamingHistory*.json` files in `dir`, sorted by name so the load
/// order is stable across runs. The exporter partitions records across
/// files arbitrarily, so cross-file order carries no meaning anyway.
pub fn discover_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| {
        Error::EmptyInput(format!("cannot read input directory {}: {e}", dir.display()))
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| is_history_file(path))
        .collect();
    files.sort();

    if files.is_empty() {
        return Err(Error::EmptyInput(format!(
            "no StreamingHistory*.json files in {}",
            dir.display()
        )));
    }

    debug!("Discovered {} export file(s) in {}", files.len(), dir.display());
    Ok(files)
}

fn is_history_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with("StreamingHistory") && name.ends_with(".json"))
}

/// Parse and validate every file into one in-memory sequence. A malformed
/// record anywhere rejects the whole batch; totals must never depend on
/// which rows happened to survive.
fn parse_files(files: &[PathBuf]) -> Result<Vec<Listen>> {
    let mut listens = Vec::new();

    for file in files {
        let text = fs::read_to_string(file)?;
        let raw: Vec<RawListen> = serde_json::from_str(&text).map_err(|e| Error::Json {
            file: file.clone(),
            source: e,
        })?;
        debug!("{}: {} record(s)", file.display(), raw.len());

        for (index, record) in raw.into_iter().enumerate() {
            listens.push(Listen::from_raw(record, file, index)?);
        }
    }

    Ok(listens)
}

/// Build and fill the staged store inside one transaction: either every
/// record commits or none do.
fn populate(staged_db: &Path, listens: &[Listen]) -> Result<()> {
    let mut conn = Connection::open(staged_db)?;
    conn.busy_timeout(store::BUSY_WAIT)?;
    store::create_listens_table(&conn)?;

    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO listens (endTime, artistName, trackName, msPlayed)
             VALUES (?1, ?2, ?3, ?4)",
        )?;

        for listen in listens {
            stmt.execute((
                &listen.end_time,
                &listen.artist_name,
                &listen.track_name,
                listen.ms_played,
            ))?;
        }
    }
    tx.commit()?;

    Ok(())
}

/// Delete `-wal`/`-shm` files belonging to the store being replaced.
/// Only "already absent" is tolerated; any other failure surfaces, since a
/// sidecar that outlives the swap corrupts the next reader's view.
fn remove_stale_sidecars(db_path: &Path) -> Result<()> {
    for suffix in SIDECAR_SUFFIXES {
        let mut name = db_path.as_os_str().to_owned();
        name.push(suffix);
        let sidecar = PathBuf::from(name);

        match fs::remove_file(&sidecar) {
            Ok(()) => debug!("Removed stale sidecar {}", sidecar.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}
