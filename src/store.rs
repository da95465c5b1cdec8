//! The dataset store: one `listens` table behind a stable file path.
//!
//! The store holds the complete play history and nothing else. It is only
//! ever written by the importer, which builds a replacement file off to the
//! side and swaps it in with a single rename, so a connection obtained
//! here always observes either the old dataset or the new one in full,
//! never a mix. Readers that keep a handle across a swap continue reading
//! the pre-swap bytes until they reopen.

use crate::error::{Error, Result};
use log::debug;
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::time::Duration;

/// Upper bound on waiting for another process to release the store.
/// After this the operation fails instead of hanging.
pub const BUSY_WAIT: Duration = Duration::from_secs(30);

/// Create the `listens` table on a fresh (staging) connection.
///
/// The four export columns, verbatim. Deliberately no primary key and no
/// uniqueness: the history is an append-only log and duplicates are legal.
pub fn create_listens_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE listens (
            endTime    TEXT    NOT NULL,
            artistName TEXT    NOT NULL,
            trackName  TEXT    NOT NULL,
            msPlayed   INTEGER NOT NULL
        )",
        (),
    )?;
    Ok(())
}

/// Open the published store for reading.
///
/// The connection is read-only, so a report or dashboard process can never
/// block or corrupt an import happening next to it.
///
/// # Errors
///
/// Returns [`Error::StoreUnavailable`] if the store file does not exist or
/// cannot be opened.
pub fn open_read_only(db_path: &Path) -> Result<Connection> {
    if !db_path.exists() {
        return Err(Error::StoreUnavailable(format!(
            "{} does not exist; run `replay import` first",
            db_path.display()
        )));
    }

    let conn = Connection::open_with_flags(db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .map_err(|e| Error::StoreUnavailable(format!("{}: {e}", db_path.display())))?;
    conn.busy_timeout(BUSY_WAIT)?;

    debug!("Opened store read-only: {}", db_path.display());
    Ok(conn)
}
