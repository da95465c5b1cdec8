//! The play-event record: one track played once, as the exporter wrote it.

use crate::error::{Error, Result};
use chrono::NaiveDateTime;
use serde::Deserialize;
use std::path::Path;

/// Timestamp formats the exporter is known to produce. Stored verbatim so
/// SQLite's date functions can bucket on the raw text.
const END_TIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S"];

/// How a play event is stored in the database: the export's four fields,
/// nothing more. No id: the history is an append-only log and duplicate
/// rows are legal.
#[derive(Debug, Clone, PartialEq)]
pub struct Listen {
    /// When the play ended, as exported (`YYYY-MM-DD HH:MM`).
    pub end_time: String,
    pub artist_name: String,
    pub track_name: String,
    /// Milliseconds actually played. Never negative.
    pub ms_played: i64,
}

/// A record as it appears in a `StreamingHistory*.json` file. Every field
/// is optional here so a missing one can be reported with its file and
/// index instead of a bare deserialization error.
#[derive(Debug, Deserialize)]
pub struct RawListen {
    #[serde(rename = "endTime")]
    pub end_time: Option<String>,
    #[serde(rename = "artistName")]
    pub artist_name: Option<String>,
    #[serde(rename = "trackName")]
    pub track_name: Option<String>,
    #[serde(rename = "msPlayed")]
    pub ms_played: Option<i64>,
}

/// Parse an exported timestamp, trying each known format in turn.
pub fn parse_end_time(s: &str) -> Option<NaiveDateTime> {
    END_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

impl Listen {
    /// Validate one raw export record. A missing field, a negative
    /// `msPlayed` or an unparseable `endTime` rejects the record, and with
    /// it the whole batch, per the importer's all-or-nothing policy.
    pub fn from_raw(raw: RawListen, file: &Path, index: usize) -> Result<Self> {
        let malformed = |reason: String| Error::MalformedRecord {
            file: file.to_path_buf(),
            index,
            reason,
        };

        let end_time = raw
            .end_time
            .ok_or_else(|| malformed("missing endTime".to_string()))?;
        let artist_name = raw
            .artist_name
            .ok_or_else(|| malformed("missing artistName".to_string()))?;
        let track_name = raw
            .track_name
            .ok_or_else(|| malformed("missing trackName".to_string()))?;
        let ms_played = raw
            .ms_played
            .ok_or_else(|| malformed("missing msPlayed".to_string()))?;

        if ms_played < 0 {
            return Err(malformed(format!("negative msPlayed: {ms_played}")));
        }
        if parse_end_time(&end_time).is_none() {
            return Err(malformed(format!("unparseable endTime: {end_time:?}")));
        }

        Ok(Self {
            end_time,
            artist_name,
            track_name,
            ms_played,
        })
    }
}
