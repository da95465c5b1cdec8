//! The analytics catalogue: pure, read-only aggregation queries over the
//! `listens` store.
//!
//! Every metric is one named method on [`Analytics`], reused by every
//! downstream consumer: the report writer, the CLI summary, and whatever
//! presentation layer sits on top. Each takes a [`TimeRange`] filter
//! (inclusive on both ends, default full range) and returns plain row
//! structs. An empty store yields empty or zero-default results, never an
//! error; zero denominators collapse to 0.0 instead of propagating a
//! numeric fault.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::genres::GenreMap;
use crate::store;
use chrono::{NaiveDate, Weekday};
use rusqlite::{params_from_iter, Connection};
use std::collections::{BTreeMap, HashMap};

/// Plays shorter than this count as "skipped fast" in the skip proxy.
const SKIP_SHORT_MS: i64 = 30_000;
/// Plays shorter than this count as "skipped" in the wider skip proxy.
const SKIP_LONG_MS: i64 = 60_000;
/// A (month, artist) pair needs at least this much play time to register
/// as a binge.
const BINGE_MIN_MS: i64 = 30 * 60 * 1000;
/// Guilty pleasures: at least this many sessions...
const GUILTY_MIN_SESSIONS: i64 = 5;
/// ...but less than this much total play time.
const GUILTY_MAX_MS: i64 = 12 * 60 * 1000;

/// HHI below which listening counts as exploring.
const HHI_EXPLORER_MAX: f64 = 0.07;
/// HHI below which listening counts as balanced; at or above is loyalist.
const HHI_BALANCED_MAX: f64 = 0.12;

/// Inclusive `[start, end]` date filter applied to every query.
/// Both ends optional; the default is the full observed range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl TimeRange {
    /// Build a validated range. Fails fast on `start > end` rather than
    /// silently returning an empty result.
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Self> {
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(Error::InvalidRange { start: s, end: e });
            }
        }
        Ok(Self { start, end })
    }

    /// The full observed range; no filtering.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }
}

/// Loyalty verdict derived from the concentration index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Loyalty {
    Explorer,
    Balanced,
    Loyalist,
}

impl Loyalty {
    #[must_use]
    pub fn from_hhi(hhi: f64) -> Self {
        if hhi < HHI_EXPLORER_MAX {
            Self::Explorer
        } else if hhi < HHI_BALANCED_MAX {
            Self::Balanced
        } else {
            Self::Loyalist
        }
    }
}

impl std::fmt::Display for Loyalty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Explorer => "Explorer",
            Self::Balanced => "Balanced",
            Self::Loyalist => "Loyalist",
        };
        write!(f, "{label}")
    }
}

/// Headline numbers for the whole (filtered) dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Totals {
    pub plays: u64,
    pub hours: f64,
    pub unique_artists: u64,
    pub unique_tracks: u64,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArtistRow {
    pub artist: String,
    pub hours: f64,
    pub plays: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackRow {
    pub track: String,
    pub artist: String,
    pub hours: f64,
    pub plays: u64,
}

/// Listening-time concentration across artists: HHI = Σ share², in (0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Concentration {
    pub hhi: f64,
    pub loyalty: Loyalty,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HourBucket {
    /// Hour of day, 0-23.
    pub hour: u8,
    pub hours: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeekdayBucket {
    pub weekday: Weekday,
    pub hours: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthBucket {
    /// Calendar month, `YYYY-MM`.
    pub month: String,
    pub hours: f64,
    pub plays: u64,
    pub unique_artists: u64,
    pub unique_tracks: u64,
}

/// Plays cut short, as a heuristic for skips.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SkipProxy {
    pub total_plays: u64,
    pub plays_lt_30s: u64,
    pub pct_lt_30s: f64,
    pub plays_lt_60s: u64,
    pub pct_lt_60s: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReplayRow {
    pub track: String,
    pub artist: String,
    pub sessions: u64,
    pub minutes: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BingeRow {
    pub month: String,
    pub artist: String,
    /// This artist's share of the month's total listening time, percent.
    pub share_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscoveryPoint {
    pub date: NaiveDate,
    pub new_artists: u64,
    pub cumulative_artists: u64,
}

/// Result of excluding the single biggest artist from the ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct WhatIf {
    pub dropped_artist: String,
    pub dropped_hours: f64,
    pub new_top: Option<ArtistRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenreRow {
    pub genre: String,
    pub hours: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyHours {
    pub date: NaiveDate,
    pub hours: f64,
}

/// Read-only view over the store, one method per metric.
#[derive(Debug)]
pub struct Analytics {
    conn: Connection,
}

impl Analytics {
    /// Open the published store configured in `config`.
    pub fn open(config: &Config) -> Result<Self> {
        Ok(Self::new(store::open_read_only(&config.db_path())?))
    }

    /// Wrap an existing connection. The connection is assumed to expose a
    /// `listens` table with the four export columns.
    #[must_use]
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Total plays, hours and distinct counts, plus the observed date span.
    pub fn totals(&self, range: &TimeRange) -> Result<Totals> {
        let (conds, params) = range_parts(range);
        let sql = format!(
            "SELECT COUNT(*),
                    COALESCE(SUM(msPlayed), 0) / 3600000.0,
                    COUNT(DISTINCT artistName),
                    COUNT(DISTINCT trackName),
                    MIN(date(endTime)),
                    MAX(date(endTime))
             FROM listens{}",
            where_clause(&conds)
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let totals = stmt.query_row(params_from_iter(params.iter()), |row| {
            Ok(Totals {
                plays: row.get::<_, i64>(0)? as u64,
                hours: row.get(1)?,
                unique_artists: row.get::<_, i64>(2)? as u64,
                unique_tracks: row.get::<_, i64>(3)? as u64,
                first_date: row.get(4)?,
                last_date: row.get(5)?,
            })
        })?;
        Ok(totals)
    }

    /// Top artists by hours listened, plays breaking ties.
    pub fn top_artists(&self, range: &TimeRange, limit: usize) -> Result<Vec<ArtistRow>> {
        self.top_artists_excluding(range, None, Some(limit))
    }

    /// Top (track, artist) pairs by hours listened, plays breaking ties.
    pub fn top_tracks(&self, range: &TimeRange, limit: usize) -> Result<Vec<TrackRow>> {
        let (conds, params) = range_parts(range);
        let sql = format!(
            "SELECT trackName, artistName,
                    SUM(msPlayed) / 3600000.0 AS hours, COUNT(*) AS plays
             FROM listens{}
             GROUP BY trackName, artistName
             ORDER BY hours DESC, plays DESC
             LIMIT {limit}",
            where_clause(&conds)
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(params.iter()), |row| {
            Ok(TrackRow {
                track: row.get(0)?,
                artist: row.get(1)?,
                hours: row.get(2)?,
                plays: row.get::<_, i64>(3)? as u64,
            })
        })?;
        collect(rows)
    }

    /// Concentration index over artist listening-time shares.
    ///
    /// `None` when there is no listening time to partition, the defined
    /// default for an empty (or all-zero-duration) selection.
    pub fn concentration(&self, range: &TimeRange) -> Result<Option<Concentration>> {
        let (conds, params) = range_parts(range);
        let sql = format!(
            "SELECT SUM(msPlayed) FROM listens{} GROUP BY artistName",
            where_clause(&conds)
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let per_artist_ms = stmt
            .query_map(params_from_iter(params.iter()), |row| row.get::<_, i64>(0))?
            .collect::<rusqlite::Result<Vec<i64>>>()?;

        let total: i64 = per_artist_ms.iter().sum();
        if total <= 0 {
            return Ok(None);
        }

        let hhi = per_artist_ms
            .iter()
            .map(|&ms| {
                let share = ms as f64 / total as f64;
                share * share
            })
            .sum();

        Ok(Some(Concentration {
            hhi,
            loyalty: Loyalty::from_hhi(hhi),
        }))
    }

    /// Hours listened per hour of day (0-23). Hours with no plays are absent.
    pub fn hours_by_hour_of_day(&self, range: &TimeRange) -> Result<Vec<HourBucket>> {
        let (conds, params) = range_parts(range);
        let sql = format!(
            "SELECT CAST(strftime('%H', endTime) AS INTEGER) AS hour,
                    SUM(msPlayed) / 3600000.0
             FROM listens{}
             GROUP BY hour
             ORDER BY hour",
            where_clause(&conds)
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(params.iter()), |row| {
            Ok(HourBucket {
                hour: row.get::<_, i64>(0)? as u8,
                hours: row.get(1)?,
            })
        })?;
        collect(rows)
    }

    /// Hours listened per weekday, emitted Monday..Sunday. Days with no
    /// plays are absent.
    pub fn hours_by_weekday(&self, range: &TimeRange) -> Result<Vec<WeekdayBucket>> {
        let (conds, params) = range_parts(range);
        // SQLite's %w counts Sunday as 0; reorder to Monday-first after
        // grouping.
        let sql = format!(
            "SELECT CAST(strftime('%w', endTime) AS INTEGER) AS wd,
                    SUM(msPlayed) / 3600000.0
             FROM listens{}
             GROUP BY wd",
            where_clause(&conds)
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let mut by_wd: [Option<f64>; 7] = [None; 7];
        let rows = stmt.query_map(params_from_iter(params.iter()), |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, f64>(1)?))
        })?;
        for row in rows {
            let (wd, hours) = row?;
            by_wd[wd as usize] = Some(hours);
        }

        const SQLITE_WD: [(usize, Weekday); 7] = [
            (1, Weekday::Mon),
            (2, Weekday::Tue),
            (3, Weekday::Wed),
            (4, Weekday::Thu),
            (5, Weekday::Fri),
            (6, Weekday::Sat),
            (0, Weekday::Sun),
        ];
        Ok(SQLITE_WD
            .iter()
            .filter_map(|&(idx, weekday)| by_wd[idx].map(|hours| WeekdayBucket { weekday, hours }))
            .collect())
    }

    /// Hours, plays and distinct counts per calendar month, ascending.
    pub fn hours_by_month(&self, range: &TimeRange) -> Result<Vec<MonthBucket>> {
        let (conds, params) = range_parts(range);
        let sql = format!(
            "SELECT strftime('%Y-%m', endTime) AS month,
                    SUM(msPlayed) / 3600000.0,
                    COUNT(*),
                    COUNT(DISTINCT artistName),
                    COUNT(DISTINCT trackName)
             FROM listens{}
             GROUP BY month
             ORDER BY month",
            where_clause(&conds)
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(params.iter()), |row| {
            Ok(MonthBucket {
                month: row.get(0)?,
                hours: row.get(1)?,
                plays: row.get::<_, i64>(2)? as u64,
                unique_artists: row.get::<_, i64>(3)? as u64,
                unique_tracks: row.get::<_, i64>(4)? as u64,
            })
        })?;
        collect(rows)
    }

    /// Fractions of plays cut short, as percentages with one decimal.
    /// An empty selection yields all zeros.
    pub fn skip_proxy(&self, range: &TimeRange) -> Result<SkipProxy> {
        let (conds, params) = range_parts(range);
        let sql = format!(
            "SELECT COUNT(*),
                    COALESCE(SUM(CASE WHEN msPlayed < {SKIP_SHORT_MS} THEN 1 ELSE 0 END), 0),
                    COALESCE(ROUND(100.0 * SUM(CASE WHEN msPlayed < {SKIP_SHORT_MS} THEN 1 ELSE 0 END) / COUNT(*), 1), 0.0),
                    COALESCE(SUM(CASE WHEN msPlayed < {SKIP_LONG_MS} THEN 1 ELSE 0 END), 0),
                    COALESCE(ROUND(100.0 * SUM(CASE WHEN msPlayed < {SKIP_LONG_MS} THEN 1 ELSE 0 END) / COUNT(*), 1), 0.0)
             FROM listens{}",
            where_clause(&conds)
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let proxy = stmt.query_row(params_from_iter(params.iter()), |row| {
            Ok(SkipProxy {
                total_plays: row.get::<_, i64>(0)? as u64,
                plays_lt_30s: row.get::<_, i64>(1)? as u64,
                pct_lt_30s: row.get(2)?,
                plays_lt_60s: row.get::<_, i64>(3)? as u64,
                pct_lt_60s: row.get(4)?,
            })
        })?;
        Ok(proxy)
    }

    /// Average plays per distinct track; 0.0 when nothing was played.
    pub fn repeat_rate(&self, range: &TimeRange) -> Result<f64> {
        let (conds, params) = range_parts(range);
        let sql = format!(
            "SELECT COUNT(*), COUNT(DISTINCT trackName) FROM listens{}",
            where_clause(&conds)
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let (plays, distinct): (i64, i64) = stmt.query_row(params_from_iter(params.iter()), |row| {
            Ok((row.get(0)?, row.get(1)?))
        })?;

        if distinct == 0 {
            Ok(0.0)
        } else {
            Ok(plays as f64 / distinct as f64)
        }
    }

    /// Tracks replayed at least `min_sessions` times, most-replayed first,
    /// minutes listened breaking ties.
    pub fn replays(
        &self,
        range: &TimeRange,
        min_sessions: u32,
        limit: usize,
    ) -> Result<Vec<ReplayRow>> {
        let (conds, params) = range_parts(range);
        let sql = format!(
            "SELECT trackName, artistName,
                    COUNT(*) AS sessions, SUM(msPlayed) / 60000.0 AS minutes
             FROM listens{}
             GROUP BY trackName, artistName
             HAVING sessions >= {min_sessions}
             ORDER BY sessions DESC, minutes DESC
             LIMIT {limit}",
            where_clause(&conds)
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(params.iter()), |row| {
            Ok(ReplayRow {
                track: row.get(0)?,
                artist: row.get(1)?,
                sessions: row.get::<_, i64>(2)? as u64,
                minutes: row.get(3)?,
            })
        })?;
        collect(rows)
    }

    /// High-frequency, low-total-time tracks: played again and again, but
    /// never for long.
    pub fn guilty_pleasures(&self, range: &TimeRange, limit: usize) -> Result<Vec<ReplayRow>> {
        let (conds, params) = range_parts(range);
        let sql = format!(
            "SELECT trackName, artistName,
                    COUNT(*) AS sessions, SUM(msPlayed) / 60000.0 AS minutes
             FROM listens{}
             GROUP BY trackName, artistName
             HAVING sessions >= {GUILTY_MIN_SESSIONS} AND SUM(msPlayed) < {GUILTY_MAX_MS}
             ORDER BY sessions DESC, minutes ASC
             LIMIT {limit}",
            where_clause(&conds)
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(params.iter()), |row| {
            Ok(ReplayRow {
                track: row.get(0)?,
                artist: row.get(1)?,
                sessions: row.get::<_, i64>(2)? as u64,
                minutes: row.get(3)?,
            })
        })?;
        collect(rows)
    }

    /// Months where one artist captured an outsized share of listening:
    /// every (month, artist) pair with at least 30 minutes, with that
    /// artist's share of the month's total, ordered by month then share.
    pub fn artist_binges(&self, range: &TimeRange) -> Result<Vec<BingeRow>> {
        let (conds, params) = range_parts(range);
        let sql = format!(
            "WITH month_artist AS (
                 SELECT strftime('%Y-%m', endTime) AS month, artistName,
                        SUM(msPlayed) AS ms_artist
                 FROM listens{}
                 GROUP BY month, artistName
             ),
             month_total AS (
                 SELECT month, SUM(ms_artist) AS ms_total
                 FROM month_artist GROUP BY month
             )
             SELECT m.month, m.artistName,
                    ROUND(100.0 * m.ms_artist / t.ms_total, 1) AS share_pct
             FROM month_artist m
             JOIN month_total t USING(month)
             WHERE m.ms_artist >= {BINGE_MIN_MS}
             ORDER BY m.month, share_pct DESC",
            where_clause(&conds)
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(params.iter()), |row| {
            Ok(BingeRow {
                month: row.get(0)?,
                artist: row.get(1)?,
                share_pct: row.get(2)?,
            })
        })?;
        collect(rows)
    }

    /// New artists per observed calendar date with a running cumulative
    /// sum: a monotonically non-decreasing step function whose final value
    /// is the distinct-artist count.
    pub fn discovery_curve(&self, range: &TimeRange) -> Result<Vec<DiscoveryPoint>> {
        let (conds, params) = range_parts(range);
        let where_sql = where_clause(&conds);

        let sql = format!(
            "SELECT MIN(date(endTime)) FROM listens{where_sql} GROUP BY artistName"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut new_per_date: BTreeMap<NaiveDate, u64> = BTreeMap::new();
        let first_dates = stmt.query_map(params_from_iter(params.iter()), |row| {
            row.get::<_, NaiveDate>(0)
        })?;
        for date in first_dates {
            *new_per_date.entry(date?).or_insert(0) += 1;
        }

        let sql = format!(
            "SELECT DISTINCT date(endTime) FROM listens{where_sql} ORDER BY 1"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let dates = stmt
            .query_map(params_from_iter(params.iter()), |row| {
                row.get::<_, NaiveDate>(0)
            })?
            .collect::<rusqlite::Result<Vec<NaiveDate>>>()?;

        let mut cumulative = 0;
        Ok(dates
            .into_iter()
            .map(|date| {
                let new_artists = new_per_date.get(&date).copied().unwrap_or(0);
                cumulative += new_artists;
                DiscoveryPoint {
                    date,
                    new_artists,
                    cumulative_artists: cumulative,
                }
            })
            .collect())
    }

    /// Drop the single artist with the most listening time and report who
    /// takes the top spot instead. `None` on an empty selection.
    pub fn what_if_drop_top(&self, range: &TimeRange) -> Result<Option<WhatIf>> {
        let Some(top) = self.top_artist_excluding_one(range, None)? else {
            return Ok(None);
        };
        let new_top = self.top_artist_excluding_one(range, Some(&top.artist))?;
        Ok(Some(WhatIf {
            dropped_artist: top.artist,
            dropped_hours: top.hours,
            new_top,
        }))
    }

    /// Artist hours split equally across each artist's listed genres,
    /// summed per genre. Artists missing from the side-table land in
    /// "Unknown".
    pub fn top_genres(
        &self,
        range: &TimeRange,
        genres: &GenreMap,
        limit: usize,
    ) -> Result<Vec<GenreRow>> {
        let per_artist = self.top_artists_excluding(range, None, None)?;

        let mut per_genre: HashMap<String, f64> = HashMap::new();
        for row in per_artist {
            let listed = genres.genres_for(&row.artist);
            let split = row.hours / listed.len() as f64;
            for genre in listed {
                *per_genre.entry(genre).or_insert(0.0) += split;
            }
        }

        let mut rows: Vec<GenreRow> = per_genre
            .into_iter()
            .map(|(genre, hours)| GenreRow { genre, hours })
            .collect();
        rows.sort_by(|a, b| {
            b.hours
                .partial_cmp(&a.hours)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.genre.cmp(&b.genre))
        });
        rows.truncate(limit);
        Ok(rows)
    }

    /// Hours listened per calendar date for one artist, ascending.
    pub fn artist_daily_hours(&self, artist: &str, range: &TimeRange) -> Result<Vec<DailyHours>> {
        let mut conds = vec!["artistName = ?1".to_string()];
        let mut params = vec![artist.to_string()];
        append_range(range, &mut conds, &mut params);

        let sql = format!(
            "SELECT date(endTime), SUM(msPlayed) / 3600000.0
             FROM listens{}
             GROUP BY 1
             ORDER BY 1",
            where_clause(&conds)
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(params.iter()), |row| {
            Ok(DailyHours {
                date: row.get(0)?,
                hours: row.get(1)?,
            })
        })?;
        collect(rows)
    }

    /// Artist ranking with an optional exclusion; backs the public
    /// top-artists query, the what-if recomputation and the genre rollup
    /// (which needs the unlimited ranking).
    fn top_artists_excluding(
        &self,
        range: &TimeRange,
        exclude: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<ArtistRow>> {
        let (mut conds, mut params) = range_parts(range);
        if let Some(artist) = exclude {
            params.push(artist.to_string());
            conds.push(format!("artistName != ?{}", params.len()));
        }
        let limit_sql = limit.map_or(String::new(), |n| format!("\n             LIMIT {n}"));

        let sql = format!(
            "SELECT artistName, SUM(msPlayed) / 3600000.0 AS hours, COUNT(*) AS plays
             FROM listens{}
             GROUP BY artistName
             ORDER BY hours DESC, plays DESC{limit_sql}",
            where_clause(&conds)
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(params.iter()), |row| {
            Ok(ArtistRow {
                artist: row.get(0)?,
                hours: row.get(1)?,
                plays: row.get::<_, i64>(2)? as u64,
            })
        })?;
        collect(rows)
    }

    fn top_artist_excluding_one(
        &self,
        range: &TimeRange,
        exclude: Option<&str>,
    ) -> Result<Option<ArtistRow>> {
        Ok(self
            .top_artists_excluding(range, exclude, Some(1))?
            .into_iter()
            .next())
    }
}

/// Range filter as SQL conditions plus bound parameters, numbered after
/// whatever `params` already holds.
fn append_range(range: &TimeRange, conds: &mut Vec<String>, params: &mut Vec<String>) {
    if let Some(start) = range.start {
        params.push(start.to_string());
        conds.push(format!("date(endTime) >= ?{}", params.len()));
    }
    if let Some(end) = range.end {
        params.push(end.to_string());
        conds.push(format!("date(endTime) <= ?{}", params.len()));
    }
}

fn range_parts(range: &TimeRange) -> (Vec<String>, Vec<String>) {
    let mut conds = Vec::new();
    let mut params = Vec::new();
    append_range(range, &mut conds, &mut params);
    (conds, params)
}

fn where_clause(conds: &[String]) -> String {
    if conds.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conds.join(" AND "))
    }
}

fn collect<T>(
    rows: rusqlite::MappedRows<'_, impl FnMut(&rusqlite::Row<'_>) -> rusqlite::Result<T>>,
) -> Result<Vec<T>> {
    Ok(rows.collect::<rusqlite::Result<Vec<T>>>()?)
}
