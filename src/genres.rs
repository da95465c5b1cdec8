//! Optional artist-to-genre side-table.
//!
//! A two-column `artistName,genres` file where `genres` is a `|`-separated
//! list. The file is external and entirely optional: when it is absent the
//! genre rollup is skipped and nothing else is affected.

use crate::error::Result;
use log::debug;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Genre bucket for artists the side-table does not list.
pub const UNKNOWN_GENRE: &str = "Unknown";

/// Mapping from artist name to its listed genres.
#[derive(Debug, Clone, Default)]
pub struct GenreMap {
    by_artist: HashMap<String, Vec<String>>,
}

impl GenreMap {
    /// Load the side-table if it exists; `Ok(None)` when it doesn't.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            debug!("No genre side-table at {}", path.display());
            return Ok(None);
        }
        let text = fs::read_to_string(path)?;
        let map = Self::parse(&text);
        debug!("Loaded genres for {} artist(s)", map.len());
        Ok(Some(map))
    }

    /// Parse side-table text. Lines that don't carry both columns are
    /// ignored, as is the `artistName,genres` header.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut by_artist = HashMap::new();

        for (line_no, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let fields = split_csv_line(line);
            if fields.len() < 2 {
                continue;
            }
            if line_no == 0 && fields[0] == "artistName" {
                continue;
            }

            let genres: Vec<String> = fields[1]
                .split('|')
                .map(str::trim)
                .filter(|genre| !genre.is_empty())
                .map(title_case)
                .collect();
            if !genres.is_empty() {
                by_artist.insert(fields[0].clone(), genres);
            }
        }

        Self { by_artist }
    }

    /// Genres for an artist; unlisted artists fall back to [`UNKNOWN_GENRE`].
    #[must_use]
    pub fn genres_for(&self, artist: &str) -> Vec<String> {
        self.by_artist
            .get(artist)
            .cloned()
            .unwrap_or_else(|| vec![UNKNOWN_GENRE.to_string()])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_artist.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_artist.is_empty()
    }
}

/// Minimal CSV field split with double-quote handling, enough for a
/// two-column side-table whose artist names may contain commas.
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current = String::new();
            }
            _ => current.push(c),
        }
    }
    fields.push(current.trim().to_string());
    fields
}

/// "indie rock" -> "Indie Rock", so differently-cased labels merge.
fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
