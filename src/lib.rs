//! Streaming-history analytics over a single SQLite store.
//!
//! Replay ingests a personal streaming-history export (one or more
//! `StreamingHistory*.json` files), loads it into a `listens` table with an
//! atomic dataset-replace import, and answers a fixed catalogue of
//! descriptive queries: top artists and tracks, temporal habits, discovery
//! trends, loyalty concentration, skip and replay proxies.
//!
//! Core modules:
//! - [`import`] - Atomic dataset-replace import
//! - [`store`] - The `listens` dataset store
//! - [`analytics`] - The aggregation query catalogue
//!
//! ### Supporting Modules
//!
//! - [`config`] - Explicit path configuration passed at construction
//! - [`listen`] - The play-event record and its validation
//! - [`genres`] - Optional artist-to-genre side-table
//! - [`report`] - CSV and markdown report artifacts
//! - [`cli`] - Command-line interface definitions with clap integration
//! - [`error`] - Crate-wide error taxonomy
//!
//! ## Quick Start Example
//!
//! ```no_run
//! use replay::analytics::{Analytics, TimeRange};
//! use replay::config::Config;
//! use replay::import::Importer;
//!
//! // Rebuild the store from the configured input directory
//! let config = Config::new()?;
//! let count = Importer::new(&config).run()?;
//! println!("imported {count} listens");
//!
//! // Query it
//! let analytics = Analytics::open(&config)?;
//! for row in analytics.top_artists(&TimeRange::all(), 10)? {
//!     println!("{:>7.2}h  {} ({} plays)", row.hours, row.artist, row.plays);
//! }
//! # Ok::<(), replay::error::Error>(())
//! ```
//!
//! ## Import Semantics
//!
//! The importer parses every export file up front, stages a brand-new
//! database beside the published one, fills it in a single transaction and
//! swaps it in with one atomic rename. Readers never observe a partial
//! store: a connection opened before the swap keeps reading the old bytes
//! until it reopens. Any failure leaves the previous store untouched.
//!
//! ## Error Handling
//!
//! Library functions return [`error::Result`]. Import problems surface as
//! typed variants ([`error::Error::EmptyInput`],
//! [`error::Error::MalformedRecord`], [`error::Error::StoreUnavailable`]);
//! queries against an empty store return empty or zero-default results
//! rather than erroring.

pub mod analytics;
pub mod cli;
pub mod config;
pub mod error;
pub mod genres;
pub mod import;
pub mod listen;
pub mod report;
pub mod store;
