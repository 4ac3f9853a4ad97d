//! Core data models for Sonnet Search
//!
//! This module contains the records that flow through the application:
//! sonnets as they come from PoetryDB or the cache, and the matches produced
//! by a search.

pub mod poetrydb;

pub use poetrydb::{PoetryDbClient, RemoteFetchError};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SourceRequest;

/// Errors raised when a raw record cannot become a `Sonnet`
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SonnetError {
    /// The record has no lines
    #[error("Sonnet '{title}' has no lines")]
    EmptyLines { title: String },
}

/// A poem record exactly as PoetryDB or the cache file provides it
///
/// Extra fields in the source (PoetryDB also sends `linecount`) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSonnet {
    pub title: String,
    pub author: String,
    pub lines: Vec<String>,
}

/// One poem of the corpus
///
/// A `Sonnet` always has at least one line and keeps its lines in the
/// original order. Deserializing goes through `RawSonnet`, so a cache file
/// holding an empty poem fails to parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSonnet")]
pub struct Sonnet {
    title: String,
    author: String,
    lines: Vec<String>,
}

impl Sonnet {
    /// Creates a sonnet, rejecting an empty line sequence
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        lines: Vec<String>,
    ) -> Result<Self, SonnetError> {
        let title = title.into();
        if lines.is_empty() {
            return Err(SonnetError::EmptyLines { title });
        }
        Ok(Self {
            title,
            author: author.into(),
            lines,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl TryFrom<RawSonnet> for Sonnet {
    type Error = SonnetError;

    fn try_from(raw: RawSonnet) -> Result<Self, Self::Error> {
        Sonnet::new(raw.title, raw.author, raw.lines)
    }
}

/// One line of one sonnet containing the query
///
/// `spans` holds the `(start, end)` byte range of every occurrence of the
/// query in `line_text`, overlapping occurrences included, in ascending order.
/// It is empty when the query is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineMatch {
    sonnet_title: String,
    line_number: usize,
    line_text: String,
    spans: Vec<(usize, usize)>,
}

impl LineMatch {
    /// `line_number` is 1-based
    pub fn new(
        sonnet_title: impl Into<String>,
        line_number: usize,
        line_text: impl Into<String>,
        spans: Vec<(usize, usize)>,
    ) -> Self {
        Self {
            sonnet_title: sonnet_title.into(),
            line_number,
            line_text: line_text.into(),
            spans,
        }
    }

    pub fn sonnet_title(&self) -> &str {
        &self.sonnet_title
    }

    pub fn line_number(&self) -> usize {
        self.line_number
    }

    pub fn line_text(&self) -> &str {
        &self.line_text
    }

    pub fn spans(&self) -> &[(usize, usize)] {
        &self.spans
    }

    /// The text covered by each span
    pub fn matched_text(&self) -> impl Iterator<Item = &str> + '_ {
        self.spans
            .iter()
            .map(move |&(start, end)| &self.line_text[start..end])
    }
}

/// Outcome of one query over the corpus
///
/// Matches are kept in scan order: corpus order first, then line order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    query: String,
    matches: Vec<LineMatch>,
    matched_sonnet_count: usize,
    elapsed_seconds: f64,
}

impl SearchResult {
    pub(crate) fn new(
        query: impl Into<String>,
        matches: Vec<LineMatch>,
        matched_sonnet_count: usize,
        elapsed_seconds: f64,
    ) -> Self {
        Self {
            query: query.into(),
            matches,
            matched_sonnet_count,
            elapsed_seconds,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn matches(&self) -> &[LineMatch] {
        &self.matches
    }

    /// Wall-clock duration of the scan
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed_seconds
    }

    /// Number of sonnets with at least one matching line
    pub fn matched_sonnet_count(&self) -> usize {
        self.matched_sonnet_count
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// A remote provider of raw sonnet records
///
/// Implemented by `PoetryDbClient` for the real service and by fakes in tests.
pub trait SonnetSource {
    fn fetch(&self, request: &SourceRequest) -> Result<Vec<RawSonnet>, RemoteFetchError>;

    /// Human-readable name used in logs and load reports
    fn name(&self) -> &str {
        "remote source"
    }
}
