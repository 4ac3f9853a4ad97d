//! Cache store for persisting the sonnet corpus to disk
//!
//! Provides a `CacheStore` that saves the corpus as pretty-printed JSON with a
//! timestamp, replacing the file atomically on every save.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, warn};

use crate::data::Sonnet;

/// Errors that can occur when reading or writing the cache file
#[derive(Debug, Error)]
pub enum CacheError {
    /// The cache file exists but could not be read
    #[error("Failed to read cache file {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    /// The cache file content is not a valid corpus
    #[error("Failed to parse cache file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The corpus could not be encoded
    #[error("Failed to serialize corpus: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The cache file could not be written
    #[error("Failed to write cache file {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

/// Layout of the cache file on disk
#[derive(Debug, Serialize)]
struct CacheEntry<'a> {
    /// When the corpus was cached
    cached_at: DateTime<Utc>,
    /// The cached corpus
    sonnets: &'a [Sonnet],
}

#[derive(Debug, Deserialize)]
struct OwnedCacheEntry {
    cached_at: DateTime<Utc>,
    sonnets: Vec<Sonnet>,
}

/// Result of reading the cache file
#[derive(Debug)]
pub struct CachedCorpus {
    /// The cached corpus, in the order it was saved
    pub sonnets: Vec<Sonnet>,
    /// When the corpus was written
    pub cached_at: DateTime<Utc>,
}

/// Reads and writes the single corpus cache file
#[derive(Debug, Clone)]
pub struct CacheStore {
    /// Location of the cache file
    path: PathBuf,
}

impl CacheStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the corpus from the cache file
    ///
    /// # Returns
    /// * `Some(CachedCorpus)` if the file exists and holds a valid corpus
    /// * `None` if the file is missing, unreadable or malformed
    ///
    /// Unreadable and malformed files are logged as warnings before being
    /// treated as a miss.
    pub fn load(&self) -> Option<CachedCorpus> {
        match self.try_load() {
            Ok(Some(cached)) => {
                debug!(
                    path = %self.path.display(),
                    sonnets = cached.sonnets.len(),
                    "Cache hit"
                );
                Some(cached)
            }
            Ok(None) => {
                debug!(path = %self.path.display(), "Cache miss");
                None
            }
            Err(e) => {
                warn!("Ignoring unusable cache: {}", e);
                None
            }
        }
    }

    /// Reads the corpus, reporting why an existing file could not be used
    ///
    /// A missing file is `Ok(None)`.
    pub fn try_load(&self) -> Result<Option<CachedCorpus>, CacheError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(CacheError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let entry: OwnedCacheEntry =
            serde_json::from_str(&content).map_err(|source| CacheError::Parse {
                path: self.path.clone(),
                source,
            })?;

        Ok(Some(CachedCorpus {
            sonnets: entry.sonnets,
            cached_at: entry.cached_at,
        }))
    }

    /// Writes the corpus to the cache file, replacing any prior content
    ///
    /// The data is written to a temporary file in the same directory and then
    /// renamed over the target, so an interrupted save never leaves a
    /// half-written cache behind. Missing parent directories are created.
    pub fn save(&self, sonnets: &[Sonnet]) -> Result<(), CacheError> {
        let entry = CacheEntry {
            cached_at: Utc::now(),
            sonnets,
        };
        let json = serde_json::to_string_pretty(&entry).map_err(CacheError::Serialize)?;

        let write_err = |source: io::Error| CacheError::Write {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(write_err)?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(json.as_bytes()).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;

        debug!(
            path = %self.path.display(),
            sonnets = sonnets.len(),
            "Wrote cache"
        );
        Ok(())
    }
}
