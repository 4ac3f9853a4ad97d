//! Run configuration
//!
//! A `Config` is assembled once at startup from built-in defaults, an
//! optional JSON config file and command-line overrides, in that order.
//! It is validated before any loading or searching takes place and is
//! read-only afterwards.

use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use directories::ProjectDirs;
use reqwest::Url;
use serde::Deserialize;
use thiserror::Error;

/// Application name used for the cache directory
const APP_NAME: &str = "sonnet-search";

/// Cache file name inside the cache directory
const CACHE_FILE: &str = "sonnets.json";

pub const DEFAULT_BASE_URL: &str = "https://poetrydb.org";
pub const DEFAULT_AUTHOR: &str = "Shakespeare";
pub const DEFAULT_LINE_COUNT: u32 = 14;

/// Errors for missing or invalid configuration values
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The config file is not valid JSON or has unknown keys
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Cache file path must not be empty")]
    EmptyCachePath,

    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Author must not be empty")]
    EmptyAuthor,

    #[error("Line count must be greater than zero")]
    ZeroLineCount,
}

/// How whitespace-separated query terms are combined
///
/// With a mode set, each term is matched on its own and a sonnet qualifies
/// when all terms (`And`) or any term (`Or`) occur in its lines. Without one,
/// the whole query is matched as a single literal string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
pub enum SearchMode {
    #[serde(rename = "AND", alias = "and")]
    And,
    #[serde(rename = "OR", alias = "or")]
    Or,
}

/// Parameters sent to the remote source to fetch the corpus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRequest {
    base_url: String,
    author: String,
    line_count: u32,
}

impl SourceRequest {
    pub fn new(base_url: impl Into<String>, author: impl Into<String>, line_count: u32) -> Self {
        Self {
            base_url: base_url.into(),
            author: author.into(),
            line_count,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn line_count(&self) -> u32 {
        self.line_count
    }
}

impl Default for SourceRequest {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, DEFAULT_AUTHOR, DEFAULT_LINE_COUNT)
    }
}

/// Validated configuration for a single run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    cache_path: PathBuf,
    source: SourceRequest,
    query: String,
    search_mode: Option<SearchMode>,
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    pub fn source(&self) -> &SourceRequest {
        &self.source
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// `None` means the query is one literal string
    pub fn search_mode(&self) -> Option<SearchMode> {
        self.search_mode
    }

    /// Default cache file location
    ///
    /// Uses `~/.cache/sonnet-search/sonnets.json` on Linux, or the platform
    /// equivalent. Falls back to `sonnets.json` in the working directory when
    /// no home directory can be determined.
    pub fn default_cache_path() -> PathBuf {
        ProjectDirs::from("", "", APP_NAME)
            .map(|dirs| dirs.cache_dir().join(CACHE_FILE))
            .unwrap_or_else(|| PathBuf::from(CACHE_FILE))
    }
}

/// Settings that may be stored in a JSON config file
///
/// Every field is optional; absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub cache_file: Option<PathBuf>,
    pub base_url: Option<String>,
    pub author: Option<String>,
    pub line_count: Option<u32>,
    pub search_mode: Option<SearchMode>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Layered construction of a `Config`
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    cache_path: Option<PathBuf>,
    base_url: Option<String>,
    author: Option<String>,
    line_count: Option<u32>,
    search_mode: Option<SearchMode>,
    query: String,
}

impl ConfigBuilder {
    /// Applies values from a config file over what is already set
    pub fn file(mut self, file: ConfigFile) -> Self {
        if file.cache_file.is_some() {
            self.cache_path = file.cache_file;
        }
        if file.base_url.is_some() {
            self.base_url = file.base_url;
        }
        if file.author.is_some() {
            self.author = file.author;
        }
        if file.line_count.is_some() {
            self.line_count = file.line_count;
        }
        if file.search_mode.is_some() {
            self.search_mode = file.search_mode;
        }
        self
    }

    pub fn cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = Some(path.into());
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn line_count(mut self, line_count: u32) -> Self {
        self.line_count = Some(line_count);
        self
    }

    pub fn search_mode(mut self, mode: SearchMode) -> Self {
        self.search_mode = Some(mode);
        self
    }

    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    /// Fills in defaults and validates the result
    pub fn build(self) -> Result<Config, ConfigError> {
        let cache_path = self.cache_path.unwrap_or_else(Config::default_cache_path);
        if cache_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyCachePath);
        }

        let base_url = self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        validate_base_url(&base_url)?;

        let author = self.author.unwrap_or_else(|| DEFAULT_AUTHOR.to_string());
        if author.trim().is_empty() {
            return Err(ConfigError::EmptyAuthor);
        }

        let line_count = self.line_count.unwrap_or(DEFAULT_LINE_COUNT);
        if line_count == 0 {
            return Err(ConfigError::ZeroLineCount);
        }

        Ok(Config {
            cache_path,
            source: SourceRequest::new(base_url, author, line_count),
            query: self.query,
            search_mode: self.search_mode,
        })
    }
}

fn validate_base_url(base_url: &str) -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason,
    };

    let url = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(invalid(format!("unsupported scheme '{}'", other))),
    }
}
