//! Command-line interface parsing for Sonnet Search
//!
//! This module parses arguments with clap and turns them into a validated
//! `Config`, applying an optional config file underneath the flags.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{Config, ConfigError, ConfigFile, SearchMode};

/// Sonnet Search - find lines in Shakespeare's sonnets
#[derive(Parser, Debug)]
#[command(name = "sonnet-search")]
#[command(about = "Search cached sonnets from PoetryDB for a literal substring")]
#[command(version)]
pub struct Cli {
    /// Text to look for (case-sensitive, matched literally)
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// JSON config file with cache_file, base_url, author, line_count and search_mode
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Location of the sonnet cache file
    #[arg(long, value_name = "PATH")]
    pub cache_file: Option<PathBuf>,

    /// PoetryDB base URL
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Author to request from PoetryDB
    #[arg(long, value_name = "NAME")]
    pub author: Option<String>,

    /// Line count of the poems to request
    #[arg(long, value_name = "N")]
    pub line_count: Option<u32>,

    /// Split the query into words and combine them with AND or OR
    #[arg(long, value_enum, ignore_case = true, value_name = "MODE")]
    pub search_mode: Option<SearchMode>,
}

impl Cli {
    /// Builds the run configuration
    ///
    /// Defaults are overridden by the config file, which is overridden by
    /// flags given on the command line.
    pub fn to_config(&self) -> Result<Config, ConfigError> {
        let mut builder = Config::builder().query(self.query.clone());

        if let Some(path) = &self.config {
            builder = builder.file(ConfigFile::load(path)?);
        }
        if let Some(path) = &self.cache_file {
            builder = builder.cache_path(path.clone());
        }
        if let Some(url) = &self.base_url {
            builder = builder.base_url(url.clone());
        }
        if let Some(author) = &self.author {
            builder = builder.author(author.clone());
        }
        if let Some(line_count) = self.line_count {
            builder = builder.line_count(line_count);
        }
        if let Some(mode) = self.search_mode {
            builder = builder.search_mode(mode);
        }

        builder.build()
    }
}
