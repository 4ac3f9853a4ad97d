//! Sonnet Search Library
//!
//! Loads a corpus of sonnets from a local cache or PoetryDB and answers
//! literal substring queries against it.

pub mod cache;
pub mod cli;
pub mod config;
pub mod data;
pub mod loader;
pub mod search;

pub use config::{Config, SearchMode};
pub use data::{LineMatch, SearchResult, Sonnet, SonnetSource};
pub use loader::{load_corpus, CorpusOrigin, LoadError, LoadedCorpus};
pub use search::{search, search_terms};
