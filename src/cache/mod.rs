//! Cache module for storing the sonnet corpus on disk
//!
//! The corpus is kept in a single JSON file so that PoetryDB is only
//! contacted when the file is missing or unusable. A malformed file is
//! reported as a cache miss rather than an error.

mod store;

pub use store::{CacheError, CacheStore, CachedCorpus};
