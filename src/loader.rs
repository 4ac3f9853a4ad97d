//! Cache-or-fetch loading of the corpus
//!
//! The cache file is tried first. On a miss the corpus is fetched from the
//! remote source, validated in full and written to the cache before it is
//! returned.

use std::fmt;
use std::time::Instant;

use thiserror::Error;
use tracing::info;

use crate::cache::{CacheError, CacheStore};
use crate::config::Config;
use crate::data::{RemoteFetchError, Sonnet, SonnetSource};

/// Errors that abort a corpus load
#[derive(Debug, Error)]
pub enum LoadError {
    /// Fetching from the remote source failed
    #[error("Failed to fetch sonnets: {0}")]
    Remote(#[from] RemoteFetchError),

    /// The fetched corpus could not be written to the cache
    #[error("Failed to cache sonnets: {0}")]
    CacheWrite(#[from] CacheError),
}

/// Where a loaded corpus came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorpusOrigin {
    Cache,
    Remote,
}

impl fmt::Display for CorpusOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorpusOrigin::Cache => write!(f, "cache"),
            CorpusOrigin::Remote => write!(f, "remote source"),
        }
    }
}

/// A corpus ready for searching
#[derive(Debug)]
pub struct LoadedCorpus {
    pub sonnets: Vec<Sonnet>,
    /// Duration of the whole load, including any fetch and cache write
    pub elapsed_seconds: f64,
    pub origin: CorpusOrigin,
}

/// Loads the corpus from the cache, falling back to `source` on a miss
///
/// A remote failure or a failed cache write aborts the load. No partial
/// corpus is ever returned.
pub fn load_corpus<S>(config: &Config, source: &S) -> Result<LoadedCorpus, LoadError>
where
    S: SonnetSource + ?Sized,
{
    let start = Instant::now();
    let cache = CacheStore::new(config.cache_path());

    if let Some(cached) = cache.load() {
        let elapsed_seconds = start.elapsed().as_secs_f64();
        info!(
            sonnets = cached.sonnets.len(),
            cached_at = %cached.cached_at,
            "Loaded sonnets from cache"
        );
        return Ok(LoadedCorpus {
            sonnets: cached.sonnets,
            elapsed_seconds,
            origin: CorpusOrigin::Cache,
        });
    }

    let raw = source.fetch(config.source())?;
    let sonnets = raw
        .into_iter()
        .map(Sonnet::try_from)
        .collect::<Result<Vec<_>, _>>()
        .map_err(RemoteFetchError::from)?;
    info!(
        sonnets = sonnets.len(),
        source = source.name(),
        "Downloaded sonnets"
    );

    cache.save(&sonnets)?;

    Ok(LoadedCorpus {
        sonnets,
        elapsed_seconds: start.elapsed().as_secs_f64(),
        origin: CorpusOrigin::Remote,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceRequest;
    use crate::data::RawSonnet;
    use std::cell::{Cell, RefCell};
    use std::fs;
    use tempfile::TempDir;

    /// Source that hands out a fixed corpus and counts calls
    struct FakeSource {
        poems: Vec<RawSonnet>,
        calls: Cell<usize>,
        last_request: RefCell<Option<SourceRequest>>,
    }

    impl FakeSource {
        fn new(poems: Vec<RawSonnet>) -> Self {
            Self {
                poems,
                calls: Cell::new(0),
                last_request: RefCell::new(None),
            }
        }
    }

    impl SonnetSource for FakeSource {
        fn fetch(&self, request: &SourceRequest) -> Result<Vec<RawSonnet>, RemoteFetchError> {
            self.calls.set(self.calls.get() + 1);
            *self.last_request.borrow_mut() = Some(request.clone());
            Ok(self.poems.clone())
        }
    }

    /// Source that always fails
    struct FailingSource {
        calls: Cell<usize>,
    }

    impl SonnetSource for FailingSource {
        fn fetch(&self, _request: &SourceRequest) -> Result<Vec<RawSonnet>, RemoteFetchError> {
            self.calls.set(self.calls.get() + 1);
            Err(RemoteFetchError::Api {
                status: 404,
                reason: "Not found".to_string(),
            })
        }
    }

    fn raw(title: &str, lines: &[&str]) -> RawSonnet {
        RawSonnet {
            title: title.to_string(),
            author: "William Shakespeare".to_string(),
            lines: lines.iter().map(|l| l.to_string()).collect(),
        }
    }

    fn two_poems() -> Vec<RawSonnet> {
        vec![
            raw("Sonnet 18", &["Shall I compare thee", "to a summer's day?"]),
            raw("Sonnet 1", &["From fairest creatures we desire increase,"]),
        ]
    }

    fn create_test_config() -> (Config, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config = Config::builder()
            .cache_path(temp_dir.path().join("sonnets.json"))
            .build()
            .expect("Config should be valid");
        (config, temp_dir)
    }

    #[test]
    fn test_miss_fetches_once_and_writes_cache() {
        let (config, _temp_dir) = create_test_config();
        let source = FakeSource::new(two_poems());

        let loaded = load_corpus(&config, &source).unwrap();

        assert_eq!(source.calls.get(), 1);
        assert_eq!(loaded.origin, CorpusOrigin::Remote);
        assert_eq!(loaded.sonnets.len(), 2);
        assert_eq!(loaded.sonnets[0].title(), "Sonnet 18");
        assert_eq!(loaded.sonnets[1].title(), "Sonnet 1");
        assert!(config.cache_path().exists(), "Cache should be written");
        assert!(loaded.elapsed_seconds >= 0.0);
    }

    #[test]
    fn test_miss_passes_configured_request() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config = Config::builder()
            .cache_path(temp_dir.path().join("sonnets.json"))
            .author("Spenser")
            .line_count(9)
            .build()
            .unwrap();
        let source = FakeSource::new(two_poems());

        load_corpus(&config, &source).unwrap();

        let request = source.last_request.borrow().clone().unwrap();
        assert_eq!(request.author(), "Spenser");
        assert_eq!(request.line_count(), 9);
    }

    #[test]
    fn test_second_load_uses_cache() {
        let (config, _temp_dir) = create_test_config();
        let source = FakeSource::new(two_poems());

        let first = load_corpus(&config, &source).unwrap();
        let second = load_corpus(&config, &source).unwrap();

        assert_eq!(source.calls.get(), 1, "Second load should not fetch");
        assert_eq!(second.origin, CorpusOrigin::Cache);
        assert_eq!(first.sonnets, second.sonnets);
    }

    #[test]
    fn test_cache_hit_leaves_cache_file_untouched() {
        let (config, _temp_dir) = create_test_config();
        let source = FakeSource::new(two_poems());
        let store = CacheStore::new(config.cache_path());

        load_corpus(&config, &source).unwrap();
        let written_at = store.load().expect("Miss should write the cache").cached_at;
        let contents = fs::read_to_string(config.cache_path()).unwrap();
        let modified = fs::metadata(config.cache_path()).unwrap().modified().unwrap();

        load_corpus(&config, &source).unwrap();

        assert_eq!(store.load().unwrap().cached_at, written_at);
        assert_eq!(fs::read_to_string(config.cache_path()).unwrap(), contents);
        assert_eq!(
            fs::metadata(config.cache_path()).unwrap().modified().unwrap(),
            modified
        );
        assert_eq!(source.calls.get(), 1);
    }

    #[test]
    fn test_source_name_defaults_to_neutral_label() {
        let source = FakeSource::new(Vec::new());
        assert_eq!(source.name(), "remote source");
    }

    #[test]
    fn test_corrupt_cache_falls_back_to_remote() {
        let (config, _temp_dir) = create_test_config();
        fs::write(config.cache_path(), "garbage").unwrap();
        let source = FakeSource::new(two_poems());

        let loaded = load_corpus(&config, &source).unwrap();

        assert_eq!(source.calls.get(), 1);
        assert_eq!(loaded.origin, CorpusOrigin::Remote);

        // The corrupt file has been replaced with a usable cache
        let cached = CacheStore::new(config.cache_path()).load().unwrap();
        assert_eq!(cached.sonnets, loaded.sonnets);
    }

    #[test]
    fn test_remote_failure_is_fatal_and_writes_nothing() {
        let (config, _temp_dir) = create_test_config();
        let source = FailingSource {
            calls: Cell::new(0),
        };

        let result = load_corpus(&config, &source);

        assert!(matches!(result, Err(LoadError::Remote(_))));
        assert_eq!(source.calls.get(), 1, "No internal retry");
        assert!(!config.cache_path().exists());
    }

    #[test]
    fn test_invalid_remote_record_fails_whole_load() {
        let (config, _temp_dir) = create_test_config();
        let source = FakeSource::new(vec![
            raw("Sonnet 18", &["Shall I compare thee"]),
            raw("Blank", &[]),
        ]);

        let result = load_corpus(&config, &source);

        assert!(matches!(
            result,
            Err(LoadError::Remote(RemoteFetchError::InvalidRecord(_)))
        ));
        assert!(!config.cache_path().exists());
    }

    #[test]
    fn test_cache_write_failure_is_surfaced() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();
        let config = Config::builder()
            .cache_path(blocker.join("sonnets.json"))
            .build()
            .unwrap();
        let source = FakeSource::new(two_poems());

        let result = load_corpus(&config, &source);

        assert!(matches!(result, Err(LoadError::CacheWrite(_))));
        assert_eq!(source.calls.get(), 1);
    }

    #[test]
    fn test_empty_remote_corpus_is_cached() {
        let (config, _temp_dir) = create_test_config();
        let source = FakeSource::new(Vec::new());

        let first = load_corpus(&config, &source).unwrap();
        let second = load_corpus(&config, &source).unwrap();

        assert!(first.sonnets.is_empty());
        assert!(second.sonnets.is_empty());
        assert_eq!(second.origin, CorpusOrigin::Cache);
        assert_eq!(source.calls.get(), 1);
    }

    #[test]
    fn test_origin_display() {
        assert_eq!(CorpusOrigin::Cache.to_string(), "cache");
        assert_eq!(CorpusOrigin::Remote.to_string(), "remote source");
    }
}
