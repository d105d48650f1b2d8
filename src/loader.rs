use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::batch;
use crate::cache::RecordCache;
use crate::config::Config;
use crate::domain::Identifier;
use crate::error::CatalogError;
use crate::evolution::EvolutionResolver;
use crate::fetcher::JsonFetcher;
use crate::normalize::normalize;
use crate::record::{CanonicalRecord, EvolutionGraph};

/// Anything that can hand out records by identifier without surfacing errors.
///
/// The batch loader and the evolution resolver are written against this seam
/// so they can be driven by a stub in tests.
pub trait RecordSource: Send + Sync {
    fn load_identifier(&self, id: &Identifier) -> Option<Arc<CanonicalRecord>>;

    fn load(&self, identifier: &str) -> Option<Arc<CanonicalRecord>> {
        match identifier.parse::<Identifier>() {
            Ok(id) => self.load_identifier(&id),
            Err(err) => {
                warn!(identifier, error = %err, "rejecting identifier");
                None
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: config.retry_base_delay(),
        }
    }

    /// Linear backoff: the wait after failed attempt `n` is `n * base_delay`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// Fetch, normalize and cache one record at a time.
pub struct Loader<F: JsonFetcher> {
    fetcher: F,
    cache: Arc<RecordCache>,
    config: Config,
    retry: RetryPolicy,
}

impl<F: JsonFetcher> Loader<F> {
    pub fn new(fetcher: F, cache: Arc<RecordCache>, config: Config) -> Self {
        let retry = RetryPolicy::from_config(&config);
        Self {
            fetcher,
            cache,
            config,
            retry,
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn cache(&self) -> &Arc<RecordCache> {
        &self.cache
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// One pass through the pipeline, no retry.
    ///
    /// Only the entity document is required. A missing species or evolution
    /// document is logged and replaced with defaults.
    pub fn try_load(&self, id: &Identifier) -> Result<Arc<CanonicalRecord>, CatalogError> {
        if let Some(hit) = self.cache.get(id) {
            debug!(identifier = %id, "cache hit");
            return Ok(hit);
        }

        let url = self.config.entity_url(id.as_str());
        let entity = self.fetcher.fetch_json(&url).map_err(|err| match err {
            CatalogError::RequestFailed { status: 404, .. } => {
                CatalogError::NotFound(id.to_string())
            }
            other => other,
        })?;

        let species = linked_url(&entity, "species")
            .and_then(|url| self.fetch_optional(id, "species", url));
        let evolution = species
            .as_ref()
            .and_then(|doc| linked_url(doc, "evolution_chain"))
            .and_then(|url| self.fetch_optional(id, "evolution chain", url));

        let record = Arc::new(normalize(
            &entity,
            species.as_ref(),
            evolution.as_ref(),
            &self.config.fallback_image_url,
        ));
        self.cache.put(id.clone(), Arc::clone(&record));
        Ok(record)
    }

    /// Runs [`Loader::try_load`] up to `max_retries + 1` times with linear
    /// backoff. `NotFound` is retried like any other failure but is returned
    /// as-is once attempts run out; everything else becomes
    /// `RetriesExhausted`.
    pub fn load_with_retry(&self, id: &Identifier) -> Result<Arc<CanonicalRecord>, CatalogError> {
        let mut attempt = 1u32;
        loop {
            match self.try_load(id) {
                Ok(record) => return Ok(record),
                Err(err) if attempt >= self.retry.max_attempts() => {
                    return Err(match err {
                        CatalogError::NotFound(_) => err,
                        last => CatalogError::RetriesExhausted {
                            identifier: id.to_string(),
                            attempts: attempt,
                            last: Box::new(last),
                        },
                    });
                }
                Err(err) => {
                    let delay = self.retry.delay_after(attempt);
                    debug!(
                        identifier = %id,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "load failed, retrying"
                    );
                    thread::sleep(delay);
                    attempt += 1;
                }
            }
        }
    }

    /// Loads every identifier concurrently and keeps the successes.
    pub fn load_batch(&self, identifiers: &[Identifier]) -> Vec<Arc<CanonicalRecord>> {
        batch::load_batch(self, identifiers)
    }

    /// Walks the first-listed branch of `graph`, bounded by
    /// `max_evolution_depth`.
    pub fn resolve(&self, graph: &EvolutionGraph) -> Vec<Arc<CanonicalRecord>> {
        EvolutionResolver::new(self, self.config.max_evolution_depth).resolve(graph)
    }

    fn fetch_optional(&self, id: &Identifier, what: &str, url: &str) -> Option<Value> {
        match self.fetcher.fetch_json(url) {
            Ok(doc) => Some(doc),
            Err(err) => {
                warn!(identifier = %id, document = what, error = %err, "using defaults");
                None
            }
        }
    }
}

impl<F: JsonFetcher> RecordSource for Loader<F> {
    fn load_identifier(&self, id: &Identifier) -> Option<Arc<CanonicalRecord>> {
        match self.load_with_retry(id) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!(identifier = %id, error = %err.root_cause(), "load failed");
                None
            }
        }
    }
}

/// `doc[key].url`, as used by the upstream documents to link to each other.
fn linked_url<'a>(doc: &'a Value, key: &str) -> Option<&'a str> {
    doc.get(key)
        .and_then(|v| v.get("url"))
        .and_then(|v| v.as_str())
        .filter(|v| !v.is_empty())
}
