use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::app::{ProgressEvent, ProgressSink};
use crate::batch;
use crate::config::Config;
use crate::domain::Identifier;
use crate::error::CatalogError;
use crate::fetcher::JsonFetcher;
use crate::loader::RecordSource;
use crate::record::CanonicalRecord;

#[derive(Debug, Clone, Deserialize)]
struct ListingPage {
    #[serde(default)]
    count: Option<u64>,
    #[serde(default)]
    results: Vec<ListingEntry>,
}

#[derive(Debug, Clone, Deserialize)]
struct ListingEntry {
    name: String,
}

/// One page of the catalog listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    /// Total entries upstream, when reported.
    pub available: Option<u64>,
    /// Page entries in listing order.
    pub identifiers: Vec<Identifier>,
}

/// Fetches the first `limit` entries of the catalog listing. Names that are
/// not valid identifiers are skipped.
pub fn list_identifiers<F: JsonFetcher + ?Sized>(
    fetcher: &F,
    config: &Config,
    limit: usize,
) -> Result<Listing, CatalogError> {
    let raw = fetcher.fetch_json(&config.listing_url(limit))?;
    let page: ListingPage =
        serde_json::from_value(raw).map_err(|err| CatalogError::Decode(err.to_string()))?;

    let mut identifiers = Vec::with_capacity(page.results.len());
    for entry in page.results {
        match entry.name.parse::<Identifier>() {
            Ok(id) => identifiers.push(id),
            Err(err) => warn!(name = %entry.name, error = %err, "skipping listing entry"),
        }
    }
    Ok(Listing {
        available: page.count,
        identifiers,
    })
}

/// Loads `identifiers` in chunks of `chunk_size`, one chunk at a time, and
/// returns the successes sorted by id. A progress event follows every chunk.
pub fn load_all<S>(
    source: &S,
    identifiers: &[Identifier],
    chunk_size: usize,
    sink: &dyn ProgressSink,
) -> Vec<Arc<CanonicalRecord>>
where
    S: RecordSource + ?Sized,
{
    let start = Instant::now();
    let total = identifiers.len();
    let mut records = Vec::with_capacity(total);
    let mut done = 0usize;
    for chunk in identifiers.chunks(chunk_size.max(1)) {
        records.extend(batch::load_batch(source, chunk));
        done += chunk.len();
        sink.event(ProgressEvent {
            message: format!("phase=Load; {done}/{total} ({}%)", done * 100 / total),
            elapsed: Some(start.elapsed()),
        });
    }
    records.sort_by_key(|record| record.id);
    records
}

/// Grid filter. Every set criterion must match; an empty filter keeps all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogFilter {
    /// Exact type tag, e.g. `grass`.
    pub type_name: Option<String>,
    /// Exact display ability, e.g. `Overgrow`.
    pub ability: Option<String>,
    /// Case-insensitive substring of the display name.
    pub name_query: Option<String>,
}

impl CatalogFilter {
    pub fn is_empty(&self) -> bool {
        self.type_name.is_none() && self.ability.is_none() && self.name_query.is_none()
    }

    pub fn matches(&self, record: &CanonicalRecord) -> bool {
        if let Some(type_name) = &self.type_name {
            if !record.has_type(type_name) {
                return false;
            }
        }
        if let Some(ability) = &self.ability {
            if !record.has_ability(ability) {
                return false;
            }
        }
        if let Some(query) = &self.name_query {
            let query = query.trim().to_lowercase();
            if !query.is_empty() && !record.name.to_lowercase().contains(&query) {
                return false;
            }
        }
        true
    }

    pub fn apply(&self, records: &[Arc<CanonicalRecord>]) -> Vec<Arc<CanonicalRecord>> {
        records
            .iter()
            .filter(|record| self.matches(record))
            .cloned()
            .collect()
    }
}

pub fn distinct_types(records: &[Arc<CanonicalRecord>]) -> Vec<String> {
    records
        .iter()
        .flat_map(|record| record.types.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn distinct_abilities(records: &[Arc<CanonicalRecord>]) -> Vec<String> {
    records
        .iter()
        .flat_map(|record| record.abilities.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
