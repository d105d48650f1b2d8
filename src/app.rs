use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::catalog::{self, CatalogFilter};
use crate::domain::{Identifier, format_number};
use crate::error::CatalogError;
use crate::fetcher::JsonFetcher;
use crate::loader::Loader;
use crate::record::CanonicalRecord;

#[derive(Debug, Clone, Serialize)]
pub struct ShowResult {
    pub number: String,
    pub record: CanonicalRecord,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    pub requested: usize,
    pub loaded: usize,
    pub records: Vec<CanonicalRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvolutionResult {
    pub root: String,
    pub chain: Vec<EvolutionStep>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvolutionStep {
    pub id: u32,
    pub number: String,
    pub name: String,
    pub image: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogResult {
    pub available: Option<u64>,
    pub listed: usize,
    pub loaded: usize,
    pub filter: CatalogFilter,
    pub types: Vec<String>,
    pub abilities: Vec<String>,
    pub records: Vec<CanonicalRecord>,
    pub generated_at: String,
}

#[derive(Debug, Clone)]
pub struct CatalogOptions {
    pub limit: Option<usize>,
    pub filter: CatalogFilter,
}

#[derive(Debug, Clone, Copy)]
pub enum ProgressSinkKind {
    Show,
    Batch,
    Evolution,
    Catalog,
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

/// Command layer over a [`Loader`]; each operation reports progress to a sink
/// and returns a serializable result.
pub struct App<F: JsonFetcher> {
    loader: Loader<F>,
}

impl<F: JsonFetcher> App<F> {
    pub fn new(loader: Loader<F>) -> Self {
        Self { loader }
    }

    pub fn loader(&self) -> &Loader<F> {
        &self.loader
    }

    pub fn show(&self, identifier: &str, sink: &dyn ProgressSink) -> Result<ShowResult, CatalogError> {
        let id: Identifier = identifier.parse()?;
        sink.event(ProgressEvent {
            message: format!("phase=Resolve; {id}"),
            elapsed: None,
        });
        let start = Instant::now();
        let record = self.loader.load_with_retry(&id)?;
        sink.event(ProgressEvent {
            message: format!("phase=Load; {}", record.name),
            elapsed: Some(start.elapsed()),
        });
        Ok(ShowResult {
            number: format_number(record.id),
            record: record.as_ref().clone(),
        })
    }

    pub fn batch(
        &self,
        identifiers: &[String],
        sink: &dyn ProgressSink,
    ) -> Result<BatchResult, CatalogError> {
        let ids = identifiers
            .iter()
            .map(|value| value.parse::<Identifier>())
            .collect::<Result<Vec<_>, CatalogError>>()?;
        sink.event(ProgressEvent {
            message: format!("phase=Load; {} identifiers", ids.len()),
            elapsed: None,
        });
        let start = Instant::now();
        let records = sorted_by_id(self.loader.load_batch(&ids));
        sink.event(ProgressEvent {
            message: format!("phase=Done; loaded {}/{}", records.len(), ids.len()),
            elapsed: Some(start.elapsed()),
        });
        Ok(BatchResult {
            requested: ids.len(),
            loaded: records.len(),
            records: records.iter().map(|record| record.as_ref().clone()).collect(),
        })
    }

    pub fn evolution(
        &self,
        identifier: &str,
        sink: &dyn ProgressSink,
    ) -> Result<EvolutionResult, CatalogError> {
        let id: Identifier = identifier.parse()?;
        let record = self.loader.load_with_retry(&id)?;
        sink.event(ProgressEvent {
            message: format!(
                "phase=Resolve; evolution chain of {}",
                record.evolution_graph.chain.species.name
            ),
            elapsed: None,
        });
        let chain = self
            .loader
            .resolve(&record.evolution_graph)
            .iter()
            .map(|step| EvolutionStep {
                id: step.id,
                number: format_number(step.id),
                name: step.name.clone(),
                image: step.images.primary.clone(),
            })
            .collect();
        Ok(EvolutionResult {
            root: record.evolution_graph.chain.species.name.clone(),
            chain,
        })
    }

    /// Lists the catalog, loads it in `batch_size` chunks one chunk at a time,
    /// then applies the filter. Only the listing request is allowed to fail.
    pub fn catalog(
        &self,
        options: CatalogOptions,
        sink: &dyn ProgressSink,
    ) -> Result<CatalogResult, CatalogError> {
        let config = self.loader.config();
        let limit = options.limit.unwrap_or(config.catalog_limit);
        sink.event(ProgressEvent {
            message: format!("phase=Resolve; listing up to {limit} entries"),
            elapsed: None,
        });
        let listing = catalog::list_identifiers(self.loader.fetcher(), config, limit)?;
        let ids = listing.identifiers;

        let records = catalog::load_all(&self.loader, &ids, config.batch_size, sink);

        let types = catalog::distinct_types(&records);
        let abilities = catalog::distinct_abilities(&records);
        let visible = options.filter.apply(&records);

        Ok(CatalogResult {
            available: listing.available,
            listed: ids.len(),
            loaded: records.len(),
            filter: options.filter,
            types,
            abilities,
            records: visible.iter().map(|record| record.as_ref().clone()).collect(),
            generated_at: chrono::Utc::now().to_rfc3339(),
        })
    }
}

fn sorted_by_id(mut records: Vec<Arc<CanonicalRecord>>) -> Vec<Arc<CanonicalRecord>> {
    records.sort_by_key(|record| record.id);
    records
}
