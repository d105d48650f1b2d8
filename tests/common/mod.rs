#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use serde_json::{Value, json};

use pokedex_catalog::cache::RecordCache;
use pokedex_catalog::config::Config;
use pokedex_catalog::error::CatalogError;
use pokedex_catalog::fetcher::JsonFetcher;
use pokedex_catalog::loader::Loader;

pub const BASE: &str = "http://pokeapi.test/api/v2";

#[derive(Debug, Clone)]
pub enum Reply {
    Json(Value),
    Status(u16),
    Timeout,
}

/// Scripted fetcher keyed by URL. Unrouted URLs answer 404.
#[derive(Default)]
pub struct MockFetcher {
    routes: HashMap<String, Reply>,
    calls: Mutex<Vec<(String, Instant)>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, url: impl Into<String>, reply: Reply) -> Self {
        self.routes.insert(url.into(), reply);
        self
    }

    /// Entity, species and linear evolution chain for one creature.
    pub fn creature(self, id: u32, name: &str, chain: &[&str]) -> Self {
        let species_url = format!("{BASE}/pokemon-species/{id}/");
        let chain_url = format!("{BASE}/evolution-chain/{id}/");
        self.route(entity_url(&id.to_string()), Reply::Json(entity_doc(id, name)))
            .route(entity_url(name), Reply::Json(entity_doc(id, name)))
            .route(species_url, Reply::Json(species_doc(&chain_url)))
            .route(chain_url, Reply::Json(chain_doc(chain)))
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(called, _)| called == url)
            .count()
    }

    pub fn call_times(&self, url: &str) -> Vec<Instant> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(called, _)| called == url)
            .map(|(_, at)| *at)
            .collect()
    }
}

impl JsonFetcher for MockFetcher {
    fn fetch_json(&self, url: &str) -> Result<Value, CatalogError> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), Instant::now()));
        match self.routes.get(url) {
            Some(Reply::Json(value)) => Ok(value.clone()),
            Some(Reply::Status(status)) => Err(CatalogError::RequestFailed {
                status: *status,
                status_text: "scripted".to_string(),
            }),
            Some(Reply::Timeout) => Err(CatalogError::Timeout {
                url: url.to_string(),
            }),
            None => Err(CatalogError::RequestFailed {
                status: 404,
                status_text: "Not Found".to_string(),
            }),
        }
    }
}

pub fn test_config() -> Config {
    Config {
        base_url: BASE.to_string(),
        retry_base_delay_ms: 0,
        ..Config::default()
    }
}

pub fn loader(fetcher: MockFetcher) -> Loader<MockFetcher> {
    Loader::new(fetcher, Arc::new(RecordCache::new()), test_config())
}

pub fn loader_with(fetcher: MockFetcher, config: Config) -> Loader<MockFetcher> {
    Loader::new(fetcher, Arc::new(RecordCache::new()), config)
}

pub fn entity_url(identifier: &str) -> String {
    format!("{BASE}/pokemon/{identifier}")
}

pub fn entity_doc(id: u32, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "height": 10,
        "weight": 100,
        "species": {"name": name, "url": format!("{BASE}/pokemon-species/{id}/")},
        "sprites": {"front_default": format!("https://img.test/{id}.png")},
        "types": [{"slot": 1, "type": {"name": "normal"}}],
        "abilities": [{"ability": {"name": "run-away"}}],
        "stats": [{"base_stat": 50, "stat": {"name": "hp"}}]
    })
}

pub fn species_doc(chain_url: &str) -> Value {
    json!({
        "evolution_chain": {"url": chain_url},
        "genera": [{"genus": "Test Pokémon", "language": {"name": "en"}}],
        "flavor_text_entries": []
    })
}

/// Linear chain, first name at the root.
pub fn chain_doc(names: &[&str]) -> Value {
    let mut node: Option<Value> = None;
    for name in names.iter().rev() {
        let children = node.take().map(|child| vec![child]).unwrap_or_default();
        node = Some(json!({"species": {"name": name}, "evolves_to": children}));
    }
    json!({"chain": node.unwrap_or_else(|| json!({"species": {"name": ""}, "evolves_to": []}))})
}

pub fn fixture(name: &str) -> Value {
    let raw = fs::read_to_string(format!("tests/fixtures/{name}")).unwrap();
    serde_json::from_str(&raw).unwrap()
}
