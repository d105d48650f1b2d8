mod common;

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;

use pokedex_catalog::domain::Identifier;
use pokedex_catalog::error::CatalogError;
use pokedex_catalog::loader::RecordSource;
use pokedex_catalog::normalize::{CATEGORY_PLACEHOLDER, DESCRIPTION_PLACEHOLDER};

use common::{MockFetcher, Reply, entity_doc, entity_url, fixture, loader, loader_with, test_config};

const SPECIES_URL: &str = "https://pokeapi.test/api/v2/pokemon-species/1/";
const CHAIN_URL: &str = "https://pokeapi.test/api/v2/evolution-chain/1/";

fn bulbasaur_fetcher() -> MockFetcher {
    MockFetcher::new()
        .route(entity_url("1"), Reply::Json(fixture("bulbasaur.json")))
        .route(entity_url("bulbasaur"), Reply::Json(fixture("bulbasaur.json")))
        .route(SPECIES_URL, Reply::Json(fixture("bulbasaur_species.json")))
        .route(CHAIN_URL, Reply::Json(fixture("bulbasaur_evolution.json")))
}

#[test]
fn full_pipeline_follows_linked_documents() {
    let loader = loader(bulbasaur_fetcher());

    let record = loader.load("bulbasaur").unwrap();

    assert_eq!(record.id, 1);
    assert_eq!(record.category, "Pokémon Semilla");
    assert!(record.description.starts_with("Una rara semilla"));
    assert_eq!(record.evolution_graph.id, Some(1));
    assert_eq!(
        record.evolution_graph.first_branch(),
        vec!["bulbasaur", "ivysaur", "venusaur"]
    );
    assert_eq!(loader.fetcher().calls_to(SPECIES_URL), 1);
    assert_eq!(loader.fetcher().calls_to(CHAIN_URL), 1);
}

#[test]
fn second_load_is_served_from_cache() {
    let loader = loader(bulbasaur_fetcher());

    let first = loader.load("Bulbasaur").unwrap();
    let calls = loader.fetcher().total_calls();
    let second = loader.load("  bulbasaur ").unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(loader.fetcher().total_calls(), calls);
}

#[test]
fn name_and_number_are_cached_separately() {
    let loader = loader(bulbasaur_fetcher());

    let by_name = loader.load("bulbasaur").unwrap();
    let by_number = loader.load("1").unwrap();

    assert_eq!(by_name, by_number);
    assert_eq!(loader.fetcher().calls_to(&entity_url("1")), 1);
    assert_eq!(loader.cache().len(), 2);
}

#[test]
fn unreachable_species_falls_back_to_defaults() {
    let fetcher = MockFetcher::new()
        .route(entity_url("1"), Reply::Json(fixture("bulbasaur.json")))
        .route(SPECIES_URL, Reply::Timeout);
    let loader = loader(fetcher);

    let record = loader.load("1").unwrap();

    assert_eq!(record.id, 1);
    assert_eq!(record.description, DESCRIPTION_PLACEHOLDER);
    assert_eq!(record.category, CATEGORY_PLACEHOLDER);
    assert_eq!(record.evolution_graph.chain.species.name, "bulbasaur");
    assert!(record.evolution_graph.chain.evolves_to.is_empty());
    assert_eq!(loader.fetcher().calls_to(CHAIN_URL), 0);
}

#[test]
fn unreachable_evolution_keeps_species_text() {
    let fetcher = MockFetcher::new()
        .route(entity_url("1"), Reply::Json(fixture("bulbasaur.json")))
        .route(SPECIES_URL, Reply::Json(fixture("bulbasaur_species.json")))
        .route(CHAIN_URL, Reply::Status(503));
    let loader = loader(fetcher);

    let record = loader.load("1").unwrap();

    assert_eq!(record.category, "Pokémon Semilla");
    assert!(!record.evolution_graph.has_evolutions());
    assert_eq!(record.evolution_graph.chain.species.name, "bulbasaur");
}

#[test]
fn entity_404_is_not_found_after_every_attempt() {
    let loader = loader(MockFetcher::new());
    let id: Identifier = "missingno".parse().unwrap();

    let err = loader.load_with_retry(&id).unwrap_err();

    assert_matches!(err, CatalogError::NotFound(ref name) if name == "missingno");
    assert_eq!(loader.fetcher().calls_to(&entity_url("missingno")), 3);
    assert!(loader.load("missingno").is_none());
}

#[test]
fn try_load_fails_fast_without_retry() {
    let fetcher = MockFetcher::new().route(entity_url("25"), Reply::Status(500));
    let loader = loader(fetcher);

    let err = loader.try_load(&Identifier::from(25u32)).unwrap_err();

    assert_matches!(err, CatalogError::RequestFailed { status: 500, .. });
    assert_eq!(loader.fetcher().total_calls(), 1);
}

#[test]
fn timeouts_exhaust_retries_with_growing_delays() {
    let fetcher = MockFetcher::new().route(entity_url("25"), Reply::Timeout);
    let config = pokedex_catalog::config::Config {
        retry_base_delay_ms: 20,
        ..test_config()
    };
    let loader = loader_with(fetcher, config);

    let err = loader
        .load_with_retry(&Identifier::from(25u32))
        .unwrap_err();

    assert_matches!(
        err,
        CatalogError::RetriesExhausted { attempts: 3, ref last, .. }
            if matches!(**last, CatalogError::Timeout { .. })
    );
    let times = loader.fetcher().call_times(&entity_url("25"));
    assert_eq!(times.len(), 3);
    assert!(times[1] - times[0] >= Duration::from_millis(20));
    assert!(times[2] - times[1] >= Duration::from_millis(40));
    assert!(loader.cache().is_empty());
}

#[test]
fn zero_retries_means_one_attempt() {
    let fetcher = MockFetcher::new().route(entity_url("25"), Reply::Timeout);
    let config = pokedex_catalog::config::Config {
        max_retries: 0,
        ..test_config()
    };
    let loader = loader_with(fetcher, config);

    assert!(loader.load("25").is_none());
    assert_eq!(loader.fetcher().total_calls(), 1);
}

#[test]
fn invalid_identifier_never_reaches_the_network() {
    let loader = loader(MockFetcher::new());

    assert!(loader.load("../evolution-chain/1").is_none());
    assert!(loader.load("   ").is_none());
    assert_eq!(loader.fetcher().total_calls(), 0);
}

#[test]
fn entity_without_species_link_still_loads() {
    let mut doc = entity_doc(132, "ditto");
    doc.as_object_mut().unwrap().remove("species");
    let loader = loader(MockFetcher::new().route(entity_url("ditto"), Reply::Json(doc)));

    let record = loader.load("ditto").unwrap();

    assert_eq!(record.name, "Ditto");
    assert_eq!(record.evolution_graph.chain.species.name, "ditto");
    assert_eq!(loader.fetcher().total_calls(), 1);
}
