use serde_json::Value;
use tracing::debug;

use crate::domain::{StatKey, capitalize};
use crate::record::{CanonicalRecord, EvolutionGraph, Images, Stat};

pub const DESCRIPTION_PLACEHOLDER: &str = "No description available.";
pub const CATEGORY_PLACEHOLDER: &str = "Unknown";

/// Language preference for localized species text, most preferred first.
const LANGUAGE_PREFERENCE: [&str; 2] = ["es", "en"];

/// Builds a record from the entity, species and evolution documents.
///
/// Never fails: absent documents and missing fields fall back to placeholders,
/// the fallback image, and a single-node evolution graph rooted at the
/// entity's own name.
pub fn normalize(
    entity: &Value,
    species: Option<&Value>,
    evolution: Option<&Value>,
    fallback_image_url: &str,
) -> CanonicalRecord {
    let raw_name = entity
        .get("name")
        .and_then(|v| v.as_str())
        .unwrap_or_default();
    let id = entity
        .get("id")
        .and_then(|v| v.as_u64())
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(0);

    let types: Vec<String> = entity
        .get("types")
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.get("type").and_then(|v| v.get("name")))
                .filter_map(|v| v.as_str())
                .map(|v| v.to_string())
                .collect()
        })
        .unwrap_or_default();

    let abilities: Vec<String> = entity
        .get("abilities")
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.get("ability").and_then(|v| v.get("name")))
                .filter_map(|v| v.as_str())
                .map(capitalize)
                .collect()
        })
        .unwrap_or_default();

    let mut stats = Vec::new();
    if let Some(items) = entity.get("stats").and_then(|v| v.as_array()) {
        for item in items {
            let name = item
                .get("stat")
                .and_then(|v| v.get("name"))
                .and_then(|v| v.as_str())
                .unwrap_or("");
            let Some(key) = StatKey::from_source(name) else {
                debug!(stat = name, "skipping unknown stat");
                continue;
            };
            let value = item
                .get("base_stat")
                .and_then(|v| v.as_u64())
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(0);
            stats.push(Stat { key, value });
        }
    }

    let description = species
        .and_then(|doc| localized(doc, "flavor_text_entries", "flavor_text"))
        .map(clean_text)
        .unwrap_or_else(|| DESCRIPTION_PLACEHOLDER.to_string());
    let category = species
        .and_then(|doc| localized(doc, "genera", "genus"))
        .map(|v| v.to_string())
        .unwrap_or_else(|| CATEGORY_PLACEHOLDER.to_string());

    let evolution_graph = evolution
        .and_then(|doc| serde_json::from_value::<EvolutionGraph>(doc.clone()).ok())
        .unwrap_or_else(|| EvolutionGraph::degenerate(raw_name));

    CanonicalRecord {
        id,
        name: capitalize(raw_name),
        height: tenths(entity.get("height")),
        weight: tenths(entity.get("weight")),
        types,
        abilities,
        stats,
        images: select_images(entity.get("sprites"), fallback_image_url),
        description,
        category,
        evolution_graph,
    }
}

/// Image priority: official artwork, animated sprite, default front sprite,
/// fallback URL. Fields are looked up by path, so key order in the source
/// object has no effect.
pub fn select_images(sprites: Option<&Value>, fallback_image_url: &str) -> Images {
    let sprite = |path: &[&str]| -> Option<String> {
        let mut current = sprites?;
        for key in path {
            current = current.get(key)?;
        }
        current
            .as_str()
            .filter(|v| !v.trim().is_empty())
            .map(|v| v.to_string())
    };

    let artwork = sprite(&["other", "official-artwork", "front_default"]);
    let animated = sprite(&[
        "versions",
        "generation-v",
        "black-white",
        "animated",
        "front_default",
    ]);
    let front = sprite(&["front_default"]);
    let shiny = sprite(&["front_shiny"]);

    let primary = artwork
        .clone()
        .or_else(|| animated.clone())
        .or_else(|| front.clone())
        .unwrap_or_else(|| fallback_image_url.to_string());

    Images {
        primary,
        default: front.unwrap_or_else(|| fallback_image_url.to_string()),
        shiny,
        animated,
        artwork,
    }
}

/// First entry whose `language.name` matches, walking the preference list in
/// order.
fn localized<'a>(doc: &'a Value, list: &str, field: &str) -> Option<&'a str> {
    let entries = doc.get(list)?.as_array()?;
    LANGUAGE_PREFERENCE.iter().find_map(|lang| {
        entries
            .iter()
            .find(|entry| {
                entry
                    .get("language")
                    .and_then(|v| v.get("name"))
                    .and_then(|v| v.as_str())
                    == Some(*lang)
            })
            .and_then(|entry| entry.get(field))
            .and_then(|v| v.as_str())
    })
}

fn clean_text(value: &str) -> String {
    value.replace(['\u{000C}', '\n'], " ")
}

fn tenths(value: Option<&Value>) -> f64 {
    value.and_then(|v| v.as_f64()).unwrap_or(0.0) / 10.0
}
