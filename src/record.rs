use serde::{Deserialize, Serialize};

use crate::domain::StatKey;

/// Normalized, immutable view of one catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub id: u32,
    pub name: String,
    /// Meters.
    pub height: f64,
    /// Kilograms.
    pub weight: f64,
    pub types: Vec<String>,
    pub abilities: Vec<String>,
    pub stats: Vec<Stat>,
    pub images: Images,
    pub description: String,
    pub category: String,
    pub evolution_graph: EvolutionGraph,
}

impl CanonicalRecord {
    pub fn stat(&self, key: StatKey) -> Option<u32> {
        self.stats
            .iter()
            .find(|stat| stat.key == key)
            .map(|stat| stat.value)
    }

    pub fn has_type(&self, type_name: &str) -> bool {
        self.types.iter().any(|value| value == type_name)
    }

    pub fn has_ability(&self, ability: &str) -> bool {
        self.abilities.iter().any(|value| value == ability)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stat {
    pub key: StatKey,
    pub value: u32,
}

impl Stat {
    pub const DISPLAY_MAX: u32 = 255;

    /// Share of the display maximum, uncapped for out-of-range values.
    pub fn percent(&self) -> f64 {
        f64::from(self.value) / f64::from(Self::DISPLAY_MAX) * 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Images {
    /// Best available image, never empty.
    pub primary: String,
    /// Default front sprite, or the fallback URL.
    pub default: String,
    pub shiny: Option<String>,
    pub animated: Option<String>,
    pub artwork: Option<String>,
}

/// Evolution document as served upstream. Only the fields the resolver walks
/// are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionGraph {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub chain: EvolutionNode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionNode {
    pub species: SpeciesRef,
    #[serde(default)]
    pub evolves_to: Vec<EvolutionNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl EvolutionGraph {
    /// Single-node graph rooted at `species_name`, used when the real chain is
    /// unavailable.
    pub fn degenerate(species_name: &str) -> Self {
        Self {
            id: None,
            chain: EvolutionNode {
                species: SpeciesRef {
                    name: species_name.to_string(),
                    url: None,
                },
                evolves_to: Vec::new(),
            },
        }
    }

    pub fn has_evolutions(&self) -> bool {
        !self.chain.evolves_to.is_empty()
    }

    /// Species names along the first-listed branch, root first.
    pub fn first_branch(&self) -> Vec<&str> {
        let mut names = Vec::new();
        let mut node = Some(&self.chain);
        while let Some(current) = node {
            names.push(current.species.name.as_str());
            node = current.evolves_to.first();
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn graph_parses_upstream_shape() {
        let raw = json!({
            "id": 1,
            "baby_trigger_item": null,
            "chain": {
                "is_baby": false,
                "species": {"name": "bulbasaur", "url": "https://pokeapi.co/api/v2/pokemon-species/1/"},
                "evolves_to": [{
                    "species": {"name": "ivysaur", "url": "https://pokeapi.co/api/v2/pokemon-species/2/"},
                    "evolves_to": [{
                        "species": {"name": "venusaur", "url": "https://pokeapi.co/api/v2/pokemon-species/3/"},
                        "evolves_to": []
                    }]
                }]
            }
        });
        let graph: EvolutionGraph = serde_json::from_value(raw).unwrap();
        assert_eq!(graph.id, Some(1));
        assert_eq!(graph.first_branch(), vec!["bulbasaur", "ivysaur", "venusaur"]);
    }

    #[test]
    fn degenerate_graph_has_no_evolutions() {
        let graph = EvolutionGraph::degenerate("ditto");
        assert_eq!(graph.chain.species.name, "ditto");
        assert!(!graph.has_evolutions());
        assert_eq!(graph.first_branch(), vec!["ditto"]);
    }

    #[test]
    fn stat_percent_scales_against_display_max() {
        let stat = Stat {
            key: StatKey::Speed,
            value: 51,
        };
        assert!((stat.percent() - 20.0).abs() < 1e-9);
    }
}
