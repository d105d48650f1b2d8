use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

pub const DEFAULT_BASE_URL: &str = "https://pokeapi.co/api/v2";
pub const DEFAULT_FALLBACK_IMAGE_URL: &str =
    "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/0.png";
const CONFIG_FILE_NAME: &str = "pokedex.json";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_entity_endpoint")]
    pub entity_endpoint: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_fallback_image_url")]
    pub fallback_image_url: String,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_max_evolution_depth")]
    pub max_evolution_depth: usize,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_catalog_limit")]
    pub catalog_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            entity_endpoint: default_entity_endpoint(),
            request_timeout_ms: default_request_timeout_ms(),
            fallback_image_url: default_fallback_image_url(),
            max_retries: default_max_retries(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            max_evolution_depth: default_max_evolution_depth(),
            batch_size: default_batch_size(),
            catalog_limit: default_catalog_limit(),
        }
    }
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    /// `{base}/{endpoint}/{identifier}`, tolerant of a trailing slash on the base.
    pub fn entity_url(&self, identifier: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.entity_endpoint,
            identifier
        )
    }

    pub fn listing_url(&self, limit: usize) -> String {
        format!(
            "{}/{}?limit={limit}",
            self.base_url.trim_end_matches('/'),
            self.entity_endpoint
        )
    }

    /// Rejects a blank base URL and zero-sized batch or depth limits.
    pub fn validate(self) -> Result<Self, CatalogError> {
        if self.base_url.trim().is_empty() {
            return Err(CatalogError::ConfigParse("base_url must not be empty".to_string()));
        }
        if self.batch_size == 0 {
            return Err(CatalogError::ConfigParse(
                "batch_size must be greater than zero".to_string(),
            ));
        }
        if self.max_evolution_depth == 0 {
            return Err(CatalogError::ConfigParse(
                "max_evolution_depth must be greater than zero".to_string(),
            ));
        }
        Ok(self)
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads `path` when given. Otherwise looks for `pokedex.json` in the
    /// working directory, then the per-user config directory, and falls back
    /// to defaults when neither exists.
    pub fn resolve(path: Option<&str>) -> Result<Config, CatalogError> {
        if let Some(path) = path {
            return Self::read(PathBuf::from(path));
        }

        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            return Self::read(local);
        }

        if let Some(user) = user_config_path() {
            if user.exists() {
                return Self::read(user);
            }
        }

        Ok(Config::default())
    }

    pub fn parse(content: &str) -> Result<Config, CatalogError> {
        let config: Config = serde_json::from_str(content)
            .map_err(|err| CatalogError::ConfigParse(err.to_string()))?;
        config.validate()
    }

    fn read(path: PathBuf) -> Result<Config, CatalogError> {
        let content =
            fs::read_to_string(&path).map_err(|_| CatalogError::ConfigRead(path.clone()))?;
        Self::parse(&content)
    }
}

pub fn user_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "pokedex").map(|dirs| dirs.config_dir().join("config.json"))
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_entity_endpoint() -> String {
    "pokemon".to_string()
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

fn default_fallback_image_url() -> String {
    DEFAULT_FALLBACK_IMAGE_URL.to_string()
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_base_delay_ms() -> u64 {
    1_000
}

fn default_max_evolution_depth() -> usize {
    10
}

fn default_batch_size() -> usize {
    50
}

fn default_catalog_limit() -> usize {
    1172
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let config = ConfigLoader::parse("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.max_evolution_depth, 10);
    }

    #[test]
    fn urls_ignore_trailing_slash() {
        let config = Config {
            base_url: "http://localhost:8080/api/".to_string(),
            ..Config::default()
        };
        assert_eq!(
            config.entity_url("pikachu"),
            "http://localhost:8080/api/pokemon/pikachu"
        );
        assert_eq!(
            config.listing_url(20),
            "http://localhost:8080/api/pokemon?limit=20"
        );
    }

    #[test]
    fn zero_batch_size_rejected() {
        let err = ConfigLoader::parse(r#"{"batch_size": 0}"#).unwrap_err();
        assert_matches!(err, CatalogError::ConfigParse(_));
    }
}
