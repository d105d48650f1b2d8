use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Lookup key for one record: trimmed, lowercased, numeric ids stringified
/// without leading zeros.
///
/// Two spellings that normalize to the same string share a cache slot. A name
/// and the numeric id of the same creature do not.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier(String);

impl Identifier {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_numeric(&self) -> bool {
        self.0.chars().all(|ch| ch.is_ascii_digit())
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Identifier {
    type Err = CatalogError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_lowercase();
        // Identifiers become a URL path segment.
        let is_valid = !normalized.is_empty()
            && normalized
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '-');
        if !is_valid {
            return Err(CatalogError::InvalidIdentifier(value.to_string()));
        }
        let id = Self(normalized);
        if id.is_numeric() {
            let digits = id.0.trim_start_matches('0');
            return Ok(Self(if digits.is_empty() { "0" } else { digits }.to_string()));
        }
        Ok(id)
    }
}

impl TryFrom<String> for Identifier {
    type Error = CatalogError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Identifier> for String {
    fn from(value: Identifier) -> Self {
        value.0
    }
}

impl From<u32> for Identifier {
    fn from(value: u32) -> Self {
        Self(value.to_string())
    }
}

impl From<u64> for Identifier {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatKey {
    Hp,
    Attack,
    Defense,
    SpecialAttack,
    SpecialDefense,
    Speed,
}

impl StatKey {
    pub const ALL: [StatKey; 6] = [
        StatKey::Hp,
        StatKey::Attack,
        StatKey::Defense,
        StatKey::SpecialAttack,
        StatKey::SpecialDefense,
        StatKey::Speed,
    ];

    pub fn from_source(name: &str) -> Option<Self> {
        match name {
            "hp" => Some(StatKey::Hp),
            "attack" => Some(StatKey::Attack),
            "defense" => Some(StatKey::Defense),
            "special-attack" => Some(StatKey::SpecialAttack),
            "special-defense" => Some(StatKey::SpecialDefense),
            "speed" => Some(StatKey::Speed),
            _ => None,
        }
    }

    /// Display label used by the detail panel.
    pub fn label(&self) -> &'static str {
        match self {
            StatKey::Hp => "PS",
            StatKey::Attack => "Ataque",
            StatKey::Defense => "Defensa",
            StatKey::SpecialAttack => "Ataque Especial",
            StatKey::SpecialDefense => "Defensa Especial",
            StatKey::Speed => "Velocidad",
        }
    }
}

impl fmt::Display for StatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatKey::Hp => "hp",
            StatKey::Attack => "attack",
            StatKey::Defense => "defense",
            StatKey::SpecialAttack => "special-attack",
            StatKey::SpecialDefense => "special-defense",
            StatKey::Speed => "speed",
        };
        write!(f, "{name}")
    }
}

/// Upper-cases the first character, leaves the rest untouched.
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Catalog number as shown on cards, e.g. `0025`.
pub fn format_number(id: u32) -> String {
    format!("{id:04}")
}
