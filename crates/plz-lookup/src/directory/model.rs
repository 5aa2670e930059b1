use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Key/name pair the directory uses for municipalities and federal states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionRef {
    pub key: String,
    pub name: String,
}

/// One locality as returned by the address directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalityRecord {
    pub postal_code: String,
    pub name: String,
    pub municipality: RegionRef,
    pub federal_state: RegionRef,
}

impl LocalityRecord {
    pub fn municipality_key(&self) -> &str {
        &self.municipality.key
    }

    pub fn municipality_name(&self) -> &str {
        &self.municipality.name
    }

    pub fn federal_state_key(&self) -> &str {
        &self.federal_state.key
    }

    pub fn federal_state_name(&self) -> &str {
        &self.federal_state.name
    }
}

/// Which field drives a directory query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LocalityQuery {
    Name(String),
    PostalCode(String),
}

impl LocalityQuery {
    /// Query parameter name and value as the directory expects them.
    pub fn parameter(&self) -> (&'static str, &str) {
        match self {
            LocalityQuery::Name(name) => ("name", name),
            LocalityQuery::PostalCode(code) => ("postalCode", code),
        }
    }
}

impl fmt::Display for LocalityQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (key, value) = self.parameter();
        write!(f, "{key}={value}")
    }
}

/// 1-based result page. The directory rejects page 0, so it cannot be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Page(NonZeroU32);

impl Page {
    pub const FIRST: Page = Page(NonZeroU32::MIN);

    pub fn new(value: i64) -> Result<Self, InvalidPage> {
        u32::try_from(value)
            .ok()
            .and_then(NonZeroU32::new)
            .map(Page)
            .ok_or(InvalidPage::OutOfRange(value))
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::FIRST
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Page {
    type Err = InvalidPage;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let value = raw
            .trim()
            .parse::<i64>()
            .map_err(|_| InvalidPage::NotANumber(raw.trim().to_string()))?;
        Page::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidPage {
    #[error("page must be a positive whole number, got {0}")]
    OutOfRange(i64),
    #[error("page must be a positive whole number, got '{0}'")]
    NotANumber(String),
}
