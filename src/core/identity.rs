//! Opaque record identifiers
//!
//! Identifier provenance belongs to the storage backend: the local store
//! generates ULIDs client-side, while the SQLite store allocates numeric ids
//! from a counter table on insert. `RecordId` therefore carries no structure
//! beyond "non-empty opaque token" and is compared byte-for-byte.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use ulid::Ulid;

/// A unique record identifier, opaque to everything but the storage backend
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordId(String);

impl RecordId {
    /// Generate a fresh client-side identifier (ULID)
    pub fn generate() -> Self {
        Self(Ulid::new().to_string())
    }

    /// Build an identifier from a store-allocated sequence number
    pub fn from_number(n: u64) -> Self {
        Self(n.to_string())
    }

    /// Parse an identifier from user or stored input
    pub fn parse(s: &str) -> Result<Self, IdParseError> {
        s.parse()
    }

    /// The identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(IdParseError::Empty);
        }
        if let Some(c) = s.chars().find(|c| c.is_whitespace() || c.is_control()) {
            return Err(IdParseError::InvalidCharacter(c));
        }
        Ok(Self(s.to_string()))
    }
}

impl Serialize for RecordId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors that can occur when parsing record IDs
#[derive(Debug, Error)]
pub enum IdParseError {
    #[error("record ID cannot be empty")]
    Empty,

    #[error("record ID contains an invalid character: {0:?}")]
    InvalidCharacter(char),
}
