// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Tracker indexer identifiers and endpoint resolution
//!
//! Every supported indexer maps to a fixed, compiled-in API base URL. Adding an
//! indexer means adding a variant here together with its base URL.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// API base for Redacted
pub const API_BASE_REDACTED: &str = "https://redacted.sh/ajax.php";

/// API base for Orpheus
pub const API_BASE_ORPHEUS: &str = "https://orpheus.network/ajax.php";

/// Supported tracker indexers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Indexer {
    /// Redacted (`redacted`)
    Redacted,
    /// Orpheus Network (`ops`)
    Orpheus,
}

impl Indexer {
    /// Returns the canonical identifier used in configuration and logs
    pub const fn name(self) -> &'static str {
        match self {
            Self::Redacted => "redacted",
            Self::Orpheus => "ops",
        }
    }

    /// Returns the fixed API base URL for this indexer
    pub const fn api_base(self) -> &'static str {
        match self {
            Self::Redacted => API_BASE_REDACTED,
            Self::Orpheus => API_BASE_ORPHEUS,
        }
    }

    /// Returns all supported indexers
    pub const fn all() -> &'static [Self] {
        &[Self::Redacted, Self::Orpheus]
    }
}

/// Resolve the API base URL for an indexer identifier
///
/// Pure lookup against the compiled-in table; performs no I/O.
///
/// # Examples
///
/// ```rust
/// use shared_types::{API_BASE_ORPHEUS, resolve_api_base};
///
/// assert_eq!(resolve_api_base("ops").unwrap(), API_BASE_ORPHEUS);
/// assert!(resolve_api_base("btn").is_err());
/// ```
pub fn resolve_api_base(indexer: &str) -> Result<&'static str, IndexerParseError> {
    indexer.parse::<Indexer>().map(Indexer::api_base)
}

impl fmt::Display for Indexer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Indexer {
    type Err = IndexerParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "redacted" => Ok(Self::Redacted),
            "ops" => Ok(Self::Orpheus),
            _ => Err(IndexerParseError::InvalidIndexer(s.to_string())),
        }
    }
}

impl Serialize for Indexer {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Indexer {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct IndexerVisitor;

        impl serde::de::Visitor<'_> for IndexerVisitor {
            type Value = Indexer;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                write!(formatter, "a supported indexer name (redacted, ops)")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Indexer::from_str(value).map_err(|_| {
                    E::invalid_value(
                        serde::de::Unexpected::Str(value),
                        &"a supported indexer name (redacted, ops)",
                    )
                })
            }
        }

        deserializer.deserialize_str(IndexerVisitor)
    }
}

/// Error type for indexer parsing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndexerParseError {
    /// The identifier is not one of the compiled-in indexers
    #[error("invalid indexer: {0}. Supported indexers are: redacted, ops")]
    InvalidIndexer(String),
}
