// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Validated tracker API keys
//!
//! [`ApiKey`] guarantees at construction that the key holds at least one
//! non-whitespace character, so an empty configured key can never reach the
//! `Authorization` header. Its `Debug` output never reveals the key.
//!
//! ```rust
//! use tracker_client::ApiKey;
//!
//! let key = ApiKey::new("abcd1234").expect("valid key");
//! assert_eq!(key.as_str(), "abcd1234");
//! assert_eq!(format!("{key:?}"), "ApiKey(<redacted>)");
//!
//! assert!(ApiKey::new("").is_err());
//! assert!(ApiKey::new(" \t\n").is_err());
//! ```

use core::fmt;
use std::str::FromStr;

/// A non-empty API key
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(Box<str>);

impl ApiKey {
    /// Create a key from any string-like input
    ///
    /// Surrounding whitespace is trimmed; whitespace-only input is rejected.
    pub fn new(s: impl Into<String>) -> Result<Self, String> {
        let s = s.into();
        let trimmed = s.trim();
        if trimmed.is_empty() {
            Err("API key cannot be empty or whitespace-only".to_string())
        } else {
            Ok(ApiKey(trimmed.into()))
        }
    }

    /// The raw key value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

impl FromStr for ApiKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for ApiKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_surrounding_whitespace() {
        let key = ApiKey::new("  abc \n").unwrap();
        assert_eq!(key.as_str(), "abc");
        assert_eq!(key.as_ref(), "abc");
    }

    #[test]
    fn rejects_blank() {
        for input in ["", " ", "\t\r\n"] {
            assert!(ApiKey::new(input).is_err());
            assert!(input.parse::<ApiKey>().is_err());
        }
    }

    #[test]
    fn debug_is_redacted() {
        let key: ApiKey = "super-secret".parse().unwrap();
        assert!(!format!("{key:?}").contains("super-secret"));
    }
}
