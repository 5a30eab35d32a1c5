// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! API key resolution from request data and configuration

use std::collections::HashMap;

use shared_types::Indexer;
use tracing::debug;
use tracker_api::{CredentialProvider, RequestData, TrackerError, TrackerResult};

use crate::ApiKey;

/// Credential provider backed by per-indexer configured keys
///
/// A non-blank key carried on the request wins over the configured one.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredCredentials {
    keys: HashMap<Indexer, ApiKey>,
}

impl ConfiguredCredentials {
    /// Create a provider with no configured keys
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the configured key for `indexer`
    #[must_use]
    pub fn with_key(mut self, indexer: Indexer, key: ApiKey) -> Self {
        self.keys.insert(indexer, key);
        self
    }

    /// Whether a key is configured for `indexer`
    pub fn has_key(&self, indexer: Indexer) -> bool {
        self.keys.contains_key(&indexer)
    }
}

impl CredentialProvider for ConfiguredCredentials {
    fn api_key(&self, request: &RequestData) -> TrackerResult<String> {
        if let Some(key) = request
            .api_key
            .as_deref()
            .and_then(|key| ApiKey::new(key).ok())
        {
            debug!(indexer = %request.indexer, "using API key supplied with request");
            return Ok(key.as_str().to_string());
        }

        self.keys
            .get(&request.indexer)
            .map(|key| key.as_str().to_string())
            .ok_or_else(|| TrackerError::credential(request.indexer, "no API key configured"))
    }
}
