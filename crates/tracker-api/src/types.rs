// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Request context, response envelope and payload types

use std::{borrow::Cow, fmt};

use quick_xml::escape::{resolve_html5_entity, unescape_with};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::Indexer;

/// Status value the tracker API uses for a successful call
pub const STATUS_SUCCESS: &str = "success";

/// Action name for single-torrent lookups
pub const ACTION_TORRENT: &str = "torrent";

/// Caller-owned context for one logical fetch
#[derive(Clone, PartialEq, Eq)]
pub struct RequestData {
    /// Indexer the request targets
    pub indexer: Indexer,
    /// API key supplied with the request, overriding the configured one
    pub api_key: Option<String>,
}

impl RequestData {
    /// Create request data for an indexer without an inline API key
    pub fn new(indexer: Indexer) -> Self {
        Self {
            indexer,
            api_key: None,
        }
    }

    /// Attach an inline API key
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

impl fmt::Debug for RequestData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestData")
            .field("indexer", &self.indexer)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Decoded tracker API response envelope
///
/// A missing `status` decodes as empty, which is not a success.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseData {
    /// `success` or a failure indicator
    #[serde(default)]
    pub status: String,
    /// Failure message, populated when `status` is not `success`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Action-specific payload, kept undecoded until inspected
    #[serde(default, skip_serializing_if = "Payload::is_empty")]
    pub response: Payload,
}

impl ResponseData {
    /// Whether the envelope reports success
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }

    /// Error message carried by the envelope, empty when absent
    pub fn error_message(&self) -> &str {
        self.error.as_deref().unwrap_or_default()
    }

    /// Decode the payload branch that belongs to `action`
    ///
    /// Returns `Ok(None)` when the payload is empty or, for `torrent`, when no
    /// torrent record is present.
    pub fn payload_for<'a>(
        &'a self,
        action: &'a str,
    ) -> Result<Option<ActionPayload<'a>>, serde_json::Error> {
        if self.response.is_empty() {
            return Ok(None);
        }

        match action {
            ACTION_TORRENT => Ok(self.response.torrent()?.map(ActionPayload::Torrent)),
            _ => Ok(Some(ActionPayload::Raw {
                action,
                value: &self.response.0,
            })),
        }
    }
}

/// Raw action payload of an envelope
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(pub Value);

impl Payload {
    /// Whether the payload is absent
    pub fn is_empty(&self) -> bool {
        self.0.is_null()
    }

    /// Decode the `torrent` record, if present
    pub fn torrent(&self) -> Result<Option<Torrent>, serde_json::Error> {
        match self.0.get("torrent") {
            None | Some(Value::Null) => Ok(None),
            Some(value) => Torrent::deserialize(value).map(Some),
        }
    }
}

/// Payload view selected by the requested action
#[derive(Debug, Clone, PartialEq)]
pub enum ActionPayload<'a> {
    /// `action=torrent`
    Torrent(Torrent),
    /// Any other action, left as raw JSON
    Raw {
        /// Action that produced the payload
        action: &'a str,
        /// Undecoded payload
        value: &'a Value,
    },
}

/// Torrent record returned by `action=torrent`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Torrent {
    /// Torrent identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Release name as sent by the tracker, possibly HTML-escaped
    #[serde(default)]
    pub release_name: String,
    /// Uploader
    #[serde(default)]
    pub username: String,
}

impl Torrent {
    /// Release name with HTML entities resolved, for display and logging only
    ///
    /// Unknown or malformed entities leave the name untouched.
    pub fn display_release_name(&self) -> Cow<'_, str> {
        unescape_with(&self.release_name, resolve_html5_entity)
            .unwrap_or(Cow::Borrowed(self.release_name.as_str()))
    }
}

/// Cache key derived from action and id, scoped by indexer
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Indexer the entry belongs to
    pub indexer: Indexer,
    /// `<action>ID <id>`
    pub key: String,
}

impl CacheKey {
    /// Build the key for `action` and `id` under `indexer`
    pub fn new(indexer: Indexer, action: &str, id: u64) -> Self {
        Self {
            indexer,
            key: format!("{action}ID {id}"),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.indexer, self.key)
    }
}
