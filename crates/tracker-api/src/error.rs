// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Error taxonomy for the tracker request pipeline
//!
//! Errors gain context as they cross component boundaries: the executor
//! produces the leaf variants, the orchestrator wraps them in
//! [`TrackerError::InitiationFailed`], and the cached fetch wraps those in
//! [`TrackerError::FetchFailed`]. [`TrackerError::root`] recovers the leaf.

use std::time::Duration;

use shared_types::{Indexer, IndexerParseError};
use thiserror::Error;

/// Boxed error used for transport causes
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result type alias for pipeline operations
pub type TrackerResult<T> = Result<T, TrackerError>;

/// Errors surfaced by the tracker request pipeline
#[derive(Debug, Error)]
pub enum TrackerError {
    /// Indexer identifier is not compiled in
    #[error(transparent)]
    InvalidIndexer(#[from] IndexerParseError),

    /// The indexer's limiter had no token available
    #[error("{indexer}: too many requests")]
    RateLimited {
        /// Indexer that was throttled
        indexer: Indexer,
    },

    /// No limiter is configured for the indexer
    #[error("could not get rate limiter for indexer: {indexer}")]
    LimiterUnavailable {
        /// Indexer missing a limiter
        indexer: Indexer,
    },

    /// Network-level failure, including body read failures
    #[error("transport error: {source}")]
    Transport {
        /// Underlying cause
        #[source]
        source: BoxError,
    },

    /// The request did not complete within the bound
    #[error("request timed out after {timeout:?}")]
    Timeout {
        /// Bound that was exceeded
        timeout: Duration,
    },

    /// Response body was not a valid envelope
    #[error("failed to decode response: {source}")]
    Decode {
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// The tracker reported a failure status
    #[error("API error from {indexer}: {message}")]
    Api {
        /// Indexer that reported the failure
        indexer: Indexer,
        /// Error string from the envelope, verbatim
        message: String,
    },

    /// No usable API key for the request
    #[error("credential error for {indexer}: {message}")]
    Credential {
        /// Indexer the key was requested for
        indexer: Indexer,
        /// Why no key could be resolved
        message: String,
    },

    /// Request against an endpoint failed
    #[error("request initiation failed for endpoint {endpoint}: {source}")]
    InitiationFailed {
        /// Fully formed endpoint URL
        endpoint: String,
        /// Executor failure
        #[source]
        source: Box<TrackerError>,
    },

    /// Fetch for an action and id failed
    #[error("error fetching {action} data for ID {id} from {indexer}: {source}")]
    FetchFailed {
        /// Indexer the fetch targeted
        indexer: Indexer,
        /// Requested action
        action: String,
        /// Requested id
        id: u64,
        /// Initiation or credential failure
        #[source]
        source: Box<TrackerError>,
    },
}

/// Flat classification of [`TrackerError`] variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// [`TrackerError::InvalidIndexer`]
    InvalidIndexer,
    /// [`TrackerError::RateLimited`]
    RateLimited,
    /// [`TrackerError::LimiterUnavailable`]
    LimiterUnavailable,
    /// [`TrackerError::Transport`]
    Transport,
    /// [`TrackerError::Timeout`]
    Timeout,
    /// [`TrackerError::Decode`]
    Decode,
    /// [`TrackerError::Api`]
    Api,
    /// [`TrackerError::Credential`]
    Credential,
    /// [`TrackerError::InitiationFailed`]
    InitiationFailed,
    /// [`TrackerError::FetchFailed`]
    FetchFailed,
}

impl TrackerError {
    /// Create a transport error from any error type
    pub fn transport<E>(source: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::Transport {
            source: source.into(),
        }
    }

    /// Create a credential error
    pub fn credential<T: ToString>(indexer: Indexer, message: T) -> Self {
        Self::Credential {
            indexer,
            message: message.to_string(),
        }
    }

    /// Kind of this error, without looking through wrappers
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidIndexer(_) => ErrorKind::InvalidIndexer,
            Self::RateLimited { .. } => ErrorKind::RateLimited,
            Self::LimiterUnavailable { .. } => ErrorKind::LimiterUnavailable,
            Self::Transport { .. } => ErrorKind::Transport,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Decode { .. } => ErrorKind::Decode,
            Self::Api { .. } => ErrorKind::Api,
            Self::Credential { .. } => ErrorKind::Credential,
            Self::InitiationFailed { .. } => ErrorKind::InitiationFailed,
            Self::FetchFailed { .. } => ErrorKind::FetchFailed,
        }
    }

    /// Innermost error beneath any context wrappers
    pub fn root(&self) -> &TrackerError {
        let mut current = self;
        while let Self::InitiationFailed { source, .. } | Self::FetchFailed { source, .. } = current
        {
            current = &**source;
        }
        current
    }

    /// Kind of the innermost error
    pub fn root_kind(&self) -> ErrorKind {
        self.root().kind()
    }
}
