// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Error handling module
//!
//! Server lifecycle errors and tracker pipeline errors share one type so
//! handlers can use `?` and still produce a status code that reflects the root
//! cause of a failed fetch.

use std::net::SocketAddr;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracker_api::{ErrorKind, TrackerError};

/// Error types for server operations
#[derive(Error, Debug)]
pub enum ServerError {
    /// Configuration validation errors
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Network binding errors
    #[error("Failed to bind to {address}: {source}")]
    Bind {
        /// Socket address that failed to bind
        address: SocketAddr,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Server startup errors
    #[error("Server startup failed: {source}")]
    Startup {
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Server shutdown errors
    #[error("Server shutdown failed: {source}")]
    Shutdown {
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Task join errors for async operations
    #[error("Task join error: {source}")]
    TaskJoin {
        /// Underlying tokio join error
        #[source]
        source: tokio::task::JoinError,
    },

    /// Tracker request pipeline errors
    #[error(transparent)]
    Tracker(#[from] TrackerError),
}

/// Result type for server operations
pub type ServerResult<T> = Result<T, ServerError>;

impl ServerError {
    /// HTTP status for this error
    ///
    /// Tracker errors map by their root cause, looking through fetch and
    /// initiation context.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Tracker(error) => match error.root_kind() {
                ErrorKind::InvalidIndexer => StatusCode::BAD_REQUEST,
                ErrorKind::Credential => StatusCode::UNAUTHORIZED,
                ErrorKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
                ErrorKind::Api | ErrorKind::Transport | ErrorKind::Decode => {
                    StatusCode::BAD_GATEWAY
                }
                ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
                ErrorKind::LimiterUnavailable
                | ErrorKind::InitiationFailed
                | ErrorKind::FetchFailed => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Config { .. }
            | Self::Bind { .. }
            | Self::Startup { .. }
            | Self::Shutdown { .. }
            | Self::TaskJoin { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16()
        }));
        (status, body).into_response()
    }
}

/// Convenient From implementations for common async error types
impl From<tokio::task::JoinError> for ServerError {
    fn from(source: tokio::task::JoinError) -> Self {
        Self::TaskJoin { source }
    }
}
