// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Tracker Gateway Server Implementation
//!
//! HTTP front end for the tracker request pipeline, built with Axum. Each lookup
//! goes through the same rate limiting and response cache regardless of which
//! client asked.
//!
//! # Module Structure
//!
//! - [`config`]: Server, cache and per-indexer configuration with hierarchical loading
//! - [`error`]: Error types and HTTP status mapping for pipeline failures
//! - [`state`]: Shared state holding the pipeline and the cancellation token
//! - [`server`]: Server lifecycle, middleware and coordinated shutdown
//! - [`routes`]: `/health` and `/v1/{indexer}/{action}/{id}`

pub mod config;
pub mod error;
pub mod routes;
pub mod server;
pub mod state;

pub use config::{CacheSettings, Environment, IndexerSettings, ServerConfig};
pub use error::{ServerError, ServerResult};
pub use server::{Server, ShutdownConfig};
pub use shared_types::Indexer;
pub use state::{HealthCheck, ServerState, TrackerPipeline};
