// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Routes module
//!
//! This module provides route configuration and handlers for the tracker gateway.

pub mod handlers;

use axum::{Router, routing::get};
use handlers::{health_handler, tracker_handler};

use crate::state::ServerState;

/// Create application routes
pub fn create_routes() -> Router<ServerState> {
    let health_routes = Router::new().route("/health", get(health_handler));

    let api_routes = Router::new().route("/{indexer}/{action}/{id}", get(tracker_handler));

    let v1 = Router::new().nest("/v1", api_routes);

    Router::new().merge(health_routes).merge(v1)
}
