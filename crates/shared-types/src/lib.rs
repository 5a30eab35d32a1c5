// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Shared types for the tracker gateway
//!
//! This crate provides the indexer identifiers shared across the workspace,
//! avoiding circular dependencies between the pipeline and the service.

pub mod indexer;

pub use indexer::{
    API_BASE_ORPHEUS, API_BASE_REDACTED, Indexer, IndexerParseError, resolve_api_base,
};
