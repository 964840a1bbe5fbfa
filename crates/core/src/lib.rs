//! tlparser Core - Shared types library.
//!
//! This crate provides the domain types used across all tlparser components:
//! - `api` - HTTP backend that aggregates Lamoda and Twitch data
//! - `cli` - Command-line tools for storage setup and one-off parses
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. Documents stored in MongoDB and Elasticsearch are
//! serialized straight from these types.
//!
//! # Modules
//!
//! - [`types`] - Entities for both data domains plus type-safe IDs, slugs and prices

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
