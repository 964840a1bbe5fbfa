//! tlparser API library.
//!
//! Aggregates a Lamoda catalog scraper and a Twitch Helix metadata fetcher
//! behind one HTTP API. Provided as a library so the CLI and the
//! integration tests can resolve the same object graph as the server.
//!
//! # Layers
//!
//! ```text
//! routes ──> controllers ──> services ──> db (repositories) ──> MongoDB / Elasticsearch
//!                               └──────> lamoda / twitch (external sources)
//! ```
//!
//! Every layer is constructed by the [`container::Container`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod container;
pub mod controllers;
pub mod db;
pub mod error;
pub mod lamoda;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
pub mod twitch;
