//! This crate provides the aggregation service behind the Digital Village Innovation dashboards.
//! It fetches villages, innovators, innovations and adoption claims from a hosted document
//! database, groups and counts them in memory, and serves the ranked leaderboards, charts, tables
//! and province maps that the admin, ministry, innovator and village dashboards render.
//!
//! Every leaderboard goes through a single ranking utility, [ranking::rank], which orders
//! entries by count and name and assigns standard competition ranks (`1, 2, 2, 4`) with ordinal
//! labels.
//!
//! The service is built on top of a number of open source components.
//!
//! * [Tokio](tokio), the most popular asynchronous Rust runtime.
//! * [Axum](axum) web framework, built by the Tokio team, on top of the [hyper] HTTP library.
//! * [Serde](serde) performs (de)serialisation of JSON request, response and document data.
//! * [reqwest] fetches collections from the document database.
//! * [validator] checks request data before any work is done.

pub mod aggregation;
pub mod app;
pub mod app_state;
pub mod cli;
pub mod collection_cache;
pub mod dashboards;
pub mod dataset;
pub mod document_source_directory;
pub mod document_source_http;
pub mod document_store;
pub mod error;
pub mod metrics;
pub mod models;
pub mod operation;
pub mod operations;
pub mod pagination;
pub mod ranking;
pub mod resource_manager;
pub mod server;
#[cfg(test)]
pub mod test_utils;
pub mod tracing;
pub mod types;
pub mod validated_json;
