//! # Mingpan Application Library
//!
//! The HTTP API and configuration layer shared by the `mingpan` binary and
//! its integration tests.
//!
//! - `api`: axum router, handlers and request/response types
//! - `config`: `mingpan.toml` loading with environment overrides

pub mod api;
pub mod config;
