//! # Lumi Library
//!
//! Library target of the Lumi binary, exposing the HTTP API, CLI, inference
//! client and analyzer for integration tests.

pub mod analyzer;
pub mod api;
pub mod cli;
pub mod config;
pub mod inference;
