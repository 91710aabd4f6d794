//! The Litmus market-data service
//!
//! This module exposes the API, cache, CLI and data modules for use in
//! integration tests and the server binary.

pub mod api;
pub mod cache;
pub mod cli;
pub mod data;
