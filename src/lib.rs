//! Scout query client - validates analytics queries, routes them to the
//! embedded SQLite store or the remote query service, and returns one
//! uniform result shape.
//!
//! This library exposes the core modules for the binary and integration tests.

pub mod backend;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod query;
