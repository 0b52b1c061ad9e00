//! Portico — HTTP API layer.
//!
//! Exposed as a library so integration tests can build the same router the
//! binary serves.

pub mod error;
pub mod principal;
pub mod routes;
pub mod state;
