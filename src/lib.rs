//! In-memory feature flag service: a concurrent flag registry, a
//! deterministic evaluation engine and the HTTP routes in front of them.

pub mod config;
pub mod error;
pub mod evaluation;
pub mod flags;
pub mod routes;
pub mod state;
