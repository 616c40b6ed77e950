//! Authoritative game session server built on `realm-engine`.
//!
//! Supplies the concrete game rules behind the engine's seams, loads the
//! ruleset and session config, carries messages to clients over channels, and
//! saves sessions to disk.

pub mod config;
pub mod connection;
pub mod database;
pub mod metrics;
pub mod persistence;
pub mod rules;
pub mod session;
