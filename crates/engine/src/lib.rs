//! Server-side world update engine.
//!
//! Applies the cascading consequences of game events (unit deaths, spells
//! switched off, cities and production recalculated) to the authoritative
//! true map in dependency order, and keeps every player's fog-of-war memory
//! and client in step with what that player is allowed to see.

pub mod error;
pub mod messages;
pub mod rules;
pub mod updates;
pub mod world;

pub use error::{Result, UpdateError};
