use thiserror::Error;

use crate::world::player::PlayerId;

/// Everything that can abort a batch of world updates.
///
/// A kill aimed at a unit that is already gone is not an error; updates log
/// that and carry on.
#[derive(Debug, Error)]
pub enum UpdateError {
    /// A lookup by ID, URN or location failed. The ruleset or state is inconsistent.
    #[error("{record} \"{id}\" not found (looked up by {caller})")]
    RecordNotFound {
        record: &'static str,
        id: String,
        caller: &'static str,
    },

    /// An update reached a state it has no handling for.
    #[error("logic error: {0}")]
    Logic(String),

    #[error("failed to send message to {player}: {reason}")]
    Send { player: PlayerId, reason: String },

    #[error("world updates did not settle after {limit} invocations ({pending} still pending)")]
    IterationLimit { limit: usize, pending: usize },
}

impl UpdateError {
    pub fn not_found(record: &'static str, id: impl std::fmt::Display, caller: &'static str) -> Self {
        Self::RecordNotFound {
            record,
            id: id.to_string(),
            caller,
        }
    }
}

pub type Result<T> = std::result::Result<T, UpdateError>;
