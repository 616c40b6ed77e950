//! Client connections backed by tokio channels.
//!
//! The engine pushes messages synchronously while it processes updates; each
//! human player's receiving half is drained by its own task, which owns the
//! actual transport.

use tokio::sync::mpsc;

use realm_engine::error::{Result, UpdateError};
use realm_engine::messages::{ClientConnection, ServerMessage};
use realm_engine::world::player::PlayerId;

pub struct ChannelConnection {
    player_id: PlayerId,
    tx: mpsc::UnboundedSender<ServerMessage>,
}

/// A connection for `player_id` and the receiver its messages arrive on.
pub fn channel(player_id: PlayerId) -> (ChannelConnection, mpsc::UnboundedReceiver<ServerMessage>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ChannelConnection { player_id, tx }, rx)
}

impl ClientConnection for ChannelConnection {
    fn send(&mut self, message: ServerMessage) -> Result<()> {
        self.tx.send(message).map_err(|_| UpdateError::Send {
            player: self.player_id,
            reason: "client channel closed".into(),
        })
    }
}

/// Drain a player's messages, logging each as JSON. Returns how many arrived
/// before the session dropped the sending half.
pub async fn log_messages(player_id: PlayerId, mut rx: mpsc::UnboundedReceiver<ServerMessage>) -> usize {
    let mut received = 0;
    while let Some(message) = rx.recv().await {
        received += 1;
        match serde_json::to_string(&message) {
            Ok(json) => tracing::info!("-> {}: {}", player_id, json),
            Err(e) => tracing::warn!("-> {}: unserializable message: {}", player_id, e),
        }
    }
    tracing::debug!("Connection for {} closed after {} messages", player_id, received);
    received
}
