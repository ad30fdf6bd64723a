use shared::ServerMessage;
use tokio::sync::mpsc;

use std::time::Instant;

pub type Tx = mpsc::UnboundedSender<ServerMessage>;

/// Outbound half of one live socket, keyed by its connection identity.
pub struct Connection {
    pub tx: Tx,
    pub last_msg_at: Option<Instant>,
}

impl Connection {
    pub fn new(tx: Tx) -> Self {
        Self {
            tx,
            last_msg_at: None,
        }
    }
}
