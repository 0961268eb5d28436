use serde::{Deserialize, Serialize};

use crate::core::config::StatusConfig;

/// Display-only snapshot of the game server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerStatus {
    pub online: bool,
    pub players: u32,
    pub max_players: u32,
}

impl From<&StatusConfig> for ServerStatus {
    fn from(config: &StatusConfig) -> Self {
        Self {
            online: config.online,
            players: config.players,
            max_players: config.max_players,
        }
    }
}

impl std::fmt::Display for ServerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = if self.online { "ONLINE" } else { "OFFLINE" };
        write!(f, "{} {} / {}", state, self.players, self.max_players)
    }
}
