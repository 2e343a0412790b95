use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

pub mod manager;

pub use manager::SessionManager;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// Local record of who is connected and where. The wallet's own
/// authorization is never part of it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub address: Option<Address>,
    pub chain_id: Option<u64>,
    pub state: ConnectionState,
    /// Last session-level problem, including the unsupported-chain warning.
    pub last_error: Option<String>,
    /// Bumped on every identity change.
    pub generation: u64,
}

impl Session {
    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    fn disconnected(generation: u64, last_error: Option<String>) -> Self {
        Self {
            generation,
            last_error,
            ..Self::default()
        }
    }
}
