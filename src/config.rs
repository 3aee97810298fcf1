//! Board dimensions, the required fleet and server tunables.

use core::time::Duration;

pub const BOARD_SIZE: usize = 10;

/// Longest ship allowed on a board.
pub const MAX_SHIP_LEN: usize = 4;

/// Required number of ships for each length, indexed by `length - 1`.
pub const FLEET: [usize; MAX_SHIP_LEN] = [4, 3, 2, 1];

/// Total number of ship cells in a complete fleet.
pub const TOTAL_SHIP_CELLS: usize = 4 + 3 * 2 + 2 * 3 + 4;

/// Ship lengths in the order `Board::random_fleet` places them.
pub const FLEET_LENGTHS: [usize; 10] = [4, 3, 3, 2, 2, 2, 1, 1, 1, 1];

/// Hash map holding each player's serialized board.
pub const GAME_MAP: &str = "game";
/// Hash map holding each player's "0"/"1" turn flag.
pub const TURN_MAP: &str = "turn";
/// Hash map holding each player's opponent id.
pub const MATCHER_MAP: &str = "game_matcher";
/// Hash map holding each player's last-activity Unix timestamp.
pub const TIME_MAP: &str = "time";
/// FIFO of registered players waiting for an opponent.
pub const REG_QUEUE: &str = "reg-queue";
/// Counter used to mint registration ids.
pub const REG_COUNTER: &str = "reg-counter";

/// Every per-player map, in the order the reaper clears them.
pub const PLAYER_MAPS: [&str; 4] = [TIME_MAP, TURN_MAP, GAME_MAP, MATCHER_MAP];

pub const DEFAULT_MATCH_INTERVAL: Duration = Duration::from_secs(3);
pub const DEFAULT_REAP_INTERVAL: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_IDLE_THRESHOLD: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_BIND: &str = "0.0.0.0:8080";

/// Runtime settings for a [`GameServer`](crate::GameServer).
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: std::string::String,
    /// How often the match coordinator polls the registration queue.
    pub match_interval: Duration,
    /// How often the session reaper sweeps for idle players.
    pub reap_interval: Duration,
    /// Sessions idle for longer than this are evicted.
    pub idle_threshold: Duration,
}

#[cfg(feature = "std")]
impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.into(),
            match_interval: DEFAULT_MATCH_INTERVAL,
            reap_interval: DEFAULT_REAP_INTERVAL,
            idle_threshold: DEFAULT_IDLE_THRESHOLD,
        }
    }
}
