//! Background eviction of idle sessions.

use std::sync::Arc;

use log::{info, warn};
use tokio::task::JoinHandle;
use tokio::time::Duration;

use crate::clock::Clock;
use crate::config::{PLAYER_MAPS, TIME_MAP};
use crate::shutdown::Shutdown;
use crate::store::StateStore;

/// Periodically removes every per-player entry of players whose last
/// activity is older than the idle threshold.
pub struct SessionReaper {
    store: Arc<dyn StateStore>,
    clock: Arc<dyn Clock>,
    interval: Duration,
    idle_threshold: Duration,
    shutdown: Shutdown,
}

impl SessionReaper {
    pub fn new(
        store: Arc<dyn StateStore>,
        clock: Arc<dyn Clock>,
        interval: Duration,
        idle_threshold: Duration,
        shutdown: Shutdown,
    ) -> Self {
        Self {
            store,
            clock,
            interval,
            idle_threshold,
            shutdown,
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Sweep once per interval until shutdown. The first sweep happens one
    /// full interval after start.
    pub async fn run(self) {
        info!(
            "session reaper started (every {:?}, idle after {:?})",
            self.interval, self.idle_threshold
        );
        while self.shutdown.sleep(self.interval).await {
            match self.sweep().await {
                Ok(evicted) if !evicted.is_empty() => {
                    info!("evicted {} idle session(s): {:?}", evicted.len(), evicted)
                }
                Ok(_) => {}
                Err(e) => warn!("session reaper: store error: {}", e),
            }
        }
        info!("session reaper stopped");
    }

    /// Evict every player idle for longer than the threshold and return
    /// their ids. Deletion runs map by map; a failure on one map is logged
    /// and the remaining maps are still cleared.
    pub async fn sweep(&self) -> anyhow::Result<Vec<String>> {
        let now = self.clock.now_secs();
        let threshold = self.idle_threshold.as_secs();
        let mut idle = Vec::new();
        for id in self.store.hkeys(TIME_MAP).await? {
            // Gone since hkeys: another sweep or a concurrent delete.
            let Some(raw) = self.store.hget(TIME_MAP, &id).await? else {
                continue;
            };
            let last_seen = raw.parse::<u64>().unwrap_or(0);
            if now.saturating_sub(last_seen) > threshold {
                idle.push(id);
            }
        }
        if idle.is_empty() {
            return Ok(idle);
        }

        let mut first_err = None;
        for map in PLAYER_MAPS {
            if let Err(e) = self.store.hdel(map, &idle).await {
                warn!("failed to clear {} for idle players: {}", map, e);
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(idle),
        }
    }
}
