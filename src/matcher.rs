//! Background pairing of queued players.

use std::collections::VecDeque;
use std::sync::Arc;

use log::{debug, info, warn};
use tokio::task::JoinHandle;
use tokio::time::Duration;

use crate::config::{MATCHER_MAP, REG_QUEUE, TIME_MAP, TURN_MAP};
use crate::shutdown::Shutdown;
use crate::store::StateStore;

/// Two players bound as opponents. `first` moves first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pairing {
    pub first: String,
    pub second: String,
}

/// Drains the registration queue two players at a time.
///
/// The queue is polled every `interval`. A player popped while the queue
/// holds nobody else is kept aside, never pushed back, and paired with the
/// next arrival. Players whose session was evicted while they waited are
/// dropped instead of paired. The four writes that bind a pair are separate
/// store calls, so a status poll can briefly see one side paired and not
/// the other; a pair whose writes failed is retried on the next pass.
pub struct MatchCoordinator {
    store: Arc<dyn StateStore>,
    interval: Duration,
    shutdown: Shutdown,
    held: VecDeque<String>,
    pending: Option<Pairing>,
}

impl MatchCoordinator {
    pub fn new(store: Arc<dyn StateStore>, interval: Duration, shutdown: Shutdown) -> Self {
        Self {
            store,
            interval,
            shutdown,
            held: VecDeque::new(),
            pending: None,
        }
    }

    /// Player popped from the queue and still waiting for an opponent.
    pub fn waiting(&self) -> Option<&str> {
        self.held.front().map(String::as_str)
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Poll until shutdown. A pair being written when shutdown arrives is
    /// always finished first.
    pub async fn run(mut self) {
        info!("match coordinator started (poll every {:?})", self.interval);
        loop {
            if self.shutdown.is_triggered() {
                break;
            }
            match self.pair_next().await {
                // Keep draining while the queue has players.
                Ok(Some(_)) => continue,
                Ok(None) => {}
                Err(e) => warn!("match coordinator: store error: {}", e),
            }
            if !self.shutdown.sleep(self.interval).await {
                break;
            }
        }
        self.release().await;
        info!("match coordinator stopped");
    }

    /// Try to complete one pair. Returns `None` while fewer than two live
    /// players are available. On error every popped player is still held
    /// by the coordinator.
    pub async fn pair_next(&mut self) -> anyhow::Result<Option<Pairing>> {
        let pairing = match self.pending.take() {
            Some(pairing) => pairing,
            None => match self.take_pair().await? {
                Some(pairing) => pairing,
                None => return Ok(None),
            },
        };
        if let Err(e) = self.bind(&pairing).await {
            self.pending = Some(pairing);
            return Err(e);
        }
        info!("paired {} with {}", pairing.first, pairing.second);
        Ok(Some(pairing))
    }

    async fn take_pair(&mut self) -> anyhow::Result<Option<Pairing>> {
        loop {
            while self.held.len() < 2 {
                match self.store.lpop(REG_QUEUE).await? {
                    Some(id) => self.held.push_back(id),
                    None => break,
                }
            }
            let before = self.held.len();
            self.drop_evicted().await?;
            if self.held.len() == before {
                break;
            }
        }
        if self.held.len() < 2 {
            if let Some(id) = self.held.front() {
                debug!("player {} waiting for an opponent", id);
            }
            return Ok(None);
        }
        match (self.held.pop_front(), self.held.pop_front()) {
            (Some(first), Some(second)) => Ok(Some(Pairing { first, second })),
            _ => Ok(None),
        }
    }

    // Eviction leaves only the queue entry behind; pairing such an id would
    // write entries the reaper can no longer find.
    async fn drop_evicted(&mut self) -> anyhow::Result<()> {
        let mut i = 0;
        while i < self.held.len() {
            if self.store.hget(TIME_MAP, &self.held[i]).await?.is_some() {
                i += 1;
            } else if let Some(id) = self.held.remove(i) {
                info!("dropping player {} from matchmaking: session expired", id);
            }
        }
        Ok(())
    }

    async fn bind(&self, pairing: &Pairing) -> anyhow::Result<()> {
        let (a, b) = (pairing.first.as_str(), pairing.second.as_str());
        self.store.hset(TURN_MAP, a, "1").await?;
        self.store.hset(TURN_MAP, b, "0").await?;
        self.store.hset(MATCHER_MAP, a, b).await?;
        self.store.hset(MATCHER_MAP, b, a).await?;
        Ok(())
    }

    // Nobody popped from the queue may be lost at shutdown: a half-written
    // pair gets one more attempt, and everyone else goes back on the queue
    // so a later coordinator over the same store can pair them.
    async fn release(&mut self) {
        if let Some(pairing) = self.pending.take() {
            match self.bind(&pairing).await {
                Ok(()) => info!("paired {} with {}", pairing.first, pairing.second),
                Err(e) => {
                    warn!("could not finish pairing at shutdown: {}", e);
                    self.held.push_front(pairing.second);
                    self.held.push_front(pairing.first);
                }
            }
        }
        while let Some(id) = self.held.pop_front() {
            match self.store.rpush(REG_QUEUE, &id).await {
                Ok(_) => info!("returned unpaired player {} to the queue", id),
                Err(e) => warn!("could not requeue player {}: {}", id, e),
            }
        }
    }
}
