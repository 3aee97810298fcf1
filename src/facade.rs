//! Request handling: registration, board submission, shots and status.
//!
//! Every call reads fresh state from the store, computes, and writes back.
//! Nothing is cached in-process and nothing is locked; concurrent requests
//! are safe because each store call is atomic and repeated shots at a hit
//! cell are harmless misses.

use std::sync::Arc;

use log::{debug, info};

use crate::board::{Board, Cell};
use crate::clock::Clock;
use crate::config::{BOARD_SIZE, REG_COUNTER, REG_QUEUE, TIME_MAP, TURN_MAP};
use crate::domain::{
    BoardReply, BoardReport, NotReady, RegistrationStatus, Rejection, SessionPhase, ShotReply,
};
use crate::game::{all_sunk, resolve_shot};
use crate::session::{load_board, load_opponent, save_board, SessionSnapshot};
use crate::store::StateStore;
use crate::validator::{validate, Verdict};

#[derive(Clone)]
pub struct GameFacade {
    store: Arc<dyn StateStore>,
    clock: Arc<dyn Clock>,
}

impl GameFacade {
    pub fn new(store: Arc<dyn StateStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    async fn touch(&self, player_id: &str) -> anyhow::Result<()> {
        let now = self.clock.now_secs().to_string();
        self.store.hset(TIME_MAP, player_id, &now).await
    }

    /// Mint a new player id and queue it for matchmaking. Ids are "0",
    /// "1", ... and are never reused while the store lives.
    pub async fn register(&self) -> anyhow::Result<String> {
        let id = (self.store.incr(REG_COUNTER).await? - 1).to_string();
        self.touch(&id).await?;
        self.store.rpush(REG_QUEUE, &id).await?;
        info!("registered player {}", id);
        Ok(id)
    }

    /// Opponent id once paired, otherwise `Waiting`. Only a live session
    /// has its activity refreshed; unknown or evicted ids stay unknown.
    pub async fn registration_status(&self, reg_id: &str) -> anyhow::Result<RegistrationStatus> {
        if reg_id.is_empty() {
            return Ok(RegistrationStatus::Rejected(Rejection::MissingPlayerId));
        }
        let opponent = load_opponent(self.store.as_ref(), reg_id).await?;
        if self.store.hget(TIME_MAP, reg_id).await?.is_some() {
            self.touch(reg_id).await?;
        }
        Ok(match opponent {
            Some(id) => RegistrationStatus::Paired(id),
            None => RegistrationStatus::Waiting,
        })
    }

    /// Validate a layout and store it when it is a complete fleet.
    pub async fn submit_board(&self, player_id: &str, grid: &[Vec<u64>]) -> anyhow::Result<BoardReply> {
        if player_id.is_empty() {
            return Ok(BoardReply::Rejected(Rejection::MissingPlayerId));
        }
        self.touch(player_id).await?;
        let board = match Board::from_grid(grid) {
            Ok(board) => board,
            Err(e) => {
                debug!("player {} sent a malformed board: {}", player_id, e);
                return Ok(BoardReply::Rejected(Rejection::MalformedBoard(e.to_string())));
            }
        };
        // Hit cells come only from shots, never from a client.
        if let Some((x, y)) = first_hit(&board) {
            let verdict = Verdict::Malformed { x, y };
            debug!("player {} sent a pre-hit board: {}", player_id, verdict);
            return Ok(BoardReply::Rejected(Rejection::MalformedBoard(verdict.to_string())));
        }
        if self.board_locked(player_id).await? {
            return Ok(BoardReply::Locked);
        }
        let validation = validate(&board);
        if validation.is_valid() {
            save_board(self.store.as_ref(), player_id, &board).await?;
            info!("player {} submitted a valid board", player_id);
        } else {
            debug!("player {} board rejected: {}", player_id, validation.verdict);
        }
        Ok(BoardReply::Report(BoardReport {
            status: validation.is_valid(),
            ships: validation.counts,
        }))
    }

    /// A stored board is final once the opponent's board is also stored,
    /// since shots can be fired from then on, or once it has been hit.
    async fn board_locked(&self, player_id: &str) -> anyhow::Result<bool> {
        let store = self.store.as_ref();
        let Some(stored) = load_board(store, player_id).await? else {
            return Ok(false);
        };
        if stored.count(Cell::HitShip) > 0 {
            return Ok(true);
        }
        match load_opponent(store, player_id).await? {
            Some(enemy_id) => Ok(load_board(store, &enemy_id).await?.is_some()),
            None => Ok(false),
        }
    }

    /// Fire at `(x, y)` on the opponent's board.
    pub async fn shoot(&self, player_id: &str, x: i64, y: i64) -> anyhow::Result<ShotReply> {
        if player_id.is_empty() {
            return Ok(ShotReply::Rejected(Rejection::MissingPlayerId));
        }
        let in_range = |v: i64| (0..BOARD_SIZE as i64).contains(&v);
        if !in_range(x) || !in_range(y) {
            return Ok(ShotReply::Rejected(Rejection::BadCoordinates { x, y }));
        }
        let (x, y) = (x as usize, y as usize);
        let store = self.store.as_ref();

        self.touch(player_id).await?;
        let Some(mine) = load_board(store, player_id).await? else {
            return Ok(ShotReply::NotReady(NotReady::OwnBoard));
        };
        if all_sunk(&mine) {
            return Ok(ShotReply::YouLose);
        }
        let Some(enemy_id) = load_opponent(store, player_id).await? else {
            return Ok(ShotReply::NotReady(NotReady::Opponent));
        };
        let Some(mut theirs) = load_board(store, &enemy_id).await? else {
            return Ok(ShotReply::NotReady(NotReady::OpponentBoard));
        };
        // Being shot at keeps the opponent's session alive too.
        self.touch(&enemy_id).await?;
        if all_sunk(&theirs) {
            return Ok(ShotReply::YouWin);
        }
        if store.hget(TURN_MAP, player_id).await?.as_deref() != Some("1") {
            return Ok(ShotReply::NotYourTurn);
        }

        let before = theirs;
        let outcome = resolve_shot(&mut theirs, x, y);
        if theirs != before {
            save_board(store, &enemy_id, &theirs).await?;
        }
        store.hset(TURN_MAP, player_id, "0").await?;
        store.hset(TURN_MAP, &enemy_id, "1").await?;
        debug!("player {} shot ({}, {}): {}", player_id, x, y, outcome);
        Ok(ShotReply::Outcome(outcome))
    }

    /// Derived session state for `player_id`.
    pub async fn session_status(&self, player_id: &str) -> anyhow::Result<SessionPhase> {
        let snapshot = SessionSnapshot::load(self.store.as_ref(), player_id).await?;
        if snapshot.phase() != SessionPhase::Unknown {
            self.touch(player_id).await?;
        }
        Ok(snapshot.phase())
    }
}

fn first_hit(board: &Board) -> Option<(usize, usize)> {
    (0..BOARD_SIZE)
        .flat_map(|x| (0..BOARD_SIZE).map(move |y| (x, y)))
        .find(|&(x, y)| board.get(x, y) == Some(Cell::HitShip))
}
