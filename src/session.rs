//! One player's session, assembled from the per-player store entries.

use log::warn;

use crate::board::Board;
use crate::config::{GAME_MAP, MATCHER_MAP, TIME_MAP, TURN_MAP};
use crate::domain::SessionPhase;
use crate::game::{status, GameStatus};
use crate::store::StateStore;

/// Read a stored board. An undecodable value is logged and treated as
/// absent so callers report "not ready" instead of failing.
pub async fn load_board(store: &dyn StateStore, player_id: &str) -> anyhow::Result<Option<Board>> {
    let Some(json) = store.hget(GAME_MAP, player_id).await? else {
        return Ok(None);
    };
    match Board::from_json(&json) {
        Ok(board) => Ok(Some(board)),
        Err(e) => {
            warn!("stored board for player {} is unreadable: {}", player_id, e);
            Ok(None)
        }
    }
}

pub async fn save_board(store: &dyn StateStore, player_id: &str, board: &Board) -> anyhow::Result<()> {
    store.hset(GAME_MAP, player_id, &board.to_json()).await
}

/// Non-empty opponent id for `player_id`, if paired.
pub async fn load_opponent(store: &dyn StateStore, player_id: &str) -> anyhow::Result<Option<String>> {
    Ok(store
        .hget(MATCHER_MAP, player_id)
        .await?
        .filter(|id| !id.is_empty()))
}

/// Point-in-time view of everything stored about one player. The fields
/// are read one by one, so a concurrent writer or reaper pass can leave
/// the view mixed; [`phase`](Self::phase) never fails on such mixes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub player_id: String,
    pub board: Option<Board>,
    pub has_turn: bool,
    pub opponent: Option<String>,
    pub opponent_board: Option<Board>,
    pub last_seen: Option<u64>,
}

impl SessionSnapshot {
    pub async fn load(store: &dyn StateStore, player_id: &str) -> anyhow::Result<Self> {
        let board = load_board(store, player_id).await?;
        let has_turn = store.hget(TURN_MAP, player_id).await?.as_deref() == Some("1");
        let opponent = load_opponent(store, player_id).await?;
        let opponent_board = match &opponent {
            Some(id) => load_board(store, id).await?,
            None => None,
        };
        let last_seen = store
            .hget(TIME_MAP, player_id)
            .await?
            .and_then(|t| t.parse().ok());
        Ok(Self {
            player_id: player_id.to_string(),
            board,
            has_turn,
            opponent,
            opponent_board,
            last_seen,
        })
    }

    pub fn phase(&self) -> SessionPhase {
        let (Some(mine), Some(theirs)) = (&self.board, &self.opponent_board) else {
            return match (&self.opponent, &self.board, self.last_seen) {
                (Some(_), _, _) => SessionPhase::AwaitingBoards,
                (None, None, None) => SessionPhase::Unknown,
                (None, _, _) => SessionPhase::Queued,
            };
        };
        match status(mine, theirs) {
            GameStatus::Lost => SessionPhase::Finished { won: false },
            GameStatus::Won => SessionPhase::Finished { won: true },
            GameStatus::InProgress => SessionPhase::InProgress {
                my_turn: self.has_turn,
            },
        }
    }
}
