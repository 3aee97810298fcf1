//! Reply values returned by the game facade and carried on the wire.
//!
//! None of these are errors: every rule outcome is an ordinary value the
//! caller can act on or retry.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::common::ShotOutcome;
use crate::validator::FleetCounts;

/// Request rejected before any game logic ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rejection {
    MissingPlayerId,
    BadCoordinates { x: i64, y: i64 },
    MalformedBoard(String),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::MissingPlayerId => write!(f, "Wrong player_id"),
            Rejection::BadCoordinates { x, y } => write!(f, "wrong coords ({}, {})", x, y),
            Rejection::MalformedBoard(e) => write!(f, "Malformed board: {}", e),
        }
    }
}

/// Session state the request needs is missing. Retry later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotReady {
    /// The caller has no stored board.
    OwnBoard,
    /// The caller has not been paired, or the pairing was evicted.
    Opponent,
    /// The opponent has no stored board.
    OpponentBoard,
}

impl fmt::Display for NotReady {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotReady::OwnBoard => write!(f, "your field is broken"),
            NotReady::Opponent => write!(f, "player_id is broken"),
            NotReady::OpponentBoard => write!(f, "enemy field is broken"),
        }
    }
}

/// Result of validating a submitted layout, in the shape clients expect:
/// `{"status": bool, "ships": {"1": n, "2": n, "3": n, "4": n}}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardReport {
    pub status: bool,
    pub ships: FleetCounts,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoardReply {
    Report(BoardReport),
    /// The stored board has already been hit; it can no longer change.
    Locked,
    Rejected(Rejection),
}

impl fmt::Display for BoardReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardReply::Report(r) => match serde_json::to_string(r) {
                Ok(json) => f.write_str(&json),
                Err(_) => Err(fmt::Error),
            },
            BoardReply::Locked => write!(f, "Board is locked: game in progress"),
            BoardReply::Rejected(r) => write!(f, "{}", r),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShotReply {
    Outcome(ShotOutcome),
    NotYourTurn,
    YouWin,
    YouLose,
    NotReady(NotReady),
    Rejected(Rejection),
}

impl fmt::Display for ShotReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShotReply::Outcome(o) => write!(f, "{}", o),
            ShotReply::NotYourTurn => write!(f, "Not your turn"),
            ShotReply::YouWin => write!(f, "You win"),
            ShotReply::YouLose => write!(f, "You lose"),
            ShotReply::NotReady(n) => write!(f, "{}", n),
            ShotReply::Rejected(r) => write!(f, "{}", r),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistrationStatus {
    Waiting,
    Paired(String),
    Rejected(Rejection),
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrationStatus::Waiting => write!(f, "Wait"),
            RegistrationStatus::Paired(id) => write!(f, "{}", id),
            RegistrationStatus::Rejected(r) => write!(f, "{}", r),
        }
    }
}

/// Where a player's session stands, derived from the separate store
/// entries on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Nothing is stored for this player.
    Unknown,
    /// Registered, not yet paired.
    Queued,
    /// Paired; at least one side has no board.
    AwaitingBoards,
    InProgress { my_turn: bool },
    Finished { won: bool },
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionPhase::Unknown => write!(f, "Unknown player"),
            SessionPhase::Queued => write!(f, "Wait"),
            SessionPhase::AwaitingBoards => write!(f, "Waiting for boards"),
            SessionPhase::InProgress { my_turn: true } => write!(f, "Your turn"),
            SessionPhase::InProgress { my_turn: false } => write!(f, "Opponent's turn"),
            SessionPhase::Finished { won: true } => write!(f, "You win"),
            SessionPhase::Finished { won: false } => write!(f, "You lose"),
        }
    }
}
