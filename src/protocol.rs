use serde::{Deserialize, Serialize};

use crate::board::RawGrid;
use crate::domain::*;

/// Messages exchanged between a game client and the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Message {
    /// Ask for a fresh player id.
    Register,
    Registered { player_id: String },
    /// Poll whether `reg_id` has been paired.
    RegStatus { reg_id: String },
    RegStatusResp(RegistrationStatus),
    SubmitBoard { player_id: String, field: RawGrid },
    BoardResp(BoardReply),
    Shoot { player_id: String, x: i64, y: i64 },
    ShotResp(ShotReply),
    Status { player_id: String },
    StatusResp(SessionPhase),
    /// The server could not serve the request, e.g. the store is down.
    Error { reason: String },
}
