use crate::board::RawGrid;
use crate::domain::{BoardReply, RegistrationStatus, SessionPhase, ShotReply};
use crate::protocol::Message;
use crate::transport::Transport;

/// Typed request helpers over any transport.
pub struct GameClient<T: Transport> {
    transport: T,
}

impl<T: Transport> GameClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    async fn call(&mut self, request: Message) -> anyhow::Result<Message> {
        self.transport.send(request).await?;
        match self.transport.recv().await? {
            Message::Error { reason } => Err(anyhow::anyhow!("server error: {}", reason)),
            reply => Ok(reply),
        }
    }

    pub async fn register(&mut self) -> anyhow::Result<String> {
        match self.call(Message::Register).await? {
            Message::Registered { player_id } => Ok(player_id),
            other => Err(anyhow::anyhow!("Unexpected message: {:?}", other)),
        }
    }

    pub async fn registration_status(&mut self, reg_id: &str) -> anyhow::Result<RegistrationStatus> {
        let request = Message::RegStatus {
            reg_id: reg_id.to_string(),
        };
        match self.call(request).await? {
            Message::RegStatusResp(status) => Ok(status),
            other => Err(anyhow::anyhow!("Unexpected message: {:?}", other)),
        }
    }

    pub async fn submit_board(&mut self, player_id: &str, field: RawGrid) -> anyhow::Result<BoardReply> {
        let request = Message::SubmitBoard {
            player_id: player_id.to_string(),
            field,
        };
        match self.call(request).await? {
            Message::BoardResp(reply) => Ok(reply),
            other => Err(anyhow::anyhow!("Unexpected message: {:?}", other)),
        }
    }

    pub async fn shoot(&mut self, player_id: &str, x: i64, y: i64) -> anyhow::Result<ShotReply> {
        let request = Message::Shoot {
            player_id: player_id.to_string(),
            x,
            y,
        };
        match self.call(request).await? {
            Message::ShotResp(reply) => Ok(reply),
            other => Err(anyhow::anyhow!("Unexpected message: {:?}", other)),
        }
    }

    pub async fn status(&mut self, player_id: &str) -> anyhow::Result<SessionPhase> {
        let request = Message::Status {
            player_id: player_id.to_string(),
        };
        match self.call(request).await? {
            Message::StatusResp(phase) => Ok(phase),
            other => Err(anyhow::anyhow!("Unexpected message: {:?}", other)),
        }
    }
}
