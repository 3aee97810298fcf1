//! Connection serving and lifecycle of the background coordinators.

use std::sync::Arc;

use log::{debug, info, warn};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::clock::Clock;
use crate::config::ServerConfig;
use crate::facade::GameFacade;
use crate::matcher::MatchCoordinator;
use crate::protocol::Message;
use crate::reaper::SessionReaper;
use crate::shutdown::Shutdown;
use crate::store::StateStore;
use crate::transport::tcp::TcpTransport;
use crate::transport::Transport;

/// Answer one request. Store failures become `Message::Error`.
pub async fn dispatch(facade: &GameFacade, msg: Message) -> Message {
    let reply = match msg {
        Message::Register => facade
            .register()
            .await
            .map(|player_id| Message::Registered { player_id }),
        Message::RegStatus { reg_id } => facade
            .registration_status(&reg_id)
            .await
            .map(Message::RegStatusResp),
        Message::SubmitBoard { player_id, field } => facade
            .submit_board(&player_id, &field)
            .await
            .map(Message::BoardResp),
        Message::Shoot { player_id, x, y } => {
            facade.shoot(&player_id, x, y).await.map(Message::ShotResp)
        }
        Message::Status { player_id } => facade
            .session_status(&player_id)
            .await
            .map(Message::StatusResp),
        other => {
            return Message::Error {
                reason: format!("not a request: {:?}", other),
            }
        }
    };
    reply.unwrap_or_else(|e| {
        warn!("request failed: {}", e);
        Message::Error {
            reason: e.to_string(),
        }
    })
}

/// Serve requests from one client until it disconnects.
pub async fn serve_connection<T: Transport>(facade: GameFacade, mut transport: T) -> anyhow::Result<()> {
    while let Ok(msg) = transport.recv().await {
        let reply = dispatch(&facade, msg).await;
        transport.send(reply).await?;
    }
    Ok(())
}

/// Handles of the running match coordinator and session reaper.
pub struct Background {
    matcher: JoinHandle<()>,
    reaper: JoinHandle<()>,
}

impl Background {
    /// Wait for both loops to exit. Trigger shutdown first.
    pub async fn join(self) {
        if let Err(e) = self.matcher.await {
            warn!("match coordinator task failed: {}", e);
        }
        if let Err(e) = self.reaper.await {
            warn!("session reaper task failed: {}", e);
        }
    }
}

pub struct GameServer {
    config: ServerConfig,
    store: Arc<dyn StateStore>,
    clock: Arc<dyn Clock>,
    facade: GameFacade,
    shutdown: Shutdown,
}

impl GameServer {
    pub fn new(config: ServerConfig, store: Arc<dyn StateStore>, clock: Arc<dyn Clock>) -> Self {
        let facade = GameFacade::new(store.clone(), clock.clone());
        Self {
            config,
            store,
            clock,
            facade,
            shutdown: Shutdown::new(),
        }
    }

    pub fn facade(&self) -> GameFacade {
        self.facade.clone()
    }

    /// Handle that stops the server and its background loops.
    pub fn shutdown_handle(&self) -> Shutdown {
        self.shutdown.clone()
    }

    /// Spawn the match coordinator and session reaper.
    pub fn start_background(&self) -> Background {
        let matcher = MatchCoordinator::new(
            self.store.clone(),
            self.config.match_interval,
            self.shutdown.clone(),
        );
        let reaper = SessionReaper::new(
            self.store.clone(),
            self.clock.clone(),
            self.config.reap_interval,
            self.config.idle_threshold,
            self.shutdown.clone(),
        );
        Background {
            matcher: matcher.spawn(),
            reaper: reaper.spawn(),
        }
    }

    pub async fn bind_and_run(self) -> anyhow::Result<()> {
        let listener = TcpListener::bind(&self.config.bind).await?;
        self.run(listener).await
    }

    /// Accept clients until shutdown, then stop the background loops and
    /// wait for them. Open connections are left to finish on their own.
    pub async fn run(self, listener: TcpListener) -> anyhow::Result<()> {
        info!("listening on {}", listener.local_addr()?);
        let background = self.start_background();
        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, addr)) => {
                        debug!("client connected from {}", addr);
                        // Clients may stay quiet between requests for as long
                        // as their session lives.
                        let transport = TcpTransport::with_timeout(stream, self.config.idle_threshold);
                        let facade = self.facade.clone();
                        tokio::spawn(async move {
                            if let Err(e) = serve_connection(facade, transport).await {
                                debug!("connection {} ended: {}", addr, e);
                            }
                        });
                    }
                    Err(e) => warn!("accept failed: {}", e),
                },
                _ = self.shutdown.wait() => break,
            }
        }
        info!("shutting down");
        background.join().await;
        Ok(())
    }
}
