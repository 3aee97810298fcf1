#![cfg_attr(not(feature = "std"), no_std)]

mod board;
mod common;
mod config;
mod game;
mod validator;

#[cfg(feature = "std")]
mod client;
#[cfg(feature = "std")]
mod clock;
#[cfg(feature = "std")]
pub mod domain;
#[cfg(feature = "std")]
mod facade;
#[cfg(feature = "std")]
mod logging;
#[cfg(feature = "std")]
mod matcher;
#[cfg(feature = "std")]
pub mod protocol;
#[cfg(feature = "std")]
mod reaper;
#[cfg(feature = "std")]
pub mod server;
#[cfg(feature = "std")]
mod session;
#[cfg(feature = "std")]
mod shutdown;
#[cfg(feature = "std")]
pub mod store;
#[cfg(feature = "std")]
pub mod transport;

pub use board::*;
pub use common::*;
pub use config::*;
pub use game::*;
pub use validator::*;

#[cfg(feature = "std")]
pub use client::GameClient;
#[cfg(feature = "std")]
pub use clock::{Clock, ManualClock, SystemClock};
#[cfg(feature = "std")]
pub use domain::*;
#[cfg(feature = "std")]
pub use facade::GameFacade;
#[cfg(feature = "std")]
pub use logging::{init_logging, LogFilter};
#[cfg(feature = "std")]
pub use matcher::{MatchCoordinator, Pairing};
#[cfg(feature = "std")]
pub use protocol::Message;
#[cfg(feature = "std")]
pub use reaper::SessionReaper;
#[cfg(feature = "std")]
pub use server::{GameServer, serve_connection};
#[cfg(feature = "std")]
pub use session::SessionSnapshot;
#[cfg(feature = "std")]
pub use shutdown::Shutdown;
#[cfg(feature = "std")]
pub use store::{in_memory::InMemoryStore, StateStore};
#[cfg(feature = "std")]
pub use transport::{in_memory::InMemoryTransport, tcp::TcpTransport, Transport};
