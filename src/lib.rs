mod board;
pub mod client;
mod common;
mod config;
mod coord;
mod field;
mod fog;
mod game;
pub mod link;
pub mod local;
mod logging;
pub mod player;
pub mod protocol;
pub mod server;
pub mod session;
mod ship;
pub mod transport;

pub use board::*;
pub use client::GameClient;
pub use common::*;
pub use config::*;
pub use coord::*;
pub use field::*;
pub use fog::*;
pub use game::*;
pub use link::{Inbound, Link};
pub use local::{LocalGame, LocalReport};
pub use logging::{init_logging, level_from, LOG_ENV};
pub use player::*;
pub use protocol::*;
pub use server::{Lobby, NameCollision, Server};
pub use session::play;
pub use ship::*;
pub use transport::in_memory::InMemoryTransport;
pub use transport::tcp::TcpTransport;
pub use transport::Transport;
