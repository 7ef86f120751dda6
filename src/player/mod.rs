//! Player trait and implementations
//!
//! The match loop talks to both seats through this trait, so a human at the
//! terminal, the computer opponent and a remote client are interchangeable:
//! - ComputerPlayer: fires at random unexplored cells
//! - ConsolePlayer: reads moves from a terminal
//! - RemotePlayer: server-side proxy for a connected client

use crate::coord::Coordinate;
use crate::fog::FogBoard;
use crate::game::MoveRejection;

/// What a player decides to do when it holds the turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    Fire(Coordinate),
    /// Leave the match.
    Exit,
}

/// Something a player did while waiting for the opponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleEvent {
    /// Tried to move out of turn.
    LateMove,
    /// Left the match.
    Exit,
}

/// Result of a shot, as reported to each player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShotNotice {
    pub coord: Coordinate,
    pub hit: bool,
    pub sunk: bool,
    pub game_over: bool,
    pub shooter: String,
    pub next: String,
    /// The receiving player fired this shot.
    pub own_shot: bool,
    /// The receiving player moves next.
    pub my_turn: bool,
}

/// How the match ended for one player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameOutcome {
    /// `None` when the match was aborted.
    pub winner: Option<String>,
    pub won: bool,
}

impl GameOutcome {
    pub fn aborted() -> Self {
        Self {
            winner: None,
            won: false,
        }
    }
}

/// Interface implemented by different player types.
#[async_trait::async_trait]
pub trait Player: Send {
    fn name(&self) -> &str;

    /// Choose the next shot given what is known about the opponent's board.
    async fn next_move(&mut self, view: &FogBoard) -> anyhow::Result<Turn>;

    /// Wait for activity while the opponent holds the turn. Local players
    /// never produce any.
    async fn idle(&mut self) -> anyhow::Result<IdleEvent> {
        std::future::pending().await
    }

    /// Inform the player of a resolved shot, its own or the opponent's.
    async fn shot_resolved(&mut self, _notice: &ShotNotice) -> anyhow::Result<()> {
        Ok(())
    }

    async fn move_rejected(&mut self, _reason: &MoveRejection) -> anyhow::Result<()> {
        Ok(())
    }

    async fn error(&mut self, _reason: &str) -> anyhow::Result<()> {
        Ok(())
    }

    async fn game_over(&mut self, _outcome: &GameOutcome) -> anyhow::Result<()> {
        Ok(())
    }

    /// Pick another name after `taken` was refused. `None` gives up.
    async fn rename(&mut self, _taken: &str) -> anyhow::Result<Option<String>> {
        Ok(None)
    }
}

pub mod computer;
pub mod console;
pub mod remote;

pub use computer::ComputerPlayer;
pub use console::ConsolePlayer;
pub use remote::RemotePlayer;
