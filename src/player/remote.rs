use log::warn;

use crate::config::GameConfig;
use crate::coord::MoveCodec;
use crate::fog::FogBoard;
use crate::game::MoveRejection;
use crate::link::{Inbound, Link};
use crate::protocol::{Message, Update};

use super::{GameOutcome, IdleEvent, Player, ShotNotice, Turn};

/// Server-side seat for a connected client.
///
/// Moves arrive as `MOVE` lines; notifications leave as `UPDATE`,
/// `LATE_MOVE`, `ERROR` and `GAMEOVER` lines. Any malformed input during
/// play is answered with `ERROR` and ends the match.
pub struct RemotePlayer {
    name: String,
    link: Link,
    codec: MoveCodec,
}

impl RemotePlayer {
    pub fn new(name: impl Into<String>, link: Link, config: &GameConfig) -> Self {
        Self {
            name: name.into(),
            link,
            codec: MoveCodec::new(config),
        }
    }

    pub fn into_link(self) -> Link {
        self.link
    }

    /// Report a protocol violation to the client and turn it into an error.
    async fn reject(&mut self, reason: String) -> anyhow::Error {
        warn!("{}: {}", self.name, reason);
        let _ = self
            .link
            .send(&Message::Error {
                reason: reason.clone(),
            })
            .await;
        anyhow::anyhow!(reason)
    }
}

#[async_trait::async_trait]
impl Player for RemotePlayer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn next_move(&mut self, _view: &FogBoard) -> anyhow::Result<Turn> {
        match self.link.recv().await {
            Inbound::Message(Message::Move { token }) => match self.codec.decode(&token) {
                Ok(c) => Ok(Turn::Fire(c)),
                Err(e) => Err(self.reject(format!("Bad move {:?}: {}", token, e)).await),
            },
            Inbound::Message(Message::Exit) | Inbound::Closed => Ok(Turn::Exit),
            Inbound::Message(other) => Err(self
                .reject(format!("Unexpected {} during play", other.command()))
                .await),
            Inbound::Malformed(e) => Err(self.reject(e.to_string()).await),
        }
    }

    async fn idle(&mut self) -> anyhow::Result<IdleEvent> {
        match self.link.recv().await {
            Inbound::Message(Message::Move { .. }) => Ok(IdleEvent::LateMove),
            Inbound::Message(Message::Exit) | Inbound::Closed => Ok(IdleEvent::Exit),
            Inbound::Message(other) => Err(self
                .reject(format!("Unexpected {} during play", other.command()))
                .await),
            Inbound::Malformed(e) => Err(self.reject(e.to_string()).await),
        }
    }

    async fn shot_resolved(&mut self, notice: &ShotNotice) -> anyhow::Result<()> {
        self.link
            .send(&Message::Update(Update {
                x: notice.coord.x,
                y: notice.coord.y,
                hit: notice.hit,
                sunk: notice.sunk,
                game_over: notice.game_over,
                shooter: notice.shooter.clone(),
                next: notice.next.clone(),
            }))
            .await
    }

    async fn move_rejected(&mut self, reason: &MoveRejection) -> anyhow::Result<()> {
        match reason {
            MoveRejection::Late => self.link.send(&Message::LateMove).await,
            other => {
                self.link
                    .send(&Message::Error {
                        reason: other.to_string(),
                    })
                    .await
            }
        }
    }

    async fn error(&mut self, reason: &str) -> anyhow::Result<()> {
        self.link
            .send(&Message::Error {
                reason: reason.to_string(),
            })
            .await
    }

    async fn game_over(&mut self, outcome: &GameOutcome) -> anyhow::Result<()> {
        self.link
            .send(&Message::GameOver {
                winner: outcome.winner.clone(),
                won: outcome.won,
            })
            .await
    }
}
