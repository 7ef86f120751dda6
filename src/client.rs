//! Client side of the protocol: handshake, board submission and play,
//! with moves supplied by any `Player`.

use log::{debug, info, warn};
use rand::rngs::SmallRng;

use crate::board::Board;
use crate::config::GameConfig;
use crate::coord::{Coordinate, MoveCodec};
use crate::fog::FogBoard;
use crate::game::MoveRejection;
use crate::link::{Inbound, Link};
use crate::player::{GameOutcome, Player, ShotNotice, Turn};
use crate::protocol::{Message, ProtocolCodec, Update};
use crate::transport::Transport;

/// Number of fresh boards offered after the server rejects one.
const BOARD_RETRIES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Handshake,
    Lobby,
    Setup,
    Play,
}

enum Event {
    Turn(anyhow::Result<Turn>),
    Inbound(Inbound),
}

pub struct GameClient<P> {
    config: GameConfig,
    link: Link,
    player: P,
    rng: SmallRng,
    codec: MoveCodec,
    phase: Phase,
    name: String,
    enemy: Option<String>,
    board: Option<Board>,
    view: FogBoard,
    my_turn: bool,
    /// A `MOVE` was sent and its `UPDATE` has not arrived yet.
    awaiting_update: bool,
    board_retries: usize,
}

impl<P: Player> GameClient<P> {
    pub fn new(config: GameConfig, transport: Box<dyn Transport>, player: P, rng: SmallRng) -> Self {
        let link = Link::new(transport, ProtocolCodec::new(config.delimiter));
        let name = player.name().to_string();
        Self {
            codec: MoveCodec::new(&config),
            view: FogBoard::new(config.width, config.height),
            config,
            link,
            player,
            rng,
            phase: Phase::Handshake,
            name,
            enemy: None,
            board: None,
            my_turn: false,
            awaiting_update: false,
            board_retries: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn enemy(&self) -> Option<&str> {
        self.enemy.as_deref()
    }

    /// Our own board once it has been submitted.
    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    pub fn view(&self) -> &FogBoard {
        &self.view
    }

    /// Play one session to its end and report how it went.
    pub async fn run(&mut self) -> anyhow::Result<GameOutcome> {
        self.link.set_label("server");
        self.link
            .send(&Message::Handshake {
                name: Some(self.name.clone()),
            })
            .await?;

        loop {
            let event = if self.phase == Phase::Play && self.my_turn && !self.awaiting_update {
                tokio::select! {
                    turn = self.player.next_move(&self.view) => Event::Turn(turn),
                    inbound = self.link.recv() => Event::Inbound(inbound),
                }
            } else {
                Event::Inbound(self.link.recv().await)
            };

            match event {
                Event::Turn(Ok(Turn::Fire(c))) => self.fire(c).await?,
                Event::Turn(Ok(Turn::Exit)) => {
                    info!("{} leaves the game", self.name);
                    let _ = self.link.send(&Message::Exit).await;
                    let _ = self.link.close().await;
                    let outcome = GameOutcome::aborted();
                    self.player.game_over(&outcome).await?;
                    return Ok(outcome);
                }
                Event::Turn(Err(e)) => {
                    let _ = self.link.send(&Message::Exit).await;
                    let _ = self.link.close().await;
                    return Err(e);
                }
                Event::Inbound(Inbound::Message(msg)) => {
                    if let Some(outcome) = self.handle(msg).await? {
                        let _ = self.link.close().await;
                        return Ok(outcome);
                    }
                }
                Event::Inbound(Inbound::Malformed(e)) => {
                    warn!("Ignoring malformed message from server: {}", e);
                }
                Event::Inbound(Inbound::Closed) => {
                    return Err(anyhow::anyhow!("Server closed the connection"));
                }
            }
        }
    }

    async fn fire(&mut self, c: Coordinate) -> anyhow::Result<()> {
        let token = self.codec.encode(c).map_err(|e| anyhow::anyhow!(e))?;
        debug!("{} fires at {}", self.name, token);
        self.link.send(&Message::Move { token }).await?;
        self.awaiting_update = true;
        Ok(())
    }

    async fn submit_board(&mut self) -> anyhow::Result<()> {
        let board = Board::random(&self.config, &mut self.rng).map_err(|e| anyhow::anyhow!(e))?;
        let fields = board.encode_fields();
        self.board = Some(board);
        self.link.send(&Message::ClientBoard { fields }).await
    }

    /// Handle one server message; `Some` once the game is over.
    async fn handle(&mut self, msg: Message) -> anyhow::Result<Option<GameOutcome>> {
        match msg {
            Message::Handshake { .. } if self.phase == Phase::Handshake => {
                info!("Joined as {}", self.name);
                self.phase = Phase::Lobby;
            }
            Message::NameExists => {
                info!("Name {} is taken", self.name);
                match self.player.rename(&self.name).await? {
                    Some(name) => {
                        self.name = name;
                        self.link
                            .send(&Message::Handshake {
                                name: Some(self.name.clone()),
                            })
                            .await?;
                    }
                    None => {
                        let _ = self.link.send(&Message::Exit).await;
                        return Err(anyhow::anyhow!("Name {} is already taken", self.name));
                    }
                }
            }
            Message::EnemyName { name } => {
                info!("Paired with {}", name);
                self.enemy = Some(name);
                self.phase = Phase::Setup;
                self.submit_board().await?;
            }
            Message::Error { reason } if self.phase == Phase::Setup => {
                warn!("Board rejected: {}", reason);
                if self.board_retries >= BOARD_RETRIES {
                    let _ = self.link.send(&Message::Exit).await;
                    return Err(anyhow::anyhow!("Board rejected: {}", reason));
                }
                self.board_retries += 1;
                self.submit_board().await?;
            }
            Message::Error { reason } => {
                warn!("Server reported: {}", reason);
                self.awaiting_update = false;
                self.player.error(&reason).await?;
            }
            Message::Setup { first } => {
                info!("Game starts, {} moves first", first);
                self.phase = Phase::Play;
                self.my_turn = first == self.name;
            }
            Message::Update(update) => self.apply_update(update).await?,
            Message::LateMove => {
                self.awaiting_update = false;
                self.player.move_rejected(&MoveRejection::Late).await?;
            }
            Message::GameOver { winner, won } => {
                let outcome = GameOutcome { winner, won };
                info!("Game over: {:?}", outcome);
                self.player.game_over(&outcome).await?;
                return Ok(Some(outcome));
            }
            other => warn!("Ignoring unexpected {}", other.command()),
        }
        Ok(None)
    }

    async fn apply_update(&mut self, update: Update) -> anyhow::Result<()> {
        let coord = Coordinate::new(update.x, update.y);
        let own_shot = update.shooter == self.name;
        if own_shot {
            self.view.record(coord, update.hit, update.sunk);
            self.awaiting_update = false;
        } else if let Some(board) = self.board.as_mut() {
            if let Err(e) = board.apply_shot(coord) {
                warn!("Update for {} does not fit our board: {}", coord, e);
            }
        }
        self.my_turn = update.next == self.name;
        let notice = ShotNotice {
            coord,
            hit: update.hit,
            sunk: update.sunk,
            game_over: update.game_over,
            shooter: update.shooter,
            next: update.next,
            own_shot,
            my_turn: self.my_turn,
        };
        self.player.shot_resolved(&notice).await
    }
}
