//! Pairing server: accepts clients, runs the name handshake, pairs clients
//! two at a time and hosts the match between them.

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use log::{info, warn};
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Mutex};

use crate::board::Board;
use crate::config::GameConfig;
use crate::game::{Match, MatchStatus, Side};
use crate::link::{Inbound, Link};
use crate::player::RemotePlayer;
use crate::protocol::{Message, ProtocolCodec};
use crate::session::play;
use crate::transport::tcp::TcpTransport;
use crate::transport::Transport;

/// The requested name belongs to a connected participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameCollision(pub String);

impl fmt::Display for NameCollision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name {:?} is already taken", self.0)
    }
}

impl std::error::Error for NameCollision {}

/// A client that completed the handshake.
pub struct Seat {
    pub name: String,
    pub link: Link,
}

/// The client parked in the lobby. An arriving opponent hands its seat over
/// through `handoff`; the parked client's task then hosts the match.
struct Waiting {
    id: u64,
    name: String,
    handoff: oneshot::Sender<Seat>,
}

/// Outcome of entering the lobby.
enum Pairing {
    /// The seat went to the waiting client's task.
    Handed,
    /// Nobody was waiting; this seat is parked until an opponent arrives.
    Parked {
        id: u64,
        seat: Seat,
        opponent: oneshot::Receiver<Seat>,
    },
}

/// Names in use and the client waiting for an opponent.
#[derive(Default)]
pub struct Lobby {
    names: Mutex<HashSet<String>>,
    waiting: Mutex<Option<Waiting>>,
    next_id: AtomicU64,
}

impl Lobby {
    pub async fn register(&self, name: &str) -> Result<(), NameCollision> {
        let mut names = self.names.lock().await;
        if names.contains(name) {
            return Err(NameCollision(name.to_string()));
        }
        names.insert(name.to_string());
        Ok(())
    }

    pub async fn unregister(&self, name: &str) {
        self.names.lock().await.remove(name);
    }

    pub async fn is_registered(&self, name: &str) -> bool {
        self.names.lock().await.contains(name)
    }

    /// Name of the client currently waiting for an opponent.
    pub async fn waiting(&self) -> Option<String> {
        self.waiting.lock().await.as_ref().map(|w| w.name.clone())
    }

    /// Hand `seat` to the waiting client, or park it if nobody is waiting.
    async fn join(&self, mut seat: Seat) -> Pairing {
        let mut waiting = self.waiting.lock().await;
        if let Some(parked) = waiting.take() {
            match parked.handoff.send(seat) {
                Ok(()) => {
                    info!("Handing over to {}", parked.name);
                    return Pairing::Handed;
                }
                // the waiting task is already gone
                Err(back) => seat = back,
            }
        }
        let (handoff, opponent) = oneshot::channel();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        info!("{} is waiting for an opponent", seat.name);
        *waiting = Some(Waiting {
            id,
            name: seat.name.clone(),
            handoff,
        });
        Pairing::Parked { id, seat, opponent }
    }

    /// Clear the waiting slot if it still belongs to `id`. `false` means an
    /// opponent has already been handed over.
    async fn leave(&self, id: u64) -> bool {
        let mut waiting = self.waiting.lock().await;
        if waiting.as_ref().is_some_and(|w| w.id == id) {
            *waiting = None;
            true
        } else {
            false
        }
    }
}

enum LobbyEvent {
    Opponent(Result<Seat, oneshot::error::RecvError>),
    Inbound(Inbound),
}

enum Setup {
    Ready(Board, Board),
    Aborted,
}

pub struct Server {
    config: Arc<GameConfig>,
    lobby: Lobby,
}

impl Server {
    pub fn new(config: GameConfig) -> Arc<Self> {
        Arc::new(Self {
            config: Arc::new(config),
            lobby: Lobby::default(),
        })
    }

    pub fn lobby(&self) -> &Lobby {
        &self.lobby
    }

    /// Accept TCP clients forever, one task per connection.
    pub async fn run(self: Arc<Self>, listener: TcpListener) -> anyhow::Result<()> {
        info!("Listening on {}", listener.local_addr()?);
        loop {
            let (stream, addr) = listener.accept().await?;
            info!("Client connected from {}", addr);
            let server = Arc::clone(&self);
            tokio::spawn(async move {
                if let Err(e) = server.accept(Box::new(TcpTransport::new(stream))).await {
                    warn!("Connection from {} ended with an error: {}", addr, e);
                }
            });
        }
    }

    /// Serve one client: handshake, then either wait for an opponent or
    /// host the match with the client already waiting.
    pub async fn accept(self: Arc<Self>, transport: Box<dyn Transport>) -> anyhow::Result<()> {
        let mut link = Link::new(transport, ProtocolCodec::new(self.config.delimiter));
        let Some(name) = self.handshake(&mut link).await? else {
            link.close().await?;
            return Ok(());
        };
        link.set_label(name.clone());
        match self.lobby.join(Seat { name, link }).await {
            Pairing::Handed => Ok(()),
            Pairing::Parked { id, seat, opponent } => self.wait(id, seat, opponent).await,
        }
    }

    /// Keep reading a parked client until an opponent is handed over. A client
    /// that leaves while waiting frees its name and the waiting slot.
    async fn wait(
        &self,
        mut id: u64,
        mut seat: Seat,
        mut opponent: oneshot::Receiver<Seat>,
    ) -> anyhow::Result<()> {
        loop {
            let event = tokio::select! {
                other = &mut opponent => LobbyEvent::Opponent(other),
                inbound = seat.link.recv() => LobbyEvent::Inbound(inbound),
            };
            match event {
                LobbyEvent::Opponent(Ok(other)) => {
                    self.host(seat, other).await?;
                    return Ok(());
                }
                LobbyEvent::Opponent(Err(_)) => {
                    self.lobby.unregister(&seat.name).await;
                    let _ = seat.link.close().await;
                    return Ok(());
                }
                LobbyEvent::Inbound(Inbound::Message(Message::Exit) | Inbound::Closed) => {
                    info!("{} left the lobby", seat.name);
                    let handed = !self.lobby.leave(id).await;
                    self.lobby.unregister(&seat.name).await;
                    let _ = seat.link.close().await;
                    if !handed {
                        return Ok(());
                    }
                    // the opponent arrived at the same moment; park it instead
                    let Ok(other) = opponent.await else {
                        return Ok(());
                    };
                    match self.lobby.join(other).await {
                        Pairing::Handed => return Ok(()),
                        Pairing::Parked {
                            id: next_id,
                            seat: next_seat,
                            opponent: next_opponent,
                        } => {
                            id = next_id;
                            seat = next_seat;
                            opponent = next_opponent;
                        }
                    }
                }
                LobbyEvent::Inbound(Inbound::Message(other)) => {
                    let reason = format!("Waiting for an opponent, got {}", other.command());
                    // a failed send shows up as `Closed` on the next read
                    let _ = seat.link.send(&Message::Error { reason }).await;
                }
                LobbyEvent::Inbound(Inbound::Malformed(e)) => {
                    let reason = e.to_string();
                    let _ = seat.link.send(&Message::Error { reason }).await;
                }
            }
        }
    }

    async fn handshake(&self, link: &mut Link) -> anyhow::Result<Option<String>> {
        loop {
            match link.recv().await {
                Inbound::Message(Message::Handshake { name: Some(name) }) => {
                    match self.lobby.register(&name).await {
                        Ok(()) => {
                            link.send(&Message::Handshake { name: None }).await?;
                            info!("{} joined", name);
                            return Ok(Some(name));
                        }
                        Err(e) => {
                            info!("{}", e);
                            link.send(&Message::NameExists).await?;
                        }
                    }
                }
                Inbound::Message(Message::Handshake { name: None }) => {
                    link.send(&Message::Error {
                        reason: "HANDSHAKE needs a name".to_string(),
                    })
                    .await?;
                }
                Inbound::Message(Message::Exit) | Inbound::Closed => return Ok(None),
                Inbound::Message(other) => {
                    link.send(&Message::Error {
                        reason: format!("Expected HANDSHAKE, got {}", other.command()),
                    })
                    .await?;
                }
                Inbound::Malformed(e) => {
                    link.send(&Message::Error {
                        reason: e.to_string(),
                    })
                    .await?;
                }
            }
        }
    }

    /// Run a full session between two paired clients. The first one to
    /// connect moves first.
    async fn host(&self, mut first: Seat, mut second: Seat) -> anyhow::Result<MatchStatus> {
        info!("Pairing {} with {}", first.name, second.name);
        let status = match self.prepare(&mut first, &mut second).await {
            Setup::Ready(first_board, second_board) => {
                let mut game =
                    Match::new(first_board, second_board, Side::First, self.config.turn_rule);
                let mut first_player =
                    RemotePlayer::new(first.name.clone(), first.link, &self.config);
                let mut second_player =
                    RemotePlayer::new(second.name.clone(), second.link, &self.config);
                let status = play(&mut game, &mut first_player, &mut second_player).await?;
                first.link = first_player.into_link();
                second.link = second_player.into_link();
                status
            }
            Setup::Aborted => MatchStatus::Aborted,
        };

        for seat in [&mut first, &mut second] {
            self.lobby.unregister(&seat.name).await;
            let _ = seat.link.close().await;
        }
        info!("Session {} vs {} closed: {:?}", first.name, second.name, status);
        Ok(status)
    }

    /// Exchange names and collect both boards, then announce the first mover.
    async fn prepare(&self, first: &mut Seat, second: &mut Seat) -> Setup {
        let introduced = first
            .link
            .send(&Message::EnemyName {
                name: second.name.clone(),
            })
            .await
            .is_ok()
            && second
                .link
                .send(&Message::EnemyName {
                    name: first.name.clone(),
                })
                .await
                .is_ok();
        if !introduced {
            return abort_setup(first, second).await;
        }

        let mut boards: [Option<Board>; 2] = [None, None];
        while boards.iter().any(Option::is_none) {
            let (index, inbound) = tokio::select! {
                inbound = first.link.recv(), if boards[0].is_none() => (0, inbound),
                inbound = second.link.recv(), if boards[1].is_none() => (1, inbound),
                else => break,
            };
            let seat = if index == 0 { &mut *first } else { &mut *second };
            match inbound {
                Inbound::Message(Message::ClientBoard { fields }) => {
                    match Board::from_fields(&self.config, &fields) {
                        Ok(board) => {
                            info!("{} submitted a valid board", seat.name);
                            boards[index] = Some(board);
                        }
                        Err(e) => {
                            warn!("{} submitted an invalid board: {}", seat.name, e);
                            let reason = e.to_string();
                            if seat.link.send(&Message::Error { reason }).await.is_err() {
                                return abort_setup(first, second).await;
                            }
                        }
                    }
                }
                Inbound::Message(Message::Exit) | Inbound::Closed => {
                    info!("{} left during setup", seat.name);
                    return abort_setup(first, second).await;
                }
                Inbound::Message(other) => {
                    let reason = format!("Expected CLIENTBOARD, got {}", other.command());
                    if seat.link.send(&Message::Error { reason }).await.is_err() {
                        return abort_setup(first, second).await;
                    }
                }
                Inbound::Malformed(e) => {
                    let reason = e.to_string();
                    if seat.link.send(&Message::Error { reason }).await.is_err() {
                        return abort_setup(first, second).await;
                    }
                }
            }
        }

        let setup = Message::Setup {
            first: first.name.clone(),
        };
        let announced = first.link.send(&setup).await.is_ok()
            && second.link.send(&setup).await.is_ok();
        if !announced {
            return abort_setup(first, second).await;
        }
        match boards {
            [Some(a), Some(b)] => Setup::Ready(a, b),
            _ => abort_setup(first, second).await,
        }
    }
}

async fn abort_setup(first: &mut Seat, second: &mut Seat) -> Setup {
    let over = Message::GameOver {
        winner: None,
        won: false,
    };
    let _ = first.link.send(&over).await;
    let _ = second.link.send(&over).await;
    Setup::Aborted
}
