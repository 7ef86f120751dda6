//! Line protocol spoken between clients and the server.
//!
//! Every message is one line: a command keyword followed by its arguments,
//! all joined with the configured delimiter (`;` by default), e.g.
//! `UPDATE;2;4;true;false;false;alice;bob`.

use std::fmt;

use crate::config::DEFAULT_DELIMITER;

/// Command keywords as they appear on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Handshake,
    NameExists,
    ClientBoard,
    EnemyName,
    Setup,
    Move,
    Update,
    GameOver,
    LateMove,
    Exit,
    Error,
}

impl Command {
    pub const ALL: [Command; 11] = [
        Command::Handshake,
        Command::NameExists,
        Command::ClientBoard,
        Command::EnemyName,
        Command::Setup,
        Command::Move,
        Command::Update,
        Command::GameOver,
        Command::LateMove,
        Command::Exit,
        Command::Error,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            Command::Handshake => "HANDSHAKE",
            Command::NameExists => "NAME_EXISTS",
            Command::ClientBoard => "CLIENTBOARD",
            Command::EnemyName => "ENEMYNAME",
            Command::Setup => "SETUP",
            Command::Move => "MOVE",
            Command::Update => "UPDATE",
            Command::GameOver => "GAMEOVER",
            Command::LateMove => "LATE_MOVE",
            Command::Exit => "EXIT",
            Command::Error => "ERROR",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.keyword() == keyword)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Result of one accepted shot, broadcast to both players.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Update {
    pub x: usize,
    pub y: usize,
    pub hit: bool,
    pub sunk: bool,
    pub game_over: bool,
    /// Name of the player who fired.
    pub shooter: String,
    /// Name of the player who moves next.
    pub next: String,
}

/// Messages exchanged between a client and the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Client announces its name; the server acknowledges with no name.
    Handshake { name: Option<String> },
    /// The requested name is already taken.
    NameExists,
    /// Client's own board as row-major field codes.
    ClientBoard { fields: Vec<String> },
    /// Name of the paired opponent.
    EnemyName { name: String },
    /// Both boards accepted; `first` moves first.
    Setup { first: String },
    /// Fire at the cell named by a move token such as `C5`.
    Move { token: String },
    Update(Update),
    /// Game finished. `winner` is `None` when the game was aborted.
    GameOver { winner: Option<String>, won: bool },
    /// A move arrived while it was not the sender's turn.
    LateMove,
    /// Client leaves the session.
    Exit,
    /// The previous message was rejected.
    Error { reason: String },
}

impl Message {
    pub fn command(&self) -> Command {
        match self {
            Message::Handshake { .. } => Command::Handshake,
            Message::NameExists => Command::NameExists,
            Message::ClientBoard { .. } => Command::ClientBoard,
            Message::EnemyName { .. } => Command::EnemyName,
            Message::Setup { .. } => Command::Setup,
            Message::Move { .. } => Command::Move,
            Message::Update(_) => Command::Update,
            Message::GameOver { .. } => Command::GameOver,
            Message::LateMove => Command::LateMove,
            Message::Exit => Command::Exit,
            Message::Error { .. } => Command::Error,
        }
    }
}

/// Errors produced while encoding or decoding a protocol line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The line was empty.
    Empty,
    UnknownCommand { line: String },
    /// Wrong number of arguments for the command.
    Arity {
        command: Command,
        expected: usize,
        found: usize,
        line: String,
    },
    BadArgument {
        command: Command,
        argument: String,
        line: String,
    },
    /// An argument contains the delimiter or a line break.
    IllegalCharacter { value: String },
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::Empty => write!(f, "Empty message"),
            ProtocolError::UnknownCommand { line } => write!(f, "Unknown command in {:?}", line),
            ProtocolError::Arity {
                command,
                expected,
                found,
                line,
            } => write!(
                f,
                "{} expects {} argument(s), got {} in {:?}",
                command, expected, found, line
            ),
            ProtocolError::BadArgument {
                command,
                argument,
                line,
            } => write!(f, "Bad {} argument {:?} in {:?}", command, argument, line),
            ProtocolError::IllegalCharacter { value } => {
                write!(f, "Argument {:?} contains a reserved character", value)
            }
        }
    }
}

impl std::error::Error for ProtocolError {}

/// Stateless encoder/decoder for protocol lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolCodec {
    delimiter: char,
}

impl Default for ProtocolCodec {
    fn default() -> Self {
        Self::new(DEFAULT_DELIMITER)
    }
}

impl ProtocolCodec {
    pub fn new(delimiter: char) -> Self {
        Self { delimiter }
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Encode a message as a single line without the trailing newline.
    pub fn encode(&self, msg: &Message) -> Result<String, ProtocolError> {
        let args: Vec<String> = match msg {
            Message::Handshake { name } => name.iter().cloned().collect(),
            Message::NameExists | Message::LateMove | Message::Exit => Vec::new(),
            Message::ClientBoard { fields } => fields.clone(),
            Message::EnemyName { name } => vec![name.clone()],
            Message::Setup { first } => vec![first.clone()],
            Message::Move { token } => vec![token.clone()],
            Message::Update(u) => vec![
                u.x.to_string(),
                u.y.to_string(),
                u.hit.to_string(),
                u.sunk.to_string(),
                u.game_over.to_string(),
                u.shooter.clone(),
                u.next.clone(),
            ],
            Message::GameOver { winner, won } => {
                vec![winner.clone().unwrap_or_default(), won.to_string()]
            }
            Message::Error { reason } => vec![self.sanitize(reason)],
        };

        let mut line = String::from(msg.command().keyword());
        for arg in args {
            if arg.contains(self.delimiter) || arg.contains('\n') || arg.contains('\r') {
                return Err(ProtocolError::IllegalCharacter { value: arg });
            }
            line.push(self.delimiter);
            line.push_str(&arg);
        }
        Ok(line)
    }

    /// Decode one line; a trailing line break is ignored.
    pub fn decode(&self, line: &str) -> Result<Message, ProtocolError> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            return Err(ProtocolError::Empty);
        }
        let mut parts = line.split(self.delimiter);
        let keyword = parts.next().unwrap_or_default();
        let command = Command::from_keyword(keyword).ok_or_else(|| ProtocolError::UnknownCommand {
            line: line.to_string(),
        })?;
        let args: Vec<&str> = parts.collect();

        let arity = |expected: usize| -> Result<(), ProtocolError> {
            if args.len() == expected {
                Ok(())
            } else {
                Err(ProtocolError::Arity {
                    command,
                    expected,
                    found: args.len(),
                    line: line.to_string(),
                })
            }
        };
        let bad = |argument: &str| ProtocolError::BadArgument {
            command,
            argument: argument.to_string(),
            line: line.to_string(),
        };
        let boolean = |arg: &str| match arg {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(bad(other)),
        };
        let number = |arg: &str| arg.parse::<usize>().map_err(|_| bad(arg));
        let name = |arg: &str| {
            if arg.is_empty() {
                Err(bad(arg))
            } else {
                Ok(arg.to_string())
            }
        };

        match command {
            Command::Handshake => match args.as_slice() {
                [] => Ok(Message::Handshake { name: None }),
                [n] => Ok(Message::Handshake {
                    name: Some(name(*n)?),
                }),
                _ => Err(ProtocolError::Arity {
                    command,
                    expected: 1,
                    found: args.len(),
                    line: line.to_string(),
                }),
            },
            Command::NameExists => arity(0).map(|_| Message::NameExists),
            Command::LateMove => arity(0).map(|_| Message::LateMove),
            Command::Exit => arity(0).map(|_| Message::Exit),
            Command::ClientBoard => {
                if args.is_empty() {
                    return Err(ProtocolError::Arity {
                        command,
                        expected: 1,
                        found: 0,
                        line: line.to_string(),
                    });
                }
                Ok(Message::ClientBoard {
                    fields: args.iter().map(|s| s.to_string()).collect(),
                })
            }
            Command::EnemyName => {
                arity(1)?;
                Ok(Message::EnemyName {
                    name: name(args[0])?,
                })
            }
            Command::Setup => {
                arity(1)?;
                Ok(Message::Setup {
                    first: name(args[0])?,
                })
            }
            Command::Move => {
                arity(1)?;
                if args[0].is_empty() {
                    return Err(bad(args[0]));
                }
                Ok(Message::Move {
                    token: args[0].to_string(),
                })
            }
            Command::Update => {
                arity(7)?;
                Ok(Message::Update(Update {
                    x: number(args[0])?,
                    y: number(args[1])?,
                    hit: boolean(args[2])?,
                    sunk: boolean(args[3])?,
                    game_over: boolean(args[4])?,
                    shooter: name(args[5])?,
                    next: name(args[6])?,
                }))
            }
            Command::GameOver => {
                arity(2)?;
                let winner = (!args[0].is_empty()).then(|| args[0].to_string());
                Ok(Message::GameOver {
                    winner,
                    won: boolean(args[1])?,
                })
            }
            Command::Error => {
                arity(1)?;
                Ok(Message::Error {
                    reason: args[0].to_string(),
                })
            }
        }
    }

    fn sanitize(&self, text: &str) -> String {
        text.chars()
            .map(|c| {
                if c == self.delimiter || c == '\n' || c == '\r' {
                    ' '
                } else {
                    c
                }
            })
            .collect()
    }
}
