//! Match engine: both boards, both fog views and the turn flag.

use core::fmt;

use crate::board::Board;
use crate::common::ShotOutcome;
use crate::config::TurnRule;
use crate::coord::Coordinate;
use crate::fog::FogBoard;

/// One of the two seats in a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    First,
    Second,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::First => Side::Second,
            Side::Second => Side::First,
        }
    }

    fn index(self) -> usize {
        match self {
            Side::First => 0,
            Side::Second => 1,
        }
    }
}

/// Current status of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStatus {
    InProgress,
    Won(Side),
    Aborted,
}

/// Why a shot was refused. A refused shot never changes the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveRejection {
    /// It is not the shooter's turn.
    Late,
    OutOfBounds(Coordinate),
    AlreadyShot(Coordinate),
    /// The match has already ended.
    Finished,
}

impl fmt::Display for MoveRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveRejection::Late => write!(f, "It is not your turn"),
            MoveRejection::OutOfBounds(c) => write!(f, "{} is outside the board", c),
            MoveRejection::AlreadyShot(c) => write!(f, "{} was already fired at", c),
            MoveRejection::Finished => write!(f, "The game is over"),
        }
    }
}

impl std::error::Error for MoveRejection {}

/// An accepted shot and its consequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub shooter: Side,
    pub coord: Coordinate,
    pub outcome: ShotOutcome,
    pub game_over: bool,
    /// Side holding the turn after this shot.
    pub next: Side,
}

pub struct Match {
    boards: [Board; 2],
    views: [FogBoard; 2],
    turn: Side,
    turn_rule: TurnRule,
    status: MatchStatus,
}

impl Match {
    /// Start a match between two fully placed boards.
    pub fn new(first_board: Board, second_board: Board, first: Side, turn_rule: TurnRule) -> Self {
        let views = [
            FogBoard::new(second_board.width(), second_board.height()),
            FogBoard::new(first_board.width(), first_board.height()),
        ];
        Self {
            boards: [first_board, second_board],
            views,
            turn: first,
            turn_rule,
            status: MatchStatus::InProgress,
        }
    }

    /// Fire a shot from `shooter` at the opponent's board.
    ///
    /// Rejections leave both boards and the turn flag untouched.
    pub fn fire(&mut self, shooter: Side, coord: Coordinate) -> Result<Resolution, MoveRejection> {
        if self.status != MatchStatus::InProgress {
            return Err(MoveRejection::Finished);
        }
        if shooter != self.turn {
            return Err(MoveRejection::Late);
        }
        let target = shooter.other();
        let outcome = self.boards[target.index()]
            .apply_shot(coord)
            .map_err(|_| MoveRejection::OutOfBounds(coord))?;
        if outcome == ShotOutcome::AlreadyShot {
            return Err(MoveRejection::AlreadyShot(coord));
        }
        self.views[shooter.index()].record(coord, outcome.is_hit(), outcome.is_sunk());

        let game_over = self.boards[target.index()].all_sunk();
        let keep = match self.turn_rule {
            TurnRule::Alternate => false,
            TurnRule::ExtraTurnOnSink => outcome.is_sunk(),
            TurnRule::ExtraTurnOnHit => outcome.is_hit(),
        };
        let next = if keep { shooter } else { target };
        self.turn = next;
        if game_over {
            self.status = MatchStatus::Won(shooter);
        }
        Ok(Resolution {
            shooter,
            coord,
            outcome,
            game_over,
            next,
        })
    }

    /// End the match without a winner.
    pub fn abort(&mut self) {
        if self.status == MatchStatus::InProgress {
            self.status = MatchStatus::Aborted;
        }
    }

    /// Side whose turn it is.
    pub fn turn(&self) -> Side {
        self.turn
    }

    pub fn status(&self) -> MatchStatus {
        self.status
    }

    pub fn winner(&self) -> Option<Side> {
        match self.status {
            MatchStatus::Won(side) => Some(side),
            _ => None,
        }
    }

    /// What `side` knows about its opponent's board.
    pub fn view(&self, side: Side) -> &FogBoard {
        &self.views[side.index()]
    }

    /// `side`'s own board.
    pub fn board(&self, side: Side) -> &Board {
        &self.boards[side.index()]
    }
}
