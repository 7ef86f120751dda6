//! Common types for the board model: shot outcomes and placement errors.

use core::fmt;

use crate::coord::Coordinate;
use crate::ship::ShipKind;

/// Result of firing at a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotOutcome {
    /// Shot landed in open water.
    Miss,
    /// Shot hit a ship that still has un-hit cells.
    Hit,
    /// Shot hit the last un-hit cell of a ship.
    Sunk(ShipKind),
    /// The cell had already been fired at; nothing changed.
    AlreadyShot,
}

impl ShotOutcome {
    pub fn is_hit(self) -> bool {
        matches!(self, ShotOutcome::Hit | ShotOutcome::Sunk(_))
    }

    pub fn is_sunk(self) -> bool {
        matches!(self, ShotOutcome::Sunk(_))
    }
}

/// Errors returned when placing ships or decoding a submitted board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementError {
    /// The layout does not contain the configured number of ships of a kind.
    WrongCount {
        kind: ShipKind,
        expected: usize,
        found: usize,
    },
    /// Part of the ship would lie outside the grid.
    OutOfBounds { kind: ShipKind, origin: Coordinate },
    /// The ship covers a cell already taken by another ship.
    Overlap { kind: ShipKind, at: Coordinate },
    /// The ship sits next to another ship while touching is disallowed.
    Touching { kind: ShipKind, at: Coordinate },
    /// Segments of a ship are missing or out of order.
    BrokenShip { kind: ShipKind, at: Coordinate },
    /// A submitted field is not a known code.
    UnknownField { at: Coordinate, code: String },
    /// A submitted board already contains hits.
    UnexpectedHit { at: Coordinate },
    /// A submitted board has the wrong number of fields.
    FieldCount { expected: usize, found: usize },
    /// Ships were already placed on this board.
    AlreadyPlaced,
    /// Random placement could not find room for every ship.
    NoRoom,
}

impl fmt::Display for PlacementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementError::WrongCount {
                kind,
                expected,
                found,
            } => write!(
                f,
                "Expected {} {} ship(s), found {}",
                expected,
                kind.name(),
                found
            ),
            PlacementError::OutOfBounds { kind, origin } => {
                write!(f, "{} at {} does not fit on the board", kind.name(), origin)
            }
            PlacementError::Overlap { kind, at } => {
                write!(f, "{} overlaps another ship at {}", kind.name(), at)
            }
            PlacementError::Touching { kind, at } => {
                write!(f, "{} touches another ship at {}", kind.name(), at)
            }
            PlacementError::BrokenShip { kind, at } => {
                write!(f, "{} starting at {} is incomplete", kind.name(), at)
            }
            PlacementError::UnknownField { at, code } => {
                write!(f, "Unknown field {:?} at {}", code, at)
            }
            PlacementError::UnexpectedHit { at } => {
                write!(f, "Field at {} is already hit", at)
            }
            PlacementError::FieldCount { expected, found } => {
                write!(f, "Expected {} fields, found {}", expected, found)
            }
            PlacementError::AlreadyPlaced => write!(f, "Ships are already placed"),
            PlacementError::NoRoom => write!(f, "Unable to find room for every ship"),
        }
    }
}

impl std::error::Error for PlacementError {}
