//! Ship kinds and placement of a ship footprint onto a grid.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::board::Grid;
use crate::common::PlacementError;
use crate::coord::Coordinate;
use crate::field::{FieldCode, Segment};

/// Orientation of a ship on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Front at the origin, extending towards larger x.
    Horizontal,
    /// Front at the origin, extending towards larger y.
    Vertical,
}

impl Orientation {
    fn step(self, origin: Coordinate, i: usize) -> Coordinate {
        match self {
            Orientation::Horizontal => Coordinate::new(origin.x + i, origin.y),
            Orientation::Vertical => Coordinate::new(origin.x, origin.y + i),
        }
    }
}

/// The closed set of ship types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipKind {
    Carrier,
    Battleship,
    Destroyer,
    SuperPatrol,
    Patrol,
}

impl ShipKind {
    /// Largest first; random placement relies on this order.
    pub const ALL: [ShipKind; 5] = [
        ShipKind::Carrier,
        ShipKind::Battleship,
        ShipKind::Destroyer,
        ShipKind::SuperPatrol,
        ShipKind::Patrol,
    ];

    pub fn size(self) -> usize {
        self.segments().len()
    }

    /// Ships of this kind in the standard fleet.
    pub fn default_amount(self) -> usize {
        match self {
            ShipKind::Carrier => 2,
            ShipKind::Battleship => 3,
            ShipKind::Destroyer => 5,
            ShipKind::SuperPatrol => 8,
            ShipKind::Patrol => 10,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ShipKind::Carrier => "Carrier",
            ShipKind::Battleship => "Battleship",
            ShipKind::Destroyer => "Destroyer",
            ShipKind::SuperPatrol => "SuperPatrol",
            ShipKind::Patrol => "Patrol",
        }
    }

    /// Segment codes from front to back.
    pub fn segments(self) -> &'static [Segment] {
        match self {
            ShipKind::Carrier => &[
                Segment::CarrierFront,
                Segment::CarrierFrontMid,
                Segment::CarrierMid,
                Segment::CarrierBackMid,
                Segment::CarrierBack,
            ],
            ShipKind::Battleship => &[
                Segment::BattleshipFront,
                Segment::BattleshipFrontMid,
                Segment::BattleshipBackMid,
                Segment::BattleshipBack,
            ],
            ShipKind::Destroyer => &[
                Segment::DestroyerFront,
                Segment::DestroyerMid,
                Segment::DestroyerBack,
            ],
            ShipKind::SuperPatrol => &[Segment::SuperPatrolFront, Segment::SuperPatrolBack],
            ShipKind::Patrol => &[Segment::Patrol],
        }
    }

    /// Cells a ship of this kind would cover, or `None` if any falls off the grid.
    pub fn footprint(
        self,
        width: usize,
        height: usize,
        origin: Coordinate,
        orientation: Orientation,
    ) -> Option<Vec<Coordinate>> {
        let cells: Vec<Coordinate> = (0..self.size())
            .map(|i| orientation.step(origin, i))
            .collect();
        if cells.iter().all(|c| c.x < width && c.y < height) {
            Some(cells)
        } else {
            None
        }
    }

    /// Write this ship's segments onto `grid`, front at `origin`.
    ///
    /// Every covered cell must be on the grid and hold un-hit water; otherwise
    /// the grid is left untouched.
    pub fn place(
        self,
        grid: &mut Grid,
        origin: Coordinate,
        orientation: Orientation,
    ) -> Result<PlacedShip, PlacementError> {
        let cells = self
            .footprint(grid.width(), grid.height(), origin, orientation)
            .ok_or(PlacementError::OutOfBounds { kind: self, origin })?;
        if let Some(&at) = cells.iter().find(|&&c| grid.get(c) != Some(FieldCode::WATER)) {
            return Err(PlacementError::Overlap { kind: self, at });
        }
        for (&cell, &segment) in cells.iter().zip(self.segments()) {
            grid.set(cell, FieldCode::new(segment));
        }
        Ok(PlacedShip {
            kind: self,
            origin,
            orientation,
        })
    }
}

impl fmt::Display for ShipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A ship at a fixed position: the layout unit handed to `Board::place_all_ships`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlacedShip {
    pub kind: ShipKind,
    pub origin: Coordinate,
    pub orientation: Orientation,
}

impl PlacedShip {
    pub fn new(kind: ShipKind, x: usize, y: usize, orientation: Orientation) -> Self {
        Self {
            kind,
            origin: Coordinate::new(x, y),
            orientation,
        }
    }

    /// Covered cells from front to back.
    pub fn cells(&self) -> impl Iterator<Item = Coordinate> + '_ {
        (0..self.kind.size()).map(move |i| self.orientation.step(self.origin, i))
    }

    pub fn contains(&self, c: Coordinate) -> bool {
        self.cells().any(|cell| cell == c)
    }
}
