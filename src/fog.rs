//! Fog-of-war view of the opponent's board, built only from our own shots.

use std::fmt;

use crate::coord::Coordinate;

/// What a player knows about one cell of the opponent's board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FogCell {
    Unknown,
    Water,
    ShipHit,
}

impl FogCell {
    /// Wire name of the cell state.
    pub fn code(self) -> &'static str {
        match self {
            FogCell::Unknown => "WATER",
            FogCell::Water => "WATER_HIT",
            FogCell::ShipHit => "SHIP_HIT",
        }
    }
}

impl fmt::Display for FogCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FogBoard {
    width: usize,
    height: usize,
    cells: Vec<FogCell>,
    score: u32,
    shots: usize,
}

impl FogBoard {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![FogCell::Unknown; width * height],
            score: 0,
            shots: 0,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, c: Coordinate) -> Option<FogCell> {
        if c.x < self.width && c.y < self.height {
            Some(self.cells[c.y * self.width + c.x])
        } else {
            None
        }
    }

    /// In bounds and not fired at yet.
    pub fn is_valid_target(&self, c: Coordinate) -> bool {
        self.get(c) == Some(FogCell::Unknown)
    }

    /// Record the result of one of our shots. Hits score a point, sinks one more.
    pub fn record(&mut self, c: Coordinate, hit: bool, sunk: bool) {
        if !self.is_valid_target(c) {
            return;
        }
        self.cells[c.y * self.width + c.x] = if hit {
            FogCell::ShipHit
        } else {
            FogCell::Water
        };
        self.shots += 1;
        if hit {
            self.score += 1;
        }
        if sunk {
            self.score += 1;
        }
    }

    /// Coordinates not fired at yet, row-major.
    pub fn unknown_cells(&self) -> Vec<Coordinate> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, &cell)| cell == FogCell::Unknown)
            .map(|(i, _)| Coordinate::new(i % self.width, i / self.width))
            .collect()
    }

    pub fn hits(&self) -> usize {
        self.cells.iter().filter(|&&c| c == FogCell::ShipHit).count()
    }

    pub fn shots_fired(&self) -> usize {
        self.shots
    }

    pub fn score(&self) -> u32 {
        self.score
    }
}
