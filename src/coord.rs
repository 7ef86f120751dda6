//! Grid coordinates and the textual move token (`C5`, `c,5`).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;

/// Zero-based (column, row) position on a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: usize,
    pub y: usize,
}

impl Coordinate {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// The 8 surrounding cells that lie on a `width × height` grid.
    pub fn neighbours(self, width: usize, height: usize) -> impl Iterator<Item = Coordinate> {
        let x0 = self.x.saturating_sub(1);
        let y0 = self.y.saturating_sub(1);
        let x1 = (self.x + 1).min(width.saturating_sub(1));
        let y1 = (self.y + 1).min(height.saturating_sub(1));
        (y0..=y1)
            .flat_map(move |y| (x0..=x1).map(move |x| Coordinate::new(x, y)))
            .filter(move |&c| c != self)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Reasons a move token cannot be turned into a coordinate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    Empty,
    UnknownColumn(char),
    BadRow(String),
    OutOfBounds { x: usize, y: usize },
}

impl fmt::Display for MoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveError::Empty => write!(f, "Move is empty"),
            MoveError::UnknownColumn(c) => write!(f, "Unknown column letter {:?}", c),
            MoveError::BadRow(row) => write!(f, "Row {:?} is not a positive number", row),
            MoveError::OutOfBounds { x, y } => {
                write!(f, "Coordinate ({}, {}) is outside the board", x, y)
            }
        }
    }
}

impl std::error::Error for MoveError {}

/// Converts between coordinates and move tokens for one grid configuration.
#[derive(Debug, Clone)]
pub struct MoveCodec {
    alphabet: Vec<char>,
    width: usize,
    height: usize,
}

impl MoveCodec {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            alphabet: config
                .alphabet
                .chars()
                .map(|c| c.to_ascii_lowercase())
                .collect(),
            width: config.width,
            height: config.height,
        }
    }

    /// Column letter (upper case) followed by the 1-based row number.
    pub fn encode(&self, coord: Coordinate) -> Result<String, MoveError> {
        if coord.x >= self.width || coord.y >= self.height {
            return Err(MoveError::OutOfBounds {
                x: coord.x,
                y: coord.y,
            });
        }
        let letter = self
            .alphabet
            .get(coord.x)
            .ok_or(MoveError::OutOfBounds {
                x: coord.x,
                y: coord.y,
            })?
            .to_ascii_uppercase();
        Ok(format!("{}{}", letter, coord.y + 1))
    }

    /// Parse a token such as `C5`, `c5` or `c,5`.
    pub fn decode(&self, token: &str) -> Result<Coordinate, MoveError> {
        let token = token.trim();
        let mut chars = token.chars();
        let letter = chars.next().ok_or(MoveError::Empty)?;
        let x = self
            .alphabet
            .iter()
            .position(|&c| c == letter.to_ascii_lowercase())
            .ok_or(MoveError::UnknownColumn(letter))?;

        let rest = chars.as_str();
        let digits = rest.strip_prefix(',').unwrap_or(rest);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(MoveError::BadRow(digits.to_string()));
        }
        let row: usize = digits
            .parse()
            .map_err(|_| MoveError::BadRow(digits.to_string()))?;
        if row == 0 {
            return Err(MoveError::BadRow(digits.to_string()));
        }
        let y = row - 1;
        if x >= self.width || y >= self.height {
            return Err(MoveError::OutOfBounds { x, y });
        }
        Ok(Coordinate::new(x, y))
    }
}
