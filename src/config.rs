//! Game configuration: grid size, fleet composition, wire delimiter and turn rule.
//!
//! A `GameConfig` is built once (defaults or a JSON file) and passed by
//! reference to everything that needs grid bounds or the fleet.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ship::ShipKind;

pub const DEFAULT_WIDTH: usize = 15;
pub const DEFAULT_HEIGHT: usize = 10;
pub const DEFAULT_DELIMITER: char = ';';
pub const DEFAULT_ALPHABET: &str = "abcdefghijklmno";

/// Decides who moves after an accepted shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnRule {
    /// The turn always passes to the opponent.
    Alternate,
    /// The shooter keeps the turn after sinking a ship.
    ExtraTurnOnSink,
    /// The shooter keeps the turn after any hit.
    #[default]
    ExtraTurnOnHit,
}

/// How many ships of one kind each side places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetEntry {
    pub kind: ShipKind,
    pub amount: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub width: usize,
    pub height: usize,
    pub delimiter: char,
    pub alphabet: String,
    pub fleet: Vec<FleetEntry>,
    pub turn_rule: TurnRule,
    /// When false, ships may not occupy 8-neighbouring cells.
    pub allow_touching: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            delimiter: DEFAULT_DELIMITER,
            alphabet: DEFAULT_ALPHABET.to_string(),
            fleet: ShipKind::ALL
                .iter()
                .map(|&kind| FleetEntry {
                    kind,
                    amount: kind.default_amount(),
                })
                .collect(),
            turn_rule: TurnRule::default(),
            allow_touching: true,
        }
    }
}

impl GameConfig {
    pub fn with_size(mut self, width: usize, height: usize) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_fleet(mut self, fleet: &[(ShipKind, usize)]) -> Self {
        self.fleet = fleet
            .iter()
            .map(|&(kind, amount)| FleetEntry { kind, amount })
            .collect();
        self
    }

    pub fn with_turn_rule(mut self, turn_rule: TurnRule) -> Self {
        self.turn_rule = turn_rule;
        self
    }

    pub fn with_touching(mut self, allow_touching: bool) -> Self {
        self.allow_touching = allow_touching;
        self
    }

    /// Configured number of ships of `kind` (zero if the kind is absent).
    pub fn amount_of(&self, kind: ShipKind) -> usize {
        self.fleet
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| e.amount)
            .sum()
    }

    /// Total number of ship cells a complete fleet covers.
    /// Saturates instead of overflowing for absurd fleets.
    pub fn total_ship_cells(&self) -> usize {
        self.fleet.iter().fold(0usize, |total, e| {
            total.saturating_add(e.kind.size().saturating_mul(e.amount))
        })
    }

    pub fn total_ships(&self) -> usize {
        self.fleet
            .iter()
            .fold(0usize, |total, e| total.saturating_add(e.amount))
    }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyGrid);
        }
        let cells = self
            .width
            .checked_mul(self.height)
            .ok_or(ConfigError::GridTooLarge {
                width: self.width,
                height: self.height,
            })?;
        let letters: Vec<char> = self.alphabet.chars().collect();
        if letters.len() < self.width {
            return Err(ConfigError::AlphabetTooShort {
                letters: letters.len(),
                width: self.width,
            });
        }
        for (i, c) in letters.iter().enumerate() {
            if !c.is_ascii_alphabetic() || letters[..i].iter().any(|p| p.eq_ignore_ascii_case(c)) {
                return Err(ConfigError::BadAlphabet(*c));
            }
        }
        if self.delimiter.is_alphanumeric() || self.delimiter == '\n' || self.delimiter == '_' {
            return Err(ConfigError::BadDelimiter(self.delimiter));
        }
        if self.total_ship_cells() == 0 {
            return Err(ConfigError::EmptyFleet);
        }
        if self.total_ship_cells() > cells {
            return Err(ConfigError::FleetTooLarge {
                cells: self.total_ship_cells(),
                grid: cells,
            });
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate().map_err(|e| anyhow::anyhow!(e))?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("cannot read {}: {}", path.display(), e))?;
        Self::from_json_str(&text)
    }
}

/// Reasons a configuration is unusable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptyGrid,
    GridTooLarge { width: usize, height: usize },
    AlphabetTooShort { letters: usize, width: usize },
    BadAlphabet(char),
    BadDelimiter(char),
    EmptyFleet,
    FleetTooLarge { cells: usize, grid: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyGrid => write!(f, "Grid must have at least one row and column"),
            ConfigError::GridTooLarge { width, height } => {
                write!(f, "Grid of {}x{} cells is too large", width, height)
            }
            ConfigError::AlphabetTooShort { letters, width } => write!(
                f,
                "Alphabet has {} letters but the grid is {} columns wide",
                letters, width
            ),
            ConfigError::BadAlphabet(c) => {
                write!(f, "Alphabet letter {:?} is not a unique ASCII letter", c)
            }
            ConfigError::BadDelimiter(c) => write!(f, "Delimiter {:?} cannot be used", c),
            ConfigError::EmptyFleet => write!(f, "Fleet has no ships"),
            ConfigError::FleetTooLarge { cells, grid } => write!(
                f,
                "Fleet needs {} cells but the grid only has {}",
                cells, grid
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
