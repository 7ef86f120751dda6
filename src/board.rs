//! Board state: a grid of field codes, the ships placed on it and the count of
//! ship cells that have not been hit yet.

use rand::Rng;

use crate::common::{PlacementError, ShotOutcome};
use crate::config::{FleetEntry, GameConfig};
use crate::coord::{Coordinate, MoveError};
use crate::field::FieldCode;
use crate::ship::{Orientation, PlacedShip, ShipKind};

const LAYOUT_ATTEMPTS: usize = 50;
const SHIP_ATTEMPTS: usize = 500;

/// Row-major `width × height` array of field codes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<FieldCode>,
}

impl Grid {
    /// All-water grid.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![FieldCode::WATER; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn index(&self, c: Coordinate) -> Option<usize> {
        (c.x < self.width && c.y < self.height).then(|| c.y * self.width + c.x)
    }

    pub fn get(&self, c: Coordinate) -> Option<FieldCode> {
        self.index(c).map(|i| self.cells[i])
    }

    /// Overwrite a cell; coordinates off the grid are ignored.
    pub fn set(&mut self, c: Coordinate, code: FieldCode) {
        if let Some(i) = self.index(c) {
            self.cells[i] = code;
        }
    }

    /// Cells in row-major order with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (Coordinate, FieldCode)> + '_ {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &code)| (Coordinate::new(i % width, i / width), code))
    }

    pub fn is_all_water(&self) -> bool {
        self.cells.iter().all(|&c| c == FieldCode::WATER)
    }

    fn occupied(&self, c: Coordinate) -> bool {
        self.get(c).is_some_and(|code| code.is_ship())
    }
}

/// One player's own board.
#[derive(Clone, Debug)]
pub struct Board {
    grid: Grid,
    fleet: Vec<FleetEntry>,
    allow_touching: bool,
    ships: Vec<PlacedShip>,
    remaining: usize,
}

impl Board {
    /// Create an all-water board with no ships placed.
    pub fn new(config: &GameConfig) -> Self {
        Self {
            grid: Grid::new(config.width, config.height),
            fleet: config.fleet.clone(),
            allow_touching: config.allow_touching,
            ships: Vec::new(),
            remaining: 0,
        }
    }

    /// Create a board and place `layout` on it.
    pub fn with_layout(config: &GameConfig, layout: &[PlacedShip]) -> Result<Self, PlacementError> {
        let mut board = Self::new(config);
        board.place_all_ships(layout)?;
        Ok(board)
    }

    /// Create a board with a random legal layout.
    pub fn random<R: Rng>(config: &GameConfig, rng: &mut R) -> Result<Self, PlacementError> {
        let layout = Self::random_layout(config, rng)?;
        Self::with_layout(config, &layout)
    }

    /// Generate a random legal layout for the configured fleet.
    pub fn random_layout<R: Rng>(
        config: &GameConfig,
        rng: &mut R,
    ) -> Result<Vec<PlacedShip>, PlacementError> {
        let mut kinds: Vec<ShipKind> = Vec::new();
        for kind in ShipKind::ALL {
            kinds.extend(std::iter::repeat(kind).take(config.amount_of(kind)));
        }

        'layout: for _ in 0..LAYOUT_ATTEMPTS {
            let mut scratch = Grid::new(config.width, config.height);
            let mut layout = Vec::with_capacity(kinds.len());
            for &kind in &kinds {
                let mut placed = None;
                for _ in 0..SHIP_ATTEMPTS {
                    let orientation = if rng.random() {
                        Orientation::Horizontal
                    } else {
                        Orientation::Vertical
                    };
                    let (max_x, max_y) = match orientation {
                        Orientation::Horizontal => (
                            config.width.checked_sub(kind.size()),
                            config.height.checked_sub(1),
                        ),
                        Orientation::Vertical => (
                            config.width.checked_sub(1),
                            config.height.checked_sub(kind.size()),
                        ),
                    };
                    let (Some(max_x), Some(max_y)) = (max_x, max_y) else {
                        continue;
                    };
                    let origin = Coordinate::new(
                        rng.random_range(0..=max_x),
                        rng.random_range(0..=max_y),
                    );
                    if check_clear(&scratch, kind, origin, orientation, config.allow_touching)
                        .is_err()
                    {
                        continue;
                    }
                    if let Ok(ship) = kind.place(&mut scratch, origin, orientation) {
                        placed = Some(ship);
                        break;
                    }
                }
                match placed {
                    Some(ship) => layout.push(ship),
                    None => continue 'layout,
                }
            }
            return Ok(layout);
        }
        Err(PlacementError::NoRoom)
    }

    /// Place a complete fleet at once.
    ///
    /// The layout must contain exactly the configured number of ships of each
    /// kind, all in bounds and non-overlapping. Validation runs on a scratch
    /// grid; on any error this board stays all water.
    pub fn place_all_ships(&mut self, layout: &[PlacedShip]) -> Result<(), PlacementError> {
        if !self.ships.is_empty() {
            return Err(PlacementError::AlreadyPlaced);
        }
        for kind in ShipKind::ALL {
            let expected: usize = self
                .fleet
                .iter()
                .filter(|e| e.kind == kind)
                .map(|e| e.amount)
                .sum();
            let found = layout.iter().filter(|s| s.kind == kind).count();
            if found != expected {
                return Err(PlacementError::WrongCount {
                    kind,
                    expected,
                    found,
                });
            }
        }

        let mut scratch = Grid::new(self.grid.width(), self.grid.height());
        for ship in layout {
            check_clear(&scratch, ship.kind, ship.origin, ship.orientation, self.allow_touching)?;
            ship.kind.place(&mut scratch, ship.origin, ship.orientation)?;
        }

        self.grid = scratch;
        self.ships = layout.to_vec();
        self.remaining = layout.iter().map(|s| s.kind.size()).sum();
        Ok(())
    }

    /// Fire at `c`, marking the cell as hit and reporting what was there.
    ///
    /// A cell already fired at yields `AlreadyShot` and nothing changes.
    pub fn apply_shot(&mut self, c: Coordinate) -> Result<ShotOutcome, MoveError> {
        let code = self
            .grid
            .get(c)
            .ok_or(MoveError::OutOfBounds { x: c.x, y: c.y })?;
        if code.hit {
            return Ok(ShotOutcome::AlreadyShot);
        }
        self.grid.set(c, code.struck());
        if !code.is_ship() {
            return Ok(ShotOutcome::Miss);
        }
        self.remaining = self.remaining.saturating_sub(1);

        let sunk = self
            .ships
            .iter()
            .find(|s| s.contains(c))
            .filter(|s| s.cells().all(|cell| self.grid.get(cell).is_some_and(|f| f.hit)));
        Ok(match sunk {
            Some(ship) => ShotOutcome::Sunk(ship.kind),
            None => ShotOutcome::Hit,
        })
    }

    /// Number of ship cells that have not been hit.
    pub fn remaining_ship_cells(&self) -> usize {
        self.remaining
    }

    pub fn all_sunk(&self) -> bool {
        self.remaining == 0
    }

    pub fn ships(&self) -> &[PlacedShip] {
        &self.ships
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn width(&self) -> usize {
        self.grid.width()
    }

    pub fn height(&self) -> usize {
        self.grid.height()
    }

    /// Field codes in row-major order, as sent in `CLIENTBOARD`.
    pub fn encode_fields(&self) -> Vec<String> {
        self.grid.iter().map(|(_, code)| code.to_string()).collect()
    }

    /// Rebuild a board from row-major field codes.
    ///
    /// Ships are recovered by following front-to-back segment chains; the
    /// recovered layout then goes through `place_all_ships`.
    pub fn from_fields<S: AsRef<str>>(config: &GameConfig, fields: &[S]) -> Result<Self, PlacementError> {
        let expected = config.width * config.height;
        if fields.len() != expected {
            return Err(PlacementError::FieldCount {
                expected,
                found: fields.len(),
            });
        }

        let mut parsed = Grid::new(config.width, config.height);
        for (i, field) in fields.iter().enumerate() {
            let at = Coordinate::new(i % config.width, i / config.width);
            let code: FieldCode = field.as_ref().parse().map_err(|_| PlacementError::UnknownField {
                at,
                code: field.as_ref().to_string(),
            })?;
            if code.hit {
                return Err(PlacementError::UnexpectedHit { at });
            }
            parsed.set(at, code);
        }

        let mut visited = vec![false; expected];
        let mut layout = Vec::new();
        for (at, code) in parsed.iter() {
            if !code.is_ship() || visited[at.y * config.width + at.x] {
                continue;
            }
            let Some(kind) = code.segment.ship() else {
                continue;
            };
            if !code.segment.is_front() {
                return Err(PlacementError::BrokenShip { kind, at });
            }
            let chain = [Orientation::Horizontal, Orientation::Vertical]
                .into_iter()
                .find_map(|orientation| {
                    let cells = kind.footprint(config.width, config.height, at, orientation)?;
                    let intact = cells.iter().zip(kind.segments()).all(|(&c, &segment)| {
                        !visited[c.y * config.width + c.x]
                            && parsed.get(c) == Some(FieldCode::new(segment))
                    });
                    intact.then_some((orientation, cells))
                });
            let Some((orientation, cells)) = chain else {
                return Err(PlacementError::BrokenShip { kind, at });
            };
            for c in cells {
                visited[c.y * config.width + c.x] = true;
            }
            layout.push(PlacedShip {
                kind,
                origin: at,
                orientation,
            });
        }

        Self::with_layout(config, &layout)
    }
}

/// Check that a ship's footprint is in bounds, free, and (when required)
/// not adjacent to any ship already on `grid`.
fn check_clear(
    grid: &Grid,
    kind: ShipKind,
    origin: Coordinate,
    orientation: Orientation,
    allow_touching: bool,
) -> Result<(), PlacementError> {
    let cells = kind
        .footprint(grid.width(), grid.height(), origin, orientation)
        .ok_or(PlacementError::OutOfBounds { kind, origin })?;
    if let Some(&at) = cells.iter().find(|&&c| grid.occupied(c)) {
        return Err(PlacementError::Overlap { kind, at });
    }
    if !allow_touching {
        for &c in &cells {
            if let Some(at) = c.neighbours(grid.width(), grid.height()).find(|&n| grid.occupied(n)) {
                return Err(PlacementError::Touching { kind, at });
            }
        }
    }
    Ok(())
}
