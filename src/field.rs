//! Field codes: what occupies a grid cell and whether it has been fired at.

use std::fmt;
use std::str::FromStr;

use crate::ship::ShipKind;

const HIT_SUFFIX: &str = "_HIT";

/// Occupant of a single cell: open water or one segment of a ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    Water,
    Patrol,
    SuperPatrolFront,
    SuperPatrolBack,
    DestroyerFront,
    DestroyerMid,
    DestroyerBack,
    BattleshipFront,
    BattleshipFrontMid,
    BattleshipBackMid,
    BattleshipBack,
    CarrierFront,
    CarrierFrontMid,
    CarrierMid,
    CarrierBackMid,
    CarrierBack,
}

impl Segment {
    pub const ALL: [Segment; 16] = [
        Segment::Water,
        Segment::Patrol,
        Segment::SuperPatrolFront,
        Segment::SuperPatrolBack,
        Segment::DestroyerFront,
        Segment::DestroyerMid,
        Segment::DestroyerBack,
        Segment::BattleshipFront,
        Segment::BattleshipFrontMid,
        Segment::BattleshipBackMid,
        Segment::BattleshipBack,
        Segment::CarrierFront,
        Segment::CarrierFrontMid,
        Segment::CarrierMid,
        Segment::CarrierBackMid,
        Segment::CarrierBack,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Segment::Water => "WATER",
            Segment::Patrol => "PATROL",
            Segment::SuperPatrolFront => "SUPER_PATROL_FRONT",
            Segment::SuperPatrolBack => "SUPER_PATROL_BACK",
            Segment::DestroyerFront => "DESTROYER_FRONT",
            Segment::DestroyerMid => "DESTROYER_MID",
            Segment::DestroyerBack => "DESTROYER_BACK",
            Segment::BattleshipFront => "BATTLESHIP_FRONT",
            Segment::BattleshipFrontMid => "BATTLESHIP_FRONT_MID",
            Segment::BattleshipBackMid => "BATTLESHIP_BACK_MID",
            Segment::BattleshipBack => "BATTLESHIP_BACK",
            Segment::CarrierFront => "CARRIER_FRONT",
            Segment::CarrierFrontMid => "CARRIER_FRONT_MID",
            Segment::CarrierMid => "CARRIER_MID",
            Segment::CarrierBackMid => "CARRIER_BACK_MID",
            Segment::CarrierBack => "CARRIER_BACK",
        }
    }

    /// Ship this segment belongs to, `None` for water.
    pub fn ship(self) -> Option<ShipKind> {
        match self {
            Segment::Water => None,
            Segment::Patrol => Some(ShipKind::Patrol),
            Segment::SuperPatrolFront | Segment::SuperPatrolBack => Some(ShipKind::SuperPatrol),
            Segment::DestroyerFront | Segment::DestroyerMid | Segment::DestroyerBack => {
                Some(ShipKind::Destroyer)
            }
            Segment::BattleshipFront
            | Segment::BattleshipFrontMid
            | Segment::BattleshipBackMid
            | Segment::BattleshipBack => Some(ShipKind::Battleship),
            Segment::CarrierFront
            | Segment::CarrierFrontMid
            | Segment::CarrierMid
            | Segment::CarrierBackMid
            | Segment::CarrierBack => Some(ShipKind::Carrier),
        }
    }

    /// Position of the segment counted from the front of its ship.
    pub fn index(self) -> Option<usize> {
        let kind = self.ship()?;
        kind.segments().iter().position(|&s| s == self)
    }

    pub fn is_front(self) -> bool {
        self.index() == Some(0)
    }

    pub fn is_water(self) -> bool {
        self == Segment::Water
    }
}

/// A segment together with its hit state; the unit stored in every grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldCode {
    pub segment: Segment,
    pub hit: bool,
}

impl FieldCode {
    pub const WATER: FieldCode = FieldCode {
        segment: Segment::Water,
        hit: false,
    };

    pub fn new(segment: Segment) -> Self {
        Self { segment, hit: false }
    }

    /// Hit counterpart of this code.
    pub fn struck(self) -> Self {
        Self {
            segment: self.segment,
            hit: true,
        }
    }

    pub fn is_ship(self) -> bool {
        !self.segment.is_water()
    }
}

impl fmt::Display for FieldCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hit {
            write!(f, "{}{}", self.segment.code(), HIT_SUFFIX)
        } else {
            f.write_str(self.segment.code())
        }
    }
}

/// The text is not one of the known field codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFieldCode(pub String);

impl fmt::Display for UnknownFieldCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown field code {:?}", self.0)
    }
}

impl std::error::Error for UnknownFieldCode {}

impl FromStr for FieldCode {
    type Err = UnknownFieldCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (base, hit) = match s.strip_suffix(HIT_SUFFIX) {
            Some(base) => (base, true),
            None => (s, false),
        };
        Segment::ALL
            .iter()
            .find(|seg| seg.code() == base)
            .map(|&segment| FieldCode { segment, hit })
            .ok_or_else(|| UnknownFieldCode(s.to_string()))
    }
}
