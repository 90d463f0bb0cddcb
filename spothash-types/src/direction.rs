use serde::{Deserialize, Serialize};
use std::fmt;

/// Compass step from a geohash cell to one of its eight neighbors.
///
/// The declaration order is the fixed neighbor order used throughout the
/// crate: N, NE, E, SE, S, SW, W, NW.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    /// All directions in neighbor order.
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// The four cardinal directions.
    pub const CARDINAL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Position of this direction within [`Direction::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn is_cardinal(self) -> bool {
        matches!(
            self,
            Direction::North | Direction::East | Direction::South | Direction::West
        )
    }

    /// Whether the step moves along a meridian (has a north or south component).
    pub const fn is_meridional(self) -> bool {
        !matches!(self, Direction::East | Direction::West)
    }

    /// Splits a direction into the cardinal steps that compose it.
    ///
    /// Diagonals are the north/south step followed by the east/west step;
    /// cardinal directions return themselves and `None`.
    pub const fn components(self) -> (Direction, Option<Direction>) {
        match self {
            Direction::NorthEast => (Direction::North, Some(Direction::East)),
            Direction::SouthEast => (Direction::South, Some(Direction::East)),
            Direction::SouthWest => (Direction::South, Some(Direction::West)),
            Direction::NorthWest => (Direction::North, Some(Direction::West)),
            cardinal => (cardinal, None),
        }
    }

    pub const fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::NorthEast => Direction::SouthWest,
            Direction::East => Direction::West,
            Direction::SouthEast => Direction::NorthWest,
            Direction::South => Direction::North,
            Direction::SouthWest => Direction::NorthEast,
            Direction::West => Direction::East,
            Direction::NorthWest => Direction::SouthEast,
        }
    }

    /// Short compass label ("n", "ne", ...).
    pub const fn as_str(self) -> &'static str {
        match self {
            Direction::North => "n",
            Direction::NorthEast => "ne",
            Direction::East => "e",
            Direction::SouthEast => "se",
            Direction::South => "s",
            Direction::SouthWest => "sw",
            Direction::West => "w",
            Direction::NorthWest => "nw",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
