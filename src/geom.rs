use std::fmt;

use serde_derive::{Deserialize, Serialize};

use crate::error::Error;

pub const NEGATIVE_COORDINATE: Error =
    Error::invalid_argument("coordinates must be non-negative");

/// A location on the board. Coordinates are never negative; construction
/// enforces it, so a `Position` in hand is always well formed. `x` grows
/// rightward and `y` grows downward, matching row-major storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "(i32, i32)", into = "(i32, i32)")]
pub struct Position {
    x: i32,
    y: i32,
}

impl Position {
    pub fn from_coordinates(x: i32, y: i32) -> Result<Position, Error> {
        if x < 0 || y < 0 {
            return Err(NEGATIVE_COORDINATE);
        }
        Ok(Position { x, y })
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    /// Taxicab distance to another position.
    pub fn manhattan_distance(&self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Adjacency as the sliding rule understands it: taxicab distance
    /// exactly 1, i.e. the four orthogonal neighbors and nothing else.
    pub fn is_adjacent_to(&self, other: Position) -> bool {
        self.manhattan_distance(other) == 1
    }

    /// The position one step away in the given direction.
    pub fn offset_by(&self, delta: Delta) -> Result<Position, Error> {
        Position::from_coordinates(self.x + delta.dx(), self.y + delta.dy())
    }
}

impl TryFrom<(i32, i32)> for Position {
    type Error = Error;

    fn try_from((x, y): (i32, i32)) -> Result<Position, Error> {
        Position::from_coordinates(x, y)
    }
}

impl From<Position> for (i32, i32) {
    fn from(position: Position) -> (i32, i32) {
        (position.x, position.y)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// The four unit directions a piece can slide in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash,
    strum_macros::EnumCount, strum_macros::EnumIter,
)]
pub enum Delta {
    Up,
    Down,
    Left,
    Right,
}

impl Delta {
    pub fn dx(&self) -> i32 {
        match self {
            Delta::Left => -1,
            Delta::Right => 1,
            Delta::Up | Delta::Down => 0,
        }
    }

    pub fn dy(&self) -> i32 {
        match self {
            Delta::Up => -1,
            Delta::Down => 1,
            Delta::Left | Delta::Right => 0,
        }
    }

    /// The opposite direction, as a fixed table.
    pub fn reverse(&self) -> Delta {
        match self {
            Delta::Up => Delta::Down,
            Delta::Down => Delta::Up,
            Delta::Left => Delta::Right,
            Delta::Right => Delta::Left,
        }
    }

    /// Maps a raw displacement back to a direction. Anything that is not
    /// exactly one of the four unit vectors has no direction.
    pub fn from_offsets(dx: i32, dy: i32) -> Option<Delta> {
        match (dx, dy) {
            (0, -1) => Some(Delta::Up),
            (0, 1) => Some(Delta::Down),
            (-1, 0) => Some(Delta::Left),
            (1, 0) => Some(Delta::Right),
            _ => None,
        }
    }
}

impl fmt::Display for Delta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Delta::Up => "up",
            Delta::Down => "down",
            Delta::Left => "left",
            Delta::Right => "right",
        };
        write!(f, "{}", name)
    }
}

#[cfg(any(test, feature = "test-util"))]
pub mod test_util {
    use super::Position;

    /// Shorthand for tests that place things on known-good coordinates.
    pub fn pos(x: i32, y: i32) -> Position {
        Position::from_coordinates(x, y).unwrap()
    }
}
