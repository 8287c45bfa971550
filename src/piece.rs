use std::fmt;

use serde_derive::{Deserialize, Serialize};

use crate::error::Error;
use crate::geom::{Delta, Position};

pub const NEGATIVE_DISPLACEMENT: Error =
    Error::invalid_state("displacement would take the piece to a negative coordinate");

/// What every piece can answer: where it belongs and where it stands. Two
/// pieces are the same piece exactly when both answers match; object
/// identity plays no part. `view` freezes the answers into a plain value.
pub trait Piece {
    /// The cell this piece is meant to end up on, fixed at creation.
    fn initial_position(&self) -> Position;

    /// The cell this piece stands on right now.
    fn position(&self) -> Position;

    fn is_at_correct_position(&self) -> bool {
        self.position() == self.initial_position()
    }

    fn view(&self) -> PieceView {
        PieceView::new(self.initial_position(), self.position())
    }
}

/// A piece frozen at the moment it was observed. This is the only piece
/// type the board hands out; holding one grants no way to touch board
/// state. It doubles as the per-piece record inside snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PieceView {
    initial: Position,
    current: Position,
}

impl PieceView {
    pub fn new(initial: Position, current: Position) -> PieceView {
        PieceView { initial, current }
    }
}

impl Piece for PieceView {
    fn initial_position(&self) -> Position {
        self.initial
    }

    fn position(&self) -> Position {
        self.current
    }

    fn view(&self) -> PieceView {
        *self
    }
}

impl fmt::Display for PieceView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.initial, self.current)
    }
}

/// The one piece variant whose position can change. Boards construct and
/// own these; nothing outside the crate ever receives one from a board.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MutablePiece {
    initial: Position,
    current: Position,
}

impl MutablePiece {
    /// A new piece standing on its own correct cell.
    pub fn new(initial: Position) -> MutablePiece {
        MutablePiece { initial, current: initial }
    }

    pub fn from_coordinates(x: i32, y: i32) -> Result<MutablePiece, Error> {
        Ok(MutablePiece::new(Position::from_coordinates(x, y)?))
    }

    /// Overwrites the current position. No bounds or adjacency checking
    /// happens here; the board decides what is legal.
    pub fn move_to(&mut self, destination: Position) {
        self.current = destination;
    }

    /// Steps one cell in the given direction. The piece already exists, so
    /// a step off the negative edge is a state error, and the position is
    /// left untouched when that happens.
    pub fn move_by(&mut self, delta: Delta) -> Result<(), Error> {
        self.current = self
            .current
            .offset_by(delta)
            .map_err(|_| NEGATIVE_DISPLACEMENT)?;
        Ok(())
    }
}

impl Piece for MutablePiece {
    fn initial_position(&self) -> Position {
        self.initial
    }

    fn position(&self) -> Position {
        self.current
    }
}

#[cfg(any(test, feature = "test-util"))]
pub mod test_util {
    use super::*;

    /// A piece whose two positions are chosen freely, for driving board
    /// code with pieces no board created.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TestPiece {
        initial: Position,
        current: Position,
    }

    impl TestPiece {
        /// A piece standing on its own cell.
        pub fn at(x: i32, y: i32) -> TestPiece {
            let p = Position::from_coordinates(x, y).unwrap();
            TestPiece { initial: p, current: p }
        }

        /// A piece standing somewhere other than where it claims to belong.
        pub fn displaced(ix: i32, iy: i32, cx: i32, cy: i32) -> TestPiece {
            TestPiece {
                initial: Position::from_coordinates(ix, iy).unwrap(),
                current: Position::from_coordinates(cx, cy).unwrap(),
            }
        }
    }

    impl Piece for TestPiece {
        fn initial_position(&self) -> Position {
            self.initial
        }

        fn position(&self) -> Position {
            self.current
        }
    }
}
