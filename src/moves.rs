use std::fmt;

use crate::error::Error;
use crate::geom::Delta;
use crate::piece::PieceView;

pub const EMPTY_STACK: Error = Error::invalid_state("pop on an empty moves stack");

/// One slide: a direction paired with the piece it targets. Equality is
/// structural, so a view equal to the piece's state picks out the same
/// move. Applying moves is the board's job; this type never mutates
/// anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    delta: Delta,
    piece: PieceView,
}

impl Move {
    pub fn new(delta: Delta, piece: PieceView) -> Move {
        Move { delta, piece }
    }

    pub fn delta(&self) -> Delta {
        self.delta
    }

    pub fn piece(&self) -> PieceView {
        self.piece
    }

    /// The move that puts this one right again: opposite direction, same
    /// piece.
    pub fn reversed(&self) -> Move {
        Move {
            delta: self.delta.reverse(),
            piece: self.piece,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.delta, self.piece)
    }
}

/// History of applied moves, newest on top.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovesStack {
    moves: Vec<Move>,
}

impl MovesStack {
    pub fn new() -> MovesStack {
        MovesStack { moves: Vec::new() }
    }

    pub fn push(&mut self, m: Move) {
        self.moves.push(m);
    }

    /// Removes and returns the newest move; an empty history is a state
    /// error.
    pub fn pop(&mut self) -> Result<Move, Error> {
        self.moves.pop().ok_or(EMPTY_STACK)
    }

    /// The newest move, left in place.
    pub fn top(&self) -> Option<Move> {
        self.moves.last().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    /// Newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = Move> + '_ {
        self.moves.iter().rev().copied()
    }
}

impl<'a> IntoIterator for &'a MovesStack {
    type Item = Move;
    type IntoIter = std::iter::Copied<std::iter::Rev<std::slice::Iter<'a, Move>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.moves.iter().rev().copied()
    }
}
