use std::fmt;

use bit_set::BitSet;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, trace};

use crate::error::Error;
use crate::geom::Position;
use crate::piece::{MutablePiece, Piece, PieceView};

pub const BAD_SIZE: Error = Error::invalid_argument("grid size must be at least 2");
pub const OUT_OF_BOUNDS: Error = Error::invalid_argument("position is outside the grid");

// In-bounds slot coordinates always form a valid position.
fn cell(x: usize, y: usize) -> Position {
    Position::from_coordinates(x as i32, y as i32).unwrap()
}

/// The square board: a flattened row-major array of piece slots with
/// exactly one hole, whose position is tracked alongside. Every occupied
/// slot holds a piece standing on that slot's coordinates, and the pieces'
/// home cells tile the whole board minus one cell. Only `do_move` and
/// `do_move_to` ever change a board after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    size: usize,
    slots: Box<[Option<MutablePiece>]>,
    empty_space: Position,
}

impl Grid {
    fn with_hole_at_corner(size: usize) -> Result<Grid, Error> {
        if size <= 1 {
            return Err(BAD_SIZE);
        }
        Ok(Grid {
            size,
            slots: vec![None; size * size].into_boxed_slice(),
            empty_space: cell(size - 1, size - 1),
        })
    }

    /// A solved board: every piece on its own cell, hole at the
    /// bottom-right corner.
    pub fn solved(size: usize) -> Result<Grid, Error> {
        let mut grid = Grid::with_hole_at_corner(size)?;
        for idx in 0..size * size - 1 {
            grid.slots[idx] = Some(MutablePiece::new(cell(idx % size, idx / size)));
        }
        debug!(size, "created solved grid");
        Ok(grid)
    }

    /// A board with the pieces dealt onto the cells in uniformly random
    /// order; the hole stays at the bottom-right corner. The permutation is
    /// not screened in any way, so roughly half of all deals are not
    /// solvable by sliding; see `is_solvable`.
    pub fn shuffled<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Result<Grid, Error> {
        let mut grid = Grid::with_hole_at_corner(size)?;
        let mut pieces: Vec<MutablePiece> = (0..size * size - 1)
            .map(|idx| MutablePiece::new(cell(idx % size, idx / size)))
            .collect();
        pieces.shuffle(rng);
        for (idx, mut piece) in pieces.into_iter().enumerate() {
            piece.move_to(cell(idx % size, idx / size));
            grid.slots[idx] = Some(piece);
        }
        debug!(size, "created shuffled grid");
        Ok(grid)
    }

    /// Rebuilds a board from captured piece views plus the hole position.
    /// The input must tile a square board of size at least 2: a piece for
    /// every cell but the hole, no cell stood on twice, no home cell
    /// claimed twice, nothing out of bounds.
    pub fn from_pieces(pieces: &[PieceView], empty_space: Position) -> Result<Grid, Error> {
        let cells = pieces.len() + 1;
        let size = cells.isqrt();
        if size * size != cells {
            return Err(Error::invalid_argument(
                "piece count does not fill a square grid",
            ));
        }
        let mut grid = Grid::with_hole_at_corner(size)?;
        if !grid.is_within_bounds(empty_space) {
            return Err(OUT_OF_BOUNDS);
        }
        grid.empty_space = empty_space;
        let mut currents = BitSet::with_capacity(cells);
        let mut initials = BitSet::with_capacity(cells);
        for view in pieces {
            if !grid.is_within_bounds(view.position())
                || !grid.is_within_bounds(view.initial_position())
            {
                return Err(OUT_OF_BOUNDS);
            }
            if view.position() == empty_space {
                return Err(Error::invalid_argument("a piece stands on the empty space"));
            }
            let slot = grid.slot_index(view.position());
            if !currents.insert(slot) {
                return Err(Error::invalid_argument("two pieces stand on the same cell"));
            }
            if !initials.insert(grid.slot_index(view.initial_position())) {
                return Err(Error::invalid_argument("two pieces claim the same home cell"));
            }
            let mut piece = MutablePiece::new(view.initial_position());
            piece.move_to(view.position());
            grid.slots[slot] = Some(piece);
        }
        debug!(size, "restored grid from pieces");
        Ok(grid)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn empty_space_position(&self) -> Position {
        self.empty_space
    }

    fn is_within_bounds(&self, position: Position) -> bool {
        (position.x() as usize) < self.size && (position.y() as usize) < self.size
    }

    fn slot_index(&self, position: Position) -> usize {
        position.y() as usize * self.size + position.x() as usize
    }

    /// The piece standing at `position`, or `None` exactly at the hole.
    /// What comes back is a frozen view; moving pieces goes through
    /// `do_move`.
    pub fn piece_at(&self, position: Position) -> Result<Option<PieceView>, Error> {
        if !self.is_within_bounds(position) {
            return Err(OUT_OF_BOUNDS);
        }
        Ok(self.slots[self.slot_index(position)]
            .as_ref()
            .map(|piece| piece.view()))
    }

    /// Coordinate form of `piece_at`; negative coordinates fail as
    /// malformed positions.
    pub fn piece_at_xy(&self, x: i32, y: i32) -> Result<Option<PieceView>, Error> {
        self.piece_at(Position::from_coordinates(x, y)?)
    }

    /// Slides the piece standing at the given piece's position into the
    /// hole, provided that position is adjacent to the hole. The argument
    /// is resolved by position against the actual board, so a stale view
    /// still names the right cell. Returns false, changing nothing, for
    /// any other request.
    pub fn do_move(&mut self, piece: &dyn Piece) -> bool {
        self.move_into_hole(piece.position()).is_some()
    }

    /// As `do_move`, but the caller also states where the piece should
    /// land; anything other than the current hole is refused.
    pub fn do_move_to(&mut self, piece: &dyn Piece, destination: Position) -> bool {
        if destination != self.empty_space {
            trace!(%destination, "move rejected: destination is not the hole");
            return false;
        }
        self.move_into_hole(piece.position()).is_some()
    }

    pub(crate) fn move_into_hole(&mut self, from: Position) -> Option<PieceView> {
        if !self.is_within_bounds(from) || !from.is_adjacent_to(self.empty_space) {
            trace!(%from, "move rejected: not a cell adjacent to the hole");
            return None;
        }
        let from_slot = self.slot_index(from);
        let hole_slot = self.slot_index(self.empty_space);
        // Adjacent to the hole, so `from` cannot be the hole itself.
        let mut piece = self.slots[from_slot].take().unwrap();
        piece.move_to(self.empty_space);
        let view = piece.view();
        self.slots[hole_slot] = Some(piece);
        self.empty_space = from;
        debug!(from = %from, to = %view.position(), "piece moved");
        Some(view)
    }

    /// Walks every occupied cell in row-major order, skipping the hole.
    /// Each call starts an independent walk.
    pub fn pieces(&self) -> Pieces<'_> {
        Pieces {
            slots: &self.slots,
            next: 0,
            hole: self.slot_index(self.empty_space),
        }
    }

    /// Standard permutation-parity test: rank each piece by the row-major
    /// index of its home cell and count inversions in the row-major reading
    /// of the board. An odd-sized board is solvable iff the count is even;
    /// an even-sized board also weighs in the row the hole sits on. Purely
    /// a query; no factory screens by it.
    pub fn is_solvable(&self) -> bool {
        let ranks: Vec<usize> = self
            .pieces()
            .map(|piece| self.slot_index(piece.initial_position()))
            .collect();
        let mut inversions = 0usize;
        for i in 0..ranks.len() {
            for j in i + 1..ranks.len() {
                if ranks[i] > ranks[j] {
                    inversions += 1;
                }
            }
        }
        if self.size % 2 == 1 {
            inversions % 2 == 0
        } else {
            (inversions + self.empty_space.y() as usize) % 2 == 1
        }
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.size {
            for x in 0..self.size {
                if x > 0 {
                    write!(f, " ")?;
                }
                match &self.slots[y * self.size + x] {
                    Some(piece) => {
                        let rank = self.slot_index(piece.initial_position());
                        write!(f, "{:2}", rank + 1)?;
                    }
                    None => write!(f, " .")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Iterator over the occupied cells of one board. Finite; the hole index
/// is fixed up front.
#[derive(Debug, Clone)]
pub struct Pieces<'a> {
    slots: &'a [Option<MutablePiece>],
    next: usize,
    hole: usize,
}

impl<'a> Iterator for Pieces<'a> {
    type Item = PieceView;

    fn next(&mut self) -> Option<PieceView> {
        if self.next == self.hole {
            self.next += 1;
        }
        let slot = self.slots.get(self.next)?;
        self.next += 1;
        // Every slot but the hole is occupied.
        Some(slot.as_ref().unwrap().view())
    }
}

impl<'a> IntoIterator for &'a Grid {
    type Item = PieceView;
    type IntoIter = Pieces<'a>;

    fn into_iter(self) -> Pieces<'a> {
        self.pieces()
    }
}

#[cfg(any(test, feature = "test-util"))]
pub mod test_util {
    use super::*;

    /// Builds a board from a text layout of 1-based piece numbers with `.`
    /// for the hole, e.g. "1 2\n3 .". Piece k's home cell is wherever k
    /// sits on a solved board. Panics on layouts that do not describe a
    /// board.
    pub fn grid_from_layout(s: &str) -> Grid {
        let rows: Vec<Vec<&str>> = s
            .lines()
            .map(|line| line.split_whitespace().collect::<Vec<_>>())
            .filter(|tokens| !tokens.is_empty())
            .collect();
        let size = rows.len();
        let mut views = Vec::new();
        let mut hole = None;
        for (y, row) in rows.iter().enumerate() {
            assert_eq!(row.len(), size, "layout is not square");
            for (x, token) in row.iter().enumerate() {
                let here = cell(x, y);
                if *token == "." {
                    assert!(hole.is_none(), "layout has more than one hole");
                    hole = Some(here);
                    continue;
                }
                let number: usize = token.parse().expect("layout tokens are numbers or '.'");
                assert!(number >= 1 && number < size * size, "piece number out of range");
                let rank = number - 1;
                views.push(PieceView::new(cell(rank % size, rank / size), here));
            }
        }
        Grid::from_pieces(&views, hole.expect("layout needs a hole")).unwrap()
    }
}
