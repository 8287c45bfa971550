use std::fmt;

use rand::rng;
use tracing::trace;

use crate::error::Error;
use crate::geom::Position;
use crate::grid::{Grid, Pieces};
use crate::piece::{Piece, PieceView};
use crate::snapshot::GridSnapshot;

/// What listeners hear after a slide commits: the piece as it now stands,
/// where it was, and where it went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceMoved {
    pub piece: PieceView,
    pub from: Position,
    pub to: Position,
}

/// Receiver for committed moves. Any `FnMut(&PieceMoved)` closure
/// qualifies.
pub trait ModificationListener {
    fn piece_moved(&mut self, event: &PieceMoved);
}

impl<F: FnMut(&PieceMoved)> ModificationListener for F {
    fn piece_moved(&mut self, event: &PieceMoved) {
        self(event)
    }
}

/// Handle for removing a registered listener; boxed callbacks have no
/// identity of their own to be removed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Facade pairing one board with an audience. Queries and moves delegate
/// to the board; a successful move additionally notifies every registered
/// listener, synchronously and in registration order, before returning.
pub struct Puzzle {
    grid: Grid,
    listeners: Vec<(ListenerId, Box<dyn ModificationListener>)>,
    next_listener: u64,
}

impl fmt::Debug for Puzzle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Puzzle")
            .field("grid", &self.grid)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Puzzle {
    pub fn from_grid(grid: Grid) -> Puzzle {
        Puzzle {
            grid,
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    /// A fresh solved or shuffled board of the given size. Shuffling draws
    /// from the thread-local generator; build the grid yourself for
    /// deterministic deals.
    pub fn new(size: usize, shuffled: bool) -> Result<Puzzle, Error> {
        let grid = if shuffled {
            Grid::shuffled(size, &mut rng())?
        } else {
            Grid::solved(size)?
        };
        Ok(Puzzle::from_grid(grid))
    }

    pub fn size(&self) -> usize {
        self.grid.size()
    }

    pub fn empty_space_position(&self) -> Position {
        self.grid.empty_space_position()
    }

    pub fn piece_at(&self, position: Position) -> Result<Option<PieceView>, Error> {
        self.grid.piece_at(position)
    }

    pub fn piece_at_xy(&self, x: i32, y: i32) -> Result<Option<PieceView>, Error> {
        self.grid.piece_at_xy(x, y)
    }

    pub fn pieces(&self) -> Pieces<'_> {
        self.grid.pieces()
    }

    pub fn is_solvable(&self) -> bool {
        self.grid.is_solvable()
    }

    pub fn snapshot(&self) -> GridSnapshot {
        GridSnapshot::capture(&self.grid)
    }

    pub fn register_listener(&mut self, listener: Box<dyn ModificationListener>) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, listener));
        id
    }

    /// True if the id was registered. Removing the same id twice is a
    /// no-op returning false.
    pub fn unregister_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(registered, _)| *registered != id);
        self.listeners.len() != before
    }

    /// Slides the piece into the hole exactly as `Grid::do_move` does,
    /// then tells every listener about it.
    pub fn do_move(&mut self, piece: &dyn Piece) -> bool {
        let from = piece.position();
        let to = self.grid.empty_space_position();
        let moved = match self.grid.move_into_hole(from) {
            Some(moved) => moved,
            None => return false,
        };
        let event = PieceMoved { piece: moved, from, to };
        trace!(listeners = self.listeners.len(), "dispatching move event");
        for (_, listener) in self.listeners.iter_mut() {
            listener.piece_moved(&event);
        }
        true
    }
}

impl fmt::Display for Puzzle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.grid, f)
    }
}

impl<'a> IntoIterator for &'a Puzzle {
    type Item = PieceView;
    type IntoIter = Pieces<'a>;

    fn into_iter(self) -> Pieces<'a> {
        self.grid.pieces()
    }
}

#[cfg(test)]
mod test {
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::geom::test_util::pos;
    use super::*;

    #[test]
    fn test_facade_delegates_to_its_grid() {
        let puzzle = Puzzle::new(4, false).unwrap();
        assert_eq!(puzzle.size(), 4);
        assert_eq!(puzzle.empty_space_position(), pos(3, 3));
        assert_eq!(puzzle.piece_at_xy(3, 3).unwrap(), None);
        let corner = puzzle.piece_at(pos(0, 0)).unwrap().unwrap();
        assert!(corner.is_at_correct_position());
        assert_eq!(puzzle.pieces().count(), 15);
        assert_eq!((&puzzle).into_iter().count(), 15);
        assert!(puzzle.is_solvable());
        assert_eq!(puzzle.to_string(), Grid::solved(4).unwrap().to_string());
    }

    #[test]
    fn test_new_shuffled_deals_every_piece() {
        let puzzle = Puzzle::new(4, true).unwrap();
        assert_eq!(puzzle.empty_space_position(), pos(3, 3));
        assert_eq!(puzzle.pieces().count(), 15);
        for view in &puzzle {
            assert_eq!(puzzle.piece_at(view.position()).unwrap(), Some(view));
        }
    }

    #[test]
    fn test_moves_notify_listeners_in_registration_order() {
        let mut puzzle = Puzzle::new(4, false).unwrap();
        let log: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
        let first = Rc::clone(&log);
        puzzle.register_listener(Box::new(move |event: &PieceMoved| {
            first.borrow_mut().push(format!("first {}->{}", event.from, event.to));
        }));
        let second = Rc::clone(&log);
        puzzle.register_listener(Box::new(move |event: &PieceMoved| {
            second.borrow_mut().push(format!("second {}->{}", event.from, event.to));
        }));
        let piece = puzzle.piece_at_xy(2, 3).unwrap().unwrap();
        assert!(puzzle.do_move(&piece));
        assert_eq!(
            log.borrow().as_slice(),
            ["first (2,3)->(3,3)", "second (2,3)->(3,3)"],
        );
    }

    #[test]
    fn test_events_carry_the_post_move_piece() {
        let mut puzzle = Puzzle::new(4, false).unwrap();
        let seen: Rc<RefCell<Vec<PieceMoved>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        puzzle.register_listener(Box::new(move |event: &PieceMoved| {
            sink.borrow_mut().push(*event);
        }));
        let piece = puzzle.piece_at_xy(3, 2).unwrap().unwrap();
        assert!(puzzle.do_move(&piece));
        let events = seen.borrow();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].from, pos(3, 2));
        assert_eq!(events[0].to, pos(3, 3));
        assert_eq!(events[0].piece.position(), pos(3, 3));
        assert_eq!(events[0].piece.initial_position(), pos(3, 2));
        assert!(!events[0].piece.is_at_correct_position());
    }

    #[test]
    fn test_rejected_moves_stay_silent() {
        let mut puzzle = Puzzle::new(4, false).unwrap();
        let count = Rc::new(RefCell::new(0usize));
        let sink = Rc::clone(&count);
        puzzle.register_listener(Box::new(move |_: &PieceMoved| {
            *sink.borrow_mut() += 1;
        }));
        let far = puzzle.piece_at_xy(0, 0).unwrap().unwrap();
        assert!(!puzzle.do_move(&far));
        assert_eq!(*count.borrow(), 0);
        assert_eq!(puzzle.empty_space_position(), pos(3, 3));
    }

    #[test]
    fn test_unregister_stops_delivery() {
        let mut puzzle = Puzzle::new(4, false).unwrap();
        let log: Rc<RefCell<Vec<&'static str>>> = Rc::new(RefCell::new(Vec::new()));
        let first = Rc::clone(&log);
        let first_id = puzzle.register_listener(Box::new(move |_: &PieceMoved| {
            first.borrow_mut().push("first");
        }));
        let second = Rc::clone(&log);
        puzzle.register_listener(Box::new(move |_: &PieceMoved| {
            second.borrow_mut().push("second");
        }));
        assert!(puzzle.unregister_listener(first_id));
        assert!(!puzzle.unregister_listener(first_id));
        let piece = puzzle.piece_at_xy(2, 3).unwrap().unwrap();
        assert!(puzzle.do_move(&piece));
        assert_eq!(log.borrow().as_slice(), ["second"]);
    }

    #[test]
    fn test_snapshot_goes_through_the_facade() {
        let mut puzzle = Puzzle::new(3, false).unwrap();
        let piece = puzzle.piece_at_xy(1, 2).unwrap().unwrap();
        assert!(puzzle.do_move(&piece));
        let snap = puzzle.snapshot();
        assert_eq!(snap.side(), 3);
        assert_eq!(snap.empty_space(), pos(1, 2));
        assert_eq!(snap.pieces().len(), 8);
    }
}
