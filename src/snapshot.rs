use serde_derive::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Error;
use crate::geom::Position;
use crate::grid::Grid;
use crate::piece::PieceView;

/// Serializable stand-in for a board: the side length, the hole, then
/// every piece as its home and current cells. Declaration order is the
/// wire order, and `restore` runs the full board validation, so
/// hand-edited data cannot smuggle in a broken board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSnapshot {
    side: usize,
    empty_space: Position,
    pieces: Vec<PieceView>,
}

impl GridSnapshot {
    pub fn capture(grid: &Grid) -> GridSnapshot {
        GridSnapshot {
            side: grid.size(),
            empty_space: grid.empty_space_position(),
            pieces: grid.pieces().collect(),
        }
    }

    pub fn side(&self) -> usize {
        self.side
    }

    pub fn empty_space(&self) -> Position {
        self.empty_space
    }

    pub fn pieces(&self) -> &[PieceView] {
        &self.pieces
    }

    /// Builds the board back. The stated side must agree with the piece
    /// count; everything else is `Grid::from_pieces` validation.
    pub fn restore(&self) -> Result<Grid, Error> {
        let cells = self
            .side
            .checked_mul(self.side)
            .ok_or(Error::invalid_argument("snapshot side is out of range"))?;
        if self.pieces.len() + 1 != cells {
            return Err(Error::invalid_argument(
                "snapshot side disagrees with its piece count",
            ));
        }
        debug!(side = self.side, "restoring grid from snapshot");
        Grid::from_pieces(&self.pieces, self.empty_space)
    }
}

#[cfg(test)]
mod test {
    use crate::geom::test_util::pos;
    use crate::grid::test_util::grid_from_layout;
    use super::*;

    #[test]
    fn test_capture_reflects_the_grid() {
        let grid = Grid::solved(4).unwrap();
        let snap = GridSnapshot::capture(&grid);
        assert_eq!(snap.side(), 4);
        assert_eq!(snap.empty_space(), pos(3, 3));
        assert_eq!(snap.pieces().len(), 15);
        assert_eq!(snap.pieces()[0], PieceView::new(pos(0, 0), pos(0, 0)));
    }

    #[test]
    fn test_restore_round_trips_a_played_board() {
        let mut grid = Grid::solved(4).unwrap();
        let piece = grid.piece_at_xy(2, 3).unwrap().unwrap();
        assert!(grid.do_move(&piece));
        let piece = grid.piece_at_xy(2, 2).unwrap().unwrap();
        assert!(grid.do_move(&piece));
        let snap = GridSnapshot::capture(&grid);
        assert_eq!(snap.restore().unwrap(), grid);
    }

    #[test]
    fn test_json_round_trip() {
        let grid = grid_from_layout("1 2 3\n4 . 5\n7 8 6");
        let snap = GridSnapshot::capture(&grid);
        let json = serde_json::to_string(&snap).unwrap();
        let parsed: GridSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, snap);
        assert_eq!(parsed.restore().unwrap(), grid);
    }

    #[test]
    fn test_json_field_order_is_the_wire_layout() {
        let snap = GridSnapshot::capture(&Grid::solved(2).unwrap());
        let json = serde_json::to_string(&snap).unwrap();
        assert_eq!(
            json,
            "{\"side\":2,\"empty_space\":[1,1],\"pieces\":[\
             {\"initial\":[0,0],\"current\":[0,0]},\
             {\"initial\":[1,0],\"current\":[1,0]},\
             {\"initial\":[0,1],\"current\":[0,1]}]}",
        );
    }

    #[test]
    fn test_restore_rejects_a_tampered_side() {
        let snap = GridSnapshot::capture(&Grid::solved(2).unwrap());
        let json = serde_json::to_string(&snap).unwrap();
        let tampered: GridSnapshot =
            serde_json::from_str(&json.replace("\"side\":2", "\"side\":3")).unwrap();
        assert!(tampered.restore().is_err());
    }

    #[test]
    fn test_deserialization_rejects_negative_coordinates() {
        let json = "{\"side\":2,\"empty_space\":[1,-1],\"pieces\":[\
                    {\"initial\":[0,0],\"current\":[0,0]},\
                    {\"initial\":[1,0],\"current\":[1,0]},\
                    {\"initial\":[0,1],\"current\":[0,1]}]}";
        assert!(serde_json::from_str::<GridSnapshot>(json).is_err());
    }

    #[test]
    fn test_restore_rejects_duplicated_cells() {
        let json = "{\"side\":2,\"empty_space\":[1,1],\"pieces\":[\
                    {\"initial\":[0,0],\"current\":[0,0]},\
                    {\"initial\":[1,0],\"current\":[0,0]},\
                    {\"initial\":[0,1],\"current\":[0,1]}]}";
        let snap: GridSnapshot = serde_json::from_str(json).unwrap();
        assert!(snap.restore().is_err());
    }
}
