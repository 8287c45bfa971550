pub mod error;
pub mod geom;
pub mod piece;
pub mod grid;
pub mod moves;
pub mod puzzle;
pub mod snapshot;
