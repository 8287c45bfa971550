use std::env;

use color_eyre::eyre::eyre;
use fifteen::geom::Delta;
use fifteen::grid::Grid;
use fifteen::moves::{Move, MovesStack};
use fifteen::puzzle::{PieceMoved, Puzzle};
use fifteen::snapshot::GridSnapshot;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use strum::IntoEnumIterator;
use tracing_subscriber::EnvFilter;

const DEFAULT_SIZE: usize = 4;
const DEFAULT_STEPS: usize = 24;
const DEFAULT_SEED: u64 = 0xf1f7ee2a11ce5eed;

// Usage: random-walk [size] [steps] [seed]
//
// Deals a shuffled board, walks it with random legal moves while recording
// them, then undoes the whole walk and checks the board came back.
fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    let size = match args.get(1) {
        Some(arg) => arg.parse()?,
        None => DEFAULT_SIZE,
    };
    let steps = match args.get(2) {
        Some(arg) => arg.parse()?,
        None => DEFAULT_STEPS,
    };
    let seed = match args.get(3) {
        Some(arg) => arg.parse()?,
        None => DEFAULT_SEED,
    };

    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let grid = Grid::shuffled(size, &mut rng)?;
    let start = GridSnapshot::capture(&grid);
    println!("shuffled {size}x{size} board, solvable: {}", grid.is_solvable());
    print!("{grid}");

    let mut puzzle = Puzzle::from_grid(grid);
    puzzle.register_listener(Box::new(|event: &PieceMoved| {
        println!("  {} slid {} -> {}", event.piece, event.from, event.to);
    }));

    let mut history = MovesStack::new();
    for _ in 0..steps {
        let hole = puzzle.empty_space_position();
        let mut candidates = Vec::new();
        for delta in Delta::iter() {
            let neighbor = match hole.offset_by(delta) {
                Ok(neighbor) => neighbor,
                Err(_) => continue,
            };
            if let Ok(Some(piece)) = puzzle.piece_at(neighbor) {
                // The piece slides opposite to the direction out of the hole.
                candidates.push((delta.reverse(), piece));
            }
        }
        let (delta, piece) = candidates[rng.random_range(0..candidates.len())];
        if !puzzle.do_move(&piece) {
            return Err(eyre!("walk chose an illegal move: {delta} {piece}"));
        }
        let moved = puzzle
            .piece_at(hole)?
            .ok_or_else(|| eyre!("the hole at {hole} was not filled"))?;
        history.push(Move::new(delta, moved));
    }
    println!("after {} moves:", history.len());
    print!("{puzzle}");

    println!("undoing {} moves", history.len());
    while let Ok(m) = history.pop() {
        let undo = m.reversed();
        if !puzzle.do_move(&undo.piece()) {
            return Err(eyre!("undo was rejected: {undo}"));
        }
    }

    let end = puzzle.snapshot();
    if end != start {
        return Err(eyre!("undo walk did not restore the starting board"));
    }
    println!("walk undone, back at the starting board");
    println!("{}", serde_json::to_string_pretty(&end)?);
    Ok(())
}
