//! Monte Carlo playouts (random game simulation).
//!
//! A playout plays uniformly random legal moves on a private copy of the
//! board until the game ends or a ply limit is reached, then reduces the
//! final position to a single value for the root player.

use fastrand::Rng;

use crate::board::{Board, Outcome, Player, Square, squares};
use crate::constants::BOARD_SQUARES;
use crate::error::SearchError;

/// Choose a uniformly random legal move for the side to move.
pub fn random_move(board: &Board, rng: &mut Rng) -> Option<Square> {
    let count = board.legal_count();
    if count == 0 {
        return None;
    }
    squares(board.legal_mask()).nth(rng.usize(..count))
}

/// Perform a playout of at most `max_depth` plies starting from `board`.
///
/// `board` itself is never touched; the simulation runs on a clone so that
/// concurrent workers only ever read shared snapshots.
/// Returns the [`heuristic_value`] of the position where the playout stopped.
pub fn rollout(
    board: &Board,
    root_player: Player,
    max_depth: usize,
    rng: &mut Rng,
) -> Result<f64, SearchError> {
    let mut sim = board.clone();

    for _ in 0..max_depth {
        if sim.is_game_over() {
            break;
        }
        let Some(mv) = random_move(&sim, rng) else {
            break;
        };
        sim.play(mv)?;
    }

    Ok(heuristic_value(&sim, root_player))
}

/// Piece difference seen from `player`.
#[inline]
fn material_for(board: &Board, player: Player) -> f64 {
    let diff = board.evaluate() as f64;
    match player {
        Player::Black => diff,
        Player::White => -diff,
    }
}

/// Value of a position for `root_player`.
///
/// Blends material with the game result:
/// `material * w + outcome * (1 - w)` where `w = pieces / 64`. Material counts
/// for more as the board fills up. `outcome` is +1/-1 for a win/loss and 0 for
/// a draw or an unfinished game, so depth-limited playouts fall back to
/// weighted material alone.
pub fn heuristic_value(board: &Board, root_player: Player) -> f64 {
    let weight = board.piece_count() as f64 / BOARD_SQUARES as f64;
    let outcome = match board.outcome() {
        Some(Outcome::Win(winner)) if winner == root_player => 1.0,
        Some(Outcome::Win(_)) => -1.0,
        Some(Outcome::Draw) | None => 0.0,
    };
    material_for(board, root_player) * weight + outcome * (1.0 - weight)
}
