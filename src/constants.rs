//! Constants for board geometry, search parameters, and simulation budgets.
//!
//! Squares are indexed `row * 8 + col` in a single `u64` bitboard. Row 0 is
//! rank 8 (the top of the printed board) and column 0 is file `a`.

// =============================================================================
// Board Geometry
// =============================================================================

/// Board size (NxN). Othello is always played on 8x8.
pub const N: usize = 8;

/// Number of squares on the board.
pub const BOARD_SQUARES: usize = N * N;

/// Every square of the board.
pub const FULL_BOARD: u64 = u64::MAX;

/// Mask clearing file `a` (used after shifting east).
pub const NOT_FILE_A: u64 = 0xFEFE_FEFE_FEFE_FEFE;

/// Mask clearing file `h` (used after shifting west).
pub const NOT_FILE_H: u64 = 0x7F7F_7F7F_7F7F_7F7F;

/// Offsets to neighboring squares as (row, col) steps.
/// Order: North, East, South, West, NE, SE, SW, NW
pub const DIRECTIONS: [(isize, isize); 8] = [
    (-1, 0), // North (towards rank 8)
    (0, 1),  // East
    (1, 0),  // South
    (0, -1), // West
    (-1, 1), // NE
    (1, 1),  // SE
    (1, -1), // SW
    (-1, -1), // NW
];

// =============================================================================
// Starting Position
// =============================================================================

/// Black pieces of the default layout: d4 and e5.
pub const START_BLACK: u64 = (1 << 35) | (1 << 28);

/// White pieces of the default layout: d5 and e4.
pub const START_WHITE: u64 = (1 << 27) | (1 << 36);

/// Pieces on the board before the first move.
pub const START_PIECES: u32 = 4;

// =============================================================================
// MCTS Parameters
// =============================================================================

/// UCT exploration constant.
pub const EXPLORATION: f64 = 1.4;

/// Maximum number of plies played by one rollout.
pub const ROLLOUT_DEPTH: usize = 64;

/// Rollouts run from each expanded node per simulation.
pub const ROLLOUTS_PER_LEAF: usize = 1;

/// Default seed for the search RNGs.
pub const DEFAULT_SEED: u64 = 0x5EED_0770;

// =============================================================================
// Simulation Budgets (by game phase)
// =============================================================================

/// Simulations on the very first move; all four replies are symmetric.
pub const SIMS_FIRST_MOVE: usize = 1;

/// Simulations while the board holds at most `OPENING_MAX_PIECES` pieces.
pub const SIMS_OPENING: usize = 500;

/// Simulations in the midgame.
pub const SIMS_MIDGAME: usize = 1000;

/// Simulations once the board holds at least `ENDGAME_MIN_PIECES` pieces.
pub const SIMS_ENDGAME: usize = 750;

/// Upper piece count of the opening phase.
pub const OPENING_MAX_PIECES: u32 = 10;

/// Lower piece count of the endgame phase.
pub const ENDGAME_MIN_PIECES: u32 = 54;
