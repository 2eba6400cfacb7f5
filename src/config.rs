//! Runtime configuration.
//!
//! Search defaults come from [`crate::constants`]; the CLI overrides
//! individual fields through the `with_*` setters. Starting layouts can be
//! loaded from a YAML config file (see [`GameConfig`]).

use std::num::NonZeroUsize;
use std::thread;
use std::time::Duration;

use serde::Deserialize;

use crate::board::{Board, Player, Square};
use crate::constants::{
    DEFAULT_SEED, ENDGAME_MIN_PIECES, EXPLORATION, N, OPENING_MAX_PIECES, ROLLOUT_DEPTH,
    ROLLOUTS_PER_LEAF, SIMS_ENDGAME, SIMS_FIRST_MOVE, SIMS_MIDGAME, SIMS_OPENING, START_PIECES,
};
use crate::error::LayoutError;

/// Number of simulations to run for a decision, by game phase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimulationBudget {
    pub first_move: usize,
    pub opening: usize,
    pub midgame: usize,
    pub endgame: usize,
    /// Boards with at most this many pieces are in the opening
    pub opening_max_pieces: u32,
    /// Boards with at least this many pieces are in the endgame
    pub endgame_min_pieces: u32,
}

impl Default for SimulationBudget {
    fn default() -> Self {
        Self {
            first_move: SIMS_FIRST_MOVE,
            opening: SIMS_OPENING,
            midgame: SIMS_MIDGAME,
            endgame: SIMS_ENDGAME,
            opening_max_pieces: OPENING_MAX_PIECES,
            endgame_min_pieces: ENDGAME_MIN_PIECES,
        }
    }
}

impl SimulationBudget {
    /// The same number of simulations in every phase.
    pub fn fixed(sims: usize) -> Self {
        Self {
            first_move: sims,
            opening: sims,
            midgame: sims,
            endgame: sims,
            ..Self::default()
        }
    }

    pub fn for_board(&self, board: &Board) -> usize {
        let pieces = board.piece_count();
        if pieces <= START_PIECES {
            self.first_move
        } else if pieces <= self.opening_max_pieces {
            self.opening
        } else if pieces >= self.endgame_min_pieces {
            self.endgame
        } else {
            self.midgame
        }
    }
}

/// Parameters for one move decision.
#[derive(Clone, Debug)]
pub struct SearchConfig {
    /// UCT exploration constant `c`
    pub exploration: f64,
    /// Maximum plies per rollout
    pub rollout_depth: usize,
    /// Rollouts run from each expanded node per simulation
    pub rollouts_per_leaf: usize,
    /// Size of the worker pool
    pub workers: usize,
    /// Base seed; worker `i` derives its own stream from it
    pub seed: u64,
    /// Stop starting new simulations after this long
    pub time_limit: Option<Duration>,
    pub budget: SimulationBudget,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            exploration: EXPLORATION,
            rollout_depth: ROLLOUT_DEPTH,
            rollouts_per_leaf: ROLLOUTS_PER_LEAF,
            workers: default_workers(),
            seed: DEFAULT_SEED,
            time_limit: None,
            budget: SimulationBudget::default(),
        }
    }
}

impl SearchConfig {
    pub fn with_exploration(mut self, exploration: f64) -> Self {
        self.exploration = exploration;
        self
    }

    pub fn with_rollout_depth(mut self, depth: usize) -> Self {
        self.rollout_depth = depth;
        self
    }

    pub fn with_rollouts_per_leaf(mut self, rollouts: usize) -> Self {
        self.rollouts_per_leaf = rollouts.max(1);
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_time_limit(mut self, limit: Option<Duration>) -> Self {
        self.time_limit = limit;
        self
    }

    pub fn with_budget(mut self, budget: SimulationBudget) -> Self {
        self.budget = budget;
        self
    }
}

/// Game settings read from a YAML config file:
///
/// ```yaml
/// board:
///   starting_position:
///     - [null, null, null, null, null, null, null, null]
///     # ... 8 rows of null / 'B' / 'W', rank 8 first
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct GameConfig {
    pub board: BoardConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct BoardConfig {
    /// Rows of cells, rank 8 first; `None` is an empty cell
    #[serde(default = "standard_starting_position")]
    pub starting_position: Vec<Vec<Option<char>>>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            starting_position: standard_starting_position(),
        }
    }
}

fn standard_starting_position() -> Vec<Vec<Option<char>>> {
    let board = Board::new();
    (0..N)
        .map(|row| {
            (0..N)
                .map(|col| {
                    Square::new(row, col)
                        .and_then(|sq| board.piece_at(sq))
                        .map(Player::symbol)
                })
                .collect()
        })
        .collect()
}

impl GameConfig {
    pub fn from_yaml(text: &str) -> Result<Self, LayoutError> {
        serde_yaml::from_str(text).map_err(|err| LayoutError::Format(err.to_string()))
    }

    /// The configured starting position with Black to move.
    pub fn starting_board(&self) -> Result<Board, LayoutError> {
        Board::from_cells(&self.board.starting_position, Player::Black)
    }
}

/// One worker per available core.
pub fn default_workers() -> usize {
    thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_by_phase() {
        let budget = SimulationBudget::default();
        let mut board = Board::new();
        assert_eq!(budget.for_board(&board), 1);

        board.play("e3".parse().unwrap()).unwrap();
        assert_eq!(board.piece_count(), 5);
        assert_eq!(budget.for_board(&board), 500);

        let mid: Board = "
            ........
            ........
            ..WWWW..
            ..WBBW..
            ..BBBW..
            ..B.....
            ........
            ........
        "
        .parse()
        .unwrap();
        assert_eq!(mid.piece_count(), 13);
        assert_eq!(budget.for_board(&mid), 1000);

        let late = Board::from_bitboards(u64::MAX >> 10, 0, Player::White).unwrap();
        assert_eq!(late.piece_count(), 54);
        assert_eq!(budget.for_board(&late), 750);
    }

    #[test]
    fn test_setters_clamp() {
        let config = SearchConfig::default()
            .with_workers(0)
            .with_rollouts_per_leaf(0)
            .with_seed(9);
        assert_eq!(config.workers, 1);
        assert_eq!(config.rollouts_per_leaf, 1);
        assert_eq!(config.seed, 9);
        assert!(default_workers() >= 1);
    }

    const STANDARD_CONFIG: &str = "
board:
  starting_position:
    - [null, null, null, null, null, null, null, null]
    - [null, null, null, null, null, null, null, null]
    - [null, null, null, null, null, null, null, null]
    - [null, null, null, 'W', 'B', null, null, null]
    - [null, null, null, 'B', 'W', null, null, null]
    - [null, null, null, null, null, null, null, null]
    - [null, null, null, null, null, null, null, null]
    - [null, null, null, null, null, null, null, null]
";

    #[test]
    fn test_yaml_config_loads_starting_position() {
        let config = GameConfig::from_yaml(STANDARD_CONFIG).unwrap();
        let board = config.starting_board().unwrap();
        assert_eq!(board, Board::new());
        assert_eq!(board.to_move(), Player::Black);
        assert_eq!(config.board, BoardConfig::default());
    }

    #[test]
    fn test_yaml_config_custom_layout() {
        let empty_rank = "[null, null, null, null, null, null, null, null]";
        let top_rank = "['B', 'W', null, null, null, null, null, null]";
        let yaml = STANDARD_CONFIG.replacen(empty_rank, top_rank, 1);
        let config = GameConfig::from_yaml(&yaml).unwrap();
        let board = config.starting_board().unwrap();
        assert_eq!(board.piece_at("a8".parse().unwrap()), Some(Player::Black));
        assert_eq!(board.piece_at("b8".parse().unwrap()), Some(Player::White));
        assert!(board.is_legal("c8".parse().unwrap()));
    }

    #[test]
    fn test_yaml_config_defaults_and_errors() {
        let config = GameConfig::from_yaml("board: {}").unwrap();
        assert_eq!(config.starting_board(), Ok(Board::new()));

        let bad_symbol = STANDARD_CONFIG.replacen("'W'", "'X'", 1);
        let config = GameConfig::from_yaml(&bad_symbol).unwrap();
        assert_eq!(
            config.starting_board(),
            Err(LayoutError::Symbol {
                row: 3,
                symbol: 'X',
            })
        );

        let short = GameConfig::from_yaml("board:\n  starting_position: [[null]]").unwrap();
        assert_eq!(short.starting_board(), Err(LayoutError::RowCount(1)));

        let unterminated = GameConfig::from_yaml("board: [1, 2").unwrap_err();
        assert!(matches!(unterminated, LayoutError::Format(_)));
        let missing_board = GameConfig::from_yaml("{}").unwrap_err();
        assert!(matches!(missing_board, LayoutError::Format(_)));
    }
}
