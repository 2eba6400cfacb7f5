//! Otto-Rust: an Othello engine driven by Monte Carlo Tree Search.
//!
//! The engine keeps a bitboard position whose move data is recomputed after every
//! move and picks moves with UCT search over random playouts, spread across a
//! pool of workers that each grow an independent tree.
//!
//! ## Modules
//!
//! - [`constants`] - Board geometry, search parameters and simulation budgets
//! - [`board`] - Core game logic (placement, captures, skipped turns, scoring)
//! - [`mcts`] - Search tree with UCT selection and backpropagation
//! - [`playout`] - Random game simulation and the position heuristic
//! - [`search`] - Parallel search driver and statistics merging
//! - [`config`] - Runtime search configuration
//! - [`agent`] - Human, random and MCTS players
//! - [`game`] - Console game loop
//! - [`error`] - Error types
//!
//! ## Example
//!
//! ```
//! use otto_rust::board::{Board, Player};
//! use otto_rust::config::{SearchConfig, SimulationBudget};
//! use otto_rust::search::choose_move;
//!
//! // Black opens with e3
//! let mut board = Board::new();
//! board.play("e3".parse().unwrap()).unwrap();
//!
//! // Search for White's reply
//! let config = SearchConfig::default().with_budget(SimulationBudget::fixed(200));
//! let best = choose_move(&board, Player::White, &config).unwrap();
//! assert!(board.is_legal(best));
//! println!("White plays {best}");
//! ```

pub mod agent;
pub mod board;
pub mod config;
pub mod constants;
pub mod error;
pub mod game;
pub mod mcts;
pub mod playout;
pub mod search;
