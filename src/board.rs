//! Othello board representation and move execution.
//!
//! This module provides the core game logic, including:
//! - Occupancy stored as one `u64` bitboard per player
//! - Candidate squares (empties next to an opponent piece) for the side to move
//! - Legality and flipping under the 8-direction capture rule
//! - Turn skipping and game-over detection
//!
//! Every mutation goes through [`Board::apply_move`], which recomputes all
//! derived state before returning, so a `Board` is never observed half-updated.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::constants::{
    BOARD_SQUARES, DIRECTIONS, FULL_BOARD, N, NOT_FILE_A, NOT_FILE_H, START_BLACK, START_WHITE,
};
use crate::error::{LayoutError, MoveError, ParseSquareError};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Player {
    Black,
    White,
}

impl Player {
    #[inline]
    pub fn opponent(self) -> Self {
        match self {
            Player::Black => Player::White,
            Player::White => Player::Black,
        }
    }

    /// Slot of this player in per-player arrays.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Player::Black => 0,
            Player::White => 1,
        }
    }

    /// Layout symbol: `'B'` or `'W'`.
    pub fn symbol(self) -> char {
        match self {
            Player::Black => 'B',
            Player::White => 'W',
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::Black => write!(f, "Black"),
            Player::White => write!(f, "White"),
        }
    }
}

/// A square on the board, stored as its bit index `row * 8 + col`.
///
/// Row 0 is rank 8 and column 0 is file `a`, so `"a8"` is index 0 and `"h1"`
/// is index 63.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square(u8);

impl Square {
    /// Square at a zero-based (row, col), or `None` when off the board.
    pub fn new(row: usize, col: usize) -> Option<Self> {
        if row < N && col < N {
            Some(Square((row * N + col) as u8))
        } else {
            None
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        (index < BOARD_SQUARES).then_some(Square(index as u8))
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn row(self) -> usize {
        self.index() / N
    }

    #[inline]
    pub fn col(self) -> usize {
        self.index() % N
    }

    #[inline]
    pub fn bit(self) -> u64 {
        1u64 << self.0
    }

    /// The neighboring square one step in `(dr, dc)`, if it is on the board.
    #[inline]
    fn step(self, (dr, dc): (isize, isize)) -> Option<Self> {
        let row = self.row().checked_add_signed(dr)?;
        let col = self.col().checked_add_signed(dc)?;
        Square::new(row, col)
    }
}

impl FromStr for Square {
    type Err = ParseSquareError;

    /// Parse algebraic notation: a file letter `a`-`h` then a rank digit `1`-`8`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseSquareError {
            input: s.to_string(),
        };
        let bytes = s.trim().as_bytes();
        if bytes.len() != 2 {
            return Err(err());
        }
        let file = bytes[0].to_ascii_lowercase();
        let rank = bytes[1];
        if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
            return Err(err());
        }
        let col = (file - b'a') as usize;
        let row = N - (rank - b'0') as usize;
        Square::new(row, col).ok_or_else(err)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = (b'a' + self.col() as u8) as char;
        write!(f, "{file}{}", N - self.row())
    }
}

/// Iterate the squares set in a bitboard, lowest index first.
pub fn squares(mut bits: u64) -> impl Iterator<Item = Square> {
    std::iter::from_fn(move || {
        if bits == 0 {
            return None;
        }
        let index = bits.trailing_zeros() as u8;
        bits &= bits - 1;
        Some(Square(index))
    })
}

/// Squares adjacent (8 directions) to any square in `bits`, plus `bits` itself.
fn dilate(bits: u64) -> u64 {
    let row = bits | ((bits << 1) & NOT_FILE_A) | ((bits >> 1) & NOT_FILE_H);
    row | (row << 8) | (row >> 8)
}

/// Final result of a finished game.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Win(Player),
    Draw,
}

/// An Othello position.
///
/// Equality and hashing look only at piece placement, not at the cached move
/// data or whose turn it is.
#[derive(Clone, Debug)]
pub struct Board {
    /// Occupancy per player, indexed by [`Player::index`]
    pieces: [u64; 2],
    /// Player whose turn it is
    to_move: Player,
    /// Complement of both occupancy maps
    empty: u64,
    /// Empty squares adjacent to an opponent piece of `to_move`
    candidates: u64,
    /// Candidates that capture at least one piece (empty once the game is over)
    legal: u64,
    piece_count: u32,
    game_over: bool,
    /// The opponent was skipped for lack of moves when this position was reached
    passed: bool,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// The standard starting layout with Black to move.
    pub fn new() -> Self {
        Self::build([START_BLACK, START_WHITE], Player::Black)
    }

    /// Build a board from raw bitboards.
    pub fn from_bitboards(black: u64, white: u64, to_move: Player) -> Result<Self, LayoutError> {
        if black & white != 0 {
            return Err(LayoutError::Overlap(black & white));
        }
        Ok(Self::build([black, white], to_move))
    }

    /// Build a board from a grid of cells, `grid[row][col]`.
    pub fn from_grid(grid: &[[Option<Player>; N]; N], to_move: Player) -> Self {
        let mut pieces = [0u64; 2];
        for (row, cells) in grid.iter().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                if let (Some(player), Some(sq)) = (cell, Square::new(row, col)) {
                    pieces[player.index()] |= sq.bit();
                }
            }
        }
        Self::build(pieces, to_move)
    }

    /// Build a board from rows of cells, rank 8 first: `None` for an empty
    /// cell, `Some('B')` or `Some('W')` for a piece.
    ///
    /// # Errors
    /// [`LayoutError`] unless there are exactly 8 rows of 8 valid cells.
    pub fn from_cells<R: AsRef<[Option<char>]>>(
        rows: &[R],
        to_move: Player,
    ) -> Result<Self, LayoutError> {
        if rows.len() != N {
            return Err(LayoutError::RowCount(rows.len()));
        }

        let mut grid = [[None; N]; N];
        for (row, cells) in rows.iter().enumerate() {
            let cells = cells.as_ref();
            if cells.len() != N {
                return Err(LayoutError::RowLength {
                    row,
                    found: cells.len(),
                });
            }
            for (col, &cell) in cells.iter().enumerate() {
                grid[row][col] = match cell {
                    None => None,
                    Some('B') => Some(Player::Black),
                    Some('W') => Some(Player::White),
                    Some(symbol) => return Err(LayoutError::Symbol { row, symbol }),
                };
            }
        }

        Ok(Board::from_grid(&grid, to_move))
    }

    fn build(pieces: [u64; 2], to_move: Player) -> Self {
        let mut board = Board {
            pieces,
            to_move,
            empty: 0,
            candidates: 0,
            legal: 0,
            piece_count: 0,
            game_over: false,
            passed: false,
        };
        board.refresh();
        board
    }

    /// Recompute every derived field from the occupancy maps and apply the
    /// skip-turn and game-over rules for `to_move`.
    fn refresh(&mut self) {
        let occupied = self.pieces[0] | self.pieces[1];
        self.empty = !occupied;
        self.piece_count = occupied.count_ones();
        self.passed = false;
        self.game_over = false;

        if occupied == FULL_BOARD {
            self.candidates = 0;
            self.legal = 0;
            self.game_over = true;
            return;
        }

        self.candidates = self.candidates_for(self.to_move);
        self.legal = self.legal_moves_for(self.to_move);
        if self.legal != 0 {
            return;
        }

        let other = self.to_move.opponent();
        let other_legal = self.legal_moves_for(other);
        if other_legal != 0 {
            self.to_move = other;
            self.candidates = self.candidates_for(other);
            self.legal = other_legal;
            self.passed = true;
        } else {
            self.game_over = true;
        }
    }

    /// Empty squares adjacent to at least one piece of `player`'s opponent.
    pub fn candidates_for(&self, player: Player) -> u64 {
        dilate(self.pieces[player.opponent().index()]) & self.empty
    }

    /// Pieces that `player` would flip along one direction from `sq`.
    ///
    /// The scan walks over a run of opponent pieces and only counts it when the
    /// run is non-empty and ends on one of `player`'s pieces.
    fn flips_in_direction(&self, player: Player, sq: Square, dir: (isize, isize)) -> u64 {
        let own = self.pieces[player.index()];
        let opp = self.pieces[player.opponent().index()];
        let mut run = 0u64;
        let mut cur = sq.step(dir);

        while let Some(s) = cur {
            let bit = s.bit();
            if opp & bit != 0 {
                run |= bit;
            } else if own & bit != 0 {
                return run;
            } else {
                return 0;
            }
            cur = s.step(dir);
        }
        0
    }

    /// All pieces `player` would flip by playing `sq`.
    fn flips(&self, player: Player, sq: Square) -> u64 {
        DIRECTIONS
            .iter()
            .fold(0, |acc, &dir| acc | self.flips_in_direction(player, sq, dir))
    }

    /// Legal moves for `player` as a bitboard, regardless of whose turn it is.
    pub fn legal_moves_for(&self, player: Player) -> u64 {
        squares(self.candidates_for(player))
            .filter(|&sq| self.flips(player, sq) != 0)
            .fold(0, |acc, sq| acc | sq.bit())
    }

    /// Legal moves for the side to move, lowest square first.
    pub fn legal_moves(&self) -> Vec<Square> {
        squares(self.legal).collect()
    }

    #[inline]
    pub fn legal_mask(&self) -> u64 {
        self.legal
    }

    #[inline]
    pub fn legal_count(&self) -> usize {
        self.legal.count_ones() as usize
    }

    #[inline]
    pub fn is_legal(&self, sq: Square) -> bool {
        self.legal & sq.bit() != 0
    }

    /// Play `sq` for `player`.
    ///
    /// On success returns the number of flipped pieces. The turn passes to the
    /// opponent unless the opponent has no legal move, in which case `player`
    /// moves again (see [`Board::passed`]).
    ///
    /// # Errors
    /// - [`MoveError::GameOver`] - no moves are accepted after the game ends
    /// - [`MoveError::NotYourTurn`] - `player` is not the side to move
    /// - [`MoveError::Occupied`] - the square already holds a piece
    /// - [`MoveError::NoCapture`] - the move flips nothing
    pub fn apply_move(&mut self, player: Player, sq: Square) -> Result<u32, MoveError> {
        if self.game_over {
            return Err(MoveError::GameOver);
        }
        if player != self.to_move {
            return Err(MoveError::NotYourTurn(self.to_move));
        }
        if self.empty & sq.bit() == 0 {
            return Err(MoveError::Occupied(sq));
        }
        let flips = self.flips(player, sq);
        if flips == 0 {
            return Err(MoveError::NoCapture(sq));
        }

        self.pieces[player.index()] |= sq.bit() | flips;
        self.pieces[player.opponent().index()] &= !flips;
        self.to_move = player.opponent();
        self.refresh();
        Ok(flips.count_ones())
    }

    /// Play `sq` for the side to move.
    pub fn play(&mut self, sq: Square) -> Result<u32, MoveError> {
        self.apply_move(self.to_move, sq)
    }

    /// Play the zero-based (row, col) for the side to move.
    pub fn play_at(&mut self, row: usize, col: usize) -> Result<u32, MoveError> {
        let sq = Square::new(row, col).ok_or(MoveError::OutOfBounds { row, col })?;
        self.play(sq)
    }

    /// A copy of this board with `sq` played. `self` is left untouched.
    pub fn after(&self, sq: Square) -> Result<Board, MoveError> {
        let mut next = self.clone();
        next.play(sq)?;
        Ok(next)
    }

    #[inline]
    pub fn to_move(&self) -> Player {
        self.to_move
    }

    pub fn piece_at(&self, sq: Square) -> Option<Player> {
        if self.pieces[0] & sq.bit() != 0 {
            Some(Player::Black)
        } else if self.pieces[1] & sq.bit() != 0 {
            Some(Player::White)
        } else {
            None
        }
    }

    #[inline]
    pub fn pieces(&self, player: Player) -> u64 {
        self.pieces[player.index()]
    }

    #[inline]
    pub fn empty_mask(&self) -> u64 {
        self.empty
    }

    #[inline]
    pub fn candidate_mask(&self) -> u64 {
        self.candidates
    }

    #[inline]
    pub fn piece_count(&self) -> u32 {
        self.piece_count
    }

    #[inline]
    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// True when reaching this position skipped the other player's turn.
    #[inline]
    pub fn passed(&self) -> bool {
        self.passed
    }

    /// Piece counts as `(black, white)`.
    pub fn scores(&self) -> (u32, u32) {
        (self.pieces[0].count_ones(), self.pieces[1].count_ones())
    }

    /// Material balance: Black's piece count minus White's.
    ///
    /// Positive values favor Black regardless of whose turn it is.
    pub fn evaluate(&self) -> i32 {
        let (black, white) = self.scores();
        black as i32 - white as i32
    }

    /// Result of the game, or `None` while it is still in progress.
    pub fn outcome(&self) -> Option<Outcome> {
        if !self.game_over {
            return None;
        }
        Some(match self.evaluate() {
            d if d > 0 => Outcome::Win(Player::Black),
            d if d < 0 => Outcome::Win(Player::White),
            _ => Outcome::Draw,
        })
    }
}

impl PartialEq for Board {
    fn eq(&self, other: &Self) -> bool {
        self.pieces == other.pieces
    }
}

impl Eq for Board {}

impl Hash for Board {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pieces.hash(state);
    }
}

impl FromStr for Board {
    type Err = LayoutError;

    /// Parse a layout of 8 rows of `.`, `B`, `W` (rank 8 first). Whitespace
    /// between cells, blank lines and `#` comment lines are ignored. Black moves
    /// first.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows: Vec<Vec<Option<char>>> = s
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|line| {
                line.chars()
                    .filter(|c| !c.is_whitespace())
                    .map(|c| (c != '.').then_some(c))
                    .collect()
            })
            .collect();
        Board::from_cells(&rows, Player::Black)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..N {
            write!(f, "{} ", N - row)?;
            for col in 0..N {
                let ch = Square::new(row, col)
                    .and_then(|sq| self.piece_at(sq))
                    .map_or('.', Player::symbol);
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        write!(f, "  a b c d e f g h")
    }
}
