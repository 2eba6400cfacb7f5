//! Console game loop.
//!
//! Alternates between two [`Agent`]s, honoring skipped turns, and reports
//! the final score. All output goes to a caller-supplied writer.

use std::io::{self, Write};

use tracing::warn;

use crate::agent::Agent;
use crate::board::{Board, Outcome, Player};

/// How a game ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameResult {
    /// `(black, white)` piece counts at the end
    pub scores: (u32, u32),
    /// `None` when a player quit before the game was over
    pub outcome: Option<Outcome>,
    /// Moves played
    pub moves: usize,
}

/// Two agents and the board they play on.
pub struct Game<'a> {
    board: Board,
    /// Indexed by [`Player::index`]
    agents: [Box<dyn Agent + 'a>; 2],
}

impl<'a> Game<'a> {
    pub fn new(board: Board, black: Box<dyn Agent + 'a>, white: Box<dyn Agent + 'a>) -> Self {
        Self {
            board,
            agents: [black, white],
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Play until the game is over or an agent gives up.
    pub fn run<W: Write>(&mut self, out: &mut W) -> io::Result<GameResult> {
        let mut moves = 0;

        while !self.board.is_game_over() {
            let player = self.board.to_move();
            writeln!(out, "{}\n", self.board)?;
            let legal_moves = self.board.legal_moves();
            let legal: Vec<String> = legal_moves.iter().map(|m| m.to_string()).collect();
            writeln!(out, "{player} to move. Legal moves: {}", legal.join(" "))?;

            let agent = &mut self.agents[player.index()];
            let Some(mv) = agent.choose_move(&self.board) else {
                writeln!(out, "{} ({player}) quit the game.", agent.name())?;
                return Ok(self.result(moves, None));
            };

            match self.board.apply_move(player, mv) {
                Ok(flipped) => {
                    moves += 1;
                    writeln!(
                        out,
                        "{} ({player}) plays {mv}, flipping {flipped}.",
                        agent.name()
                    )?;
                    if self.board.passed() {
                        writeln!(out, "{} has no valid moves and passes.", player.opponent())?;
                    }
                }
                Err(err) => {
                    warn!(agent = agent.name(), %mv, %err, "agent chose an illegal move");
                    writeln!(out, "{err}")?;
                    return Ok(self.result(moves, None));
                }
            }
        }

        writeln!(out, "{}\n", self.board)?;
        let result = self.result(moves, self.board.outcome());
        self.report(&result, out)?;
        Ok(result)
    }

    fn result(&self, moves: usize, outcome: Option<Outcome>) -> GameResult {
        GameResult {
            scores: self.board.scores(),
            outcome,
            moves,
        }
    }

    fn report<W: Write>(&self, result: &GameResult, out: &mut W) -> io::Result<()> {
        let (black, white) = result.scores;
        writeln!(out, "Game over!")?;
        writeln!(
            out,
            "Final scores: {} ({black}) - {} ({white})",
            self.agents[Player::Black.index()].name(),
            self.agents[Player::White.index()].name()
        )?;
        match result.outcome {
            Some(Outcome::Win(winner)) => {
                writeln!(out, "{} wins!", self.agents[winner.index()].name())
            }
            Some(Outcome::Draw) => writeln!(out, "It's a draw!"),
            None => Ok(()),
        }
    }
}
