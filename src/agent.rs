//! Move-choosing strategies.
//!
//! Every player, human or bot, implements [`Agent`]. The game loop only asks
//! an agent for a move when the side to move has at least one legal move.

use std::io::{self, BufRead, Stdin, Stdout, Write};

use fastrand::Rng;

use crate::board::{Board, Square};
use crate::config::SearchConfig;
use crate::playout::random_move;
use crate::search::search;

pub trait Agent {
    fn name(&self) -> &str;

    /// Pick a move for `board.to_move()`. `None` means the agent gives up
    /// (for a human, typing `quit` or closing the input).
    fn choose_move(&mut self, board: &Board) -> Option<Square>;
}

/// Plays a uniformly random legal move.
pub struct RandomAgent {
    name: String,
    rng: Rng,
}

impl RandomAgent {
    pub fn new(name: impl Into<String>, seed: u64) -> Self {
        Self {
            name: name.into(),
            rng: Rng::with_seed(seed),
        }
    }
}

impl Agent for RandomAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn choose_move(&mut self, board: &Board) -> Option<Square> {
        random_move(board, &mut self.rng)
    }
}

/// Plays the move chosen by a parallel MCTS search.
pub struct MctsAgent {
    name: String,
    config: SearchConfig,
}

impl MctsAgent {
    pub fn new(name: impl Into<String>, config: SearchConfig) -> Self {
        Self {
            name: name.into(),
            config,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }
}

impl Agent for MctsAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn choose_move(&mut self, board: &Board) -> Option<Square> {
        let report = search(board, board.to_move(), &self.config);
        // Vary the playouts from one decision to the next.
        self.config.seed = self.config.seed.wrapping_add(1);
        report.best
    }
}

/// Source of input lines for a [`HumanAgent`].
pub trait LineReader {
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize>;
}

/// Locks stdin per line, so two human players can share the console.
impl LineReader for Stdin {
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        Stdin::read_line(self, buf)
    }
}

impl LineReader for &[u8] {
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        BufRead::read_line(self, buf)
    }
}

/// Reads algebraic moves (`e3`) from a text stream, re-prompting on bad input.
pub struct HumanAgent<R, W> {
    name: String,
    input: R,
    output: W,
}

impl HumanAgent<Stdin, Stdout> {
    pub fn stdin(name: impl Into<String>) -> Self {
        Self::new(name, io::stdin(), io::stdout())
    }
}

impl<R: LineReader, W: Write> HumanAgent<R, W> {
    pub fn new(name: impl Into<String>, input: R, output: W) -> Self {
        Self {
            name: name.into(),
            input,
            output,
        }
    }

    fn prompt(&mut self) -> io::Result<Option<String>> {
        write!(self.output, "{}, enter your move (a1 - h8): ", self.name)?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_ascii_lowercase()))
    }
}

impl<R: LineReader, W: Write> Agent for HumanAgent<R, W> {
    fn name(&self) -> &str {
        &self.name
    }

    fn choose_move(&mut self, board: &Board) -> Option<Square> {
        loop {
            let line = match self.prompt() {
                Ok(Some(line)) => line,
                Ok(None) | Err(_) => return None,
            };
            if line == "quit" || line == "q" {
                return None;
            }
            let reply = match line.parse::<Square>() {
                Ok(sq) if board.is_legal(sq) => return Some(sq),
                Ok(sq) => format!("Illegal move {sq}. Try again."),
                Err(err) => format!("{err}. Try again."),
            };
            if writeln!(self.output, "{reply}").is_err() {
                return None;
            }
        }
    }
}
