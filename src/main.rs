//! Otto-Rust: an Othello MCTS engine.
//!
//! ## Usage
//!
//! - `otto-rust` - Show a demo
//! - `otto-rust play` - Play a game (human Black vs MCTS White by default)
//! - `otto-rust demo` - Run the MCTS demo

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use otto_rust::agent::{Agent, HumanAgent, MctsAgent, RandomAgent};
use otto_rust::board::{Board, Player, Square};
use otto_rust::config::{GameConfig, SearchConfig, default_workers};
use otto_rust::constants::{DEFAULT_SEED, EXPLORATION, ROLLOUT_DEPTH, ROLLOUTS_PER_LEAF};
use otto_rust::game::Game;
use otto_rust::search::search;

/// Otto-Rust: an Othello MCTS engine
#[derive(Parser)]
#[command(name = "otto-rust")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a game between two agents on the console
    Play(PlayArgs),
    /// Run a single search from the opening and print the statistics
    Demo(SearchArgs),
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum AgentKind {
    Human,
    Random,
    Mcts,
}

#[derive(Args)]
struct PlayArgs {
    /// Who plays Black
    #[arg(long, value_enum, default_value_t = AgentKind::Human)]
    black: AgentKind,
    /// Who plays White
    #[arg(long, value_enum, default_value_t = AgentKind::Mcts)]
    white: AgentKind,
    /// Starting layout: a YAML config file, or 8 lines of '.', 'B', 'W' (rank 8 first)
    #[arg(long)]
    layout: Option<PathBuf>,
    #[command(flatten)]
    search: SearchArgs,
}

#[derive(Args, Clone)]
struct SearchArgs {
    /// Worker threads per search
    #[arg(long, default_value_t = default_workers())]
    workers: usize,
    /// Base RNG seed
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,
    /// UCT exploration constant
    #[arg(long, default_value_t = EXPLORATION)]
    exploration: f64,
    /// Maximum plies per rollout
    #[arg(long, default_value_t = ROLLOUT_DEPTH)]
    rollout_depth: usize,
    /// Rollouts per expanded node
    #[arg(long, default_value_t = ROLLOUTS_PER_LEAF)]
    rollouts_per_leaf: usize,
    /// Stop starting new simulations after this many milliseconds
    #[arg(long)]
    time_limit_ms: Option<u64>,
}

impl Default for SearchArgs {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            seed: DEFAULT_SEED,
            exploration: EXPLORATION,
            rollout_depth: ROLLOUT_DEPTH,
            rollouts_per_leaf: ROLLOUTS_PER_LEAF,
            time_limit_ms: None,
        }
    }
}

impl SearchArgs {
    fn config(&self) -> SearchConfig {
        SearchConfig::default()
            .with_workers(self.workers)
            .with_seed(self.seed)
            .with_exploration(self.exploration)
            .with_rollout_depth(self.rollout_depth)
            .with_rollouts_per_leaf(self.rollouts_per_leaf)
            .with_time_limit(self.time_limit_ms.map(Duration::from_millis))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Play(args)) => run_game(&args),
        Some(Commands::Demo(args)) => run_demo(&args),
        None => run_demo(&SearchArgs::default()),
    }
}

/// Load a starting layout: a YAML config (`.yaml`/`.yml`) or a plain text grid.
fn load_layout(path: &Path) -> Result<Board> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading layout {}", path.display()))?;
    let is_yaml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
    let board = if is_yaml {
        GameConfig::from_yaml(&text).and_then(|config| config.starting_board())
    } else {
        text.parse()
    };
    board.with_context(|| format!("parsing layout {}", path.display()))
}

fn make_agent(kind: AgentKind, player: Player, config: &SearchConfig) -> Box<dyn Agent> {
    let name = player.to_string();
    match kind {
        AgentKind::Human => Box::new(HumanAgent::stdin(name)),
        AgentKind::Random => Box::new(RandomAgent::new(
            name,
            config.seed.wrapping_add(player.index() as u64),
        )),
        AgentKind::Mcts => Box::new(MctsAgent::new(format!("Otto ({name})"), config.clone())),
    }
}

fn run_game(args: &PlayArgs) -> Result<()> {
    let board = match &args.layout {
        Some(path) => load_layout(path)?,
        None => Board::new(),
    };
    let config = args.search.config();
    let black = make_agent(args.black, Player::Black, &config);
    let white = make_agent(args.white, Player::White, &config);

    println!("Welcome to Othello!");
    let mut game = Game::new(board, black, white);
    let mut stdout = io::stdout();
    game.run(&mut stdout).context("writing game output")?;
    println!("Thanks for playing!");
    Ok(())
}

fn run_demo(args: &SearchArgs) -> Result<()> {
    println!("Otto-Rust: Othello MCTS Engine\n");

    let mut board = Board::new();
    let opening: Square = "e3".parse()?;
    board.play(opening)?;
    println!("Black plays {opening}:\n{board}\n");

    let config = args.config();
    println!("Searching for White with {} workers...", config.workers);
    let report = search(&board, Player::White, &config);
    for s in &report.stats {
        println!("move {} v={} mean={:.3}", s.mv, s.visits, s.mean_value());
    }
    match report.best {
        Some(mv) => println!("Best move: {mv}"),
        None => println!("No legal move"),
    }
    println!(
        "{} simulations in {:.1} ms",
        report.summary.simulations,
        report.elapsed.as_secs_f64() * 1000.0
    );
    Ok(())
}
