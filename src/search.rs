//! Parallel move selection.
//!
//! Each worker grows its own [`Tree`] from a copy of the root position with
//! its own seeded RNG. Nothing is shared while the workers run; once all of
//! them have joined, their root statistics are summed per move and the most
//! visited move is played.

use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use fastrand::Rng;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::board::{Board, Player, Square};
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::mcts::{ChildStats, SearchSummary, Tree, most_visited, tree_search};

/// Outcome of one move decision.
#[derive(Clone, Debug, Default)]
pub struct SearchReport {
    /// Move to play, `None` only when the side to move has no legal move
    pub best: Option<Square>,
    /// Merged statistics per root move, ordered by square
    pub stats: Vec<ChildStats>,
    /// Simulation budget for this decision (0 when the search was skipped)
    pub budget: usize,
    /// Workers that actually contributed
    pub workers: usize,
    /// Workers lost to a panic
    pub failed_workers: usize,
    /// Totals across all contributing workers
    pub summary: SearchSummary,
    pub elapsed: Duration,
}

/// Pick a move for the side to move on `board`, searching for `root_player`.
pub fn choose_move(board: &Board, root_player: Player, config: &SearchConfig) -> Option<Square> {
    search(board, root_player, config).best
}

/// Run a full parallel search and report the merged statistics.
pub fn search(board: &Board, root_player: Player, config: &SearchConfig) -> SearchReport {
    let start = Instant::now();
    let legal = board.legal_moves();

    match legal.as_slice() {
        [] => return SearchReport::default(),
        [only] => {
            debug!(mv = %only, "single legal move, skipping search");
            return SearchReport {
                best: Some(*only),
                elapsed: start.elapsed(),
                ..SearchReport::default()
            };
        }
        _ => {}
    }

    let budget = config.budget.for_board(board);
    let shares = split_budget(budget, config.workers);
    let deadline = config.time_limit.map(|limit| start + limit);

    let run = |(index, sims): (usize, usize)| {
        run_worker(board, root_player, config, index, sims, deadline)
    };
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(shares.len())
        .build();
    let results: Vec<Result<WorkerResult, SearchError>> = match pool {
        Ok(pool) => pool.install(|| shares.par_iter().copied().enumerate().map(run).collect()),
        Err(err) => {
            warn!(%err, "could not build worker pool, searching on the current thread");
            shares.iter().copied().enumerate().map(run).collect()
        }
    };

    let mut report = SearchReport {
        budget,
        ..SearchReport::default()
    };
    let mut partials = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok(worker) => {
                report.workers += 1;
                report.summary.simulations += worker.summary.simulations;
                report.summary.rollouts += worker.summary.rollouts;
                report.summary.dropped += worker.summary.dropped;
                partials.push(worker.stats);
            }
            Err(err) => {
                warn!(%err, "dropping search worker");
                report.failed_workers += 1;
            }
        }
    }

    report.stats = merge_stats(partials);
    report.best = most_visited(&report.stats).or_else(|| {
        warn!("no search results, falling back to the first legal move");
        legal.first().copied()
    });
    report.elapsed = start.elapsed();

    info!(
        player = %root_player,
        best = ?report.best.map(|mv| mv.to_string()),
        budget,
        workers = report.workers,
        rollouts = report.summary.rollouts,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "search finished"
    );
    report
}

struct WorkerResult {
    stats: Vec<ChildStats>,
    summary: SearchSummary,
}

/// Grow one independent tree. A panic inside the worker is caught and
/// reported as [`SearchError::WorkerPanicked`].
fn run_worker(
    board: &Board,
    root_player: Player,
    config: &SearchConfig,
    index: usize,
    sims: usize,
    deadline: Option<Instant>,
) -> Result<WorkerResult, SearchError> {
    panic::catch_unwind(AssertUnwindSafe(|| {
        let mut rng = Rng::with_seed(worker_seed(config.seed, index));
        let mut tree = Tree::new(board, root_player);
        let summary = tree_search(&mut tree, sims, config, &mut rng, deadline);
        debug!(
            worker = index,
            sims,
            rollouts = summary.rollouts,
            nodes = tree.len(),
            "worker finished"
        );
        WorkerResult {
            stats: tree.child_stats(),
            summary,
        }
    }))
    .map_err(|_| SearchError::WorkerPanicked(index))
}

/// Independent RNG stream for worker `index`.
fn worker_seed(seed: u64, index: usize) -> u64 {
    seed.wrapping_add((index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// Divide `budget` simulations over at most `workers` workers.
///
/// Every returned share is at least 1 and the shares sum to `budget`
/// (a zero budget still gets one simulation).
pub fn split_budget(budget: usize, workers: usize) -> Vec<usize> {
    let budget = budget.max(1);
    let workers = workers.clamp(1, budget);
    let base = budget / workers;
    let extra = budget % workers;
    (0..workers).map(|i| base + usize::from(i < extra)).collect()
}

/// Sum per-move statistics from several trees. The result is ordered by square.
pub fn merge_stats<I>(partials: I) -> Vec<ChildStats>
where
    I: IntoIterator<Item = Vec<ChildStats>>,
{
    let mut merged: BTreeMap<Square, ChildStats> = BTreeMap::new();
    for stats in partials {
        for s in stats {
            merged
                .entry(s.mv)
                .and_modify(|m| {
                    m.visits += s.visits;
                    m.value_sum += s.value_sum;
                })
                .or_insert(s);
        }
    }
    merged.into_values().collect()
}
