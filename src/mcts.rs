//! Monte Carlo Tree Search (MCTS) with UCT selection.
//!
//! This module implements a single search tree:
//! - UCT for child selection, visiting every child once before exploiting
//! - One-child-per-simulation expansion from a node's untried moves
//! - Random playouts for value estimation (see [`crate::playout`])
//! - Backpropagation of playout values along parent links
//!
//! Nodes live in an arena owned by [`Tree`]. A node owns its children through
//! their arena indices; the `parent` index is only followed upwards during
//! backpropagation.

use std::time::Instant;

use fastrand::Rng;
use tracing::warn;

use crate::board::{Board, Player, Square};
use crate::config::SearchConfig;
use crate::playout::rollout;

/// Index of a node inside its [`Tree`].
pub type NodeId = usize;

/// The root is always the first node of the arena.
pub const ROOT: NodeId = 0;

/// A node in the MCTS search tree.
#[derive(Clone, Debug)]
pub struct SearchNode {
    /// The position at this node (never modified after construction)
    pub board: Board,
    /// Player the whole tree is optimizing for
    pub root_player: Player,
    /// Back link used for backpropagation only
    pub parent: Option<NodeId>,
    /// Move that led here from the parent (`None` at the root)
    pub mv: Option<Square>,
    /// Expanded children in expansion order
    pub children: Vec<(Square, NodeId)>,
    /// Legal moves not yet expanded into children
    pub untried: Vec<Square>,
    /// Number of simulations through this node
    pub visits: u32,
    /// Sum of the values of those simulations
    pub value_sum: f64,
}

impl SearchNode {
    fn new(board: Board, root_player: Player, parent: Option<NodeId>, mv: Option<Square>) -> Self {
        let untried = board.legal_moves();
        Self {
            board,
            root_player,
            parent,
            mv,
            children: Vec::new(),
            untried,
            visits: 0,
            value_sum: 0.0,
        }
    }

    /// Mean simulation value, 0 for an unvisited node.
    #[inline]
    pub fn mean_value(&self) -> f64 {
        if self.visits > 0 {
            self.value_sum / self.visits as f64
        } else {
            0.0
        }
    }

    #[inline]
    pub fn is_fully_expanded(&self) -> bool {
        self.children.len() == self.board.legal_count()
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.board.is_game_over()
    }

    /// UCT score of this node as a child of a parent with `parent_visits`.
    fn uct(&self, parent_visits: u32, c: f64) -> f64 {
        let visits = self.visits as f64;
        self.mean_value() + c * ((parent_visits as f64).ln() / visits).sqrt()
    }
}

/// Visit statistics of one root move.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ChildStats {
    pub mv: Square,
    pub visits: u32,
    pub value_sum: f64,
}

impl ChildStats {
    pub fn mean_value(&self) -> f64 {
        if self.visits > 0 {
            self.value_sum / self.visits as f64
        } else {
            0.0
        }
    }
}

/// Counters for one run of [`tree_search`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchSummary {
    /// Simulation units started
    pub simulations: usize,
    /// Rollouts that were backpropagated
    pub rollouts: usize,
    /// Rollouts that failed and were skipped
    pub dropped: usize,
}

/// An MCTS tree stored as an arena of nodes.
#[derive(Clone, Debug)]
pub struct Tree {
    nodes: Vec<SearchNode>,
}

impl Tree {
    /// Create a tree whose root is a copy of `board`.
    pub fn new(board: &Board, root_player: Player) -> Self {
        Self {
            nodes: vec![SearchNode::new(board.clone(), root_player, None, None)],
        }
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &SearchNode {
        &self.nodes[id]
    }

    #[inline]
    pub fn root(&self) -> &SearchNode {
        &self.nodes[ROOT]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Select a child of `id` to descend into.
    ///
    /// Unvisited children take priority and are chosen uniformly at random.
    /// Otherwise the child with the highest UCT score wins; ties go to the
    /// child expanded first. Returns `None` for a node without children.
    pub fn select_child(&self, id: NodeId, c: f64, rng: &mut Rng) -> Option<NodeId> {
        let node = &self.nodes[id];

        let unvisited: Vec<NodeId> = node
            .children
            .iter()
            .map(|&(_, child)| child)
            .filter(|&child| self.nodes[child].visits == 0)
            .collect();
        if !unvisited.is_empty() {
            return Some(unvisited[rng.usize(..unvisited.len())]);
        }

        let mut best: Option<(NodeId, f64)> = None;
        for &(_, child) in &node.children {
            let score = self.nodes[child].uct(node.visits, c);
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((child, score));
            }
        }
        best.map(|(child, _)| child)
    }

    /// Expand one untried move of `id` into a new child.
    ///
    /// Which untried move is taken is random. Returns `None` when the node is
    /// already fully expanded.
    pub fn expand(&mut self, id: NodeId, rng: &mut Rng) -> Option<NodeId> {
        let node = &mut self.nodes[id];
        if node.untried.is_empty() {
            return None;
        }
        let mv = node.untried.swap_remove(rng.usize(..node.untried.len()));
        let mut board = node.board.clone();
        if let Err(err) = board.play(mv) {
            warn!(%mv, %err, "untried move rejected during expansion");
            return None;
        }

        let root_player = node.root_player;
        let child = self.nodes.len();
        self.nodes[id].children.push((mv, child));
        self.nodes.push(SearchNode::new(board, root_player, Some(id), Some(mv)));
        Some(child)
    }

    /// Walk from the root to the node where the next simulation starts: the
    /// first node that is terminal or still has untried moves.
    pub fn descend(&self, c: f64, rng: &mut Rng) -> NodeId {
        let mut id = ROOT;
        loop {
            let node = &self.nodes[id];
            if node.is_terminal() || !node.is_fully_expanded() {
                return id;
            }
            match self.select_child(id, c, rng) {
                Some(child) => id = child,
                None => return id,
            }
        }
    }

    /// Add `value` to `id` and every ancestor up to the root.
    pub fn backpropagate(&mut self, id: NodeId, value: f64) {
        let mut cur = Some(id);
        while let Some(i) = cur {
            let node = &mut self.nodes[i];
            node.visits += 1;
            node.value_sum += value;
            cur = node.parent;
        }
    }

    /// Statistics of the root's children in expansion order.
    pub fn child_stats(&self) -> Vec<ChildStats> {
        self.root()
            .children
            .iter()
            .map(|&(mv, child)| ChildStats {
                mv,
                visits: self.nodes[child].visits,
                value_sum: self.nodes[child].value_sum,
            })
            .collect()
    }
}

/// Run up to `sims` simulations on `tree`.
///
/// Each simulation selects a node, expands one child if possible, runs
/// `config.rollouts_per_leaf` playouts from it and backpropagates each value.
/// A failed playout is logged and skipped. When `deadline` passes, no new
/// simulation is started.
pub fn tree_search(
    tree: &mut Tree,
    sims: usize,
    config: &SearchConfig,
    rng: &mut Rng,
    deadline: Option<Instant>,
) -> SearchSummary {
    let mut summary = SearchSummary::default();
    let root_player = tree.root().root_player;

    for _ in 0..sims {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            break;
        }
        summary.simulations += 1;

        let mut leaf = tree.descend(config.exploration, rng);
        if !tree.node(leaf).is_terminal() {
            if let Some(child) = tree.expand(leaf, rng) {
                leaf = child;
            }
        }

        for _ in 0..config.rollouts_per_leaf {
            match rollout(&tree.node(leaf).board, root_player, config.rollout_depth, rng) {
                Ok(value) => {
                    tree.backpropagate(leaf, value);
                    summary.rollouts += 1;
                }
                Err(err) => {
                    warn!(%err, "dropping failed rollout");
                    summary.dropped += 1;
                }
            }
        }
    }

    summary
}

/// Find the best move (most visited root child, first one on ties).
pub fn best_move(tree: &Tree) -> Option<Square> {
    most_visited(&tree.child_stats())
}

/// The move with the most visits; ties go to the earliest entry.
pub fn most_visited(stats: &[ChildStats]) -> Option<Square> {
    let mut best: Option<&ChildStats> = None;
    for s in stats {
        if best.is_none_or(|b| s.visits > b.visits) {
            best = Some(s);
        }
    }
    best.map(|s| s.mv)
}
