//! Monte Carlo tree search controller
//!
//! Each [`SearchTree::update`] runs one iteration on the calling thread:
//!
//! 1. **Select**: descend from the root, replaying moves on a board clone.
//! 2. **Mark terminal**: a decisive leaf is flagged and scored directly.
//! 3. **Playout**: otherwise a batch of parallel playouts is averaged.
//! 4. **Backpropagate**: walk back to the root updating statistics.
//! 5. **Expand**: a leaf with enough real playouts gets one child per
//!    shortlisted move.
//!
//! Real moves are committed with [`SearchTree::select_child`], which keeps
//! the matching subtree and releases the rest according to the configured
//! [`PruningPolicy`].
//!
//! # Example
//!
//! ```
//! use gomoku::search::{SearchConfig, SearchTree};
//! use gomoku::{Board, Stone};
//!
//! let mut board = Board::new();
//! board.make_move(9, 9, Stone::Black).unwrap();
//!
//! let config = SearchConfig::default().with_threads(2).with_seed(1);
//! let mut tree = SearchTree::for_board(&board, Stone::White, config);
//! for _ in 0..20 {
//!     tree.update(&board).unwrap();
//! }
//! assert_eq!(tree.total_playouts(), 40);
//! assert!(tree.best_move().is_some());
//! ```

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use super::config::{PruningPolicy, SearchConfig};
use super::node::{Node, NodeArena, NodeId};
use super::playout;
use crate::board::{Board, GameStatus, Pos, Stone};
use crate::error::SearchError;

/// Statistics of one tree node, for display and move choice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveStats {
    pub pos: Pos,
    pub color: Stone,
    pub avg_score: f32,
    pub visits: u32,
    pub selection_score: f32,
}

/// MCTS tree rooted at the current real position.
pub struct SearchTree {
    config: SearchConfig,
    arena: NodeArena,
    root: NodeId,
    eval_color: Stone,
    rng: Xoshiro256PlusPlus,
    /// Abandoned subtrees awaiting soft pruning
    garbage: VecDeque<NodeId>,
}

impl SearchTree {
    /// Tree for a fresh game, scored from `eval_color`'s point of view.
    pub fn new(eval_color: Stone, config: SearchConfig) -> Self {
        Self::with_root(None, Stone::Empty, eval_color, config)
    }

    /// Tree whose root is the position on `board`. The root takes the
    /// color of the board's last move.
    pub fn for_board(board: &Board, eval_color: Stone, config: SearchConfig) -> Self {
        match board.last_move() {
            Some(last) => Self::with_root(Some(last.pos), last.color, eval_color, config),
            None => Self::new(eval_color, config),
        }
    }

    fn with_root(mv: Option<Pos>, color: Stone, eval_color: Stone, config: SearchConfig) -> Self {
        let mut arena = NodeArena::new();
        let root = arena.alloc(Node::new(mv, color, None));
        let seed = config.seed.unwrap_or_else(rand::random);
        Self {
            config,
            arena,
            root,
            eval_color,
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
            garbage: VecDeque::new(),
        }
    }

    #[inline]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    #[inline]
    pub fn eval_color(&self) -> Stone {
        self.eval_color
    }

    #[inline]
    pub fn root(&self) -> &Node {
        self.arena.get(self.root)
    }

    // =========================================================================
    // Iteration
    // =========================================================================

    /// Run one select / playout / backpropagate / expand cycle from `board`,
    /// which must be the position the root stands for.
    ///
    /// Returns the number of simulated games contributed (0 when `board`
    /// is already decided).
    pub fn update(&mut self, board: &Board) -> Result<u32, SearchError> {
        self.collect_garbage();
        if board.status().is_terminal() {
            return Ok(0);
        }

        let mut scratch = board.clone();
        let mut node = self.root;
        while !self.arena.get(node).is_leaf() {
            node = self.select_best_child(node);
            let child = self.arena.get(node);
            let Some(pos) = child.pos() else {
                break;
            };
            if !scratch.play(pos, child.color()) {
                log::warn!("tree move ({}, {}) is illegal on the search board", pos.x, pos.y);
                break;
            }
        }

        let status = scratch.status();
        let (outcome, games) = match status {
            GameStatus::InProgress => {
                let last = self.arena.get(node).color();
                let threads = self.config.threads.max(1);
                let base_seed = self.rng.random::<u64>();
                let score = playout::run_batch(&scratch, last, self.eval_color, threads, base_seed)?;
                (score, threads as u32)
            }
            decided => {
                if decided.winner().is_some() {
                    self.arena.get_mut(node).terminal = true;
                }
                (playout::outcome(decided, self.eval_color), 1)
            }
        };

        self.backpropagate(node, outcome, games);

        let leaf = self.arena.get(node);
        if status == GameStatus::InProgress
            && leaf.is_leaf()
            && leaf.real_playouts >= self.config.expansion_threshold
        {
            self.expand(node, &scratch);
        }
        Ok(games)
    }

    /// UCB-style child choice with decaying uniform noise.
    fn select_best_child(&mut self, parent: NodeId) -> NodeId {
        let node = self.arena.get(parent);
        let children = &node.children;
        let visits = node.playouts;
        if visits == 0 {
            return children[0];
        }

        let horizon = self.config.exploration_horizon;
        let noise = if horizon > 0.0 {
            1.0 - (visits as f64 / horizon).min(1.0)
        } else {
            0.0
        };
        if self.rng.random::<f64>() < noise {
            return children[self.rng.random_range(0..children.len())];
        }

        let mut best = children[0];
        let mut best_score = f32::NEG_INFINITY;
        for &id in children {
            let score = self.selection_score(self.arena.get(id), visits);
            if score >= best_score {
                best_score = score;
                best = id;
            }
        }
        best
    }

    /// `avg + sqrt(ln(N) / sqrt(n))`, with `N` for unvisited children and a
    /// bonus for terminal ones.
    fn selection_score(&self, child: &Node, parent_visits: u32) -> f32 {
        let exploration = if child.playouts > 0 && parent_visits > 0 {
            ((parent_visits as f32).ln() / (child.playouts as f32).sqrt()).sqrt()
        } else {
            parent_visits as f32
        };
        let bonus = if child.terminal { self.config.terminal_bonus } else { 0.0 };
        child.average() + exploration + bonus
    }

    fn backpropagate(&mut self, leaf: NodeId, outcome: f32, games: u32) {
        let mut cursor = Some(leaf);
        while let Some(id) = cursor {
            let eval_color = self.eval_color;
            let node = self.arena.get_mut(id);
            node.score += if node.color() == eval_color { outcome } else { -outcome };
            node.playouts += 1;
            node.real_playouts += games;
            cursor = node.parent;
        }
    }

    fn expand(&mut self, leaf: NodeId, board: &Board) {
        let color = self.arena.get(leaf).color().next();
        let children: Vec<NodeId> = board
            .best_moves(color)
            .into_iter()
            .map(|pos| self.arena.alloc(Node::new(Some(pos), color, Some(leaf))))
            .collect();
        log::trace!("expanded node with {} {color:?} moves", children.len());
        self.arena.get_mut(leaf).children = children;
    }

    // =========================================================================
    // Re-rooting
    // =========================================================================

    /// Commit the real move `(x, y)`: its node becomes the root and every
    /// other branch is released. An unexplored move gets a fresh root.
    pub fn select_child(&mut self, x: i32, y: i32) -> Result<(), SearchError> {
        let pos = Pos::try_new(x, y)?;
        let old_root = self.root;
        let found = self
            .arena
            .get(old_root)
            .children
            .iter()
            .copied()
            .find(|&id| self.arena.get(id).pos() == Some(pos));

        let new_root = match found {
            Some(id) => {
                self.arena.get_mut(old_root).children.retain(|&child| child != id);
                self.arena.get_mut(id).parent = None;
                log::debug!(
                    "re-rooted at ({x}, {y}) keeping {} visits",
                    self.arena.get(id).playouts
                );
                id
            }
            None => {
                let color = self.arena.get(old_root).color().next();
                log::debug!("move ({x}, {y}) was never explored, starting a fresh root");
                self.arena.alloc(Node::new(Some(pos), color, None))
            }
        };

        self.root = new_root;
        self.abandon(old_root);
        Ok(())
    }

    fn abandon(&mut self, id: NodeId) {
        match self.config.pruning {
            PruningPolicy::None => {}
            PruningPolicy::Hard => {
                let freed = self.arena.free_subtree(id);
                log::trace!("freed {freed} nodes");
            }
            PruningPolicy::Soft { .. } => self.garbage.push_back(id),
        }
    }

    /// One soft-pruning tick: frees at most the configured budget of
    /// abandoned nodes. Also run at the start of every update.
    pub fn collect_garbage(&mut self) -> usize {
        match self.config.pruning {
            PruningPolicy::Soft { budget } if !self.garbage.is_empty() => {
                self.arena.free_queued(&mut self.garbage, budget)
            }
            _ => 0,
        }
    }

    /// Abandoned subtree roots still queued for soft pruning.
    #[inline]
    pub fn pending_garbage(&self) -> usize {
        self.garbage.len()
    }

    /// Allocated nodes, abandoned ones not yet freed included.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.arena.live()
    }

    // =========================================================================
    // Queries
    // =========================================================================

    fn stats(&self, node: &Node, selection_score: f32) -> Option<MoveStats> {
        Some(MoveStats {
            pos: node.pos()?,
            color: node.color(),
            avg_score: node.average(),
            visits: node.playouts,
            selection_score,
        })
    }

    /// One entry per child of the root.
    pub fn nodes_data(&self) -> Vec<MoveStats> {
        let root = self.root();
        root.children
            .iter()
            .map(|&id| self.arena.get(id))
            .filter_map(|child| self.stats(child, self.selection_score(child, root.playouts)))
            .collect()
    }

    /// Predicted continuation starting with the root child at `(x, y)`,
    /// following the highest average score. Empty if there is no such child.
    pub fn best_playout(&self, x: i32, y: i32) -> Vec<MoveStats> {
        let Ok(pos) = Pos::try_new(x, y) else {
            return Vec::new();
        };
        let mut line = Vec::new();
        let mut cursor = self
            .root()
            .children
            .iter()
            .copied()
            .find(|&id| self.arena.get(id).pos() == Some(pos));

        while let Some(id) = cursor {
            let node = self.arena.get(id);
            line.extend(self.stats(node, 0.0));
            cursor = self.best_average_child(node);
        }
        line
    }

    fn best_average_child(&self, node: &Node) -> Option<NodeId> {
        let mut best = None;
        let mut best_score = f32::NEG_INFINITY;
        for &id in &node.children {
            let score = self.arena.get(id).average();
            if score >= best_score {
                best_score = score;
                best = Some(id);
            }
        }
        best
    }

    /// Simulated games behind the root.
    #[inline]
    pub fn total_playouts(&self) -> u64 {
        self.root().real_playouts as u64
    }

    #[inline]
    pub fn children_count(&self) -> usize {
        self.root().children.len()
    }

    /// Root child with the best average score; the first one wins ties.
    pub fn best_move(&self) -> Option<MoveStats> {
        self.nodes_data()
            .into_iter()
            .fold(None, |best: Option<MoveStats>, stats| match best {
                Some(b) if b.avg_score >= stats.avg_score => Some(b),
                _ => Some(stats),
            })
    }

    /// Enough playouts for a decision at `level`: more than
    /// `children * 1000 * level^2`, or a single candidate.
    pub fn is_decision_ready(&self, level: u32) -> bool {
        let children = self.children_count() as u64;
        let needed = children * 1000 * (level as u64).pow(2);
        children == 1 || (children > 0 && self.total_playouts() > needed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SearchConfig {
        SearchConfig::default()
            .with_threads(2)
            .with_seed(7)
            .with_expansion_threshold(1)
    }

    fn alternate(moves: &[(i32, i32)]) -> Board {
        let mut board = Board::new();
        for &(x, y) in moves {
            let color = board.side_to_move();
            assert_eq!(board.make_move(x, y, color), Ok(true));
        }
        board
    }

    /// Black to move with an open four on row 9.
    fn winning_board() -> Board {
        alternate(&[(5, 9), (0, 0), (6, 9), (0, 2), (7, 9), (0, 4), (8, 9), (0, 6)])
    }

    #[test]
    fn test_first_update_expands_center() {
        let board = Board::new();
        let mut tree = SearchTree::new(Stone::Black, config());
        assert_eq!(tree.update(&board).unwrap(), 2);

        assert_eq!(tree.total_playouts(), 2);
        assert_eq!(tree.root().playouts, 1);
        assert_eq!(tree.children_count(), 1);
        let data = tree.nodes_data();
        assert_eq!(data[0].pos, Board::center());
        assert_eq!(data[0].color, Stone::Black);
        assert!(tree.is_decision_ready(3));
    }

    #[test]
    fn test_expansion_waits_for_threshold() {
        let board = Board::new();
        let mut tree = SearchTree::new(Stone::Black, config().with_expansion_threshold(5));
        tree.update(&board).unwrap();
        tree.update(&board).unwrap();
        assert_eq!(tree.children_count(), 0);
        tree.update(&board).unwrap();
        assert_eq!(tree.children_count(), 1);
    }

    #[test]
    fn test_terminal_children_are_marked_and_scored() {
        let board = winning_board();
        let mut tree = SearchTree::for_board(&board, Stone::Black, config());
        assert_eq!(tree.root().color(), Stone::White);

        for _ in 0..12 {
            tree.update(&board).unwrap();
        }
        let data = tree.nodes_data();
        assert_eq!(data.len(), 2);
        for stats in &data {
            assert!([Pos::new(4, 9), Pos::new(9, 9)].contains(&stats.pos));
            if stats.visits > 0 {
                assert_eq!(stats.avg_score, 1.0);
                assert!(stats.selection_score >= 100.0);
            }
        }
        // Root is scored from White's side
        assert!(tree.root().score < 0.0);
        let best = tree.best_move().unwrap();
        assert!([Pos::new(4, 9), Pos::new(9, 9)].contains(&best.pos));
    }

    #[test]
    fn test_select_child_keeps_statistics() {
        let board = Board::new();
        let mut tree = SearchTree::new(Stone::Black, config().with_pruning(PruningPolicy::Hard));
        for _ in 0..6 {
            tree.update(&board).unwrap();
        }
        let center = Board::center();
        let before = tree.nodes_data()[0];
        let grandchildren = tree.best_playout(center.x as i32, center.y as i32);
        assert!(grandchildren.len() >= 2);

        tree.select_child(center.x as i32, center.y as i32).unwrap();
        let root = tree.root();
        assert_eq!(root.pos(), Some(center));
        assert_eq!(root.playouts, before.visits);
        assert_eq!(root.average(), before.avg_score);
        assert!(root.parent.is_none());
        // Old root freed, only the kept subtree remains
        assert_eq!(tree.node_count(), 1 + count_below(&tree, root));
    }

    fn count_below(tree: &SearchTree, node: &Node) -> usize {
        node.children
            .iter()
            .map(|&id| 1 + count_below(tree, tree.arena.get(id)))
            .sum()
    }

    #[test]
    fn test_select_unexplored_move_starts_fresh() {
        let board = Board::new();
        let mut tree = SearchTree::new(Stone::White, config());
        tree.update(&board).unwrap();
        tree.select_child(3, 3).unwrap();

        let root = tree.root();
        assert_eq!(root.pos(), Some(Pos::new(3, 3)));
        assert_eq!(root.color(), Stone::Black);
        assert_eq!(root.playouts, 0);
        assert!(root.is_leaf());
        assert!(tree.nodes_data().is_empty());
    }

    #[test]
    fn test_select_child_rejects_bad_coordinates() {
        let mut tree = SearchTree::new(Stone::Black, config());
        assert!(matches!(
            tree.select_child(-1, 4),
            Err(SearchError::Board(crate::BoardError::InvalidCoordinate { .. }))
        ));
    }

    #[test]
    fn test_soft_pruning_is_incremental() {
        let board = Board::new();
        let mut tree = SearchTree::new(
            Stone::Black,
            config().with_pruning(PruningPolicy::Soft { budget: 1 }),
        );
        tree.update(&board).unwrap();
        assert_eq!(tree.node_count(), 2);

        // The old root (with no other children) is queued, not freed
        tree.select_child(9, 9).unwrap();
        assert_eq!(tree.node_count(), 2);
        assert_eq!(tree.pending_garbage(), 1);

        assert_eq!(tree.collect_garbage(), 1);
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.pending_garbage(), 0);
        assert_eq!(tree.collect_garbage(), 0);
    }

    #[test]
    fn test_no_pruning_keeps_nodes() {
        let board = Board::new();
        let mut tree = SearchTree::new(Stone::Black, config().with_pruning(PruningPolicy::None));
        tree.update(&board).unwrap();
        tree.select_child(9, 9).unwrap();
        assert_eq!(tree.node_count(), 2);
        assert_eq!(tree.collect_garbage(), 0);
    }

    #[test]
    fn test_finished_board_is_not_searched() {
        let board = alternate(&[(0, 0), (0, 1), (1, 0), (1, 1), (2, 0), (2, 1), (3, 0), (3, 1), (4, 0)]);
        assert_eq!(board.status(), GameStatus::Win(Stone::Black));
        let mut tree = SearchTree::for_board(&board, Stone::White, config());
        assert_eq!(tree.update(&board).unwrap(), 0);
        assert_eq!(tree.total_playouts(), 0);
    }

    #[test]
    fn test_seeded_search_is_reproducible() {
        let board = alternate(&[(9, 9), (10, 10)]);
        let run = || {
            let mut tree = SearchTree::for_board(&board, Stone::Black, config());
            for _ in 0..15 {
                tree.update(&board).unwrap();
            }
            tree.nodes_data()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_best_playout_follows_best_average() {
        let board = Board::new();
        let mut tree = SearchTree::new(Stone::Black, config());
        for _ in 0..10 {
            tree.update(&board).unwrap();
        }
        let line = tree.best_playout(9, 9);
        assert_eq!(line[0].pos, Board::center());
        for pair in line.windows(2) {
            assert_ne!(pair[0].color, pair[1].color);
        }
        assert!(tree.best_playout(0, 0).is_empty());
    }
}
