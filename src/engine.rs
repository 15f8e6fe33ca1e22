//! Game engine pairing the real board with its search tree
//!
//! The [`Engine`] owns the position being played and a [`SearchTree`]
//! rooted at it. Callers drive the search in slices with [`Engine::think`]
//! (a frame of a GUI, a loop in a test) and ask [`Engine::decide`] whether
//! the tree has seen enough playouts for the configured level.
//!
//! # Example
//!
//! ```
//! use gomoku::search::SearchConfig;
//! use gomoku::{Engine, Stone};
//!
//! let config = SearchConfig::default()
//!     .with_threads(2)
//!     .with_seed(3)
//!     .with_expansion_threshold(1);
//! let mut engine = Engine::new(Stone::Black, config);
//!
//! // The empty board has a single candidate: the center
//! engine.think_iterations(2).unwrap();
//! let pos = engine.decide().unwrap();
//! assert!(engine.play(pos.x as i32, pos.y as i32).unwrap());
//! assert_eq!(engine.board().stone_count(), 1);
//! ```

use std::time::{Duration, Instant};

use crate::board::{Board, GameStatus, Pos, Stone};
use crate::error::SearchError;
use crate::search::{SearchConfig, SearchTree};

/// Weakest and strongest engine levels.
pub const MIN_LEVEL: u32 = 1;
pub const MAX_LEVEL: u32 = 5;

/// Work done by one call to [`Engine::think`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThinkReport {
    /// Tree updates that ran
    pub updates: u32,
    /// Simulated games they contributed
    pub playouts: u64,
    pub elapsed: Duration,
}

/// Board plus search tree for one game.
pub struct Engine {
    board: Board,
    tree: SearchTree,
    ai_color: Stone,
    level: u32,
    config: SearchConfig,
}

impl Engine {
    /// New game with the search scored for `ai_color`.
    #[must_use]
    pub fn new(ai_color: Stone, config: SearchConfig) -> Self {
        Self {
            board: Board::new(),
            tree: SearchTree::new(ai_color, config),
            ai_color,
            level: 2,
            config,
        }
    }

    #[must_use]
    pub fn with_level(mut self, level: u32) -> Self {
        self.set_level(level);
        self
    }

    /// Set the strength level, clamped to `MIN_LEVEL..=MAX_LEVEL`.
    pub fn set_level(&mut self, level: u32) {
        self.level = level.clamp(MIN_LEVEL, MAX_LEVEL);
    }

    #[inline]
    pub fn level(&self) -> u32 {
        self.level
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn tree(&self) -> &SearchTree {
        &self.tree
    }

    #[inline]
    pub fn ai_color(&self) -> Stone {
        self.ai_color
    }

    #[inline]
    pub fn status(&self) -> GameStatus {
        self.board.status()
    }

    /// The game is running and the side to move is the engine's.
    pub fn is_ai_turn(&self) -> bool {
        !self.board.status().is_terminal() && self.board.side_to_move() == self.ai_color
    }

    /// Switch the side the search plays for. The tree is rebuilt, since
    /// its statistics are scored for the old side.
    pub fn set_ai_color(&mut self, color: Stone) {
        if color != self.ai_color {
            self.ai_color = color;
            self.rebuild_tree();
        }
    }

    /// Run tree updates until `budget` has elapsed. At least one update runs
    /// unless the game is over.
    pub fn think(&mut self, budget: Duration) -> Result<ThinkReport, SearchError> {
        let start = Instant::now();
        let mut report = ThinkReport::default();
        loop {
            let games = self.tree.update(&self.board)?;
            if games == 0 {
                break;
            }
            report.updates += 1;
            report.playouts += games as u64;
            if start.elapsed() >= budget {
                break;
            }
        }
        report.elapsed = start.elapsed();
        log::trace!(
            "{} updates, {} playouts in {:?}",
            report.updates,
            report.playouts,
            report.elapsed
        );
        Ok(report)
    }

    /// Run exactly `count` tree updates (fewer if the game is over).
    pub fn think_iterations(&mut self, count: u32) -> Result<ThinkReport, SearchError> {
        let start = Instant::now();
        let mut report = ThinkReport::default();
        for _ in 0..count {
            let games = self.tree.update(&self.board)?;
            if games == 0 {
                break;
            }
            report.updates += 1;
            report.playouts += games as u64;
        }
        report.elapsed = start.elapsed();
        Ok(report)
    }

    /// Best move of the side to move, once the tree is ready for the
    /// current level.
    pub fn decide(&self) -> Option<Pos> {
        if self.board.status().is_terminal() || !self.tree.is_decision_ready(self.level) {
            return None;
        }
        self.tree.best_move().map(|stats| stats.pos)
    }

    /// Play `(x, y)` for the side to move and advance the tree.
    ///
    /// Returns `Ok(false)` for an occupied cell or a finished game.
    pub fn play(&mut self, x: i32, y: i32) -> Result<bool, SearchError> {
        let color = self.board.side_to_move();
        if !self.board.make_move(x, y, color)? {
            return Ok(false);
        }
        self.tree.select_child(x, y)?;
        log::info!(
            "{color:?} plays ({x}, {y}) after {} playouts, status {:?}",
            self.tree.total_playouts(),
            self.board.status()
        );
        Ok(true)
    }

    /// Take back the last move. The tree is rebuilt for the earlier
    /// position.
    pub fn undo(&mut self) -> bool {
        if !self.board.unmake_move() {
            return false;
        }
        self.rebuild_tree();
        log::info!("move taken back, {} stones left", self.board.stone_count());
        true
    }

    /// Start a new game.
    pub fn reset(&mut self) {
        self.board.clear();
        self.rebuild_tree();
    }

    fn rebuild_tree(&mut self) {
        self.tree = SearchTree::for_board(&self.board, self.ai_color, self.config);
    }
}
