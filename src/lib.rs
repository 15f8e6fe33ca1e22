//! Gomoku engine driven by Monte Carlo tree search
//!
//! Free-style Gomoku on a 19x19 board: five or more in a row wins, no
//! forbidden moves and no captures.
//!
//! # Architecture
//!
//! The engine is organized into several modules:
//! - [`board`]: Bitboard-backed board with an incremental move frontier
//!   and cached attack / defence priorities per cell
//! - [`eval`]: Threat pattern library and priority-based move ranking
//! - [`search`]: MCTS tree with parallel playouts and re-rooting
//! - [`engine`]: Board and search tree paired for one game
//! - [`ui`]: egui viewer
//!
//! # Quick Start
//!
//! ```
//! use gomoku::search::SearchConfig;
//! use gomoku::{Engine, Stone};
//!
//! let config = SearchConfig::default().with_threads(2).with_seed(9);
//! let mut engine = Engine::new(Stone::White, config);
//!
//! // Human opens in the center
//! assert!(engine.play(9, 9).unwrap());
//!
//! // Search for the reply
//! engine.think_iterations(50).unwrap();
//! for stats in engine.tree().nodes_data() {
//!     println!("({}, {}) avg {:.3} over {}", stats.pos.x, stats.pos.y, stats.avg_score, stats.visits);
//! }
//! ```
//!
//! # Search Outline
//!
//! Each tree update:
//! 1. Descends by UCB score with decaying random exploration
//! 2. Runs one priority-biased playout per thread from the leaf
//! 3. Backpropagates the averaged outcome
//! 4. Expands the leaf with the ranked move shortlist once it has enough
//!    playouts

pub mod board;
pub mod engine;
pub mod error;
pub mod eval;
pub mod search;
pub mod ui;

// Re-export commonly used types for convenience
pub use board::{Board, GameStatus, Move, Pos, Stone, BOARD_SIZE};
pub use engine::{Engine, ThinkReport};
pub use error::{BoardError, SearchError};
pub use search::{MoveStats, PruningPolicy, SearchConfig, SearchTree};
