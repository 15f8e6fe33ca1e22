//! Monte Carlo tree search
//!
//! Contains:
//! - Search configuration and pruning policies
//! - Arena-allocated tree nodes
//! - Priority-biased playouts run in parallel batches
//! - The tree controller with re-rooting

pub mod config;
pub mod node;
pub mod playout;
pub mod tree;

pub use config::{PruningPolicy, SearchConfig, MAX_PLAYOUT_THREADS};
pub use node::{Node, NodeArena, NodeId};
pub use tree::{MoveStats, SearchTree};
