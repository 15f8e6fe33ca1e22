//! Search configuration
//!
//! All tunables of the tree search live here and are fixed when a
//! [`SearchTree`](super::SearchTree) is built.

/// Cap on playout threads per batch.
pub const MAX_PLAYOUT_THREADS: usize = 24;

/// What happens to subtrees that become unreachable after re-rooting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PruningPolicy {
    /// Keep abandoned nodes allocated until the tree is dropped.
    None,
    /// Free abandoned subtrees immediately.
    Hard,
    /// Queue abandoned subtrees and free at most `budget` nodes per update.
    Soft { budget: usize },
}

impl PruningPolicy {
    /// Soft pruning with a budget of 4096 nodes per update.
    pub const fn soft() -> Self {
        PruningPolicy::Soft { budget: 4096 }
    }
}

impl Default for PruningPolicy {
    fn default() -> Self {
        PruningPolicy::soft()
    }
}

/// Search tunables.
///
/// # Example
///
/// ```
/// use gomoku::search::{PruningPolicy, SearchConfig};
///
/// let config = SearchConfig::default()
///     .with_threads(4)
///     .with_seed(42)
///     .with_pruning(PruningPolicy::Hard);
/// assert_eq!(config.threads, 4);
/// assert_eq!(config.expansion_threshold, 32);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchConfig {
    /// Real playouts a leaf needs before it is expanded
    pub expansion_threshold: u32,
    /// Playouts per batch, one thread each
    pub threads: usize,
    /// Parent playouts after which random child selection stops
    pub exploration_horizon: f64,
    /// Added to the selection score of terminal children
    pub terminal_bonus: f32,
    pub pruning: PruningPolicy,
    /// Fixed seed for reproducible searches
    pub seed: Option<u64>,
}

impl SearchConfig {
    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.clamp(1, MAX_PLAYOUT_THREADS);
        self
    }

    #[must_use]
    pub fn with_expansion_threshold(mut self, playouts: u32) -> Self {
        self.expansion_threshold = playouts;
        self
    }

    #[must_use]
    pub fn with_exploration_horizon(mut self, playouts: f64) -> Self {
        self.exploration_horizon = playouts;
        self
    }

    /// A soft budget of 0 would never free anything, so it is raised to 1.
    #[must_use]
    pub fn with_pruning(mut self, pruning: PruningPolicy) -> Self {
        self.pruning = match pruning {
            PruningPolicy::Soft { budget } => PruningPolicy::Soft { budget: budget.max(1) },
            other => other,
        };
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        let threads = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self {
            expansion_threshold: 32,
            threads: threads.clamp(1, MAX_PLAYOUT_THREADS),
            exploration_horizon: 500_000.0,
            terminal_bonus: 100.0,
            pruning: PruningPolicy::default(),
            seed: None,
        }
    }
}
