//! Position knowledge for Gomoku
//!
//! This module turns raw board lines into per-cell priorities and ranks
//! candidate moves:
//! - [`patterns`]: the tactical pattern table and line matching
//! - [`ranking`]: bucket-based move selection used by playouts and expansion

pub mod patterns;
pub mod ranking;

pub use patterns::{Pattern, PatternRef, Priority, PATTERNS};
pub use ranking::{best_moves, move_by_priority, random_move};
