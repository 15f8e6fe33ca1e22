//! Board representation for Gomoku
//!
//! Coordinates are `(x, y)` with `x` the column and `y` the row; a cell's
//! linear index is `x + y * BOARD_SIZE`.

pub mod bitboard;
pub mod board;

#[cfg(test)]
mod tests;

// Re-exports
pub use bitboard::Bitboard;
pub use board::{Board, Move};

use crate::error::BoardError;

/// Board size (19x19)
pub const BOARD_SIZE: usize = 19;
pub const TOTAL_CELLS: usize = BOARD_SIZE * BOARD_SIZE; // 361
/// Stones in a row needed to win (overlines count)
pub const WIN_LENGTH: usize = 5;
/// Number of lines in one diagonal family
pub const DIAGONAL_COUNT: usize = 2 * BOARD_SIZE - 1;

/// Stone colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Stone {
    #[default]
    Empty,
    Black,
    White,
}

impl Stone {
    /// Both playable colors, in move order.
    pub const COLORS: [Stone; 2] = [Stone::Black, Stone::White];

    /// Get opponent color
    #[inline]
    pub fn opponent(self) -> Stone {
        match self {
            Stone::Black => Stone::White,
            Stone::White => Stone::Black,
            Stone::Empty => Stone::Empty,
        }
    }

    /// Color that moves after `self`. Black opens the game, so the
    /// successor of `Empty` is `Black`.
    #[inline]
    pub fn next(self) -> Stone {
        match self {
            Stone::Empty | Stone::White => Stone::Black,
            Stone::Black => Stone::White,
        }
    }

    /// Slot of a playable color in per-color tables.
    #[inline]
    pub(crate) fn side(self) -> Option<usize> {
        match self {
            Stone::Black => Some(0),
            Stone::White => Some(1),
            Stone::Empty => None,
        }
    }
}

/// Position on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pos {
    pub x: u8,
    pub y: u8,
}

impl Pos {
    #[inline]
    pub fn new(x: u8, y: u8) -> Self {
        debug_assert!(x < BOARD_SIZE as u8 && y < BOARD_SIZE as u8);
        Self { x, y }
    }

    /// Validating constructor for caller-supplied coordinates.
    pub fn try_new(x: i32, y: i32) -> Result<Self, BoardError> {
        if Self::is_valid(x, y) {
            Ok(Self { x: x as u8, y: y as u8 })
        } else {
            Err(BoardError::InvalidCoordinate { x, y, size: BOARD_SIZE })
        }
    }

    #[inline]
    pub fn to_index(self) -> usize {
        self.x as usize + self.y as usize * BOARD_SIZE
    }

    #[inline]
    pub fn from_index(idx: usize) -> Self {
        Self {
            x: (idx % BOARD_SIZE) as u8,
            y: (idx / BOARD_SIZE) as u8,
        }
    }

    #[inline]
    pub fn is_valid(x: i32, y: i32) -> bool {
        x >= 0 && x < BOARD_SIZE as i32 && y >= 0 && y < BOARD_SIZE as i32
    }

    /// Cell `distance` steps away along `(dx, dy)`, if still on the board.
    #[inline]
    pub fn offset(self, (dx, dy): (i32, i32), distance: i32) -> Option<Pos> {
        let x = self.x as i32 + dx * distance;
        let y = self.y as i32 + dy * distance;
        Self::is_valid(x, y).then(|| Pos::new(x as u8, y as u8))
    }

    /// Chebyshev (king-move) distance between two cells.
    #[inline]
    pub fn chebyshev(self, other: Pos) -> u8 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }
}

impl PartialOrd for Pos {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pos {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.to_index().cmp(&other.to_index())
    }
}

/// Outcome of the game on a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameStatus {
    #[default]
    InProgress,
    Draw,
    Win(Stone),
}

impl GameStatus {
    #[inline]
    pub fn is_terminal(self) -> bool {
        self != GameStatus::InProgress
    }

    /// Winner, if the game was decided by a five.
    #[inline]
    pub fn winner(self) -> Option<Stone> {
        match self {
            GameStatus::Win(color) => Some(color),
            _ => None,
        }
    }
}

/// The four line families. Each family also fixes the direction in which
/// bit positions grow along its lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Rows: line `y`, bit `x`
    Horizontal = 0,
    /// Columns: line `x`, bit `y`
    Vertical = 1,
    /// Cells with constant `x - y`: line `N - 1 - x + y`, bit `y`
    Diagonal = 2,
    /// Cells with constant `x + y`: line `x + y`, bit `y`
    AntiDiagonal = 3,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Horizontal,
        Direction::Vertical,
        Direction::Diagonal,
        Direction::AntiDiagonal,
    ];

    /// Unit step that advances one bit along the line.
    #[inline]
    pub fn step(self) -> (i32, i32) {
        match self {
            Direction::Horizontal => (1, 0),
            Direction::Vertical => (0, 1),
            Direction::Diagonal => (1, 1),
            Direction::AntiDiagonal => (-1, 1),
        }
    }

    #[inline]
    pub fn from_index(idx: usize) -> Direction {
        Direction::ALL[idx & 3]
    }

    /// `(line index, bit index)` of a cell in this family.
    #[inline]
    pub fn locate(self, pos: Pos) -> (usize, u32) {
        let (x, y) = (pos.x as usize, pos.y as usize);
        match self {
            Direction::Horizontal => (y, x as u32),
            Direction::Vertical => (x, y as u32),
            Direction::Diagonal => (BOARD_SIZE - 1 - x + y, y as u32),
            Direction::AntiDiagonal => (x + y, y as u32),
        }
    }

    /// Mask of the bits of line `line` that lie on the board.
    #[inline]
    pub fn line_mask(self, line: usize) -> u32 {
        let (lo, hi) = match self {
            Direction::Horizontal | Direction::Vertical => (0, BOARD_SIZE - 1),
            Direction::Diagonal | Direction::AntiDiagonal => {
                (line.saturating_sub(BOARD_SIZE - 1), line.min(BOARD_SIZE - 1))
            }
        };
        ((1u32 << (hi - lo + 1)) - 1) << lo
    }
}
