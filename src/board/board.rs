//! Board state with incremental frontier and priority caches
//!
//! Occupancy is stored once per line family: every row, column and diagonal
//! is a `u32` per color, so a five is found by a consecutive-bit count and
//! pattern matching works on whole lines at once.
//!
//! After each move only the cells whose lines could have changed are
//! re-evaluated against the pattern library. The move frontier is the set
//! of empty cells adjacent (king move) to a stone; on an empty board it
//! holds the center only.
//!
//! # Example
//!
//! ```
//! use gomoku::{Board, GameStatus, Stone};
//!
//! let mut board = Board::new();
//! assert_eq!(board.make_move(9, 9, Stone::Black), Ok(true));
//! assert_eq!(board.make_move(9, 9, Stone::White), Ok(false)); // occupied
//! assert!(board.make_move(19, 0, Stone::White).is_err());
//! assert_eq!(board.available_moves().len(), 8);
//! assert_eq!(board.status(), GameStatus::InProgress);
//! ```

use rand::Rng;

use super::bitboard::Bitboard;
use super::{Direction, GameStatus, Pos, Stone, BOARD_SIZE, DIAGONAL_COUNT, TOTAL_CELLS, WIN_LENGTH};
use crate::error::BoardError;
use crate::eval::patterns::{self, LineView, Pattern, PatternRef, Priority};
use crate::eval::ranking;

/// Farthest cell, along one line, whose patterns can see a new stone.
const REFRESH_REACH: i32 = 4;

/// A move in the game history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub pos: Pos,
    pub color: Stone,
}

/// One pattern instance that a defence cell would neutralize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefenceEntry {
    pub pattern: PatternRef,
    /// Cell the attacker would play to realize the pattern
    pub anchor: Pos,
}

/// Everything one color could block by playing a given cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefenceRecord {
    priority: u8,
    entries: Vec<DefenceEntry>,
}

impl DefenceRecord {
    #[inline]
    pub fn priority(&self) -> u8 {
        self.priority
    }

    #[inline]
    pub fn entries(&self) -> &[DefenceEntry] {
        &self.entries
    }

    /// Max over entries; blocking two distinct strong threats at once is
    /// worth at least `VITAL`. Entries of one (direction, miai) group count
    /// as a single threat.
    fn recompute(&mut self) {
        let mut best = Priority::NONE;
        let mut first_strong = None;
        let mut fork = false;
        for entry in &self.entries {
            let priority = entry.pattern.pattern().priority;
            best = best.max(priority);
            if priority >= Priority::HIGH {
                match first_strong {
                    None => first_strong = Some(entry.pattern.group()),
                    Some(group) if group != entry.pattern.group() => fork = true,
                    Some(_) => {}
                }
            }
        }
        if fork {
            best = best.max(Priority::VITAL);
        }
        self.priority = best;
    }
}

/// Back-link from an anchor to a record holding one of its entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AnchorLink {
    cell: Pos,
    side: usize,
}

/// Game board.
///
/// `Clone` is a full deep copy; search and playouts work on clones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// `lines[side][direction][line]` occupancy words
    lines: [[[u32; DIAGONAL_COUNT]; 4]; 2],
    cells: [Stone; TOTAL_CELLS],
    status: GameStatus,
    history: Vec<Move>,
    frontier: Bitboard,
    /// `attack[side][cell]`: best pattern `side` completes by playing `cell`
    attack: [[u8; TOTAL_CELLS]; 2],
    /// `defence[cell][side]`: what `side` blocks by playing `cell`
    defence: Vec<[DefenceRecord; 2]>,
    /// `anchored[cell]`: records holding entries anchored at `cell`
    anchored: Vec<Vec<AnchorLink>>,
}

impl Board {
    pub fn new() -> Self {
        let mut frontier = Bitboard::new();
        frontier.insert(Self::center());
        Self {
            lines: [[[0; DIAGONAL_COUNT]; 4]; 2],
            cells: [Stone::Empty; TOTAL_CELLS],
            status: GameStatus::InProgress,
            history: Vec::with_capacity(TOTAL_CELLS),
            frontier,
            attack: [[Priority::NONE; TOTAL_CELLS]; 2],
            defence: vec![Default::default(); TOTAL_CELLS],
            anchored: vec![Vec::new(); TOTAL_CELLS],
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        BOARD_SIZE
    }

    #[inline]
    pub fn center() -> Pos {
        Pos::new((BOARD_SIZE / 2) as u8, (BOARD_SIZE / 2) as u8)
    }

    /// Reset to the empty board.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Get stone at position
    #[inline]
    pub fn get(&self, pos: Pos) -> Stone {
        self.cells[pos.to_index()]
    }

    #[inline]
    pub fn is_empty(&self, pos: Pos) -> bool {
        self.get(pos) == Stone::Empty
    }

    #[inline]
    pub fn status(&self) -> GameStatus {
        self.status
    }

    #[inline]
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    #[inline]
    pub fn last_move(&self) -> Option<Move> {
        self.history.last().copied()
    }

    /// Total stones on board
    #[inline]
    pub fn stone_count(&self) -> usize {
        self.history.len()
    }

    /// Color whose turn it is, assuming alternating play from Black.
    #[inline]
    pub fn side_to_move(&self) -> Stone {
        self.last_move().map_or(Stone::Black, |m| m.color.next())
    }

    /// The candidate-move frontier.
    #[inline]
    pub fn frontier(&self) -> &Bitboard {
        &self.frontier
    }

    /// Frontier cells in index order.
    pub fn available_moves(&self) -> Vec<Pos> {
        self.frontier.iter().collect()
    }

    /// Raw occupancy word of one line for one color.
    #[inline]
    pub fn line_bits(&self, color: Stone, direction: Direction, line: usize) -> u32 {
        color.side().map_or(0, |side| self.lines[side][direction as usize][line])
    }

    /// Attack priority: how strong a shape `color` makes by playing `pos`.
    #[inline]
    pub fn move_priority(&self, pos: Pos, color: Stone) -> u8 {
        color.side().map_or(Priority::NONE, |side| self.attack[side][pos.to_index()])
    }

    /// Defence priority: how much `color` blocks by playing `pos`. At least
    /// the opponent's own attack priority on that cell.
    #[inline]
    pub fn move_defence_priority(&self, pos: Pos, color: Stone) -> u8 {
        let Some(side) = color.side() else {
            return Priority::NONE;
        };
        let idx = pos.to_index();
        self.defence[idx][side].priority.max(self.attack[1 - side][idx])
    }

    /// Defence record of `color` at `pos`.
    #[inline]
    pub fn defence_record(&self, pos: Pos, color: Stone) -> Option<&DefenceRecord> {
        color.side().map(|side| &self.defence[pos.to_index()][side])
    }

    /// Stones of the decisive run, ordered along the line.
    pub fn winning_line(&self) -> Option<Vec<Pos>> {
        let winner = self.status.winner()?;
        let last = self.history.iter().rev().find(|m| m.color == winner)?.pos;
        Direction::ALL.into_iter().find_map(|dir| {
            let (dx, dy) = dir.step();
            let mut start = last;
            while let Some(prev) = start.offset((dx, dy), -1).filter(|&p| self.get(p) == winner) {
                start = prev;
            }
            let run: Vec<Pos> = (0..)
                .map_while(|i| start.offset((dx, dy), i).filter(|&p| self.get(p) == winner))
                .collect();
            (run.len() >= WIN_LENGTH).then_some(run)
        })
    }

    // =========================================================================
    // Ranking shortcuts
    // =========================================================================

    /// Tactically relevant shortlist for `color`, see [`ranking::best_moves`].
    pub fn best_moves(&self, color: Stone) -> Vec<Pos> {
        ranking::best_moves(self, color)
    }

    /// Heuristically biased sample, see [`ranking::move_by_priority`].
    pub fn move_by_priority<R: Rng + ?Sized>(&self, color: Stone, rng: &mut R) -> Option<Pos> {
        ranking::move_by_priority(self, color, rng)
    }

    /// Uniform sample from the frontier.
    pub fn random_move<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Pos> {
        ranking::random_move(self, rng)
    }

    // =========================================================================
    // Moves
    // =========================================================================

    /// Play `color` at `(x, y)`.
    ///
    /// Returns `Ok(false)` if the cell is occupied or the game is already
    /// decided, and an error for off-board coordinates or `Stone::Empty`.
    /// Turn order is not enforced.
    pub fn make_move(&mut self, x: i32, y: i32, color: Stone) -> Result<bool, BoardError> {
        let pos = Pos::try_new(x, y)?;
        if color == Stone::Empty {
            return Err(BoardError::EmptyStone);
        }
        Ok(self.play(pos, color))
    }

    /// Validated-input variant of [`make_move`](Self::make_move).
    pub fn play(&mut self, pos: Pos, color: Stone) -> bool {
        let Some(side) = color.side() else {
            return false;
        };
        if self.status.is_terminal() || !self.is_empty(pos) {
            return false;
        }

        self.cells[pos.to_index()] = color;
        for dir in Direction::ALL {
            let (line, bit) = dir.locate(pos);
            self.lines[side][dir as usize][line] |= 1 << bit;
        }
        self.history.push(Move { pos, color });
        if self.history.len() == 1 {
            // Drop the empty-board seed wherever the opening landed
            self.frontier.clear();
        } else {
            self.frontier.remove(pos);
        }

        if self.longest_run_through(pos, side) >= WIN_LENGTH as u32 {
            self.status = GameStatus::Win(color);
            log::trace!("{color:?} wins at ({}, {})", pos.x, pos.y);
            return true;
        }
        if self.history.len() == TOTAL_CELLS {
            self.status = GameStatus::Draw;
            return true;
        }

        self.update_around(pos);
        true
    }

    /// Take back the last move.
    ///
    /// The whole pre-move state is restored, frontier and priority caches
    /// included, by replaying the remaining history on an empty board.
    /// Returns `false` if there is nothing to undo.
    pub fn unmake_move(&mut self) -> bool {
        if self.history.is_empty() {
            return false;
        }
        let mut moves = std::mem::take(&mut self.history);
        moves.pop();
        *self = Self::new();
        for m in moves {
            self.play(m.pos, m.color);
        }
        true
    }

    fn longest_run_through(&self, pos: Pos, side: usize) -> u32 {
        Direction::ALL
            .into_iter()
            .map(|dir| {
                let (line, _) = dir.locate(pos);
                longest_run(self.lines[side][dir as usize][line])
            })
            .max()
            .unwrap_or(0)
    }

    // =========================================================================
    // Incremental update
    // =========================================================================

    /// Refresh every cell whose patterns can see `pos` and grow the frontier
    /// around it.
    fn update_around(&mut self, pos: Pos) {
        let idx = pos.to_index();
        let mut touched = Bitboard::new();
        touched.insert(pos);

        // Threats that this cell used to block must be re-derived
        let mut stale = Vec::new();
        for side in 0..2 {
            let record = std::mem::take(&mut self.defence[idx][side]);
            stale.extend(record.entries.iter().map(|e| e.anchor));
        }
        self.clear_anchor(pos);
        self.attack[0][idx] = Priority::NONE;
        self.attack[1][idx] = Priority::NONE;

        for dir in Direction::ALL {
            let (dx, dy) = dir.step();
            for step in [(dx, dy), (-dx, -dy)] {
                for distance in 1..=REFRESH_REACH {
                    let Some(cell) = pos.offset(step, distance) else {
                        break;
                    };
                    if self.is_empty(cell) {
                        if touched.insert(cell) {
                            self.refresh(cell);
                        }
                        if distance == 1 {
                            self.frontier.insert(cell);
                        }
                    } else if distance == 2 {
                        if let Some(beyond) = self.first_empty_behind(pos, step) {
                            self.frontier.insert(beyond);
                            if touched.insert(beyond) {
                                self.refresh(beyond);
                            }
                        }
                    }
                }
            }
        }

        for anchor in stale {
            if touched.insert(anchor) {
                self.refresh(anchor);
            }
        }
    }

    /// Ray-cast past a wall of stones that starts two steps from `pos`.
    fn first_empty_behind(&self, pos: Pos, step: (i32, i32)) -> Option<Pos> {
        (3..=WIN_LENGTH as i32 + 2)
            .map_while(|distance| pos.offset(step, distance))
            .find(|&cell| self.is_empty(cell))
    }

    /// Re-evaluate `cell` against the pattern library for both colors.
    fn refresh(&mut self, cell: Pos) {
        self.clear_anchor(cell);
        let idx = cell.to_index();
        if !self.is_empty(cell) {
            self.attack[0][idx] = Priority::NONE;
            self.attack[1][idx] = Priority::NONE;
            return;
        }

        for side in 0..2 {
            let mut best = Priority::NONE;
            let mut strong_lines = 0;
            for dir in Direction::ALL {
                let view = self.line_view(cell, dir, side);
                let Some(pattern) = patterns::find_match(&view) else {
                    continue;
                };
                best = best.max(pattern.priority);
                if pattern.priority >= Priority::HIGH {
                    strong_lines += 1;
                }
                self.register_defence(cell, dir, side, pattern);
            }
            if strong_lines >= 2 {
                best = best.max(Priority::VITAL);
            }
            self.attack[side][idx] = best;
        }
    }

    #[inline]
    fn line_view(&self, cell: Pos, dir: Direction, side: usize) -> LineView {
        let (line, bit) = dir.locate(cell);
        let d = dir as usize;
        LineView::new(
            self.lines[side][d][line],
            self.lines[1 - side][d][line],
            dir.line_mask(line),
            bit,
        )
    }

    /// Record, at every defence cell of `pattern`, that the opponent of
    /// `side` can block it there.
    fn register_defence(&mut self, anchor: Pos, dir: Direction, side: usize, pattern: &Pattern) {
        let defender = 1 - side;
        for (k, &offset) in pattern.defence_offsets().iter().enumerate() {
            let Some(target) = anchor.offset(dir.step(), offset as i32) else {
                continue;
            };
            let record = &mut self.defence[target.to_index()][defender];
            record.entries.push(DefenceEntry {
                pattern: PatternRef::pack(pattern.id, k as u8, dir as u8, pattern.miai),
                anchor,
            });
            record.recompute();
            self.anchored[anchor.to_index()].push(AnchorLink { cell: target, side: defender });
        }
    }

    /// Drop every defence entry anchored at `anchor`.
    fn clear_anchor(&mut self, anchor: Pos) {
        let links = std::mem::take(&mut self.anchored[anchor.to_index()]);
        for link in links {
            let record = &mut self.defence[link.cell.to_index()][link.side];
            record.entries.retain(|e| e.anchor != anchor);
            record.recompute();
        }
    }
}

#[cfg(test)]
impl Board {
    /// Copy with every priority cache rebuilt from scratch.
    pub(crate) fn with_fresh_caches(&self) -> Board {
        let mut fresh = self.clone();
        fresh.attack = [[Priority::NONE; TOTAL_CELLS]; 2];
        fresh.defence = vec![Default::default(); TOTAL_CELLS];
        fresh.anchored = vec![Vec::new(); TOTAL_CELLS];
        for idx in 0..TOTAL_CELLS {
            fresh.refresh(Pos::from_index(idx));
        }
        fresh
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// Length of the longest run of consecutive set bits.
#[inline]
pub fn longest_run(mut bits: u32) -> u32 {
    let mut run = 0;
    while bits != 0 {
        bits &= bits << 1;
        run += 1;
    }
    run
}
