//! Move ranking over cached board priorities
//!
//! Frontier cells are bucketed twice: by attack priority for the mover and
//! by defence priority against the opponent. The rules, in order:
//!
//! 1. an `IMMEDIATE` attack (a five) is played;
//! 2. otherwise an `IMMEDIATE` defence is played;
//! 3. an attack of `URGENT` or more while the best defence is below `HIGH`
//!    is played, and symmetrically for defence;
//! 4. when one side is at `URGENT` and the other at least at `HIGH`, attack
//!    and defence are equally likely;
//! 5. otherwise attack or defence is picked by coin flip and a bucket is
//!    drawn with weight `level + 1`.
//!
//! [`move_by_priority`] samples a single move from the chosen bucket;
//! [`best_moves`] returns the whole bucket instead (the union of both for
//! rule 4, the full frontier for rule 5).

use rand::seq::IndexedRandom;
use rand::Rng;

use crate::board::{Bitboard, Board, Pos, Stone};
use crate::eval::patterns::Priority;

type Levels = [Vec<Pos>; Priority::LEVELS];

struct Buckets {
    attack: Levels,
    defence: Levels,
}

impl Buckets {
    fn collect(board: &Board, color: Stone) -> Self {
        let mut buckets = Buckets {
            attack: Default::default(),
            defence: Default::default(),
        };
        for pos in board.frontier().iter() {
            let attack = board.move_priority(pos, color).min(Priority::MAX);
            let defence = board.move_defence_priority(pos, color).min(Priority::MAX);
            buckets.attack[attack as usize].push(pos);
            buckets.defence[defence as usize].push(pos);
        }
        buckets
    }

    fn top(levels: &Levels) -> u8 {
        (0..Priority::LEVELS)
            .rev()
            .find(|&level| !levels[level].is_empty())
            .unwrap_or(0) as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Choice {
    Attack(u8),
    Defence(u8),
    Either { attack: u8, defence: u8 },
    Spread,
}

fn decide(attack: u8, defence: u8) -> Choice {
    if attack >= Priority::IMMEDIATE {
        Choice::Attack(attack)
    } else if defence >= Priority::IMMEDIATE {
        Choice::Defence(defence)
    } else if attack >= Priority::URGENT && defence < Priority::HIGH {
        Choice::Attack(attack)
    } else if defence >= Priority::URGENT && attack < Priority::HIGH {
        Choice::Defence(defence)
    } else if attack.max(defence) >= Priority::URGENT && attack.min(defence) >= Priority::HIGH {
        Choice::Either { attack, defence }
    } else {
        Choice::Spread
    }
}

/// Sample one move for `color`, biased by the cached priorities.
///
/// Returns `None` on a finished game.
pub fn move_by_priority<R: Rng + ?Sized>(board: &Board, color: Stone, rng: &mut R) -> Option<Pos> {
    if board.status().is_terminal() || board.frontier().is_empty() {
        return None;
    }
    let buckets = Buckets::collect(board, color);
    let choice = decide(Buckets::top(&buckets.attack), Buckets::top(&buckets.defence));
    match choice {
        Choice::Attack(level) => buckets.attack[level as usize].choose(rng).copied(),
        Choice::Defence(level) => buckets.defence[level as usize].choose(rng).copied(),
        Choice::Either { attack, defence } => {
            if rng.random_bool(0.5) {
                buckets.attack[attack as usize].choose(rng).copied()
            } else {
                buckets.defence[defence as usize].choose(rng).copied()
            }
        }
        Choice::Spread => {
            let levels = if rng.random_bool(0.5) { &buckets.attack } else { &buckets.defence };
            weighted_pick(levels, rng)
        }
    }
}

/// Draw a non-empty bucket with weight `level + 1`, then a cell uniformly.
fn weighted_pick<R: Rng + ?Sized>(levels: &Levels, rng: &mut R) -> Option<Pos> {
    let total: usize = levels
        .iter()
        .enumerate()
        .filter(|(_, cells)| !cells.is_empty())
        .map(|(level, _)| level + 1)
        .sum();
    if total == 0 {
        return None;
    }
    let mut ticket = rng.random_range(0..total);
    for (level, cells) in levels.iter().enumerate() {
        if cells.is_empty() {
            continue;
        }
        if ticket <= level {
            return cells.choose(rng).copied();
        }
        ticket -= level + 1;
    }
    None
}

/// Shortlist of moves worth expanding for `color`.
///
/// Falls back to the whole frontier when nothing tactical is going on.
/// Empty on a finished game.
pub fn best_moves(board: &Board, color: Stone) -> Vec<Pos> {
    if board.status().is_terminal() {
        return Vec::new();
    }
    let buckets = Buckets::collect(board, color);
    match decide(Buckets::top(&buckets.attack), Buckets::top(&buckets.defence)) {
        Choice::Attack(level) => buckets.attack[level as usize].clone(),
        Choice::Defence(level) => buckets.defence[level as usize].clone(),
        Choice::Either { attack, defence } => {
            let union: Bitboard = buckets.attack[attack as usize]
                .iter()
                .chain(&buckets.defence[defence as usize])
                .copied()
                .collect();
            union.iter().collect()
        }
        Choice::Spread => board.available_moves(),
    }
}

/// Uniform sample from the frontier.
pub fn random_move<R: Rng + ?Sized>(board: &Board, rng: &mut R) -> Option<Pos> {
    if board.status().is_terminal() {
        return None;
    }
    let count = board.frontier().count() as usize;
    if count == 0 {
        return None;
    }
    board.frontier().nth(rng.random_range(0..count))
}
