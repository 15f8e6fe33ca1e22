//! Heuristic playouts and parallel playout batches
//!
//! A batch runs one playout per thread on scoped threads. Every worker owns
//! a private board clone and a private generator seeded from the batch seed
//! and its worker index, so a batch's result depends only on its inputs and
//! never on which thread finishes first.

use std::thread;

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::board::{Board, GameStatus, Stone};
use crate::error::SearchError;

/// Score of a finished game from `eval_color`'s point of view.
#[inline]
pub fn outcome(status: GameStatus, eval_color: Stone) -> f32 {
    match status {
        GameStatus::Win(color) if color == eval_color => 1.0,
        GameStatus::Win(_) => -1.0,
        GameStatus::Draw | GameStatus::InProgress => 0.0,
    }
}

/// Play `board` out with priority-biased moves. `last` is the color that
/// made the most recent move; play continues with the other one.
pub fn playout<R: Rng + ?Sized>(board: &Board, last: Stone, eval_color: Stone, rng: &mut R) -> f32 {
    let mut board = board.clone();
    let mut color = last;
    while !board.status().is_terminal() {
        color = color.next();
        let Some(pos) = board.move_by_priority(color, rng) else {
            break;
        };
        if !board.play(pos, color) {
            break;
        }
    }
    outcome(board.status(), eval_color)
}

/// Seed of one worker's generator.
#[inline]
pub fn worker_seed(base: u64, worker: usize) -> u64 {
    base ^ (worker as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Average of `threads` concurrent playouts from `board`.
pub fn run_batch(
    board: &Board,
    last: Stone,
    eval_color: Stone,
    threads: usize,
    base_seed: u64,
) -> Result<f32, SearchError> {
    run_batch_with(threads, base_seed, |_, rng| playout(board, last, eval_color, rng))
}

/// Run `job` once per worker on scoped threads and average the results.
///
/// Results are summed in worker order. Every spawned worker is joined
/// before an error is reported; the first failure wins.
pub fn run_batch_with<F>(threads: usize, base_seed: u64, job: F) -> Result<f32, SearchError>
where
    F: Fn(usize, &mut Xoshiro256PlusPlus) -> f32 + Sync,
{
    let threads = threads.max(1);
    let job = &job;
    thread::scope(|scope| {
        let spawned: Vec<_> = (0..threads)
            .map(|worker| {
                thread::Builder::new()
                    .name(format!("playout-{worker}"))
                    .spawn_scoped(scope, move || {
                        let mut rng = Xoshiro256PlusPlus::seed_from_u64(worker_seed(base_seed, worker));
                        job(worker, &mut rng)
                    })
            })
            .collect();

        let mut total = 0.0f32;
        let mut failure = None;
        for (worker, handle) in spawned.into_iter().enumerate() {
            let result = match handle {
                Ok(handle) => handle.join().map_err(|_| SearchError::PlayoutPanicked { worker }),
                Err(err) => Err(SearchError::Spawn(err)),
            };
            match result {
                Ok(score) => total += score,
                Err(err) => {
                    log::warn!("playout batch failed: {err}");
                    failure.get_or_insert(err);
                }
            }
        }

        match failure {
            Some(err) => Err(err),
            None => Ok(total / threads as f32),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_outcome_signs() {
        assert_eq!(outcome(GameStatus::Win(Stone::Black), Stone::Black), 1.0);
        assert_eq!(outcome(GameStatus::Win(Stone::White), Stone::Black), -1.0);
        assert_eq!(outcome(GameStatus::Draw, Stone::White), 0.0);
    }

    #[test]
    fn test_playout_finishes_game() {
        let mut board = Board::new();
        board.make_move(9, 9, Stone::Black).unwrap();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(17);
        let score = playout(&board, Stone::Black, Stone::Black, &mut rng);
        assert!(score == 1.0 || score == -1.0 || score == 0.0);
    }

    #[test]
    fn test_playout_takes_immediate_win() {
        let mut board = Board::new();
        for x in 5..9 {
            board.make_move(x, 9, Stone::Black).unwrap();
        }
        board.make_move(4, 9, Stone::White).unwrap();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(2);
        // White moved last, Black completes the five
        assert_eq!(playout(&board, Stone::White, Stone::Black, &mut rng), 1.0);
    }

    #[test]
    fn test_batch_is_seed_deterministic() {
        let mut board = Board::new();
        board.make_move(9, 9, Stone::Black).unwrap();
        board.make_move(10, 10, Stone::White).unwrap();
        let a = run_batch(&board, Stone::White, Stone::Black, 4, 99).unwrap();
        let b = run_batch(&board, Stone::White, Stone::Black, 4, 99).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_batch_ignores_completion_order() {
        // Early workers finish last
        let slow_first = run_batch_with(4, 5, |worker, rng| {
            std::thread::sleep(Duration::from_millis(20 * (4 - worker as u64)));
            rng.random_range(-1.0f32..1.0)
        })
        .unwrap();
        let sequential: f32 = (0..4)
            .map(|worker| {
                let mut rng = Xoshiro256PlusPlus::seed_from_u64(worker_seed(5, worker));
                rng.random_range(-1.0f32..1.0)
            })
            .sum::<f32>()
            / 4.0;
        assert_eq!(slow_first, sequential);
    }

    #[test]
    fn test_panicking_worker_is_reported() {
        let result = run_batch_with(3, 0, |worker, _| {
            if worker == 1 {
                panic!("boom");
            }
            1.0
        });
        assert!(matches!(result, Err(SearchError::PlayoutPanicked { worker: 1 })));
    }

    #[test]
    fn test_zero_threads_runs_one() {
        assert_eq!(run_batch_with(0, 0, |_, _| 1.0).unwrap(), 1.0);
    }
}
