use super::*;
use crate::eval::patterns::Priority;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

#[test]
fn test_stone_opponent() {
    assert_eq!(Stone::Black.opponent(), Stone::White);
    assert_eq!(Stone::White.opponent(), Stone::Black);
    assert_eq!(Stone::Empty.opponent(), Stone::Empty);
}

#[test]
fn test_stone_next() {
    assert_eq!(Stone::Empty.next(), Stone::Black);
    assert_eq!(Stone::Black.next(), Stone::White);
    assert_eq!(Stone::White.next(), Stone::Black);
}

#[test]
fn test_pos_conversion() {
    let pos = Pos::new(9, 9); // Center
    assert_eq!(pos.to_index(), 9 + 9 * 19);
    assert_eq!(Pos::from_index(180), pos);

    let pos = Pos::new(3, 17);
    assert_eq!(pos.to_index(), 3 + 17 * 19);
    assert_eq!(Pos::from_index(pos.to_index()), pos);
}

#[test]
fn test_pos_validity() {
    assert!(Pos::is_valid(0, 0));
    assert!(Pos::is_valid(18, 18));
    assert!(!Pos::is_valid(-1, 0));
    assert!(!Pos::is_valid(0, -1));
    assert!(!Pos::is_valid(19, 0));
    assert!(!Pos::is_valid(0, 19));

    assert_eq!(Pos::try_new(4, 5), Ok(Pos::new(4, 5)));
    assert_eq!(
        Pos::try_new(-1, 5),
        Err(BoardError::InvalidCoordinate { x: -1, y: 5, size: BOARD_SIZE })
    );
}

#[test]
fn test_board_constants() {
    assert_eq!(BOARD_SIZE, 19);
    assert_eq!(TOTAL_CELLS, 361);
    assert_eq!(WIN_LENGTH, 5);
}

#[test]
fn test_pos_ordering() {
    // Row-major by index: x varies fastest
    assert!(Pos::new(0, 0) < Pos::new(1, 0));
    assert!(Pos::new(18, 0) < Pos::new(0, 1));
}

#[test]
fn test_pos_offset_and_distance() {
    let pos = Pos::new(0, 5);
    assert_eq!(pos.offset((1, 1), 2), Some(Pos::new(2, 7)));
    assert_eq!(pos.offset((-1, 1), 1), None);
    assert_eq!(Pos::new(3, 3).chebyshev(Pos::new(5, 4)), 2);
}

fn alternate(moves: &[(i32, i32)]) -> Board {
    let mut board = Board::new();
    for &(x, y) in moves {
        let color = board.side_to_move();
        assert_eq!(board.make_move(x, y, color), Ok(true));
    }
    board
}

fn place(board: &mut Board, cells: impl IntoIterator<Item = (i32, i32)>, color: Stone) {
    for (x, y) in cells {
        assert_eq!(board.make_move(x, y, color), Ok(true));
    }
}

/// Empty cells within one king step of a stone, or the center alone.
fn expected_frontier(board: &Board) -> Vec<Pos> {
    if board.stone_count() == 0 {
        return vec![Board::center()];
    }
    (0..TOTAL_CELLS)
        .map(Pos::from_index)
        .filter(|&pos| board.is_empty(pos))
        .filter(|&pos| {
            (0..TOTAL_CELLS)
                .map(Pos::from_index)
                .any(|other| !board.is_empty(other) && other.chebyshev(pos) == 1)
        })
        .collect()
}

/// Priority-biased self-play, returning the board after every move.
fn random_game(seed: u64, max_moves: usize) -> Vec<Board> {
    random_game_from(None, seed, max_moves)
}

/// Like [`random_game`], with Black's first stone at `opening` if given.
fn random_game_from(opening: Option<Pos>, seed: u64, max_moves: usize) -> Vec<Board> {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let mut board = Board::new();
    let mut snapshots = Vec::new();
    if let Some(pos) = opening {
        assert!(board.play(pos, Stone::Black));
        snapshots.push(board.clone());
    }
    for _ in 0..max_moves {
        let color = board.side_to_move();
        let Some(pos) = board.move_by_priority(color, &mut rng) else {
            break;
        };
        assert!(board.play(pos, color));
        snapshots.push(board.clone());
        if board.status().is_terminal() {
            break;
        }
    }
    snapshots
}

#[test]
fn test_empty_board() {
    let board = Board::new();
    assert_eq!(board.stone_count(), 0);
    assert_eq!(board.status(), GameStatus::InProgress);
    assert_eq!(board.side_to_move(), Stone::Black);
    assert_eq!(board.last_move(), None);
    assert_eq!(board.available_moves(), vec![Board::center()]);
}

#[test]
fn test_first_move_frontier() {
    let mut board = Board::new();
    assert_eq!(board.make_move(9, 9, Stone::Black), Ok(true));

    let frontier = board.available_moves();
    assert_eq!(frontier.len(), 8);
    assert!(!board.frontier().contains(Pos::new(9, 9)));
    for pos in frontier {
        assert_eq!(pos.chebyshev(Pos::new(9, 9)), 1);
    }
    assert_eq!(board.last_move(), Some(Move { pos: Pos::new(9, 9), color: Stone::Black }));
    assert_eq!(board.side_to_move(), Stone::White);
}

#[test]
fn test_corner_move_frontier() {
    let board = alternate(&[(0, 0)]);
    assert_eq!(
        board.available_moves(),
        vec![Pos::new(1, 0), Pos::new(0, 1), Pos::new(1, 1)]
    );
}

#[test]
fn test_frontier_is_stone_neighbourhood() {
    for seed in 0..4 {
        for board in random_game(seed, 40) {
            if board.status().is_terminal() {
                continue;
            }
            assert_eq!(board.available_moves(), expected_frontier(&board), "seed {seed}");
        }
    }
}

#[test]
fn test_frontier_after_off_center_opening() {
    let openings = [Pos::new(0, 0), Pos::new(18, 5), Pos::new(3, 14), Pos::new(10, 9)];
    for (seed, opening) in openings.into_iter().enumerate() {
        for board in random_game_from(Some(opening), seed as u64, 40) {
            if board.status().is_terminal() {
                continue;
            }
            assert_eq!(board.available_moves(), expected_frontier(&board), "opening {opening:?}");
        }
    }
}

#[test]
fn test_incremental_caches_match_full_recompute() {
    for seed in 0..6 {
        let opening = (seed % 2 == 1).then(|| Pos::new(4, 15));
        for board in random_game_from(opening, seed, 80) {
            if board.status().is_terminal() {
                continue;
            }
            let fresh = board.with_fresh_caches();
            for pos in board.frontier().iter() {
                for color in Stone::COLORS {
                    assert_eq!(
                        board.move_priority(pos, color),
                        fresh.move_priority(pos, color),
                        "attack {pos:?} {color:?} seed {seed}"
                    );
                    assert_eq!(
                        board.move_defence_priority(pos, color),
                        fresh.move_defence_priority(pos, color),
                        "defence {pos:?} {color:?} seed {seed}"
                    );
                }
            }
        }
    }
}

#[test]
fn test_make_move_errors() {
    let mut board = Board::new();
    assert!(matches!(
        board.make_move(19, 3, Stone::Black),
        Err(BoardError::InvalidCoordinate { x: 19, y: 3, .. })
    ));
    assert!(matches!(board.make_move(3, -2, Stone::Black), Err(BoardError::InvalidCoordinate { .. })));
    assert_eq!(board.make_move(3, 3, Stone::Empty), Err(BoardError::EmptyStone));
    assert_eq!(board.stone_count(), 0);
}

#[test]
fn test_occupied_cell_rejected() {
    let mut board = alternate(&[(9, 9)]);
    let before = board.clone();
    assert_eq!(board.make_move(9, 9, Stone::White), Ok(false));
    assert_eq!(board, before);
}

#[test]
fn test_horizontal_win() {
    let mut board = Board::new();
    place(&mut board, (0..4).map(|x| (x, 0)), Stone::Black);
    assert_eq!(board.status(), GameStatus::InProgress);
    place(&mut board, [(4, 0)], Stone::Black);
    assert_eq!(board.status(), GameStatus::Win(Stone::Black));

    let expected: Vec<Pos> = (0..5).map(|x| Pos::new(x, 0)).collect();
    assert_eq!(board.winning_line(), Some(expected));
}

#[test]
fn test_vertical_win() {
    let mut board = Board::new();
    place(&mut board, (5..10).map(|y| (3, y)), Stone::White);
    assert_eq!(board.status(), GameStatus::Win(Stone::White));
    assert_eq!(board.winning_line().map(|line| line.len()), Some(5));
}

#[test]
fn test_diagonal_win() {
    let mut board = Board::new();
    // Completed in the middle
    place(&mut board, [(2, 2), (3, 3), (5, 5), (6, 6), (4, 4)], Stone::Black);
    assert_eq!(board.status(), GameStatus::Win(Stone::Black));

    let line = board.winning_line().unwrap();
    for i in 2..7u8 {
        assert!(line.contains(&Pos::new(i, i)));
    }
}

#[test]
fn test_anti_diagonal_win() {
    let mut board = Board::new();
    place(&mut board, (0..5).map(|i| (18 - i, i)), Stone::White);
    assert_eq!(board.status(), GameStatus::Win(Stone::White));
    assert_eq!(board.winning_line().map(|line| line.len()), Some(5));
}

#[test]
fn test_overline_wins() {
    let mut board = Board::new();
    place(&mut board, [(0, 7), (1, 7), (2, 7), (4, 7), (5, 7)], Stone::Black);
    assert_eq!(board.status(), GameStatus::InProgress);
    place(&mut board, [(3, 7)], Stone::Black);
    assert_eq!(board.status(), GameStatus::Win(Stone::Black));
    assert_eq!(board.winning_line().map(|line| line.len()), Some(6));
}

#[test]
fn test_no_moves_after_win() {
    let mut board = Board::new();
    place(&mut board, (0..5).map(|x| (x, 0)), Stone::Black);
    assert_eq!(board.make_move(10, 10, Stone::White), Ok(false));
    assert_eq!(board.stone_count(), 5);
}

#[test]
fn test_full_board_is_draw() {
    let mut board = Board::new();
    // Runs of at most two in every direction
    for idx in 0..TOTAL_CELLS {
        let pos = Pos::from_index(idx);
        let color = if (pos.x / 2 + pos.y) % 2 == 0 { Stone::Black } else { Stone::White };
        assert!(board.play(pos, color), "move {idx}");
        if idx + 1 < TOTAL_CELLS {
            assert_eq!(board.status(), GameStatus::InProgress, "move {idx}");
        }
    }
    assert_eq!(board.status(), GameStatus::Draw);
    assert_eq!(board.winning_line(), None);
}

#[test]
fn test_unmake_restores_every_state() {
    for seed in [3, 8] {
        let snapshots = random_game(seed, 30);
        let mut board = snapshots.last().cloned().unwrap();
        for expected in snapshots.iter().rev().skip(1) {
            assert!(board.unmake_move());
            assert_eq!(&board, expected);
        }
        assert!(board.unmake_move());
        assert_eq!(board, Board::new());
        assert!(!board.unmake_move());
    }
}

#[test]
fn test_unmake_reopens_finished_game() {
    let mut board = Board::new();
    place(&mut board, (0..5).map(|x| (x, 0)), Stone::Black);
    assert!(board.unmake_move());
    assert_eq!(board.status(), GameStatus::InProgress);
    assert_eq!(board.move_priority(Pos::new(4, 0), Stone::Black), Priority::IMMEDIATE);
}

#[test]
fn test_clear() {
    let mut board = alternate(&[(9, 9), (10, 10), (3, 4)]);
    board.clear();
    assert_eq!(board, Board::new());
}

#[test]
fn test_open_three_ends_are_vital() {
    let mut board = Board::new();
    place(&mut board, [(9, 9), (10, 9), (11, 9)], Stone::Black);

    for end in [Pos::new(8, 9), Pos::new(12, 9)] {
        assert!(board.frontier().contains(end));
        assert_eq!(board.move_priority(end, Stone::Black), Priority::URGENT);
        assert!(board.move_defence_priority(end, Stone::White) >= Priority::VITAL);
        assert!(board.move_defence_priority(end, Stone::Black) < Priority::VITAL);
    }
}

#[test]
fn test_defence_entries_follow_their_anchor() {
    let mut board = Board::new();
    place(&mut board, [(9, 9), (10, 9), (11, 9)], Stone::Black);

    let blocked_end = Pos::new(12, 9);
    let record = board.defence_record(Pos::new(8, 9), Stone::White).unwrap();
    assert!(record.entries().iter().any(|e| e.anchor == blocked_end));

    place(&mut board, [(12, 9)], Stone::White);
    let record = board.defence_record(Pos::new(8, 9), Stone::White).unwrap();
    assert!(record.entries().iter().all(|e| e.anchor != blocked_end));
    // Now only a closed four remains on that side
    assert_eq!(board.move_priority(Pos::new(8, 9), Stone::Black), Priority::HIGH);
}

#[test]
fn test_two_strong_lines_make_a_fork() {
    let mut board = Board::new();
    // Open twos crossing at (9, 9)
    place(&mut board, [(7, 9), (8, 9), (9, 7), (9, 8)], Stone::Black);
    assert_eq!(board.move_priority(Pos::new(9, 9), Stone::Black), Priority::VITAL);
}

#[test]
fn test_line_bits() {
    let board = alternate(&[(2, 5), (3, 6)]);
    assert_eq!(board.line_bits(Stone::Black, Direction::Horizontal, 5), 1 << 2);
    assert_eq!(board.line_bits(Stone::Black, Direction::Vertical, 2), 1 << 5);
    assert_eq!(board.line_bits(Stone::White, Direction::Horizontal, 5), 0);
    assert_eq!(board.line_bits(Stone::Empty, Direction::Horizontal, 5), 0);
}
