//! Integration tests for otto-rust
//!
//! These exercise the public API end to end: whole games played through the
//! board, layouts loaded from text and YAML, and searches run on real positions.

use otto_rust::agent::{Agent, MctsAgent, RandomAgent};
use otto_rust::board::{Board, Outcome, Player, Square, squares};
use otto_rust::config::{GameConfig, SearchConfig, SimulationBudget};
use otto_rust::constants::{BOARD_SQUARES, FULL_BOARD};
use otto_rust::error::{LayoutError, MoveError};
use otto_rust::game::Game;
use otto_rust::search::{choose_move, search};

// =============================================================================
// Helper functions
// =============================================================================

fn sq(s: &str) -> Square {
    s.parse().unwrap()
}

/// Play a sequence of algebraic moves for whoever is to move.
fn setup_board(moves: &[&str]) -> Board {
    let mut board = Board::new();
    for mv in moves {
        board.play(sq(mv)).unwrap();
    }
    board
}

/// Every square is exactly one of Black, White or empty, and the cached
/// counts agree with a square-by-square recount of the grid.
fn assert_consistent(board: &Board) {
    let black = board.pieces(Player::Black);
    let white = board.pieces(Player::White);
    let empty = board.empty_mask();

    assert_eq!(black & white, 0, "a square holds both colors");
    assert_eq!(black & empty, 0, "a Black square is marked empty");
    assert_eq!(white & empty, 0, "a White square is marked empty");
    assert_eq!(black | white | empty, u64::MAX);

    let (mut blacks, mut whites, mut empties) = (0u32, 0u32, 0u32);
    for index in 0..BOARD_SQUARES {
        match board.piece_at(Square::from_index(index).unwrap()) {
            Some(Player::Black) => blacks += 1,
            Some(Player::White) => whites += 1,
            None => empties += 1,
        }
    }
    assert_eq!(board.scores(), (blacks, whites));
    assert_eq!(board.evaluate(), blacks as i32 - whites as i32);
    assert_eq!(board.piece_count(), blacks + whites);
    assert_eq!(empty.count_ones(), empties);

    let legal = board.legal_mask();
    assert_eq!(legal & !board.candidate_mask(), 0, "legal move outside candidates");
    assert_eq!(board.legal_count(), legal.count_ones() as usize);
    if board.is_game_over() {
        assert_eq!(legal, 0);
    } else {
        assert_ne!(legal, 0, "side to move must have a move while in progress");
    }
}

/// Black opens with `mv`, which must flip exactly `flipped`.
fn assert_opening(mv: &str, flipped: &str) {
    let mut board = Board::new();
    assert!(board.is_legal(sq(mv)));
    assert_eq!(board.play(sq(mv)), Ok(1));
    assert_eq!(board.piece_at(sq(mv)), Some(Player::Black));
    assert_eq!(board.piece_at(sq(flipped)), Some(Player::Black));
    assert_eq!(board.scores(), (4, 1));
    assert_eq!(board.to_move(), Player::White);
    assert_consistent(&board);
}

// =============================================================================
// Start position and notation
// =============================================================================

#[test]
fn test_start_position() {
    let board = Board::new();
    assert_consistent(&board);
    assert_eq!(board.to_move(), Player::Black);
    assert_eq!(board.scores(), (2, 2));
    assert_eq!(board.piece_at(sq("d4")), Some(Player::Black));
    assert_eq!(board.piece_at(sq("e5")), Some(Player::Black));
    assert_eq!(board.piece_at(sq("d5")), Some(Player::White));
    assert_eq!(board.piece_at(sq("e4")), Some(Player::White));

    let moves: Vec<String> = board.legal_moves().iter().map(|m| m.to_string()).collect();
    assert_eq!(moves, ["d6", "c5", "f4", "e3"]);
    assert!(!board.passed());
    assert_eq!(board.outcome(), None);
}

#[test]
fn test_opening_d6() {
    assert_opening("d6", "d5");
}

#[test]
fn test_opening_c5() {
    assert_opening("c5", "d5");
}

#[test]
fn test_opening_f4() {
    assert_opening("f4", "e4");
}

#[test]
fn test_opening_e3() {
    assert_opening("e3", "e4");
}

#[test]
fn test_algebraic_notation() {
    assert_eq!(sq("a8"), Square::new(0, 0).unwrap());
    assert_eq!(sq("h1"), Square::new(7, 7).unwrap());
    assert_eq!(sq("E3"), Square::new(5, 4).unwrap());

    for bad in ["", "e", "i4", "a0", "a9", "e33", "3e"] {
        assert!(bad.parse::<Square>().is_err(), "{bad:?} should not parse");
    }

    for index in 0..BOARD_SQUARES {
        let square = Square::from_index(index).unwrap();
        assert_eq!(sq(&square.to_string()), square);
    }
    assert_eq!(squares(FULL_BOARD).count(), BOARD_SQUARES);
}

// =============================================================================
// Playing moves
// =============================================================================

#[test]
fn test_scripted_opening() {
    let board = setup_board(&["e3", "f5", "f6"]);
    assert_eq!(board.piece_at(sq("e5")), Some(Player::Black));
    assert_consistent(&board);
    assert_eq!(board.to_move(), Player::White);
    assert_eq!(board.piece_count(), 7);
}

#[test]
fn test_illegal_moves_are_rejected_without_change() {
    let mut board = Board::new();
    let before = board.clone();

    assert_eq!(board.play(sq("d4")), Err(MoveError::Occupied(sq("d4"))));
    assert_eq!(board.play(sq("a1")), Err(MoveError::NoCapture(sq("a1"))));
    assert_eq!(
        board.apply_move(Player::White, sq("f5")),
        Err(MoveError::NotYourTurn(Player::Black))
    );
    assert_eq!(
        board.play_at(8, 0),
        Err(MoveError::OutOfBounds { row: 8, col: 0 })
    );

    assert_eq!(board, before);
    assert_eq!(board.to_move(), before.to_move());
    assert_eq!(board.legal_mask(), before.legal_mask());
}

#[test]
fn test_random_games_stay_consistent() {
    for seed in 0..20 {
        let mut agent = RandomAgent::new("rando", seed);
        let mut board = Board::new();
        let mut moves = 0;
        while !board.is_game_over() {
            let mv = agent.choose_move(&board).unwrap();
            let mover = board.to_move();
            let before_mover = board.pieces(mover);
            let before_other = board.pieces(mover.opponent());

            let flipped = board.apply_move(mover, mv).unwrap();

            // A move adds the placed piece plus the flips and removes the flips.
            assert!(flipped >= 1);
            assert_eq!(
                board.pieces(mover).count_ones(),
                before_mover.count_ones() + 1 + flipped
            );
            assert_eq!(
                board.pieces(mover.opponent()).count_ones(),
                before_other.count_ones() - flipped
            );
            assert_consistent(&board);
            moves += 1;
        }
        assert!(board.outcome().is_some());
        assert_eq!(board.piece_count(), 4 + moves);
        assert_eq!(board.play(sq("a1")), Err(MoveError::GameOver));
    }
}

// =============================================================================
// Skipped turns and game end
// =============================================================================

#[test]
fn test_skip_then_game_over() {
    let mut board: Board = "
        # Black can close both rows, White never gets a move
        BW......
        ........
        ........
        ........
        ........
        ........
        ........
        BW......
    "
    .parse()
    .unwrap();

    board.play(sq("c8")).unwrap();
    assert!(board.passed());
    assert_eq!(board.to_move(), Player::Black);
    assert_consistent(&board);

    board.play(sq("c1")).unwrap();
    assert!(board.is_game_over());
    assert_eq!(board.scores(), (6, 0));
    assert_eq!(board.outcome(), Some(Outcome::Win(Player::Black)));
}

#[test]
fn test_full_board_draw() {
    // Black fills ranks 8 to 5, White ranks 4 to 1.
    let black: u64 = 0x0000_0000_FFFF_FFFF;
    let board = Board::from_bitboards(black, !black, Player::Black).unwrap();
    assert!(board.is_game_over());
    assert_eq!(board.outcome(), Some(Outcome::Draw));
    assert!(board.legal_moves().is_empty());
}

// =============================================================================
// Layouts
// =============================================================================

#[test]
fn test_layout_loading() {
    let text = "
        ........
        ........
        ........
        ...WB...
        ...BW...
        ........
        ........
        ........
    ";
    let board: Board = text.parse().unwrap();
    assert_eq!(board, Board::new());

    let spaced = "
        . . . . . . . .
        . . . . . . . .
        . . . . . . . .
        . . . W B . . .
        . . . B W . . .
        . . . . . . . .
        . . . . . . . .
        . . . . . . . .
    ";
    assert_eq!(spaced.parse::<Board>().unwrap(), Board::new());
}

#[test]
fn test_yaml_layout() {
    let yaml = "
board:
  starting_position:
    - [null, null, null, null, null, null, null, null]
    - [null, null, null, null, null, null, null, null]
    - [null, null, null, null, null, null, null, null]
    - [null, null, null, 'W', 'B', null, null, null]
    - [null, null, null, 'B', 'W', null, null, null]
    - [null, null, null, null, null, null, null, null]
    - [null, null, null, null, null, null, null, null]
    - [null, null, null, null, null, null, null, null]
";
    // The text grid parser does not read YAML; the config loader does.
    assert!(yaml.parse::<Board>().is_err());

    let config = GameConfig::from_yaml(yaml).unwrap();
    let mut board = config.starting_board().unwrap();
    assert_eq!(board, Board::new());
    assert_consistent(&board);
    board.play(sq("e3")).unwrap();
    assert_eq!(board.scores(), (4, 1));

    let wide = yaml.replacen("'B', 'W', null", "'B', 'W', null, null", 1);
    assert_eq!(
        GameConfig::from_yaml(&wide).unwrap().starting_board(),
        Err(LayoutError::RowLength { row: 4, found: 9 })
    );
}

#[test]
fn test_layout_errors() {
    assert_eq!("........".parse::<Board>(), Err(LayoutError::RowCount(1)));

    let short = "........\n".repeat(7) + ".......";
    assert_eq!(
        short.parse::<Board>(),
        Err(LayoutError::RowLength { row: 7, found: 7 })
    );

    let bad = "........\n".repeat(7) + "...X....";
    assert_eq!(
        bad.parse::<Board>(),
        Err(LayoutError::Symbol {
            row: 7,
            symbol: 'X',
        })
    );

    assert_eq!(
        Board::from_bitboards(1, 1, Player::Black).map(|_| ()),
        Err(LayoutError::Overlap(1))
    );
}

// =============================================================================
// Search
// =============================================================================

#[test]
fn test_search_picks_legal_reply() {
    let board = setup_board(&["e3"]);
    let config = SearchConfig::default()
        .with_workers(2)
        .with_budget(SimulationBudget::fixed(100));
    let best = choose_move(&board, Player::White, &config).unwrap();
    assert!(board.is_legal(best));
}

#[test]
fn test_search_finds_winning_corner() {
    // Black's only move takes a8 and flips the whole rank.
    let board: Board = "
        .WWWWWWB
        ........
        ........
        ........
        ........
        ........
        ........
        ........
    "
    .parse()
    .unwrap();
    assert_eq!(board.legal_moves(), vec![sq("a8")]);

    let report = search(&board, Player::Black, &SearchConfig::default());
    assert_eq!(report.best, Some(sq("a8")));
}

#[test]
fn test_mcts_game_against_random() {
    let config = SearchConfig::default()
        .with_workers(2)
        .with_seed(5)
        .with_rollout_depth(16)
        .with_budget(SimulationBudget::fixed(24));
    let mut game = Game::new(
        Board::new(),
        Box::new(MctsAgent::new("Otto", config)),
        Box::new(RandomAgent::new("Rando", 11)),
    );
    let mut out = Vec::new();
    let result = game.run(&mut out).unwrap();

    assert!(game.board().is_game_over());
    assert!(result.outcome.is_some());
    let (black, white) = result.scores;
    assert_eq!(black + white, game.board().piece_count());
    assert_consistent(game.board());
}
