#![cfg(test)]

//! End-to-end scenario tests against known positions and lines of play.
//!
//! Named positions are built once into a [`lazy_static`] fixture table and
//! looked up by name from the individual scenario tests below, rather than
//! rebuilding the same board in every test function.

use lazy_static::lazy_static;

use crate::{
    board::Board,
    defs::{CastlingRights, Color, Move, PieceKind, Square},
    evaluation::evaluate,
    movegen::{king_in_check, legal_moves},
    search::search,
    transposition_table::TranspositionTable,
};

struct NamedPosition {
    name: &'static str,
    build: fn() -> Board,
}

fn starting_position() -> Board {
    Board::starting_position()
}

fn lone_h_pawn() -> Board {
    let mut board = Board::empty();
    board.set_square(7, 8, Square::Occupied(PieceKind::Pawn, Color::White));
    board.set_square(1, 5, Square::Occupied(PieceKind::King, Color::White));
    board.set_square(8, 5, Square::Occupied(PieceKind::King, Color::Black));
    board
}

fn open_castling_position() -> Board {
    let mut board = Board::empty();
    board.set_square(1, 5, Square::Occupied(PieceKind::King, Color::White));
    board.set_square(1, 1, Square::Occupied(PieceKind::Rook, Color::White));
    board.set_square(1, 8, Square::Occupied(PieceKind::Rook, Color::White));
    board.set_square(8, 5, Square::Occupied(PieceKind::King, Color::Black));
    board.set_can_castle(
        Color::White,
        CastlingRights {
            kingside: true,
            queenside: true,
        },
    );
    board
}

lazy_static! {
    static ref POSITIONS: Vec<NamedPosition> = vec![
        NamedPosition {
            name: "startpos",
            build: starting_position,
        },
        NamedPosition {
            name: "lone_h_pawn",
            build: lone_h_pawn,
        },
        NamedPosition {
            name: "open_castling",
            build: open_castling_position,
        },
    ];
}

fn position(name: &str) -> Board {
    (POSITIONS
        .iter()
        .find(|p| p.name == name)
        .unwrap_or_else(|| panic!("no fixture position named {name}"))
        .build)()
}

const fn mv(source_rank: u8, source_file: u8, target_rank: u8, target_file: u8) -> Move {
    Move {
        source_rank,
        source_file,
        target_rank,
        target_file,
        promotion: None,
    }
}

/// Scenario 1: the starting position's 20 legal moves, in the engine's
/// deterministic generation order.
#[test]
fn scenario_1_starting_position_move_order() {
    let board = position("startpos");
    let moves = legal_moves(&board, Color::White).unwrap();
    let rendered: Vec<String> = moves.iter().map(ToString::to_string).collect();
    assert_eq!(
        rendered,
        vec![
            "b1-c3", "b1-a3", "g1-h3", "g1-f3", "a2-a3", "a2-a4", "b2-b3", "b2-b4", "c2-c3",
            "c2-c4", "d2-d3", "d2-d4", "e2-e3", "e2-e4", "f2-f3", "f2-f4", "g2-g3", "g2-g4",
            "h2-h3", "h2-h4",
        ]
    );
}

/// Scenario 2: Fool's mate. 1.f3 e5 2.g4 Qh4# leaves White with no legal
/// moves and in check.
#[test]
fn scenario_2_fools_mate() {
    let mut board = position("startpos");
    board.apply(mv(2, 6, 3, 6)); // f2-f3
    board.apply(mv(7, 5, 5, 5)); // e7-e5
    board.apply(mv(2, 7, 4, 7)); // g2-g4

    let black_moves = legal_moves(&board, Color::Black).unwrap();
    let queen_mate = Move {
        source_rank: 8,
        source_file: 4,
        target_rank: 4,
        target_file: 8,
        promotion: None,
    };
    assert!(black_moves.contains(&queen_mate));

    board.apply(queen_mate);
    assert!(legal_moves(&board, Color::White).unwrap().is_empty());
    assert!(king_in_check(&board, Color::White).unwrap());
}

/// Scenario 3: a lone pawn on the seventh rank promotes to all four
/// pieces, in Rook, Bishop, Knight, Queen order.
#[test]
fn scenario_3_promotion_order() {
    let board = position("lone_h_pawn");
    let moves = legal_moves(&board, Color::White).unwrap();
    let rendered: Vec<String> = moves
        .iter()
        .filter(|mv| mv.source_rank == 7 && mv.source_file == 8)
        .map(ToString::to_string)
        .collect();
    assert_eq!(rendered, vec!["h7-h8=R", "h7-h8=B", "h7-h8=N", "h7-h8=Q"]);
}

/// Scenario 4: after 1.e4 d5 2.d4, Black's legal moves include the pawn
/// capture d5xe4.
#[test]
fn scenario_4_pawn_capture_is_offered() {
    let mut board = position("startpos");
    board.apply(mv(2, 5, 4, 5)); // e2-e4
    board.apply(mv(7, 4, 5, 4)); // d7-d5
    board.apply(mv(2, 4, 4, 4)); // d2-d4

    let moves = legal_moves(&board, Color::Black).unwrap();
    assert!(moves.contains(&mv(5, 4, 4, 5))); // d5-e4
}

/// Scenario 5: with both flanks open and both castling rights set, White
/// can castle either way; castling kingside relocates the rook to f1.
#[test]
fn scenario_5_both_castles_available_and_kingside_relocates_rook() {
    let mut board = position("open_castling");
    let moves = legal_moves(&board, Color::White).unwrap();
    assert!(moves.contains(&mv(1, 5, 1, 7))); // e1-g1
    assert!(moves.contains(&mv(1, 5, 1, 3))); // e1-c1

    board.apply(mv(1, 5, 1, 7));
    assert_eq!(
        board.get_square(1, 7).unwrap(),
        Square::Occupied(PieceKind::King, Color::White)
    );
    assert_eq!(
        board.get_square(1, 6).unwrap(),
        Square::Occupied(PieceKind::Rook, Color::White)
    );
}

/// Scenario 6: after 1.a4 e5 2.Nh3 e4 3.Ng1 e3 4.dxe3, the material balance
/// is +1 for White (a captured pawn) plus a small mobility term, so the
/// evaluator should land just under or at +1.
#[test]
fn scenario_6_evaluator_reflects_a_single_pawn_win() {
    let mut board = position("startpos");
    for played in [
        mv(2, 1, 4, 1), // a2-a4
        mv(7, 5, 5, 5), // e7-e5
        mv(1, 7, 3, 8), // g1-h3
        mv(5, 5, 4, 5), // e5-e4
        mv(3, 8, 1, 7), // h3-g1
        mv(4, 5, 3, 5), // e4-e3
    ] {
        board.apply(played);
    }
    board.apply(mv(2, 4, 3, 5)); // d2xe3

    let score = evaluate(&board, Color::White).unwrap();
    assert!((0.98..=1.05).contains(&score), "score was {score}");
}

/// A naive minimax with no pruning, used only by
/// [`pruning_does_not_change_the_root_score`] as an oracle: it visits every
/// node the full game tree has at `depth`, regardless of how any sibling
/// scored.
fn naive_minimax(board: &mut Board, color: Color, depth: u32) -> crate::evaluation::Score {
    let legal = legal_moves(board, color).unwrap();
    if depth == 0 || legal.is_empty() {
        return evaluate(board, color).unwrap();
    }

    let mut best = match color {
        Color::White => -crate::evaluation::MATE,
        Color::Black => crate::evaluation::MATE,
    };
    for candidate in legal {
        let record = board.apply(candidate);
        let child_score = naive_minimax(board, color.opposite(), depth - 1);
        board.undo(record);

        best = match color {
            Color::White => best.max(child_score),
            Color::Black => best.min(child_score),
        };
    }
    best
}

/// Pruning sanity: alpha-beta's root score must equal the score a naive,
/// unpruned minimax finds at the same depth.
#[test]
fn pruning_does_not_change_the_root_score() {
    let mut board = position("startpos");
    board.apply(mv(2, 5, 4, 5)); // e2-e4
    board.apply(mv(7, 5, 5, 5)); // e7-e5

    let mut table = TranspositionTable::new();
    let pruned = search(
        &mut board,
        Color::White,
        3,
        0,
        -crate::evaluation::MATE,
        crate::evaluation::MATE,
        &mut table,
        None,
    )
    .unwrap();

    let naive = naive_minimax(&mut board, Color::White, 3);

    assert!(
        (pruned.score - naive).abs() < 1e-9,
        "pruned={}, naive={}",
        pruned.score,
        naive
    );
}
