/*
 * Crab, a UCI-compatible chess engine
 * Copyright (C) 2024 Jasper Shovelton
 *
 * Crab is free software: you can redistribute it and/or modify it under the
 * terms of the GNU General Public License as published by the Free Software
 * Foundation, either version 3 of the License, or (at your option) any later
 * version.
 *
 * Crab is distributed in the hope that it will be useful, but WITHOUT ANY
 * WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
 * FOR A PARTICULAR PURPOSE. See the GNU General Public License for more
 * details.
 *
 * You should have received a copy of the GNU General Public License along with
 * Crab. If not, see <https://www.gnu.org/licenses/>.
 */

use crate::{
    board::Board,
    defs::{Color, Move, PieceKind, Square},
    error::EngineError,
};

/// Rook/queen straight-ray directions: north, east, south, west, in the
/// fixed order move generation emits them.
const ROOK_DIRECTIONS: [(i8, i8); 4] = [(1, 0), (0, 1), (-1, 0), (0, -1)];
/// Bishop/queen diagonal-ray directions, in the fixed order move
/// generation emits them.
const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (-1, 1), (1, -1), (-1, -1)];
/// Knight offsets, in the exact order move generation emits them.
const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (1, -2),
    (2, -1),
    (-2, -1),
    (-1, -2),
    (-1, 2),
    (-2, 1),
];
/// King step directions, in the exact order move generation emits them.
const KING_DIRECTIONS: [(i8, i8); 8] = [
    (1, 0),
    (0, 1),
    (-1, 0),
    (0, -1),
    (1, 1),
    (-1, 1),
    (1, -1),
    (-1, -1),
];

/// Generates every pseudo-legal move for `color` on `board`, in a fixed,
/// deterministic order: squares are scanned in (rank, file) ascending
/// order, and each owned piece emits its moves in a fixed per-piece-type
/// order.
///
/// Moves are materialized into a `Vec` rather than exposed as an iterator
/// that borrows the board across mutation — the branching factor in chess
/// is small enough that this is both simpler and at least as fast.
#[must_use]
pub fn legal_moves_ignoring_check(board: &Board, color: Color) -> Vec<Move> {
    let mut moves = Vec::new();

    for rank in 1_u8..=8 {
        for file in 1_u8..=8 {
            let square = board.get_square_unchecked(rank, file);
            if square.color() != Some(color) {
                continue;
            }

            match square.piece_kind() {
                Some(PieceKind::Rook) => {
                    generate_rays(board, color, rank, file, &ROOK_DIRECTIONS, &mut moves);
                }
                Some(PieceKind::Bishop) => {
                    generate_rays(board, color, rank, file, &BISHOP_DIRECTIONS, &mut moves);
                }
                Some(PieceKind::Queen) => {
                    generate_rays(board, color, rank, file, &ROOK_DIRECTIONS, &mut moves);
                    generate_rays(board, color, rank, file, &BISHOP_DIRECTIONS, &mut moves);
                }
                Some(PieceKind::Knight) => {
                    generate_steps(board, color, rank, file, &KNIGHT_OFFSETS, &mut moves);
                }
                Some(PieceKind::King) => {
                    generate_steps(board, color, rank, file, &KING_DIRECTIONS, &mut moves);
                    generate_castling(board, color, rank, file, &mut moves);
                }
                Some(PieceKind::Pawn) => {
                    generate_pawn_forward(board, color, rank, file, &mut moves);
                    generate_pawn_captures(board, color, rank, file, &mut moves);
                    generate_en_passant(board, color, rank, file, &mut moves);
                }
                None => {}
            }
        }
    }

    moves
}

/// Generates every legal move for `color`: every pseudo-legal move that does
/// not leave the mover's own king in check.
///
/// # Errors
///
/// Returns [`EngineError::MissingKing`] if `color` has no king on the
/// board — legality cannot be decided without one.
pub fn legal_moves(board: &Board, color: Color) -> Result<Vec<Move>, EngineError> {
    let mut legal = Vec::new();
    let mut scratch = *board;

    for mv in legal_moves_ignoring_check(board, color) {
        let record = scratch.apply(mv);
        let leaves_king_safe = !king_in_check(&scratch, color)?;
        scratch.undo(record);

        if leaves_king_safe {
            legal.push(mv);
        }
    }

    Ok(legal)
}

/// Returns whether `color`'s king is currently attacked.
///
/// # Errors
///
/// Returns [`EngineError::MissingKing`] if `color` has no king on the board.
pub fn king_in_check(board: &Board, color: Color) -> Result<bool, EngineError> {
    let (king_rank, king_file) = board.king_square(color)?;
    let enemy = color.opposite();

    if ray_attacked_by(
        board,
        enemy,
        king_rank,
        king_file,
        &ROOK_DIRECTIONS,
        PieceKind::Rook,
    ) || ray_attacked_by(
        board,
        enemy,
        king_rank,
        king_file,
        &BISHOP_DIRECTIONS,
        PieceKind::Bishop,
    ) {
        return Ok(true);
    }

    for &(dr, df) in &KNIGHT_OFFSETS {
        if let Some((r, f)) = offset(king_rank, king_file, dr, df) {
            if board.get_square_unchecked(r, f) == Square::Occupied(PieceKind::Knight, enemy) {
                return Ok(true);
            }
        }
    }

    for df in [-1, 1] {
        if let Some((r, f)) = offset(king_rank, king_file, color.pawn_direction(), df) {
            if board.get_square_unchecked(r, f) == Square::Occupied(PieceKind::Pawn, enemy) {
                return Ok(true);
            }
        }
    }

    for &(dr, df) in &KING_DIRECTIONS {
        if let Some((r, f)) = offset(king_rank, king_file, dr, df) {
            if board.get_square_unchecked(r, f) == Square::Occupied(PieceKind::King, enemy) {
                return Ok(true);
            }
        }
    }

    Ok(false)
}

/// Adds `(dr, df)` to `(rank, file)`, returning `None` if the result falls
/// outside `1..=8`.
fn offset(rank: u8, file: u8, dr: i8, df: i8) -> Option<(u8, u8)> {
    let rank = i8::try_from(rank).ok()? + dr;
    let file = i8::try_from(file).ok()? + df;
    if (1..=8).contains(&rank) && (1..=8).contains(&file) {
        Some((rank as u8, file as u8))
    } else {
        None
    }
}

/// Scans outward from `(rank, file)` in each of `directions` until the
/// first non-empty square, returning whether it is an enemy piece of kind
/// `attacker` or the enemy queen.
fn ray_attacked_by(
    board: &Board,
    enemy: Color,
    rank: u8,
    file: u8,
    directions: &[(i8, i8)],
    attacker: PieceKind,
) -> bool {
    for &(dr, df) in directions {
        let mut step = 1;
        while let Some((r, f)) = offset(rank, file, dr * step, df * step) {
            match board.get_square_unchecked(r, f) {
                Square::Empty => step += 1,
                Square::Occupied(kind, color) if color == enemy => {
                    if kind == attacker || kind == PieceKind::Queen {
                        return true;
                    }
                    break;
                }
                Square::Occupied(_, _) => break,
            }
        }
    }
    false
}

/// Generates sliding-piece moves in each of `directions` from `(rank,
/// file)`, stopping at the edge of the board, a friendly piece, or just
/// after an enemy piece (inclusive capture).
fn generate_rays(
    board: &Board,
    color: Color,
    rank: u8,
    file: u8,
    directions: &[(i8, i8)],
    moves: &mut Vec<Move>,
) {
    for &(dr, df) in directions {
        let mut step = 1;
        while let Some((r, f)) = offset(rank, file, dr * step, df * step) {
            match board.get_square_unchecked(r, f).color() {
                None => {
                    moves.push(plain_move(rank, file, r, f));
                    step += 1;
                }
                Some(c) if c == color => break,
                Some(_) => {
                    moves.push(plain_move(rank, file, r, f));
                    break;
                }
            }
        }
    }
}

/// Generates single-step moves (knight or king) in each of `offsets` from
/// `(rank, file)`.
fn generate_steps(
    board: &Board,
    color: Color,
    rank: u8,
    file: u8,
    offsets: &[(i8, i8)],
    moves: &mut Vec<Move>,
) {
    for &(dr, df) in offsets {
        if let Some((r, f)) = offset(rank, file, dr, df) {
            if board.get_square_unchecked(r, f).color() != Some(color) {
                moves.push(plain_move(rank, file, r, f));
            }
        }
    }
}

/// Generates kingside and queenside castling moves for the king on `(rank,
/// file)`, if the rights, empty transit squares, and rook are all present.
///
/// This does not check whether the king starts, passes through, or ends on
/// an attacked square other than the destination — only that the resulting
/// position (checked separately by [`legal_moves`]) leaves the king safe.
/// This is a known simplification of the real rules of chess, kept
/// deliberately rather than silently tightened.
fn generate_castling(board: &Board, color: Color, rank: u8, file: u8, moves: &mut Vec<Move>) {
    if file != 5 || rank != color.back_rank() {
        return;
    }
    let rights = board.can_castle(color);

    if rights.kingside
        && board.get_square_unchecked(rank, 6) == Square::Empty
        && board.get_square_unchecked(rank, 7) == Square::Empty
        && board.get_square_unchecked(rank, 8) == Square::Occupied(PieceKind::Rook, color)
    {
        moves.push(plain_move(rank, 5, rank, 7));
    }

    if rights.queenside
        && board.get_square_unchecked(rank, 2) == Square::Empty
        && board.get_square_unchecked(rank, 3) == Square::Empty
        && board.get_square_unchecked(rank, 4) == Square::Empty
        && board.get_square_unchecked(rank, 1) == Square::Occupied(PieceKind::Rook, color)
    {
        moves.push(plain_move(rank, 5, rank, 3));
    }
}

/// Generates the one- or two-square forward advance(s) of the pawn on
/// `(rank, file)`, emitting four promotion moves when landing on the last
/// rank.
fn generate_pawn_forward(board: &Board, color: Color, rank: u8, file: u8, moves: &mut Vec<Move>) {
    let dir = color.pawn_direction();
    let limit = if rank == color.pawn_home_rank() { 2 } else { 1 };

    for step in 1..=limit {
        let Some((target_rank, _)) = offset(rank, file, dir * step, 0) else {
            break;
        };
        if board.get_square_unchecked(target_rank, file) != Square::Empty {
            break;
        }
        push_pawn_move(color, rank, file, target_rank, file, moves);
    }
}

/// Generates the (up to) two diagonal captures available to the pawn on
/// `(rank, file)`.
fn generate_pawn_captures(board: &Board, color: Color, rank: u8, file: u8, moves: &mut Vec<Move>) {
    let dir = color.pawn_direction();
    for df in [-1, 1] {
        if let Some((target_rank, target_file)) = offset(rank, file, dir, df) {
            if let Some(enemy_color) = board.get_square_unchecked(target_rank, target_file).color()
            {
                if enemy_color != color {
                    push_pawn_move(color, rank, file, target_rank, target_file, moves);
                }
            }
        }
    }
}

/// Generates the en passant capture available to the pawn on `(rank,
/// file)`, if `board`'s last move was a two-square advance of an enemy
/// pawn onto an adjacent file.
fn generate_en_passant(board: &Board, color: Color, rank: u8, file: u8, moves: &mut Vec<Move>) {
    if rank != color.en_passant_rank() {
        return;
    }
    let Some(last) = board.last_move() else {
        return;
    };

    let adjacent_file = last.target_file;
    let is_adjacent = adjacent_file.abs_diff(file) == 1;
    let is_two_square_advance = last.source_file == last.target_file
        && last.source_rank == color.opposite().pawn_home_rank()
        && last.target_rank == rank;

    if is_adjacent && is_two_square_advance {
        let dir = color.pawn_direction();
        if let Some((target_rank, _)) = offset(rank, file, dir, 0) {
            moves.push(plain_move(rank, file, target_rank, adjacent_file));
        }
    }
}

/// Builds a non-promoting move.
const fn plain_move(source_rank: u8, source_file: u8, target_rank: u8, target_file: u8) -> Move {
    Move {
        source_rank,
        source_file,
        target_rank,
        target_file,
        promotion: None,
    }
}

/// Pushes a pawn move onto `moves`, expanding it into the four promotion
/// moves (Rook, Bishop, Knight, Queen, in that order) if it lands on the
/// last rank.
fn push_pawn_move(
    color: Color,
    source_rank: u8,
    source_file: u8,
    target_rank: u8,
    target_file: u8,
    moves: &mut Vec<Move>,
) {
    if target_rank == color.promotion_rank() {
        for &promotion in &PieceKind::PROMOTION_ORDER {
            moves.push(Move {
                source_rank,
                source_file,
                target_rank,
                target_file,
                promotion: Some(promotion),
            });
        }
    } else {
        moves.push(plain_move(source_rank, source_file, target_rank, target_file));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_position_has_twenty_legal_moves_in_order() {
        let board = Board::starting_position();
        let moves = legal_moves(&board, Color::White).unwrap();
        let rendered: Vec<String> = moves.iter().map(|mv| mv.to_string()).collect();
        assert_eq!(
            rendered,
            vec![
                "b1-c3", "b1-a3", "g1-h3", "g1-f3", "a2-a3", "a2-a4", "b2-b3", "b2-b4", "c2-c3",
                "c2-c4", "d2-d3", "d2-d4", "e2-e3", "e2-e4", "f2-f3", "f2-f4", "g2-g3", "g2-g4",
                "h2-h3", "h2-h4",
            ]
        );
    }

    #[test]
    fn lone_pawn_on_seventh_promotes_in_order() {
        let mut board = Board::empty();
        board.set_square(7, 8, Square::Occupied(PieceKind::Pawn, Color::White));
        board.set_square(1, 5, Square::Occupied(PieceKind::King, Color::White));
        board.set_square(8, 5, Square::Occupied(PieceKind::King, Color::Black));
        let moves = legal_moves(&board, Color::White).unwrap();
        let rendered: Vec<String> = moves
            .iter()
            .filter(|mv| mv.source_file == 8 && mv.source_rank == 7)
            .map(|mv| mv.to_string())
            .collect();
        assert_eq!(rendered, vec!["h7-h8=R", "h7-h8=B", "h7-h8=N", "h7-h8=Q"]);
    }

    #[test]
    fn every_legal_move_leaves_the_mover_safe() {
        let board = Board::starting_position();
        let mut scratch = board;
        for mv in legal_moves(&board, Color::White).unwrap() {
            let record = scratch.apply(mv);
            assert!(!king_in_check(&scratch, Color::White).unwrap());
            scratch.undo(record);
        }
    }

    #[test]
    fn en_passant_is_offered_after_a_double_push() {
        let mut board = Board::empty();
        board.set_square(1, 5, Square::Occupied(PieceKind::King, Color::White));
        board.set_square(8, 5, Square::Occupied(PieceKind::King, Color::Black));
        board.set_square(5, 4, Square::Occupied(PieceKind::Pawn, Color::White));
        board.set_square(7, 5, Square::Occupied(PieceKind::Pawn, Color::Black));

        let record = board.apply(Move {
            source_rank: 7,
            source_file: 5,
            target_rank: 5,
            target_file: 5,
            promotion: None,
        });
        let _ = record;

        let moves = legal_moves_ignoring_check(&board, Color::White);
        assert!(moves.contains(&Move {
            source_rank: 5,
            source_file: 4,
            target_rank: 6,
            target_file: 5,
            promotion: None,
        }));
    }

    #[test]
    fn en_passant_is_not_offered_without_a_double_push_last_move() {
        let mut board = Board::empty();
        board.set_square(1, 5, Square::Occupied(PieceKind::King, Color::White));
        board.set_square(8, 5, Square::Occupied(PieceKind::King, Color::Black));
        board.set_square(5, 4, Square::Occupied(PieceKind::Pawn, Color::White));
        board.set_square(5, 5, Square::Occupied(PieceKind::Pawn, Color::Black));

        let moves = legal_moves_ignoring_check(&board, Color::White);
        assert!(!moves
            .iter()
            .any(|mv| mv.source_rank == 5 && mv.source_file == 4 && mv.target_file == 5));
    }
}
