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
    defs::{Color, Move},
    error::EngineError,
    movegen::{self, legal_moves_ignoring_check},
};

/// The result of a static evaluation, from White's perspective.
///
/// The mobility term is fractional (0.01 per move of pseudo-legal mobility
/// difference), so `Score` is `f64` rather than an integer. `MATE` is a
/// magnitude clearly outside any reachable material value.
pub type Score = f64;

/// A score magnitude no material imbalance could ever reach.
pub const MATE: Score = 1_000_000.0;

/// Tolerance used when comparing scores that should be considered equal
/// despite floating-point accumulation (e.g. mate-distance comparisons).
const EPSILON: Score = 1e-9;

/// Returns whether `score` is a mate score (for either side).
#[must_use]
pub fn is_mate(score: Score) -> bool {
    score.abs() >= MATE - EPSILON
}

/// The score for delivering mate `height` ply from the search root.
///
/// Shallower mates (small `height`) score closer to [`MATE`] than deeper
/// ones, so a search comparing two mating lines prefers the faster one.
#[must_use]
pub fn mate_in(height: u32) -> Score {
    MATE - f64::from(height)
}

/// The score for being mated `height` ply from the search root.
#[must_use]
pub fn mated_in(height: u32) -> Score {
    -MATE + f64::from(height)
}

/// Computes the static evaluation of `board`, from White's perspective.
///
/// # Errors
///
/// Returns [`EngineError::MissingKing`] if either side has no king on the
/// board — terminal detection depends on [`movegen::king_in_check`].
pub fn evaluate(board: &Board, side_to_move: Color) -> Result<Score, EngineError> {
    let legal = movegen::legal_moves(board, side_to_move)?;

    if legal.is_empty() {
        return Ok(if movegen::king_in_check(board, side_to_move)? {
            match side_to_move {
                Color::White => -MATE,
                Color::Black => MATE,
            }
        } else {
            0.0
        });
    }

    if is_insufficient_material(board) {
        return Ok(0.0);
    }

    let material = material_balance(board);
    let mobility = 0.01
        * f64::from(
            i32::try_from(legal_moves_ignoring_check(board, Color::White).len()).unwrap_or(0)
                - i32::try_from(legal_moves_ignoring_check(board, Color::Black).len()).unwrap_or(0),
        );

    Ok(material + mobility)
}

/// Sums material value over the board, positive for White and negative for
/// Black.
fn material_balance(board: &Board) -> Score {
    let mut total = 0i32;
    for rank in 1_u8..=8 {
        for file in 1_u8..=8 {
            let square = board.get_square_unchecked(rank, file);
            if let (Some(kind), Some(color)) = (square.piece_kind(), square.color()) {
                let value = i32::try_from(kind.material_value()).unwrap_or(0);
                total += match color {
                    Color::White => value,
                    Color::Black => -value,
                };
            }
        }
    }
    f64::from(total)
}

/// Returns whether the board holds no piece with non-zero material value
/// (i.e. only kings remain).
fn is_insufficient_material(board: &Board) -> bool {
    for rank in 1_u8..=8 {
        for file in 1_u8..=8 {
            let square = board.get_square_unchecked(rank, file);
            if let Some(kind) = square.piece_kind() {
                if kind.material_value() > 0 {
                    return false;
                }
            }
        }
    }
    true
}

/// A fast, sort-only ordering key for `mv`: the negated, White-signed
/// material value of whatever currently sits on its target square, so that
/// captures of higher-value pieces sort first regardless of which side is
/// capturing (White sorts this key descending, Black ascending — see
/// [`crate::search`]).
///
/// This is not used to compute or adjust the evaluation itself; it only
/// decides the order [`crate::search`] visits otherwise-equal candidates in.
#[must_use]
pub fn ordering_key(board: &Board, mv: Move) -> Score {
    let target = board.get_square_unchecked(mv.target_rank, mv.target_file);
    let signed_value = match (target.piece_kind(), target.color()) {
        (Some(kind), Some(Color::White)) => f64::from(kind.material_value()),
        (Some(kind), Some(Color::Black)) => -f64::from(kind.material_value()),
        _ => 0.0,
    };
    -signed_value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defs::PieceKind;

    #[test]
    fn starting_position_is_balanced() {
        let board = Board::starting_position();
        let score = evaluate(&board, Color::White).unwrap();
        assert!(score.abs() < EPSILON);
    }

    #[test]
    fn lone_extra_rook_favors_white() {
        let mut board = Board::empty();
        board.set_square(1, 5, king_square(Color::White));
        board.set_square(8, 5, king_square(Color::Black));
        board.set_square(1, 1, crate::defs::Square::Occupied(PieceKind::Rook, Color::White));
        let score = evaluate(&board, Color::White).unwrap();
        assert!(score > 4.0);
    }

    #[test]
    fn two_bare_kings_is_a_draw() {
        let mut board = Board::empty();
        board.set_square(1, 5, king_square(Color::White));
        board.set_square(8, 5, king_square(Color::Black));
        let score = evaluate(&board, Color::White).unwrap();
        assert!(score.abs() < EPSILON);
    }

    fn king_square(color: Color) -> crate::defs::Square {
        crate::defs::Square::Occupied(PieceKind::King, color)
    }

    #[test]
    fn mate_in_and_mated_in_are_symmetric_and_graded_by_height() {
        assert!(is_mate(mate_in(0)));
        assert!(is_mate(mated_in(0)));
        assert!((mate_in(3) + mated_in(3)).abs() < EPSILON);
        assert!(mate_in(1) > mate_in(5));
        assert!(mated_in(1) < mated_in(5));
    }
}
