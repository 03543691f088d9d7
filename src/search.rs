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
    evaluation::{self, Score},
    movegen,
    transposition_table::{TranspositionEntry, TranspositionTable},
};

/// Runs the iterative-deepening loop on top of [`search`].
pub mod iterative_deepening;

/// The outcome of searching a position to some depth.
///
/// Every stack frame returns a fresh, owned value rather than mutating a
/// shared principal-variation buffer in place as recursion unwinds.
#[derive(Clone, Debug)]
pub struct SearchResult {
    /// The score of the position, from White's perspective.
    pub score: Score,
    /// The best move found at this node, or `None` at a terminal node.
    pub best_move: Option<Move>,
    /// The sequence of moves, starting with `best_move`, the search expects
    /// both sides to play from this position onward.
    pub principal_variation: Vec<Move>,
    /// The number of nodes visited while producing this result.
    pub nodes_visited: u64,
}

/// Searches `board` to `depth` ply, with `color` to move, using
/// alpha-beta pruning within `[alpha, beta]`.
///
/// `height` is the number of plies already played since the search root
/// (0 at the root); it grades mate scores so a faster mate outscores a
/// slower one instead of both collapsing to the same [`evaluation::MATE`]
/// magnitude.
///
/// `table` is written into as the search descends and is consulted for
/// exact cutoffs. `ordering_table`, if given, is a previous iteration's
/// table consulted read-only to improve move ordering; it is never
/// written to.
///
/// # Errors
///
/// Returns [`EngineError::MissingKing`] if a position reached during the
/// search is missing a king.
pub fn search(
    board: &mut Board,
    color: Color,
    depth: u32,
    height: u32,
    mut alpha: Score,
    mut beta: Score,
    table: &mut TranspositionTable,
    ordering_table: Option<&TranspositionTable>,
) -> Result<SearchResult, EngineError> {
    let key = board.canonical_key();
    let legal = movegen::legal_moves(board, color)?;

    if legal.is_empty() {
        let score = if movegen::king_in_check(board, color)? {
            match color {
                Color::White => evaluation::mated_in(height),
                Color::Black => evaluation::mate_in(height),
            }
        } else {
            0.0
        };
        return Ok(SearchResult {
            score,
            best_move: None,
            principal_variation: Vec::new(),
            nodes_visited: 1,
        });
    }

    if depth == 0 {
        return Ok(SearchResult {
            score: evaluation::evaluate(board, color)?,
            best_move: None,
            principal_variation: Vec::new(),
            nodes_visited: 1,
        });
    }

    let mut moves = legal;
    if depth > 1 {
        order_moves(board, color, ordering_table, &mut moves);
    }

    let mut nodes = 1_u64;
    let mut best_score = match color {
        Color::White => -evaluation::MATE,
        Color::Black => evaluation::MATE,
    };
    let mut best_move = None;
    let mut best_continuation: Vec<Move> = Vec::new();
    let mut cut = false;

    for mv in moves {
        let record = board.apply(mv);
        let child_key = board.canonical_key();

        let child = if let Some(entry) = table.get(&child_key, depth - 1) {
            SearchResult {
                score: entry.score,
                best_move: None,
                principal_variation: entry.principal_variation.clone(),
                nodes_visited: 0,
            }
        } else {
            search(
                board,
                color.opposite(),
                depth - 1,
                height + 1,
                alpha,
                beta,
                table,
                ordering_table,
            )?
        };
        board.undo(record);
        nodes += child.nodes_visited;

        let better = match (best_move, color) {
            (None, _) => true,
            (Some(_), Color::White) => child.score > best_score,
            (Some(_), Color::Black) => {
                child.score < best_score
                    || (scores_equal(child.score, best_score)
                        && child.principal_variation.len() > best_continuation.len())
            }
        };

        if better {
            best_score = child.score;
            best_move = Some(mv);
            best_continuation = child.principal_variation;
        }

        match color {
            Color::White => alpha = alpha.max(best_score),
            Color::Black => beta = beta.min(best_score),
        }

        if alpha >= beta {
            best_continuation.clear();
            cut = true;
            break;
        }
    }

    let mut principal_variation = Vec::with_capacity(best_continuation.len() + 1);
    if let Some(mv) = best_move {
        principal_variation.push(mv);
    }
    principal_variation.extend(best_continuation);

    if !cut {
        table.insert(
            key,
            TranspositionEntry {
                score: best_score,
                principal_variation: principal_variation.clone(),
                depth_searched: depth,
            },
        );
    }

    Ok(SearchResult {
        score: best_score,
        best_move,
        principal_variation,
        nodes_visited: nodes,
    })
}

/// Sorts `moves` by the fast ordering key: descending for White, ascending
/// for Black. A previous iteration's transposition score for the resulting
/// position, if present in `ordering_table`, overrides the cheap
/// target-square key.
fn order_moves(
    board: &mut Board,
    color: Color,
    ordering_table: Option<&TranspositionTable>,
    moves: &mut [Move],
) {
    let keyed: Vec<(Move, Score)> = moves
        .iter()
        .map(|&mv| {
            let key = ordering_table.and_then(|table| {
                let record = board.apply(mv);
                let resulting_key = board.canonical_key();
                board.undo(record);
                table.peek(&resulting_key).map(|entry| entry.score)
            });
            (mv, key.unwrap_or_else(|| evaluation::ordering_key(board, mv)))
        })
        .collect();

    let mut indices: Vec<usize> = (0..moves.len()).collect();
    match color {
        Color::White => {
            indices.sort_by(|&a, &b| keyed[b].1.total_cmp(&keyed[a].1));
        }
        Color::Black => {
            indices.sort_by(|&a, &b| keyed[a].1.total_cmp(&keyed[b].1));
        }
    }

    let sorted: Vec<Move> = indices.into_iter().map(|i| keyed[i].0).collect();
    moves.copy_from_slice(&sorted);
}

/// Whether two scores are close enough to be treated as a tie.
fn scores_equal(a: Score, b: Score) -> bool {
    (a - b).abs() < 1e-9
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defs::PieceKind;

    #[test]
    fn depth_zero_returns_static_evaluation() {
        let mut board = Board::starting_position();
        let mut table = TranspositionTable::new();
        let result = search(&mut board, Color::White, 0, 0, -evaluation::MATE, evaluation::MATE, &mut table, None).unwrap();
        assert_eq!(result.best_move, None);
        assert!(result.principal_variation.is_empty());
    }

    #[test]
    fn fools_mate_is_found_at_depth_one() {
        let mut board = Board::starting_position();
        let mut table = TranspositionTable::new();
        for played in [mv(2, 6, 3, 6), mv(7, 5, 5, 5), mv(2, 7, 4, 7)] {
            board.apply(played);
        }
        let result = search(
            &mut board,
            Color::Black,
            1,
            0,
            -evaluation::MATE,
            evaluation::MATE,
            &mut table,
            None,
        )
        .unwrap();
        assert_eq!(result.best_move, Some(mv(8, 4, 4, 8)));
        assert!((result.score - evaluation::mated_in(1)).abs() < 1e-9);
    }

    #[test]
    fn search_prefers_a_free_rook_over_doing_nothing() {
        let mut board = Board::empty();
        board.set_square(1, 5, crate::defs::Square::Occupied(PieceKind::King, Color::White));
        board.set_square(8, 5, crate::defs::Square::Occupied(PieceKind::King, Color::Black));
        board.set_square(4, 4, crate::defs::Square::Occupied(PieceKind::Rook, Color::White));
        board.set_square(5, 4, crate::defs::Square::Occupied(PieceKind::Rook, Color::Black));
        let mut table = TranspositionTable::new();
        let result = search(&mut board, Color::White, 2, 0, -evaluation::MATE, evaluation::MATE, &mut table, None).unwrap();
        assert_eq!(result.best_move, Some(mv(4, 4, 5, 4)));
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
}
