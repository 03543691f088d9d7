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

use std::time::{Duration, Instant};

use super::{search, SearchResult};
use crate::{board::Board, defs::Color, error::EngineError, evaluation::MATE, transposition_table::TranspositionTable};

/// Runs [`search`] at depth 2, 3, 4, … against a wall-clock budget `T`,
/// halting before starting a depth whose completion would risk exceeding
/// `T / 2` from the start.
///
/// Each completed iteration's table is retained and handed to the next
/// iteration purely as a read-only move-ordering oracle; the next
/// iteration always writes its own results into a fresh table.
///
/// # Errors
///
/// Returns [`EngineError::MissingKing`] if a position reached during the
/// search is missing a king.
pub fn iterative_deepening(
    board: &mut Board,
    color: Color,
    budget: Duration,
) -> Result<SearchResult, EngineError> {
    let start = Instant::now();
    let half_budget = budget / 2;

    let mut previous_table = TranspositionTable::new();
    let mut best = search(board, color, 2, 0, -MATE, MATE, &mut previous_table, None)?;

    for depth in 3_u32.. {
        if best.best_move.is_none() || start.elapsed() >= half_budget {
            break;
        }

        let mut table = TranspositionTable::new();
        let result = search(
            board,
            color,
            depth,
            0,
            -MATE,
            MATE,
            &mut table,
            Some(&previous_table),
        )?;
        best = result;
        previous_table = table;
    }

    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_a_move_within_budget() {
        let mut board = Board::starting_position();
        let result =
            iterative_deepening(&mut board, Color::White, Duration::from_millis(200)).unwrap();
        assert!(result.best_move.is_some());
    }

    #[test]
    fn depth_two_runs_even_with_no_time_left_over() {
        let mut board = Board::starting_position();
        let result = iterative_deepening(&mut board, Color::White, Duration::ZERO).unwrap();
        assert!(result.best_move.is_some());
    }
}
