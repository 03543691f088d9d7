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

use std::time::Duration;

use crate::{
    board::{Board, UndoRecord},
    defs::{Color, Move},
    error::EngineError,
    movegen,
    search::iterative_deepening::iterative_deepening,
};

/// The driver-facing entry point into this crate.
///
/// A driver holds one `Engine`, alternates sides, and applies the moves it
/// chooses; see the external interfaces this struct realizes.
pub struct Engine {
    /// The current board.
    board: Board,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Creates a new [`Engine`] on the standard starting position.
    #[must_use]
    pub fn new() -> Self {
        Self {
            board: Board::starting_position(),
        }
    }

    /// Returns a reference to the current board.
    #[must_use]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    /// Returns every legal move for `color` on the current board.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::MissingKing`] if `color` has no king on the
    /// board.
    pub fn legal_moves(&self, color: Color) -> Result<Vec<Move>, EngineError> {
        movegen::legal_moves(&self.board, color)
    }

    /// Applies `mv` to the current board.
    ///
    /// This is unchecked, per the core's error handling design: the caller
    /// is responsible for only ever applying moves drawn from
    /// [`Engine::legal_moves`].
    pub fn apply(&mut self, mv: Move) -> UndoRecord {
        self.board.apply(mv)
    }

    /// Reverses the most recent [`Engine::apply`] call.
    pub fn undo(&mut self, record: UndoRecord) {
        self.board.undo(record);
    }

    /// Returns whether `color`'s king is currently attacked.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::MissingKing`] if `color` has no king on the
    /// board.
    pub fn king_in_check(&self, color: Color) -> Result<bool, EngineError> {
        movegen::king_in_check(&self.board, color)
    }

    /// Chooses a move for `color` to play, given `budget` wall-clock time.
    ///
    /// Runs iterative deepening and returns the best move of the last fully
    /// completed iteration. A fresh transposition map is built for every
    /// call; maps are never shared across calls from different root
    /// positions.
    ///
    /// Returns `None` if `color` has no legal move in the current position
    /// (checkmate or stalemate) — classifying which is the caller's
    /// responsibility, via [`Engine::king_in_check`].
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::MissingKing`] if a position reached during
    /// the search is missing a king.
    pub fn choose_move(&mut self, color: Color, budget: Duration) -> Result<Option<Move>, EngineError> {
        let result = iterative_deepening(&mut self.board, color, budget)?;
        Ok(result.best_move)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_engine_starts_at_the_standard_position() {
        let engine = Engine::new();
        assert_eq!(engine.legal_moves(Color::White).unwrap().len(), 20);
    }

    #[test]
    fn apply_then_undo_round_trips_through_the_engine() {
        let mut engine = Engine::new();
        let before = engine.board().canonical_key();
        let mv = engine.legal_moves(Color::White).unwrap()[0];
        let record = engine.apply(mv);
        assert_ne!(engine.board().canonical_key(), before);
        engine.undo(record);
        assert_eq!(engine.board().canonical_key(), before);
    }

    #[test]
    fn choose_move_returns_a_legal_move() {
        let mut engine = Engine::new();
        let chosen = engine
            .choose_move(Color::White, Duration::from_millis(100))
            .unwrap()
            .expect("starting position has legal moves");
        assert!(engine.legal_moves(Color::White).unwrap().contains(&chosen));
    }
}
