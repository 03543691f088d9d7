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

use std::fmt::{self, Display, Formatter};

use crate::defs::Color;

/// An error produced by the engine's internal consistency checks.
///
/// These are not user-facing parse errors: they indicate either a
/// driver-supplied coordinate outside the board or a board that has been
/// corrupted (e.g. missing a king) before a query that requires one.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EngineError {
    /// A coordinate outside the `1..=8` range was used to address a square.
    InvalidCoordinate {
        /// The offending rank.
        rank: u8,
        /// The offending file.
        file: u8,
    },
    /// [`king_in_check`](crate::movegen::king_in_check) was asked about a
    /// color with no king on the board.
    MissingKing {
        /// The color whose king could not be found.
        color: Color,
    },
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            Self::InvalidCoordinate { rank, file } => {
                write!(f, "coordinate ({rank}, {file}) is outside the board")
            }
            Self::MissingKing { color } => {
                write!(f, "no {color} king present on the board")
            }
        }
    }
}

impl std::error::Error for EngineError {}
