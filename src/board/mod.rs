// Copyright 2023 Tobin Edwards
//
//    Licensed under the Apache License, Version 2.0 (the "License");
//    you may not use this file except in compliance with the License.
//    You may obtain a copy of the License at
//
//        http://www.apache.org/licenses/LICENSE-2.0
//
//    Unless required by applicable law or agreed to in writing, software
//    distributed under the License is distributed on an "AS IS" BASIS,
//    WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//    See the License for the specific language governing permissions and
//    limitations under the License.

//! Rules engine for standard two-player chess
//!
//! A _board_ answers every rules question about a single position:
//! which moves are legal, whether a king is in check and whether the
//! game has ended. It knows nothing about whose turn it is; the caller
//! says which side is moving. The following features are supported:
//!
//! [x] Movement rules for all six pieces, including blocking
//! [x] Castling on either side, with the full set of preconditions
//! [x] En passant, available for exactly one move
//! [x] Pawn promotion (chosen by the caller after the move)
//! [x] Rejecting any move that leaves the mover's king in check
//! [x] Checkmate and stalemate detection
//! [ ] Three-fold repetition and the fifty-move rule
//! [ ] Insufficient mating material
//! [ ] Chess960 starting positions
//!
//! Some of the key abstractions include:
//!
//! * A `Square` represents the coordinates for a single square
//!   on an 8-by-8 board. The 8 rows and 8 columns on a board
//!   are represented by `Rank` (`Rank1` .. `Rank8`) and `File`
//!   ('FileA' .. 'FileH') respectively. Squares are named using the
//!   letter of the file followed by the number of the rank (`A1` ..
//!   `H8`). Row 0 is the eighth rank, so `(6, 4)` is `E2`.
//!
//! * A `Mask` is a 64-bit (u64) value in which each bit maps to a
//!   square on the board. Masks hold sets of squares such as the legal
//!   destinations for a piece and combine with `|`, `&` and `!`.
//!
//! * `Material` represents a piece of a specific color and whether it
//!   has moved. `Promotion` is the subset of `Piece` a pawn can become.
//!
//! * A `Position` holds the contents of each square and the current en
//!   passant target. `apply_move` is the only way a move changes it: the
//!   move is played tentatively and taken back if it exposes the mover's
//!   king, so an illegal attempt never leaves a trace.
//!
//! * `Castling` describes the squares involved in castling toward one
//!   rook: the lane that must be empty and the lane that must be safe.
//!

mod castling;
mod material;
mod moves;
mod play;
mod position;
mod rules;
mod square;

pub use castling::*;
pub use material::*;
pub use moves::*;
pub use play::*;
pub use position::*;
pub use square::*;
