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

//! Movement rules for the six pieces.
//!
//! Every rule here is a read-only question about a `Position`: whose turn
//! it is and whether the mover's own king ends up in check are both left
//! to the move applier.

use super::castling::Castling;
use super::material::{Material, Piece};
use super::position::Position;
use super::square::{Offset, Rank, Square};

use Piece::*;

impl Material {
    /// Can this piece, standing on `from`, move to `to` given the pieces
    /// currently on the board? Covers captures, pawn pushes, en passant
    /// and castling; does not consider turn order or self-check.
    pub fn can_reach(&self, from: Square, to: Square, pos: &Position) -> bool {
        self.reaches_without_castling(from, to, pos)
            || (self.piece() == King && self.castles(from, to, pos))
    }

    /// Same as `can_reach` minus castling. This is what decides whether a
    /// square is attacked, so a castling king never asks about itself.
    pub(super) fn reaches_without_castling(
        &self,
        from: Square,
        to: Square,
        pos: &Position,
    ) -> bool {
        if from == to || self.is_blocked_by_friend(to, pos) {
            return false;
        }
        let offset = to - from;
        let (dx, dy) = (offset.x.abs(), offset.y.abs());
        match self.piece() {
            Pawn => {
                self.pawn_advances(from, to, pos)
                    || (self.is_pawn_diagonal(offset) && pos.is_occupied(to))
                    || self.captures_en_passant(from, to, pos)
            }
            Knight => matches!((dx, dy), (1, 2) | (2, 1)),
            Bishop => offset.is_diagonal() && pos.is_lane_clear(from, to),
            Rook => offset.is_orthogonal() && pos.is_lane_clear(from, to),
            Queen => {
                (offset.is_diagonal() || offset.is_orthogonal()) && pos.is_lane_clear(from, to)
            }
            King => dx <= 1 && dy <= 1,
        }
    }

    // The stored target is the only record of a double advance, so no
    // per-side rank constant is needed: the captor must simply stand one
    // pawn step behind the target with an enemy pawn beside it.
    pub(super) fn captures_en_passant(&self, from: Square, to: Square, pos: &Position) -> bool {
        if self.piece() != Pawn || pos.en_passant() != Some(to) {
            return false;
        }
        if !self.is_pawn_diagonal(to - from) {
            return false;
        }
        let victim = Square::new(to.file(), from.rank());
        matches!(pos[victim], Some(pawn) if pawn.piece() == Pawn && !self.is_friend_of(&pawn))
    }

    fn is_blocked_by_friend(&self, to: Square, pos: &Position) -> bool {
        matches!(pos[to], Some(other) if self.is_friend_of(&other))
    }

    fn is_pawn_diagonal(&self, offset: Offset) -> bool {
        offset.x.abs() == 1 && offset.y == Rank::forward(self.color())
    }

    fn pawn_advances(&self, from: Square, to: Square, pos: &Position) -> bool {
        let forward = Rank::forward(self.color());
        let single = from + Offset::new(0, forward);
        if single == Some(to) {
            return pos.is_vacant(to);
        }
        let double = from + Offset::new(0, 2 * forward);
        double == Some(to)
            && from.rank() == Rank::pawn_rank(self.color())
            && pos.is_vacant(to)
            && pos.is_lane_clear(from, to)
    }

    fn castles(&self, from: Square, to: Square, pos: &Position) -> bool {
        if self.has_moved() {
            return false;
        }
        let Some(castling) = Castling::recognize(from, to) else {
            return false;
        };
        let rook_ready = matches!(
            pos[castling.rook_src()],
            Some(rook) if rook.piece() == Rook && self.is_friend_of(&rook) && !rook.has_moved()
        );
        rook_ready
            && pos.is_vacant(castling.king_dest())
            && pos.is_lane_vacant(castling.blocking_lane())
            && !castling
                .attacking_lane()
                .iter()
                .any(|square| pos.is_square_attacked(square, !self.color()))
    }
}
