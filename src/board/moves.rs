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

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::IntoEnumIterator;

use super::castling::{CastleSide, Castling};
use super::material::{Color, Material, Piece, Promotion, PromotionError};
use super::position::{between, Position};
use super::square::{Mask, Square};

use Piece::*;

/// What happened when a move was submitted to a `Position`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveOutcome {
    Illegal,
    Ok,
    Castle(CastleSide),
    EnPassant,
}

impl MoveOutcome {
    #[inline]
    pub fn is_legal(&self) -> bool {
        !matches!(*self, MoveOutcome::Illegal)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
}

impl Move {
    pub fn new(from: Square, to: Square) -> Self {
        Self { from, to }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)
    }
}

// Everything needed to put the board back after a tentative move.
struct Undo {
    from: Square,
    to: Square,
    mover: Material,
    replaced: Option<Material>,
    en_passant_victim: Option<(Square, Material)>,
    en_passant: Option<Square>,
}

impl Position {
    /// Attempts to move `side`'s piece from `from` to `to`.
    ///
    /// The move is played tentatively and taken back if it leaves `side`'s
    /// own king in check, so an `Illegal` outcome always leaves the position
    /// exactly as it was. A legal move updates has-moved flags, the en
    /// passant target and, when castling, the rook.
    ///
    /// Promotion is the caller's business: a pawn reaching the far rank
    /// stays a pawn until `promote` is called.
    pub fn apply_move(&mut self, from: Square, to: Square, side: Color) -> MoveOutcome {
        let Some(mover) = self.contents(from) else {
            return MoveOutcome::Illegal;
        };
        if mover.color() != side || !mover.can_reach(from, to, self) {
            return MoveOutcome::Illegal;
        }
        let en_passant = mover.captures_en_passant(from, to, self);
        if !en_passant && matches!(self.contents(to), Some(m) if m.color() == side) {
            return MoveOutcome::Illegal;
        }

        let undo = self.play_tentatively(mover, from, to, en_passant);
        if self.is_king_in_check(side) {
            self.take_back(undo);
            return MoveOutcome::Illegal;
        }
        self.finalize(mover, from, to, en_passant)
    }

    /// Every square the piece on `from` could legally move to, probed on
    /// throwaway copies of this position.
    pub fn legal_destinations(&self, from: Square) -> Mask {
        let Some(material) = self.contents(from) else {
            return Mask::empty();
        };
        Square::iter()
            .filter(|&to| {
                let mut probe = self.clone();
                probe.apply_move(from, to, material.color()).is_legal()
            })
            .collect()
    }

    /// All legal moves available to `side`.
    pub fn legal_moves(&self, side: Color) -> Vec<Move> {
        self.occupied_by(side)
            .iter()
            .flat_map(|from| {
                self.legal_destinations(from)
                    .iter()
                    .map(move |to| Move::new(from, to))
            })
            .collect()
    }

    /// Replaces the pawn on `square` with a new piece of the same color.
    pub fn promote(&mut self, square: Square, promotion: Promotion) -> Result<()> {
        match self.contents(square) {
            Some(pawn) if pawn.piece() == Pawn => {
                let material = Material::new(pawn.color(), promotion.into());
                // a promoted rook never castles
                let material = match promotion {
                    Promotion::Rook => material.moved(),
                    _ => material,
                };
                self.place(square, material);
                Ok(())
            }
            _ => Err(PromotionError::NotAPawn(square).into()),
        }
    }

    fn play_tentatively(
        &mut self,
        mover: Material,
        from: Square,
        to: Square,
        en_passant: bool,
    ) -> Undo {
        self.remove(from);
        let replaced = self.place(to, mover);
        let en_passant_victim = if en_passant {
            let victim = Square::new(to.file(), from.rank());
            self.remove(victim).map(|pawn| (victim, pawn))
        } else {
            None
        };
        Undo {
            from,
            to,
            mover,
            replaced,
            en_passant_victim,
            en_passant: self.en_passant(),
        }
    }

    fn take_back(&mut self, undo: Undo) {
        self.place(undo.from, undo.mover);
        match undo.replaced {
            Some(material) => {
                self.place(undo.to, material);
            }
            None => {
                self.remove(undo.to);
            }
        }
        if let Some((square, pawn)) = undo.en_passant_victim {
            self.place(square, pawn);
        }
        self.set_en_passant_target(undo.en_passant);
    }

    fn finalize(
        &mut self,
        mover: Material,
        from: Square,
        to: Square,
        en_passant: bool,
    ) -> MoveOutcome {
        self.set_en_passant_target(None);
        match mover.piece() {
            King => {
                self.place(to, mover.moved());
                if let Some(castling) = Castling::recognize(from, to) {
                    if let Some(rook) = self.remove(castling.rook_src()) {
                        self.place(castling.rook_dest(), rook.moved());
                    }
                    return MoveOutcome::Castle(castling.side());
                }
            }
            Rook => {
                self.place(to, mover.moved());
            }
            Pawn => {
                if (to - from).y.abs() == 2 {
                    self.set_en_passant_target(between(from, to).iter().next());
                }
                if en_passant {
                    return MoveOutcome::EnPassant;
                }
            }
            Knight | Bishop | Queen => {}
        }
        MoveOutcome::Ok
    }
}
