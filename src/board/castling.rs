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

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

use super::position::between;
use super::square::{Direction, File, Mask, Square};

use File::*;

/// Which rook the king castles toward. `KingSide` is O-O (toward the
/// h-file), `QueenSide` is O-O-O (toward the a-file).
#[derive(Debug, Serialize, Deserialize, Display, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum CastleSide {
    KingSide,
    QueenSide,
}

impl CastleSide {
    #[inline]
    pub fn rook_file(&self) -> File {
        match self {
            CastleSide::KingSide => FileH,
            CastleSide::QueenSide => FileA,
        }
    }
    #[inline]
    pub fn direction(&self) -> Direction {
        match self {
            CastleSide::KingSide => Direction::Right,
            CastleSide::QueenSide => Direction::Left,
        }
    }
}

/// The squares involved in one castling move, anchored on wherever the
/// king stands. The rook always comes from the corner of the king's rank
/// and lands on the square the king passes over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Castling {
    side: CastleSide,
    king_src: Square,
    transit: Square,
    king_dest: Square,
    rook_src: Square,
}

impl Castling {
    /// Recognizes the castling displacement: the king moves exactly two
    /// files along its own rank.
    pub fn recognize(from: Square, to: Square) -> Option<Self> {
        let offset = to - from;
        let side = match (offset.x, offset.y) {
            (2, 0) => CastleSide::KingSide,
            (-2, 0) => CastleSide::QueenSide,
            _ => return None,
        };
        let transit = (from + side.direction())?;
        Some(Self {
            side,
            king_src: from,
            transit,
            king_dest: to,
            rook_src: Square::new(side.rook_file(), from.rank()),
        })
    }

    #[inline]
    pub fn side(&self) -> CastleSide {
        self.side
    }
    #[inline]
    pub fn king_dest(&self) -> Square {
        self.king_dest
    }
    #[inline]
    pub fn rook_src(&self) -> Square {
        self.rook_src
    }
    #[inline]
    pub fn rook_dest(&self) -> Square {
        self.transit
    }

    /// Squares that must be empty: everything strictly between king and rook.
    pub fn blocking_lane(&self) -> Mask {
        between(self.king_src, self.rook_src)
    }

    /// Squares that must not be attacked: the king's start, the square it
    /// passes over, and where it lands.
    pub fn attacking_lane(&self) -> Mask {
        self.king_src.to_mask() | self.transit | self.king_dest
    }
}
