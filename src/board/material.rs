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
use std::fmt;
use std::ops::{Index, IndexMut, Not};
use strum_macros::Display;
use strum_macros::EnumIter;
use thiserror::Error;

use super::square::Square;

/// A piece of a specific color. Kings and rooks also remember whether they
/// have ever moved, which is all castling eligibility depends on. The flag
/// is carried but ignored for the other pieces.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Material {
    color: Color,
    piece: Piece,
    moved: bool,
}

impl Material {
    pub const WK: Self = Self::new(White, King);
    pub const WQ: Self = Self::new(White, Queen);
    pub const WR: Self = Self::new(White, Rook);
    pub const WB: Self = Self::new(White, Bishop);
    pub const WN: Self = Self::new(White, Knight);
    pub const WP: Self = Self::new(White, Pawn);

    pub const BK: Self = Self::new(Black, King);
    pub const BQ: Self = Self::new(Black, Queen);
    pub const BR: Self = Self::new(Black, Rook);
    pub const BB: Self = Self::new(Black, Bishop);
    pub const BN: Self = Self::new(Black, Knight);
    pub const BP: Self = Self::new(Black, Pawn);

    #[inline]
    pub const fn new(color: Color, piece: Piece) -> Self {
        Self {
            color,
            piece,
            moved: false,
        }
    }

    /// Same piece, flagged as having moved.
    #[inline]
    pub const fn moved(self) -> Self {
        Self {
            moved: true,
            ..self
        }
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }

    #[inline]
    pub fn piece(&self) -> Piece {
        self.piece
    }

    #[inline]
    pub fn has_moved(&self) -> bool {
        self.moved
    }

    #[inline]
    pub fn is_friend_of(&self, other: &Material) -> bool {
        self.color == other.color
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let color = match self.color {
            White => 'w',
            Black => 'b',
        };
        write!(f, "{}{}", color, self.piece.initial())
    }
}

use Color::{Black, White};

#[derive(Debug, Serialize, Deserialize, Display, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Color {
    White,
    Black,
}

impl Not for Color {
    type Output = Self;

    #[inline]
    fn not(self) -> Self {
        match self {
            White => Black,
            Black => White,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Pair<T>((T, T));

impl<T> Pair<T> {
    pub const fn new(white: T, black: T) -> Self {
        Self((white, black))
    }
    pub fn white(&self) -> &T {
        &self.0 .0
    }
    pub fn white_mut(&mut self) -> &mut T {
        &mut self.0 .0
    }
    pub fn black(&self) -> &T {
        &self.0 .1
    }
    pub fn black_mut(&mut self) -> &mut T {
        &mut self.0 .1
    }
}

impl<T> Index<Color> for Pair<T> {
    type Output = T;

    #[inline(always)]
    fn index(&self, index: Color) -> &Self::Output {
        match index {
            White => self.white(),
            Black => self.black(),
        }
    }
}

impl<T> IndexMut<Color> for Pair<T> {
    #[inline(always)]
    fn index_mut(&mut self, index: Color) -> &mut Self::Output {
        match index {
            White => self.white_mut(),
            Black => self.black_mut(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Display, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Piece {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}
use Piece::{Bishop, King, Knight, Pawn, Queen, Rook};

impl Piece {
    pub fn initial(&self) -> char {
        match *self {
            Pawn => 'P',
            Knight => 'N',
            Bishop => 'B',
            Rook => 'R',
            Queen => 'Q',
            King => 'K',
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PromotionError {
    #[error("No pawn to promote on {0}")]
    NotAPawn(Square),
    #[error("{0} is not a promotion piece")]
    InvalidPiece(Piece),
}

/// The pieces a pawn may turn into on the far rank.
#[derive(Debug, Serialize, Deserialize, Display, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Promotion {
    Queen,
    Rook,
    Bishop,
    Knight,
}

impl From<Promotion> for Piece {
    fn from(value: Promotion) -> Self {
        match value {
            Promotion::Queen => Queen,
            Promotion::Rook => Rook,
            Promotion::Bishop => Bishop,
            Promotion::Knight => Knight,
        }
    }
}

impl TryFrom<Piece> for Promotion {
    type Error = PromotionError;

    fn try_from(value: Piece) -> Result<Self, Self::Error> {
        match value {
            Queen => Ok(Promotion::Queen),
            Rook => Ok(Promotion::Rook),
            Bishop => Ok(Promotion::Bishop),
            Knight => Ok(Promotion::Knight),
            piece => Err(PromotionError::InvalidPiece(piece)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moved_flag_is_value_state() {
        let rook = Material::WR;
        let moved = rook.moved();
        assert!(!rook.has_moved());
        assert!(moved.has_moved());
        assert_ne!(rook, moved);
        assert_eq!(moved.piece(), Rook);
        assert_eq!(moved.color(), White);
    }
    #[test]
    fn test_display_uses_side_and_initial() {
        assert_eq!(Material::WK.to_string(), "wK");
        assert_eq!(Material::BN.to_string(), "bN");
    }
    #[test]
    fn test_promotion_conversions() {
        assert_eq!(Piece::from(Promotion::Knight), Knight);
        assert_eq!(Promotion::try_from(Rook), Ok(Promotion::Rook));
        assert_eq!(
            Promotion::try_from(King),
            Err(PromotionError::InvalidPiece(King))
        );
        assert!(Promotion::try_from(Pawn).is_err());
    }
    #[test]
    fn test_pair_indexes_by_color() {
        let mut pair = Pair::new(1, 2);
        assert_eq!(pair[White], 1);
        pair[Black] += 5;
        assert_eq!(*pair.black(), 7);
        assert_eq!(!White, Black);
    }
}
