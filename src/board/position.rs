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
use once_cell::sync::Lazy;
use serde::ser::SerializeTuple;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};
use strum::IntoEnumIterator;

use super::material::{Color, Material, Piece};
use super::square::{File, Mask, Rank, Square};

use Piece::*;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Squares([Option<Material>; 64]);

impl Squares {
    fn empty() -> Self {
        Self([None; 64])
    }
}

impl Index<Square> for Squares {
    type Output = Option<Material>;
    fn index(&self, index: Square) -> &Self::Output {
        &self.0[index.to_index()]
    }
}

impl IndexMut<Square> for Squares {
    fn index_mut(&mut self, index: Square) -> &mut Self::Output {
        &mut self.0[index.to_index()]
    }
}

impl Serialize for Squares {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut tuple = serializer.serialize_tuple(64)?;
        for contents in self.0.iter() {
            tuple.serialize_element(contents)?;
        }
        tuple.end()
    }
}

impl<'de> Deserialize<'de> for Squares {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct SquaresVisitor;
        impl<'de> serde::de::Visitor<'de> for SquaresVisitor {
            type Value = Squares;
            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("the contents of 64 squares, a8 through h1")
            }
            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: serde::de::SeqAccess<'de>,
            {
                let mut squares = Squares::empty();
                for (index, contents) in squares.0.iter_mut().enumerate() {
                    *contents = seq
                        .next_element()?
                        .ok_or_else(|| serde::de::Error::invalid_length(index, &self))?;
                }
                Ok(squares)
            }
        }
        deserializer.deserialize_tuple(64, SquaresVisitor)
    }
}

/// The contents of the 64 squares plus the one-shot en passant target.
///
/// A `Position` is plain data: cloning it yields a fully independent board,
/// has-moved flags and en passant target included.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    squares: Squares,
    en_passant: Option<Square>,
}

impl Default for Position {
    fn default() -> Self {
        Self::standard()
    }
}

impl Position {
    /// A board with nothing on it.
    pub fn empty() -> Self {
        Self {
            squares: Squares::empty(),
            en_passant: None,
        }
    }

    /// The standard starting position.
    pub fn standard() -> Self {
        const BACK_RANK: [Piece; 8] = [Rook, Knight, Bishop, Queen, King, Bishop, Knight, Rook];
        let mut position = Self::empty();
        for (file, piece) in File::iter().zip(BACK_RANK) {
            position.init_file(file, piece);
        }
        position
    }

    fn init_file(&mut self, file: File, piece: Piece) {
        for color in Color::iter() {
            let square = Square::new(file, Rank::pawn_rank(color));
            self.place(square, Material::new(color, Pawn));
            let square = Square::new(file, Rank::back_rank(color));
            self.place(square, Material::new(color, piece));
        }
    }

    #[inline]
    pub fn contents(&self, square: Square) -> Option<Material> {
        self.squares[square]
    }

    /// Looks up a square by raw (rank, file) coordinates, rejecting
    /// anything off the board.
    pub fn piece_at(&self, rank: usize, file: usize) -> Result<Option<Material>> {
        let square = Square::try_from_coords(rank, file)?;
        Ok(self.contents(square))
    }

    /// Puts `material` on `square`, returning whatever was there.
    pub fn place(&mut self, square: Square, material: Material) -> Option<Material> {
        self.squares[square].replace(material)
    }

    pub fn remove(&mut self, square: Square) -> Option<Material> {
        self.squares[square].take()
    }

    pub fn clear(&mut self) {
        *self = Self::empty();
    }

    #[inline]
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    #[inline]
    pub(super) fn set_en_passant_target(&mut self, target: Option<Square>) {
        self.en_passant = target;
    }

    #[inline]
    pub fn is_vacant(&self, square: Square) -> bool {
        self.squares[square].is_none()
    }

    #[inline]
    pub fn is_occupied(&self, square: Square) -> bool {
        self.squares[square].is_some()
    }

    pub fn is_lane_vacant(&self, lane: Mask) -> bool {
        lane.iter().all(|square| self.is_vacant(square))
    }

    /// True if every square strictly between `from` and `to` is empty.
    /// Squares that do not share a line have nothing between them.
    #[inline]
    pub fn is_lane_clear(&self, from: Square, to: Square) -> bool {
        self.is_lane_vacant(between(from, to))
    }

    pub fn occupied_by(&self, color: Color) -> Mask {
        Square::iter()
            .filter(|&square| matches!(self.squares[square], Some(m) if m.color() == color))
            .collect()
    }

    pub fn king(&self, color: Color) -> Option<Square> {
        Square::iter().find(|&square| {
            matches!(self.squares[square], Some(m) if m.color() == color && m.piece() == King)
        })
    }

    /// Could any piece of `by` move to `square` right now? Castling is
    /// left out, and a pawn only covers a diagonal square holding an enemy.
    pub fn is_square_attacked(&self, square: Square, by: Color) -> bool {
        Square::iter().any(|from| match self.squares[from] {
            Some(m) if m.color() == by => m.reaches_without_castling(from, square, self),
            _ => false,
        })
    }

    /// Is `side`'s king attacked? A side without a king is never in check.
    pub fn is_king_in_check(&self, side: Color) -> bool {
        match self.king(side) {
            Some(king) => self.is_square_attacked(king, !side),
            None => false,
        }
    }
}

impl Index<Square> for Position {
    type Output = Option<Material>;
    #[inline]
    fn index(&self, index: Square) -> &Self::Output {
        &self.squares[index]
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let line = "-".repeat(41);
        writeln!(f, "  {}", line)?;
        for rank in Rank::iter() {
            write!(f, "{} |", rank)?;
            for file in File::iter() {
                match self.squares[Square::new(file, rank)] {
                    Some(material) => write!(f, " {} |", material)?,
                    None => write!(f, "    |")?,
                }
            }
            writeln!(f)?;
            writeln!(f, "  {}", line)?;
        }
        write!(f, "  ")?;
        for file in File::iter() {
            write!(f, "  {}  ", file)?;
        }
        writeln!(f)
    }
}

#[inline]
pub(super) fn between(from: Square, to: Square) -> Mask {
    let index = from.to_index() * 64 + to.to_index();
    SQUARES_BETWEEN[index]
}

pub(super) static SQUARES_BETWEEN: Lazy<Vec<Mask>> = Lazy::new(|| {
    // Returns a mask of squares between `start` and `end` (exclusive of both)
    // if they are not equal and in a line. Otherwise returns an empty mask.
    fn squares_between(start: Square, end: Square) -> Mask {
        let mut mask = Mask::empty();
        if let Some(step) = (end - start).to_unit() {
            let mut next = start + step;
            while let Some(square) = next {
                if square == end {
                    break;
                }
                mask |= square;
                next = square + step;
            }
        }
        mask
    }

    let mut array = vec![Mask::empty(); 64 * 64];
    for start in Square::iter() {
        for end in Square::iter() {
            array[start.to_index() * 64 + end.to_index()] = squares_between(start, end);
        }
    }
    array
});

#[cfg(test)]
impl Position {
    pub fn set_contents(mut self, square: Square, value: Option<Material>) -> Self {
        self.squares[square] = value;
        self
    }
    pub fn set_en_passant(mut self, value: Option<Square>) -> Self {
        self.en_passant = value;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Square::*;

    #[test]
    fn test_standard_position() {
        let pos = Position::standard();
        assert_eq!(pos[E1], Some(Material::WK));
        assert_eq!(pos[D8], Some(Material::BQ));
        assert_eq!(pos[A1], Some(Material::WR));
        assert_eq!(pos[G8], Some(Material::BN));
        assert_eq!(pos[C2], Some(Material::WP));
        assert_eq!(pos[F7], Some(Material::BP));
        assert!(pos.is_vacant(E4));
        assert_eq!(pos.occupied_by(Color::White).len(), 16);
        assert_eq!(pos.occupied_by(Color::Black).len(), 16);
        assert_eq!(pos.en_passant(), None);
    }
    #[test]
    fn test_piece_at_uses_row_and_column() {
        let pos = Position::standard();
        assert_eq!(pos.piece_at(7, 4).unwrap(), Some(Material::WK));
        assert_eq!(pos.piece_at(0, 3).unwrap(), Some(Material::BQ));
        assert_eq!(pos.piece_at(4, 4).unwrap(), None);
        assert!(pos.piece_at(8, 4).is_err());
        assert!(pos.piece_at(0, 8).is_err());
    }
    #[test]
    fn test_place_and_remove() {
        let mut pos = Position::empty();
        assert_eq!(pos.place(D4, Material::WQ), None);
        assert_eq!(pos.place(D4, Material::BN), Some(Material::WQ));
        assert_eq!(pos.remove(D4), Some(Material::BN));
        assert_eq!(pos.remove(D4), None);
        let mut pos = Position::standard();
        pos.clear();
        assert_eq!(pos, Position::empty());
    }
    #[test]
    fn test_copies_are_independent() {
        let original = Position::standard().set_en_passant(Some(E3));
        let mut copy = original.clone();
        copy.remove(E1);
        copy.set_en_passant_target(None);
        assert_eq!(original[E1], Some(Material::WK));
        assert_eq!(original.en_passant(), Some(E3));
    }
    #[test]
    fn test_square_attacked_by_each_piece() {
        let pos = Position::empty()
            .set_contents(A1, Some(Material::BR))
            .set_contents(H8, Some(Material::BB))
            .set_contents(E5, Some(Material::BN))
            .set_contents(C5, Some(Material::BP));
        assert!(pos.is_square_attacked(A7, Color::Black));
        assert!(pos.is_square_attacked(G7, Color::Black));
        assert!(pos.is_square_attacked(F3, Color::Black));
        // the knight on e5 shields d4 from the bishop and the pawn cannot
        // move onto an empty diagonal
        assert!(!pos.is_square_attacked(D4, Color::Black));
        assert!(!pos.is_square_attacked(B4, Color::Black));
        assert!(!pos.is_square_attacked(B5, Color::Black));
        assert!(!pos.is_square_attacked(C5, Color::Black));
        assert!(!pos.is_square_attacked(D4, Color::White));
        let pos = pos.set_contents(D4, Some(Material::WN));
        assert!(pos.is_square_attacked(D4, Color::Black));
    }
    #[test]
    fn test_attack_blocked_by_piece() {
        let pos = Position::empty()
            .set_contents(A1, Some(Material::BR))
            .set_contents(A4, Some(Material::WP));
        assert!(pos.is_square_attacked(A3, Color::Black));
        assert!(!pos.is_square_attacked(A5, Color::Black));
    }
    #[test]
    fn test_king_in_check() {
        let pos = Position::empty()
            .set_contents(E1, Some(Material::WK))
            .set_contents(E8, Some(Material::BR));
        assert!(pos.is_king_in_check(Color::White));
        assert!(!pos.is_king_in_check(Color::Black));
        let pos = pos.set_contents(E4, Some(Material::WN));
        assert!(!pos.is_king_in_check(Color::White));
    }
    #[test]
    fn test_missing_king_is_never_in_check() {
        let pos = Position::empty().set_contents(E8, Some(Material::BQ));
        assert_eq!(pos.king(Color::White), None);
        assert!(!pos.is_king_in_check(Color::White));
    }
    #[test]
    fn test_kings_two_files_apart_do_not_castle_into_each_other() {
        let pos = Position::empty()
            .set_contents(E1, Some(Material::WK))
            .set_contents(G1, Some(Material::BK))
            .set_contents(H1, Some(Material::BR));
        assert!(!pos.is_king_in_check(Color::White));
        assert!(!pos.is_king_in_check(Color::Black));
    }
    #[test]
    fn test_display_draws_grid() {
        let text = Position::standard().to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 18);
        assert!(lines[1].starts_with("8 | bR | bN | bB | bQ | bK |"));
        assert!(lines[13].starts_with("2 | wP |"));
        assert!(lines[7].starts_with("5 |    |"));
        assert!(lines[17].contains('a') && lines[17].contains('h'));
    }
    #[test]
    fn test_serde_keeps_flags_and_target() {
        let pos = Position::standard()
            .set_contents(E1, Some(Material::WK.moved()))
            .set_en_passant(Some(D6));
        let json = serde_json::to_string(&pos).unwrap();
        let back: Position = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pos);
    }
    #[test]
    fn test_between_a3_and_e3() {
        let mask = between(A3, E3);
        assert_eq!(mask.len(), 3);
        assert!(!mask.contains(A3));
        assert!(mask.contains(B3));
        assert!(mask.contains(C3));
        assert!(mask.contains(D3));
        assert!(!mask.contains(E3));
    }
    #[test]
    fn test_between_c8_and_c2() {
        let mask = between(C8, C2);
        assert_eq!(mask.len(), 5);
        assert!(!mask.contains(C2));
        assert!(mask.contains(C3));
        assert!(mask.contains(C7));
        assert!(!mask.contains(C8));
    }
    #[test]
    fn test_between_a1_and_d4() {
        let mask = between(A1, D4);
        assert_eq!(mask.len(), 2);
        assert!(mask.contains(B2));
        assert!(mask.contains(C3));
    }
    #[test]
    fn test_between_adjacent_and_unaligned() {
        assert!(between(G4, F5).is_empty());
        assert!(between(A1, H5).is_empty());
        assert!(between(B1, C3).is_empty());
        assert!(between(E4, E4).is_empty());
    }
}
