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

use super::material::Color;
use super::position::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameEnd {
    Continues,
    /// The winner, i.e. the side that delivered mate.
    CheckMate(Color),
    StaleMate,
}

impl GameEnd {
    #[inline]
    pub fn is_over(&self) -> bool {
        !matches!(*self, GameEnd::Continues)
    }
}

impl Position {
    #[inline]
    pub fn is_in_check(&self, side: Color) -> bool {
        self.is_king_in_check(side)
    }

    /// Decides whether `side`, about to move, is mated, stalemated or
    /// free to play on.
    pub fn evaluate_game_end(&self, side: Color) -> GameEnd {
        if self.can_move(side) {
            GameEnd::Continues
        } else if self.is_king_in_check(side) {
            GameEnd::CheckMate(!side)
        } else {
            GameEnd::StaleMate
        }
    }

    pub fn can_move(&self, side: Color) -> bool {
        self.occupied_by(side)
            .iter()
            .any(|from| !self.legal_destinations(from).is_empty())
    }
}
