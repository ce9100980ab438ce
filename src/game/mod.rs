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

//! Game flow on top of the rules engine.
//!
//! A `Game` owns the authoritative `Position` and everything the board
//! itself does not know about: whose turn it is, who is playing, how a
//! promotion choice is made, and how the game ended. This is also the only
//! layer that logs; it emits `tracing` events and leaves installing a
//! subscriber to the application.

use anyhow::Result;
#[cfg(feature = "random")]
use rand::{thread_rng, Rng};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    Color, GameEnd, Mask, Move, MoveOutcome, Pair, Piece, Position, Promotion, Rank, Square,
};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GameId(u64);

impl GameId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }
    #[cfg(feature = "random")]
    pub fn random() -> Self {
        Self(thread_rng().gen())
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameResult {
    Win(Color, WinReason),
    Draw(DrawReason),
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WinReason {
    CheckMate,
    Resigned,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawReason {
    StaleMate,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum GameError {
    #[error("The game is already over")]
    GameOver,
    #[error("No piece of the side to move on {0}")]
    NotYourPiece(Square),
    #[error("Illegal move from {from} to {to}")]
    IllegalMove { from: Square, to: Square },
    #[error("The pawn reaching {0} needs a promotion choice")]
    PromotionRequired(Square),
    #[error("Invalid player name {0:?}: use letters only")]
    InvalidPlayerName(String),
    #[error("Both players are named {0:?}")]
    DuplicatePlayerName(String),
}
use GameError::*;

/// Per-game settings. Missing fields deserialize to their defaults.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct GameConfig {
    /// Piece a pawn becomes on the far rank when the move carries no
    /// choice of its own. `None` rejects such moves instead.
    pub auto_promotion: Option<Promotion>,
    pub record_history: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            auto_promotion: Some(Promotion::Queen),
            record_history: true,
        }
    }
}

/// One applied move, with the board as it was before and after.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    pub side: Color,
    pub mv: Move,
    pub outcome: MoveOutcome,
    pub promotion: Option<Promotion>,
    pub check: bool,
    pub before: Position,
    pub after: Position,
}

#[derive(Debug, Clone)]
pub struct Game {
    id: GameId,
    config: GameConfig,
    players: Pair<String>,
    position: Position,
    turn: Color,
    result: Option<GameResult>,
    history: Vec<MoveRecord>,
}

impl Game {
    /// A new game from the standard starting position, White to move.
    pub fn new(id: GameId, config: GameConfig) -> Self {
        Self::from_position(id, config, Position::standard(), Color::White)
    }

    #[cfg(feature = "random")]
    pub fn random(config: GameConfig) -> Self {
        Self::new(GameId::random(), config)
    }

    /// A game resuming from an arbitrary position. The position may
    /// already be decided, in which case the game starts out over.
    pub fn from_position(id: GameId, config: GameConfig, position: Position, turn: Color) -> Self {
        let mut game = Self {
            id,
            config,
            players: Pair::new("White".to_string(), "Black".to_string()),
            position,
            turn,
            result: None,
            history: Vec::new(),
        };
        game.update_result();
        game
    }

    #[inline]
    pub fn id(&self) -> GameId {
        self.id
    }
    #[inline]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }
    #[inline]
    pub fn position(&self) -> &Position {
        &self.position
    }
    #[inline]
    pub fn turn(&self) -> Color {
        self.turn
    }
    #[inline]
    pub fn result(&self) -> Option<GameResult> {
        self.result
    }
    #[inline]
    pub fn is_over(&self) -> bool {
        self.result.is_some()
    }
    #[inline]
    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }
    #[inline]
    pub fn player(&self, color: Color) -> &str {
        &self.players[color]
    }

    /// Names the players. Names must be non-empty ASCII letters and the two
    /// must differ ignoring case.
    pub fn set_players(&mut self, white: &str, black: &str) -> Result<()> {
        for name in [white, black] {
            if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(InvalidPlayerName(name.to_string()).into());
            }
        }
        if white.eq_ignore_ascii_case(black) {
            return Err(DuplicatePlayerName(black.to_string()).into());
        }
        self.players = Pair::new(white.to_string(), black.to_string());
        Ok(())
    }

    /// Is the side to move in check?
    pub fn is_in_check(&self) -> bool {
        self.position.is_in_check(self.turn)
    }

    /// Legal destinations for the piece on `from`, empty unless it belongs
    /// to the side to move and the game is still on.
    pub fn legal_destinations(&self, from: Square) -> Mask {
        match self.position[from] {
            Some(material) if !self.is_over() && material.color() == self.turn => {
                self.position.legal_destinations(from)
            }
            _ => Mask::empty(),
        }
    }

    /// Plays a move for the side to move.
    ///
    /// A pawn reaching the far rank is promoted to `promotion`, or to the
    /// configured auto-promotion piece when no choice is given. The choice is
    /// ignored for every other move. A rejected move leaves the game
    /// untouched.
    pub fn submit_move(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<Promotion>,
    ) -> Result<MoveOutcome> {
        if self.is_over() {
            debug!(game = %self.id, %from, %to, "move rejected: game over");
            return Err(GameOver.into());
        }
        let side = self.turn;
        let mover = match self.position[from] {
            Some(material) if material.color() == side => material,
            _ => {
                debug!(game = %self.id, %side, %from, "move rejected: not the mover's piece");
                return Err(NotYourPiece(from).into());
            }
        };

        let mut next = self.position.clone();
        let outcome = next.apply_move(from, to, side);
        if !outcome.is_legal() {
            debug!(game = %self.id, %side, %from, %to, "move rejected: illegal");
            return Err(IllegalMove { from, to }.into());
        }

        let promotes = mover.piece() == Piece::Pawn && to.rank() == Rank::promotion_rank(side);
        let promotion = if promotes {
            let Some(choice) = promotion.or(self.config.auto_promotion) else {
                debug!(game = %self.id, %side, %to, "move rejected: promotion choice missing");
                return Err(PromotionRequired(to).into());
            };
            next.promote(to, choice)?;
            info!(game = %self.id, %side, square = %to, piece = %choice, "pawn promoted");
            Some(choice)
        } else {
            None
        };

        let before = std::mem::replace(&mut self.position, next);
        self.turn = !side;
        let check = self.is_in_check();
        let mv = Move::new(from, to);
        info!(game = %self.id, %side, %mv, ?outcome, check, "move applied");

        if self.config.record_history {
            self.history.push(MoveRecord {
                side,
                mv,
                outcome,
                promotion,
                check,
                before,
                after: self.position.clone(),
            });
        }
        self.update_result();
        Ok(outcome)
    }

    /// `side` gives up; the opponent wins.
    pub fn resign(&mut self, side: Color) -> Result<()> {
        if self.is_over() {
            return Err(GameOver.into());
        }
        self.result = Some(GameResult::Win(!side, WinReason::Resigned));
        info!(game = %self.id, %side, "resigned");
        Ok(())
    }

    /// One line describing the state of play, e.g. "Alice's Turn (WHITE) -
    /// CHECK!" or "Checkmate! Bob (BLACK) wins."
    pub fn status(&self) -> String {
        match self.result {
            None => {
                let player = self.player(self.turn);
                let mut status = format!("{}'s Turn ({})", player, upper(self.turn));
                if self.is_in_check() {
                    status.push_str(" - CHECK!");
                }
                status
            }
            Some(GameResult::Win(winner, WinReason::CheckMate)) => {
                format!("Checkmate! {} ({}) wins.", self.player(winner), upper(winner))
            }
            Some(GameResult::Win(winner, WinReason::Resigned)) => {
                let loser = !winner;
                format!(
                    "{} ({}) resigned. {} ({}) wins.",
                    self.player(loser),
                    upper(loser),
                    self.player(winner),
                    upper(winner)
                )
            }
            Some(GameResult::Draw(DrawReason::StaleMate)) => {
                "Stalemate! The game is a draw.".to_string()
            }
        }
    }

    fn update_result(&mut self) {
        self.result = match self.position.evaluate_game_end(self.turn) {
            GameEnd::Continues => None,
            GameEnd::CheckMate(winner) => Some(GameResult::Win(winner, WinReason::CheckMate)),
            GameEnd::StaleMate => Some(GameResult::Draw(DrawReason::StaleMate)),
        };
        if let Some(result) = self.result {
            info!(game = %self.id, ?result, "game over");
        }
    }
}

fn upper(color: Color) -> String {
    color.to_string().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CastleSide, Material};
    use Square::*;

    fn new_game() -> Game {
        Game::new(GameId::new(1), GameConfig::default())
    }

    fn play(game: &mut Game, moves: &[(Square, Square)]) {
        for &(from, to) in moves {
            game.submit_move(from, to, None).unwrap();
        }
    }

    fn game_error(err: anyhow::Error) -> GameError {
        err.downcast::<GameError>().unwrap()
    }

    #[test]
    fn test_new_game() {
        let game = new_game();
        assert_eq!(game.turn(), Color::White);
        assert_eq!(game.position(), &Position::standard());
        assert!(!game.is_over());
        assert_eq!(game.status(), "White's Turn (WHITE)");
    }
    #[test]
    fn test_move_switches_turn_and_records_history() {
        let mut game = new_game();
        let outcome = game.submit_move(E2, E4, None).unwrap();
        assert_eq!(outcome, MoveOutcome::Ok);
        assert_eq!(game.turn(), Color::Black);
        assert_eq!(game.history().len(), 1);
        let record = &game.history()[0];
        assert_eq!(record.side, Color::White);
        assert_eq!(record.mv, Move::new(E2, E4));
        assert_eq!(record.before, Position::standard());
        assert_eq!(&record.after, game.position());
        assert!(!record.check);
    }
    #[test]
    fn test_history_can_be_disabled() {
        let config = GameConfig {
            record_history: false,
            ..GameConfig::default()
        };
        let mut game = Game::new(GameId::new(2), config);
        play(&mut game, &[(E2, E4), (E7, E5)]);
        assert!(game.history().is_empty());
        assert_eq!(game.turn(), Color::White);
    }
    #[test]
    fn test_cannot_move_opponents_piece() {
        let mut game = new_game();
        let err = game.submit_move(E7, E5, None).unwrap_err();
        assert_eq!(game_error(err), NotYourPiece(E7));
        let err = game.submit_move(E4, E5, None).unwrap_err();
        assert_eq!(game_error(err), NotYourPiece(E4));
        assert_eq!(game.turn(), Color::White);
        assert_eq!(game.position(), &Position::standard());
    }
    #[test]
    fn test_illegal_move_leaves_game_untouched() {
        let mut game = new_game();
        let err = game.submit_move(E2, E5, None).unwrap_err();
        assert_eq!(game_error(err), IllegalMove { from: E2, to: E5 });
        assert_eq!(game.turn(), Color::White);
        assert!(game.history().is_empty());
        assert_eq!(game.position(), &Position::standard());
    }
    #[test]
    fn test_check_shows_in_status() {
        let mut game = new_game();
        play(&mut game, &[(E2, E4), (F7, F6), (D1, H5)]);
        assert!(game.is_in_check());
        assert!(game.history()[2].check);
        assert_eq!(game.status(), "Black's Turn (BLACK) - CHECK!");
        assert!(!game.is_over());
    }
    #[test]
    fn test_fools_mate_ends_the_game() {
        let mut game = new_game();
        game.set_players("Alice", "Bob").unwrap();
        play(&mut game, &[(F2, F3), (E7, E5), (G2, G4), (D8, H4)]);
        assert_eq!(
            game.result(),
            Some(GameResult::Win(Color::Black, WinReason::CheckMate))
        );
        assert_eq!(game.status(), "Checkmate! Bob (BLACK) wins.");
        assert!(game.legal_destinations(E1).is_empty());
        let err = game.submit_move(E1, F2, None).unwrap_err();
        assert_eq!(game_error(err), GameOver);
    }
    #[test]
    fn test_stalemate_is_a_draw() {
        let position = Position::empty()
            .set_contents(H8, Some(Material::BK.moved()))
            .set_contents(G6, Some(Material::WK.moved()))
            .set_contents(E7, Some(Material::WQ));
        let mut game =
            Game::from_position(GameId::new(3), GameConfig::default(), position, Color::White);
        assert!(!game.is_over());
        game.submit_move(E7, F7, None).unwrap();
        assert_eq!(game.result(), Some(GameResult::Draw(DrawReason::StaleMate)));
        assert_eq!(game.status(), "Stalemate! The game is a draw.");
    }
    #[test]
    fn test_decided_position_starts_over() {
        let position = Position::empty()
            .set_contents(H8, Some(Material::BK.moved()))
            .set_contents(G6, Some(Material::WK.moved()))
            .set_contents(F7, Some(Material::WQ));
        let game =
            Game::from_position(GameId::new(4), GameConfig::default(), position, Color::Black);
        assert!(game.is_over());
    }
    #[test]
    fn test_resign() {
        let mut game = new_game();
        game.set_players("Alice", "Bob").unwrap();
        game.resign(Color::White).unwrap();
        assert_eq!(
            game.result(),
            Some(GameResult::Win(Color::Black, WinReason::Resigned))
        );
        assert_eq!(game.status(), "Alice (WHITE) resigned. Bob (BLACK) wins.");
        assert_eq!(game_error(game.resign(Color::Black).unwrap_err()), GameOver);
    }
    #[test]
    fn test_player_names_are_validated() {
        let mut game = new_game();
        let err = game.set_players("", "Bob").unwrap_err();
        assert_eq!(game_error(err), InvalidPlayerName(String::new()));
        let err = game.set_players("Alice", "Bob2").unwrap_err();
        assert_eq!(game_error(err), InvalidPlayerName("Bob2".to_string()));
        let err = game.set_players("Alice", "alice").unwrap_err();
        assert_eq!(game_error(err), DuplicatePlayerName("alice".to_string()));
        assert_eq!(game.player(Color::White), "White");
        game.set_players("Alice", "Bob").unwrap();
        assert_eq!(game.player(Color::Black), "Bob");
    }
    #[test]
    fn test_legal_destinations_only_for_side_to_move() {
        let game = new_game();
        assert_eq!(game.legal_destinations(B1), Mask::from_squares([A3, C3]));
        assert!(game.legal_destinations(B8).is_empty());
        assert!(game.legal_destinations(E4).is_empty());
    }

    fn promotion_game(config: GameConfig) -> Game {
        let position = Position::empty()
            .set_contents(A1, Some(Material::WK.moved()))
            .set_contents(H8, Some(Material::BK.moved()))
            .set_contents(B7, Some(Material::WP));
        Game::from_position(GameId::new(5), config, position, Color::White)
    }

    #[test]
    fn test_auto_promotion_to_queen() {
        let mut game = promotion_game(GameConfig::default());
        assert_eq!(game.submit_move(B7, B8, None).unwrap(), MoveOutcome::Ok);
        assert_eq!(game.position()[B8], Some(Material::WQ));
        assert_eq!(game.history()[0].promotion, Some(Promotion::Queen));
        // the new queen checks along the back rank
        assert_eq!(game.status(), "Black's Turn (BLACK) - CHECK!");
        assert!(!game.is_over());
    }
    #[test]
    fn test_explicit_promotion_choice() {
        let mut game = promotion_game(GameConfig::default());
        game.submit_move(B7, B8, Some(Promotion::Knight)).unwrap();
        assert_eq!(game.position()[B8].map(|m| m.piece()), Some(Piece::Knight));
        assert!(!game.is_in_check());
    }
    #[test]
    fn test_promotion_required_without_auto_promotion() {
        let config = GameConfig {
            auto_promotion: None,
            ..GameConfig::default()
        };
        let mut game = promotion_game(config);
        let before = game.position().clone();
        let err = game.submit_move(B7, B8, None).unwrap_err();
        assert_eq!(game_error(err), PromotionRequired(B8));
        assert_eq!(game.position(), &before);
        assert_eq!(game.turn(), Color::White);
        game.submit_move(B7, B8, Some(Promotion::Rook)).unwrap();
        assert_eq!(game.position()[B8].map(|m| m.piece()), Some(Piece::Rook));
    }
    #[test]
    fn test_special_outcomes_pass_through() {
        let mut game = new_game();
        play(&mut game, &[(E2, E4), (A7, A6), (E4, E5), (D7, D5)]);
        assert_eq!(game.submit_move(E5, D6, None).unwrap(), MoveOutcome::EnPassant);
        play(&mut game, &[(A6, A5), (G1, F3), (A5, A4), (F1, E2), (A4, A3)]);
        assert_eq!(
            game.submit_move(E1, G1, None).unwrap(),
            MoveOutcome::Castle(CastleSide::KingSide)
        );
    }
    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: GameConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, GameConfig::default());
        let config: GameConfig =
            serde_json::from_str(r#"{"auto_promotion":"Knight","record_history":false}"#).unwrap();
        assert_eq!(config.auto_promotion, Some(Promotion::Knight));
        assert!(!config.record_history);
        let config: GameConfig = serde_json::from_str(r#"{"auto_promotion":null}"#).unwrap();
        assert_eq!(config.auto_promotion, None);
        assert!(config.record_history);
    }
    #[test]
    fn test_move_record_serializes() {
        let mut game = new_game();
        game.submit_move(G1, F3, None).unwrap();
        let json = serde_json::to_string(&game.history()[0]).unwrap();
        let record: MoveRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(&record, &game.history()[0]);
    }
}
