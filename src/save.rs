//! 对局存档
//!
//! JSON 格式，字段名为 camelCase；缺失的字段取默认值（初始局面、守方行棋、进行中）。
//! 读档时胜负由棋盘重新判定，不信任存档里的 `gameStatus` / `winner`。

use crate::ai::Difficulty;
use crate::board::Board;
use crate::error::SaveError;
use crate::game::{Game, GameMode, MoveRecord};
use crate::rules::RuleSet;
use crate::types::{GameResult, PieceKind, Position, Side, BOARD_SIZE};
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// 对局状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    #[default]
    Playing,
    Finished,
}

/// 存档内容
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SaveState {
    #[serde(deserialize_with = "null_as_default")]
    pub board: Vec<Vec<PieceKind>>,
    #[serde(deserialize_with = "null_as_defenders")]
    pub current_player: Side,
    #[serde(deserialize_with = "null_as_default")]
    pub game_mode: GameMode,
    #[serde(deserialize_with = "null_as_default")]
    pub ai_difficulty: Difficulty,
    #[serde(deserialize_with = "null_as_default")]
    pub game_status: GameStatus,
    pub winner: Option<Side>,
    #[serde(deserialize_with = "null_as_default")]
    pub move_history: Vec<MoveRecord>,
}

/// `null` 与缺失同样取默认值
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// `currentPlayer` 为 `null` 时守方行棋
fn null_as_defenders<'de, D>(deserializer: D) -> Result<Side, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Side>::deserialize(deserializer)?.unwrap_or(Side::Defenders))
}

impl Default for SaveState {
    fn default() -> Self {
        SaveState {
            board: Vec::new(),
            current_player: Side::Defenders,
            game_mode: GameMode::default(),
            ai_difficulty: Difficulty::default(),
            game_status: GameStatus::Playing,
            winner: None,
            move_history: Vec::new(),
        }
    }
}

fn board_rows(board: &Board) -> Vec<Vec<PieceKind>> {
    (0..BOARD_SIZE)
        .map(|row| {
            (0..BOARD_SIZE)
                .map(|col| board.get(Position::new(row, col)).unwrap_or_default())
                .collect()
        })
        .collect()
}

impl SaveState {
    pub fn from_game(game: &Game) -> Self {
        let (game_status, winner) = match game.result() {
            GameResult::Ongoing => (GameStatus::Playing, None),
            GameResult::Decided { winner, .. } => (GameStatus::Finished, Some(winner)),
        };
        SaveState {
            board: board_rows(game.board()),
            current_player: game.turn(),
            game_mode: game.mode(),
            ai_difficulty: game.difficulty(),
            game_status,
            winner,
            move_history: game.history().to_vec(),
        }
    }

    /// 还原棋盘；存档没有棋盘时为初始局面
    pub fn to_board(&self, rules: RuleSet) -> Result<Board, SaveError> {
        if self.board.is_empty() {
            return Ok(Board::initial_with_rules(rules));
        }
        if self.board.len() != BOARD_SIZE as usize {
            return Err(SaveError::BoardRows {
                rows: self.board.len(),
            });
        }

        let mut board = Board::empty_with_rules(rules);
        for (row, cells) in self.board.iter().enumerate() {
            if cells.len() != BOARD_SIZE as usize {
                return Err(SaveError::BoardWidth {
                    row,
                    width: cells.len(),
                });
            }
            for (col, &kind) in cells.iter().enumerate() {
                board.set(Position::new(row as i8, col as i8), kind);
            }
        }
        Ok(board)
    }

    /// 恢复对局
    pub fn into_game(self, rules: RuleSet) -> Result<Game, SaveError> {
        let board = self.to_board(rules)?;
        let game = Game::restore(
            board,
            self.current_player,
            self.game_mode,
            self.ai_difficulty,
            self.move_history,
        );

        let saved_finished = self.game_status == GameStatus::Finished;
        let saved_winner = if saved_finished { self.winner } else { None };
        if saved_finished != game.is_over() || saved_winner != game.result().winner() {
            log::warn!(
                "saved status {:?}/{:?} disagrees with board, using {:?}",
                self.game_status,
                self.winner,
                game.result()
            );
        }
        Ok(game)
    }

    pub fn from_json(json: &str) -> Result<SaveState, SaveError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SaveError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// 读取存档文件，文件不存在时返回 None
    pub fn load(path: &Path) -> Result<Option<SaveState>, SaveError> {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let state = SaveState::from_json(&json)?;
        log::info!(
            "loaded {} ({} moves)",
            path.display(),
            state.move_history.len()
        );
        Ok(Some(state))
    }

    pub fn save(&self, path: &Path) -> Result<(), SaveError> {
        fs::write(path, self.to_json()?)?;
        log::debug!("saved {}", path.display());
        Ok(())
    }
}
