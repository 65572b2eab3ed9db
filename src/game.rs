//! 对局
//!
//! 驱动回合：校验并执行走子、记录历史、判定胜负。人机模式下 AI 执攻方。

use crate::ai::{Difficulty, MinimaxAI};
use crate::board::{Board, MoveOutcome};
use crate::error::GameError;
use crate::rules::RuleSet;
use crate::types::{GameResult, Move, PieceKind, Position, Side};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 对局模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    /// 双人对弈
    Pvp,
    /// 人机对弈
    #[default]
    Ai,
}

impl GameMode {
    pub fn from_name(name: &str) -> Option<GameMode> {
        match name.to_lowercase().as_str() {
            "pvp" => Some(GameMode::Pvp),
            "ai" => Some(GameMode::Ai),
            _ => None,
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameMode::Pvp => write!(f, "pvp"),
            GameMode::Ai => write!(f, "ai"),
        }
    }
}

/// 一步走子的记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRecord {
    pub from: Position,
    pub to: Position,
    pub piece: PieceKind,
    /// 本步提子数
    pub captured: usize,
    pub player: Side,
}

/// 一盘对局
#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    turn: Side,
    result: GameResult,
    mode: GameMode,
    difficulty: Difficulty,
    history: Vec<MoveRecord>,
}

impl Default for Game {
    fn default() -> Self {
        Game::new(GameMode::default(), Difficulty::default())
    }
}

impl Game {
    /// 新对局（标准规则），守方先行
    pub fn new(mode: GameMode, difficulty: Difficulty) -> Self {
        Game::with_rules(RuleSet::STANDARD, mode, difficulty)
    }

    pub fn with_rules(rules: RuleSet, mode: GameMode, difficulty: Difficulty) -> Self {
        Game {
            board: Board::initial_with_rules(rules),
            turn: Side::Defenders,
            result: GameResult::Ongoing,
            mode,
            difficulty,
            history: Vec::new(),
        }
    }

    /// 从已有局面恢复，胜负由棋盘重新判定
    pub fn restore(
        board: Board,
        turn: Side,
        mode: GameMode,
        difficulty: Difficulty,
        history: Vec<MoveRecord>,
    ) -> Self {
        Game {
            result: board.evaluate_game_result(),
            board,
            turn,
            mode,
            difficulty,
            history,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// 当前行棋方（对局结束后保持为最后走子的一方）
    pub fn turn(&self) -> Side {
        self.turn
    }

    pub fn result(&self) -> GameResult {
        self.result
    }

    pub fn is_over(&self) -> bool {
        self.result.is_decided()
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: GameMode) {
        self.mode = mode;
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
    }

    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    /// AI 执哪一方
    pub fn ai_side(&self) -> Option<Side> {
        match self.mode {
            GameMode::Ai => Some(Side::Attackers),
            GameMode::Pvp => None,
        }
    }

    /// 是否轮到 AI 走
    pub fn is_ai_turn(&self) -> bool {
        !self.is_over() && self.ai_side() == Some(self.turn)
    }

    /// 当前行棋方在 `from` 的棋子可到达的格子
    ///
    /// 对局结束或 `from` 不是当前行棋方的棋子时为空。
    pub fn legal_destinations(&self, from: Position) -> Vec<Position> {
        if self.is_over() || !self.owns(from) {
            return Vec::new();
        }
        self.board.legal_destinations(from)
    }

    fn owns(&self, pos: Position) -> bool {
        self.board.get(pos).and_then(|kind| kind.side()) == Some(self.turn)
    }

    /// 执行当前行棋方的走子
    pub fn play(&mut self, mv: Move) -> Result<MoveOutcome, GameError> {
        if self.is_over() {
            return Err(GameError::GameOver);
        }
        if !self.owns(mv.from) {
            return Err(GameError::NotYourPiece {
                pos: mv.from,
                side: self.turn,
            });
        }

        let piece = self.board.get(mv.from).unwrap_or_default();
        let outcome = self.board.play(mv)?;

        self.history.push(MoveRecord {
            from: mv.from,
            to: mv.to,
            piece,
            captured: outcome.captured.len(),
            player: self.turn,
        });
        self.board = outcome.board;
        self.result = self.board.evaluate_game_result();

        if !outcome.captured.is_empty() {
            log::info!("{} {} captured {}", self.turn, mv, outcome.captured.len());
        }
        match self.result {
            GameResult::Decided { winner, reason } => {
                log::info!("game over: {} win ({})", winner, reason);
            }
            GameResult::Ongoing => self.turn = self.turn.opposite(),
        }

        Ok(outcome)
    }

    /// 由 AI 为当前行棋方走一步
    pub fn ai_move(&mut self, ai: &mut MinimaxAI) -> Result<MoveOutcome, GameError> {
        if self.is_over() {
            return Err(GameError::GameOver);
        }
        let mv = ai
            .choose_move(&self.board, self.turn)
            .ok_or(GameError::NoLegalMove(self.turn))?;
        log::info!("{} AI plays {}", self.turn, mv);
        self.play(mv)
    }

    /// 为当前行棋方给出提示走法
    pub fn hint(&self, ai: &mut MinimaxAI) -> Option<Move> {
        if self.is_over() {
            return None;
        }
        ai.choose_move(&self.board, self.turn)
    }

    /// 以当前难度创建 AI
    pub fn make_ai(&self, seed: Option<u64>) -> MinimaxAI {
        MinimaxAI::new(self.difficulty.profile(), seed)
    }

    /// 重新开始，保留模式、难度和规则
    pub fn reset(&mut self) {
        log::info!("game reset");
        *self = Game::with_rules(*self.board.rules(), self.mode, self.difficulty);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_positions;
    use crate::types::WinReason;

    fn mv(fr: i8, fc: i8, tr: i8, tc: i8) -> Move {
        Move::new(Position::new(fr, fc), Position::new(tr, tc))
    }

    #[test]
    fn test_new_game() {
        let game = Game::default();
        assert_eq!(game.turn(), Side::Defenders);
        assert_eq!(game.mode(), GameMode::Ai);
        assert_eq!(game.difficulty(), Difficulty::Easy);
        assert_eq!(game.result(), GameResult::Ongoing);
        assert!(game.history().is_empty());
        assert!(!game.is_ai_turn());
    }

    #[test]
    fn test_play_switches_turn_and_records() {
        let mut game = Game::new(GameMode::Pvp, Difficulty::Easy);
        game.play(mv(3, 5, 3, 8)).unwrap();

        assert_eq!(game.turn(), Side::Attackers);
        assert_eq!(
            game.history(),
            &[MoveRecord {
                from: Position::new(3, 5),
                to: Position::new(3, 8),
                piece: PieceKind::Defender,
                captured: 0,
                player: Side::Defenders,
            }]
        );
    }

    #[test]
    fn test_play_wrong_side() {
        let mut game = Game::default();
        assert_eq!(
            game.play(mv(0, 3, 2, 3)),
            Err(GameError::NotYourPiece {
                pos: Position::new(0, 3),
                side: Side::Defenders
            })
        );
        // 空格也不属于行棋方
        assert!(matches!(
            game.play(mv(2, 2, 2, 3)),
            Err(GameError::NotYourPiece { .. })
        ));
    }

    #[test]
    fn test_play_illegal_move() {
        let mut game = Game::default();
        let bad = mv(3, 5, 4, 6);
        assert_eq!(game.play(bad), Err(GameError::IllegalMove { mv: bad }));
        assert_eq!(game.turn(), Side::Defenders);
        assert!(game.history().is_empty());
    }

    #[test]
    fn test_win_keeps_turn_and_blocks_moves() {
        let board = test_positions::board(test_positions::KING_ESCAPE);
        let mut game =
            Game::restore(board, Side::Defenders, GameMode::Pvp, Difficulty::Easy, vec![]);
        game.play(mv(2, 0, 0, 0)).unwrap();

        assert_eq!(
            game.result(),
            GameResult::Decided {
                winner: Side::Defenders,
                reason: WinReason::KingEscaped
            }
        );
        assert_eq!(game.turn(), Side::Defenders);
        assert_eq!(game.play(mv(8, 8, 8, 0)), Err(GameError::GameOver));
        assert!(game.legal_destinations(Position::new(0, 0)).is_empty());
    }

    #[test]
    fn test_capture_is_recorded() {
        let board = test_positions::board(test_positions::SANDWICH);
        let mut game =
            Game::restore(board, Side::Attackers, GameMode::Pvp, Difficulty::Easy, vec![]);
        let outcome = game.play(mv(10, 3, 4, 3)).unwrap();

        assert_eq!(outcome.captured, vec![Position::new(3, 3)]);
        assert_eq!(game.history()[0].captured, 1);
        assert_eq!(game.turn(), Side::Defenders);
    }

    #[test]
    fn test_ai_move() {
        let mut game = Game::default();
        game.play(mv(3, 5, 3, 8)).unwrap();
        assert!(game.is_ai_turn());

        let mut ai = game.make_ai(Some(1));
        let outcome = game.ai_move(&mut ai).unwrap();
        assert_eq!(outcome.mover, Side::Attackers);
        assert_eq!(game.history().len(), 2);
        assert_eq!(game.history()[1].player, Side::Attackers);
        assert_eq!(game.turn(), Side::Defenders);
    }

    #[test]
    fn test_ai_move_without_moves() {
        let mut board = Board::empty();
        board.set(Position::new(5, 5), PieceKind::King);
        board.set(Position::new(0, 2), PieceKind::Attacker);
        board.set(Position::new(0, 3), PieceKind::Defender);
        board.set(Position::new(1, 2), PieceKind::Defender);
        board.set(Position::new(0, 1), PieceKind::Defender);
        let mut game =
            Game::restore(board, Side::Attackers, GameMode::Ai, Difficulty::Easy, vec![]);

        let mut ai = game.make_ai(None);
        assert_eq!(
            game.ai_move(&mut ai),
            Err(GameError::NoLegalMove(Side::Attackers))
        );
    }

    #[test]
    fn test_hint_and_destinations() {
        let game = Game::default();
        let mut ai = game.make_ai(Some(3));
        let hint = game.hint(&mut ai).unwrap();
        assert_eq!(
            game.board().get(hint.from).and_then(|k| k.side()),
            Some(Side::Defenders)
        );

        // (2,5) 一格，横向左右各四格
        assert_eq!(game.legal_destinations(Position::new(3, 5)).len(), 9);
        assert!(game.legal_destinations(Position::new(0, 3)).is_empty());
    }

    #[test]
    fn test_reset_keeps_settings() {
        let mut game = Game::with_rules(RuleSet::STRICT, GameMode::Pvp, Difficulty::Hard);
        game.play(mv(3, 5, 3, 8)).unwrap();
        game.reset();

        assert_eq!(game.board(), &Board::initial_with_rules(RuleSet::STRICT));
        assert_eq!(game.turn(), Side::Defenders);
        assert_eq!(game.mode(), GameMode::Pvp);
        assert_eq!(game.difficulty(), Difficulty::Hard);
        assert!(game.history().is_empty());
    }

    #[test]
    fn test_game_mode_names() {
        assert_eq!(GameMode::from_name("PvP"), Some(GameMode::Pvp));
        assert_eq!(GameMode::from_name("ai"), Some(GameMode::Ai));
        assert_eq!(GameMode::from_name("online"), None);
        assert_eq!(GameMode::Ai.to_string(), "ai");
    }
}
