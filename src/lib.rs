//! Hnefatafl (11×11) AI Engine
//!
//! 维京棋规则引擎与 AI - 支持记谱输入输出、对局存档

pub mod ai;
pub mod board;
pub mod error;
pub mod fen;
pub mod game;
pub mod rules;
pub mod save;
pub mod test_positions;
pub mod types;

pub use ai::{
    choose_move, evaluate, evaluate_detail, spawn_search, Difficulty, DifficultyProfile,
    EvalDetail, MinimaxAI, PendingSearch, ScoredMove, SearchLimits, SearchReport, SearchStats,
};
pub use board::{Board, MoveOutcome};
pub use error::{GameError, NotationError, SaveError};
pub use fen::{
    apply_move_to_fen, apply_move_to_fen_with_rules, board_to_fen, parse_fen,
    parse_fen_with_rules, FenState, START_FEN,
};
pub use game::{Game, GameMode, MoveRecord};
pub use rules::RuleSet;
pub use save::SaveState;
pub use types::{GameResult, Move, PieceKind, Position, Side, SquareKind, WinReason};
