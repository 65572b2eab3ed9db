//! 错误类型
//!
//! 引擎内所有错误都是可恢复的分类结果，由调用方决定如何处理

use crate::types::{Move, Position, Side};

/// 对局操作错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// 走法不合法（调用方应拒绝并重置选择状态）
    #[error("Illegal move: {mv}")]
    IllegalMove { mv: Move },

    /// 起点不是当前行棋方的棋子
    #[error("No piece of {side} at {pos}")]
    NotYourPiece { pos: Position, side: Side },

    /// 对局已结束
    #[error("Game is already over")]
    GameOver,

    /// 当前行棋方无合法走法（僵局）
    #[error("No legal move available for {0}")]
    NoLegalMove(Side),
}

/// 棋盘记谱解析错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotationError {
    #[error("Invalid notation: expected '<board> <side>', got: {0}")]
    Format(String),

    #[error("Row {row} has {width} squares, expected 11")]
    RowWidth { row: usize, width: usize },

    #[error("Expected 11 rows, got {0}")]
    RowCount(usize),

    #[error("Invalid character '{0}' in board")]
    Piece(char),

    #[error("Invalid side to move: {0}")]
    Side(String),

    #[error("Invalid move string: {0}")]
    Move(String),

    #[error(transparent)]
    Game(#[from] GameError),
}

/// 存档读写错误
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("Invalid save JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Saved board must be 11x11, got {rows} rows")]
    BoardRows { rows: usize },

    #[error("Saved board row {row} has {width} squares, expected 11")]
    BoardWidth { row: usize, width: usize },

    #[error("Save file I/O failed: {0}")]
    Io(#[from] std::io::Error),
}
