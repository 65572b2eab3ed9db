//! 棋盘记谱
//!
//! 格式: `<棋盘> <行棋方>`
//!
//! 棋盘自第 0 行（上边线）到第 10 行，用 `/` 分隔：
//! - 攻方：a
//! - 守方：d
//! - 国王：k
//! - 连续空格：十进制数字 (1-11)
//!
//! 行棋方：`a` 攻方，`d` 守方

use crate::board::Board;
use crate::error::{GameError, NotationError};
use crate::rules::RuleSet;
use crate::types::{Move, PieceKind, Position, Side, BOARD_SIZE};

/// 初始局面，守方先行
pub const START_FEN: &str =
    "3aaaaa3/5a5/11/a4d4a/a3ddd3a/aa1ddkdd1aa/a3ddd3a/a4d4a/11/5a5/3aaaaa3 d";

/// 解析后的局面
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FenState {
    pub board: Board,
    pub turn: Side,
}

/// 解析记谱（标准规则）
pub fn parse_fen(fen: &str) -> Result<FenState, NotationError> {
    parse_fen_with_rules(fen, RuleSet::STANDARD)
}

pub fn parse_fen_with_rules(fen: &str, rules: RuleSet) -> Result<FenState, NotationError> {
    let parts: Vec<&str> = fen.split_whitespace().collect();
    if parts.len() != 2 {
        return Err(NotationError::Format(fen.to_string()));
    }

    let board = parse_board(parts[0], rules)?;
    let mut side_chars = parts[1].chars();
    let turn = match (side_chars.next(), side_chars.next()) {
        (Some(c), None) => Side::from_fen_char(c),
        _ => None,
    }
    .ok_or_else(|| NotationError::Side(parts[1].to_string()))?;

    Ok(FenState { board, turn })
}

fn parse_board(board_str: &str, rules: RuleSet) -> Result<Board, NotationError> {
    let rows: Vec<&str> = board_str.split('/').collect();
    if rows.len() != BOARD_SIZE as usize {
        return Err(NotationError::RowCount(rows.len()));
    }

    let mut board = Board::empty_with_rules(rules);
    for (row, row_str) in rows.iter().enumerate() {
        let mut col: usize = 0;
        let mut run: usize = 0;

        for ch in row_str.chars() {
            if let Some(d) = ch.to_digit(10) {
                run = run * 10 + d as usize;
                // run 不超过 11，不会溢出
                if col + run > BOARD_SIZE as usize {
                    return Err(NotationError::RowWidth {
                        row,
                        width: col + run,
                    });
                }
                continue;
            }
            col += run;
            run = 0;

            let kind = PieceKind::from_fen_char(ch).ok_or(NotationError::Piece(ch))?;
            if col >= BOARD_SIZE as usize {
                return Err(NotationError::RowWidth {
                    row,
                    width: col + 1,
                });
            }
            board.set(Position::new(row as i8, col as i8), kind);
            col += 1;
        }
        col += run;

        if col != BOARD_SIZE as usize {
            return Err(NotationError::RowWidth { row, width: col });
        }
    }

    Ok(board)
}

/// 生成记谱字符串
pub fn board_to_fen(board: &Board, turn: Side) -> String {
    let mut rows = Vec::with_capacity(BOARD_SIZE as usize);

    for row in 0..BOARD_SIZE {
        let mut row_str = String::new();
        let mut empty_count = 0;

        for col in 0..BOARD_SIZE {
            match board.get(Position::new(row, col)) {
                Some(PieceKind::Empty) | None => empty_count += 1,
                Some(kind) => {
                    if empty_count > 0 {
                        row_str.push_str(&empty_count.to_string());
                        empty_count = 0;
                    }
                    row_str.push(kind.to_fen_char());
                }
            }
        }

        if empty_count > 0 {
            row_str.push_str(&empty_count.to_string());
        }
        rows.push(row_str);
    }

    format!("{} {}", rows.join("/"), turn.to_fen_char())
}

/// 在记谱上执行走法，返回新的记谱（标准规则）
pub fn apply_move_to_fen(fen: &str, move_str: &str) -> Result<String, NotationError> {
    apply_move_to_fen_with_rules(fen, move_str, RuleSet::STANDARD)
}

/// 在记谱上执行行棋方的走法
pub fn apply_move_to_fen_with_rules(
    fen: &str,
    move_str: &str,
    rules: RuleSet,
) -> Result<String, NotationError> {
    let state = parse_fen_with_rules(fen, rules)?;
    let mv = Move::from_fen_str(move_str)
        .ok_or_else(|| NotationError::Move(move_str.to_string()))?;

    if state.board.get(mv.from).and_then(|kind| kind.side()) != Some(state.turn) {
        return Err(GameError::NotYourPiece {
            pos: mv.from,
            side: state.turn,
        }
        .into());
    }

    let outcome = state.board.play(mv)?;
    Ok(board_to_fen(&outcome.board, state.turn.opposite()))
}
