//! 维京棋测试局面库
//!
//! 提供命名的记谱测试局面，方便测试和调试
//!
//! 命名规范:
//! - START: 初始局面
//! - MID_n: 中局
//! - 其余按局面特点命名（提子、逃王、只剩一步等）

use crate::board::Board;
use crate::fen::{parse_fen, START_FEN};

// =============================================================================
// 开局 / 中局
// =============================================================================

/// 初始局面
pub const START: &str = START_FEN;

/// 双方各走数步后的局面，攻方行棋
pub const MID_1: &str =
    "3aa1aa3/5a5/2a8/a4d4a/a2dd1d3a/1a1d1kdd1aa/a3ddd3a/a4d4a/11/5a5/3aaaaa3 a";

/// 王座空出，守方散开
pub const MID_2: &str = "3aaaaa3/5a5/11/a2d1d4a/a3d1d3a/aa1d3d1aa/a2kdd4a/a4d4a/11/5a5/3aaaaa3 d";

// =============================================================================
// 战术局面
// =============================================================================

/// 攻方唯一合法走法: (0,2) -> (0,1)
pub const ONE_ATTACKER_MOVE: &str = "2ad7/2d8/11/11/11/11/11/11/8k2/11/11 a";

/// 攻方 (10,3) 上行到 (4,3) 夹住 (3,3) 的守方
pub const SANDWICH: &str = "11/11/3a7/3d7/11/5k5/11/11/11/11/3a7 a";

/// 攻方 (0,4) 下行到 (2,4) 即可夹住国王
pub const KING_IN_DANGER: &str = "4a6/11/5ka4/11/11/11/11/11/11/11/11 a";

/// 国王一步可入角
pub const KING_ESCAPE: &str = "11/11/k10/11/11/11/11/11/8a2/11/11 d";

/// 国王靠近左上角
pub const KING_NEAR_CORNER: &str = "11/1k9/11/11/11/11/11/11/11/11/9a1 d";

/// 王座空着，四周是攻方
pub const EMPTY_THRONE: &str = "11/11/11/11/5a5/4a1a4/5d5/11/5k5/11/11 d";

// =============================================================================
// 已分胜负
// =============================================================================

/// 国王已在角格
pub const KING_ESCAPED: &str = "k10/11/11/11/11/11/11/11/11/11/10a a";

/// 国王已被提
pub const NO_KING: &str = "11/11/11/11/11/5a5/11/11/11/11/11 d";

/// 攻方全灭
pub const NO_ATTACKERS: &str = "11/11/11/11/11/4dkd4/11/11/11/11/11 a";

/// 所有命名局面
pub const ALL_POSITIONS: [(&str, &str); 12] = [
    ("START", START),
    ("MID_1", MID_1),
    ("MID_2", MID_2),
    ("ONE_ATTACKER_MOVE", ONE_ATTACKER_MOVE),
    ("SANDWICH", SANDWICH),
    ("KING_IN_DANGER", KING_IN_DANGER),
    ("KING_ESCAPE", KING_ESCAPE),
    ("KING_NEAR_CORNER", KING_NEAR_CORNER),
    ("EMPTY_THRONE", EMPTY_THRONE),
    ("KING_ESCAPED", KING_ESCAPED),
    ("NO_KING", NO_KING),
    ("NO_ATTACKERS", NO_ATTACKERS),
];

/// 解析测试局面
///
/// # Panics
///
/// 局面记谱无效时 panic（库内局面均有测试保证）。
pub fn board(fen: &str) -> Board {
    match parse_fen(fen) {
        Ok(state) => state.board,
        Err(e) => panic!("invalid test position {}: {}", fen, e),
    }
}

/// 所有命名局面的棋盘
pub fn all_boards() -> Vec<Board> {
    ALL_POSITIONS
        .iter()
        .filter_map(|(_, fen)| parse_fen(fen).ok())
        .map(|state| state.board)
        .collect()
}
