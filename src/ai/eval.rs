//! 局面评估
//!
//! 分数以 `perspective` 一方为正，完全由局面和难度配置决定，不含随机性。

use super::DifficultyProfile;
use crate::board::Board;
use crate::types::{PieceKind, Position, Side, BOARD_SIZE};

/// 各项评估分解
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EvalDetail {
    /// 国王在场的固定加分（不随视角取反）
    pub king: i32,
    /// 士兵子力差
    pub material: i32,
    /// 国王离最近角格的距离项
    pub king_corner: i32,
    /// 王座周围 3×3 的控制
    pub center_control: i32,
}

impl EvalDetail {
    #[inline]
    pub fn total(&self) -> i32 {
        self.king + self.material + self.king_corner + self.center_control
    }
}

/// 评估局面
pub fn evaluate(board: &Board, perspective: Side, profile: &DifficultyProfile) -> i32 {
    evaluate_detail(board, perspective, profile).total()
}

/// 评估局面并返回各项明细
pub fn evaluate_detail(board: &Board, perspective: Side, profile: &DifficultyProfile) -> EvalDetail {
    let mut detail = EvalDetail::default();
    let sign = |side: Side| if side == perspective { 1 } else { -1 };
    let mut king_pos = None;

    for (pos, kind) in board.pieces() {
        match kind {
            PieceKind::King => {
                king_pos = Some(pos);
                detail.king += profile.piece_value(PieceKind::King);
            }
            PieceKind::Attacker => {
                detail.material += sign(Side::Attackers) * profile.piece_value(kind);
            }
            PieceKind::Defender => {
                detail.material += sign(Side::Defenders) * profile.piece_value(kind);
            }
            PieceKind::Empty => {}
        }
    }

    // 国王离角越近对守方越有利
    if let Some(king) = king_pos {
        let min_distance = Position::corners()
            .iter()
            .map(|&corner| king.manhattan(corner))
            .min()
            .unwrap_or(0);
        let distance_score = profile.king_to_corner_weight * (BOARD_SIZE as i32 - min_distance);
        detail.king_corner = sign(Side::Defenders) * distance_score;
    }

    // 中心控制：攻方子数减守方（含国王）子数
    let throne = Position::throne();
    let mut balance = 0;
    for dr in -1..=1 {
        for dc in -1..=1 {
            match board.get(throne.offset(dr, dc)) {
                Some(PieceKind::Attacker) => balance += 1,
                Some(PieceKind::Defender) | Some(PieceKind::King) => balance -= 1,
                _ => {}
            }
        }
    }
    detail.center_control = sign(Side::Attackers) * profile.center_control_weight * balance;

    detail
}
