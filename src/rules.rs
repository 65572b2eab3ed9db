//! 规则变体、提子结算与胜负判定
//!
//! 历史上流传着多套互不兼容的规则，这里把每个分歧点做成显式配置，
//! 一盘棋只使用一套 `RuleSet`。

use crate::board::Board;
use crate::types::{GameResult, PieceKind, Position, Side, WinReason};

/// 王座能否被普通棋子占据
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThroneEntry {
    /// 王座是普通格，任何棋子都可停留
    Open,
    /// 只有国王可以停在王座
    KingOnly,
}

/// 王座是否充当夹击的一侧
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThroneHostility {
    Never,
    /// 王座空着时对双方都有敌意
    WhenEmpty,
}

/// 国王的被吃条件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KingCapture {
    /// 与普通棋子一样两面夹击（只有攻方能吃王）
    Sandwich,
    /// 四面都被攻方或敌意格包围
    Surrounded,
}

/// 一套完整的规则
///
/// 角格始终对双方有敌意，只有站在角上时才能借棋盘边缘提子，
/// 这两点在各变体中一致，不做配置。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuleSet {
    pub throne_entry: ThroneEntry,
    pub throne_hostility: ThroneHostility,
    pub king_capture: KingCapture,
}

impl RuleSet {
    /// 默认规则：王座是普通格，国王两面夹击即被吃
    pub const STANDARD: RuleSet = RuleSet {
        throne_entry: ThroneEntry::Open,
        throne_hostility: ThroneHostility::Never,
        king_capture: KingCapture::Sandwich,
    };

    /// 严格规则：王座只属于国王，空王座有敌意，国王需四面包围
    pub const STRICT: RuleSet = RuleSet {
        throne_entry: ThroneEntry::KingOnly,
        throne_hostility: ThroneHostility::WhenEmpty,
        king_capture: KingCapture::Surrounded,
    };

    /// 按名称查找规则
    pub fn from_name(name: &str) -> Option<RuleSet> {
        match name.to_lowercase().as_str() {
            "standard" => Some(RuleSet::STANDARD),
            "strict" => Some(RuleSet::STRICT),
            _ => None,
        }
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        RuleSet::STANDARD
    }
}

const DIRECTIONS: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

impl Board {
    /// 夹击另一侧的格子是否站在 `moving` 一方
    ///
    /// 调用方保证 `pos` 在棋盘内。
    fn is_hostile_anchor(&self, pos: Position, moving: PieceKind) -> bool {
        let Some(occupant) = self.get(pos) else {
            return false;
        };
        if occupant.is_same_side(moving) || pos.is_corner() {
            return true;
        }
        pos.is_throne()
            && occupant.is_empty()
            && self.rules().throne_hostility == ThroneHostility::WhenEmpty
    }

    /// 国王是否四面被围（棋盘边缘不算包围）
    fn is_king_surrounded(&self, king: Position) -> bool {
        DIRECTIONS.iter().all(|&(dr, dc)| {
            let pos = king.offset(dr, dc);
            pos.is_valid() && self.is_hostile_anchor(pos, PieceKind::Attacker)
        })
    }

    /// 计算棋子落在 `landed_at` 后被提掉的敌子
    ///
    /// 棋盘应已反映本次走子；函数本身不修改棋盘，由调用方清空返回的格子。
    pub fn resolve_captures(&self, landed_at: Position, moving: PieceKind) -> Vec<Position> {
        let mut captured = Vec::with_capacity(4);
        if moving.side().is_none() || !landed_at.is_valid() {
            return captured;
        }

        for (dr, dc) in DIRECTIONS {
            let target = landed_at.offset(dr, dc);
            let victim = match self.get(target) {
                Some(kind) if !kind.is_empty() && !kind.is_same_side(moving) => kind,
                _ => continue,
            };

            let far = target.offset(dr, dc);
            let sandwiched = if far.is_valid() {
                self.is_hostile_anchor(far, moving)
            } else {
                // 借边缘提子只在落点是角格时成立
                landed_at.is_corner()
            };

            let is_captured = if victim == PieceKind::King {
                // 守方夹住自己的国王不算
                moving == PieceKind::Attacker
                    && match self.rules().king_capture {
                        KingCapture::Sandwich => sandwiched,
                        KingCapture::Surrounded => self.is_king_surrounded(target),
                    }
            } else {
                sandwiched
            };

            if is_captured {
                captured.push(target);
            }
        }

        captured
    }

    /// 判断对局结果
    ///
    /// 国王无路可走不判负（未实现的困毙规则），见 `king_can_move`。
    pub fn evaluate_game_result(&self) -> GameResult {
        let mut king = None;
        let mut has_attackers = false;
        for (pos, kind) in self.pieces() {
            match kind {
                PieceKind::King => king = Some(pos),
                PieceKind::Attacker => has_attackers = true,
                _ => {}
            }
        }

        match king {
            None => GameResult::Decided {
                winner: Side::Attackers,
                reason: WinReason::KingCaptured,
            },
            Some(pos) if pos.is_corner() => GameResult::Decided {
                winner: Side::Defenders,
                reason: WinReason::KingEscaped,
            },
            Some(_) if !has_attackers => GameResult::Decided {
                winner: Side::Defenders,
                reason: WinReason::AttackersEliminated,
            },
            Some(_) => GameResult::Ongoing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_positions;
    use crate::types::Move;

    fn board_with(rules: RuleSet, pieces: &[(i8, i8, PieceKind)]) -> Board {
        let mut board = Board::empty_with_rules(rules);
        for &(row, col, kind) in pieces {
            board.set(Position::new(row, col), kind);
        }
        board
    }

    #[test]
    fn test_sandwich_capture_on_throne_landing() {
        // 守方在 (5,4)，攻方在 (5,3)，另一攻方落在 (5,5)
        let board = board_with(
            RuleSet::STANDARD,
            &[
                (5, 4, PieceKind::Defender),
                (5, 3, PieceKind::Attacker),
                (5, 5, PieceKind::Attacker),
                (0, 2, PieceKind::King),
            ],
        );
        let captured = board.resolve_captures(Position::new(5, 5), PieceKind::Attacker);
        assert_eq!(captured, vec![Position::new(5, 4)]);
    }

    #[test]
    fn test_no_capture_without_anchor() {
        let board = board_with(
            RuleSet::STANDARD,
            &[
                (3, 4, PieceKind::Defender),
                (3, 5, PieceKind::Attacker),
                (0, 2, PieceKind::King),
            ],
        );
        assert!(board
            .resolve_captures(Position::new(3, 5), PieceKind::Attacker)
            .is_empty());
    }

    #[test]
    fn test_corner_is_hostile() {
        // 攻方落在 (0,2)，把 (0,1) 的守方夹在角格上
        let board = board_with(
            RuleSet::STANDARD,
            &[
                (0, 1, PieceKind::Defender),
                (0, 2, PieceKind::Attacker),
                (5, 5, PieceKind::King),
            ],
        );
        let captured = board.resolve_captures(Position::new(0, 2), PieceKind::Attacker);
        assert_eq!(captured, vec![Position::new(0, 1)]);
    }

    #[test]
    fn test_board_edge_is_not_hostile() {
        // 守方落在 (1,3)，攻方 (0,3) 的远端越界；落点不是角格，不提
        let board = board_with(
            RuleSet::STANDARD,
            &[
                (0, 3, PieceKind::Attacker),
                (1, 3, PieceKind::Defender),
                (5, 5, PieceKind::King),
            ],
        );
        assert!(board
            .resolve_captures(Position::new(1, 3), PieceKind::Defender)
            .is_empty());
    }

    #[test]
    fn test_defenders_cannot_capture_king_side() {
        let board = board_with(
            RuleSet::STANDARD,
            &[
                (4, 4, PieceKind::King),
                (4, 3, PieceKind::Defender),
                (4, 5, PieceKind::Defender),
                (0, 2, PieceKind::Attacker),
            ],
        );
        assert!(board
            .resolve_captures(Position::new(4, 5), PieceKind::Defender)
            .is_empty());
    }

    #[test]
    fn test_king_sandwich_standard() {
        let board = board_with(
            RuleSet::STANDARD,
            &[
                (4, 4, PieceKind::King),
                (4, 3, PieceKind::Attacker),
                (4, 5, PieceKind::Attacker),
            ],
        );
        let captured = board.resolve_captures(Position::new(4, 5), PieceKind::Attacker);
        assert_eq!(captured, vec![Position::new(4, 4)]);
    }

    #[test]
    fn test_king_needs_four_sides_in_strict() {
        let two_sides = board_with(
            RuleSet::STRICT,
            &[
                (4, 4, PieceKind::King),
                (4, 3, PieceKind::Attacker),
                (4, 5, PieceKind::Attacker),
            ],
        );
        assert!(two_sides
            .resolve_captures(Position::new(4, 5), PieceKind::Attacker)
            .is_empty());

        let four_sides = board_with(
            RuleSet::STRICT,
            &[
                (4, 4, PieceKind::King),
                (4, 3, PieceKind::Attacker),
                (4, 5, PieceKind::Attacker),
                (3, 4, PieceKind::Attacker),
                (5, 4, PieceKind::Attacker),
            ],
        );
        let captured = four_sides.resolve_captures(Position::new(5, 4), PieceKind::Attacker);
        assert_eq!(captured, vec![Position::new(4, 4)]);
    }

    #[test]
    fn test_king_next_to_empty_throne_in_strict() {
        // 国王在 (4,5)，下方 (5,5) 是空王座，三面攻方即可
        let board = board_with(
            RuleSet::STRICT,
            &[
                (4, 5, PieceKind::King),
                (3, 5, PieceKind::Attacker),
                (4, 4, PieceKind::Attacker),
                (4, 6, PieceKind::Attacker),
            ],
        );
        let captured = board.resolve_captures(Position::new(4, 6), PieceKind::Attacker);
        assert_eq!(captured, vec![Position::new(4, 5)]);
    }

    #[test]
    fn test_empty_throne_hostility() {
        // 守方在 (5,6)，空王座在 (5,5)，攻方落在 (5,7)
        let pieces = [
            (5, 6, PieceKind::Defender),
            (5, 7, PieceKind::Attacker),
            (0, 2, PieceKind::King),
        ];
        let standard = board_with(RuleSet::STANDARD, &pieces);
        assert!(standard
            .resolve_captures(Position::new(5, 7), PieceKind::Attacker)
            .is_empty());

        let strict = board_with(RuleSet::STRICT, &pieces);
        assert_eq!(
            strict.resolve_captures(Position::new(5, 7), PieceKind::Attacker),
            vec![Position::new(5, 6)]
        );
    }

    #[test]
    fn test_multiple_captures() {
        let board = board_with(
            RuleSet::STANDARD,
            &[
                (3, 3, PieceKind::Attacker),
                (2, 3, PieceKind::Defender),
                (1, 3, PieceKind::Attacker),
                (3, 2, PieceKind::Defender),
                (3, 1, PieceKind::Attacker),
                (4, 3, PieceKind::Defender),
                (5, 5, PieceKind::King),
            ],
        );
        let captured = board.resolve_captures(Position::new(3, 3), PieceKind::Attacker);
        assert_eq!(captured, vec![Position::new(2, 3), Position::new(3, 2)]);
    }

    #[test]
    fn test_captures_never_hit_own_side() {
        for board in test_positions::all_boards() {
            for side in [Side::Attackers, Side::Defenders] {
                let moves: Vec<Move> = board.legal_moves(side).collect();
                for mv in moves {
                    let Some(piece) = board.get(mv.from) else {
                        continue;
                    };
                    let mut landed = board;
                    landed.set(mv.from, PieceKind::Empty);
                    landed.set(mv.to, piece);
                    for pos in landed.resolve_captures(mv.to, piece) {
                        assert_ne!(pos, mv.to);
                        assert_eq!(pos.manhattan(mv.to), 1);
                        let victim = landed.get(pos).unwrap();
                        assert!(!victim.is_empty());
                        assert!(!victim.is_same_side(piece));
                    }
                }
            }
        }
    }

    #[test]
    fn test_initial_board_is_ongoing() {
        let board = Board::initial();
        assert_eq!(board.find_king(), Some(Position::new(5, 5)));
        assert_eq!(board.evaluate_game_result(), GameResult::Ongoing);
    }

    #[test]
    fn test_king_captured() {
        let mut board = Board::initial();
        board.set(Position::new(5, 5), PieceKind::Empty);
        assert_eq!(
            board.evaluate_game_result(),
            GameResult::Decided {
                winner: Side::Attackers,
                reason: WinReason::KingCaptured
            }
        );
    }

    #[test]
    fn test_king_escaped() {
        let mut board = Board::empty();
        board.set(Position::new(0, 5), PieceKind::King);
        board.set(Position::new(3, 3), PieceKind::Attacker);
        let outcome = board
            .play(Move::new(Position::new(0, 5), Position::new(0, 10)))
            .unwrap();
        assert_eq!(
            outcome.board.evaluate_game_result(),
            GameResult::Decided {
                winner: Side::Defenders,
                reason: WinReason::KingEscaped
            }
        );
    }

    #[test]
    fn test_attackers_eliminated() {
        let mut board = Board::empty();
        board.set(Position::new(5, 5), PieceKind::King);
        board.set(Position::new(2, 2), PieceKind::Defender);
        assert_eq!(
            board.evaluate_game_result(),
            GameResult::Decided {
                winner: Side::Defenders,
                reason: WinReason::AttackersEliminated
            }
        );
    }

    #[test]
    fn test_game_result_is_pure() {
        for board in test_positions::all_boards() {
            assert_eq!(board.evaluate_game_result(), board.evaluate_game_result());
        }
    }

    #[test]
    fn test_immobile_king_is_not_a_loss() {
        let board = Board::initial();
        assert!(!board.king_can_move());
        assert_eq!(board.evaluate_game_result(), GameResult::Ongoing);
    }

    #[test]
    fn test_rule_set_from_name() {
        assert_eq!(RuleSet::from_name("Standard"), Some(RuleSet::STANDARD));
        assert_eq!(RuleSet::from_name("strict"), Some(RuleSet::STRICT));
        assert_eq!(RuleSet::from_name("copenhagen"), None);
    }
}
