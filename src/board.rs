//! 维京棋棋盘
//!
//! 棋盘是值类型：每次走子都生成新棋盘，搜索树的各分支互不干扰。

use crate::error::GameError;
use crate::rules::{RuleSet, ThroneEntry};
use crate::types::{Move, PieceKind, Position, Side, BOARD_SIZE, SQUARE_COUNT};
use std::fmt;

/// 走子结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    /// 走子并提子后的新棋盘
    pub board: Board,
    /// 被提掉的格子（互不相同，均与落点正交相邻）
    pub captured: Vec<Position>,
    pub mover: Side,
}

/// 11×11 棋盘
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    /// 121 个格子，行优先
    squares: [PieceKind; SQUARE_COUNT],
    rules: RuleSet,
}

impl Default for Board {
    fn default() -> Self {
        Board::initial()
    }
}

impl Board {
    /// 空棋盘（标准规则）
    pub fn empty() -> Board {
        Board::empty_with_rules(RuleSet::STANDARD)
    }

    pub fn empty_with_rules(rules: RuleSet) -> Board {
        Board {
            squares: [PieceKind::Empty; SQUARE_COUNT],
            rules,
        }
    }

    /// 初始局面（标准规则）
    ///
    /// 攻方占据四条边中段各五子，外加四个侧翼子；
    /// 守方十二子围成十字，国王居于王座。
    pub fn initial() -> Board {
        Board::initial_with_rules(RuleSet::STANDARD)
    }

    pub fn initial_with_rules(rules: RuleSet) -> Board {
        let mut board = Board::empty_with_rules(rules);
        let last = BOARD_SIZE - 1;

        for i in 3..=7 {
            board.set(Position::new(0, i), PieceKind::Attacker);
            board.set(Position::new(i, 0), PieceKind::Attacker);
            board.set(Position::new(i, last), PieceKind::Attacker);
            board.set(Position::new(last, i), PieceKind::Attacker);
        }
        for (row, col) in [(1, 5), (9, 5), (5, 1), (5, 9)] {
            board.set(Position::new(row, col), PieceKind::Attacker);
        }

        const DEFENDERS: [(i8, i8); 12] = [
            (3, 5),
            (4, 4),
            (4, 5),
            (4, 6),
            (5, 3),
            (5, 4),
            (5, 6),
            (5, 7),
            (6, 4),
            (6, 5),
            (6, 6),
            (7, 5),
        ];
        for (row, col) in DEFENDERS {
            board.set(Position::new(row, col), PieceKind::Defender);
        }

        board.set(Position::throne(), PieceKind::King);
        board
    }

    /// 当前使用的规则
    #[inline]
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// 获取某位置的棋子，越界返回 None
    #[inline]
    pub fn get(&self, pos: Position) -> Option<PieceKind> {
        if !pos.is_valid() {
            return None;
        }
        Some(self.squares[pos.to_index()])
    }

    /// 放置棋子（或用 `PieceKind::Empty` 清空）
    ///
    /// # Panics
    ///
    /// 位置越界时 panic：越界坐标属于调用方违约。
    pub fn set(&mut self, pos: Position, kind: PieceKind) {
        assert!(pos.is_valid(), "position {:?} is off the board", pos);
        self.squares[pos.to_index()] = kind;
    }

    #[inline]
    fn is_empty_at(&self, pos: Position) -> bool {
        self.get(pos) == Some(PieceKind::Empty)
    }

    /// 所有非空格子，行优先
    pub fn pieces(&self) -> impl Iterator<Item = (Position, PieceKind)> + '_ {
        self.squares
            .iter()
            .enumerate()
            .filter(|(_, kind)| !kind.is_empty())
            .map(|(i, &kind)| (Position::from_index(i), kind))
    }

    /// 某方的所有棋子
    pub fn pieces_of(&self, side: Side) -> impl Iterator<Item = (Position, PieceKind)> + '_ {
        self.pieces().filter(move |(_, kind)| kind.side() == Some(side))
    }

    /// 某种棋子的数量
    pub fn count(&self, kind: PieceKind) -> usize {
        self.squares.iter().filter(|&&k| k == kind).count()
    }

    /// 国王位置
    pub fn find_king(&self) -> Option<Position> {
        self.squares
            .iter()
            .position(|&k| k == PieceKind::King)
            .map(Position::from_index)
    }

    /// 判断走法是否合法
    ///
    /// 越界坐标一律判为不合法，不会越界访问。
    pub fn is_legal_move(&self, from: Position, to: Position) -> bool {
        let piece = match self.get(from) {
            Some(p) if !p.is_empty() => p,
            _ => return false,
        };

        // 目标必须在棋盘内且为空
        if !self.is_empty_at(to) {
            return false;
        }

        // 只能直线移动
        if from.row != to.row && from.col != to.col {
            return false;
        }

        // 路径不能有子
        let dr = (to.row - from.row).signum();
        let dc = (to.col - from.col).signum();
        let mut cur = from.offset(dr, dc);
        while cur != to {
            if !self.is_empty_at(cur) {
                return false;
            }
            cur = cur.offset(dr, dc);
        }

        // 只有国王能进角
        if to.is_corner() && piece != PieceKind::King {
            return false;
        }
        if to.is_throne()
            && self.rules.throne_entry == ThroneEntry::KingOnly
            && piece != PieceKind::King
        {
            return false;
        }

        true
    }

    /// 某方的所有合法走法（惰性迭代）
    ///
    /// 起点按行优先，同一起点的终点也按行优先。
    pub fn legal_moves(&self, side: Side) -> LegalMoves<'_> {
        LegalMoves {
            board: self,
            side,
            from: 0,
            to: 0,
        }
    }

    /// 某方是否还有合法走法
    pub fn has_legal_move(&self, side: Side) -> bool {
        self.legal_moves(side).next().is_some()
    }

    /// 某个棋子的所有合法落点（用于界面提示）
    pub fn legal_destinations(&self, from: Position) -> Vec<Position> {
        (0..SQUARE_COUNT)
            .map(Position::from_index)
            .filter(|&to| self.is_legal_move(from, to))
            .collect()
    }

    /// 执行走法并结算提子，返回新棋盘
    ///
    /// 不检查合法性（搜索使用），起点为空时返回 None。
    pub fn make_move(&self, mv: Move) -> Option<MoveOutcome> {
        let piece = self.get(mv.from)?;
        let mover = piece.side()?;
        if !mv.to.is_valid() {
            return None;
        }

        let mut next = *self;
        next.set(mv.from, PieceKind::Empty);
        next.set(mv.to, piece);

        let captured = next.resolve_captures(mv.to, piece);
        for &pos in &captured {
            next.set(pos, PieceKind::Empty);
        }

        Some(MoveOutcome {
            board: next,
            captured,
            mover,
        })
    }

    /// 校验后执行走法
    pub fn play(&self, mv: Move) -> Result<MoveOutcome, GameError> {
        if !self.is_legal_move(mv.from, mv.to) {
            return Err(GameError::IllegalMove { mv });
        }
        self.make_move(mv).ok_or(GameError::IllegalMove { mv })
    }

    /// 国王是否能向相邻格移动一步
    ///
    /// 仅作诊断，不参与胜负判定。
    pub fn king_can_move(&self) -> bool {
        let Some(king) = self.find_king() else {
            return false;
        };
        [(1, 0), (-1, 0), (0, 1), (0, -1)]
            .into_iter()
            .any(|(dr, dc)| self.is_legal_move(king, king.offset(dr, dc)))
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "    ")?;
        for col in 0..BOARD_SIZE {
            write!(f, " {}", (b'a' + col as u8) as char)?;
        }
        writeln!(f)?;
        for row in 0..BOARD_SIZE {
            write!(f, "{:>3} ", row)?;
            for col in 0..BOARD_SIZE {
                let pos = Position::new(row, col);
                let ch = match self.squares[pos.to_index()] {
                    PieceKind::Empty if pos.is_corner() || pos.is_throne() => '#',
                    kind => kind.to_fen_char(),
                };
                write!(f, " {}", ch)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Board ({:?})", self.rules)?;
        fmt::Display::fmt(self, f)
    }
}

/// 合法走法迭代器
///
/// 不持有额外状态，可随时通过 `Board::legal_moves` 重新开始。
pub struct LegalMoves<'a> {
    board: &'a Board,
    side: Side,
    from: usize,
    to: usize,
}

impl Iterator for LegalMoves<'_> {
    type Item = Move;

    fn next(&mut self) -> Option<Move> {
        while self.from < SQUARE_COUNT {
            if self.board.squares[self.from].side() == Some(self.side) {
                let from = Position::from_index(self.from);
                while self.to < SQUARE_COUNT {
                    let to = Position::from_index(self.to);
                    self.to += 1;
                    if (to.row == from.row || to.col == from.col)
                        && self.board.is_legal_move(from, to)
                    {
                        return Some(Move::new(from, to));
                    }
                }
            }
            self.from += 1;
            self.to = 0;
        }
        None
    }
}
