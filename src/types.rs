//! 维京棋核心类型定义
//!
//! 定义 11×11 Hnefatafl 中所有基础数据类型

use serde::{Deserialize, Serialize};
use std::fmt;

/// 棋盘边长
pub const BOARD_SIZE: i8 = 11;

/// 格子总数
pub const SQUARE_COUNT: usize = (BOARD_SIZE as usize) * (BOARD_SIZE as usize);

/// 王座所在的行列（中心格）
pub const THRONE_INDEX: i8 = BOARD_SIZE / 2;

/// 阵营
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Attackers,
    Defenders,
}

impl Side {
    /// 获取对方阵营
    pub fn opposite(&self) -> Side {
        match self {
            Side::Attackers => Side::Defenders,
            Side::Defenders => Side::Attackers,
        }
    }

    /// 从记谱字符解析
    pub fn from_fen_char(c: char) -> Option<Side> {
        match c {
            'a' => Some(Side::Attackers),
            'd' => Some(Side::Defenders),
            _ => None,
        }
    }

    /// 转换为记谱字符
    pub fn to_fen_char(&self) -> char {
        match self {
            Side::Attackers => 'a',
            Side::Defenders => 'd',
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Attackers => write!(f, "Attackers"),
            Side::Defenders => write!(f, "Defenders"),
        }
    }
}

/// 格子上的棋子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    #[default]
    Empty,
    /// 攻方士兵
    Attacker,
    /// 守方士兵
    Defender,
    /// 国王（属于守方）
    King,
}

impl PieceKind {
    /// 棋子所属阵营，空格为 None
    #[inline]
    pub fn side(&self) -> Option<Side> {
        match self {
            PieceKind::Empty => None,
            PieceKind::Attacker => Some(Side::Attackers),
            PieceKind::Defender | PieceKind::King => Some(Side::Defenders),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        *self == PieceKind::Empty
    }

    /// 两个棋子是否同属一方（空格与任何棋子都不同方）
    #[inline]
    pub fn is_same_side(&self, other: PieceKind) -> bool {
        match (self.side(), other.side()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// 从记谱字符解析（空格不由单个字符表示）
    pub fn from_fen_char(c: char) -> Option<PieceKind> {
        match c {
            'a' => Some(PieceKind::Attacker),
            'd' => Some(PieceKind::Defender),
            'k' => Some(PieceKind::King),
            _ => None,
        }
    }

    /// 转换为记谱字符
    pub fn to_fen_char(&self) -> char {
        match self {
            PieceKind::Empty => '.',
            PieceKind::Attacker => 'a',
            PieceKind::Defender => 'd',
            PieceKind::King => 'k',
        }
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PieceKind::Empty => "Empty",
            PieceKind::Attacker => "Attacker",
            PieceKind::Defender => "Defender",
            PieceKind::King => "King",
        };
        write!(f, "{}", name)
    }
}

/// 特殊格类型（由坐标推导，不单独存储）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SquareKind {
    Normal,
    Throne,
    Corner,
}

/// 棋盘位置 (row, col)
///
/// row: 0-10 (0 是上边线)
/// col: 0-10 (从左到右)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: i8,
    pub col: i8,
}

impl Position {
    pub const fn new(row: i8, col: i8) -> Self {
        Position { row, col }
    }

    /// 检查位置是否在棋盘范围内
    #[inline]
    pub fn is_valid(&self) -> bool {
        (0..BOARD_SIZE).contains(&self.row) && (0..BOARD_SIZE).contains(&self.col)
    }

    /// 特殊格类型
    pub fn square_kind(&self) -> SquareKind {
        if self.is_corner() {
            SquareKind::Corner
        } else if self.is_throne() {
            SquareKind::Throne
        } else {
            SquareKind::Normal
        }
    }

    /// 是否是四个角之一
    #[inline]
    pub fn is_corner(&self) -> bool {
        let last = BOARD_SIZE - 1;
        (self.row == 0 || self.row == last) && (self.col == 0 || self.col == last)
    }

    /// 是否是王座
    #[inline]
    pub fn is_throne(&self) -> bool {
        self.row == THRONE_INDEX && self.col == THRONE_INDEX
    }

    /// 位置加偏移量（结果可能越界，调用方需检查）
    #[inline]
    pub fn offset(&self, row_delta: i8, col_delta: i8) -> Position {
        Position {
            row: self.row + row_delta,
            col: self.col + col_delta,
        }
    }

    /// 转换为数组下标（调用方保证位置合法）
    #[inline]
    pub fn to_index(&self) -> usize {
        self.row as usize * BOARD_SIZE as usize + self.col as usize
    }

    #[inline]
    pub fn from_index(idx: usize) -> Position {
        Position {
            row: (idx / BOARD_SIZE as usize) as i8,
            col: (idx % BOARD_SIZE as usize) as i8,
        }
    }

    /// 四个角的坐标
    pub fn corners() -> [Position; 4] {
        let last = BOARD_SIZE - 1;
        [
            Position::new(0, 0),
            Position::new(0, last),
            Position::new(last, 0),
            Position::new(last, last),
        ]
    }

    /// 王座坐标
    pub const fn throne() -> Position {
        Position::new(THRONE_INDEX, THRONE_INDEX)
    }

    /// 曼哈顿距离
    pub fn manhattan(&self, other: Position) -> i32 {
        (self.row as i32 - other.row as i32).abs() + (self.col as i32 - other.col as i32).abs()
    }

    /// 从坐标字符串解析（如 "f6"，列 a-k，行 0-10）
    pub fn from_fen_str(s: &str) -> Option<Position> {
        let mut chars = s.chars();
        let col = match chars.next()? {
            c @ 'a'..='k' => (c as u8 - b'a') as i8,
            _ => return None,
        };
        let digits = chars.as_str();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let row: i8 = digits.parse().ok()?;
        let pos = Position { row, col };
        pos.is_valid().then_some(pos)
    }

    /// 转换为坐标字符串
    pub fn to_fen_str(&self) -> String {
        let col_char = (b'a' + self.col as u8) as char;
        format!("{}{}", col_char, self.row)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_fen_str())
    }
}

/// 走法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub from: Position,
    pub to: Position,
}

impl Move {
    pub const fn new(from: Position, to: Position) -> Self {
        Move { from, to }
    }

    /// 从走法字符串解析，格式 `f2f4` 或 `a10a7`
    pub fn from_fen_str(s: &str) -> Option<Move> {
        let s = s.trim();
        // 第二个字母是目标列
        let split = s
            .char_indices()
            .skip(1)
            .find(|(_, c)| c.is_ascii_alphabetic())
            .map(|(i, _)| i)?;
        let from = Position::from_fen_str(&s[..split])?;
        let to = Position::from_fen_str(&s[split..])?;
        Some(Move { from, to })
    }

    pub fn to_fen_str(&self) -> String {
        format!("{}{}", self.from.to_fen_str(), self.to.to_fen_str())
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_fen_str())
    }
}

/// 胜负原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WinReason {
    KingCaptured,
    KingEscaped,
    AttackersEliminated,
}

impl fmt::Display for WinReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            WinReason::KingCaptured => "King captured",
            WinReason::KingEscaped => "King escaped",
            WinReason::AttackersEliminated => "All attackers eliminated",
        };
        write!(f, "{}", text)
    }
}

/// 游戏结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameResult {
    Ongoing,
    Decided { winner: Side, reason: WinReason },
}

impl GameResult {
    #[inline]
    pub fn is_decided(&self) -> bool {
        matches!(self, GameResult::Decided { .. })
    }

    pub fn winner(&self) -> Option<Side> {
        match self {
            GameResult::Ongoing => None,
            GameResult::Decided { winner, .. } => Some(*winner),
        }
    }
}
