//! AI 模块
//!
//! 难度只是数据：所有难度共用一套 minimax 搜索，由 `DifficultyProfile` 参数化。

mod eval;
mod minimax;

pub use eval::{evaluate, evaluate_detail, EvalDetail};
pub use minimax::{MinimaxAI, WIN_SCORE};

use crate::board::Board;
use crate::types::{Move, PieceKind, Side};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// 难度等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
    Expert,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Expert,
    ];

    /// 该难度对应的配置
    pub fn profile(&self) -> &'static DifficultyProfile {
        &PROFILES[self]
    }

    pub fn from_name(name: &str) -> Option<Difficulty> {
        match name.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            "expert" => Some(Difficulty::Expert),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Expert => "expert",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 难度配置（只读）
///
/// `capture_weight` 与 `mobility_weight` 随配置表一同保留，
/// 评估函数目前并不使用它们。
#[derive(Debug, Clone, PartialEq)]
pub struct DifficultyProfile {
    /// 搜索深度
    pub search_depth: u32,
    pub piece_values: HashMap<PieceKind, i32>,
    pub king_to_corner_weight: i32,
    pub center_control_weight: i32,
    pub capture_weight: i32,
    pub mobility_weight: f64,
    /// 随机性（0.0-1.0）
    pub randomness: f64,
}

impl DifficultyProfile {
    /// 棋子价值，未配置的为 0
    #[inline]
    pub fn piece_value(&self, kind: PieceKind) -> i32 {
        self.piece_values.get(&kind).copied().unwrap_or(0)
    }
}

#[allow(clippy::too_many_arguments)]
fn profile(
    search_depth: u32,
    king: i32,
    defender: i32,
    king_to_corner_weight: i32,
    center_control_weight: i32,
    mobility_weight: f64,
    capture_weight: i32,
    randomness: f64,
) -> DifficultyProfile {
    let piece_values = HashMap::from([
        (PieceKind::King, king),
        (PieceKind::Defender, defender),
        (PieceKind::Attacker, 1),
    ]);
    DifficultyProfile {
        search_depth,
        piece_values,
        king_to_corner_weight,
        center_control_weight,
        capture_weight,
        mobility_weight,
        randomness,
    }
}

lazy_static! {
    /// 各难度的配置表
    static ref PROFILES: HashMap<Difficulty, DifficultyProfile> = HashMap::from([
        (Difficulty::Easy, profile(2, 100, 3, 5, 1, 0.5, 2, 0.3)),
        (Difficulty::Medium, profile(3, 150, 4, 8, 2, 1.0, 3, 0.15)),
        (Difficulty::Hard, profile(4, 200, 5, 12, 3, 2.0, 4, 0.05)),
        (Difficulty::Expert, profile(5, 250, 6, 15, 4, 3.0, 5, 0.0)),
    ]);
}

/// 搜索限制（超出后退回静态评估，并在根节点采用已评分的最佳走法）
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchLimits {
    pub node_budget: Option<u64>,
    pub time_limit: Option<Duration>,
}

/// 搜索统计
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SearchStats {
    pub nodes: u64,
    pub elapsed: Duration,
    /// 是否因节点数或时间限制提前结束
    pub cut_off: bool,
}

impl SearchStats {
    pub fn nps(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.nodes as f64 / secs
        } else {
            0.0
        }
    }
}

/// 走法评分
#[derive(Debug, Clone, Copy)]
pub struct ScoredMove {
    pub mv: Move,
    /// 搜索得到的分数
    pub eval: i32,
    /// 加入随机扰动后的分数
    pub score: f64,
}

/// 按分数降序排序（稳定排序，同分保持枚举顺序）
pub(crate) fn sort_and_truncate(scored: &mut Vec<ScoredMove>, n: usize) {
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    scored.truncate(n);
}

/// 为 `side` 选择走法，无合法走法时返回 None
pub fn choose_move(board: &Board, side: Side, profile: &DifficultyProfile) -> Option<Move> {
    MinimaxAI::new(profile, None).choose_move(board, side)
}

/// 后台搜索的结果
#[derive(Debug, Clone, Copy)]
pub struct SearchReport {
    pub best: Option<ScoredMove>,
    pub stats: SearchStats,
}

/// 正在后台线程中进行的搜索
pub struct PendingSearch {
    receiver: Receiver<SearchReport>,
    handle: JoinHandle<()>,
}

impl PendingSearch {
    /// 非阻塞地查询结果；结果只会返回一次
    pub fn poll(&self) -> Option<SearchReport> {
        match self.receiver.try_recv() {
            Ok(report) => Some(report),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// 线程是否已结束
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// 阻塞等待结果，搜索线程异常退出时返回 None
    pub fn wait(self) -> Option<SearchReport> {
        let report = self.receiver.recv().ok();
        if self.handle.join().is_err() {
            log::error!("search thread panicked");
        }
        report
    }
}

/// 在后台线程中搜索，调用方可在等待期间继续响应用户操作
pub fn spawn_search(
    board: Board,
    side: Side,
    profile: DifficultyProfile,
    limits: SearchLimits,
    seed: Option<u64>,
) -> PendingSearch {
    let (sender, receiver) = mpsc::channel();
    let handle = thread::spawn(move || {
        let mut ai = MinimaxAI::new(&profile, seed).with_limits(limits);
        let best = ai.select_moves(&board, side, 1).into_iter().next();
        let report = SearchReport {
            best,
            stats: ai.last_stats(),
        };
        // 接收方已放弃结果时忽略
        let _ = sender.send(report);
    });
    PendingSearch { receiver, handle }
}
