//! Minimax AI 策略

use super::{evaluate, sort_and_truncate, DifficultyProfile, ScoredMove, SearchLimits, SearchStats};
use crate::board::Board;
use crate::types::{GameResult, Move, Side};
use rand::prelude::*;
use std::time::Instant;

/// 终局分数
pub const WIN_SCORE: i32 = 10000;

/// 随机扰动的总跨度：偏移为 (U[0,1) - 0.5) × randomness × NOISE_SCALE，
/// 即落在 ±randomness × NOISE_SCALE / 2 之内
const NOISE_SCALE: f64 = 1000.0;

/// Minimax AI - 使用 Alpha-Beta 剪枝
///
/// 整棵树都以根节点行棋方为视角打分。
pub struct MinimaxAI {
    profile: DifficultyProfile,
    rng: StdRng,
    limits: SearchLimits,
    stats: SearchStats,
}

impl MinimaxAI {
    pub fn new(profile: &DifficultyProfile, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        MinimaxAI {
            profile: profile.clone(),
            rng,
            limits: SearchLimits::default(),
            stats: SearchStats::default(),
        }
    }

    pub fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn profile(&self) -> &DifficultyProfile {
        &self.profile
    }

    /// 上一次搜索的统计
    pub fn last_stats(&self) -> SearchStats {
        self.stats
    }

    /// 选择最佳走法
    pub fn choose_move(&mut self, board: &Board, side: Side) -> Option<Move> {
        self.select_moves(board, side, 1).first().map(|sm| sm.mv)
    }

    /// 对根节点每个走法评分，返回分数最高的 n 个
    pub fn select_moves(&mut self, board: &Board, side: Side, n: usize) -> Vec<ScoredMove> {
        let mut search = Search {
            profile: &self.profile,
            perspective: side,
            limits: self.limits,
            start: Instant::now(),
            nodes: 0,
            cut_off: false,
        };
        let depth = self.profile.search_depth.saturating_sub(1);
        let randomness = self.profile.randomness;

        let mut scored: Vec<ScoredMove> = Vec::new();
        for mv in board.legal_moves(side) {
            // 超出限制时用已评分的走法
            if !scored.is_empty() && search.exhausted() {
                search.cut_off = true;
                break;
            }
            let Some(outcome) = board.make_move(mv) else {
                continue;
            };

            let eval = search.minimax(&outcome.board, depth, false, i32::MIN, i32::MAX);
            let noise = if randomness > 0.0 {
                (self.rng.gen::<f64>() - 0.5) * randomness * NOISE_SCALE
            } else {
                0.0
            };
            log::trace!("root {} eval={} noise={:.1}", mv, eval, noise);

            scored.push(ScoredMove {
                mv,
                eval,
                score: eval as f64 + noise,
            });
        }

        self.stats = SearchStats {
            nodes: search.nodes,
            elapsed: search.start.elapsed(),
            cut_off: search.cut_off,
        };

        sort_and_truncate(&mut scored, n);
        if let Some(best) = scored.first() {
            log::debug!(
                "{} search depth={} best={} eval={} nodes={} cut_off={}",
                side,
                self.profile.search_depth,
                best.mv,
                best.eval,
                self.stats.nodes,
                self.stats.cut_off
            );
        } else {
            log::debug!("{} has no legal move", side);
        }
        scored
    }
}

/// 单次搜索的状态
struct Search<'a> {
    profile: &'a DifficultyProfile,
    perspective: Side,
    limits: SearchLimits,
    start: Instant,
    nodes: u64,
    cut_off: bool,
}

impl Search<'_> {
    /// 是否已超出节点数或时间限制
    fn exhausted(&self) -> bool {
        if let Some(budget) = self.limits.node_budget {
            if self.nodes >= budget {
                return true;
            }
        }
        match self.limits.time_limit {
            Some(limit) => self.start.elapsed() >= limit,
            None => false,
        }
    }

    fn minimax(
        &mut self,
        board: &Board,
        depth: u32,
        maximizing: bool,
        mut alpha: i32,
        mut beta: i32,
    ) -> i32 {
        self.nodes += 1;

        if let GameResult::Decided { winner, .. } = board.evaluate_game_result() {
            return if winner == self.perspective {
                WIN_SCORE
            } else {
                -WIN_SCORE
            };
        }

        if depth == 0 {
            return evaluate(board, self.perspective, self.profile);
        }
        if self.exhausted() {
            self.cut_off = true;
            return evaluate(board, self.perspective, self.profile);
        }

        let to_move = if maximizing {
            self.perspective
        } else {
            self.perspective.opposite()
        };
        let mut moves = board.legal_moves(to_move).peekable();
        if moves.peek().is_none() {
            return evaluate(board, self.perspective, self.profile);
        }

        if maximizing {
            let mut max_eval = i32::MIN;
            for mv in moves {
                let Some(outcome) = board.make_move(mv) else {
                    continue;
                };
                let eval = self.minimax(&outcome.board, depth - 1, false, alpha, beta);
                max_eval = max_eval.max(eval);
                alpha = alpha.max(eval);
                if beta <= alpha {
                    break; // Beta 剪枝
                }
            }
            max_eval
        } else {
            let mut min_eval = i32::MAX;
            for mv in moves {
                let Some(outcome) = board.make_move(mv) else {
                    continue;
                };
                let eval = self.minimax(&outcome.board, depth - 1, true, alpha, beta);
                min_eval = min_eval.min(eval);
                beta = beta.min(eval);
                if beta <= alpha {
                    break; // Alpha 剪枝
                }
            }
            min_eval
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{choose_move, Difficulty};
    use crate::test_positions;
    use crate::types::{PieceKind, Position};

    #[test]
    fn test_single_legal_move_is_chosen() {
        let board = test_positions::board(test_positions::ONE_ATTACKER_MOVE);
        let moves: Vec<Move> = board.legal_moves(Side::Attackers).collect();
        assert_eq!(moves.len(), 1);

        let mut profile = Difficulty::Easy.profile().clone();
        profile.search_depth = 2;
        let mut ai = MinimaxAI::new(&profile, Some(1));
        assert_eq!(ai.choose_move(&board, Side::Attackers), Some(moves[0]));
    }

    #[test]
    fn test_no_pieces_returns_none() {
        let mut board = Board::empty();
        board.set(Position::new(5, 5), PieceKind::King);
        board.set(Position::new(3, 3), PieceKind::Defender);

        assert_eq!(board.legal_moves(Side::Attackers).count(), 0);
        assert_eq!(
            choose_move(&board, Side::Attackers, Difficulty::Easy.profile()),
            None
        );
    }

    #[test]
    fn test_attackers_capture_king() {
        let board = test_positions::board(test_positions::KING_IN_DANGER);
        let mut ai = MinimaxAI::new(Difficulty::Easy.profile(), Some(3));
        let best = ai.select_moves(&board, Side::Attackers, 1)[0];

        assert_eq!(best.eval, WIN_SCORE);
        let outcome = board.play(best.mv).unwrap();
        assert!(outcome.board.find_king().is_none());
    }

    #[test]
    fn test_king_escapes() {
        let board = test_positions::board(test_positions::KING_ESCAPE);
        let mut ai = MinimaxAI::new(Difficulty::Medium.profile(), Some(5));
        let mv = ai.choose_move(&board, Side::Defenders).unwrap();

        assert_eq!(mv.from, Position::new(2, 0));
        assert!(mv.to.is_corner());
    }

    #[test]
    fn test_expert_is_deterministic() {
        let board = Board::initial();
        let mut profile = Difficulty::Expert.profile().clone();
        profile.search_depth = 2;

        let first = MinimaxAI::new(&profile, Some(1)).choose_move(&board, Side::Defenders);
        let second = MinimaxAI::new(&profile, Some(99)).choose_move(&board, Side::Defenders);
        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[test]
    fn test_seeded_randomness_repeats() {
        let board = Board::initial();
        let profile = Difficulty::Easy.profile();

        let a = MinimaxAI::new(profile, Some(42)).select_moves(&board, Side::Defenders, 5);
        let b = MinimaxAI::new(profile, Some(42)).select_moves(&board, Side::Defenders, 5);
        let a: Vec<Move> = a.iter().map(|s| s.mv).collect();
        let b: Vec<Move> = b.iter().map(|s| s.mv).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_noise_is_bounded() {
        let board = Board::initial();
        let profile = Difficulty::Easy.profile();
        let mut ai = MinimaxAI::new(profile, Some(11));
        let bound = profile.randomness * NOISE_SCALE / 2.0;

        for sm in ai.select_moves(&board, Side::Defenders, usize::MAX) {
            assert!((sm.score - sm.eval as f64).abs() <= bound);
        }
    }

    #[test]
    fn test_node_budget_falls_back() {
        let board = Board::initial();
        let mut ai = MinimaxAI::new(Difficulty::Expert.profile(), None).with_limits(SearchLimits {
            node_budget: Some(50),
            time_limit: None,
        });
        let mv = ai.choose_move(&board, Side::Attackers).unwrap();

        assert!(board.is_legal_move(mv.from, mv.to));
        assert!(ai.last_stats().cut_off);
    }

    #[test]
    fn test_select_moves_sorted() {
        let board = Board::initial();
        let mut ai = MinimaxAI::new(Difficulty::Easy.profile(), Some(8));
        let scored = ai.select_moves(&board, Side::Attackers, 10);

        assert_eq!(scored.len(), 10);
        for pair in scored.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }
}
