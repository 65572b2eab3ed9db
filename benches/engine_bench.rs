//! 引擎性能测试
//!
//! 走法生成、提子结算、局面评估与搜索

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hnefatafl_ai::test_positions;
use hnefatafl_ai::{evaluate, Board, Difficulty, MinimaxAI, SearchLimits, Side};

fn bench_legal_moves(c: &mut Criterion) {
    let board = Board::initial();

    c.bench_function("legal_moves_initial", |b| {
        b.iter(|| black_box(board.legal_moves(Side::Attackers).count()))
    });

    let mid = test_positions::board(test_positions::MID_1);
    c.bench_function("legal_moves_both_sides_mid", |b| {
        b.iter(|| {
            let attackers = mid.legal_moves(Side::Attackers).count();
            let defenders = mid.legal_moves(Side::Defenders).count();
            black_box((attackers, defenders))
        })
    });
}

fn bench_make_all_moves(c: &mut Criterion) {
    let board = test_positions::board(test_positions::MID_1);

    c.bench_function("make_move_all_attackers_mid", |b| {
        b.iter(|| {
            let captured: usize = board
                .legal_moves(Side::Attackers)
                .filter_map(|mv| board.make_move(mv))
                .map(|outcome| outcome.captured.len())
                .sum();
            black_box(captured)
        })
    });
}

fn bench_evaluate(c: &mut Criterion) {
    let board = Board::initial();
    let profile = Difficulty::Expert.profile();

    c.bench_function("evaluate_initial", |b| {
        b.iter(|| black_box(evaluate(&board, Side::Defenders, profile)))
    });
}

fn bench_search(c: &mut Criterion) {
    let board = Board::initial();
    let mut group = c.benchmark_group("search");
    group.sample_size(10);

    for difficulty in [Difficulty::Easy, Difficulty::Medium] {
        group.bench_function(difficulty.name(), |b| {
            b.iter(|| {
                let mut ai = MinimaxAI::new(difficulty.profile(), Some(1));
                black_box(ai.choose_move(&board, Side::Defenders))
            })
        });
    }

    group.bench_function("expert_50k_nodes", |b| {
        b.iter(|| {
            let mut ai = MinimaxAI::new(Difficulty::Expert.profile(), Some(1)).with_limits(
                SearchLimits {
                    node_budget: Some(50_000),
                    time_limit: None,
                },
            );
            black_box(ai.choose_move(&board, Side::Attackers))
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_legal_moves,
    bench_make_all_moves,
    bench_evaluate,
    bench_search,
);
criterion_main!(benches);
