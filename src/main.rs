//! Hnefatafl AI CLI
//!
//! 命令行界面，用于对弈和测试 AI
//!
//! 支持三种模式：
//! 1. 单次命令模式：每次执行一个命令
//! 2. 对局模式：在终端里人机/双人对弈，每步自动存档
//! 3. Server 模式：长驻进程，通过 stdin/stdout 通信

use clap::{Parser, Subcommand};
use hnefatafl_ai::{
    apply_move_to_fen_with_rules, board_to_fen, evaluate, evaluate_detail, parse_fen_with_rules,
    spawn_search, Difficulty, Game, GameMode, GameResult, MinimaxAI, Move, PieceKind, Position,
    RuleSet, SaveError, SaveState, ScoredMove, SearchLimits, SearchStats, Side,
};
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "hnefatafl-ai")]
#[command(about = "Hnefatafl (11x11) AI Engine", long_about = None)]
struct Cli {
    /// 规则 (standard, strict)
    #[arg(long, global = true, default_value = "standard")]
    rules: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 获取合法走法
    Moves {
        /// 局面记谱
        #[arg(long)]
        fen: String,

        /// JSON 输出
        #[arg(long)]
        json: bool,
    },

    /// 选择最佳走法
    Best {
        /// 局面记谱
        #[arg(long)]
        fen: String,

        /// 难度 (easy, medium, hard, expert)
        #[arg(long, default_value = "medium")]
        difficulty: String,

        /// 随机种子
        #[arg(long)]
        seed: Option<u64>,

        /// 节点数上限
        #[arg(long)]
        node_budget: Option<u64>,

        /// 时间限制（秒）
        #[arg(long)]
        time_limit: Option<f64>,

        /// 返回的走法数量
        #[arg(long, default_value = "1")]
        n: usize,

        /// JSON 输出
        #[arg(long)]
        json: bool,
    },

    /// 评估局面分数（行棋方视角）
    Score {
        /// 局面记谱
        #[arg(long)]
        fen: String,

        /// 难度 (easy, medium, hard, expert)
        #[arg(long, default_value = "medium")]
        difficulty: String,

        /// JSON 输出
        #[arg(long)]
        json: bool,
    },

    /// 在局面上执行一步，输出新局面
    Apply {
        /// 局面记谱
        #[arg(long)]
        fen: String,

        /// 走法，如 d0d2
        #[arg(long = "move")]
        mv: String,
    },

    /// 终端对局（读取并更新存档）
    Play {
        /// 存档文件
        #[arg(long, default_value = "hnefatafl_game_state.json")]
        save: PathBuf,

        /// 对局模式 (ai, pvp)，默认沿用存档
        #[arg(long)]
        mode: Option<String>,

        /// 难度，默认沿用存档
        #[arg(long)]
        difficulty: Option<String>,

        /// 随机种子
        #[arg(long)]
        seed: Option<u64>,

        /// 忽略存档，重新开局
        #[arg(long)]
        new: bool,
    },

    /// AI 自我对弈
    SelfPlay {
        /// 攻方难度
        #[arg(long, default_value = "easy")]
        attackers: String,

        /// 守方难度
        #[arg(long, default_value = "easy")]
        defenders: String,

        /// 最多走多少步
        #[arg(long, default_value = "200")]
        max_moves: usize,

        /// 随机种子
        #[arg(long)]
        seed: Option<u64>,

        /// 每步节点数上限
        #[arg(long)]
        node_budget: Option<u64>,
    },

    /// 显示难度配置
    Profile {
        /// 难度，不指定时显示全部
        difficulty: Option<String>,
    },

    /// Server 模式：从 stdin 读取 JSON 命令
    Server,
}

#[derive(Serialize, Deserialize)]
struct MoveResult {
    #[serde(rename = "move")]
    mv: String,
    eval: i32,
    score: f64,
}

impl From<&ScoredMove> for MoveResult {
    fn from(sm: &ScoredMove) -> Self {
        MoveResult {
            mv: sm.mv.to_fen_str(),
            eval: sm.eval,
            score: sm.score,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct MovesResponse {
    moves: Vec<MoveResult>,
    total: usize,
}

#[derive(Serialize, Deserialize)]
struct ScoreResponse {
    fen: String,
    side: String,
    score: i32,
    king: i32,
    material: i32,
    king_corner: i32,
    center_control: i32,
}

// Server 模式的请求和响应结构
#[derive(Serialize, Deserialize)]
struct ServerRequest {
    cmd: String,
    #[serde(default)]
    fen: String,
    #[serde(default, rename = "move")]
    mv: Option<String>,
    #[serde(default)]
    difficulty: Option<String>,
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    node_budget: Option<u64>,
    #[serde(default)]
    time_limit: Option<f64>,
    #[serde(default)]
    n: Option<usize>,
}

#[derive(Serialize, Deserialize, Default)]
struct ServerResponse {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    moves: Option<Vec<MoveResult>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    legal_moves: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    depth: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    nodes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    nps: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    elapsed_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    // eval 命令的字段
    #[serde(skip_serializing_if = "Option::is_none")]
    eval: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    side: Option<String>,
    // apply 命令的字段
    #[serde(skip_serializing_if = "Option::is_none")]
    fen: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<String>,
}

impl ServerResponse {
    fn success_moves(moves: Vec<MoveResult>, depth: u32, stats: &SearchStats) -> Self {
        Self {
            ok: true,
            moves: Some(moves),
            depth: Some(depth),
            nodes: Some(stats.nodes),
            nps: Some(stats.nps()),
            elapsed_ms: Some(stats.elapsed.as_secs_f64() * 1000.0),
            ..Default::default()
        }
    }

    fn success_legal_moves(legal_moves: Vec<String>) -> Self {
        Self {
            ok: true,
            legal_moves: Some(legal_moves),
            ..Default::default()
        }
    }

    fn success_eval(eval: i32, side: Side) -> Self {
        Self {
            ok: true,
            eval: Some(eval),
            side: Some(side.to_string()),
            ..Default::default()
        }
    }

    fn success_apply(fen: String, result: GameResult) -> Self {
        Self {
            ok: true,
            fen: Some(fen),
            result: Some(result_to_str(result)),
            ..Default::default()
        }
    }

    fn error(msg: &str) -> Self {
        Self {
            ok: false,
            error: Some(msg.to_string()),
            ..Default::default()
        }
    }
}

fn result_to_str(result: GameResult) -> String {
    match result {
        GameResult::Ongoing => "ongoing".to_string(),
        GameResult::Decided { winner, reason } => format!("{} win: {}", winner, reason),
    }
}

fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", msg);
    std::process::exit(1);
}

fn parse_difficulty(name: &str) -> Result<Difficulty, String> {
    Difficulty::from_name(name).ok_or_else(|| format!("Unknown difficulty: {}", name))
}

/// 时间限制须为有限的非负秒数
fn make_limits(node_budget: Option<u64>, time_limit: Option<f64>) -> Result<SearchLimits, String> {
    let time_limit = time_limit
        .map(|secs| {
            Duration::try_from_secs_f64(secs).map_err(|_| format!("Invalid time limit: {}", secs))
        })
        .transpose()?;
    Ok(SearchLimits {
        node_budget,
        time_limit,
    })
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let rules = RuleSet::from_name(&cli.rules)
        .unwrap_or_else(|| fail(format!("Unknown rules: {}", cli.rules)));

    match cli.command {
        Commands::Moves { fen, json } => {
            let state = parse_fen_with_rules(&fen, rules).unwrap_or_else(|e| fail(e));
            let moves: Vec<String> = state
                .board
                .legal_moves(state.turn)
                .map(|mv| mv.to_fen_str())
                .collect();

            if json {
                let response = ServerResponse::success_legal_moves(moves);
                println!("{}", serde_json::to_string_pretty(&response).unwrap());
            } else {
                println!("Legal moves for {} ({}):", state.turn, moves.len());
                for mv in &moves {
                    println!("  {}", mv);
                }
            }
        }

        Commands::Best {
            fen,
            difficulty,
            seed,
            node_budget,
            time_limit,
            n,
            json,
        } => {
            let difficulty = parse_difficulty(&difficulty).unwrap_or_else(|e| fail(e));
            let limits = make_limits(node_budget, time_limit).unwrap_or_else(|e| fail(e));
            let state = parse_fen_with_rules(&fen, rules).unwrap_or_else(|e| fail(e));

            let mut ai = MinimaxAI::new(difficulty.profile(), seed).with_limits(limits);
            let moves = ai.select_moves(&state.board, state.turn, n);
            let stats = ai.last_stats();

            if moves.is_empty() {
                fail(format!("No legal move for {}", state.turn));
            }

            if json {
                let response = MovesResponse {
                    total: moves.len(),
                    moves: moves.iter().map(MoveResult::from).collect(),
                };
                println!("{}", serde_json::to_string_pretty(&response).unwrap());
                eprintln!(
                    "Stats: depth={}, nodes={}, time={:.3}s, nps={:.0}",
                    difficulty.profile().search_depth,
                    stats.nodes,
                    stats.elapsed.as_secs_f64(),
                    stats.nps()
                );
            } else {
                println!("Best moves (difficulty={}):", difficulty);
                for sm in &moves {
                    println!("  {} (eval: {}, score: {:.2})", sm.mv, sm.eval, sm.score);
                }
                println!(
                    "\nStats: depth={}, nodes={}, time={:.3}s, nps={:.0}{}",
                    difficulty.profile().search_depth,
                    stats.nodes,
                    stats.elapsed.as_secs_f64(),
                    stats.nps(),
                    if stats.cut_off { " (cut off)" } else { "" }
                );
            }
        }

        Commands::Score {
            fen,
            difficulty,
            json,
        } => {
            let difficulty = parse_difficulty(&difficulty).unwrap_or_else(|e| fail(e));
            let state = parse_fen_with_rules(&fen, rules).unwrap_or_else(|e| fail(e));
            let detail =
                evaluate_detail(&state.board, state.turn, difficulty.profile());

            if json {
                let response = ScoreResponse {
                    fen,
                    side: state.turn.to_string(),
                    score: detail.total(),
                    king: detail.king,
                    material: detail.material,
                    king_corner: detail.king_corner,
                    center_control: detail.center_control,
                };
                println!("{}", serde_json::to_string_pretty(&response).unwrap());
            } else {
                println!("局面评估 ({} 视角): {}", state.turn, detail.total());
                println!("  king:           {}", detail.king);
                println!("  material:       {}", detail.material);
                println!("  king_corner:    {}", detail.king_corner);
                println!("  center_control: {}", detail.center_control);
            }
        }

        Commands::Apply { fen, mv } => match apply_move_to_fen_with_rules(&fen, &mv, rules) {
            Ok(new_fen) => println!("{}", new_fen),
            Err(e) => fail(e),
        },

        Commands::Play {
            save,
            mode,
            difficulty,
            seed,
            new,
        } => {
            let mut game = load_game(&save, rules, new).unwrap_or_else(|e| fail(e));
            if let Some(mode) = mode {
                let mode = GameMode::from_name(&mode)
                    .unwrap_or_else(|| fail(format!("Unknown mode: {}", mode)));
                game.set_mode(mode);
            }
            if let Some(difficulty) = difficulty {
                game.set_difficulty(parse_difficulty(&difficulty).unwrap_or_else(|e| fail(e)));
            }
            run_play(&mut game, &save, seed);
        }

        Commands::SelfPlay {
            attackers,
            defenders,
            max_moves,
            seed,
            node_budget,
        } => {
            let attackers = parse_difficulty(&attackers).unwrap_or_else(|e| fail(e));
            let defenders = parse_difficulty(&defenders).unwrap_or_else(|e| fail(e));
            run_self_play(rules, attackers, defenders, max_moves, seed, node_budget);
        }

        Commands::Profile { difficulty } => {
            let selected: Vec<Difficulty> = match difficulty {
                Some(name) => vec![parse_difficulty(&name).unwrap_or_else(|e| fail(e))],
                None => Difficulty::ALL.to_vec(),
            };
            for d in selected {
                let p = d.profile();
                println!(
                    "{:<7} depth={} king={} defender={} attacker={} corner={} center={} \
                     mobility={} captures={} randomness={}",
                    d.name(),
                    p.search_depth,
                    p.piece_value(PieceKind::King),
                    p.piece_value(PieceKind::Defender),
                    p.piece_value(PieceKind::Attacker),
                    p.king_to_corner_weight,
                    p.center_control_weight,
                    p.mobility_weight,
                    p.capture_weight,
                    p.randomness
                );
            }
        }

        Commands::Server => {
            run_server(rules);
        }
    }
}

/// 读取存档，没有存档或要求重开时新建对局
fn load_game(path: &Path, rules: RuleSet, new: bool) -> Result<Game, SaveError> {
    if !new {
        if let Some(state) = SaveState::load(path)? {
            return state.into_game(rules);
        }
    }
    Ok(Game::with_rules(rules, GameMode::default(), Difficulty::default()))
}

fn save_game(game: &Game, path: &Path) {
    if let Err(e) = SaveState::from_game(game).save(path) {
        log::warn!("failed to save game: {}", e);
    }
}

/// 终端对局主循环
fn run_play(game: &mut Game, save: &Path, seed: Option<u64>) {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    println!("Commands: <move> (e.g. d3d1), hint, moves <square>, reset, quit");
    loop {
        println!("\n{}", game.board());
        if let GameResult::Decided { winner, reason } = game.result() {
            println!("{} win: {}", winner, reason);
            println!("Type 'reset' to play again or 'quit' to exit.");
        } else if game.is_ai_turn() {
            let turn_seed = seed.map(|s| s.wrapping_add(game.history().len() as u64));
            match think(game, turn_seed) {
                Some(mv) => match game.play(mv) {
                    Ok(_) => {
                        println!("AI ({}) plays {}", game.difficulty(), mv);
                        save_game(game, save);
                    }
                    Err(e) => log::error!("AI move rejected: {}", e),
                },
                None => {
                    println!("{} has no legal move.", game.turn());
                    return;
                }
            }
            continue;
        } else {
            println!("{} to move:", game.turn());
        }
        print!("> ");
        let _ = io::stdout().flush();

        let line = match lines.next() {
            Some(Ok(l)) => l,
            _ => break,
        };
        let words: Vec<&str> = line.split_whitespace().collect();
        match words.as_slice() {
            [] => continue,
            ["quit"] | ["exit"] => break,
            ["reset"] => {
                game.reset();
                save_game(game, save);
            }
            ["hint"] => {
                let mut ai = game.make_ai(seed);
                match game.hint(&mut ai) {
                    Some(mv) => println!("Hint: {}", mv),
                    None => println!("No hint available."),
                }
            }
            ["moves", square] => match Position::from_fen_str(square) {
                Some(pos) => {
                    let dests: Vec<String> = game
                        .legal_destinations(pos)
                        .iter()
                        .map(|p| p.to_fen_str())
                        .collect();
                    println!("{}: {}", square, dests.join(" "));
                }
                None => println!("Invalid square: {}", square),
            },
            [mv_str] => match Move::from_fen_str(mv_str) {
                Some(mv) => match game.play(mv) {
                    Ok(outcome) => {
                        if !outcome.captured.is_empty() {
                            println!("Captured {} piece(s)", outcome.captured.len());
                        }
                        save_game(game, save);
                    }
                    Err(e) => println!("{}", e),
                },
                None => println!("Invalid move: {}", mv_str),
            },
            _ => println!("Unknown command: {}", line.trim()),
        }
    }
}

/// 后台搜索，等待期间打印进度
fn think(game: &Game, seed: Option<u64>) -> Option<Move> {
    let pending = spawn_search(
        *game.board(),
        game.turn(),
        game.difficulty().profile().clone(),
        SearchLimits::default(),
        seed,
    );

    print!("AI thinking");
    let _ = io::stdout().flush();
    let report = loop {
        if let Some(report) = pending.poll() {
            break Some(report);
        }
        if pending.is_finished() {
            break pending.wait();
        }
        thread::sleep(Duration::from_millis(200));
        print!(".");
        let _ = io::stdout().flush();
    };
    println!();

    let report = report?;
    log::debug!(
        "AI search: nodes={} time={:.3}s",
        report.stats.nodes,
        report.stats.elapsed.as_secs_f64()
    );
    report.best.map(|sm| sm.mv)
}

/// AI 自我对弈
fn run_self_play(
    rules: RuleSet,
    attackers: Difficulty,
    defenders: Difficulty,
    max_moves: usize,
    seed: Option<u64>,
    node_budget: Option<u64>,
) {
    let limits = SearchLimits {
        node_budget,
        time_limit: None,
    };
    let mut attacker_ai = MinimaxAI::new(attackers.profile(), seed).with_limits(limits);
    let mut defender_ai =
        MinimaxAI::new(defenders.profile(), seed.map(|s| s.wrapping_add(1))).with_limits(limits);
    let mut game = Game::with_rules(rules, GameMode::Pvp, Difficulty::default());

    while !game.is_over() && game.history().len() < max_moves {
        let side = game.turn();
        let ai = match side {
            Side::Attackers => &mut attacker_ai,
            Side::Defenders => &mut defender_ai,
        };
        match game.ai_move(ai) {
            Ok(outcome) => {
                let record = &game.history()[game.history().len() - 1];
                println!(
                    "{:>3}. {:<9} {}{}",
                    game.history().len(),
                    side.to_string(),
                    Move::new(record.from, record.to),
                    if outcome.captured.is_empty() {
                        String::new()
                    } else {
                        format!(" x{}", outcome.captured.len())
                    }
                );
            }
            Err(e) => {
                println!("{}", e);
                break;
            }
        }
    }

    println!("\n{}", game.board());
    println!("Result: {}", result_to_str(game.result()));
    println!("Final: {}", board_to_fen(game.board(), game.turn()));
}

/// Server 模式主循环
/// 从 stdin 读取 JSON 请求，返回 JSON 响应到 stdout
fn run_server(rules: RuleSet) {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };

        // 空行跳过
        if line.trim().is_empty() {
            continue;
        }

        // 解析请求
        let request: ServerRequest = match serde_json::from_str(&line) {
            Ok(r) => r,
            Err(e) => {
                let response = ServerResponse::error(&format!("Invalid JSON: {}", e));
                println!("{}", serde_json::to_string(&response).unwrap());
                let _ = stdout.flush();
                continue;
            }
        };

        // 处理命令
        let response = match request.cmd.as_str() {
            "best" => handle_best_request(&request, rules),
            "moves" => handle_moves_request(&request, rules),
            "eval" => handle_eval_request(&request, rules),
            "apply" => handle_apply_request(&request, rules),
            "quit" => break,
            _ => ServerResponse::error(&format!("Unknown command: {}", request.cmd)),
        };

        // 返回响应
        println!("{}", serde_json::to_string(&response).unwrap());
        let _ = stdout.flush();
    }
}

fn request_difficulty(request: &ServerRequest) -> Result<Difficulty, String> {
    match &request.difficulty {
        Some(name) => parse_difficulty(name),
        None => Ok(Difficulty::Medium),
    }
}

/// 处理 best 命令
fn handle_best_request(request: &ServerRequest, rules: RuleSet) -> ServerResponse {
    let difficulty = match request_difficulty(request) {
        Ok(d) => d,
        Err(e) => return ServerResponse::error(&e),
    };
    let state = match parse_fen_with_rules(&request.fen, rules) {
        Ok(s) => s,
        Err(e) => return ServerResponse::error(&format!("Invalid FEN: {}", e)),
    };

    let limits = match make_limits(request.node_budget, request.time_limit) {
        Ok(l) => l,
        Err(e) => return ServerResponse::error(&e),
    };

    let mut ai = MinimaxAI::new(difficulty.profile(), request.seed).with_limits(limits);
    let moves = ai.select_moves(&state.board, state.turn, request.n.unwrap_or(5));
    if moves.is_empty() {
        return ServerResponse::error(&format!("No legal move for {}", state.turn));
    }

    ServerResponse::success_moves(
        moves.iter().map(MoveResult::from).collect(),
        difficulty.profile().search_depth,
        &ai.last_stats(),
    )
}

/// 处理 moves 命令
fn handle_moves_request(request: &ServerRequest, rules: RuleSet) -> ServerResponse {
    match parse_fen_with_rules(&request.fen, rules) {
        Ok(state) => ServerResponse::success_legal_moves(
            state
                .board
                .legal_moves(state.turn)
                .map(|mv| mv.to_fen_str())
                .collect(),
        ),
        Err(e) => ServerResponse::error(&format!("Invalid FEN: {}", e)),
    }
}

/// 处理 eval 命令（静态评估）
fn handle_eval_request(request: &ServerRequest, rules: RuleSet) -> ServerResponse {
    let difficulty = match request_difficulty(request) {
        Ok(d) => d,
        Err(e) => return ServerResponse::error(&e),
    };
    match parse_fen_with_rules(&request.fen, rules) {
        Ok(state) => ServerResponse::success_eval(
            evaluate(&state.board, state.turn, difficulty.profile()),
            state.turn,
        ),
        Err(e) => ServerResponse::error(&format!("Invalid FEN: {}", e)),
    }
}

/// 处理 apply 命令
fn handle_apply_request(request: &ServerRequest, rules: RuleSet) -> ServerResponse {
    let Some(mv_str) = request.mv.as_deref() else {
        return ServerResponse::error("Missing move");
    };
    let state = match parse_fen_with_rules(&request.fen, rules) {
        Ok(s) => s,
        Err(e) => return ServerResponse::error(&format!("Invalid FEN: {}", e)),
    };
    let Some(mv) = Move::from_fen_str(mv_str) else {
        return ServerResponse::error(&format!("Invalid move string: {}", mv_str));
    };
    if state.board.get(mv.from).and_then(|k| k.side()) != Some(state.turn) {
        return ServerResponse::error(&format!("No piece of {} at {}", state.turn, mv.from));
    }

    match state.board.play(mv) {
        Ok(outcome) => {
            let result = outcome.board.evaluate_game_result();
            ServerResponse::success_apply(
                board_to_fen(&outcome.board, state.turn.opposite()),
                result,
            )
        }
        Err(e) => ServerResponse::error(&e.to_string()),
    }
}
