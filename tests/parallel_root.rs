//! Integration tests for the worker-pool root search: agreement with the
//! sequential driver, thread-count independence, and deadline behavior.

use std::str::FromStr;
use std::time::{Duration, Instant};

use chess::Board;

use relic::config::SearchConfig;
use relic::eval::material::{Material, MaterialWeights};
use relic::search::control::SearchControl;
use relic::search::ordering::MvvLvaOrderer;
use relic::search::pool::parallel_root_search;
use relic::search::root::{RootPlan, root_search};
use relic::{Engine, EngineError, History, TimeBudget};

const SICILIAN_FEN: &str = "rnbqkbnr/pp1ppppp/8/2p5/4P3/8/PPPP1PPP/RNBQKBNR w KQkq c6 0 2";

const RUY_LOPEZ_FEN: &str = "r1bqkbnr/pppp1ppp/2n5/1B2p3/4P3/5N2/PPPP1PPP/RNBQK2R b KQkq - 3 3";

fn quick(mut engine: Engine) -> Engine {
    engine.config_mut().max_depth = 2;
    engine.config_mut().qplies = 2;
    engine
}

#[test]
fn pool_agrees_with_the_sequential_driver() {
    let sequential = quick(Engine::turochamp());
    let parallel = quick(Engine::turochamp_parallel(4));
    let history = History::new();

    for fen in [SICILIAN_FEN, RUY_LOPEZ_FEN] {
        let board = Board::from_str(fen).unwrap();
        let a = sequential.getmove(&board, &history).unwrap();
        let b = parallel.getmove(&board, &history).unwrap();
        assert_eq!(a.best_move, b.best_move, "divergence on {fen}");
        assert_eq!(a.score, b.score, "score divergence on {fen}");
    }
}

#[test]
fn outcome_is_independent_of_thread_count() {
    let board = Board::from_str(RUY_LOPEZ_FEN).unwrap();
    let history = History::new();
    let mut results = Vec::new();
    for threads in [1, 2, 4, 8] {
        let engine = quick(Engine::turochamp_parallel(threads));
        let outcome = engine.getmove(&board, &history).unwrap();
        results.push((threads, outcome.best_move, outcome.score));
    }
    let (_, first_move, first_score) = results[0];
    for (threads, mv, score) in &results {
        assert_eq!(*mv, first_move, "move differs with {threads} threads");
        assert_eq!(*score, first_score, "score differs with {threads} threads");
    }
}

#[test]
fn expired_deadline_yields_no_verdicts() {
    let board = Board::default();
    let evaluator = Material(MaterialWeights::CLASSIC);
    let orderer = MvvLvaOrderer;
    let config = SearchConfig::default();
    // the deadline is already behind us: every worker must decline its task
    let control = SearchControl::new(Some(Instant::now() - Duration::from_millis(5)), None);
    let plan = RootPlan {
        evaluator: &evaluator,
        positional: None,
        root_bonus: None,
        orderer: &orderer,
        config: &config,
        control: &control,
        history: &[],
    };
    let result = parallel_root_search(&board, 4, &plan);
    assert_eq!(result.unwrap_err(), EngineError::NoVerdicts);
}

#[test]
fn sequential_and_pool_share_aggregation_semantics() {
    // Drive both entry points over the same plan and compare directly,
    // bypassing the engine wrapper.
    let board = Board::from_str(SICILIAN_FEN).unwrap();
    let evaluator = Material(MaterialWeights::CLASSIC);
    let orderer = MvvLvaOrderer;
    let config = SearchConfig {
        max_depth: 3,
        ..SearchConfig::default()
    };

    let control_a = SearchControl::unbounded();
    let plan_a = RootPlan {
        evaluator: &evaluator,
        positional: None,
        root_bonus: None,
        orderer: &orderer,
        config: &config,
        control: &control_a,
        history: &[],
    };
    let a = root_search(&board, &plan_a).unwrap();

    let control_b = SearchControl::unbounded();
    let plan_b = RootPlan {
        evaluator: &evaluator,
        positional: None,
        root_bonus: None,
        orderer: &orderer,
        config: &config,
        control: &control_b,
        history: &[],
    };
    let b = parallel_root_search(&board, 3, &plan_b).unwrap();

    assert_eq!(a.best_move, b.best_move);
    assert_eq!(a.score, b.score);
    assert_eq!(a.pv, b.pv);
}

#[test]
fn timed_parallel_search_stays_inside_its_budget() {
    let board = Board::default();
    let mut engine = Engine::turochamp_parallel(2);
    engine.config_mut().max_depth = 6;
    engine.config_mut().time = TimeBudget::PerMove(Duration::from_millis(150));
    let started = Instant::now();
    // either some verdicts arrived in time or none did; both are valid
    match engine.getmove(&board, &History::new()) {
        Ok(outcome) => assert!(outcome.nodes > 0),
        Err(EngineError::NoVerdicts) => {}
        Err(other) => panic!("unexpected error: {other}"),
    }
    assert!(
        started.elapsed() < Duration::from_secs(5),
        "coordinator failed to cut the search off"
    );
}
