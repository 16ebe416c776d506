//! Iterative deepening with time control — the "Newt" driver.
//!
//! Runs the kernel at increasing depth, adopting each fully completed
//! iteration and discarding whatever a tripped budget leaves behind. A
//! reduced null-move probe may narrow the initial beta; a failed narrow
//! window is widened and re-searched before the iteration counts as
//! complete. Deepening stops early once a forced mate is proven.

use chess::{Board, ChessMove, MoveGen};
use tracing::{debug, info};

use crate::config::SearchConfig;
use crate::error::EngineError;
use crate::eval::Evaluator;
use crate::search::control::SearchControl;
use crate::search::kernel::{self, SearchContext};
use crate::search::ordering::MoveOrderer;
use crate::search::{INF, MATE_THRESHOLD, Progress, SearchOutcome};

/// Widening step when a narrowed window turns out too low (ten pawns).
const ASPIRATION_STEP: i32 = 1_000;
/// Margin added above the null-move bound.
const NULL_MARGIN: i32 = 50;
/// Advantage the null-move probe must show before it narrows beta.
const NULL_TRIGGER: i32 = 100;
/// Depth of the null-move probe.
const NULL_DEPTH: i32 = 2;

pub fn deepening_search(
    board: &Board,
    evaluator: &dyn Evaluator,
    orderer: &dyn MoveOrderer,
    config: &SearchConfig,
    control: &SearchControl,
    history: &[u64],
    on_progress: &mut dyn FnMut(&Progress),
) -> Result<SearchOutcome, EngineError> {
    let root_moves: Vec<ChessMove> = MoveGen::new_legal(board).collect();
    if root_moves.is_empty() {
        return Err(EngineError::GameOver(board.status()));
    }

    let mut ctx = SearchContext::new(evaluator, orderer, config, control);
    ctx.history = history.to_vec();
    ctx.history.push(board.get_hash());

    // Null-move probe: hand the opponent the move and search shallow. A
    // large advantage caps the window — a speed-up only, never a cutoff
    // that replaces the real search.
    let mut beta0 = INF;
    if let Some(passed) = board.null_move() {
        let probe = -kernel::search(&passed, 0, NULL_DEPTH, -INF, INF, None, &mut ctx);
        if !control.stopped() && probe > NULL_TRIGGER {
            beta0 = probe + NULL_MARGIN;
            debug!(probe, beta0, "null-move probe narrowed the window");
        }
    }

    let mut completed: Option<(u8, i32, Vec<ChessMove>)> = None;

    for depth in 1..=config.max_depth {
        if control.should_stop_iterating(ctx.nodes) {
            break;
        }

        let mut beta = beta0;
        let score = loop {
            let s = kernel::search(board, 0, i32::from(depth), -INF, beta, None, &mut ctx);
            if control.stopped() {
                break s;
            }
            // an empty PV against a narrowed window means the score sits
            // at the boundary: widen and try the same depth again
            if ctx.pv.root_pv().is_empty() && beta < INF {
                beta = beta.saturating_add(ASPIRATION_STEP).min(INF);
                continue;
            }
            break s;
        };

        if control.stopped() {
            break; // discard the incomplete iteration
        }
        let pv = ctx.pv.root_pv().to_vec();
        if pv.is_empty() {
            break;
        }

        ctx.prev_pv = pv.clone();
        completed = Some((depth, score, pv.clone()));

        let progress = Progress {
            depth,
            score,
            elapsed: control.elapsed(),
            nodes: ctx.nodes,
            pv,
        };
        info!(
            depth,
            score,
            nodes = progress.nodes,
            elapsed_ms = progress.elapsed.as_millis() as u64,
            "completed iteration"
        );
        on_progress(&progress);

        if score.abs() > MATE_THRESHOLD {
            break; // a proven mate needs no deeper look
        }
    }

    match completed {
        Some((depth, score, pv)) => Ok(SearchOutcome {
            best_move: pv[0],
            score,
            pv,
            nodes: ctx.nodes,
            depth,
        }),
        // not even depth 1 completed: answer with an unscored legal move
        None => Ok(SearchOutcome {
            best_move: root_moves[0],
            score: 0,
            pv: vec![root_moves[0]],
            nodes: ctx.nodes,
            depth: 0,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::material::{Material, MaterialWeights};
    use crate::search::ordering::PvFirstOrderer;
    use std::str::FromStr;

    fn newt_config(depth: u8) -> SearchConfig {
        SearchConfig {
            max_depth: depth,
            qplies: 6,
            matetest: true,
            ..SearchConfig::default()
        }
    }

    fn run(
        board: &Board,
        config: &SearchConfig,
        control: &SearchControl,
    ) -> (Result<SearchOutcome, EngineError>, Vec<u8>) {
        let evaluator = Material(MaterialWeights::NEWT);
        let orderer = PvFirstOrderer;
        let mut depths = Vec::new();
        let result = deepening_search(board, &evaluator, &orderer, config, control, &[], &mut |p| {
            depths.push(p.depth)
        });
        (result, depths)
    }

    #[test]
    fn every_depth_reports_progress() {
        let control = SearchControl::unbounded();
        let (result, depths) = run(&Board::default(), &newt_config(3), &control);
        let outcome = result.unwrap();
        assert_eq!(depths, vec![1, 2, 3]);
        assert_eq!(outcome.depth, 3);
        assert_eq!(outcome.pv[0], outcome.best_move);
    }

    #[test]
    fn mate_stops_the_deepening() {
        let board = Board::from_str(
            "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4",
        )
        .unwrap();
        let control = SearchControl::unbounded();
        let (result, depths) = run(&board, &newt_config(8), &control);
        let outcome = result.unwrap();
        assert_eq!(outcome.best_move, ChessMove::from_str("h5f7").unwrap());
        assert!(outcome.score > MATE_THRESHOLD);
        assert!(
            depths.len() < 8,
            "deepening should stop once the mate is proven, ran {depths:?}"
        );
    }

    #[test]
    fn pre_stopped_search_still_moves() {
        let control = SearchControl::unbounded();
        control.stop();
        let (result, depths) = run(&Board::default(), &newt_config(6), &control);
        let outcome = result.unwrap();
        assert!(depths.is_empty());
        assert_eq!(outcome.depth, 0);
        let legal: Vec<ChessMove> = MoveGen::new_legal(&Board::default()).collect();
        assert!(legal.contains(&outcome.best_move));
    }

    #[test]
    fn game_over_is_surfaced() {
        let board = Board::from_str("k7/2K5/1Q6/8/8/8/8/8 b - - 0 1").unwrap();
        let control = SearchControl::unbounded();
        let (result, _) = run(&board, &newt_config(3), &control);
        assert_eq!(
            result.unwrap_err(),
            EngineError::GameOver(chess::BoardStatus::Stalemate)
        );
    }

    #[test]
    fn node_budget_keeps_the_last_complete_depth() {
        let board = Board::default();
        let config = newt_config(30);
        // enough for the first depths, nowhere near depth 30
        let control = SearchControl::new(None, Some(20_000));
        let (result, depths) = run(&board, &config, &control);
        let outcome = result.unwrap();
        assert!(!depths.is_empty());
        assert_eq!(outcome.depth, *depths.last().unwrap());
        assert!(outcome.nodes <= 20_000 + 1024);
    }
}
