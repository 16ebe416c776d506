//! Worker-pool evaluation of root moves.
//!
//! Every root move is an independent task: a shared-nothing copy of the
//! position travels through a bounded task channel to a fixed pool of
//! scoped worker threads, each of which runs one bounded kernel search and
//! sends its verdict back on a bounded result channel. The coordinator
//! collects exactly one verdict per dispatched move, waits no longer than
//! the search deadline, excludes whatever never arrived, and cancels
//! stragglers through the shared stop flag. Results may arrive in any
//! order; the stable aggregation makes the outcome identical to the
//! sequential driver's.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use chess::{Board, ChessMove, MoveGen};
use crossbeam_channel::{RecvTimeoutError, bounded};
use tracing::{debug, warn};

use crate::error::EngineError;
use crate::search::SearchOutcome;
use crate::search::root::{self, RootPlan, RootVerdict};

/// Coordinator poll interval while waiting without a deadline.
const POLL: Duration = Duration::from_millis(20);

/// Work item: the position before the move, plus one candidate.
struct RootTask {
    index: usize,
    board: Board,
    mv: ChessMove,
}

/// Distribute root-move evaluation across `threads` workers and aggregate.
pub fn parallel_root_search(
    board: &Board,
    threads: usize,
    plan: &RootPlan<'_>,
) -> Result<SearchOutcome, EngineError> {
    if MoveGen::new_legal(board).len() == 0 {
        return Err(EngineError::GameOver(board.status()));
    }
    let moves = root::ordered_root_moves(board, plan);
    let threads = threads.clamp(1, moves.len());

    let (task_tx, task_rx) = bounded::<RootTask>(moves.len());
    let (verdict_tx, verdict_rx) = bounded::<RootVerdict>(moves.len());

    // seed every task up front; the channel is sized to hold them all
    for (index, &mv) in moves.iter().enumerate() {
        let _ = task_tx.send(RootTask {
            index,
            board: *board,
            mv,
        });
    }
    drop(task_tx);

    let node_counters: Vec<AtomicU64> = (0..threads).map(|_| AtomicU64::new(0)).collect();
    let mut verdicts: Vec<RootVerdict> = Vec::with_capacity(moves.len());

    std::thread::scope(|s| {
        for counter in &node_counters {
            let task_rx = task_rx.clone();
            let verdict_tx = verdict_tx.clone();
            s.spawn(move || {
                while let Ok(task) = task_rx.recv() {
                    if plan.control.stopped() || plan.control.out_of_time() {
                        break;
                    }
                    let verdict = root::evaluate_root_move(&task.board, task.mv, task.index, plan);
                    counter.fetch_add(verdict.nodes, Ordering::Relaxed);
                    // an interrupted verdict is a missing result, not data
                    if plan.control.stopped() {
                        break;
                    }
                    if verdict_tx.send(verdict).is_err() {
                        break;
                    }
                }
            });
        }
        drop(verdict_tx);

        while verdicts.len() < moves.len() {
            let wait = match plan.control.deadline() {
                Some(deadline) => match deadline.checked_duration_since(Instant::now()) {
                    Some(left) => left.min(POLL),
                    None => Duration::ZERO,
                },
                None => POLL,
            };
            match verdict_rx.recv_timeout(wait) {
                Ok(verdict) => verdicts.push(verdict),
                Err(RecvTimeoutError::Timeout) => {
                    if plan.control.stopped() || plan.control.out_of_time() {
                        break;
                    }
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        // cancel anything still running before the scope joins the workers
        plan.control.stop();
    });

    // verdicts that slipped in between the break and the join still count
    while let Ok(verdict) = verdict_rx.try_recv() {
        verdicts.push(verdict);
    }

    if verdicts.len() < moves.len() {
        warn!(
            evaluated = verdicts.len(),
            dispatched = moves.len(),
            "deadline cut the root evaluation short"
        );
    } else {
        debug!(moves = moves.len(), threads, "parallel root evaluation complete");
    }

    let nodes: u64 = node_counters.iter().map(|c| c.load(Ordering::Relaxed)).sum();
    if verdicts.is_empty() {
        return Err(EngineError::NoVerdicts);
    }
    root::aggregate(verdicts, plan.config, nodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchConfig;
    use crate::eval::Evaluator;
    use crate::eval::material::{Material, MaterialWeights};
    use crate::search::MATE_THRESHOLD;
    use crate::search::control::SearchControl;
    use crate::search::ordering::{MoveOrderer, MvvLvaOrderer};
    use std::str::FromStr;

    fn plan<'a>(
        evaluator: &'a dyn Evaluator,
        orderer: &'a dyn MoveOrderer,
        config: &'a SearchConfig,
        control: &'a SearchControl,
    ) -> RootPlan<'a> {
        RootPlan {
            evaluator,
            positional: None,
            root_bonus: None,
            orderer,
            config,
            control,
            history: &[],
        }
    }

    #[test]
    fn pool_finds_mate_in_one() {
        let board = Board::from_str(
            "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4",
        )
        .unwrap();
        let evaluator = Material(MaterialWeights::CLASSIC);
        let orderer = MvvLvaOrderer;
        let config = SearchConfig {
            max_depth: 2,
            ..SearchConfig::default()
        };
        let control = SearchControl::unbounded();
        let outcome =
            parallel_root_search(&board, 4, &plan(&evaluator, &orderer, &config, &control))
                .unwrap();
        assert_eq!(outcome.best_move, ChessMove::from_str("h5f7").unwrap());
        assert!(outcome.score > MATE_THRESHOLD);
    }

    #[test]
    fn mated_root_is_game_over() {
        let board = Board::from_str("7k/6Q1/5K2/8/8/8/8/8 b - - 0 1").unwrap();
        let evaluator = Material(MaterialWeights::CLASSIC);
        let orderer = MvvLvaOrderer;
        let config = SearchConfig::default();
        let control = SearchControl::unbounded();
        let result =
            parallel_root_search(&board, 2, &plan(&evaluator, &orderer, &config, &control));
        assert_eq!(
            result.unwrap_err(),
            EngineError::GameOver(chess::BoardStatus::Checkmate)
        );
    }

    #[test]
    fn cancelled_pool_surfaces_no_verdicts() {
        let board = Board::default();
        let evaluator = Material(MaterialWeights::CLASSIC);
        let orderer = MvvLvaOrderer;
        let config = SearchConfig::default();
        let control = SearchControl::unbounded();
        control.stop();
        let result =
            parallel_root_search(&board, 2, &plan(&evaluator, &orderer, &config, &control));
        assert_eq!(result.unwrap_err(), EngineError::NoVerdicts);
    }
}
