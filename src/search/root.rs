//! Fixed-depth evaluation of every root move — the historical engines'
//! `getmove` loop, shared by the sequential driver and the worker pool.
//!
//! Each root move is searched independently with a full window, which is
//! what makes the per-move work embarrassingly parallel. Verdicts carry a
//! positional term alongside the search score; the variant's blend weight
//! decides which one dominates the ranking.

use chess::{Board, ChessMove, MoveGen};

use crate::attacks;
use crate::config::SearchConfig;
use crate::error::EngineError;
use crate::eval::{Evaluator, from_side};
use crate::search::control::SearchControl;
use crate::search::kernel::{self, LastMove, SearchContext};
use crate::search::ordering::MoveOrderer;
use crate::search::pmt;
use crate::search::{INF, SearchOutcome};

/// Extra root-move bonus hook (Turing's castling points).
pub type RootBonus = fn(&Board, ChessMove, &Board) -> i32;

/// Evaluation of one root move.
#[derive(Debug, Clone)]
pub struct RootVerdict {
    /// Submission index — the tie-break for ranking.
    pub index: usize,
    pub mv: ChessMove,
    /// Positional delta against the pre-move position.
    pub positional: i32,
    /// Negamax score of the position after the move, from the mover's side.
    pub score: i32,
    pub pv: Vec<ChessMove>,
    pub nodes: u64,
}

/// Everything a root-move evaluation needs besides the move itself.
pub struct RootPlan<'a> {
    pub evaluator: &'a dyn Evaluator,
    pub positional: Option<&'a dyn Evaluator>,
    pub root_bonus: Option<RootBonus>,
    pub orderer: &'a dyn MoveOrderer,
    pub config: &'a SearchConfig,
    pub control: &'a SearchControl,
    /// Game so far, for repetition adjudication.
    pub history: &'a [u64],
}

/// Root candidates in search order, with the plausible-move filter applied
/// when it is active at the root.
pub fn ordered_root_moves(board: &Board, plan: &RootPlan<'_>) -> Vec<ChessMove> {
    let mut moves = plan.orderer.order(board, 0, &[]);
    if let Some(cfg) = plan.config.pmt
        && cfg.start_ply == 0
    {
        let table = pmt::plausible_moves(board, cfg);
        moves.retain(|mv| table.contains(mv));
    }
    moves
}

/// Evaluate a single root move: positional delta plus one bounded kernel
/// search of the resulting position.
pub fn evaluate_root_move(
    board: &Board,
    mv: ChessMove,
    index: usize,
    plan: &RootPlan<'_>,
) -> RootVerdict {
    let side = board.side_to_move();
    let child = board.make_move_new(mv);

    let mut positional = match plan.positional {
        Some(eval) => {
            from_side(eval.evaluate(&child), side) - from_side(eval.evaluate(board), side)
        }
        None => 0,
    };
    if let Some(bonus) = plan.root_bonus {
        positional += bonus(board, mv, &child);
    }

    let mut ctx = SearchContext::new(plan.evaluator, plan.orderer, plan.config, plan.control);
    ctx.history = plan.history.to_vec();
    ctx.history.push(board.get_hash());
    ctx.history.push(child.get_hash());

    let went = LastMove {
        dest: mv.get_dest(),
        capture: attacks::is_capture(board, mv),
    };
    let depth_left = i32::from(plan.config.max_depth) - 1;
    let score = -kernel::search(&child, 1, depth_left, -INF, INF, Some(went), &mut ctx);

    let mut pv = vec![mv];
    pv.extend_from_slice(ctx.pv.line(1));

    RootVerdict {
        index,
        mv,
        positional,
        score,
        pv,
        nodes: ctx.nodes,
    }
}

/// Ranking key: search score blended with the positional term.
fn blend(verdict: &RootVerdict, config: &SearchConfig) -> i64 {
    config.search_weight * i64::from(verdict.score) + i64::from(verdict.positional)
}

/// Pick the best verdict: blended key descending, submission order breaking
/// ties (a stable ranking, independent of evaluation order).
pub fn aggregate(
    verdicts: Vec<RootVerdict>,
    config: &SearchConfig,
    nodes: u64,
) -> Result<SearchOutcome, EngineError> {
    let best = verdicts
        .into_iter()
        .min_by_key(|v| (std::cmp::Reverse(blend(v, config)), v.index))
        .ok_or(EngineError::NoVerdicts)?;
    Ok(SearchOutcome {
        best_move: best.mv,
        score: best.positional + best.score,
        pv: best.pv,
        nodes,
        depth: config.max_depth,
    })
}

/// Sequential root search. An exhausted budget mid-loop keeps whatever was
/// already evaluated; if nothing was, the first candidate is played
/// unscored rather than returning nothing.
pub fn root_search(board: &Board, plan: &RootPlan<'_>) -> Result<SearchOutcome, EngineError> {
    if MoveGen::new_legal(board).len() == 0 {
        return Err(EngineError::GameOver(board.status()));
    }
    let moves = ordered_root_moves(board, plan);

    let mut nodes = 0u64;
    let mut verdicts = Vec::with_capacity(moves.len());
    for (index, &mv) in moves.iter().enumerate() {
        if plan.control.stopped() || plan.control.out_of_time() {
            break;
        }
        let verdict = evaluate_root_move(board, mv, index, plan);
        nodes += verdict.nodes;
        // a verdict the budget interrupted mid-search carries a partial
        // score; drop it rather than rank it
        if plan.control.stopped() {
            break;
        }
        verdicts.push(verdict);
    }

    if verdicts.is_empty() {
        // not even one candidate finished; still answer with a legal move
        return Ok(SearchOutcome {
            best_move: moves[0],
            score: 0,
            pv: vec![moves[0]],
            nodes,
            depth: 0,
        });
    }
    aggregate(verdicts, plan.config, nodes)
}
