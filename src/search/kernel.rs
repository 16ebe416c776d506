//! Negamax alpha-beta search with quiescence extension.
//!
//! Scores are always from the perspective of the side to move at the node;
//! callers negate on unwind and swap the window when recursing. Bounds are
//! fail-hard: a beta cutoff returns `beta` without looking at further
//! siblings. Past the nominal horizon the search continues through
//! captures only, until the position is dead or the quiescence budget runs
//! out.

use chess::{Board, BoardStatus, ChessMove, EMPTY, Piece, Square};

use crate::attacks;
use crate::config::SearchConfig;
use crate::eval::{Evaluator, from_side};
use crate::search::control::SearchControl;
use crate::search::ordering::{self, MoveOrderer};
use crate::search::pmt;
use crate::search::{MATE_SCORE, MAX_PLY};

/// The move that produced the current node, for the quiescence dead test.
#[derive(Debug, Clone, Copy)]
pub struct LastMove {
    pub dest: Square,
    pub capture: bool,
}

/// Mutable search state threaded through the recursion — no ambient
/// globals, so concurrent searches never interfere.
pub struct SearchContext<'a> {
    /// Nodes visited by this context.
    pub nodes: u64,
    pub control: &'a SearchControl,
    pub pv: PvTable,
    /// Principal variation of the previous deepening iteration, consumed
    /// by PV-first ordering.
    pub prev_pv: Vec<ChessMove>,
    /// Hashes of every position from the start of the game through the
    /// current node. The caller pushes the hash of the searched position
    /// before calling [`search`].
    pub history: Vec<u64>,
    pub evaluator: &'a dyn Evaluator,
    pub orderer: &'a dyn MoveOrderer,
    pub config: &'a SearchConfig,
}

impl<'a> SearchContext<'a> {
    pub fn new(
        evaluator: &'a dyn Evaluator,
        orderer: &'a dyn MoveOrderer,
        config: &'a SearchConfig,
        control: &'a SearchControl,
    ) -> Self {
        Self {
            nodes: 0,
            control,
            pv: PvTable::new(),
            prev_pv: Vec::new(),
            history: Vec::new(),
            evaluator,
            orderer,
            config,
        }
    }
}

/// Negamax alpha-beta. `depth_left` counts the remaining full-width plies;
/// at zero and below only captures are searched. The principal variation
/// accumulates in `ctx.pv`.
///
/// When the budget trips mid-recursion the kernel unwinds with its running
/// bound; the driver must consult `ctx.control.stopped()` and discard the
/// aborted result.
pub fn search(
    board: &Board,
    ply: usize,
    depth_left: i32,
    mut alpha: i32,
    beta: i32,
    last: Option<LastMove>,
    ctx: &mut SearchContext<'_>,
) -> i32 {
    ctx.pv.clear_ply(ply);
    ctx.nodes += 1;

    if ctx.control.should_stop(ctx.nodes) {
        return alpha;
    }

    match board.status() {
        BoardStatus::Checkmate => return -(MATE_SCORE - ply as i32),
        BoardStatus::Stalemate => return 0,
        BoardStatus::Ongoing => {}
    }

    if ctx.config.matetest && is_draw(board, ctx) {
        return 0;
    }

    if ply >= MAX_PLY - 1 {
        return static_eval(board, ctx);
    }

    let candidates = if depth_left > 0 {
        let mut moves = ctx.orderer.order(board, ply, &ctx.prev_pv);
        if let Some(pmt_cfg) = ctx.config.pmt
            && ply >= pmt_cfg.start_ply
        {
            let table = pmt::plausible_moves(board, pmt_cfg);
            moves.retain(|mv| table.contains(mv));
        }
        moves
    } else {
        if is_dead(board, depth_left, last, ctx.config.qplies) {
            return static_eval(board, ctx);
        }
        let captures = ordering::captures(board);
        if captures.is_empty() {
            return static_eval(board, ctx);
        }
        captures
    };

    for mv in candidates {
        let child = board.make_move_new(mv);
        let went = LastMove {
            dest: mv.get_dest(),
            capture: attacks::is_capture(board, mv),
        };
        ctx.history.push(child.get_hash());
        let score = -search(&child, ply + 1, depth_left - 1, -beta, -alpha, Some(went), ctx);
        ctx.history.pop();

        if ctx.control.stopped() {
            return alpha;
        }
        if score >= beta {
            return beta;
        }
        if score > alpha {
            alpha = score;
            ctx.pv.update(ply, mv);
        }
    }

    alpha
}

/// Static evaluation from the side to move's perspective.
fn static_eval(board: &Board, ctx: &SearchContext<'_>) -> i32 {
    from_side(ctx.evaluator.evaluate(board), board.side_to_move())
}

/// Is the position dead (safe to evaluate statically)? Not while in check
/// or while the last capture can be recaptured, subject to the quiescence
/// ply budget.
fn is_dead(board: &Board, depth_left: i32, last: Option<LastMove>, qplies: u8) -> bool {
    if qplies == 0 || depth_left <= -i32::from(qplies) {
        return true;
    }
    if attacks::in_check(board) {
        return false;
    }
    match last {
        Some(l) if l.capture => {
            attacks::attackers_on(board, l.dest, board.side_to_move(), *board.combined()) == EMPTY
        }
        _ => true,
    }
}

/// Draw adjudication: a repetition of any earlier position in the threaded
/// history, or bare-minor material.
fn is_draw(board: &Board, ctx: &SearchContext<'_>) -> bool {
    let hash = board.get_hash();
    // the current position's own hash was pushed by the caller, so a
    // second occurrence is a genuine repetition
    if ctx.history.iter().filter(|&&h| h == hash).count() >= 2 {
        return true;
    }
    insufficient_material(board)
}

fn insufficient_material(board: &Board) -> bool {
    let heavy =
        *board.pieces(Piece::Pawn) | *board.pieces(Piece::Rook) | *board.pieces(Piece::Queen);
    heavy == EMPTY && board.combined().popcnt() <= 3
}

/// Triangular principal-variation table: row `ply` holds the best line
/// from that ply to the horizon. Overwritten wholesale as better lines
/// appear, never partially mutated.
pub struct PvTable {
    moves: [[ChessMove; MAX_PLY]; MAX_PLY],
    len: [usize; MAX_PLY],
}

impl PvTable {
    pub fn new() -> Self {
        let filler = ChessMove::new(Square::A1, Square::A1, None);
        Self {
            moves: [[filler; MAX_PLY]; MAX_PLY],
            len: [0; MAX_PLY],
        }
    }

    /// Clear the line at `ply` (called on node entry).
    pub fn clear_ply(&mut self, ply: usize) {
        if ply < MAX_PLY {
            self.len[ply] = 0;
        }
    }

    /// Install `mv` as the best move at `ply`, followed by the line the
    /// child search left at `ply + 1`.
    pub fn update(&mut self, ply: usize, mv: ChessMove) {
        if ply >= MAX_PLY {
            return;
        }
        self.moves[ply][0] = mv;
        let child = ply + 1;
        if child < MAX_PLY {
            let copy_len = self.len[child].min(MAX_PLY - 1);
            let (top, bottom) = self.moves.split_at_mut(child);
            top[ply][1..1 + copy_len].copy_from_slice(&bottom[0][..copy_len]);
            self.len[ply] = 1 + copy_len;
        } else {
            self.len[ply] = 1;
        }
    }

    /// The principal variation from the root.
    pub fn root_pv(&self) -> &[ChessMove] {
        self.line(0)
    }

    /// The line recorded at `ply`.
    pub fn line(&self, ply: usize) -> &[ChessMove] {
        if ply < MAX_PLY {
            &self.moves[ply][..self.len[ply]]
        } else {
            &[]
        }
    }
}

impl Default for PvTable {
    fn default() -> Self {
        Self::new()
    }
}
