//! Move ordering heuristics.
//!
//! Two orderers cover the historical variants: capture-priority MVV/LVA
//! (Bernstein, Shannon, the fixed-depth engines) and PV-first (Newt).
//! Quiescence nodes share one candidate set: captures by MVV/LVA.

use chess::{Board, ChessMove, MoveGen, Piece};

use crate::attacks;

/// Ordering rank of a piece in the MVV/LVA formula, the historical
/// pawn=1 .. king=6 scale.
fn lva_rank(piece: Piece) -> i32 {
    match piece {
        Piece::Pawn => 1,
        Piece::Knight => 2,
        Piece::Bishop => 3,
        Piece::Rook => 4,
        Piece::Queen => 5,
        Piece::King => 6,
    }
}

/// MVV/LVA score of a capture: `10 × victim − attacker`. En passant has no
/// victim on the destination square and scores on the attacker alone.
pub(crate) fn mvv_lva(board: &Board, mv: ChessMove) -> i32 {
    let attacker = board.piece_on(mv.get_source()).map_or(1, lva_rank);
    match board.piece_on(mv.get_dest()) {
        Some(victim) => 10 * lva_rank(victim) - attacker,
        None => 10 - attacker,
    }
}

/// Candidate move ordering for a main-search node.
///
/// Every legal move appears exactly once; pruning is the plausible-move
/// filter's business, not the orderer's.
pub trait MoveOrderer: Send + Sync {
    fn order(&self, board: &Board, ply: usize, prev_pv: &[ChessMove]) -> Vec<ChessMove>;
}

/// Captures first (MVV/LVA descending), quiet moves by moving-piece value.
pub struct MvvLvaOrderer;

impl MoveOrderer for MvvLvaOrderer {
    fn order(&self, board: &Board, _ply: usize, _prev_pv: &[ChessMove]) -> Vec<ChessMove> {
        let mut scored: Vec<(ChessMove, i32)> = MoveGen::new_legal(board)
            .map(|mv| {
                let score = if attacks::is_capture(board, mv) {
                    // offset keeps every capture ahead of every quiet move
                    100 + mvv_lva(board, mv)
                } else {
                    board.piece_on(mv.get_source()).map_or(1, lva_rank)
                };
                (mv, score)
            })
            .collect();
        // stable: equal scores keep generation order
        scored.sort_by_key(|&(_, score)| std::cmp::Reverse(score));
        scored.into_iter().map(|(mv, _)| mv).collect()
    }
}

/// The previous iteration's PV move for this ply first, the rest in
/// generation order. Accelerates cutoffs under iterative deepening.
pub struct PvFirstOrderer;

impl MoveOrderer for PvFirstOrderer {
    fn order(&self, board: &Board, ply: usize, prev_pv: &[ChessMove]) -> Vec<ChessMove> {
        let hint = prev_pv.get(ply).copied();
        let mut front = Vec::new();
        let mut rest = Vec::new();
        for mv in MoveGen::new_legal(board) {
            if Some(mv) == hint {
                front.push(mv);
            } else {
                rest.push(mv);
            }
        }
        front.extend(rest);
        front
    }
}

/// Capture moves only, MVV/LVA descending — the quiescence candidate set.
pub(crate) fn captures(board: &Board) -> Vec<ChessMove> {
    let mut scored: Vec<(ChessMove, i32)> = MoveGen::new_legal(board)
        .filter(|&mv| attacks::is_capture(board, mv))
        .map(|mv| (mv, mvv_lva(board, mv)))
        .collect();
    scored.sort_by_key(|&(_, score)| std::cmp::Reverse(score));
    scored.into_iter().map(|(mv, _)| mv).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess::Square;
    use std::str::FromStr;

    #[test]
    fn pawn_takes_queen_beats_queen_takes_pawn() {
        // Mutual captures: white pawn b4 can take the queen on c5, the
        // black queen can take the pawn.
        let board = Board::from_str("4k3/8/8/2q5/1P6/8/8/4K3 w - - 0 1").unwrap();
        let pxq = MoveGen::new_legal(&board)
            .find(|m| m.get_source() == Square::B4 && m.get_dest() == Square::C5)
            .unwrap();
        assert_eq!(mvv_lva(&board, pxq), 49);
    }

    #[test]
    fn orderer_yields_every_legal_move_once() {
        let board = Board::default();
        let ordered = MvvLvaOrderer.order(&board, 0, &[]);
        assert_eq!(ordered.len(), 20);
        let mut unique = ordered.clone();
        unique.dedup();
        assert_eq!(unique.len(), 20);
    }

    #[test]
    fn captures_come_first() {
        // White queen d4 can capture the e5 pawn among many quiet moves.
        let board = Board::from_str("4k3/8/8/4p3/3Q4/8/8/4K3 w - - 0 1").unwrap();
        let ordered = MvvLvaOrderer.order(&board, 0, &[]);
        assert!(attacks::is_capture(&board, ordered[0]));
    }

    #[test]
    fn en_passant_scores_on_attacker_alone() {
        let board =
            Board::from_str("rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3")
                .unwrap();
        let ep = MoveGen::new_legal(&board)
            .find(|m| m.get_source() == Square::E5 && m.get_dest() == Square::D6)
            .unwrap();
        assert_eq!(mvv_lva(&board, ep), 9);
    }

    #[test]
    fn quiescence_set_is_empty_at_startpos() {
        assert!(captures(&Board::default()).is_empty());
    }

    #[test]
    fn pv_move_leads_the_ordering() {
        let board = Board::default();
        let pv = vec![ChessMove::from_str("g1f3").unwrap()];
        let ordered = PvFirstOrderer.order(&board, 0, &pv);
        assert_eq!(ordered[0], pv[0]);
        assert_eq!(ordered.len(), 20);
    }

    #[test]
    fn pv_match_is_per_ply() {
        let board = Board::default();
        let pv = vec![
            ChessMove::from_str("e2e4").unwrap(),
            ChessMove::from_str("g1f3").unwrap(),
        ];
        // at ply 1 the hint is the second PV move
        let ordered = PvFirstOrderer.order(&board, 1, &pv);
        assert_eq!(ordered[0], pv[1]);
    }
}
