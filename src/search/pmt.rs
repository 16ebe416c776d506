//! The plausible-move table (Bernstein 1958).
//!
//! A short candidate list built from tactical triggers in fixed priority:
//! checking moves, profitable captures, rescues of en-prise pieces, even
//! trades, castling, minor-piece development, pawn pushes that knit the
//! pawn chain, open-file occupation, then the remaining pawn pushes and
//! everything else. Duplicates keep their first (highest-priority) slot
//! and the list is cut to a fixed length. A side in check considers every
//! evasion instead.

use chess::{BitBoard, Board, ChessMove, Color, EMPTY, MoveGen, Piece, Rank, Square};

use crate::attacks::{self, attackers_on};
use crate::config::PmtConfig;
use crate::search::see::see;

/// Pawn-push priority per file: center files first.
const PAWN_FILE_WEIGHT: [i32; 8] = [1, 2, 3, 4, 4, 3, 2, 1];

fn bb(sq: Square) -> BitBoard {
    BitBoard::from_square(sq)
}

/// Build the plausible-move table for the side to move.
pub fn plausible_moves(board: &Board, cfg: PmtConfig) -> Vec<ChessMove> {
    let legal: Vec<ChessMove> = MoveGen::new_legal(board).collect();
    if attacks::in_check(board) {
        return legal;
    }

    let side = board.side_to_move();
    let occ = *board.combined();
    let mut pmt: Vec<ChessMove> = Vec::new();

    // 1. can check be given?
    for &mv in &legal {
        if attacks::gives_check(board, mv) {
            pmt.push(mv);
        }
    }

    // 2a. material gain: captures where the enemy stands to lose material
    let winning = swap_squares(board, !side, |sv| sv > 0);
    for &mv in &legal {
        if winning & bb(mv.get_dest()) != EMPTY {
            pmt.push(mv);
        }
    }

    // 2b. material loss: one rescue move per en-prise piece, landing where
    // the defenders outnumber the attackers
    let en_prise = swap_squares(board, side, |sv| sv > 0);
    let mut rescued: Vec<Square> = Vec::new();
    for &mv in &legal {
        let from = mv.get_source();
        if en_prise & bb(from) != EMPTY
            && attackers_on(board, mv.get_dest(), !side, occ).popcnt()
                < attackers_on(board, mv.get_dest(), side, occ).popcnt()
            && !rescued.contains(&from)
        {
            rescued.push(from);
            pmt.push(mv);
        }
    }

    // 2c. even trades
    let even = swap_squares(board, !side, |sv| sv == 0);
    for &mv in &legal {
        if even & bb(mv.get_dest()) != EMPTY {
            pmt.push(mv);
        }
    }

    // 3. castling
    for &mv in &legal {
        if attacks::is_castle(board, mv) {
            pmt.push(mv);
        }
    }

    // 4. minor-piece development off the home rank (not to the 2nd/7th)
    let home = match side {
        Color::White => Rank::First,
        Color::Black => Rank::Eighth,
    };
    for &mv in &legal {
        if mv.get_source().get_rank() == home
            && matches!(
                board.piece_on(mv.get_source()),
                Some(Piece::Knight | Piece::Bishop)
            )
            && !matches!(mv.get_dest().get_rank(), Rank::Second | Rank::Seventh)
        {
            pmt.push(mv);
        }
    }

    // 5. pawn pushes to key squares of the pawn chain
    let keys = key_squares(board, side);
    for &mv in &legal {
        if board.piece_on(mv.get_source()) == Some(Piece::Pawn) && keys & bb(mv.get_dest()) != EMPTY
        {
            pmt.push(mv);
        }
    }

    // 6. heavy pieces onto open files
    let open = open_files(board);
    for &mv in &legal {
        if matches!(
            board.piece_on(mv.get_source()),
            Some(Piece::Rook | Piece::Queen)
        ) && open & bb(mv.get_dest()) != EMPTY
        {
            pmt.push(mv);
        }
    }

    // 7. pawn pushes, center files first
    let mut pawn_moves: Vec<(ChessMove, i32)> = legal
        .iter()
        .copied()
        .filter(|mv| board.piece_on(mv.get_source()) == Some(Piece::Pawn))
        .map(|mv| (mv, PAWN_FILE_WEIGHT[mv.get_source().get_file().to_index()]))
        .collect();
    pawn_moves.sort_by_key(|&(_, w)| std::cmp::Reverse(w));
    pmt.extend(pawn_moves.into_iter().map(|(mv, _)| mv));

    // 8. anything else
    pmt.extend(legal.iter().copied());

    // first-seen dedup, fixed table length
    let mut table: Vec<ChessMove> = Vec::with_capacity(cfg.len);
    for mv in pmt {
        if !table.contains(&mv) {
            table.push(mv);
            if table.len() == cfg.len {
                break;
            }
        }
    }
    table
}

/// Squares of `owner`'s pieces whose swap-off value (for the capturing
/// side) satisfies `pred`.
fn swap_squares(board: &Board, owner: Color, pred: impl Fn(i32) -> bool) -> BitBoard {
    let mut out = EMPTY;
    for sq in *board.color_combined(owner) {
        if pred(see(board, sq, !owner)) {
            out |= bb(sq);
        }
    }
    out
}

/// Key squares: defended by a pawn-chain piece (pawn, bishop or queen)
/// and such that a pawn standing there would support another of them.
fn key_squares(board: &Board, side: Color) -> BitBoard {
    let chain = (*board.pieces(Piece::Pawn)
        | *board.pieces(Piece::Bishop)
        | *board.pieces(Piece::Queen))
        & *board.color_combined(side);
    let occ = *board.combined();
    let mut out = EMPTY;
    for sq in chess::ALL_SQUARES {
        if attackers_on(board, sq, side, occ) & chain == EMPTY {
            continue;
        }
        if chess::get_pawn_attacks(sq, side, !EMPTY) & chain != EMPTY {
            out |= bb(sq);
        }
    }
    out
}

/// Files empty of everything but kings.
fn open_files(board: &Board) -> BitBoard {
    let blockers = *board.combined() & !*board.pieces(Piece::King);
    let mut out = EMPTY;
    for file in chess::ALL_FILES {
        let mask = chess::get_file(file);
        if mask & blockers == EMPTY {
            out |= mask;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn cfg() -> PmtConfig {
        PmtConfig::default()
    }

    #[test]
    fn table_respects_the_length_cap() {
        let table = plausible_moves(&Board::default(), cfg());
        assert_eq!(table.len(), 7);
    }

    #[test]
    fn table_has_no_duplicates() {
        let table = plausible_moves(&Board::default(), cfg());
        let mut seen = table.clone();
        seen.sort_by_key(|m| (m.get_source().to_index(), m.get_dest().to_index()));
        seen.dedup();
        assert_eq!(seen.len(), table.len());
    }

    #[test]
    fn in_check_considers_every_evasion() {
        // White king checked by the rook on e8.
        let board = Board::from_str("4r1k1/8/8/8/8/8/3P4/4K3 w - - 0 1").unwrap();
        let table = plausible_moves(&board, cfg());
        let legal = MoveGen::new_legal(&board).count();
        assert_eq!(table.len(), legal);
    }

    #[test]
    fn winning_capture_makes_the_table() {
        // Hanging black queen on d5; the table is short but must keep cxd5.
        let board = Board::from_str("4k3/8/8/3q4/2P5/8/8/4K3 w - - 0 1").unwrap();
        let table = plausible_moves(&board, cfg());
        let capture = ChessMove::from_str("c4d5").unwrap();
        assert!(table.contains(&capture));
    }

    #[test]
    fn castling_makes_the_table() {
        let board =
            Board::from_str("r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4")
                .unwrap();
        let table = plausible_moves(&board, cfg());
        assert!(table.contains(&ChessMove::from_str("e1g1").unwrap()));
    }

    #[test]
    fn central_pawn_pushes_beat_wing_pushes() {
        let table = plausible_moves(&Board::default(), cfg());
        // No tactics at the start: the table is led by development and
        // center pawn pushes; the a/h pushes must not appear in seven slots.
        assert!(!table.contains(&ChessMove::from_str("a2a3").unwrap()));
        assert!(!table.contains(&ChessMove::from_str("h2h3").unwrap()));
    }
}
