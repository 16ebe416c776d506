//! Static exchange evaluation (swap-off value).
//!
//! Simulates the capture sequence on one square, each side bringing its
//! least valuable attacker and free to stop whenever continuing loses
//! material. Sliding attacks are recomputed against the shrinking
//! occupancy, so X-ray attackers join the exchange as pieces leave.

use chess::{BitBoard, Board, Color, Piece, Square};

use crate::attacks::attackers_on;
use crate::eval::piece_value;

/// Longest exchange chain considered (the board cannot sustain more).
const MAX_SWAPS: usize = 32;

/// Least valuable attacker among `attackers`.
fn least_attacker(board: &Board, attackers: BitBoard) -> Option<(Square, Piece)> {
    for piece in [
        Piece::Pawn,
        Piece::Knight,
        Piece::Bishop,
        Piece::Rook,
        Piece::Queen,
        Piece::King,
    ] {
        let mut candidates = attackers & *board.pieces(piece);
        if let Some(sq) = candidates.next() {
            return Some((sq, piece));
        }
    }
    None
}

/// Net material for `side` initiating the capture sequence on `sq`.
///
/// Returns 0 when the square is empty or `side` has no attacker. The king
/// takes part with a dominating value, so it is never profitably left in
/// the chain; the loop is also bounded, so degenerate attacker sets
/// terminate.
pub fn see(board: &Board, sq: Square, side: Color) -> i32 {
    let Some(target) = board.piece_on(sq) else {
        return 0;
    };
    if board.color_on(sq) == Some(side) {
        return 0;
    }
    let mut occ = *board.combined();

    let Some((from, first)) = least_attacker(board, attackers_on(board, sq, side, occ)) else {
        return 0;
    };

    let mut gain = [0i32; MAX_SWAPS];
    gain[0] = piece_value(target);

    // value of whichever piece currently sits on the contested square
    let mut occupier = piece_value(first);
    occ &= !BitBoard::from_square(from);

    let mut depth = 0usize;
    let mut to_move = !side;
    loop {
        let Some((from, kind)) = least_attacker(board, attackers_on(board, sq, to_move, occ))
        else {
            break;
        };
        depth += 1;
        if depth >= MAX_SWAPS {
            depth -= 1;
            break;
        }
        gain[depth] = occupier - gain[depth - 1];
        occupier = piece_value(kind);
        occ &= !BitBoard::from_square(from);
        to_move = !to_move;
    }

    // Backward pass: each side recaptures only when it pays.
    while depth > 0 {
        depth -= 1;
        gain[depth] = -((-gain[depth]).max(gain[depth + 1]));
    }
    gain[0]
}
