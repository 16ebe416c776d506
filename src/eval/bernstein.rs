//! Bernstein (1958) positional value.
//!
//! Three ingredients, each a raw count: piece mobility, contested empty
//! squares (credited to whichever side brings more attackers), and control
//! of the empty squares around one's own king when the supporting pieces
//! still outnumber the besiegers. The counts are small, so the search
//! score dominates at the root and this term breaks ties.

use chess::{BitBoard, Board, Color, EMPTY};

use crate::attacks::{attackers_on, attacks_from};
use crate::eval::Evaluator;

/// Bernstein positional evaluator (count units, White perspective).
pub struct BernsteinPositional;

impl Evaluator for BernsteinPositional {
    fn evaluate(&self, board: &Board) -> i32 {
        side_value(board, Color::White) - side_value(board, Color::Black)
    }
}

fn side_value(board: &Board, side: Color) -> i32 {
    let occ = *board.combined();
    let own = *board.color_combined(side);

    let mut mobility = 0;
    for sq in own {
        mobility += (attacks_from(board, sq) & !own).popcnt() as i32;
    }

    let king_zone = chess::get_king_moves(board.king_square(side));
    let mut contested = 0;
    let mut king_ring = 0;
    for sq in !occ {
        let mine = attackers_on(board, sq, side, occ).popcnt() as i32;
        let theirs = attackers_on(board, sq, !side, occ).popcnt() as i32;
        if mine > theirs {
            contested += mine;
        }
        // the king defends this square; its helpers must still outnumber
        // the attackers on their own
        if king_zone & BitBoard::from_square(sq) != EMPTY && mine - 1 > theirs {
            king_ring += mine;
        }
    }

    mobility + contested + king_ring
}
