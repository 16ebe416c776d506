//! Shannon's 1949 evaluation: material, pawn-structure faults at half a
//! pawn each, and mobility at a tenth of a pawn per square.

use chess::{Board, Color, EMPTY, Piece, Rank, Square};

use crate::attacks::attacks_from;
use crate::eval::Evaluator;
use crate::eval::material::{MaterialWeights, material};

/// Penalty per doubled, isolated or backward pawn.
const PAWN_FAULT: i32 = 50;
/// Bonus per square of mobility advantage.
const MOBILITY: i32 = 10;

pub struct ShannonEval {
    pub weights: MaterialWeights,
}

impl Default for ShannonEval {
    fn default() -> Self {
        Self {
            weights: MaterialWeights::CLASSIC,
        }
    }
}

impl Evaluator for ShannonEval {
    fn evaluate(&self, board: &Board) -> i32 {
        let faults = pawn_faults(board, Color::White) - pawn_faults(board, Color::Black);
        let moves = mobility(board, Color::White) - mobility(board, Color::Black);
        material(board, &self.weights) - PAWN_FAULT * faults + MOBILITY * moves
    }
}

fn pawns_of(board: &Board, side: Color) -> chess::BitBoard {
    *board.pieces(Piece::Pawn) & *board.color_combined(side)
}

/// Doubled + isolated + backward pawns for one side.
fn pawn_faults(board: &Board, side: Color) -> i32 {
    let pawns = pawns_of(board, side);

    let mut doubled = 0;
    let mut isolated = 0;
    for file in chess::ALL_FILES {
        let on_file = (pawns & chess::get_file(file)).popcnt() as i32;
        if on_file > 1 {
            doubled += on_file - 1;
        }
        if on_file > 0 && pawns & chess::get_adjacent_files(file) == EMPTY {
            isolated += on_file;
        }
    }

    let mut backward = 0;
    for sq in pawns {
        if is_backward(board, sq, side) {
            backward += 1;
        }
    }

    doubled + isolated + backward
}

/// A pawn is backward when no friendly pawn on an adjacent file stands level
/// with or behind it and its stop square is covered by an enemy pawn.
fn is_backward(board: &Board, sq: Square, side: Color) -> bool {
    let pawns = pawns_of(board, side);
    let rank = sq.get_rank().to_index();
    let supported = (pawns & chess::get_adjacent_files(sq.get_file())).any(|p| {
        let r = p.get_rank().to_index();
        match side {
            Color::White => r <= rank,
            Color::Black => r >= rank,
        }
    });
    if supported {
        return false;
    }
    let Some(stop) = forward(sq, side) else {
        return false;
    };
    // enemy pawns covering the stop square sit exactly where a pawn of
    // `side` on that square would attack
    let enemy_pawns = pawns_of(board, !side);
    chess::get_pawn_attacks(stop, side, !EMPTY) & enemy_pawns != EMPTY
}

/// One square toward the enemy side, if it exists.
pub(crate) fn forward(sq: Square, side: Color) -> Option<Square> {
    let rank = sq.get_rank().to_index() as i32
        + match side {
            Color::White => 1,
            Color::Black => -1,
        };
    (0..=7)
        .contains(&rank)
        .then(|| Square::make_square(Rank::from_index(rank as usize), sq.get_file()))
}

/// Attack-count mobility for one side (squares not blocked by own pieces).
fn mobility(board: &Board, side: Color) -> i32 {
    let own = *board.color_combined(side);
    let mut count = 0;
    for sq in own {
        count += (attacks_from(board, sq) & !own).popcnt() as i32;
    }
    count
}
