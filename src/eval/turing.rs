//! Positional play value in the manner of Turing's paper machine.
//!
//! Each piece contributes the square root of its mobility (empty squares
//! reachable count one, enemy-occupied two), minor pieces and rooks earn a
//! bonus for being defended, the king is penalised for sitting on an
//! exposed square (measured by how mobile a queen standing there would be),
//! and pawns score for advancement and for being defended. Checking the
//! enemy king and threatening mate on the move add tempo points.
//!
//! Turing's scheme scored the machine's side only; here both sides are
//! tallied and differenced so one evaluator serves either color.

use chess::{BitBoard, Board, BoardStatus, Color, EMPTY, MoveGen, Piece};

use crate::attacks::{attackers_on, attacks_from, in_check};
use crate::eval::Evaluator;

/// Turing-style positional evaluator (centipawns, White perspective).
pub struct TuringPositional;

impl Evaluator for TuringPositional {
    fn evaluate(&self, board: &Board) -> i32 {
        let raw = side_value(board, Color::White) - side_value(board, Color::Black)
            + tempo_terms(board);
        (raw * 100.0).round() as i32
    }
}

/// Mobility counts for an attack set: empty squares are worth one point,
/// enemy-occupied squares two.
fn square_points(board: &Board, attacks: BitBoard, side: Color) -> u32 {
    let enemy = *board.color_combined(!side);
    let empty = !*board.combined();
    (attacks & empty).popcnt() + 2 * (attacks & enemy).popcnt()
}

fn side_value(board: &Board, side: Color) -> f64 {
    let occ = *board.combined();
    let mut ppv = 0.0;

    for sq in *board.color_combined(side) {
        let Some(piece) = board.piece_on(sq) else {
            continue;
        };
        match piece {
            Piece::Pawn => {
                let rank = sq.get_rank().to_index();
                let advance = match side {
                    Color::White => rank.saturating_sub(1),
                    Color::Black => 6usize.saturating_sub(rank),
                };
                ppv += 0.2 * advance as f64;
                if attackers_on(board, sq, side, occ) != EMPTY {
                    ppv += 0.3;
                }
            }
            _ => {
                ppv += f64::from(square_points(board, attacks_from(board, sq), side)).sqrt();
                if piece != Piece::Queen && piece != Piece::King {
                    match attackers_on(board, sq, side, occ).popcnt() {
                        0 => {}
                        1 => ppv += 1.0,
                        _ => ppv += 0.5,
                    }
                }
                if piece == Piece::King {
                    // Exposure: how far a queen standing on the king's
                    // square would see.
                    let queen_view =
                        chess::get_bishop_moves(sq, occ) | chess::get_rook_moves(sq, occ);
                    ppv -= f64::from(square_points(board, queen_view, side)).sqrt();
                }
            }
        }
    }
    ppv
}

/// Check and mate-threat points for the side to move, White-positive.
fn tempo_terms(board: &Board) -> f64 {
    let side = board.side_to_move();
    let mut t = 0.0;
    if in_check(board) {
        // the checked side is the one in trouble
        t -= 0.5;
    } else {
        let mut threats = 0;
        for mv in MoveGen::new_legal(board) {
            if board.make_move_new(mv).status() == BoardStatus::Checkmate {
                threats += 1;
            }
        }
        t += f64::from(threats);
    }
    match side {
        Color::White => t,
        Color::Black => -t,
    }
}

/// Castle bonuses applied to root moves, one point each: castling right
/// now, keeping the right to castle, and being able to castle next move.
pub fn castle_bonus(board: &Board, mv: chess::ChessMove, child: &Board) -> i32 {
    use chess::CastleRights;

    use crate::attacks::is_castle;

    let side = board.side_to_move();
    let mut bonus = 0;
    if is_castle(board, mv) {
        bonus += 100;
    }
    if board.castle_rights(side) != CastleRights::NoRights
        && child.castle_rights(side) != CastleRights::NoRights
    {
        bonus += 100;
    }
    // could we castle on our very next move?
    if let Some(ours) = child.null_move()
        && MoveGen::new_legal(&ours).any(|m| is_castle(&ours, m))
    {
        bonus += 100;
    }
    bonus
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess::ChessMove;
    use std::str::FromStr;

    #[test]
    fn starting_position_is_symmetric() {
        let board = Board::default();
        assert_eq!(TuringPositional.evaluate(&board), 0);
    }

    #[test]
    fn developed_knight_beats_home_knight() {
        let developed = Board::from_str("4k3/8/8/8/8/5N2/8/4K3 w - - 0 1").unwrap();
        let home = Board::from_str("4k3/8/8/8/8/8/8/4K1N1 w - - 0 1").unwrap();
        assert!(TuringPositional.evaluate(&developed) > TuringPositional.evaluate(&home));
    }

    #[test]
    fn defended_minor_earns_a_point() {
        let defended = Board::from_str("4k3/8/8/8/8/2N5/1P6/4K3 w - - 0 1").unwrap();
        let alone = Board::from_str("4k3/8/8/8/8/2N5/8/4K3 w - - 0 1").unwrap();
        // The pawn also adds its own terms; the gap must at least cover the
        // one-point defense bonus.
        assert!(
            TuringPositional.evaluate(&defended) - TuringPositional.evaluate(&alone) >= 100
        );
    }

    #[test]
    fn castling_keeps_its_bonus() {
        let board =
            Board::from_str("r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4")
                .unwrap();
        let castle = ChessMove::from_str("e1g1").unwrap();
        let quiet = ChessMove::from_str("a2a3").unwrap();
        let castled = board.make_move_new(castle);
        let waited = board.make_move_new(quiet);
        assert!(castle_bonus(&board, castle, &castled) >= 100);
        // a quiet move keeps the rights and the chance to castle next move
        assert!(castle_bonus(&board, quiet, &waited) >= 200);
    }
}
