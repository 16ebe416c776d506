//! SOMA, the Smith One-Move Analyzer (1961).
//!
//! No tree search: every legal move is scored one ply deep from the mover's
//! point of view — material, attacked-square value, swap-off totals, and a
//! handful of move-shape bonuses — and the best score wins.

use chess::{BitBoard, Board, ChessMove, Color, EMPTY, MoveGen, Piece, Square};

use crate::attacks::{self, attacks_from};
use crate::eval::from_side;
use crate::eval::material::{MaterialWeights, material};
use crate::search::see::see;

/// Attacked-square values: next to the enemy king, the four center
/// squares, anywhere else.
const KING_RING_SQUARE: i32 = 30;
const CENTER_SQUARE: i32 = 20;
const PLAIN_SQUARE: i32 = 10;

/// Reward for castling right now.
const CASTLE_BONUS: i32 = 100;
/// Nudge away from squares a pawn advance could hit and from moving
/// pinned pieces.
const SHY_PENALTY: i32 = 1;

const CENTER: [Square; 4] = [Square::D4, Square::D5, Square::E4, Square::E5];

/// Score of one candidate move.
#[derive(Debug, Clone, Copy)]
pub struct MoveScore {
    pub mv: ChessMove,
    /// Full one-move score from the mover's perspective.
    pub score: i32,
    /// Material component alone (reported as the "position value").
    pub material: i32,
}

/// Score every legal move, in generation order.
pub fn analyze(board: &Board) -> Vec<MoveScore> {
    let side = board.side_to_move();
    let baseline = from_side(material(board, &MaterialWeights::CLASSIC), side)
        + square_value(board, side)
        + total_swap(board, side);
    let threatened = pawn_advance_threats(board, !side);
    let pinned = *board.pinned();

    MoveGen::new_legal(board)
        .map(|mv| {
            let mut bonus = 0;
            if attacks::is_castle(board, mv) {
                bonus += CASTLE_BONUS;
            }
            if threatened & BitBoard::from_square(mv.get_dest()) != EMPTY {
                bonus -= SHY_PENALTY;
            }
            if pinned & BitBoard::from_square(mv.get_source()) != EMPTY {
                bonus -= SHY_PENALTY;
            }
            let child = board.make_move_new(mv);
            let mat = from_side(material(&child, &MaterialWeights::CLASSIC), side);
            let score = mat
                + square_value(&child, side)
                + total_swap(&child, side) * 9 / 10
                + bonus
                - baseline;
            MoveScore {
                mv,
                score,
                material: mat,
            }
        })
        .collect()
}

/// Value of every square attacked by `side`'s pieces.
fn square_value(board: &Board, side: Color) -> i32 {
    let enemy_king_ring = chess::get_king_moves(board.king_square(!side));
    let mut score = 0;
    for sq in *board.color_combined(side) {
        for target in attacks_from(board, sq) {
            score += if enemy_king_ring & BitBoard::from_square(target) != EMPTY {
                KING_RING_SQUARE
            } else if CENTER.contains(&target) {
                CENTER_SQUARE
            } else {
                PLAIN_SQUARE
            };
        }
    }
    score
}

/// Swap-off values of `owner`'s pieces the opponent could profitably start
/// capturing, largest last.
fn hanging_values(board: &Board, owner: Color) -> Vec<i32> {
    let mut values: Vec<i32> = (*board.color_combined(owner))
        .map(|sq| see(board, sq, !owner).max(0))
        .filter(|&v| v > 0)
        .collect();
    values.sort_unstable();
    values
}

/// Net swap-off account for `side`: the worst own loss counts in full plus
/// a half-pawn per extra loose piece; of the enemy's loose pieces only the
/// second-best counts (the best one will run away), again with a half-pawn
/// per additional straggler.
fn total_swap(board: &Board, side: Color) -> i32 {
    let mut total = 0;

    let mut own = hanging_values(board, side);
    if let Some(worst) = own.pop() {
        total -= worst;
        total -= 50 * own.len() as i32;
    }

    let mut theirs = hanging_values(board, !side);
    match theirs.len() {
        0 => {}
        1 => total += 50,
        _ => {
            theirs.pop();
            total += theirs.pop().unwrap_or(0);
            total += 50 * theirs.len() as i32;
        }
    }

    total
}

/// Squares the enemy's pawn advances (single or double step) would attack.
fn pawn_advance_threats(board: &Board, enemy: Color) -> BitBoard {
    let occ = *board.combined();
    let mut covered = EMPTY;
    let pawns = *board.pieces(Piece::Pawn) & *board.color_combined(enemy);
    for sq in pawns {
        let Some(one) = crate::eval::shannon::forward(sq, enemy) else {
            continue;
        };
        if occ & BitBoard::from_square(one) != EMPTY {
            continue;
        }
        covered |= chess::get_pawn_attacks(one, enemy, !EMPTY);
        let home = match enemy {
            Color::White => 1,
            Color::Black => 6,
        };
        if sq.get_rank().to_index() == home
            && let Some(two) = crate::eval::shannon::forward(one, enemy)
            && occ & BitBoard::from_square(two) == EMPTY
        {
            covered |= chess::get_pawn_attacks(two, enemy, !EMPTY);
        }
    }
    covered
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn best(board: &Board) -> MoveScore {
        let scores = analyze(board);
        scores
            .iter()
            .copied()
            .max_by(|a, b| a.score.cmp(&b.score))
            .expect("position has legal moves")
    }

    #[test]
    fn startpos_scores_every_move() {
        let board = Board::default();
        assert_eq!(analyze(&board).len(), 20);
    }

    #[test]
    fn free_queen_gets_taken() {
        // Black queen on d5 hangs to the c4 pawn.
        let board = Board::from_str("4k3/8/8/3q4/2P5/8/8/4K3 w - - 0 1").unwrap();
        let top = best(&board);
        assert_eq!(top.mv, ChessMove::from_str("c4d5").unwrap());
        assert!(top.score > 0);
    }

    #[test]
    fn castle_bonus_applies() {
        let board =
            Board::from_str("4k3/8/8/8/8/8/8/4K2R w K - 0 1").unwrap();
        let castle = ChessMove::from_str("e1g1").unwrap();
        let scores = analyze(&board);
        let castle_score = scores.iter().find(|s| s.mv == castle).expect("castle is legal");
        // the rook lands actively and the bonus applies; castling should
        // beat the quiet king steps
        let king_step = scores
            .iter()
            .find(|s| s.mv == ChessMove::from_str("e1d1").unwrap())
            .expect("Kd1 is legal");
        assert!(castle_score.score > king_step.score);
    }

    #[test]
    fn analyze_is_deterministic() {
        let board = Board::default();
        let a: Vec<i32> = analyze(&board).iter().map(|s| s.score).collect();
        let b: Vec<i32> = analyze(&board).iter().map(|s| s.score).collect();
        assert_eq!(a, b);
    }
}
