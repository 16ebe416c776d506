//! Attack lookups and move predicates over the rules engine.
//!
//! The `chess` crate exposes per-piece attack tables; these helpers combine
//! them into the attacker queries the search core and the evaluators need.

use chess::{BitBoard, Board, ChessMove, Color, EMPTY, Piece, Square};

/// All pieces of `side` attacking `sq` under the given occupancy.
///
/// Sliding attacks honor `occ`, so callers can reveal X-ray attackers by
/// clearing squares as an exchange progresses.
pub fn attackers_on(board: &Board, sq: Square, side: Color, occ: BitBoard) -> BitBoard {
    let knights = chess::get_knight_moves(sq) & *board.pieces(Piece::Knight);
    let kings = chess::get_king_moves(sq) & *board.pieces(Piece::King);
    let rook_like =
        chess::get_rook_moves(sq, occ) & (*board.pieces(Piece::Rook) | *board.pieces(Piece::Queen));
    let bishop_like = chess::get_bishop_moves(sq, occ)
        & (*board.pieces(Piece::Bishop) | *board.pieces(Piece::Queen));
    // A pawn of `side` attacks `sq` exactly where a `!side` pawn standing
    // on `sq` would attack.
    let pawns = chess::get_pawn_attacks(sq, !side, !EMPTY) & *board.pieces(Piece::Pawn);

    (knights | kings | rook_like | bishop_like | pawns) & *board.color_combined(side) & occ
}

/// Does `side` attack `sq`?
pub fn is_attacked(board: &Board, sq: Square, side: Color) -> bool {
    attackers_on(board, sq, side, *board.combined()) != EMPTY
}

/// Squares attacked by the piece standing on `sq` (empty square: empty set).
pub fn attacks_from(board: &Board, sq: Square) -> BitBoard {
    let occ = *board.combined();
    match board.piece_on(sq) {
        Some(Piece::Pawn) => match board.color_on(sq) {
            Some(color) => chess::get_pawn_attacks(sq, color, !EMPTY),
            None => EMPTY,
        },
        Some(Piece::Knight) => chess::get_knight_moves(sq),
        Some(Piece::Bishop) => chess::get_bishop_moves(sq, occ),
        Some(Piece::Rook) => chess::get_rook_moves(sq, occ),
        Some(Piece::Queen) => chess::get_bishop_moves(sq, occ) | chess::get_rook_moves(sq, occ),
        Some(Piece::King) => chess::get_king_moves(sq),
        None => EMPTY,
    }
}

/// Is `mv` a capture on `board`? A pawn changing file onto an empty square
/// is an en passant capture.
pub fn is_capture(board: &Board, mv: ChessMove) -> bool {
    if board.piece_on(mv.get_dest()).is_some() {
        return true;
    }
    board.piece_on(mv.get_source()) == Some(Piece::Pawn)
        && mv.get_source().get_file() != mv.get_dest().get_file()
}

/// Is `mv` a castling move (king travelling two files)?
pub fn is_castle(board: &Board, mv: ChessMove) -> bool {
    board.piece_on(mv.get_source()) == Some(Piece::King)
        && mv
            .get_source()
            .get_file()
            .to_index()
            .abs_diff(mv.get_dest().get_file().to_index())
            == 2
}

/// Does `mv` leave the opponent in check?
pub fn gives_check(board: &Board, mv: ChessMove) -> bool {
    *board.make_move_new(mv).checkers() != EMPTY
}

/// Is the side to move in check?
pub fn in_check(board: &Board) -> bool {
    *board.checkers() != EMPTY
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess::{MoveGen, Square};
    use std::str::FromStr;

    #[test]
    fn startpos_center_attackers() {
        let board = Board::default();
        // e4 is not attacked by anything on move one; e3 is covered by
        // White's d2 and f2 pawns.
        assert_eq!(
            attackers_on(&board, Square::E3, Color::White, *board.combined()).popcnt(),
            2
        );
        assert!(!is_attacked(&board, Square::E4, Color::Black));
    }

    #[test]
    fn en_passant_is_a_capture() {
        let board =
            Board::from_str("rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3")
                .unwrap();
        let ep = MoveGen::new_legal(&board)
            .find(|m| m.get_source() == Square::E5 && m.get_dest() == Square::D6)
            .expect("en passant should be legal");
        assert!(is_capture(&board, ep));
        assert!(board.piece_on(ep.get_dest()).is_none());
    }

    #[test]
    fn castling_detected() {
        let board =
            Board::from_str("r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4")
                .unwrap();
        let castle = MoveGen::new_legal(&board)
            .find(|m| is_castle(&board, *m))
            .expect("white can castle short");
        assert_eq!(castle.get_dest(), Square::G1);
        assert!(!is_capture(&board, castle));
    }

    #[test]
    fn queen_attack_set_matches_rook_plus_bishop() {
        let board = Board::from_str("4k3/8/8/8/3Q4/8/8/4K3 w - - 0 1").unwrap();
        let queen = attacks_from(&board, Square::D4);
        assert_eq!(queen.popcnt(), 27);
    }
}
