//! Opening book collaborator boundary.

use chess::ChessMove;

/// An opening book: given the moves played so far, propose continuations.
///
/// Implementations own their storage and parsing; the engine only consumes
/// candidates, checks them for legality, and plays one without invoking
/// the search at all.
pub trait OpeningBook: Send + Sync {
    fn probe(&self, played: &[ChessMove]) -> Vec<ChessMove>;
}

/// A fixed in-memory line, mainly useful for tests and demos.
pub struct ScriptedBook {
    line: Vec<ChessMove>,
}

impl ScriptedBook {
    pub fn new(line: Vec<ChessMove>) -> Self {
        Self { line }
    }
}

impl OpeningBook for ScriptedBook {
    fn probe(&self, played: &[ChessMove]) -> Vec<ChessMove> {
        if played.len() < self.line.len() && played == &self.line[..played.len()] {
            vec![self.line[played.len()]]
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn scripted_book_follows_its_line() {
        let e4 = ChessMove::from_str("e2e4").unwrap();
        let e5 = ChessMove::from_str("e7e5").unwrap();
        let book = ScriptedBook::new(vec![e4, e5]);
        assert_eq!(book.probe(&[]), vec![e4]);
        assert_eq!(book.probe(&[e4]), vec![e5]);
        assert!(book.probe(&[e4, e5]).is_empty());
        let d4 = ChessMove::from_str("d2d4").unwrap();
        assert!(book.probe(&[d4]).is_empty());
    }
}
