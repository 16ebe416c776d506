//! Engine error taxonomy.

use chess::BoardStatus;
use thiserror::Error;

/// Errors surfaced by [`Engine::getmove`](crate::engine::Engine::getmove).
///
/// Budget exhaustion is deliberately absent: running out of time or nodes
/// is a controlled early termination, not an error.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum EngineError {
    /// The root position has no legal moves (checkmate or stalemate).
    #[error("game over: {0:?}")]
    GameOver(BoardStatus),
    /// The worker pool produced no verdict for any root move before the
    /// deadline.
    #[error("no root move was evaluated before the deadline")]
    NoVerdicts,
}
