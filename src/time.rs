//! Time management: convert clock parameters into a search deadline.

use std::time::{Duration, Instant};

use crate::config::TimeBudget;

/// Default thinking time when a timed engine gets no clock information.
pub const DEFAULT_MOVETIME: Duration = Duration::from_secs(5);

/// Assumed number of moves left when clock mode supplies none.
const DEFAULT_MOVES_TO_GO: u32 = 60;

/// Cushion of extra moves budgeted for, so the flag never falls.
const MOVE_CUSHION: u32 = 3;

/// The wall-clock moment the search must stop at, if any.
pub fn deadline_for(budget: TimeBudget, now: Instant) -> Option<Instant> {
    match budget {
        TimeBudget::PerMove(duration) => Some(now + duration),
        TimeBudget::Clock {
            remaining,
            moves_to_go,
        } => {
            let mtg = moves_to_go.unwrap_or(DEFAULT_MOVES_TO_GO).max(1);
            Some(now + remaining / (mtg + MOVE_CUSHION))
        }
        TimeBudget::Infinite => None,
    }
}
