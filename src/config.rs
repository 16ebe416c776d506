//! Scalar configuration knobs, read once per `getmove` call.

use std::time::Duration;

/// Plausible-move-table settings (Bernstein-style breadth pruning).
#[derive(Debug, Clone, Copy)]
pub struct PmtConfig {
    /// Maximum number of table entries.
    pub len: usize,
    /// First ply (counted from the root) at which the filter applies.
    pub start_ply: usize,
}

impl Default for PmtConfig {
    fn default() -> Self {
        Self { len: 7, start_ply: 0 }
    }
}

/// Wall-clock allocation for one move.
#[derive(Debug, Clone, Copy)]
pub enum TimeBudget {
    /// Think for a fixed duration.
    PerMove(Duration),
    /// Derive the move time from the remaining clock.
    Clock {
        remaining: Duration,
        moves_to_go: Option<u32>,
    },
    /// No wall-clock limit; depth and node budgets still apply.
    Infinite,
}

impl Default for TimeBudget {
    fn default() -> Self {
        TimeBudget::Infinite
    }
}

/// Search knobs shared by every engine variant.
///
/// `max_depth` counts plies including the root move, so the kernel explores
/// `max_depth - 1` plies below each root candidate. `qplies` bounds the
/// quiescence extension beyond the nominal horizon (0 disables it).
#[derive(Debug, Clone, Copy)]
pub struct SearchConfig {
    pub max_depth: u8,
    pub qplies: u8,
    /// Percentage applied to piece-square-table terms (100 = full weight).
    pub pstab_percent: i32,
    /// Node budget for one `getmove` call.
    pub max_nodes: u64,
    pub time: TimeBudget,
    /// Adjudicate repetition and insufficient-material draws inside the tree.
    pub matetest: bool,
    pub pmt: Option<PmtConfig>,
    /// Weight of the search score against the positional term when ranking
    /// root moves. 1 treats them equally; large values make the search
    /// score dominate and leave the positional term as a tie-break.
    pub search_weight: i64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: 4,
            qplies: 0,
            pstab_percent: 100,
            max_nodes: 1_000_000,
            time: TimeBudget::Infinite,
            matetest: false,
            pmt: None,
            search_weight: 1,
        }
    }
}
