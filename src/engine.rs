//! Engine variants and the `getmove` entry point.
//!
//! An [`Engine`] is a bundle of capability objects — evaluator, move
//! orderer, search mode and configuration — assembled once per variant.
//! `getmove` borrows a position, consults the opening book, runs the
//! configured driver, and always either returns a concrete legal move
//! with a score or an explicit end-of-game signal.

use std::time::Instant;

use chess::{Board, ChessMove, MoveGen};
use rand::seq::IndexedRandom;
use tracing::{debug_span, info};

use crate::book::OpeningBook;
use crate::config::{PmtConfig, SearchConfig, TimeBudget};
use crate::error::EngineError;
use crate::eval::Evaluator;
use crate::eval::bernstein::BernsteinPositional;
use crate::eval::material::{Material, MaterialWeights};
use crate::eval::pst::{PstEval, PstPositional};
use crate::eval::shannon::ShannonEval;
use crate::eval::soma;
use crate::eval::turing::{TuringPositional, castle_bonus};
use crate::search::control::SearchControl;
use crate::search::ordering::{MoveOrderer, MvvLvaOrderer, PvFirstOrderer};
use crate::search::root::{RootBonus, RootPlan};
use crate::search::{Progress, SearchOutcome, deepening, pool, root};
use crate::time::{DEFAULT_MOVETIME, deadline_for};

/// How the root of the search is driven.
enum SearchMode {
    /// Evaluate every root move at fixed depth, sequentially.
    FixedDepth,
    /// Iterative deepening under time control.
    Deepening,
    /// Single-ply move analysis (SOMA).
    OneMove,
    /// Evaluate root moves on a worker pool.
    ParallelRoot { threads: usize },
}

/// Game record threaded through `getmove` calls: moves feed the opening
/// book, position hashes feed repetition detection.
#[derive(Debug, Clone, Default)]
pub struct History {
    moves: Vec<ChessMove>,
    hashes: Vec<u64>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `mv` as played from `board`.
    pub fn push(&mut self, board: &Board, mv: ChessMove) {
        self.hashes.push(board.get_hash());
        self.moves.push(mv);
    }

    pub fn moves(&self) -> &[ChessMove] {
        &self.moves
    }

    pub fn hashes(&self) -> &[u64] {
        &self.hashes
    }
}

pub struct Engine {
    name: &'static str,
    evaluator: Box<dyn Evaluator>,
    /// Root positional term for the fixed-depth drivers.
    positional: Option<Box<dyn Evaluator>>,
    root_bonus: Option<RootBonus>,
    orderer: Box<dyn MoveOrderer>,
    book: Option<Box<dyn OpeningBook>>,
    mode: SearchMode,
    config: SearchConfig,
}

impl Engine {
    /// Plain fixed-depth alpha-beta: material search, piece-square delta
    /// at the root.
    pub fn bare() -> Self {
        let config = SearchConfig {
            max_depth: 4,
            pstab_percent: 100,
            ..SearchConfig::default()
        };
        Self {
            name: "bare",
            evaluator: Box::new(Material(MaterialWeights::TUROCHAMP)),
            positional: Some(Box::new(PstPositional {
                percent: config.pstab_percent,
            })),
            root_bonus: None,
            orderer: Box::new(MvvLvaOrderer),
            book: None,
            mode: SearchMode::FixedDepth,
            config,
        }
    }

    /// Turing's paper machine: material search with quiescence, the
    /// considerable-move positional value and castle bonuses at the root.
    pub fn turochamp() -> Self {
        Self {
            name: "turochamp",
            evaluator: Box::new(Material(MaterialWeights::TUROCHAMP)),
            positional: Some(Box::new(TuringPositional)),
            root_bonus: Some(castle_bonus),
            orderer: Box::new(MvvLvaOrderer),
            book: None,
            mode: SearchMode::FixedDepth,
            config: SearchConfig {
                max_depth: 4,
                qplies: 7,
                matetest: true,
                ..SearchConfig::default()
            },
        }
    }

    /// Turochamp with its root moves fanned out over a worker pool.
    pub fn turochamp_parallel(threads: usize) -> Self {
        let mut engine = Self::turochamp();
        engine.name = "turochamp-parallel";
        engine.mode = SearchMode::ParallelRoot { threads };
        engine
    }

    /// Bernstein 1958: plausible-move table, mobility tie-break, the
    /// search score dominating the ranking.
    pub fn bernstein() -> Self {
        Self {
            name: "bernstein",
            evaluator: Box::new(Material(MaterialWeights::CLASSIC)),
            positional: Some(Box::new(BernsteinPositional)),
            root_bonus: None,
            orderer: Box::new(MvvLvaOrderer),
            book: None,
            mode: SearchMode::FixedDepth,
            config: SearchConfig {
                max_depth: 4,
                pmt: Some(PmtConfig::default()),
                search_weight: 10_000,
                ..SearchConfig::default()
            },
        }
    }

    /// Shannon 1949: shallow full-width search, long quiescence, pawn
    /// structure and mobility folded into the evaluation.
    pub fn shannon() -> Self {
        Self {
            name: "shannon",
            evaluator: Box::new(ShannonEval::default()),
            positional: None,
            root_bonus: None,
            orderer: Box::new(MvvLvaOrderer),
            book: None,
            mode: SearchMode::FixedDepth,
            config: SearchConfig {
                max_depth: 2,
                qplies: 6,
                matetest: true,
                ..SearchConfig::default()
            },
        }
    }

    /// SOMA 1961, the one-move analyzer.
    pub fn soma() -> Self {
        Self {
            name: "soma",
            evaluator: Box::new(Material(MaterialWeights::CLASSIC)),
            positional: None,
            root_bonus: None,
            orderer: Box::new(MvvLvaOrderer),
            book: None,
            mode: SearchMode::OneMove,
            config: SearchConfig {
                max_depth: 1,
                ..SearchConfig::default()
            },
        }
    }

    /// Newt: iterative deepening, PV-first ordering, time management.
    pub fn newt() -> Self {
        let config = SearchConfig {
            max_depth: 14,
            qplies: 6,
            pstab_percent: 10,
            matetest: true,
            time: TimeBudget::PerMove(DEFAULT_MOVETIME),
            ..SearchConfig::default()
        };
        Self {
            name: "newt",
            evaluator: Box::new(PstEval {
                weights: MaterialWeights::NEWT,
                percent: config.pstab_percent,
            }),
            positional: None,
            root_bonus: None,
            orderer: Box::new(PvFirstOrderer),
            book: None,
            mode: SearchMode::Deepening,
            config,
        }
    }

    /// A fixed-depth engine from custom parts, for tests and experiments.
    pub fn custom(
        name: &'static str,
        evaluator: Box<dyn Evaluator>,
        orderer: Box<dyn MoveOrderer>,
        config: SearchConfig,
    ) -> Self {
        Self {
            name,
            evaluator,
            positional: None,
            root_bonus: None,
            orderer,
            book: None,
            mode: SearchMode::FixedDepth,
            config,
        }
    }

    /// Attach an opening book.
    pub fn with_book(mut self, book: Box<dyn OpeningBook>) -> Self {
        self.book = Some(book);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut SearchConfig {
        &mut self.config
    }

    /// Compute the best move for `board`.
    pub fn getmove(&self, board: &Board, history: &History) -> Result<SearchOutcome, EngineError> {
        self.getmove_with(board, history, |_| {})
    }

    /// Compute the best move, forwarding per-depth progress records to the
    /// given sink.
    pub fn getmove_with(
        &self,
        board: &Board,
        history: &History,
        mut on_progress: impl FnMut(&Progress),
    ) -> Result<SearchOutcome, EngineError> {
        let span = debug_span!("getmove", engine = self.name);
        let _enter = span.enter();

        if MoveGen::new_legal(board).len() == 0 {
            return Err(EngineError::GameOver(board.status()));
        }

        if let Some(book) = &self.book
            && let Some(mv) = pick_book_move(book.as_ref(), board, history)
        {
            info!(%mv, "book move");
            return Ok(SearchOutcome {
                best_move: mv,
                score: 0,
                pv: vec![mv],
                nodes: 0,
                depth: 0,
            });
        }

        let control = SearchControl::new(
            deadline_for(self.config.time, Instant::now()),
            Some(self.config.max_nodes),
        );
        let plan = RootPlan {
            evaluator: self.evaluator.as_ref(),
            positional: self.positional.as_deref(),
            root_bonus: self.root_bonus,
            orderer: self.orderer.as_ref(),
            config: &self.config,
            control: &control,
            history: history.hashes(),
        };

        match self.mode {
            SearchMode::FixedDepth => root::root_search(board, &plan),
            SearchMode::ParallelRoot { threads } => {
                pool::parallel_root_search(board, threads, &plan)
            }
            SearchMode::Deepening => deepening::deepening_search(
                board,
                self.evaluator.as_ref(),
                self.orderer.as_ref(),
                &self.config,
                &control,
                history.hashes(),
                &mut on_progress,
            ),
            SearchMode::OneMove => one_move_analysis(board),
        }
    }
}

/// SOMA's single-ply analysis, wrapped into the common outcome shape.
/// Ties resolve to the earliest move in generation order.
fn one_move_analysis(board: &Board) -> Result<SearchOutcome, EngineError> {
    let scores = soma::analyze(board);
    let nodes = scores.len() as u64;
    let best = scores
        .into_iter()
        .enumerate()
        .min_by_key(|(index, s)| (std::cmp::Reverse(s.score), *index))
        .map(|(_, s)| s)
        .ok_or(EngineError::GameOver(board.status()))?;
    Ok(SearchOutcome {
        best_move: best.mv,
        score: best.score,
        pv: vec![best.mv],
        nodes,
        depth: 1,
    })
}

/// A legal book candidate, if the book has one for this line.
fn pick_book_move(book: &dyn OpeningBook, board: &Board, history: &History) -> Option<ChessMove> {
    let legal: Vec<ChessMove> = MoveGen::new_legal(board).collect();
    let candidates: Vec<ChessMove> = book
        .probe(history.moves())
        .into_iter()
        .filter(|mv| legal.contains(mv))
        .collect();
    candidates.choose(&mut rand::rng()).copied()
}
