//! Interactive console front end: play against one of the historical
//! engines. Pass the variant name as the first argument (default: newt).

use std::io::{self, BufRead, Write};
use std::str::FromStr;

use anyhow::{Result, bail};
use chess::{Board, BoardStatus, ChessMove, MoveGen};
use tracing::info;

use relic::{Engine, EngineError, History};

fn engine_by_name(name: &str) -> Option<Engine> {
    match name {
        "bare" => Some(Engine::bare()),
        "turochamp" => Some(Engine::turochamp()),
        "turochamp-parallel" => Some(Engine::turochamp_parallel(
            std::thread::available_parallelism().map_or(2, |n| n.get()),
        )),
        "bernstein" => Some(Engine::bernstein()),
        "shannon" => Some(Engine::shannon()),
        "soma" => Some(Engine::soma()),
        "newt" => Some(Engine::newt()),
        _ => None,
    }
}

/// Parse the user's move, SAN first, falling back to coordinate notation.
fn parse_move(board: &Board, text: &str) -> Option<ChessMove> {
    let mv = ChessMove::from_san(board, text)
        .ok()
        .or_else(|| ChessMove::from_str(text).ok())?;
    MoveGen::new_legal(board).any(|m| m == mv).then_some(mv)
}

fn announce_result(board: &Board) -> bool {
    match board.status() {
        BoardStatus::Ongoing => false,
        BoardStatus::Checkmate => {
            println!("Checkmate. Game over.");
            true
        }
        BoardStatus::Stalemate => {
            println!("Stalemate. Game over.");
            true
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let name = std::env::args().nth(1).unwrap_or_else(|| "newt".into());
    let Some(engine) = engine_by_name(&name) else {
        bail!(
            "unknown engine '{name}' (try bare, turochamp, turochamp-parallel, bernstein, shannon, soma, newt)"
        );
    };
    info!(engine = engine.name(), "starting");

    let mut board = Board::default();
    let mut history = History::new();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        println!("FEN: {board}");
        let mv = loop {
            print!("Your move? ");
            io::stdout().flush()?;
            let Some(line) = lines.next() else {
                return Ok(());
            };
            let line = line?;
            let text = line.trim();
            if text == "quit" {
                return Ok(());
            }
            match parse_move(&board, text) {
                Some(mv) => break mv,
                None => println!("Sorry? Try again. (Or type quit to quit.)"),
            }
        };
        history.push(&board, mv);
        board = board.make_move_new(mv);
        if announce_result(&board) {
            break;
        }

        match engine.getmove_with(&board, &history, |p| {
            let pv: Vec<String> = p.pv.iter().map(ToString::to_string).collect();
            println!(
                "info depth {} score cp {} time {} nodes {} pv {}",
                p.depth,
                p.score,
                p.elapsed.as_millis(),
                p.nodes,
                pv.join(" ")
            );
        }) {
            Ok(outcome) => {
                println!(
                    "My move: {} (score {} cp)",
                    outcome.best_move, outcome.score
                );
                history.push(&board, outcome.best_move);
                board = board.make_move_new(outcome.best_move);
                if announce_result(&board) {
                    break;
                }
            }
            Err(EngineError::GameOver(_)) => {
                announce_result(&board);
                break;
            }
            Err(e) => bail!(e),
        }
    }

    println!("THANK YOU FOR THIS INTERESTING GAME");
    Ok(())
}
