//! Interactive menu driving a `Number` through the history engine.
//!
//! Run with `cargo run --example number_menu`. Pass `-v` to see engine
//! transitions on stderr.

use history_engine::{History, HistoryError, Number, NumberOp};
use std::io::{self, BufRead, Write};

const MENU: &str =
    "Exit[0], Double[1], Half[2], IncreaseByOne[3], DecreaseByOne[4], Undo[5], Redo[6]: ";

enum Choice {
    Exit,
    Apply(NumberOp),
    Undo,
    Redo,
}

fn parse_choice(input: &str) -> Result<Choice, HistoryError> {
    match input.trim() {
        "0" => Ok(Choice::Exit),
        "1" => Ok(Choice::Apply(NumberOp::Double)),
        "2" => Ok(Choice::Apply(NumberOp::Halve)),
        "3" => Ok(Choice::Apply(NumberOp::IncrementByOne)),
        "4" => Ok(Choice::Apply(NumberOp::DecrementByOne)),
        "5" => Ok(Choice::Undo),
        "6" => Ok(Choice::Redo),
        other => other.parse().map(Choice::Apply),
    }
}

fn prompt(out: &mut impl Write, text: &str) -> io::Result<()> {
    write!(out, "{}", text)?;
    out.flush()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let verbose = std::env::args().any(|arg| arg == "-v");
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(if verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .init();

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut lines = stdin.lock().lines();

    prompt(&mut stdout, "Integer: ")?;
    let start: i64 = match lines.next() {
        Some(line) => line?.trim().parse()?,
        None => return Ok(()),
    };

    let mut number = Number::new(start);
    let mut history = History::new();

    loop {
        prompt(&mut stdout, MENU)?;
        let Some(line) = lines.next() else { break };
        let line = line?;

        let outcome = match parse_choice(&line) {
            Ok(Choice::Exit) => break,
            Ok(Choice::Apply(op)) => history.execute(&mut number, op),
            Ok(Choice::Undo) => history.undo(&mut number),
            Ok(Choice::Redo) => history.redo(&mut number),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(()) => {}
            Err(e) if e.is_boundary() => writeln!(stdout, "   *** {} ***", e)?,
            Err(e @ HistoryError::InvalidOperation(_)) => writeln!(stdout, "   {}", e)?,
            Err(e @ HistoryError::TargetRejected(_)) => writeln!(stdout, "   {}", e)?,
            Err(e) => return Err(e.into()),
        }

        writeln!(
            stdout,
            "   {} ({}, {:.2}) [{}/{}]",
            number.value(),
            number.name(),
            number.decimal(),
            history.position(),
            history.len()
        )?;
    }

    Ok(())
}
