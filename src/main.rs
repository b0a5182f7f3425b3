//! Derivative Dash text-mode driver
//!
//! Thin presentation wrapper around the core: runs the race loop in a
//! terminal, prints HUD lines and reads checkpoint answers from stdin. All
//! gameplay decisions live in the library.

use std::io::{self, BufRead, Write as _};
use std::time::{SystemTime, UNIX_EPOCH};

use derivative_dash::funcgen::{Family, FunctionGenerator};
use derivative_dash::sim::{Difficulty, Phase, RaceState, tick};

struct Options {
    difficulty: Difficulty,
    seed: u64,
    /// Race a generated record instead of the catalog, optionally pinning the family
    generated: Option<Option<Family>>,
    /// Dump the final race state as JSON (debugging)
    dump_state: bool,
}

const USAGE: &str = "usage: derivative-dash [--difficulty easy|normal|hard] [--seed N] \
[--generated [FAMILY]] [--dump-state]";

impl Options {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self, String> {
        let mut options = Options {
            difficulty: Difficulty::Normal,
            seed: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0),
            generated: None,
            dump_state: false,
        };

        let mut iter = args.into_iter().peekable();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--difficulty" => {
                    let value = iter.next().ok_or("--difficulty needs a value")?;
                    options.difficulty =
                        value.parse::<Difficulty>().map_err(|e| e.to_string())?;
                }
                "--seed" => {
                    let value = iter.next().ok_or("--seed needs a value")?;
                    options.seed = value.parse().map_err(|e| format!("bad seed: {e}"))?;
                }
                "--generated" => {
                    let family = match iter.peek() {
                        Some(value) if !value.starts_with("--") => Some(
                            iter.next()
                                .unwrap()
                                .parse::<Family>()
                                .map_err(|e| e.to_string())?,
                        ),
                        _ => None,
                    };
                    options.generated = Some(family);
                }
                "--dump-state" => options.dump_state = true,
                "--help" | "-h" => return Err(USAGE.to_string()),
                other => return Err(format!("unknown argument: {other}\n{USAGE}")),
            }
        }
        Ok(options)
    }
}

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let options = Options::parse(std::env::args().skip(1))?;

    let mut state = match options.generated {
        Some(family) => {
            let mut generator = FunctionGenerator::new(options.seed);
            let record = generator.generate(family, options.difficulty.level() as u8);
            RaceState::with_record(options.difficulty, record)
        }
        None => RaceState::new(options.difficulty, options.seed),
    };

    println!("=== Derivative Dash ===");
    println!("{}: {}", state.record.name, state.record.formula);
    println!(
        "Difficulty: {} | {} checkpoints | seed {}",
        state.difficulty.as_str(),
        state.checkpoints.len(),
        options.seed
    );

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut next_marker = 100.0;

    loop {
        match state.phase {
            Phase::Driving => {
                tick(&mut state);
                if state.car_x >= next_marker {
                    println!(
                        "x = {:>4.0} | f(x) = {:>8.2} | score {}",
                        state.car_x,
                        state.record.evaluate(state.car_x),
                        state.score
                    );
                    next_marker += 100.0;
                }
            }
            Phase::AwaitingAnswer => {
                println!("{}", state.message);
                print!("> ");
                io::stdout().flush().map_err(|e| e.to_string())?;
                let Some(line) = lines.next() else {
                    println!("(no more input, abandoning the race)");
                    break;
                };
                let line = line.map_err(|e| e.to_string())?;
                state.submit_answer(&line);
                println!("{}", state.message);
            }
            Phase::Crashed | Phase::Finished => {
                println!("{}", state.message);
                if let Some(detail) = &state.last_error {
                    println!(
                        "You answered {} for {} at x = {:.0}; the correct value was {:.4}.",
                        detail.user_value,
                        detail.kind.label(),
                        detail.x,
                        detail.correct_value
                    );
                }
                println!("Final score: {}", state.score);
                break;
            }
        }
    }

    if options.dump_state {
        let json = serde_json::to_string_pretty(&state).map_err(|e| e.to_string())?;
        println!("{json}");
    }
    Ok(())
}
