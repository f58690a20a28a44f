//! Interactive REPL
//!
//! `<operation> <a> [<b>]` runs a calculation; everything else is a session
//! command (`history`, `undo`, `redo`, `clear`, `save`, `load`, `operations`,
//! `help`, `exit`).

use std::io::{self, Write};

use abacus_core::Arity;
use anyhow::{Context, Result};
use colored::*;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Editor, Helper};
use tracing::{debug, info};

use crate::session::Calculator;

pub const PROMPT: &str = "abacus> ";

const COMMANDS: &[&str] = &[
    "history",
    "undo",
    "redo",
    "clear",
    "save",
    "load",
    "operations",
    "help",
    "exit",
    "quit",
];

// ============================================================================
// Tab Completion Helper
// ============================================================================

/// Completes the first word against session commands and operation names
struct CalcHelper {
    words: Vec<String>,
}

impl CalcHelper {
    fn new(calc: &Calculator) -> Self {
        let mut words: Vec<String> = COMMANDS.iter().map(|c| (*c).to_string()).collect();
        words.extend(calc.registry().names().into_iter().map(str::to_string));
        Self { words }
    }

    fn complete_word(&self, prefix: &str) -> Vec<Pair> {
        let prefix = prefix.to_lowercase();
        self.words
            .iter()
            .filter(|w| w.starts_with(&prefix))
            .map(|w| Pair {
                display: w.clone(),
                replacement: w.clone(),
            })
            .collect()
    }
}

impl Helper for CalcHelper {}

impl Hinter for CalcHelper {
    type Hint = String;

    fn hint(&self, _line: &str, _pos: usize, _ctx: &rustyline::Context<'_>) -> Option<String> {
        None
    }
}

impl Highlighter for CalcHelper {}

impl Validator for CalcHelper {}

impl Completer for CalcHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        if line.contains(' ') {
            return Ok((pos, vec![]));
        }
        Ok((0, self.complete_word(line)))
    }
}

// ============================================================================
// Loop
// ============================================================================

/// Read-eval-print loop until `exit`, Ctrl+C or Ctrl+D
pub fn run_repl(calc: &mut Calculator) -> Result<()> {
    let config = rustyline::Config::builder()
        .completion_type(rustyline::CompletionType::List)
        .build();
    let mut rl = Editor::with_config(config).context("Failed to initialize readline")?;
    rl.set_helper(Some(CalcHelper::new(calc)));

    print_banner();
    info!("Calculator session started");

    let mut stdout = io::stdout();
    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                // Add to history (ignore errors)
                let _ = rl.add_history_entry(line);

                match execute_repl_command(calc, line, &mut stdout) {
                    Ok(true) => continue,
                    Ok(false) => break,
                    Err(e) => eprintln!("{} {:#}", "Error:".red(), e),
                }
            },
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                println!("\nExiting the calculator. Goodbye!");
                break;
            },
            Err(e) => {
                eprintln!("{} {}", "Readline error:".red(), e);
                break;
            },
        }
    }

    info!("Calculator session ended");
    Ok(())
}

/// Execute one line of input
///
/// Returns Ok(true) to continue, Ok(false) to quit. Calculation and I/O
/// failures come back as `Err` so the loop can report them and carry on.
pub fn execute_repl_command<W: Write>(calc: &mut Calculator, input: &str, out: &mut W) -> Result<bool> {
    let parts: Vec<&str> = input.split_whitespace().collect();
    let Some(first) = parts.first() else {
        return Ok(true);
    };
    let cmd = first.to_lowercase();
    debug!("REPL command: {}", input);

    match cmd.as_str() {
        "help" | "?" => print_help(calc, out)?,
        "exit" | "quit" | "q" => {
            writeln!(out, "Exiting the calculator. Goodbye!")?;
            return Ok(false);
        },
        "history" => print_history(calc, out)?,
        "undo" => match calc.undo() {
            Ok(undone) => writeln!(out, "Undid: {}", undone)?,
            Err(e) if e.is_empty_history() => writeln!(out, "Nothing to undo.")?,
            Err(e) => return Err(e.into()),
        },
        "redo" => match calc.redo() {
            Ok(redone) => writeln!(out, "Redid: {}", redone)?,
            Err(e) if e.is_empty_history() => writeln!(out, "Nothing to redo.")?,
            Err(e) => return Err(e.into()),
        },
        "clear" => {
            calc.clear();
            writeln!(out, "History cleared.")?;
        },
        "save" => {
            let path = calc.save()?;
            writeln!(out, "History saved to {}", path.display())?;
        },
        "load" => print_saved(calc, out)?,
        "operations" => print_operations(calc, out)?,
        name if calc.registry().contains(name) => run_operation(calc, name, &parts[1..], out)?,
        unknown => writeln!(
            out,
            "Unknown command: {}. Type '{}' for available commands.",
            unknown.red(),
            "help".bright_yellow()
        )?,
    }

    Ok(true)
}

fn run_operation<W: Write>(calc: &mut Calculator, name: &str, args: &[&str], out: &mut W) -> Result<()> {
    let arity = match calc.registry().get(name) {
        Some(op) => op.arity(),
        None => return Ok(()),
    };

    if args.len() != arity.operand_count() {
        match arity {
            Arity::Unary => writeln!(out, "Usage: {} <a>", name)?,
            Arity::Binary => writeln!(out, "Usage: {} <a> <b>", name)?,
        }
        return Ok(());
    }

    let a = parse_operand(args[0])?;
    let b = match arity {
        Arity::Unary => 0.0,
        Arity::Binary => parse_operand(args[1])?,
    };

    let result = calc.calculate(name, a, b)?;
    let shown = result.result().map(|r| calc.round(r));
    match shown {
        Some(value) => writeln!(out, "{} {}", "Result:".green(), value)?,
        None => writeln!(out, "{} (none)", "Result:".green())?,
    }
    Ok(())
}

fn parse_operand(raw: &str) -> Result<f64> {
    raw.parse::<f64>()
        .with_context(|| format!("Invalid number: '{}'", raw))
}

fn print_history<W: Write>(calc: &Calculator, out: &mut W) -> Result<()> {
    let history = calc.history();
    if history.is_empty() {
        writeln!(out, "No calculations in history.")?;
        return Ok(());
    }

    writeln!(out, "{}", "Calculation History:".bright_cyan())?;
    for (idx, entry) in history.iter().enumerate() {
        let result = entry
            .result()
            .map(|r| calc.round(r).to_string())
            .unwrap_or_default();
        writeln!(out, "  {}. {} = {}", idx + 1, entry, result)?;
    }
    Ok(())
}

pub fn print_saved<W: Write>(calc: &Calculator, out: &mut W) -> Result<()> {
    let records = calc.load()?;
    if records.is_empty() {
        writeln!(out, "Saved history is empty.")?;
        return Ok(());
    }

    writeln!(
        out,
        "{:<18} {:>12} {:>12} {:>14}",
        "operation", "operand1", "operand2", "result"
    )?;
    for record in &records {
        let result = record.result.map(|r| r.to_string()).unwrap_or_default();
        writeln!(
            out,
            "{:<18} {:>12} {:>12} {:>14}",
            record.operation, record.operand1, record.operand2, result
        )?;
    }
    writeln!(out, "Loaded {} saved calculation(s).", records.len())?;
    Ok(())
}

pub fn print_operations<W: Write>(calc: &Calculator, out: &mut W) -> Result<()> {
    writeln!(out, "{}", "=== Operations ===".bright_cyan())?;
    let registry = calc.registry();
    for op in registry.operations() {
        let usage = match op.arity() {
            Arity::Unary => format!("{} <a>", op.name()),
            Arity::Binary => format!("{} <a> <b>", op.name()),
        };
        let aliases = registry.aliases_of(op.name());
        if aliases.is_empty() {
            writeln!(out, "  {:<28} {}", usage.bright_yellow(), op.summary())?;
        } else {
            writeln!(
                out,
                "  {:<28} {} (alias: {})",
                usage.bright_yellow(),
                op.summary(),
                aliases.join(", ")
            )?;
        }
    }
    Ok(())
}

fn print_help<W: Write>(calc: &Calculator, out: &mut W) -> Result<()> {
    writeln!(out)?;
    print_operations(calc, out)?;
    writeln!(out)?;
    writeln!(out, "{}", "=== Commands ===".bright_cyan())?;
    writeln!(out, "  {}     Show calculation history", "history".bright_yellow())?;
    writeln!(out, "  {}        Undo the last calculation", "undo".bright_yellow())?;
    writeln!(out, "  {}        Redo the last undone calculation", "redo".bright_yellow())?;
    writeln!(out, "  {}       Clear history and undo/redo", "clear".bright_yellow())?;
    writeln!(out, "  {}        Save history to CSV", "save".bright_yellow())?;
    writeln!(out, "  {}        Show the saved history CSV", "load".bright_yellow())?;
    writeln!(out, "  {}  List available operations", "operations".bright_yellow())?;
    writeln!(out, "  {}        Show this help message", "help".bright_yellow())?;
    writeln!(out, "  {}        Exit the calculator", "exit".bright_yellow())?;
    writeln!(out)?;
    writeln!(out, "{}", "=== Examples ===".bright_cyan())?;
    writeln!(out, "  add 2 3          5")?;
    writeln!(out, "  power 2 10       1024")?;
    writeln!(out, "  sqrt 16          4")?;
    Ok(())
}

fn print_banner() {
    println!("{}", "Abacus Calculator".bright_cyan().bold());
    println!(
        "Type '{}' for commands, {} for completion\n",
        "help".bright_yellow(),
        "Tab".bright_cyan()
    );
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use crate::config::CalculatorConfig;
    use tempfile::TempDir;

    fn calculator(dir: &TempDir) -> Calculator {
        colored::control::set_override(false);
        let config = CalculatorConfig::default().with_history_dir(dir.path());
        Calculator::new(config).unwrap()
    }

    fn run(calc: &mut Calculator, line: &str) -> (bool, String) {
        let mut out = Vec::new();
        let keep_going = execute_repl_command(calc, line, &mut out).unwrap();
        (keep_going, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_operation_prints_rounded_result() {
        let dir = TempDir::new().unwrap();
        let mut calc = calculator(&dir);
        let (_, out) = run(&mut calc, "add 2 3");
        assert_eq!(out.trim(), "Result: 5");
        let (_, out) = run(&mut calc, "DIVIDE 10 3");
        assert_eq!(out.trim(), "Result: 3.33");
        let (_, out) = run(&mut calc, "sqrt 16");
        assert_eq!(out.trim(), "Result: 4");
        assert_eq!(calc.history().len(), 3);
    }

    #[test]
    fn test_huge_result_is_not_shown_as_infinity() {
        let dir = TempDir::new().unwrap();
        let mut calc = calculator(&dir);
        let (_, out) = run(&mut calc, "power 1000000 51.2");
        assert!(out.starts_with("Result: "));
        assert!(!out.contains("inf"));
        let shown: f64 = out.trim().trim_start_matches("Result: ").parse().unwrap();
        assert!(shown.is_finite());
    }

    #[test]
    fn test_wrong_operand_count_prints_usage() {
        let dir = TempDir::new().unwrap();
        let mut calc = calculator(&dir);
        let (_, out) = run(&mut calc, "add 2");
        assert_eq!(out.trim(), "Usage: add <a> <b>");
        let (_, out) = run(&mut calc, "square_root 4 5");
        assert_eq!(out.trim(), "Usage: square_root <a>");
        assert!(calc.history().is_empty());
    }

    #[test]
    fn test_errors_are_returned() {
        let dir = TempDir::new().unwrap();
        let mut calc = calculator(&dir);
        let mut out = Vec::new();

        let err = execute_repl_command(&mut calc, "divide 1 0", &mut out).unwrap_err();
        assert_eq!(err.to_string(), "Cannot divide by zero");

        let err = execute_repl_command(&mut calc, "add two 3", &mut out).unwrap_err();
        assert!(err.to_string().contains("Invalid number: 'two'"));
        assert!(calc.history().is_empty());
    }

    #[test]
    fn test_undo_redo_messages() {
        let dir = TempDir::new().unwrap();
        let mut calc = calculator(&dir);
        assert_eq!(run(&mut calc, "undo").1.trim(), "Nothing to undo.");
        assert_eq!(run(&mut calc, "redo").1.trim(), "Nothing to redo.");

        run(&mut calc, "multiply 5 3");
        assert_eq!(run(&mut calc, "undo").1.trim(), "Undid: multiply(5, 3)");
        assert!(calc.history().is_empty());
        assert_eq!(run(&mut calc, "redo").1.trim(), "Redid: multiply(5, 3)");
        assert_eq!(calc.history().len(), 1);
    }

    #[test]
    fn test_history_listing() {
        let dir = TempDir::new().unwrap();
        let mut calc = calculator(&dir);
        assert_eq!(run(&mut calc, "history").1.trim(), "No calculations in history.");

        run(&mut calc, "add 2 3");
        run(&mut calc, "power 2 10");
        let (_, out) = run(&mut calc, "history");
        assert!(out.contains("1. add(2, 3) = 5"));
        assert!(out.contains("2. power(2, 10) = 1024"));
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let mut calc = calculator(&dir);
        run(&mut calc, "percentage 50 200");
        let (_, out) = run(&mut calc, "save");
        assert!(out.contains("History saved to"));
        assert!(dir.path().join("history.csv").exists());

        let (_, out) = run(&mut calc, "load");
        assert!(out.contains("percentage"));
        assert!(out.contains("Loaded 1 saved calculation(s)."));
    }

    #[test]
    fn test_clear() {
        let dir = TempDir::new().unwrap();
        let mut calc = calculator(&dir);
        run(&mut calc, "add 1 1");
        assert_eq!(run(&mut calc, "clear").1.trim(), "History cleared.");
        assert!(calc.history().is_empty());
        assert!(!calc.can_undo());
    }

    #[test]
    fn test_unknown_and_exit() {
        let dir = TempDir::new().unwrap();
        let mut calc = calculator(&dir);
        let (keep_going, out) = run(&mut calc, "frobnicate 1 2");
        assert!(keep_going);
        assert!(out.starts_with("Unknown command: frobnicate"));

        let (keep_going, _) = run(&mut calc, "exit");
        assert!(!keep_going);
        let (keep_going, _) = run(&mut calc, "QUIT");
        assert!(!keep_going);
    }

    #[test]
    fn test_help_lists_operations_and_commands() {
        let dir = TempDir::new().unwrap();
        let mut calc = calculator(&dir);
        let (_, out) = run(&mut calc, "help");
        assert!(out.contains("integer_division <a> <b>"));
        assert!(out.contains("square_root <a>"));
        assert!(out.contains("undo"));
    }

    #[test]
    fn test_completion_candidates() {
        let dir = TempDir::new().unwrap();
        let calc = calculator(&dir);
        let helper = CalcHelper::new(&calc);
        let words: Vec<String> = helper.complete_word("su").into_iter().map(|p| p.replacement).collect();
        assert_eq!(words, vec!["subtract".to_string()]);
        let words: Vec<String> = helper.complete_word("RE").into_iter().map(|p| p.replacement).collect();
        assert_eq!(words, vec!["redo".to_string()]);
    }
}
