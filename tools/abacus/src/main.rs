//! Abacus - interactive command-line calculator

use std::io;
use std::path::PathBuf;
use std::process;

use abacus::{repl, Calculator, CalculatorConfig};
use abacus_core::Arity;
use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use colored::*;
use common::logging::{self, LogConfig};
use tracing::Level;

#[derive(Parser)]
#[command(name = "abacus")]
#[command(about = "Abacus - interactive calculator with history and undo/redo")]
#[command(long_about = "Abacus - interactive calculator with history and undo/redo

Commands:
  repl        Start the interactive calculator (default)
  eval        Run a single calculation
  operations  List available operations
  history     Show the saved history file

Examples:
  abacus                          # Start the REPL
  abacus eval add 2 3             # Prints: Result: 5
  abacus eval sqrt 16             # Unary operations take one operand
  abacus --history-dir /tmp/h     # Keep history.csv elsewhere

Settings come from abacus.toml and CALCULATOR_* environment variables.")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Configuration file (default: ./abacus.toml when present)
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,

    /// Directory for history.csv
    #[arg(long = "history-dir", global = true)]
    history_dir: Option<PathBuf>,

    /// Directory for calculator.log
    #[arg(long = "log-dir", global = true)]
    log_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive calculator
    Repl,

    /// Run a single calculation without recording it
    Eval {
        /// Operation name or alias
        operation: String,

        /// One operand for unary operations, two otherwise
        #[arg(required = true, num_args = 1..=2, allow_negative_numbers = true)]
        operands: Vec<f64>,
    },

    /// List available operations
    Operations,

    /// Show the saved history file
    History,
}

fn main() {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red(), e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    common::load_dotenv();

    let mut config = CalculatorConfig::load(cli.config.clone())?;
    if let Some(dir) = &cli.history_dir {
        config = config.with_history_dir(dir);
    }
    if let Some(dir) = &cli.log_dir {
        config = config.with_log_dir(dir);
    }

    let _log_guard = logging::init(&LogConfig {
        log_dir: config.log_dir.clone(),
        console_level: if cli.verbose { Level::DEBUG } else { Level::WARN },
        file_level: logging::parse_level(&config.log_level)?,
        ansi: !cli.no_color,
        ..LogConfig::default()
    })?;

    let mut stdout = io::stdout();
    match cli.command.unwrap_or(Commands::Repl) {
        Commands::Repl => {
            let mut calc = Calculator::with_default_observers(config)?;
            repl::run_repl(&mut calc)?;
        },
        Commands::Eval {
            operation,
            operands,
        } => {
            let mut calc = Calculator::new(config)?;
            eval(&mut calc, &operation, &operands)?;
        },
        Commands::Operations => {
            let calc = Calculator::new(config)?;
            repl::print_operations(&calc, &mut stdout)?;
        },
        Commands::History => {
            let calc = Calculator::new(config)?;
            repl::print_saved(&calc, &mut stdout)?;
        },
    }

    Ok(())
}

fn eval(calc: &mut Calculator, operation: &str, operands: &[f64]) -> Result<()> {
    let arity = match calc.registry().get(operation) {
        Some(op) => op.arity(),
        None => bail!("Unknown operation: {}", operation.trim()),
    };
    if operands.len() != arity.operand_count() {
        bail!(
            "{} expects {} operand(s), got {}",
            operation,
            arity.operand_count(),
            operands.len()
        );
    }

    let a = operands[0];
    let b = match arity {
        Arity::Unary => 0.0,
        Arity::Binary => operands[1],
    };

    let result = calc.calculate(operation, a, b)?;
    if let Some(value) = result.result() {
        println!("{} {}", "Result:".green(), calc.round(value));
    }
    Ok(())
}
