use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use zcalc::calculator::{
    Control, OperatorGlyphs, Token, copy_display, copy_to_clipboard, tokens_for_keys,
};
use zcalc::config::{Config, MAX_PRECISION};
use zcalc::session::Session;

#[derive(Debug, Parser)]
#[command(name = "zcalc", version, about = "A keypad calculator for the terminal.")]
struct Cli {
    /// Path to the config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Maximum fractional digits in results.
    #[arg(long, global = true)]
    precision: Option<usize>,

    /// Show ASCII operators and `.` as decimal separator.
    #[arg(long, global = true)]
    ascii: bool,

    /// Print the final session as JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Copy the final display to the clipboard.
    #[arg(long, global = true)]
    copy: bool,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Press keys and print the final display.
    Keys {
        /// Print the display after every key.
        #[arg(long)]
        trace: bool,

        /// Key sequences, e.g. `12+3` `[Enter]`.
        #[arg(required = true, allow_hyphen_values = true)]
        sequence: Vec<String>,
    },
    /// Type an expression, press Enter and print the result.
    Eval {
        #[arg(allow_hyphen_values = true)]
        expression: String,
    },
    /// Read key sequences from stdin, one line at a time.
    Repl,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(cli.config.as_deref()).context("Failed to load config")?;

    if let Some(precision) = cli.precision {
        if precision > MAX_PRECISION {
            anyhow::bail!("--precision must be at most {MAX_PRECISION}");
        }
        config.precision = precision;
    }
    if cli.ascii {
        config.operator_glyphs = OperatorGlyphs::Ascii;
        config.decimal_glyph = '.';
    }

    Ok(config)
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    let mut session = Session::with_history(config.settings(), config.max_history);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command.as_ref().unwrap_or(&Command::Repl) {
        Command::Keys { trace, sequence } => {
            for keys in sequence {
                let tokens =
                    tokens_for_keys(keys).with_context(|| format!("Invalid keys {keys:?}"))?;
                for token in tokens {
                    let display = session.press(token);
                    if *trace {
                        writeln!(out, "{display}")?;
                    }
                }
            }
        }
        Command::Eval { expression } => {
            let tokens = tokens_for_keys(expression).context("Invalid expression")?;
            session.press_all(tokens);
            session.press(Token::Control(Control::Evaluate));
        }
        Command::Repl => {
            return run_repl(&mut session, io::stdin().lock(), &mut out, &cli);
        }
    }

    finish(&session, &cli, &mut out)
}

/// Print the final state of a one-shot command.
fn finish(session: &Session, cli: &Cli, out: &mut impl Write) -> Result<()> {
    if cli.json {
        write_snapshot(session, out)?;
    } else {
        writeln!(out, "{}", session.display())?;
    }

    copy_if_requested(session, cli)
}

/// Run the REPL, then honour `--json` and `--copy` for the final state.
///
/// The display is already printed after every line, so only the JSON
/// snapshot is added at the end.
fn run_repl(
    session: &mut Session,
    input: impl BufRead,
    out: &mut impl Write,
    cli: &Cli,
) -> Result<()> {
    repl(session, input, out)?;
    if cli.json {
        write_snapshot(session, out)?;
    }
    copy_if_requested(session, cli)
}

fn write_snapshot(session: &Session, out: &mut impl Write) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, &session.snapshot())?;
    writeln!(out)?;
    Ok(())
}

fn copy_if_requested(session: &Session, cli: &Cli) -> Result<()> {
    if cli.copy {
        match copy_display(session.state()) {
            Ok(true) => info!("display copied to clipboard"),
            Ok(false) => warn!("nothing copied, display shows an error"),
            Err(err) => anyhow::bail!(err),
        }
    }

    Ok(())
}

fn repl(session: &mut Session, input: impl BufRead, out: &mut impl Write) -> Result<()> {
    for line in input.lines() {
        let line = line.context("Failed to read input")?;
        match line.trim() {
            ":quit" | ":q" => break,
            ":history" => {
                for entry in session.history().iter() {
                    writeln!(out, "{} = {}", entry.expression, entry.result)?;
                }
                continue;
            }
            ":clear-history" => {
                session.clear_history();
                continue;
            }
            ":json" => {
                writeln!(out, "{}", serde_json::to_string(&session.snapshot())?)?;
                continue;
            }
            ":copy-last" => {
                match session.history().last() {
                    Some(entry) => match copy_to_clipboard(entry.text_for_clipboard()) {
                        Ok(()) => info!(result = %entry.result, "copied last result"),
                        Err(err) => warn!(%err, "copy failed"),
                    },
                    None => warn!("history is empty, nothing to copy"),
                }
                continue;
            }
            _ => {}
        }

        match tokens_for_keys(&line) {
            Ok(tokens) => {
                writeln!(out, "{}", session.press_all(tokens))?;
            }
            Err(err) => warn!(%err, "skipping line"),
        }
        out.flush()?;
    }

    Ok(())
}
