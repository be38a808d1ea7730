use std::{
    fmt::Display,
    fs,
    io::{stderr, stdout, IsTerminal, Write},
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::Context;
use bfrun::{compile_source, Interpreter};
use clap::{error::ErrorKind, Parser};
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

/// `sysexits.h` codes.
const EX_USAGE: u8 = 64;
/// Unmatched `[` or `]`, the program never starts.
const EX_DATAERR: u8 = 65;
const EX_NOINPUT: u8 = 66;
const EX_SOFTWARE: u8 = 70;

#[derive(Parser, Debug)]
#[command(name = "bfrun", version)]
#[command(about = "Compile and run a BF program on a 30000 cell tape")]
#[command(after_help = "Output of the program goes to stdout, `,` (input) is not supported.")]
struct Args {
    /// Path to the BF program
    #[arg(value_name = "PATH")]
    path: PathBuf,

    /// Print the compiled program before running it
    #[arg(short, long)]
    dump: bool,
}

fn main() -> ExitCode {
    init_logging();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // `--help` and `--version` are "errors" too
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => EX_USAGE,
            };
            // Nowhere left to report a failed write to stderr
            e.print().ok();
            return ExitCode::from(code);
        }
    };

    let source = match read_source(&args.path) {
        Ok(source) => source,
        Err(e) => {
            return fail(EX_NOINPUT, format_args!("{e:#}"));
        }
    };

    let program = match compile_source(&source) {
        Ok(program) => program,
        Err(e) => {
            return fail(EX_DATAERR, format_args!("compile error: {e}"));
        }
    };

    info!(path = %args.path.display(), instructions = program.len(), "compiled");

    let mut out = stdout().lock();

    if args.dump {
        if let Err(e) = write!(out, "{program}").and_then(|()| out.flush()) {
            return fail(EX_SOFTWARE, format_args!("failed to dump program: {e}"));
        }
    }

    if let Err(e) = Interpreter(program, &mut out).run() {
        return fail(EX_SOFTWARE, format_args!("runtime error: {e}"));
    }

    ExitCode::SUCCESS
}

/// Reports a fatal error on stderr regardless of the log filter.
fn fail(code: u8, message: impl Display) -> ExitCode {
    debug!(code, "exiting with an error");
    eprintln!("error: {message}");
    ExitCode::from(code)
}

fn read_source(path: &Path) -> anyhow::Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("failed to read `{}`", path.display()))
}

/// Initialize logging to stderr, stdout belongs to the program.
///
/// Use `RUST_LOG` environment variable to override the default `warn` filter.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(stderr().is_terminal())
        .with_writer(stderr)
        .init();
}
