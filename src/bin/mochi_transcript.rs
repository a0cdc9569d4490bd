//! Mochi Transcript
//!
//! Reads a terminal session capture from a file or stdin and writes the
//! plain-text transcript (or a JSON snapshot) to stdout or a file.
//! Diagnostics are logged on stderr.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mochi_transcript::diagnostics::TracingSink;
use mochi_transcript::{CliArgs, Config, Error, Interpreter, Result};

/// Exit status for internal invariant violations
const EXIT_INTERNAL: u8 = 2;

fn main() -> ExitCode {
    let args = CliArgs::parse();

    // -q/-v win over RUST_LOG; otherwise RUST_LOG, falling back to warn
    let filter = if args.quiet || args.verbose > 0 {
        EnvFilter::new(args.log_filter())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_filter()))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            if e.is_internal() {
                ExitCode::from(EXIT_INTERNAL)
            } else {
                ExitCode::FAILURE
            }
        },
    }
}

fn run(args: &CliArgs) -> Result<()> {
    let config = Config::load_with_args(args)?;
    debug!(?config, "configuration loaded");

    let mut interpreter = Interpreter::new(&config);
    let bytes = match args.input_path() {
        Some(path) => interpreter.process_reader(BufReader::new(open(path)?))?,
        None => interpreter.process_reader(io::stdin().lock())?,
    };
    info!(
        bytes,
        rows = interpreter.screen().lines().len(),
        diagnostics = interpreter.sink().total(),
        "capture processed"
    );

    // Nothing is written until the whole capture has been interpreted
    match &args.output {
        Some(path) => {
            let file = File::create(path).map_err(|source| Error::Open {
                path: path.clone(),
                source,
            })?;
            let mut out = BufWriter::new(file);
            emit(&interpreter, args.json, &mut out)?;
            out.flush()?;
        },
        None => {
            let stdout = io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            emit(&interpreter, args.json, &mut out)?;
            out.flush()?;
        },
    }

    if args.summary {
        print_summary(interpreter.sink());
    }
    Ok(())
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| Error::Open {
        path: path.to_path_buf(),
        source,
    })
}

fn emit<W: Write>(interpreter: &Interpreter, json: bool, out: &mut W) -> Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, &interpreter.snapshot()).map_err(io::Error::from)?;
        writeln!(out)?;
        Ok(())
    } else {
        interpreter.write_transcript(out)
    }
}

fn print_summary(sink: &TracingSink) {
    eprintln!("{} diagnostics", sink.total());
    for (kind, count) in sink.counts() {
        eprintln!("  {:<26} {}", kind, count);
    }
}
