//! ecsdl - ECS schema checker
//!
//! Parses a schema file and writes its canonical rendering.
//!
//! # Usage
//!
//! ```bash
//! ecsdl --input game.ecs                     # canonical form to stdout
//! ecsdl -i game.ecs -o build/game.ecs        # canonical form to a file
//! ecsdl -i game.ecs --check -v               # diagnostics only
//! ```

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use ecsdl_core::{dsl, EcsdlError, Result};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// ECS schema parser and checker
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the schema file
    #[arg(short, long, value_name = "SCHEMA_FILE")]
    input: PathBuf,

    /// Where to write the canonical rendering (stdout when omitted)
    #[arg(short, long, value_name = "OUTPUT_FILE")]
    output: Option<PathBuf>,

    /// Only check the schema; print nothing on success
    #[arg(long)]
    check: bool,

    /// Increase logging verbosity (-v: debug, -vv+: trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(directive_for_verbosity(args.verbose))),
        )
        .with_writer(io::stderr)
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let program = dsl::parse_file(&args.input)?;
    info!(
        path = %args.input.display(),
        components = program.components().count(),
        relationships = program.relationships().count(),
        systems = program.systems().count(),
        "schema parsed"
    );

    if args.check {
        return Ok(());
    }

    let rendered = program.to_string();
    match &args.output {
        Some(path) => write_output(path, &rendered),
        None => io::stdout()
            .write_all(rendered.as_bytes())
            .map_err(|e| EcsdlError::FileWriteError {
                path: "<stdout>".to_string(),
                source: e,
            }),
    }
}

/// Write `contents` to `path`, creating missing parent directories.
fn write_output(path: &Path, contents: &str) -> Result<()> {
    let write_error = |source| EcsdlError::FileWriteError {
        path: path.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_error)?;
    }
    fs::write(path, contents).map_err(write_error)?;
    debug!(path = %path.display(), bytes = contents.len(), "wrote output");
    Ok(())
}

fn directive_for_verbosity(v: u8) -> &'static str {
    match v {
        0 => "ecsdl=warn,ecsdl_core=warn",
        1 => "ecsdl=debug,ecsdl_core=debug",
        _ => "ecsdl=trace,ecsdl_core=trace",
    }
}
