//! CLI for tufte-filter - pandoc JSON filter for author-in-text citations and venue notes.

use std::fmt;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tufte_filter::{apply_json, FilterError, FilterMode, FilterOptions, DEFAULT_MAIN_FILES};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

/// Rewrite author-in-text citations and add ACM venue margin notes
#[derive(Parser)]
#[command(name = "tufte-filter")]
#[command(version)]
#[command(after_help = "\
Examples:
  pandoc paper.tex --filter tufte-filter -o paper.html
  pandoc paper.tex -t json | tufte-filter html | pandoc -f json -o paper.html
  tufte-filter --citations-only -i paper.json -o filtered.json

Logging goes to stderr; set RUST_LOG=tufte_filter=debug for details.")]
struct Cli {
    /// Target format passed by pandoc (unused)
    format: Option<String>,

    /// Input pandoc JSON file (default: stdin; '-' also means stdin)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Only rewrite citations; skip venue metadata and margin note
    #[arg(long)]
    citations_only: bool,

    /// Directory for relative bibliography paths and main-file lookup
    #[arg(long, value_name = "DIR")]
    working_dir: Option<PathBuf>,

    /// Main-document candidate to scan for venue commands (repeatable;
    /// replaces the default list 00_main.tex, main.tex, paper.tex)
    #[arg(long = "main-file", value_name = "NAME")]
    main_files: Vec<String>,
}

// ---------------------------------------------------------------------------
// AppError: semantic exit codes
// ---------------------------------------------------------------------------

enum AppError {
    /// Exit 10: input not found / unreadable
    Input(String),
    /// Exit 11: input is not a pandoc JSON document
    Document(String),
    /// Exit 12: cannot write output
    Output(String),
}

impl AppError {
    fn exit_code(&self) -> i32 {
        match self {
            AppError::Input(_) => 10,
            AppError::Document(_) => 11,
            AppError::Output(_) => 12,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Input(msg) => {
                write!(f, "{}\n  hint: verify the file path is correct", msg)
            }
            AppError::Document(msg) => {
                write!(
                    f,
                    "{}\n  hint: the input must be pandoc's JSON AST (pandoc -t json)",
                    msg
                )
            }
            AppError::Output(msg) => {
                write!(
                    f,
                    "{}\n  hint: check that the output directory exists and is writable",
                    msg
                )
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tufte_filter=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    }
}

fn run() -> Result<(), AppError> {
    let cli = Cli::parse();

    if let Some(format) = &cli.format {
        tracing::debug!(%format, "target format");
    }

    let options = FilterOptions {
        mode: if cli.citations_only {
            FilterMode::CitationsOnly
        } else {
            FilterMode::Full
        },
        working_dir: cli.working_dir.unwrap_or_else(|| PathBuf::from(".")),
        main_files: if cli.main_files.is_empty() {
            DEFAULT_MAIN_FILES.iter().map(|s| s.to_string()).collect()
        } else {
            cli.main_files
        },
    };

    let input = read_input(cli.input.as_deref())?;

    let (json, diagnostics) = apply_json(&input, &options).map_err(|e| match e {
        FilterError::InvalidDocument(_) => AppError::Document(e.to_string()),
        FilterError::Serialize(_) => AppError::Output(e.to_string()),
    })?;

    for diagnostic in &diagnostics {
        tracing::warn!("{}", diagnostic);
    }

    write_output(cli.output.as_deref(), &json)
}

/// Reads the document from a file, or stdin when no path (or '-') is given.
fn read_input(input: Option<&Path>) -> Result<String, AppError> {
    match input {
        Some(path) if path != Path::new("-") => fs::read_to_string(path)
            .map_err(|e| AppError::Input(format!("'{}': {}", path.display(), e))),
        _ => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| AppError::Input(format!("failed to read from stdin: {}", e)))?;
            Ok(buf)
        }
    }
}

fn write_output(output: Option<&Path>, json: &str) -> Result<(), AppError> {
    if let Some(output_path) = output {
        fs::write(output_path, json).map_err(|e| {
            AppError::Output(format!("'{}': {}", output_path.display(), e))
        })?;
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        write!(handle, "{}", json).map_err(|e| AppError::Output(format!("stdout: {}", e)))?;
    }
    Ok(())
}
