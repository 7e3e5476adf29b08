//! The commodore Command-Line Interface.
//!
//! This module is the main entry point for all CLI commands and orchestrates
//! the core library functions.

use std::path::{Path, PathBuf};
use std::{fs, process};

use clap::Parser as _;
use miette::{IntoDiagnostic, Report, WrapErr};
use tracing::{debug, Level};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use crate::cli::args::{Command, CommodoreArgs};
use crate::config::{ParserConfig, TypesConfig};
use crate::syntax::parser::{parse_file_with_config, Parser};
use crate::types::ResolverRegistry;

pub mod args;
pub mod output;

/// File extension searched for in directories given to `check`.
pub const COMMAND_FILE_EXTENSION: &str = "commodore";

/// Whether a command finished cleanly or found problems it already reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

/// The main entry point for the CLI.
pub fn run() {
    let args = CommodoreArgs::parse();
    init_logging(args.verbose);

    match dispatch(args) {
        Ok(Outcome::Success) => {}
        Ok(Outcome::Failure) => process::exit(1),
        Err(report) => {
            output::print_report(&report);
            process::exit(1);
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    // A subscriber may already be installed when embedded.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn dispatch(args: CommodoreArgs) -> miette::Result<Outcome> {
    let session = Session::load(args.types.as_deref())?;
    match args.command {
        Command::Check { paths } => handle_check(&session, &paths),
        Command::Tree { file, json } => handle_tree(&session, &file, json),
        Command::Fmt { file, check } => handle_fmt(&session, &file, check),
    }
}

/// The resolvers and settings shared by every file of one invocation.
struct Session {
    registry: ResolverRegistry,
    config: ParserConfig,
}

impl Session {
    fn load(types: Option<&Path>) -> miette::Result<Self> {
        let (registry, config) = match types {
            Some(path) => TypesConfig::load(path)?.into_parts(),
            None => (ResolverRegistry::new(), ParserConfig::default()),
        };
        debug!(resolvers = registry.len(), "session ready");
        Ok(Self { registry, config })
    }
}

// ============================================================================
// COMMAND HANDLERS
// ============================================================================

fn handle_check(session: &Session, paths: &[PathBuf]) -> miette::Result<Outcome> {
    let files = collect_files(paths)?;
    let mut failed = 0;
    for file in &files {
        match parse_file_with_config(file, &session.registry, session.config.clone()) {
            Ok(tree) => output::print_ok(file, &tree).into_diagnostic()?,
            Err(err) => {
                failed += 1;
                output::print_report(&Report::new(err));
            }
        }
    }
    output::print_summary(files.len(), failed).into_diagnostic()?;
    Ok(if failed == 0 {
        Outcome::Success
    } else {
        Outcome::Failure
    })
}

fn handle_tree(session: &Session, file: &Path, json: bool) -> miette::Result<Outcome> {
    let tree = parse_file_with_config(file, &session.registry, session.config.clone())?;
    if json {
        let text = serde_json::to_string_pretty(&tree).into_diagnostic()?;
        println!("{}", text);
    } else {
        output::print_tree(&tree).into_diagnostic()?;
    }
    Ok(Outcome::Success)
}

fn handle_fmt(session: &Session, file: &Path, check: bool) -> miette::Result<Outcome> {
    let source = fs::read_to_string(file)
        .into_diagnostic()
        .wrap_err_with(|| format!("cannot read {}", file.display()))?;
    let config = session
        .config
        .clone()
        .with_source_name(file.display().to_string());
    let tree = Parser::with_config(source.as_bytes(), &session.registry, config).parse()?;
    let formatted = tree.to_source();

    if !check {
        print!("{}", formatted);
        return Ok(Outcome::Success);
    }
    if formatted == source {
        println!("{} is canonical", file.display());
        return Ok(Outcome::Success);
    }
    output::print_fmt_diff(file, &source, &formatted).into_diagnostic()?;
    Ok(Outcome::Failure)
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

/// Expands directories into their command files, sorted by path. Plain file
/// arguments are kept whatever their extension.
fn collect_files(paths: &[PathBuf]) -> miette::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }
        for entry in WalkDir::new(path).sort_by_file_name() {
            let entry = entry.into_diagnostic()?;
            let is_command_file = entry.file_type().is_file()
                && entry.path().extension().and_then(|e| e.to_str())
                    == Some(COMMAND_FILE_EXTENSION);
            if is_command_file {
                files.push(entry.into_path());
            }
        }
    }
    debug!(count = files.len(), "collected command files");
    Ok(files)
}
