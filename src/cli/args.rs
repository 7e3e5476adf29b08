//! Defines the command-line arguments and subcommands for the commodore CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "commodore",
    version,
    about = "Checks, prints and formats .commodore command tree files."
)]
pub struct CommodoreArgs {
    /// YAML file declaring extension argument types and parser settings.
    #[arg(long, global = true, value_name = "YAML")]
    pub types: Option<PathBuf>,

    /// Log parser activity to stderr; repeat for token-level tracing.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Parse files and report every error. Directories are searched for
    /// `*.commodore` files.
    Check {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Print the parsed command tree.
    Tree {
        /// The command file to parse.
        #[arg(required = true)]
        file: PathBuf,
        /// Print the tree as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print a command file in canonical form.
    Fmt {
        /// The command file to format.
        #[arg(required = true)]
        file: PathBuf,
        /// Only show a diff and fail when the file is not canonical.
        #[arg(long)]
        check: bool,
    },
}
