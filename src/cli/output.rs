//! Handles all user-facing output for the CLI.
//!
//! This module is responsible for colorizing output, rendering trees and
//! diffs, and printing diagnostics. Color is only used when stdout is a
//! terminal.

use std::io::{self, IsTerminal, Write};
use std::path::Path;

use difference::{Changeset, Difference};
use miette::Report;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::ast::CommandNode;

// ============================================================================
// CORE OUTPUT FUNCTIONS
// ============================================================================

/// Prints a tree one node per line, arguments with their type.
pub fn print_tree(tree: &CommandNode) -> io::Result<()> {
    let mut stdout = stdout();
    for (path, node) in tree.walk() {
        let indent = "  ".repeat(path.len() - 1);
        write!(stdout, "{}", indent)?;
        match node.argument_type() {
            None => {
                stdout.set_color(ColorSpec::new().set_bold(true))?;
                write!(stdout, "{}", node.name())?;
                stdout.reset()?;
            }
            Some(argument_type) => {
                stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
                write!(stdout, "<{}>", node.name())?;
                stdout.reset()?;
                stdout.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
                write!(stdout, " {}", argument_type.to_words().join(" "))?;
                stdout.reset()?;
            }
        }
        writeln!(stdout)?;
    }
    Ok(())
}

/// Reports a successfully parsed file.
pub fn print_ok(path: &Path, tree: &CommandNode) -> io::Result<()> {
    let mut stdout = stdout();
    stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true))?;
    write!(stdout, "ok")?;
    stdout.reset()?;
    writeln!(stdout, " {} ({} nodes)", path.display(), tree.node_count())
}

pub fn print_summary(checked: usize, failed: usize) -> io::Result<()> {
    let mut stdout = stdout();
    if failed > 0 {
        stdout.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
    }
    writeln!(stdout, "{} file(s) checked, {} failed", checked, failed)?;
    stdout.reset()
}

/// Prints a line diff between a file and its canonical form.
pub fn print_fmt_diff(path: &Path, original: &str, formatted: &str) -> io::Result<()> {
    let mut stdout = stdout();
    writeln!(stdout, "--- {}", path.display())?;
    writeln!(stdout, "+++ {} (canonical)", path.display())?;
    let changeset = Changeset::new(original.trim_end(), formatted.trim_end(), "\n");
    print_diff(&mut stdout, &changeset.diffs)
}

/// Renders a diagnostic report to stderr.
pub fn print_report(report: &Report) {
    eprintln!("{:?}", report);
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn stdout() -> StandardStream {
    let choice = if io::stdout().is_terminal() {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    StandardStream::stdout(choice)
}

fn print_diff(stdout: &mut StandardStream, diffs: &[Difference]) -> io::Result<()> {
    for diff in diffs {
        match diff {
            Difference::Same(ref x) => {
                stdout.reset()?;
                for line in x.lines() {
                    writeln!(stdout, " {}", line)?;
                }
            }
            Difference::Add(ref x) => {
                stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
                for line in x.lines() {
                    writeln!(stdout, "+{}", line)?;
                }
            }
            Difference::Rem(ref x) => {
                stdout.set_color(ColorSpec::new().set_fg(Some(Color::Red)))?;
                for line in x.lines() {
                    writeln!(stdout, "-{}", line)?;
                }
            }
        }
    }
    stdout.reset()
}
