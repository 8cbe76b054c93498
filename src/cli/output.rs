//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.
//! Diagnostics go to stderr; command results go to the writer the
//! command was given.

use std::fmt::Display;
use std::io::{self, Write};

use colored::Colorize;

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print warning (yellow "Warning:" prefix) to stderr
pub fn warning(msg: &(impl Display + ?Sized)) {
    eprintln!("{}: {}", "Warning".yellow(), msg);
}

/// Write a labelled value (green label)
pub fn field<W: Write + ?Sized>(out: &mut W, label: &str, value: &(impl Display + ?Sized)) -> io::Result<()> {
    writeln!(out, "{}: {}", label.green(), value)
}

/// Write section header (cyan bold)
pub fn header<W: Write + ?Sized>(out: &mut W, msg: &(impl Display + ?Sized)) -> io::Result<()> {
    writeln!(out, "{}", msg.to_string().cyan().bold())
}

/// Write indented detail (no color)
pub fn detail<W: Write + ?Sized>(out: &mut W, msg: &(impl Display + ?Sized)) -> io::Result<()> {
    writeln!(out, "  {}", msg)
}

/// Write plain output (no color, for tree renderings and query results)
pub fn info<W: Write + ?Sized>(out: &mut W, msg: &(impl Display + ?Sized)) -> io::Result<()> {
    writeln!(out, "{}", msg)
}
