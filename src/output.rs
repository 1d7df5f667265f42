//! User-facing output utilities for clean, colored terminal messages
//!
//! This module provides functions for displaying warnings and errors to users
//! in a friendly, colored format without internal logging noise (timestamps,
//! log levels, crate names, etc.).

use owo_colors::OwoColorize;

/// Display a warning message to the user in yellow with padding
///
/// Format: blank line + yellow message + blank line
///
/// # Example
/// ```ignore
/// output::warn("Folder \"backend\" not found in repository");
/// ```
pub fn warn(message: &str) {
    eprintln!("\n{}\n", message.yellow());
}

/// Display an error message to the user in red with padding
///
/// Format: blank line + red message + blank line
///
/// # Example
/// ```ignore
/// output::error("Repository not found. Run 'rgraph clone <url>' first.");
/// ```
pub fn error(message: &str) {
    eprintln!("\n{}\n", message.red());
}

/// Display a success message to the user in green with padding
pub fn success(message: &str) {
    eprintln!("\n{}\n", message.green());
}
