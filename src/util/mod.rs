#![allow(clippy::module_name_repetitions)]
//! Small utilities: process execution, tokens/URLs, text checks.

pub mod exec;
pub mod token;

pub use exec::{ExecOutput, ExecRequest, ExecService};

/// Reject strings containing newline, carriage return, or NUL.
///
/// Keep error text stable (tests/UX depend on it).
pub fn reject_newlines(s: &str, what: &str) -> Result<(), String> {
    if s.contains('\n') || s.contains('\r') || s.contains('\0') {
        Err(format!("refusing to use {what}: contains newline"))
    } else {
        Ok(())
    }
}
