//! Error types for the type compiler
//!
//! Problems with an individual type definition are never returned as `Err`:
//! they are collected as [`Diagnostic`](crate::diagnostics::Diagnostic)s on a
//! [`CompilationResult`](crate::diagnostics::CompilationResult). The errors
//! here cover API misuse, infrastructure failures and the aggregate
//! [`JsonotronError::CompilationFailed`] used by fail-fast call sites.

use thiserror::Error;

use crate::diagnostics::Diagnostic;

/// Result type for compiler operations
pub type Result<T> = std::result::Result<T, JsonotronError>;

/// Compiler errors
#[derive(Error, Debug)]
pub enum JsonotronError {
    #[error("Type not found: {system}/{name}")]
    UnknownType { system: String, name: String },

    #[error("Validator build failed for {fqn}: {reason}")]
    ValidatorBuild { fqn: String, reason: String },

    #[error("Compilation failed with {} error(s):\n{}", .errors.len(), format_errors(.errors))]
    CompilationFailed { errors: Vec<Diagnostic> },

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl JsonotronError {
    /// The diagnostics bundled into a [`JsonotronError::CompilationFailed`].
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            Self::CompilationFailed { errors } => errors,
            _ => &[],
        }
    }
}

fn format_errors(errors: &[Diagnostic]) -> String {
    errors
        .iter()
        .map(|e| format!("  {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}
