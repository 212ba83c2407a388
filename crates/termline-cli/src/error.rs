//! Error types for the command-line driver.

use termline::{BoxError, CompletionError, GrammarError};
use thiserror::Error;

/// Errors that stop the driver before it can report a result.
#[derive(Debug, Error)]
pub enum CliError {
    /// An invalid configuration value was provided.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The grammar expression did not compile.
    #[error("invalid grammar: {0}")]
    Grammar(#[from] GrammarError),

    /// A completer failed.
    #[error("completion failed: {0}")]
    Completion(#[from] CompletionError),

    /// A validator failed without judging the input.
    #[error("validation failed: {0}")]
    Validation(BoxError),

    /// Results could not be encoded as JSON.
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_config_error_displays_message() {
        let error = CliError::InvalidConfig("unknown log level".to_string());
        assert_eq!(
            error.to_string(),
            "invalid configuration: unknown log level"
        );
    }

    #[test]
    fn grammar_error_keeps_position() {
        let Err(err) = termline::compile("a{2,4}") else {
            panic!("bounded repetition is unsupported");
        };
        let error = CliError::from(err);
        assert_eq!(
            error.to_string(),
            "invalid grammar: unsupported construct `{2,4}` at byte 1 (zero-based)"
        );
    }

    #[test]
    fn io_error_converts_from_std_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: CliError = io_err.into();
        assert!(error.to_string().contains("file not found"));
    }
}
