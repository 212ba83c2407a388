//! Input validation contracts.

mod grammar;

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use thiserror::Error;

use crate::BoxError;
use crate::document::Document;

pub use grammar::GrammarValidator;

/// Input rejected by a validator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[error("{message} at byte {cursor_position} (zero-based)")]
pub struct ValidationError {
    /// Where the editor should put the cursor.
    pub cursor_position: usize,
    /// Message shown to the user.
    pub message: String,
}

impl ValidationError {
    /// A validation failure at `cursor_position`.
    pub fn new(cursor_position: usize, message: impl Into<String>) -> Self {
        Self {
            cursor_position,
            message: message.into(),
        }
    }
}

/// Errors returned by [`Validator::validate`].
#[derive(Debug, Error)]
pub enum ValidatorError {
    /// The input is invalid.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// The validator itself failed; the source error is passed through
    /// untouched.
    #[error(transparent)]
    Failed(BoxError),
}

impl ValidatorError {
    /// Wrap an error raised while validating.
    pub fn failed(error: impl Into<BoxError>) -> Self {
        Self::Failed(error.into())
    }

    /// The validation failure, if the input was rejected.
    #[must_use]
    pub fn as_invalid(&self) -> Option<&ValidationError> {
        match self {
            Self::Invalid(err) => Some(err),
            Self::Failed(_) => None,
        }
    }
}

/// Future returned by [`Validator::validate_async`].
pub type ValidationFuture<'a> = BoxFuture<'a, Result<(), ValidatorError>>;

/// Checks a whole document.
pub trait Validator: Send + Sync {
    /// Validate `document`.
    ///
    /// # Errors
    /// Returns [`ValidatorError::Invalid`] for rejected input and
    /// [`ValidatorError::Failed`] when validation could not run.
    fn validate(&self, document: &Document) -> Result<(), ValidatorError>;

    /// Validate `document` asynchronously.
    ///
    /// The default wraps [`validate`](Self::validate) in an immediately
    /// ready future.
    fn validate_async<'a>(&'a self, document: &'a Document) -> ValidationFuture<'a> {
        Box::pin(std::future::ready(self.validate(document)))
    }
}

type Predicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Validator built from a predicate over the document text.
#[derive(Clone)]
pub struct FnValidator {
    predicate: Predicate,
    message: String,
    move_cursor_to_end: bool,
}

impl FnValidator {
    /// Reject text for which `predicate` returns `false` with `message`.
    pub fn new(
        predicate: impl Fn(&str) -> bool + Send + Sync + 'static,
        message: impl Into<String>,
    ) -> Self {
        Self {
            predicate: Arc::new(predicate),
            message: message.into(),
            move_cursor_to_end: false,
        }
    }

    /// Report failures at the end of the text instead of at its start.
    #[must_use]
    pub fn with_move_cursor_to_end(mut self, move_cursor_to_end: bool) -> Self {
        self.move_cursor_to_end = move_cursor_to_end;
        self
    }
}

impl Validator for FnValidator {
    fn validate(&self, document: &Document) -> Result<(), ValidatorError> {
        let text = document.text();
        if (self.predicate)(text) {
            return Ok(());
        }
        let cursor_position = if self.move_cursor_to_end { text.len() } else { 0 };
        Err(ValidationError::new(cursor_position, self.message.clone()).into())
    }
}

impl fmt::Debug for FnValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnValidator")
            .field("message", &self.message)
            .field("move_cursor_to_end", &self.move_cursor_to_end)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use rstest::rstest;

    fn digits() -> FnValidator {
        FnValidator::new(|text| text.chars().all(|c| c.is_ascii_digit()), "digits only")
    }

    #[rstest]
    #[case("123", None)]
    #[case("12a", Some(0))]
    fn reports_failures_at_the_start(#[case] text: &str, #[case] expected: Option<usize>) {
        let result = digits().validate(&Document::at_end(text));
        let position = result
            .err()
            .and_then(|err| err.as_invalid().map(|e| e.cursor_position));
        assert_eq!(position, expected);
    }

    #[test]
    fn moves_cursor_to_end_on_request() {
        let validator = digits().with_move_cursor_to_end(true);
        let err = validator.validate(&Document::at_end("12a")).err();
        assert_eq!(
            err.as_ref().and_then(ValidatorError::as_invalid),
            Some(&ValidationError::new(3, "digits only"))
        );
    }

    #[test]
    fn async_default_mirrors_sync() {
        let document = Document::at_end("x");
        let result = block_on(digits().validate_async(&document));
        assert!(matches!(result, Err(ValidatorError::Invalid(_))));
    }

    #[test]
    fn displays_position() {
        let err = ValidationError::new(11, "Invalid command");
        assert_eq!(err.to_string(), "Invalid command at byte 11 (zero-based)");
    }
}
