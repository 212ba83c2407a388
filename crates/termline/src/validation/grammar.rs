//! Validation driven by a compiled grammar.

use std::collections::HashMap;
use std::sync::Arc;

use termline_grammar::{CompiledGrammar, MatchVariable};
use tracing::trace;

use super::{ValidationError, ValidationFuture, Validator, ValidatorError};
use crate::document::Document;

/// Message reported when the text is not a sentence of the grammar.
const INVALID_COMMAND: &str = "Invalid command";

/// Validates the whole text against a grammar, then every variable with its
/// own validator.
///
/// Failures from a variable's validator are moved to the variable's offset in
/// the full text.
pub struct GrammarValidator {
    grammar: Arc<CompiledGrammar>,
    validators: HashMap<String, Arc<dyn Validator>>,
}

/// A captured variable and the validator responsible for it.
struct Field<'a> {
    validator: &'a dyn Validator,
    document: Document,
    start: usize,
}

impl Field<'_> {
    fn reposition(&self, error: ValidatorError) -> ValidatorError {
        match error {
            ValidatorError::Invalid(ValidationError {
                cursor_position,
                message,
            }) => ValidationError::new(cursor_position + self.start, message).into(),
            other => other,
        }
    }
}

impl GrammarValidator {
    /// Validate `grammar` with per-variable `validators`.
    #[must_use]
    pub fn new(
        grammar: Arc<CompiledGrammar>,
        validators: HashMap<String, Arc<dyn Validator>>,
    ) -> Self {
        Self {
            grammar,
            validators,
        }
    }

    /// Register the validator for the variable `name`.
    #[must_use]
    pub fn with_validator(mut self, name: impl Into<String>, validator: Arc<dyn Validator>) -> Self {
        self.validators.insert(name.into(), validator);
        self
    }

    fn fields(&self, text: &str) -> Result<Vec<Field<'_>>, ValidatorError> {
        let Some(matched) = self.grammar.match_exact(text) else {
            trace!(len = text.len(), "input is not a sentence of the grammar");
            return Err(ValidationError::new(text.len(), INVALID_COMMAND).into());
        };
        Ok(matched
            .variables()
            .into_iter()
            .filter_map(|MatchVariable { name, value, start, .. }| {
                let validator = self.validators.get(&name)?;
                trace!(variable = %name, start, "delegating validation");
                Some(Field {
                    validator: validator.as_ref(),
                    document: Document::at_end(value),
                    start,
                })
            })
            .collect())
    }
}

impl Validator for GrammarValidator {
    fn validate(&self, document: &Document) -> Result<(), ValidatorError> {
        for field in self.fields(document.text())? {
            field
                .validator
                .validate(&field.document)
                .map_err(|err| field.reposition(err))?;
        }
        Ok(())
    }

    fn validate_async<'a>(&'a self, document: &'a Document) -> ValidationFuture<'a> {
        Box::pin(async move {
            for field in self.fields(document.text())? {
                field
                    .validator
                    .validate_async(&field.document)
                    .await
                    .map_err(|err| field.reposition(err))?;
            }
            Ok(())
        })
    }
}

impl std::fmt::Debug for GrammarValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.validators.keys().collect();
        names.sort();
        f.debug_struct("GrammarValidator")
            .field("grammar", &self.grammar.exact_pattern())
            .field("validators", &names)
            .finish()
    }
}
