//! Error types shared by the tokenizer, parser and grammar compiler.

use std::fmt;
use thiserror::Error;

/// Additional context for malformed grammar expressions.
///
/// # Examples
/// ```
/// use termline_grammar::MalformedInfo;
/// let info = MalformedInfo::new("nothing to repeat", 3);
/// assert_eq!(info.position, 3);
/// assert_eq!(info.to_string(), "nothing to repeat at byte 3 (zero-based)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedInfo {
    /// Short description of the problem.
    pub message: &'static str,
    /// Byte offset of the offending token in the expression.
    pub position: usize,
}

impl MalformedInfo {
    /// Create a new description for a malformed expression.
    #[must_use]
    pub fn new(message: &'static str, position: usize) -> Self {
        Self { message, position }
    }
}

impl fmt::Display for MalformedInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at byte {} (zero-based)", self.message, self.position)
    }
}

/// Errors surfaced while compiling a grammar expression.
///
/// These only occur at construction time. Matching never fails.
///
/// # Examples
/// ```
/// use termline_grammar::{GrammarError, compile};
/// let Err(err) = compile("a{2,4}") else { panic!("bounded repetition must be rejected") };
/// assert!(err.is_unsupported());
/// assert!(matches!(err, GrammarError::Unsupported { position: 1, .. }));
/// ```
#[derive(Debug, Error)]
pub enum GrammarError {
    /// The expression uses syntax this dialect deliberately rejects.
    #[error("unsupported construct `{construct}` at byte {position} (zero-based)")]
    Unsupported {
        /// The rejected token, e.g. `(?=` or `{2,4}`.
        construct: String,
        /// Byte offset of the token in the expression.
        position: usize,
    },
    /// The expression is structurally invalid.
    #[error("{0}")]
    Malformed(MalformedInfo),
    /// A leaf fragment was rejected by the native regex engine.
    #[error("invalid regular expression: {0}")]
    Regex(#[from] regress::Error),
}

impl GrammarError {
    /// Whether this error reports deliberately unsupported syntax.
    #[must_use]
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }

    /// Whether this error reports a structurally broken expression.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed(_) | Self::Regex(_))
    }

    /// Move a fragment-relative position to the expression holding it.
    pub(crate) fn shifted(self, offset: usize) -> Self {
        match self {
            Self::Unsupported {
                construct,
                position,
            } => Self::Unsupported {
                construct,
                position: position + offset,
            },
            Self::Malformed(info) => malformed(info.message, info.position + offset),
            other @ Self::Regex(_) => other,
        }
    }
}

pub(crate) fn malformed(message: &'static str, position: usize) -> GrammarError {
    GrammarError::Malformed(MalformedInfo::new(message, position))
}

pub(crate) fn unsupported(construct: &str, position: usize) -> GrammarError {
    GrammarError::Unsupported {
        construct: construct.to_owned(),
        position,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_malformed_with_position() {
        let err = malformed("expecting ')'", 7);
        assert_eq!(err.to_string(), "expecting ')' at byte 7 (zero-based)");
        assert!(err.is_malformed());
        assert!(!err.is_unsupported());
    }

    #[test]
    fn formats_unsupported_with_construct() {
        let err = unsupported("(?=", 0);
        assert_eq!(
            err.to_string(),
            "unsupported construct `(?=` at byte 0 (zero-based)"
        );
        assert!(err.is_unsupported());
    }
}
