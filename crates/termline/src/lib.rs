//! Grammar-driven completion, highlighting and validation for line editors.
//!
//! A [`CompiledGrammar`] describes a command language with named fields.
//! The adapters in this crate match the text being edited against it and hand
//! each field to a component of its own:
//!
//! - [`GrammarCompleter`] completes the field under the cursor,
//! - [`GrammarLexer`] styles every field,
//! - [`GrammarValidator`] checks the whole text and then every field.
//!
//! # Examples
//! ```
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! use termline::{CompleteEvent, Completer, Document, GrammarCompleter, WordCompleter, compile};
//!
//! let grammar = Arc::new(compile(r"cd \s (?P<dir>\w*)")?);
//! let completer = GrammarCompleter::new(grammar, HashMap::new())
//!     .with_completer("dir", Arc::new(WordCompleter::new(["home", "tmp", "var"])));
//!
//! let completions = completer
//!     .get_completions(&Document::at_end("cd t"), &CompleteEvent::requested())?;
//! assert_eq!(completions.len(), 1);
//! assert_eq!(completions[0].text(), "tmp");
//! # Ok::<(), Box<dyn std::error::Error + Send + Sync>>(())
//! ```

pub mod completion;
pub mod document;
pub mod lexer;
pub mod validation;

pub use termline_grammar as grammar;
pub use termline_grammar::{
    CompiledGrammar, EscapeFn, EscapeFuncs, GrammarError, Match, MatchVariable, Node,
    TRAILING_INPUT, Variables, compile, compile_with,
};

pub use completion::{
    CompleteEvent, Completer, Completion, CompletionError, CompletionStream, GrammarCompleter,
    WordCompleter,
};
pub use document::Document;
pub use lexer::{GrammarLexer, LexedDocument, Lexer, SimpleLexer, StyleFragment};
pub use validation::{FnValidator, GrammarValidator, ValidationError, Validator, ValidatorError};

/// Error type of caller-supplied components.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
