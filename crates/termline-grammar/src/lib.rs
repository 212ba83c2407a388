//! Grammar compilation and prefix matching for structured command languages.
//!
//! A grammar is a regex-like expression with named, nestable capture groups
//! (`(?P<name>...)`). Compiling it yields a [`CompiledGrammar`] that matches
//! complete input exactly and incomplete, as-typed input as a prefix, while
//! reporting which named field each span of the input belongs to. Editors
//! use this to drive per-field completion, highlighting and validation.
//!
//! # Examples
//! ```
//! use termline_grammar::compile;
//!
//! let grammar = compile(r"cd \s+ (?P<dir>[^\s]*)")?;
//! let m = grammar.match_prefix("cd tm");
//! let fields = m.end_nodes();
//! assert_eq!(fields.len(), 1);
//! assert_eq!((fields[0].name.as_str(), fields[0].value.as_str()), ("dir", "tm"));
//! # Ok::<(), termline_grammar::GrammarError>(())
//! ```

mod compiler;
mod errors;
mod grammar;
mod matching;
mod node;
mod parser;
mod tokenizer;

pub use errors::{GrammarError, MalformedInfo};
pub use grammar::{CompiledGrammar, EscapeFn, EscapeFuncs, compile, compile_with};
pub use matching::{Match, MatchVariable, TRAILING_INPUT, Variables};
pub use node::{Node, alternate, concat};
pub use parser::{parse, parse_expression};
pub use tokenizer::{Token, tokenize};
