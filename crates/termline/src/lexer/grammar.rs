//! Highlighting driven by a compiled grammar.

use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;

use termline_grammar::CompiledGrammar;
use tracing::trace;

use super::{LexedDocument, Lexer};
use crate::document::Document;

/// Style given to text the grammar cannot account for.
pub const TRAILING_INPUT_STYLE: &str = "class:trailing-input";

/// Highlights a document by lexing each grammar variable with its own lexer.
///
/// Text outside registered variables keeps the default style. When variables
/// nest, the outer lexer styles first and inner lexers only fill in chars it
/// left in the default style.
pub struct GrammarLexer {
    grammar: Arc<CompiledGrammar>,
    default_style: String,
    lexers: HashMap<String, Arc<dyn Lexer>>,
}

impl GrammarLexer {
    /// Lex `grammar` with per-variable `lexers`.
    pub fn new(
        grammar: Arc<CompiledGrammar>,
        default_style: impl Into<String>,
        lexers: HashMap<String, Arc<dyn Lexer>>,
    ) -> Self {
        Self {
            grammar,
            default_style: default_style.into(),
            lexers,
        }
    }

    /// Register the lexer for the variable `name`.
    #[must_use]
    pub fn with_lexer(mut self, name: impl Into<String>, lexer: Arc<dyn Lexer>) -> Self {
        self.lexers.insert(name.into(), lexer);
        self
    }

    /// The style of text outside registered variables.
    #[must_use]
    pub fn default_style(&self) -> &str {
        &self.default_style
    }

    /// One style per char of `text`.
    fn char_styles(&self, text: &str) -> Vec<(usize, char, String)> {
        let mut chars: Vec<(usize, char, String)> = text
            .char_indices()
            .map(|(i, c)| (i, c, self.default_style.clone()))
            .collect();

        let matched = self.grammar.match_prefix(text);
        for var in matched.variables() {
            let Some(lexer) = self.lexers.get(&var.name) else {
                continue;
            };
            let Some(field) = text.get(var.slice()) else {
                continue;
            };
            trace!(variable = %var.name, start = var.start, "delegating lexing");
            let document = Document::at_end(field);
            let lexed = lexer.lex_document(&document);

            let mut index = chars.partition_point(|&(i, _, _)| i < var.start);
            for line in 0..document.line_count() {
                if line > 0 {
                    // The newline between lines.
                    index += 1;
                }
                for fragment in lexed.line(line) {
                    for _ in fragment.text.chars() {
                        if let Some((_, _, style)) = chars.get_mut(index) {
                            if *style == self.default_style {
                                style.clone_from(&fragment.style);
                            }
                        }
                        index += 1;
                    }
                }
            }
        }

        if let Some(trailing) = matched.trailing_input() {
            for (i, _, style) in &mut chars {
                if trailing.contains(*i) {
                    TRAILING_INPUT_STYLE.clone_into(style);
                }
            }
        }
        chars
    }
}

impl Lexer for GrammarLexer {
    fn lex_document(&self, document: &Document) -> LexedDocument {
        let chars = self.char_styles(document.text());
        LexedDocument::from_styled_chars(chars.iter().map(|(_, c, style)| (style.as_str(), *c)))
    }

    fn invalidation_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.grammar.exact_pattern().hash(&mut hasher);
        self.default_style.hash(&mut hasher);
        let mut names: Vec<_> = self.lexers.keys().collect();
        names.sort();
        for name in names {
            name.hash(&mut hasher);
            if let Some(lexer) = self.lexers.get(name) {
                lexer.invalidation_hash().hash(&mut hasher);
            }
        }
        hasher.finish()
    }
}

impl std::fmt::Debug for GrammarLexer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.lexers.keys().collect();
        names.sort();
        f.debug_struct("GrammarLexer")
            .field("grammar", &self.grammar.exact_pattern())
            .field("default_style", &self.default_style)
            .field("lexers", &names)
            .finish()
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests compile fixed grammars")]
mod tests {
    use super::*;
    use crate::lexer::{SimpleLexer, StyleFragment};
    use termline_grammar::compile;

    fn command_lexer() -> GrammarLexer {
        let grammar = Arc::new(compile(r"(?P<cmd>\w+)\s+(?P<arg>\w+)").unwrap());
        GrammarLexer::new(grammar, "", HashMap::new())
            .with_lexer("cmd", Arc::new(SimpleLexer::new("class:cmd")))
            .with_lexer("arg", Arc::new(SimpleLexer::new("class:arg")))
    }

    #[test]
    fn styles_each_variable() {
        let lexed = command_lexer().lex_document(&Document::at_end("cd  tmp"));
        assert_eq!(
            lexed.line(0),
            [
                StyleFragment::new("class:cmd", "cd"),
                StyleFragment::new("", "  "),
                StyleFragment::new("class:arg", "tmp"),
            ]
        );
    }

    #[test]
    fn marks_trailing_input() {
        let lexed = command_lexer().lex_document(&Document::at_end("cd tmp !"));
        assert_eq!(
            lexed.line(0).last(),
            Some(&StyleFragment::new(TRAILING_INPUT_STYLE, " !"))
        );
    }

    #[test]
    fn outer_lexer_wins_over_inner() {
        let grammar = Arc::new(compile(r"(?P<outer>a(?P<inner>b))").unwrap());
        let lexer = GrammarLexer::new(grammar, "", HashMap::new())
            .with_lexer("outer", Arc::new(SimpleLexer::new("class:outer")))
            .with_lexer("inner", Arc::new(SimpleLexer::new("class:inner")));
        let lexed = lexer.lex_document(&Document::at_end("ab"));
        assert_eq!(lexed.line(0), [StyleFragment::new("class:outer", "ab")]);
    }

    #[test]
    fn hash_tracks_nested_lexers() {
        let plain = command_lexer();
        let restyled = command_lexer().with_lexer("arg", Arc::new(SimpleLexer::new("class:other")));
        assert_eq!(plain.invalidation_hash(), command_lexer().invalidation_hash());
        assert_ne!(plain.invalidation_hash(), restyled.invalidation_hash());
    }
}
