//! Styling of documents for display.

mod grammar;

use std::hash::{DefaultHasher, Hash, Hasher};

use crate::document::Document;

pub use grammar::{GrammarLexer, TRAILING_INPUT_STYLE};

/// A run of text sharing one style.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StyleFragment {
    /// Style class string, e.g. `class:keyword`. Empty for the default style.
    pub style: String,
    /// The styled text; never contains a newline.
    pub text: String,
}

impl StyleFragment {
    /// A fragment of `text` styled with `style`.
    pub fn new(style: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            style: style.into(),
            text: text.into(),
        }
    }
}

/// Styled lines of a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LexedDocument {
    lines: Vec<Vec<StyleFragment>>,
}

impl LexedDocument {
    /// Wrap already split lines.
    #[must_use]
    pub fn new(lines: Vec<Vec<StyleFragment>>) -> Self {
        Self { lines }
    }

    /// Split `(style, char)` pairs into lines, merging adjacent chars of the
    /// same style into one fragment.
    pub fn from_styled_chars<'s, I>(chars: I) -> Self
    where
        I: IntoIterator<Item = (&'s str, char)>,
    {
        let mut lines: Vec<Vec<StyleFragment>> = vec![Vec::new()];
        for (style, c) in chars {
            if c == '\n' {
                lines.push(Vec::new());
                continue;
            }
            let Some(line) = lines.last_mut() else {
                continue;
            };
            match line.last_mut() {
                Some(last) if last.style == style => last.text.push(c),
                _ => line.push(StyleFragment::new(style, c)),
            }
        }
        Self { lines }
    }

    /// Fragments of line `line`; empty when out of range.
    #[must_use]
    pub fn line(&self, line: usize) -> &[StyleFragment] {
        self.lines.get(line).map(Vec::as_slice).unwrap_or_default()
    }

    /// All lines.
    #[must_use]
    pub fn lines(&self) -> &[Vec<StyleFragment>] {
        &self.lines
    }

    /// Number of lines.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

/// Produces styled fragments for a document.
pub trait Lexer: Send + Sync {
    /// Style every line of `document`.
    fn lex_document(&self, document: &Document) -> LexedDocument;

    /// Changes whenever the lexer would style the same document differently.
    fn invalidation_hash(&self) -> u64;
}

/// Styles every char with one style.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimpleLexer {
    style: String,
}

impl SimpleLexer {
    /// Lexer applying `style` to all text.
    pub fn new(style: impl Into<String>) -> Self {
        Self {
            style: style.into(),
        }
    }

    /// The applied style.
    #[must_use]
    pub fn style(&self) -> &str {
        &self.style
    }
}

impl Lexer for SimpleLexer {
    fn lex_document(&self, document: &Document) -> LexedDocument {
        LexedDocument::from_styled_chars(document.text().chars().map(|c| (self.style.as_str(), c)))
    }

    fn invalidation_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.style.hash(&mut hasher);
        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merges_runs_and_splits_lines() {
        let styled = [("a", 'x'), ("a", 'y'), ("b", 'z'), ("b", '\n'), ("a", 'w')];
        let lexed = LexedDocument::from_styled_chars(styled);
        assert_eq!(
            lexed.line(0),
            [StyleFragment::new("a", "xy"), StyleFragment::new("b", "z")]
        );
        assert_eq!(lexed.line(1), [StyleFragment::new("a", "w")]);
        assert_eq!(lexed.line_count(), 2);
    }

    #[test]
    fn split_lines_equal_prebuilt_lines() {
        let lexed = LexedDocument::from_styled_chars([("a", 'x'), ("a", '\n'), ("b", 'y')]);
        let expected = LexedDocument::new(vec![
            vec![StyleFragment::new("a", "x")],
            vec![StyleFragment::new("b", "y")],
        ]);
        assert_eq!(lexed, expected);
        assert_eq!(expected.lines().len(), expected.line_count());
    }

    #[test]
    fn out_of_range_lines_are_empty() {
        let lexed = SimpleLexer::new("class:x").lex_document(&Document::at_end("one"));
        assert!(lexed.line(1).is_empty());
        assert!(lexed.line(usize::MAX).is_empty());
    }

    #[test]
    fn simple_lexer_styles_every_line() {
        let lexed = SimpleLexer::new("class:x").lex_document(&Document::at_end("a\n\nb"));
        assert_eq!(lexed.line(0), [StyleFragment::new("class:x", "a")]);
        assert!(lexed.line(1).is_empty());
        assert_eq!(lexed.line(2), [StyleFragment::new("class:x", "b")]);
    }

    #[test]
    fn hash_depends_on_style() {
        assert_eq!(
            SimpleLexer::new("a").invalidation_hash(),
            SimpleLexer::new("a").invalidation_hash()
        );
        assert_ne!(
            SimpleLexer::new("a").invalidation_hash(),
            SimpleLexer::new("b").invalidation_hash()
        );
    }
}
