//! Completion from a fixed word list.

use std::collections::HashMap;

use super::{CompleteEvent, Completer, Completion, CompletionError};
use crate::document::Document;

/// Completes the word before the cursor from a fixed list.
#[derive(Debug, Clone, Default)]
pub struct WordCompleter {
    words: Vec<String>,
    meta: HashMap<String, String>,
    ignore_case: bool,
    whole_word: bool,
}

impl WordCompleter {
    /// A case-sensitive completer over `words`.
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Compare the typed prefix without regard to case.
    #[must_use]
    pub fn with_ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    /// Treat everything up to the last whitespace as the typed prefix rather
    /// than only word characters.
    #[must_use]
    pub fn with_whole_word(mut self, whole_word: bool) -> Self {
        self.whole_word = whole_word;
        self
    }

    /// Describe `word` in the completion menu.
    #[must_use]
    pub fn with_meta(mut self, word: impl Into<String>, meta: impl Into<String>) -> Self {
        self.meta.insert(word.into(), meta.into());
        self
    }

    fn accepts(&self, word: &str, typed: &str) -> bool {
        if self.ignore_case {
            word.to_lowercase().starts_with(&typed.to_lowercase())
        } else {
            word.starts_with(typed)
        }
    }
}

impl Completer for WordCompleter {
    fn get_completions(
        &self,
        document: &Document,
        _event: &CompleteEvent,
    ) -> Result<Vec<Completion>, CompletionError> {
        let typed = if self.whole_word {
            document.big_word_before_cursor()
        } else {
            document.word_before_cursor()
        };
        let start_position = -isize::try_from(typed.len()).unwrap_or(isize::MAX);

        Ok(self
            .words
            .iter()
            .filter(|word| self.accepts(word, typed))
            .map(|word| {
                let completion = Completion::new(word.as_str(), start_position);
                match self.meta.get(word) {
                    Some(meta) => completion.with_display_meta(meta.as_str()),
                    None => completion,
                }
            })
            .collect())
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests inspect completion results")]
mod tests {
    use super::*;
    use rstest::rstest;

    fn texts(completer: &WordCompleter, text: &str) -> Vec<String> {
        completer
            .get_completions(&Document::at_end(text), &CompleteEvent::requested())
            .unwrap()
            .into_iter()
            .map(|c| c.text().to_owned())
            .collect()
    }

    #[rstest]
    #[case("", &["home", "tmp", "var"])]
    #[case("t", &["tmp"])]
    #[case("x", &[])]
    #[case("cd h", &["home"])]
    fn completes_by_prefix(#[case] text: &str, #[case] expected: &[&str]) {
        let completer = WordCompleter::new(["home", "tmp", "var"]);
        assert_eq!(texts(&completer, text), expected);
    }

    #[test]
    fn ignores_case_on_request() {
        let completer = WordCompleter::new(["Home"]);
        assert!(texts(&completer, "ho").is_empty());
        assert_eq!(texts(&completer.with_ignore_case(true), "ho"), ["Home"]);
    }

    #[test]
    fn replaces_the_typed_word() {
        let completer = WordCompleter::new(["/usr/local"]).with_whole_word(true);
        let completions = completer
            .get_completions(&Document::at_end("cd /usr/lo"), &CompleteEvent::default())
            .unwrap();
        assert_eq!(completions.len(), 1);
        assert_eq!(completions[0].start_position(), -7);
    }

    #[test]
    fn attaches_meta() {
        let completer = WordCompleter::new(["tmp"]).with_meta("tmp", "scratch space");
        let completions = completer
            .get_completions(&Document::at_end(""), &CompleteEvent::default())
            .unwrap();
        assert_eq!(completions[0].display_meta(), Some("scratch space"));
    }
}
