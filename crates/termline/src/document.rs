//! The editor buffer as seen by completers, lexers and validators.

/// Immutable text plus a cursor position.
///
/// The cursor is a byte offset that always lies on a char boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Document {
    text: String,
    cursor_position: usize,
}

impl Document {
    /// Create a document, moving the cursor down to the nearest char boundary
    /// inside `text`.
    #[must_use]
    pub fn new(text: impl Into<String>, cursor_position: usize) -> Self {
        let text = text.into();
        let mut cursor = cursor_position.min(text.len());
        while !text.is_char_boundary(cursor) {
            cursor -= 1;
        }
        Self {
            text,
            cursor_position: cursor,
        }
    }

    /// Create a document with the cursor after the last char.
    #[must_use]
    pub fn at_end(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor_position = text.len();
        Self {
            text,
            cursor_position,
        }
    }

    /// The whole buffer.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Byte offset of the cursor.
    #[must_use]
    pub fn cursor_position(&self) -> usize {
        self.cursor_position
    }

    /// Text up to the cursor.
    #[must_use]
    pub fn text_before_cursor(&self) -> &str {
        self.text.get(..self.cursor_position).unwrap_or_default()
    }

    /// Text from the cursor on.
    #[must_use]
    pub fn text_after_cursor(&self) -> &str {
        self.text.get(self.cursor_position..).unwrap_or_default()
    }

    /// The run of word characters (alphanumerics and `_`) ending at the cursor.
    #[must_use]
    pub fn word_before_cursor(&self) -> &str {
        trailing_run(self.text_before_cursor(), |c| c.is_alphanumeric() || c == '_')
    }

    /// The run of non-whitespace characters ending at the cursor.
    #[must_use]
    pub fn big_word_before_cursor(&self) -> &str {
        trailing_run(self.text_before_cursor(), |c| !c.is_whitespace())
    }

    /// Lines of the buffer, split on `\n`. An empty buffer has one empty line.
    pub fn lines(&self) -> std::str::Split<'_, char> {
        self.text.split('\n')
    }

    /// Number of lines in the buffer.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines().count()
    }
}

fn trailing_run(text: &str, keep: impl Fn(char) -> bool) -> &str {
    let start = text
        .char_indices()
        .rev()
        .take_while(|&(_, c)| keep(c))
        .last()
        .map_or(text.len(), |(i, _)| i);
    text.get(start..).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn splits_text_at_the_cursor() {
        let doc = Document::new("cd tmp", 3);
        assert_eq!(doc.text_before_cursor(), "cd ");
        assert_eq!(doc.text_after_cursor(), "tmp");
    }

    #[rstest]
    #[case("héllo", 2, 1)]
    #[case("héllo", 3, 3)]
    #[case("abc", 99, 3)]
    fn clamps_cursor_to_char_boundaries(
        #[case] text: &str,
        #[case] cursor: usize,
        #[case] expected: usize,
    ) {
        assert_eq!(Document::new(text, cursor).cursor_position(), expected);
    }

    #[rstest]
    #[case("cd tm", "tm", "tm")]
    #[case("cd /usr/lo", "lo", "/usr/lo")]
    #[case("cd ", "", "")]
    #[case("", "", "")]
    fn finds_words_before_the_cursor(
        #[case] text: &str,
        #[case] word: &str,
        #[case] big_word: &str,
    ) {
        let doc = Document::at_end(text);
        assert_eq!(doc.word_before_cursor(), word);
        assert_eq!(doc.big_word_before_cursor(), big_word);
    }

    #[test]
    fn counts_lines() {
        assert_eq!(Document::at_end("").line_count(), 1);
        assert_eq!(Document::at_end("a\nb\n").line_count(), 3);
    }
}
