//! Grammar tokenizer splitting an expression into atomic regex tokens.
//!
//! Verbose mode is always on: whitespace and `#` comments outside character
//! classes never reach the parser.

use crate::errors::{GrammarError, malformed};

/// A single token of a grammar expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    text: &'a str,
    position: usize,
}

impl<'a> Token<'a> {
    /// The token text exactly as it appears in the expression.
    #[must_use]
    pub fn as_str(&self) -> &'a str {
        self.text
    }

    /// Byte offset of the token in the expression.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }
}

enum Scanned {
    Keep(usize),
    Skip(usize),
}

/// Split `expression` into regex tokens.
///
/// # Errors
/// Returns [`GrammarError::Malformed`] for an unterminated character class or
/// a dangling escape at the end of the expression.
///
/// # Examples
/// ```
/// use termline_grammar::tokenize;
/// let tokens = tokenize(r"cd \s+ (?P<dir>[^\s]*)  # directory")?;
/// let texts: Vec<_> = tokens.iter().map(|t| t.as_str()).collect();
/// assert_eq!(texts, ["c", "d", r"\s", "+", "(?P<dir>", r"[^\s]", "*", ")"]);
/// # Ok::<(), termline_grammar::GrammarError>(())
/// ```
pub fn tokenize(expression: &str) -> Result<Vec<Token<'_>>, GrammarError> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while let Some(rest) = expression.get(pos..).filter(|rest| !rest.is_empty()) {
        match scan(rest, pos)? {
            Scanned::Keep(len) => {
                if let Some(text) = rest.get(..len) {
                    tokens.push(Token {
                        text,
                        position: pos,
                    });
                }
                pos += len;
            }
            Scanned::Skip(len) => pos += len,
        }
    }

    Ok(tokens)
}

fn scan(rest: &str, position: usize) -> Result<Scanned, GrammarError> {
    let Some(first) = rest.chars().next() else {
        return Ok(Scanned::Skip(0));
    };

    if rest.starts_with("(?") {
        return Ok(Scanned::Keep(group_opener_len(rest)));
    }

    let len = match first {
        '(' | ')' | '|' => 1,
        '*' | '+' | '?' => {
            if rest.get(1..2) == Some("?") {
                2
            } else {
                1
            }
        }
        '{' => {
            let tail = rest.get(1..).unwrap_or_default();
            match tail.find(['{', '}']) {
                Some(close) if tail.get(close..=close) == Some("}") => close + 2,
                _ => 1,
            }
        }
        '#' => {
            let len = rest.find('\n').map_or(rest.len(), |newline| newline + 1);
            return Ok(Scanned::Skip(len));
        }
        '\\' => {
            let Some(escaped) = rest.get(1..).and_then(|tail| tail.chars().next()) else {
                return Err(malformed("dangling escape", position));
            };
            1 + escaped.len_utf8()
        }
        '[' => class_len(rest)
            .ok_or_else(|| malformed("unterminated character class", position))?,
        c if c.is_whitespace() => return Ok(Scanned::Skip(c.len_utf8())),
        c => c.len_utf8(),
    };

    Ok(Scanned::Keep(len))
}

/// Length of a token starting with `(?`.
fn group_opener_len(rest: &str) -> usize {
    if let Some(tail) = rest.strip_prefix("(?P<") {
        let name_len = tail
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
            .unwrap_or(tail.len());
        if name_len > 0 && tail.get(name_len..=name_len) == Some(">") {
            return 4 + name_len + 1;
        }
        return 4;
    }
    if rest.starts_with("(?P=") || rest.starts_with("(?#") {
        return rest.find(')').map_or(rest.len(), |close| close + 1);
    }
    if rest.starts_with("(?<=") || rest.starts_with("(?<!") {
        return 4;
    }
    // `(?:`, `(?=`, `(?!` and inline flags all take three bytes; the parser
    // decides which of them it accepts.
    rest.get(2..)
        .and_then(|tail| tail.chars().next())
        .map_or(2, |c| 2 + c.len_utf8())
}

/// Length of a character class starting at `rest`, including both brackets.
fn class_len(rest: &str) -> Option<usize> {
    let mut chars = rest.char_indices().skip(1);
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                chars.next()?;
            }
            ']' => return Some(i + 1),
            _ => {}
        }
    }
    None
}
