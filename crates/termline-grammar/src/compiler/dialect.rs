//! Rewrites leaf fragments into the syntax accepted by the native engine.
//!
//! Native patterns are compiled in Unicode mode, which rejects identity
//! escapes of ordinary punctuation (`\ `, `\-`, `\#`) and stray `]`, `{`,
//! `}` that the grammar dialect accepts as literals. The dialect's `\w`, `\d`
//! and `\b` are Unicode-aware, so they become property classes and
//! lookarounds. `\A` and `\Z` become `^` and `$`; native patterns never use
//! the multiline flag. Any other letter or digit escape is rejected rather
//! than passed on with a different meaning.

use std::borrow::Cow;
use std::iter::Peekable;
use std::str::CharIndices;

use crate::errors::{GrammarError, unsupported};
use crate::node::SYNTAX_CHARS;

/// Members of the word class, usable inside `[...]`.
const WORD: &str = r"_\p{L}\p{N}";

const WORD_BOUNDARY: &str = r"(?:(?<=[_\p{L}\p{N}])(?![_\p{L}\p{N}])|(?<![_\p{L}\p{N}])(?=[_\p{L}\p{N}]))";

const NOT_WORD_BOUNDARY: &str = r"(?:(?<=[_\p{L}\p{N}])(?=[_\p{L}\p{N}])|(?<![_\p{L}\p{N}])(?![_\p{L}\p{N}]))";

type Chars<'a> = Peekable<CharIndices<'a>>;

/// An open character class being rewritten.
#[derive(Default)]
struct Class {
    negated: bool,
    body: String,
    non_word: bool,
}

impl Class {
    /// Emit the class. A `\W` member cannot be expressed inside a Unicode
    /// class, so it is spelled as an alternation with the negated word class.
    fn close(self, out: &mut String) {
        let Self {
            negated,
            body,
            non_word,
        } = self;
        match (non_word, negated, body.is_empty()) {
            (false, true, _) => out.push_str(&format!("[^{body}]")),
            (false, false, _) => out.push_str(&format!("[{body}]")),
            (true, false, true) => out.push_str(&format!("[^{WORD}]")),
            (true, false, false) => out.push_str(&format!("(?:[{body}]|[^{WORD}])")),
            (true, true, true) => out.push_str(&format!("[{WORD}]")),
            (true, true, false) => out.push_str(&format!("(?:(?![{body}])[{WORD}])")),
        }
    }
}

/// Normalize a leaf fragment for the native engine.
///
/// # Errors
/// Returns [`GrammarError::Unsupported`] for escapes outside the dialect,
/// such as `\e`, backreferences `\1` or octal `\012`. The position is the
/// byte offset of the backslash within `pattern`.
pub(crate) fn native_fragment(pattern: &str) -> Result<Cow<'_, str>, GrammarError> {
    if !pattern.contains(['\\', '[', ']', '{', '}']) {
        return Ok(Cow::Borrowed(pattern));
    }

    let mut out = String::with_capacity(pattern.len() + 2);
    let mut class: Option<Class> = None;
    let mut chars = pattern.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if let Some(open) = class.as_mut() {
            match c {
                '\\' => match chars.next() {
                    Some((_, 'W')) => open.non_word = true,
                    Some((_, escaped)) => {
                        open.body.push_str(&translate_escape(escaped, true, i, &mut chars)?);
                    }
                    None => open.body.push_str(r"\\"),
                },
                ']' => {}
                _ => open.body.push(c),
            }
            if let Some(done) = class.take_if(|_| c == ']') {
                done.close(&mut out);
            }
            continue;
        }

        match c {
            '\\' => match chars.next() {
                Some((_, escaped)) => {
                    out.push_str(&translate_escape(escaped, false, i, &mut chars)?);
                }
                None => out.push_str(r"\\"),
            },
            '[' => {
                let mut open = Class::default();
                if let Some(&(_, '^')) = chars.peek() {
                    chars.next();
                    open.negated = true;
                }
                class = Some(open);
            }
            ']' | '}' => {
                out.push('\\');
                out.push(c);
            }
            '{' => {
                let rest = pattern.get(i..).unwrap_or_default();
                match counted_repetition_len(rest) {
                    Some(len) => {
                        out.push_str(rest.get(..len).unwrap_or_default());
                        for _ in 1..len {
                            chars.next();
                        }
                    }
                    None => out.push_str(r"\{"),
                }
            }
            _ => out.push(c),
        }
    }

    // Left open for the native engine to report.
    if let Some(open) = class {
        out.push('[');
        if open.negated {
            out.push('^');
        }
        out.push_str(&open.body);
    }

    Ok(Cow::Owned(out))
}

/// Native spelling of the escape `\escaped` found at byte `position`.
fn translate_escape(
    escaped: char,
    in_class: bool,
    position: usize,
    chars: &mut Chars<'_>,
) -> Result<Cow<'static, str>, GrammarError> {
    let rejected = || unsupported(&format!("\\{escaped}"), position);
    let digit_follows = chars.peek().is_some_and(|&(_, next)| next.is_ascii_digit());
    let spelled = match escaped {
        'w' if in_class => Cow::Borrowed(WORD),
        'w' => Cow::Owned(format!("[{WORD}]")),
        'W' => Cow::Owned(format!("[^{WORD}]")),
        'd' => Cow::Borrowed(r"\p{Nd}"),
        'D' => Cow::Borrowed(r"\P{Nd}"),
        'b' if in_class => Cow::Borrowed(r"\b"),
        'b' => Cow::Borrowed(WORD_BOUNDARY),
        'B' if !in_class => Cow::Borrowed(NOT_WORD_BOUNDARY),
        'A' if !in_class => Cow::Borrowed("^"),
        'Z' if !in_class => Cow::Borrowed("$"),
        'a' => Cow::Borrowed(r"\x07"),
        '0' if !digit_follows => Cow::Borrowed(r"\0"),
        's' | 'S' | 'n' | 't' | 'r' | 'f' | 'v' | 'x' | 'u' => Cow::Owned(format!("\\{escaped}")),
        'U' => {
            let digits: String = chars.clone().take(8).map(|(_, c)| c).collect();
            if digits.len() != 8 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(rejected());
            }
            for _ in 0..8 {
                chars.next();
            }
            Cow::Owned(format!("\\u{{{digits}}}"))
        }
        c if c.is_ascii_alphanumeric() => return Err(rejected()),
        c if SYNTAX_CHARS.contains(c) || (in_class && c == '-') => Cow::Owned(format!("\\{c}")),
        c => Cow::Owned(c.to_string()),
    };
    Ok(spelled)
}

/// Byte length of a `{m}`, `{m,}` or `{m,n}` quantifier at the start of `rest`.
fn counted_repetition_len(rest: &str) -> Option<usize> {
    let body_len = rest.get(1..)?.find('}')?;
    let body = rest.get(1..=body_len)?;
    let (min, max) = body.split_once(',').unwrap_or((body, ""));
    let digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if min.is_empty() || !digits(min) || !digits(max) {
        return None;
    }
    Some(body_len + 2)
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests exercise fragment rewriting")]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("a", "a")]
    #[case(r"\s", r"\s")]
    #[case(r"\d", r"\p{Nd}")]
    #[case(r"\w", r"[_\p{L}\p{N}]")]
    #[case(r"\W", r"[^_\p{L}\p{N}]")]
    #[case(r"\A", "^")]
    #[case(r"\Z", "$")]
    #[case(r"\+", r"\+")]
    #[case(r"\ ", " ")]
    #[case(r"\-", "-")]
    #[case(r"\#", "#")]
    #[case(r"\é", "é")]
    #[case(r"\U0001F600", r"\u{0001F600}")]
    #[case(r"[\- ]", r"[\- ]")]
    #[case(r"[\ \]]", r"[ \]]")]
    #[case(r"[^\s]", r"[^\s]")]
    #[case(r"[\w.]", r"[_\p{L}\p{N}.]")]
    #[case(r"[\W]", r"[^_\p{L}\p{N}]")]
    #[case(r"[^\W]", r"[_\p{L}\p{N}]")]
    #[case(r"[a\W]", r"(?:[a]|[^_\p{L}\p{N}])")]
    #[case(r"[^a\W]", r"(?:(?![a])[_\p{L}\p{N}])")]
    #[case("]", r"\]")]
    #[case("{", r"\{")]
    #[case("}", r"\}")]
    #[case("a{2,4}", "a{2,4}")]
    #[case("a{2,}", "a{2,}")]
    #[case("a{,4}", r"a\{,4\}")]
    #[case("[{}]", "[{}]")]
    fn normalizes_fragments(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(native_fragment(input).unwrap(), expected);
    }

    #[rstest]
    #[case(r"a\eb", r"\e", 1)]
    #[case(r"\1", r"\1", 0)]
    #[case(r"\012", r"\0", 0)]
    #[case(r"\k", r"\k", 0)]
    #[case(r"\p", r"\p", 0)]
    #[case(r"[a\A]", r"\A", 2)]
    #[case(r"\U0001", r"\U", 0)]
    fn rejects_escapes_outside_the_dialect(
        #[case] input: &str,
        #[case] construct: &str,
        #[case] position: usize,
    ) {
        let err = native_fragment(input).unwrap_err();
        let GrammarError::Unsupported {
            construct: found,
            position: at,
        } = err
        else {
            panic!("expected unsupported-feature error");
        };
        assert_eq!(found, construct);
        assert_eq!(at, position);
    }

    #[test]
    fn borrows_plain_fragments() {
        assert!(matches!(native_fragment(r"ab.c"), Ok(Cow::Borrowed(_))));
    }
}
