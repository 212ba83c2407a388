//! Recursive-descent parser turning grammar tokens into a [`Node`] tree.
//!
//! Concatenation binds tighter than alternation and every quantifier wraps
//! the atom immediately before it.

use crate::compiler::native_fragment;
use crate::errors::{GrammarError, malformed, unsupported};
use crate::node::Node;
use crate::tokenizer::{Token, tokenize};

/// Parse a token stream into a grammar tree.
///
/// # Errors
/// Returns [`GrammarError::Unsupported`] for positive lookahead, bounded
/// repetition, escapes and group syntaxes outside the dialect, and
/// [`GrammarError::Malformed`] for dangling quantifiers or unbalanced
/// parentheses.
pub fn parse(tokens: &[Token<'_>]) -> Result<Node, GrammarError> {
    let mut parser = Parser { tokens, pos: 0 };
    let node = parser.parse_expr()?;
    if let Some(token) = parser.peek() {
        return Err(malformed("unmatched parentheses", token.position()));
    }
    Ok(node)
}

/// Tokenize and parse a grammar expression.
///
/// # Errors
/// Propagates tokenizer and parser errors.
///
/// # Examples
/// ```
/// use termline_grammar::{Node, parse_expression};
/// let node = parse_expression("(?P<a>x)|y")?;
/// assert_eq!(
///     node,
///     Node::Any {
///         children: vec![Node::variable("a", Node::regex("x")), Node::regex("y")],
///     }
/// );
/// # Ok::<(), termline_grammar::GrammarError>(())
/// ```
pub fn parse_expression(expression: &str) -> Result<Node, GrammarError> {
    let tokens = tokenize(expression)?;
    parse(&tokens)
}

struct Parser<'t, 'a> {
    tokens: &'t [Token<'a>],
    pos: usize,
}

impl<'a> Parser<'_, 'a> {
    fn peek(&self) -> Option<Token<'a>> {
        self.tokens.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<Token<'a>> {
        let token = self.peek()?;
        self.pos += 1;
        Some(token)
    }

    /// `expr := sequence ('|' sequence)*`
    fn parse_expr(&mut self) -> Result<Node, GrammarError> {
        let mut branches = vec![self.parse_sequence()?];
        while self.peek().is_some_and(|t| t.as_str() == "|") {
            self.advance();
            branches.push(self.parse_sequence()?);
        }
        if branches.len() == 1 {
            Ok(branches.pop().unwrap_or_else(Node::empty))
        } else {
            Ok(Node::Any { children: branches })
        }
    }

    /// `sequence := (atom quantifier?)*`
    fn parse_sequence(&mut self) -> Result<Node, GrammarError> {
        let mut terms: Vec<Node> = Vec::new();
        while let Some(token) = self.peek() {
            if matches!(token.as_str(), ")" | "|") {
                break;
            }
            self.advance();
            if let Some((min, max, greedy)) = quantifier(token.as_str()) {
                let Some(atom) = terms.pop() else {
                    return Err(malformed("nothing to repeat", token.position()));
                };
                terms.push(Node::repeat(atom, min, max, greedy));
            } else {
                terms.push(self.parse_atom(token)?);
            }
        }
        if terms.len() == 1 {
            Ok(terms.pop().unwrap_or_else(Node::empty))
        } else {
            Ok(Node::Sequence { children: terms })
        }
    }

    fn parse_atom(&mut self, token: Token<'a>) -> Result<Node, GrammarError> {
        let text = token.as_str();
        match text {
            "(" | "(?:" => self.parse_group_body(token),
            "(?!" => Ok(Node::negative_lookahead(self.parse_group_body(token)?)),
            "(?=" => Err(unsupported(text, token.position())),
            _ if text.starts_with("(?P<") => {
                let name = text
                    .strip_prefix("(?P<")
                    .and_then(|rest| rest.strip_suffix('>'))
                    .filter(|name| !name.is_empty())
                    .ok_or_else(|| malformed("invalid group name", token.position()))?;
                let child = self.parse_group_body(token)?;
                Ok(Node::variable(name, child))
            }
            _ if text.starts_with("(?") => Err(unsupported(text, token.position())),
            _ if text.len() > 1 && text.starts_with('{') => {
                Err(unsupported(text, token.position()))
            }
            _ => {
                native_fragment(text).map_err(|err| err.shifted(token.position()))?;
                Ok(Node::regex(text))
            }
        }
    }

    /// Parse up to and including the `)` closing `open`.
    fn parse_group_body(&mut self, open: Token<'a>) -> Result<Node, GrammarError> {
        let node = self.parse_expr()?;
        match self.advance() {
            Some(close) if close.as_str() == ")" => Ok(node),
            _ => Err(malformed("expecting ')'", open.position())),
        }
    }
}

/// Repetition bounds and greediness for a quantifier token.
fn quantifier(text: &str) -> Option<(usize, Option<usize>, bool)> {
    match text {
        "*" => Some((0, None, true)),
        "*?" => Some((0, None, false)),
        "+" => Some((1, None, true)),
        "+?" => Some((1, None, false)),
        "?" => Some((0, Some(1), true)),
        "??" => Some((0, Some(1), false)),
        _ => None,
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests exercise parser fallibility")]
mod tests {
    use super::*;
    use crate::node::concat;
    use rstest::rstest;

    fn parse_ok(expression: &str) -> Node {
        parse_expression(expression).unwrap()
    }

    #[test]
    fn empty_expression_is_empty_sequence() {
        assert_eq!(parse_ok(""), Node::empty());
        assert_eq!(parse_ok("  # only a comment"), Node::empty());
    }

    #[test]
    fn single_atom_passes_through() {
        assert_eq!(parse_ok("a"), Node::regex("a"));
        assert_eq!(parse_ok("(a)"), Node::regex("a"));
    }

    #[test]
    fn concatenation_binds_tighter_than_alternation() {
        let expected = Node::Any {
            children: vec![
                concat(Node::regex("a"), Node::regex("b")),
                Node::regex("c"),
            ],
        };
        assert_eq!(parse_ok("ab|c"), expected);
    }

    #[test]
    fn quantifier_binds_to_preceding_atom() {
        let expected = concat(Node::regex("a"), Node::one_or_more(Node::regex("b")));
        assert_eq!(parse_ok("ab+"), expected);
    }

    #[rstest]
    #[case("a*", 0, None, true)]
    #[case("a*?", 0, None, false)]
    #[case("a+", 1, None, true)]
    #[case("a+?", 1, None, false)]
    #[case("a?", 0, Some(1), true)]
    #[case("a??", 0, Some(1), false)]
    fn maps_quantifiers_to_repeat(
        #[case] expression: &str,
        #[case] min: usize,
        #[case] max: Option<usize>,
        #[case] greedy: bool,
    ) {
        assert_eq!(
            parse_ok(expression),
            Node::repeat(Node::regex("a"), min, max, greedy)
        );
    }

    #[test]
    fn quantifiers_stack() {
        assert_eq!(
            parse_ok("(a*)?"),
            Node::optional(Node::zero_or_more(Node::regex("a")))
        );
    }

    #[test]
    fn parses_nested_variables_and_lookahead() {
        let node = parse_ok(r"(?P<outer>(?P<inner>\d)(?!x))");
        let expected = Node::variable(
            "outer",
            concat(
                Node::variable("inner", Node::regex(r"\d")),
                Node::negative_lookahead(Node::regex("x")),
            ),
        );
        assert_eq!(node, expected);
    }

    #[test]
    fn empty_branches_are_empty_sequences() {
        assert_eq!(
            parse_ok("a|"),
            Node::Any {
                children: vec![Node::regex("a"), Node::empty()],
            }
        );
    }

    #[test]
    fn lone_brace_is_a_literal() {
        assert_eq!(parse_ok("{"), Node::regex("{"));
    }

    #[rstest]
    #[case("(?=x)", "(?=", 0)]
    #[case("a{2,4}", "{2,4}", 1)]
    #[case("a{3}", "{3}", 1)]
    #[case("(?<=a)b", "(?<=", 0)]
    #[case("(?<!a)b", "(?<!", 0)]
    #[case("(?i)a", "(?i", 0)]
    #[case("(?P<x>a)(?P=x)", "(?P=x)", 8)]
    #[case("(?#note)", "(?#note)", 0)]
    #[case(r"ab \e", r"\e", 3)]
    #[case(r"(a)\1", r"\1", 3)]
    #[case(r"x [a\Z]", r"\Z", 4)]
    fn rejects_unsupported_syntax(
        #[case] expression: &str,
        #[case] construct: &str,
        #[case] position: usize,
    ) {
        let err = parse_expression(expression).unwrap_err();
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

    #[rstest]
    #[case("*a", "nothing to repeat", 0)]
    #[case("a|+", "nothing to repeat", 2)]
    #[case("(a", "expecting ')'", 0)]
    #[case("a(?P<x>b", "expecting ')'", 1)]
    #[case("a)", "unmatched parentheses", 1)]
    #[case("(?P<", "invalid group name", 0)]
    fn rejects_malformed_expressions(
        #[case] expression: &str,
        #[case] message: &str,
        #[case] position: usize,
    ) {
        let err = parse_expression(expression).unwrap_err();
        let GrammarError::Malformed(info) = err else {
            panic!("expected malformed-expression error");
        };
        assert_eq!(info.message, message);
        assert_eq!(info.position, position);
    }
}
