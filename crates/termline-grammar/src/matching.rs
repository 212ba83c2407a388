//! Match results and the variables they expose.

use std::ops::Range;

use crate::compiler::GroupId;
use crate::grammar::CompiledGrammar;

/// Variable name reported for the unmatched suffix of a prefix match.
pub const TRAILING_INPUT: &str = "<trailing_input>";

/// A raw capture: which synthetic group matched which span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Capture {
    pub(crate) group: GroupId,
    pub(crate) span: Range<usize>,
}

/// One captured occurrence of a variable.
///
/// `start..stop` is a half-open byte range into the matched input.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MatchVariable {
    /// The variable name.
    pub name: String,
    /// The captured text after unescaping.
    pub value: String,
    /// Byte offset where the capture starts.
    pub start: usize,
    /// Byte offset one past the end of the capture.
    pub stop: usize,
}

impl MatchVariable {
    /// The captured byte range.
    #[must_use]
    pub fn slice(&self) -> Range<usize> {
        self.start..self.stop
    }

    /// Whether `position` lies inside `[start, stop)`.
    #[must_use]
    pub fn contains(&self, position: usize) -> bool {
        self.slice().contains(&position)
    }
}

/// Ordered multimap from variable name to captured occurrences.
///
/// The same name may occur in several alternation branches; callers can ask
/// for the first occurrence or for all of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Variables {
    entries: Vec<MatchVariable>,
}

impl Variables {
    /// The first occurrence of `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&MatchVariable> {
        self.entries.iter().find(|var| var.name == name)
    }

    /// Every occurrence of `name`, in match order.
    #[must_use]
    pub fn get_all(&self, name: &str) -> Vec<&MatchVariable> {
        self.entries.iter().filter(|var| var.name == name).collect()
    }

    /// Iterate over all occurrences in match order.
    pub fn iter(&self) -> std::slice::Iter<'_, MatchVariable> {
        self.entries.iter()
    }

    /// Number of captured occurrences.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'v> IntoIterator for &'v Variables {
    type Item = &'v MatchVariable;
    type IntoIter = std::slice::Iter<'v, MatchVariable>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for Variables {
    type Item = MatchVariable;
    type IntoIter = std::vec::IntoIter<MatchVariable>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// The result of matching an input against a [`CompiledGrammar`].
#[derive(Debug, Clone)]
pub struct Match<'g> {
    grammar: &'g CompiledGrammar,
    input: String,
    captures: Vec<(String, Range<usize>)>,
    trailing: Option<Range<usize>>,
}

impl<'g> Match<'g> {
    pub(crate) fn new(
        grammar: &'g CompiledGrammar,
        input: &str,
        captures: Vec<Capture>,
        trailing: Option<Range<usize>>,
    ) -> Self {
        // Several prefix patterns may capture the same variable at the same
        // place; keep one of each.
        let mut named: Vec<(String, Range<usize>)> = Vec::with_capacity(captures.len());
        for Capture { group, span } in captures {
            let Some(name) = grammar.group_name(group) else {
                continue;
            };
            if !named.iter().any(|(n, s)| n == name && *s == span) {
                named.push((name.to_owned(), span));
            }
        }
        Self {
            grammar,
            input: input.to_owned(),
            captures: named,
            trailing,
        }
    }

    /// The grammar that produced this match.
    #[must_use]
    pub fn grammar(&self) -> &'g CompiledGrammar {
        self.grammar
    }

    /// The matched input.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    fn variable(&self, name: &str, span: &Range<usize>) -> MatchVariable {
        let raw = self.input.get(span.clone()).unwrap_or_default();
        MatchVariable {
            name: name.to_owned(),
            value: self.grammar.unescape(name, raw),
            start: span.start,
            stop: span.end,
        }
    }

    /// Every captured variable occurrence, outer groups before inner ones.
    #[must_use]
    pub fn variables(&self) -> Variables {
        Variables {
            entries: self
                .captures
                .iter()
                .map(|(name, span)| self.variable(name, span))
                .collect(),
        }
    }

    /// The variable occurrences reaching the end of the input: the fields the
    /// cursor currently sits in when matching text before the cursor.
    #[must_use]
    pub fn end_nodes(&self) -> Vec<MatchVariable> {
        self.captures
            .iter()
            .filter(|(_, span)| span.end == self.input.len())
            .map(|(name, span)| self.variable(name, span))
            .collect()
    }

    /// The unmatched suffix of a prefix match, if any.
    #[must_use]
    pub fn trailing_input(&self) -> Option<MatchVariable> {
        let span = self.trailing.clone()?;
        Some(MatchVariable {
            name: TRAILING_INPUT.to_owned(),
            value: self.input.get(span.clone()).unwrap_or_default().to_owned(),
            start: span.start,
            stop: span.end,
        })
    }

    /// The innermost variable whose `[start, stop)` contains `position`.
    ///
    /// Returns `None` inside literal text, at a span's exclusive end and
    /// outside the input.
    #[must_use]
    pub fn variable_at_position(&self, position: usize) -> Option<MatchVariable> {
        self.captures
            .iter()
            .filter(|(_, span)| span.contains(&position))
            .min_by_key(|(_, span)| span.len())
            .map(|(name, span)| self.variable(name, span))
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests exercise matching fallibility")]
mod tests {
    use crate::compile;

    #[test]
    fn prefix_match_reports_trailing_input() {
        let grammar = compile("hello").unwrap();
        let m = grammar.match_prefix("hello world");
        let trailing = m.trailing_input().unwrap();
        assert_eq!(trailing.value, " world");
        assert_eq!(trailing.slice(), 5..11);

        let grammar = compile(r"hello\s").unwrap();
        let m = grammar.match_prefix("hello world");
        assert_eq!(m.trailing_input().unwrap().value, "world");
    }

    #[test]
    fn prefix_match_without_trailing_input() {
        let grammar = compile("hello").unwrap();
        let m = grammar.match_prefix("hel");
        assert!(m.trailing_input().is_none());
        assert!(m.variables().is_empty());
    }

    #[test]
    fn end_nodes_target_the_field_under_the_cursor() {
        let grammar = compile(r"cd\s(?P<dir>\w*)").unwrap();
        let m = grammar.match_prefix("cd ");
        let ends = m.end_nodes();
        assert_eq!(ends.len(), 1);
        assert_eq!(ends[0].name, "dir");
        assert_eq!(ends[0].slice(), 3..3);

        let m = grammar.match_prefix("cd tm");
        let ends = m.end_nodes();
        assert_eq!(ends.len(), 1);
        assert_eq!(ends[0].value, "tm");
    }

    #[test]
    fn end_nodes_cover_every_alternative() {
        let grammar = compile(r"(?P<name>\w*)|(?P<city>\w*)").unwrap();
        let m = grammar.match_prefix("par");
        let names: Vec<_> = m.end_nodes().into_iter().map(|v| v.name).collect();
        assert_eq!(names, vec!["name", "city"]);
    }

    #[test]
    fn variables_keep_first_and_all_occurrences() {
        let grammar = compile(r"(?P<n>\d)\s(?P<n>\d)").unwrap();
        let m = grammar.match_exact("1 2").unwrap();
        let vars = m.variables();
        assert_eq!(vars.get("n").unwrap().value, "1");
        let all: Vec<&str> = vars
            .get_all("n")
            .into_iter()
            .map(|v| v.value.as_str())
            .collect();
        assert_eq!(all, vec!["1", "2"]);
        assert!(vars.get("missing").is_none());
        assert_eq!(vars.len(), 2);
    }

    #[test]
    fn variable_at_position_uses_half_open_spans() {
        let grammar = compile(r"cd\s(?P<dir>\w+)").unwrap();
        let m = grammar.match_exact("cd tmp").unwrap();
        assert!(m.variable_at_position(0).is_none());
        assert!(m.variable_at_position(2).is_none());
        assert_eq!(m.variable_at_position(3).unwrap().value, "tmp");
        assert_eq!(m.variable_at_position(5).unwrap().name, "dir");
        assert!(m.variable_at_position(6).is_none());
        assert!(m.variable_at_position(100).is_none());
    }

    #[test]
    fn variable_at_position_prefers_innermost() {
        let grammar = compile(r"(?P<cmd>go\s(?P<arg>\w+))").unwrap();
        let m = grammar.match_exact("go north").unwrap();
        assert_eq!(m.variable_at_position(0).unwrap().name, "cmd");
        assert_eq!(m.variable_at_position(4).unwrap().name, "arg");
    }

    #[test]
    fn nested_variables_are_reported_outer_first() {
        let grammar = compile(r"(?P<outer>a(?P<inner>b))").unwrap();
        let m = grammar.match_exact("ab").unwrap();
        let names: Vec<_> = m.variables().into_iter().map(|v| v.name).collect();
        assert_eq!(names, vec!["outer", "inner"]);
    }
}
