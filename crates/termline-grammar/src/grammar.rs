//! Compiled grammars: the entry artifact of the crate.

use std::collections::HashMap;
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::compiler::{Fragment, GroupId, lower};
use crate::errors::GrammarError;
use crate::matching::{Capture, Match};
use crate::node::Node;
use crate::parser::parse_expression;

/// A function transforming a variable's value, e.g. adding or removing quotes.
pub type EscapeFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Escape or unescape functions keyed by variable name.
pub type EscapeFuncs = HashMap<String, EscapeFn>;

/// Flags applied to every native pattern: `.` matches newlines too, and the
/// source is parsed in Unicode mode so unknown escapes are errors.
const NATIVE_FLAGS: &str = "su";

/// One compiled native pattern and the variable groups it captures.
#[derive(Debug)]
struct NativePattern {
    source: String,
    regex: regress::Regex,
    groups: Vec<GroupId>,
    trailing: bool,
}

impl NativePattern {
    fn anchored(body: &Fragment) -> Result<Self, GrammarError> {
        Self::build(format!("^(?:{})$", body.source), body.groups.clone(), false)
    }

    fn with_trailing(body: &Fragment) -> Result<Self, GrammarError> {
        Self::build(format!("^(?:{})(.*?)$", body.source), body.groups.clone(), true)
    }

    fn build(source: String, groups: Vec<GroupId>, trailing: bool) -> Result<Self, GrammarError> {
        let regex = regress::Regex::with_flags(&source, NATIVE_FLAGS)?;
        Ok(Self {
            source,
            regex,
            groups,
            trailing,
        })
    }

    /// Run the pattern, collecting variable captures and the trailing span.
    fn run(&self, input: &str, captures: &mut Vec<Capture>) -> Option<Option<Range<usize>>> {
        let found = self.regex.find(input)?;
        for (index, &group) in self.groups.iter().enumerate() {
            if let Some(span) = found.group(index + 1) {
                captures.push(Capture { group, span });
            }
        }
        let trailing = if self.trailing {
            found.group(self.groups.len() + 1)
        } else {
            None
        };
        Some(trailing)
    }
}

/// A grammar compiled for exact and prefix matching.
///
/// Immutable once built and safe to share between threads.
///
/// Inside a repeated group only the last iteration is captured. A variable
/// that does not take part in that iteration is absent even when an earlier
/// iteration matched it: `(?:(?P<x>a)|b)*` on `ab` captures no `x`.
///
/// # Examples
/// ```
/// use termline_grammar::compile;
/// let grammar = compile(r"(?P<a>\d+)\+(?P<b>\d+)")?;
/// let m = grammar.match_exact("12+34").expect("input is in the language");
/// let vars = m.variables();
/// assert_eq!(vars.get("a").map(|v| v.value.as_str()), Some("12"));
/// assert_eq!(vars.get("b").map(|v| v.value.as_str()), Some("34"));
/// # Ok::<(), termline_grammar::GrammarError>(())
/// ```
pub struct CompiledGrammar {
    root: Node,
    exact: NativePattern,
    prefix: Vec<NativePattern>,
    prefix_with_trailing: Vec<NativePattern>,
    group_names: Vec<String>,
    escape_funcs: EscapeFuncs,
    unescape_funcs: EscapeFuncs,
}

/// Compile a grammar expression.
///
/// # Errors
/// Returns [`GrammarError`] when the expression is malformed or uses
/// unsupported syntax.
pub fn compile(expression: &str) -> Result<CompiledGrammar, GrammarError> {
    compile_with(expression, EscapeFuncs::new(), EscapeFuncs::new())
}

/// Compile a grammar expression with per-variable escape and unescape
/// functions.
///
/// # Errors
/// Returns [`GrammarError`] when the expression is malformed or uses
/// unsupported syntax.
pub fn compile_with(
    expression: &str,
    escape_funcs: EscapeFuncs,
    unescape_funcs: EscapeFuncs,
) -> Result<CompiledGrammar, GrammarError> {
    let root = parse_expression(expression)?;
    CompiledGrammar::from_node(root, escape_funcs, unescape_funcs)
}

impl CompiledGrammar {
    /// Compile a grammar tree built by the parser or by hand.
    ///
    /// # Errors
    /// Returns [`GrammarError::Unsupported`] for positive lookahead and
    /// [`GrammarError::Regex`] when a leaf fragment is not a valid pattern.
    pub fn from_node(
        root: Node,
        escape_funcs: EscapeFuncs,
        unescape_funcs: EscapeFuncs,
    ) -> Result<Self, GrammarError> {
        let lowered = lower(&root)?;
        let exact = NativePattern::anchored(&lowered.exact)?;
        let prefix = lowered
            .prefixes
            .iter()
            .map(NativePattern::anchored)
            .collect::<Result<Vec<_>, _>>()?;
        let prefix_with_trailing = lowered
            .prefixes
            .iter()
            .map(NativePattern::with_trailing)
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            exact = %exact.source,
            prefix_patterns = prefix.len(),
            groups = lowered.group_names.len(),
            "compiled grammar"
        );

        Ok(Self {
            root,
            exact,
            prefix,
            prefix_with_trailing,
            group_names: lowered.group_names,
            escape_funcs,
            unescape_funcs,
        })
    }

    /// Match the whole of `input`.
    ///
    /// Returns `None` iff `input` is not in the language of the grammar.
    #[must_use]
    pub fn match_exact(&self, input: &str) -> Option<Match<'_>> {
        let mut captures = Vec::new();
        self.exact.run(input, &mut captures)?;
        trace!(input, captures = captures.len(), "exact match");
        Some(Match::new(self, input, captures, None))
    }

    /// Match `input` as the beginning of a sentence of the language.
    ///
    /// Never fails. Input that cannot be extended into a sentence keeps its
    /// unmatched suffix as [`Match::trailing_input`].
    #[must_use]
    pub fn match_prefix(&self, input: &str) -> Match<'_> {
        let mut captures = Vec::new();

        let matched = self
            .prefix
            .iter()
            .filter(|pattern| pattern.run(input, &mut captures).is_some())
            .count();
        if matched > 0 {
            trace!(input, patterns = matched, "prefix match");
            return Match::new(self, input, captures, None);
        }

        // The smallest trailing text means the largest matched prefix.
        let mut trailing: Option<Range<usize>> = None;
        for pattern in &self.prefix_with_trailing {
            if let Some(Some(span)) = pattern.run(input, &mut captures) {
                trailing = Some(match trailing {
                    Some(seen) => seen.start.max(span.start)..seen.end.max(span.end),
                    None => span,
                });
            }
        }
        let trailing = trailing.unwrap_or(0..input.len());
        trace!(input, trailing_start = trailing.start, "prefix match with trailing input");
        Match::new(self, input, captures, Some(trailing))
    }

    /// Apply the escape function registered for `name`, if any.
    #[must_use]
    pub fn escape(&self, name: &str, value: &str) -> String {
        self.escape_funcs
            .get(name)
            .map_or_else(|| value.to_owned(), |f| f(value))
    }

    /// Apply the unescape function registered for `name`, if any.
    #[must_use]
    pub fn unescape(&self, name: &str, value: &str) -> String {
        self.unescape_funcs
            .get(name)
            .map_or_else(|| value.to_owned(), |f| f(value))
    }

    /// The grammar tree this grammar was compiled from.
    #[must_use]
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// The anchored native source used by [`match_exact`](Self::match_exact).
    #[must_use]
    pub fn exact_pattern(&self) -> &str {
        &self.exact.source
    }

    /// The anchored native sources used by [`match_prefix`](Self::match_prefix).
    pub fn prefix_patterns(&self) -> impl Iterator<Item = &str> {
        self.prefix.iter().map(|pattern| pattern.source.as_str())
    }

    /// The variable name behind a synthetic group id.
    #[must_use]
    pub fn group_name(&self, group: usize) -> Option<&str> {
        self.group_names.get(group).map(String::as_str)
    }

    /// Distinct variable names, in order of first appearance.
    #[must_use]
    pub fn variable_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for name in &self.group_names {
            if !names.contains(&name.as_str()) {
                names.push(name);
            }
        }
        names
    }
}

impl fmt::Debug for CompiledGrammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut escapes: Vec<_> = self.escape_funcs.keys().collect();
        escapes.sort();
        let mut unescapes: Vec<_> = self.unescape_funcs.keys().collect();
        unescapes.sort();
        f.debug_struct("CompiledGrammar")
            .field("root", &self.root.to_string())
            .field("exact", &self.exact.source)
            .field("prefix_patterns", &self.prefix.len())
            .field("groups", &self.group_names)
            .field("escape_funcs", &escapes)
            .field("unescape_funcs", &unescapes)
            .finish()
    }
}
