//! Immutable grammar tree produced by the parser or built by hand.
//!
//! Trees are built once and never mutated. The [`concat`] and [`alternate`]
//! combinators flatten into existing sequence and alternation nodes so
//! programmatic construction does not produce redundant nesting.

use std::fmt;

/// Characters with a meaning in the native pattern syntax.
pub(crate) const SYNTAX_CHARS: &str = r"^$\.*+?()[]{}|/";

/// A node of a grammar tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Alternation: matches any one of the children.
    Any {
        /// The alternatives, in priority order.
        children: Vec<Node>,
    },
    /// Concatenation of the children. An empty sequence matches the empty
    /// string.
    Sequence {
        /// The concatenated parts.
        children: Vec<Node>,
    },
    /// An opaque regex fragment, usually a single atom such as `a`, `\s` or
    /// `[0-9]`.
    Regex {
        /// The fragment source.
        pattern: String,
    },
    /// A zero-width assertion. Only negative lookahead can be compiled.
    Lookahead {
        /// The asserted sub-expression.
        child: Box<Node>,
        /// Whether the assertion is negated.
        negative: bool,
    },
    /// A named capture. Names may repeat and variables may nest.
    Variable {
        /// The captured sub-expression.
        child: Box<Node>,
        /// The variable name.
        name: String,
    },
    /// Repetition of the child between `min` and `max` times.
    Repeat {
        /// The repeated sub-expression.
        child: Box<Node>,
        /// Minimum number of repetitions.
        min: usize,
        /// Maximum number of repetitions, unbounded when `None`.
        max: Option<usize>,
        /// Whether the repetition prefers the longest match.
        greedy: bool,
    },
}

impl Node {
    /// The empty sequence, matching only the empty string.
    #[must_use]
    pub fn empty() -> Self {
        Self::Sequence {
            children: Vec::new(),
        }
    }

    /// An opaque regex leaf.
    #[must_use]
    pub fn regex(pattern: impl Into<String>) -> Self {
        Self::Regex {
            pattern: pattern.into(),
        }
    }

    /// A node matching `text` verbatim.
    ///
    /// Each character becomes its own leaf so prefix matching can stop in the
    /// middle of the text.
    ///
    /// # Examples
    /// ```
    /// use termline_grammar::{CompiledGrammar, Node};
    /// let grammar = CompiledGrammar::from_node(Node::literal("a.b"), Default::default(), Default::default())?;
    /// assert!(grammar.match_exact("a.b").is_some());
    /// assert!(grammar.match_exact("axb").is_none());
    /// # Ok::<(), termline_grammar::GrammarError>(())
    /// ```
    #[must_use]
    pub fn literal(text: &str) -> Self {
        let mut children: Vec<Self> = text
            .chars()
            .map(|c| {
                if SYNTAX_CHARS.contains(c) {
                    Self::regex(format!("\\{c}"))
                } else {
                    Self::regex(c.to_string())
                }
            })
            .collect();
        if children.len() == 1 {
            children.pop().unwrap_or_else(Self::empty)
        } else {
            Self::Sequence { children }
        }
    }

    /// A named capture around `child`.
    #[must_use]
    pub fn variable(name: impl Into<String>, child: Self) -> Self {
        Self::Variable {
            child: Box::new(child),
            name: name.into(),
        }
    }

    /// A repetition of `child`.
    #[must_use]
    pub fn repeat(child: Self, min: usize, max: Option<usize>, greedy: bool) -> Self {
        Self::Repeat {
            child: Box::new(child),
            min,
            max,
            greedy,
        }
    }

    /// Greedy `?`.
    #[must_use]
    pub fn optional(child: Self) -> Self {
        Self::repeat(child, 0, Some(1), true)
    }

    /// Greedy `*`.
    #[must_use]
    pub fn zero_or_more(child: Self) -> Self {
        Self::repeat(child, 0, None, true)
    }

    /// Greedy `+`.
    #[must_use]
    pub fn one_or_more(child: Self) -> Self {
        Self::repeat(child, 1, None, true)
    }

    /// `(?!child)`.
    #[must_use]
    pub fn negative_lookahead(child: Self) -> Self {
        Self::Lookahead {
            child: Box::new(child),
            negative: true,
        }
    }

    /// Whether a [`Node::Variable`] occurs anywhere in this tree.
    #[must_use]
    pub fn contains_variable(&self) -> bool {
        match self {
            Self::Variable { .. } => true,
            Self::Any { children } | Self::Sequence { children } => {
                children.iter().any(Self::contains_variable)
            }
            Self::Lookahead { child, .. } | Self::Repeat { child, .. } => {
                child.contains_variable()
            }
            Self::Regex { .. } => false,
        }
    }
}

/// Concatenate two nodes, flattening sequences on either side.
///
/// # Examples
/// ```
/// use termline_grammar::{Node, concat};
/// let node = concat(concat(Node::regex("a"), Node::regex("b")), Node::regex("c"));
/// let Node::Sequence { children } = node else { panic!("expected a sequence") };
/// assert_eq!(children.len(), 3);
/// ```
#[must_use]
pub fn concat(lhs: Node, rhs: Node) -> Node {
    let mut children = match lhs {
        Node::Sequence { children } => children,
        other => vec![other],
    };
    match rhs {
        Node::Sequence { children: more } => children.extend(more),
        other => children.push(other),
    }
    Node::Sequence { children }
}

/// Alternate two nodes, flattening alternations on either side.
#[must_use]
pub fn alternate(lhs: Node, rhs: Node) -> Node {
    let mut children = match lhs {
        Node::Any { children } => children,
        other => vec![other],
    };
    match rhs {
        Node::Any { children: more } => children.extend(more),
        other => children.push(other),
    }
    Node::Any { children }
}

/// Renders the tree back to regex-style source.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any { children } => {
                f.write_str("(?:")?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        f.write_str("|")?;
                    }
                    write!(f, "{child}")?;
                }
                f.write_str(")")
            }
            Self::Sequence { children } => children.iter().try_for_each(|c| write!(f, "{c}")),
            Self::Regex { pattern } => f.write_str(pattern),
            Self::Lookahead { child, negative } => {
                let opener = if *negative { "(?!" } else { "(?=" };
                write!(f, "{opener}{child})")
            }
            Self::Variable { child, name } => write!(f, "(?P<{name}>{child})"),
            Self::Repeat {
                child,
                min,
                max,
                greedy,
            } => {
                write!(f, "(?:{child}){}", quantifier(*min, *max))?;
                if *greedy { Ok(()) } else { f.write_str("?") }
            }
        }
    }
}

/// Native quantifier suffix for a repetition range.
pub(crate) fn quantifier(min: usize, max: Option<usize>) -> String {
    match (min, max) {
        (0, None) => "*".to_owned(),
        (1, None) => "+".to_owned(),
        (0, Some(1)) => "?".to_owned(),
        (min, None) => format!("{{{min},}}"),
        (min, Some(max)) if min == max => format!("{{{min}}}"),
        (min, Some(max)) => format!("{{{min},{max}}}"),
    }
}
