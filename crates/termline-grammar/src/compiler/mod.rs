//! Lowering of grammar trees into native pattern sources.
//!
//! Every emitted capture group receives a fresh synthetic id. Ids index the
//! group-name arena, so a variable name used in several alternation branches,
//! or emitted several times by the prefix transform, maps to several ids.

mod dialect;

use crate::errors::{GrammarError, unsupported};
use crate::node::{Node, quantifier};

pub(crate) use dialect::native_fragment;

/// Index into the group-name arena.
pub(crate) type GroupId = usize;

/// A piece of native pattern source plus the ids of the capture groups it
/// opens, in the order their parentheses appear.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Fragment {
    pub(crate) source: String,
    pub(crate) groups: Vec<GroupId>,
}

impl Fragment {
    fn raw(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            groups: Vec::new(),
        }
    }

    fn push_str(&mut self, source: &str) {
        self.source.push_str(source);
    }

    fn push(&mut self, other: &Self) {
        self.source.push_str(&other.source);
        self.groups.extend_from_slice(&other.groups);
    }

    fn concat<'f>(parts: impl IntoIterator<Item = &'f Self>) -> Self {
        let mut out = Self::default();
        for part in parts {
            out.push(part);
        }
        out
    }

    /// `(?:a|b|...)`
    fn alternation<'f>(parts: impl IntoIterator<Item = &'f Self>) -> Self {
        let mut out = Self::raw("(?:");
        for (i, part) in parts.into_iter().enumerate() {
            if i > 0 {
                out.push_str("|");
            }
            out.push(part);
        }
        out.push_str(")");
        out
    }

    /// Wrap in a capture group with id `group`.
    fn capture(group: GroupId, inner: &Self) -> Self {
        let mut out = Self {
            source: String::from("("),
            groups: vec![group],
        };
        out.push(inner);
        out.push_str(")");
        out
    }
}

/// Native sources produced for one grammar.
#[derive(Debug)]
pub(crate) struct Lowered {
    /// The whole-language body, without anchors.
    pub(crate) exact: Fragment,
    /// Bodies accepting every prefix of the language, without anchors.
    pub(crate) prefixes: Vec<Fragment>,
    /// Synthetic group id to variable name.
    pub(crate) group_names: Vec<String>,
}

/// Lower `root` into its exact and prefix pattern bodies.
///
/// # Errors
/// Returns [`GrammarError::Unsupported`] when the tree holds a positive
/// lookahead, which can only come from hand-built trees.
pub(crate) fn lower(root: &Node) -> Result<Lowered, GrammarError> {
    let mut lowering = Lowering::default();
    let exact = lowering.exact(root)?;
    let prefixes = lowering.prefix(root)?;
    Ok(Lowered {
        exact,
        prefixes,
        group_names: lowering.group_names,
    })
}

#[derive(Default)]
struct Lowering {
    group_names: Vec<String>,
}

impl Lowering {
    fn alloc(&mut self, name: &str) -> GroupId {
        self.group_names.push(name.to_owned());
        self.group_names.len() - 1
    }

    /// Structural translation matching exactly the language of `node`.
    fn exact(&mut self, node: &Node) -> Result<Fragment, GrammarError> {
        match node {
            Node::Any { children } => {
                let parts = children
                    .iter()
                    .map(|child| self.exact(child))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Fragment::alternation(&parts))
            }
            Node::Sequence { children } => {
                let parts = children
                    .iter()
                    .map(|child| self.exact(child))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Fragment::concat(&parts))
            }
            Node::Regex { pattern } => Ok(Fragment::raw(native_fragment(pattern)?)),
            Node::Lookahead { child, negative } => {
                if !negative {
                    return Err(unsupported("(?=", 0));
                }
                let mut out = Fragment::raw("(?!");
                out.push(&self.exact(child)?);
                out.push_str(")");
                Ok(out)
            }
            Node::Variable { child, name } => {
                let group = self.alloc(name);
                Ok(Fragment::capture(group, &self.exact(child)?))
            }
            Node::Repeat {
                child,
                min,
                max,
                greedy,
            } => {
                let mut out = Fragment::raw("(?:");
                out.push(&self.exact(child)?);
                out.push_str(")");
                out.push_str(&quantifier(*min, *max));
                if !greedy {
                    out.push_str("?");
                }
                Ok(out)
            }
        }
    }

    /// Bodies that together accept every prefix of the language of `node`.
    ///
    /// The native engine follows a single path through an alternation, so
    /// every way of ending inside a variable gets a body of its own. Parts
    /// without variables are merged into one body.
    fn prefix(&mut self, node: &Node) -> Result<Vec<Fragment>, GrammarError> {
        match node {
            Node::Any { children } => {
                let mut out = Vec::new();
                let mut plain = Vec::new();
                for child in children {
                    let bodies = self.prefix(child)?;
                    if child.contains_variable() {
                        out.extend(bodies);
                    } else {
                        plain.extend(bodies);
                    }
                }
                if !plain.is_empty() {
                    out.push(Fragment::alternation(&plain));
                }
                Ok(out)
            }
            Node::Sequence { children } => self.sequence_prefix(children),
            Node::Regex { pattern } => {
                let mut out = Fragment::raw("(?:");
                out.push_str(&native_fragment(pattern)?);
                out.push_str(")?");
                Ok(vec![out])
            }
            Node::Lookahead { .. } => Ok(vec![self.exact(node)?]),
            Node::Variable { child, name } => {
                let bodies = self.prefix(child)?;
                Ok(bodies
                    .iter()
                    .map(|body| {
                        let group = self.alloc(name);
                        Fragment::capture(group, body)
                    })
                    .collect())
            }
            Node::Repeat {
                child, max, greedy, ..
            } => {
                if *max == Some(1) {
                    return self.prefix(child);
                }
                if *max == Some(0) {
                    return Ok(vec![Fragment::default()]);
                }
                // Complete repetitions followed by one partial repetition.
                let complete = self.exact(child)?;
                let sign = max.map_or_else(|| "*".to_owned(), |m| format!("{{0,{}}}", m - 1));
                let lazy = if *greedy { "" } else { "?" };
                let partials = self.prefix(child)?;
                Ok(partials
                    .iter()
                    .map(|partial| {
                        let mut out = Fragment::raw("(?:");
                        out.push(&complete);
                        out.push_str(")");
                        out.push_str(&sign);
                        out.push_str(lazy);
                        out.push(partial);
                        out
                    })
                    .collect())
            }
        }
    }

    fn sequence_prefix(&mut self, children: &[Node]) -> Result<Vec<Fragment>, GrammarError> {
        if children.is_empty() {
            return Ok(vec![Fragment::default()]);
        }

        let complete = children
            .iter()
            .map(|child| self.exact(child))
            .collect::<Result<Vec<_>, _>>()?;
        let partials = children
            .iter()
            .map(|child| self.prefix(child))
            .collect::<Result<Vec<_>, _>>()?;
        let has_variable: Vec<bool> = children.iter().map(Node::contains_variable).collect();

        let mut out = Vec::new();

        // Text ending inside a variable: the complete children before it,
        // then a partial match of the child holding the variable.
        for (i, bodies) in partials.iter().enumerate() {
            if !has_variable.get(i).copied().unwrap_or_default() {
                continue;
            }
            let head = Fragment::concat(complete.get(..i).unwrap_or_default());
            for body in bodies {
                let mut pattern = head.clone();
                pattern.push(body);
                out.push(pattern);
            }
        }

        // Text ending outside every variable:
        // (?:c1(?:c2(?:c3|(?:p3))|(?:p2))|(?:p1))
        if has_variable.iter().any(|has| !has) {
            let mut merged = Fragment::default();
            for part in &complete {
                merged.push_str("(?:");
                merged.push(part);
            }
            for (bodies, has) in partials.iter().zip(&has_variable).rev() {
                if *has {
                    merged.push_str(")");
                } else {
                    merged.push_str("|(?:");
                    if let [single] = bodies.as_slice() {
                        merged.push(single);
                    } else {
                        merged.push(&Fragment::alternation(bodies));
                    }
                    merged.push_str("))");
                }
            }
            out.push(merged);
        }

        Ok(out)
    }
}
