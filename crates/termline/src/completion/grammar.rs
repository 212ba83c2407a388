//! Completion driven by a compiled grammar.

use std::collections::{HashMap, HashSet};
use std::future;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use termline_grammar::CompiledGrammar;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use super::{CompleteEvent, Completer, Completion, CompletionError, CompletionStream, guarded};
use crate::document::Document;

/// Delegates completion to per-variable completers.
///
/// The text before the cursor is prefix-matched against the grammar. Every
/// variable ending at the cursor that has a completer registered is completed
/// on its own, and each result is rewritten to replace the whole field.
pub struct GrammarCompleter {
    grammar: Arc<CompiledGrammar>,
    completers: HashMap<String, Arc<dyn Completer>>,
}

/// A variable under the cursor and the completer responsible for it.
struct Field<'a> {
    name: String,
    completer: &'a dyn Completer,
    document: Document,
    start_position: isize,
}

impl GrammarCompleter {
    /// Complete `grammar` with the given per-variable completers.
    #[must_use]
    pub fn new(
        grammar: Arc<CompiledGrammar>,
        completers: HashMap<String, Arc<dyn Completer>>,
    ) -> Self {
        Self {
            grammar,
            completers,
        }
    }

    /// Register the completer for the variable `name`.
    #[must_use]
    pub fn with_completer(mut self, name: impl Into<String>, completer: Arc<dyn Completer>) -> Self {
        self.completers.insert(name.into(), completer);
        self
    }

    /// The grammar being completed.
    #[must_use]
    pub fn grammar(&self) -> &CompiledGrammar {
        &self.grammar
    }

    fn fields(&self, document: &Document) -> Vec<Field<'_>> {
        let before = document.text_before_cursor();
        let matched = self.grammar.match_prefix(before);
        matched
            .end_nodes()
            .into_iter()
            .filter_map(|var| {
                let completer = self.completers.get(&var.name)?;
                trace!(variable = %var.name, start = var.start, "delegating completion");
                let replaced = before.len().saturating_sub(var.start);
                Some(Field {
                    start_position: -isize::try_from(replaced).unwrap_or(isize::MAX),
                    completer: completer.as_ref(),
                    document: Document::at_end(var.value),
                    name: var.name,
                })
            })
            .collect()
    }

    /// Turn a completion of the field text into one of the whole input.
    fn rewrap(&self, field: &Field<'_>, completion: Completion) -> Completion {
        let typed = field.document.text();
        let kept = typed
            .len()
            .checked_add_signed(completion.start_position)
            .and_then(|end| typed.get(..end))
            .unwrap_or_default();
        let text = self
            .grammar
            .escape(&field.name, &format!("{kept}{}", completion.text));
        Completion {
            display: Some(completion.display.unwrap_or(completion.text)),
            text,
            start_position: field.start_position,
            display_meta: completion.display_meta,
        }
    }
}

impl Completer for GrammarCompleter {
    fn get_completions(
        &self,
        document: &Document,
        event: &CompleteEvent,
    ) -> Result<Vec<Completion>, CompletionError> {
        let mut out: Vec<Completion> = Vec::new();
        let mut seen = HashSet::new();
        for field in self.fields(document) {
            for completion in field.completer.get_completions(&field.document, event)? {
                let completion = self.rewrap(&field, completion);
                if seen.insert(dedup_key(&completion)) {
                    out.push(completion);
                }
            }
        }
        Ok(out)
    }

    fn get_completions_async(
        &self,
        document: Document,
        event: CompleteEvent,
        cancel: CancellationToken,
    ) -> CompletionStream<'_> {
        let fields = self.fields(&document);
        let inner_cancel = cancel.clone();
        let completions = stream::iter(fields).flat_map(move |field| {
            let completer = field.completer;
            completer
                .get_completions_async(field.document.clone(), event, inner_cancel.clone())
                .map(move |item| item.map(|completion| self.rewrap(&field, completion)))
        });

        let mut seen = HashSet::new();
        let unique = completions.filter(move |item| {
            let fresh = match item {
                Ok(completion) => seen.insert(dedup_key(completion)),
                Err(_) => true,
            };
            future::ready(fresh)
        });
        guarded(unique, cancel)
    }
}

/// Candidates from different alternatives are the same when they insert the
/// same text at the same place; the first one seen is kept.
fn dedup_key(completion: &Completion) -> (String, isize) {
    (completion.text.clone(), completion.start_position)
}

impl std::fmt::Debug for GrammarCompleter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.completers.keys().collect();
        names.sort();
        f.debug_struct("GrammarCompleter")
            .field("grammar", &self.grammar.exact_pattern())
            .field("completers", &names)
            .finish()
    }
}
