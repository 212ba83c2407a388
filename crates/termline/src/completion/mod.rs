//! Completion contracts and the completers built on them.
//!
//! A [`Completer`] answers synchronously with a list, or asynchronously with a
//! [`CompletionStream`] that observes a [`CancellationToken`] between
//! elements. Cancellation is reported as [`CompletionError::Cancelled`] so a
//! consumer never mistakes a cut-off stream for a complete one.

mod grammar;
mod word;

use futures::stream::{self, BoxStream, Stream, StreamExt};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::BoxError;
use crate::document::Document;

pub use grammar::GrammarCompleter;
pub use word::WordCompleter;

/// Why completion was requested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompleteEvent {
    /// Completion was triggered by typing.
    pub text_inserted: bool,
    /// Completion was requested explicitly, e.g. with the tab key.
    pub completion_requested: bool,
}

impl CompleteEvent {
    /// An explicit completion request.
    #[must_use]
    pub fn requested() -> Self {
        Self {
            text_inserted: false,
            completion_requested: true,
        }
    }
}

/// A suggested replacement for text before the cursor.
///
/// `start_position` is relative to the cursor and never positive: the
/// completion replaces the `-start_position` bytes before the cursor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Completion {
    text: String,
    start_position: isize,
    display: Option<String>,
    display_meta: Option<String>,
}

impl Completion {
    /// A completion inserting `text` in place of the bytes from
    /// `start_position` to the cursor.
    #[must_use]
    pub fn new(text: impl Into<String>, start_position: isize) -> Self {
        Self {
            text: text.into(),
            start_position: start_position.min(0),
            display: None,
            display_meta: None,
        }
    }

    /// Show `display` in the menu instead of the inserted text.
    #[must_use]
    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }

    /// Attach a description shown next to the completion.
    #[must_use]
    pub fn with_display_meta(mut self, meta: impl Into<String>) -> Self {
        self.display_meta = Some(meta.into());
        self
    }

    /// The text to insert.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Start of the replaced text, relative to the cursor.
    #[must_use]
    pub fn start_position(&self) -> isize {
        self.start_position
    }

    /// The explicit display text, if any.
    #[must_use]
    pub fn display(&self) -> Option<&str> {
        self.display.as_deref()
    }

    /// The description shown next to the completion, if any.
    #[must_use]
    pub fn display_meta(&self) -> Option<&str> {
        self.display_meta.as_deref()
    }

    /// The text shown in the menu.
    #[must_use]
    pub fn display_text(&self) -> &str {
        self.display.as_deref().unwrap_or(&self.text)
    }
}

/// Errors surfaced while completing.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// The request was cancelled before every completion was produced.
    #[error("completion was cancelled")]
    Cancelled,

    /// A completer failed; the source error is passed through untouched.
    #[error(transparent)]
    Completer(BoxError),
}

impl CompletionError {
    /// Wrap an error raised by a completer.
    pub fn completer(error: impl Into<BoxError>) -> Self {
        Self::Completer(error.into())
    }

    /// Whether the request was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Completions produced one at a time.
pub type CompletionStream<'a> = BoxStream<'a, Result<Completion, CompletionError>>;

/// Source of completions for a document.
pub trait Completer: Send + Sync {
    /// Every completion for the text before the cursor of `document`.
    ///
    /// # Errors
    /// Returns [`CompletionError::Completer`] when the completer fails.
    fn get_completions(
        &self,
        document: &Document,
        event: &CompleteEvent,
    ) -> Result<Vec<Completion>, CompletionError>;

    /// Stream completions, checking `cancel` before each one.
    ///
    /// The default runs [`get_completions`](Self::get_completions) lazily on
    /// the first poll.
    fn get_completions_async(
        &self,
        document: Document,
        event: CompleteEvent,
        cancel: CancellationToken,
    ) -> CompletionStream<'_> {
        let completions = stream::once(async move { self.get_completions(&document, &event) })
            .flat_map(|result| match result {
                Ok(items) => stream::iter(items.into_iter().map(Ok)).left_stream(),
                Err(err) => stream::iter([Err(err)]).right_stream(),
            });
        guarded(completions, cancel)
    }
}

/// Wrap `inner` so that `cancel` is checked before every element.
///
/// Once cancelled the stream yields [`CompletionError::Cancelled`] and ends.
/// It also ends after the first error from `inner`.
pub fn guarded<'a, S>(inner: S, cancel: CancellationToken) -> CompletionStream<'a>
where
    S: Stream<Item = Result<Completion, CompletionError>> + Send + 'a,
{
    stream::unfold(Some((inner.boxed(), cancel)), |state| async move {
        let (mut inner, cancel) = state?;
        if cancel.is_cancelled() {
            trace!("completion cancelled");
            return Some((Err(CompletionError::Cancelled), None));
        }
        let item = inner.next().await?;
        let next = item.is_ok().then_some((inner, cancel));
        Some((item, next))
    })
    .boxed()
}
