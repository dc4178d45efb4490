//! The image resolver state machine.
//!
//! An [`ImageResolver`] owns a [`CandidateList`] and a cursor into it. The
//! host reports load outcomes for the currently selected source; failures
//! advance the cursor by one, a success settles the resolver. Nothing is ever
//! retried and the cursor never moves backward.

use std::fmt;

use serde::Serialize;
use tracing::{debug, trace, warn};

use super::candidates::CandidateList;
use crate::html::escape;

/// Where a resolver is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "state", content = "index", rename_all = "snake_case")]
pub enum ResolverState {
    /// Waiting on the outcome of the candidate at this index.
    Attempting(usize),
    /// The candidate at this index loaded. Terminal.
    Resolved(usize),
    /// Every candidate failed (or there were none). Terminal.
    Exhausted,
}

impl ResolverState {
    /// Whether no further transitions can happen.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Attempting(_))
    }
}

impl fmt::Display for ResolverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attempting(i) => write!(f, "attempting({i})"),
            Self::Resolved(i) => write!(f, "resolved({i})"),
            Self::Exhausted => write!(f, "exhausted"),
        }
    }
}

/// What a notification did to the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The cursor moved to the next candidate.
    Advanced {
        /// Index that failed.
        from: usize,
        /// Index now being attempted.
        to: usize,
    },
    /// The last candidate failed.
    Exhausted {
        /// Index of the last candidate, which stays selected.
        at: usize,
    },
    /// The current candidate loaded.
    Resolved {
        /// Index that loaded.
        at: usize,
    },
    /// The notification had no effect (terminal state or stale source).
    Ignored,
}

/// Passed to the exhaustion callback when the last candidate fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExhaustionReport {
    /// Every candidate that was attempted and failed, in order.
    pub failed: Vec<String>,
    /// Alt text of the element, to identify it in telemetry.
    pub alt_text: String,
}

type ExhaustionCallback = Box<dyn FnMut(&ExhaustionReport) + Send>;

/// Resolves one visual asset from a prioritized candidate list.
pub struct ImageResolver {
    candidates: CandidateList,
    alt_text: String,
    class: Option<String>,
    style: Option<String>,
    cursor: usize,
    state: ResolverState,
    on_exhausted: Option<ExhaustionCallback>,
}

impl fmt::Debug for ImageResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageResolver")
            .field("candidates", &self.candidates)
            .field("alt_text", &self.alt_text)
            .field("cursor", &self.cursor)
            .field("state", &self.state)
            .field("has_exhaustion_callback", &self.on_exhausted.is_some())
            .finish_non_exhaustive()
    }
}

impl ImageResolver {
    /// Create a resolver attempting the first candidate.
    ///
    /// An empty list is accepted and starts out [`ResolverState::Exhausted`]
    /// with an empty source.
    pub fn new(candidates: impl Into<CandidateList>, alt_text: impl Into<String>) -> Self {
        let candidates = candidates.into();
        let alt_text = alt_text.into();
        let state = if candidates.is_empty() {
            warn!(alt = %alt_text, "image has no candidate sources");
            ResolverState::Exhausted
        } else {
            ResolverState::Attempting(0)
        };
        Self {
            candidates,
            alt_text,
            class: None,
            style: None,
            cursor: 0,
            state,
            on_exhausted: None,
        }
    }

    /// Set the pass-through `class` attribute.
    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    /// Set the pass-through `style` attribute.
    #[must_use]
    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    /// Register a callback run once if every candidate fails.
    #[must_use]
    pub fn on_exhausted(mut self, callback: impl FnMut(&ExhaustionReport) + Send + 'static) -> Self {
        self.on_exhausted = Some(Box::new(callback));
        self
    }

    /// Replace alt text and presentation hints. Resolution state is untouched.
    pub fn update_presentation(
        &mut self,
        alt_text: impl Into<String>,
        class: Option<String>,
        style: Option<String>,
    ) {
        self.alt_text = alt_text.into();
        self.class = class;
        self.style = style;
    }

    /// The candidate list this resolver was created with.
    #[must_use]
    pub fn candidates(&self) -> &CandidateList {
        &self.candidates
    }

    /// Current cursor position.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> ResolverState {
        self.state
    }

    /// Alt text.
    #[must_use]
    pub fn alt_text(&self) -> &str {
        &self.alt_text
    }

    /// The effective source: `candidates[cursor]`, or `""` for an empty list.
    #[must_use]
    pub fn current_source(&self) -> &str {
        self.candidates.get(self.cursor).unwrap_or("")
    }

    /// Number of candidates handed to the host so far.
    #[must_use]
    pub fn attempted(&self) -> usize {
        if self.candidates.is_empty() {
            0
        } else {
            self.cursor + 1
        }
    }

    /// Handle a load failure of the current candidate.
    pub fn on_error(&mut self) -> Transition {
        let ResolverState::Attempting(index) = self.state else {
            trace!(state = %self.state, "ignoring failure in terminal state");
            return Transition::Ignored;
        };

        let next = index + 1;
        if next < self.candidates.len() {
            debug!(
                failed = self.current_source_for_log(),
                next = next,
                "image candidate failed, advancing"
            );
            self.cursor = next;
            self.state = ResolverState::Attempting(next);
            return Transition::Advanced {
                from: index,
                to: next,
            };
        }

        self.state = ResolverState::Exhausted;
        warn!(
            alt = %self.alt_text,
            candidates = self.candidates.len(),
            "all image candidates failed"
        );
        if let Some(callback) = self.on_exhausted.as_mut() {
            let report = ExhaustionReport {
                failed: self.candidates.iter().map(str::to_string).collect(),
                alt_text: self.alt_text.clone(),
            };
            callback(&report);
        }
        Transition::Exhausted { at: index }
    }

    /// Handle a failure notification for the attempt at `index`.
    ///
    /// Notifications for any index but the one being attempted are stale and
    /// ignored. Keying on the index keeps duplicate sources distinct.
    pub fn on_error_at(&mut self, index: usize) -> Transition {
        if self.is_stale(index) {
            trace!(index = index, state = %self.state, "ignoring stale failure notification");
            return Transition::Ignored;
        }
        self.on_error()
    }

    /// Handle a successful load of the current candidate.
    pub fn on_load(&mut self) -> Transition {
        let ResolverState::Attempting(index) = self.state else {
            return Transition::Ignored;
        };
        debug!(source = self.current_source_for_log(), index = index, "image candidate loaded");
        self.state = ResolverState::Resolved(index);
        Transition::Resolved { at: index }
    }

    /// Handle a load notification for the attempt at `index`.
    pub fn on_load_at(&mut self, index: usize) -> Transition {
        if self.is_stale(index) {
            trace!(index = index, state = %self.state, "ignoring stale load notification");
            return Transition::Ignored;
        }
        self.on_load()
    }

    /// Render the element for the current state. Never changes state.
    #[must_use]
    pub fn element(&self) -> ImageElement<'_> {
        ImageElement {
            src: self.current_source(),
            alt: &self.alt_text,
            class: self.class.as_deref(),
            style: self.style.as_deref(),
        }
    }

    fn is_stale(&self, index: usize) -> bool {
        self.state != ResolverState::Attempting(index)
    }

    // Inline sources can be kilobytes long; keep log lines readable
    fn current_source_for_log(&self) -> &str {
        let source = self.current_source();
        match source.char_indices().nth(64) {
            Some((cut, _)) => &source[..cut],
            None => source,
        }
    }
}

/// A rendered image element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageElement<'a> {
    /// Effective source.
    pub src: &'a str,
    /// Accessibility description.
    pub alt: &'a str,
    /// Pass-through class.
    pub class: Option<&'a str>,
    /// Pass-through inline style.
    pub style: Option<&'a str>,
}

impl fmt::Display for ImageElement<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, r#"<img src="{}" alt="{}""#, escape(self.src), escape(self.alt))?;
        if let Some(class) = self.class {
            write!(f, r#" class="{}""#, escape(class))?;
        }
        if let Some(style) = self.style {
            write!(f, r#" style="{}""#, escape(style))?;
        }
        f.write_str(">")
    }
}
