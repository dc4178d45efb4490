//! Ordered candidate lists for visual assets.

use serde::{Deserialize, Serialize};

/// Inline placeholder graphic used as the terminal fallback.
///
/// It needs no network or filesystem access, so a candidate list ending with
/// it always has a renderable final state.
pub const PLACEHOLDER_SVG: &str = "data:image/svg+xml;utf8,<svg xmlns='http://www.w3.org/2000/svg' width='640' height='360' viewBox='0 0 640 360'><rect width='640' height='360' fill='%23e2e8f0'/><path d='M250 230l50-60 40 45 30-30 60 45z' fill='%2394a3b8'/><circle cx='390' cy='140' r='18' fill='%2394a3b8'/></svg>";

/// An ordered list of source identifiers for one visual asset.
///
/// Earlier entries are preferred; later entries are fallbacks, normally
/// degrading towards a generic placeholder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateList(Vec<String>);

impl CandidateList {
    /// Create a candidate list from anything yielding sources.
    pub fn new<I, S>(sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(sources.into_iter().map(Into::into).collect())
    }

    /// Number of candidates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list has no candidates at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Candidate at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    /// The last (least preferred) candidate.
    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Iterate over the candidates in preference order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Whether the list ends with an inline `data:` source.
    #[must_use]
    pub fn has_inline_terminal(&self) -> bool {
        self.last().is_some_and(is_inline)
    }

    /// Append `fallback` unless the list already ends with it.
    #[must_use]
    pub fn with_terminal_fallback(mut self, fallback: impl Into<String>) -> Self {
        let fallback = fallback.into();
        if self.last() != Some(fallback.as_str()) {
            self.0.push(fallback);
        }
        self
    }
}

impl From<Vec<String>> for CandidateList {
    fn from(sources: Vec<String>) -> Self {
        Self(sources)
    }
}

impl<S: Into<String>> FromIterator<S> for CandidateList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Whether a source is an inline `data:` URI.
#[must_use]
pub fn is_inline(source: &str) -> bool {
    source
        .get(..5)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("data:"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_preserves_order() {
        let list = CandidateList::new(["a.png", "b.png", "c.svg"]);
        assert_eq!(list.len(), 3);
        assert_eq!(list.get(0), Some("a.png"));
        assert_eq!(list.last(), Some("c.svg"));
        assert_eq!(list.iter().collect::<Vec<_>>(), vec!["a.png", "b.png", "c.svg"]);
    }

    #[test]
    fn test_empty_list() {
        let list = CandidateList::default();
        assert!(list.is_empty());
        assert_eq!(list.get(0), None);
        assert!(!list.has_inline_terminal());
    }

    #[test]
    fn test_with_terminal_fallback_appends_once() {
        let list = CandidateList::new(["hero.png"])
            .with_terminal_fallback(PLACEHOLDER_SVG)
            .with_terminal_fallback(PLACEHOLDER_SVG);
        assert_eq!(list.len(), 2);
        assert!(list.has_inline_terminal());
    }

    #[test]
    fn test_with_terminal_fallback_on_empty() {
        let list = CandidateList::default().with_terminal_fallback(PLACEHOLDER_SVG);
        assert_eq!(list.len(), 1);
        assert_eq!(list.get(0), Some(PLACEHOLDER_SVG));
    }

    #[test]
    fn test_is_inline() {
        assert!(is_inline("data:image/png;base64,AAAA"));
        assert!(is_inline("DATA:image/svg+xml,<svg/>"));
        assert!(!is_inline("/img/a.png"));
        assert!(!is_inline("dat"));
    }

    #[test]
    fn test_serde_transparent() {
        let list: CandidateList = serde_json::from_str(r#"["a.png","b.png"]"#).unwrap();
        assert_eq!(list, CandidateList::new(["a.png", "b.png"]));
        assert_eq!(serde_json::to_string(&list).unwrap(), r#"["a.png","b.png"]"#);
    }
}
