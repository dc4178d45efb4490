//! Resilient image resolution.
//!
//! A visual asset is described by an ordered [`CandidateList`]. An
//! [`ImageResolver`] selects the first candidate and advances one position
//! each time the host reports that the current candidate failed to load,
//! until a candidate loads or the list runs out. Individual failures are
//! absorbed; running out leaves the last candidate selected, so lists should
//! end with an inline placeholder such as [`PLACEHOLDER_SVG`].
//!
//! # Example
//!
//! ```
//! use coursedeck::resolver::{CandidateList, ImageResolver, ResolverState, PLACEHOLDER_SVG};
//!
//! let candidates = CandidateList::new(["/img/linux.webp", "/img/linux.png"])
//!     .with_terminal_fallback(PLACEHOLDER_SVG);
//! let mut hero = ImageResolver::new(candidates, "Linux fundamentals").with_class("hero");
//!
//! hero.on_error(); // linux.webp failed
//! hero.on_error(); // linux.png failed
//! hero.on_load(); // placeholder rendered
//!
//! assert_eq!(hero.state(), ResolverState::Resolved(2));
//! assert_eq!(hero.current_source(), PLACEHOLDER_SVG);
//! ```

mod candidates;
mod driver;
mod image;
mod loader;

pub use candidates::{is_inline, CandidateList, PLACEHOLDER_SVG};
pub use driver::{resolve, Attempt, AttemptOutcome, Resolution};
pub use image::{ExhaustionReport, ImageElement, ImageResolver, ResolverState, Transition};
pub use loader::{
    AssetLoader, DataUriLoader, FileLoader, ImageFormat, LoadError, LoadedAsset, RoutingLoader,
};
