//! `coursedeck` - Course catalog rendering with resilient image fallback
//!
//! The core is [`resolver::ImageResolver`], a small state machine that picks
//! the first loadable image out of an ordered list of candidates. Around it,
//! [`content`] provides read-only access to courses and lessons, [`storage`]
//! persists imported catalogs in `SQLite`, and [`layout`] composes a course
//! introduction page per course category.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod content;
pub mod error;
pub mod html;
pub mod layout;
pub mod logging;
pub mod resolver;
pub mod storage;

pub use config::Config;
pub use content::{ContentRepository, Course, CourseCategory, InMemoryRepository};
pub use error::{Error, Result};
pub use layout::{IntroPage, LayoutRegistry, LayoutStrategy};
pub use logging::init_logging;
pub use resolver::{CandidateList, ImageResolver, ResolverState};
pub use storage::{ImportReport, Storage, StorageStats};
