//! Course introduction layouts.
//!
//! Each [`CourseCategory`] maps to a [`LayoutStrategy`] in a
//! [`LayoutRegistry`]. A category without a registered layout is composed by
//! the [`CourseCategory::General`] layout.

mod page;
mod strategies;

use std::collections::HashMap;

use tracing::debug;

pub use page::{IntroPage, OutlineLesson, OutlineModule, Section};
pub use strategies::{CommandReferenceLayout, RoadmapLayout, StandardLayout, WorkflowLayout};

use crate::content::{Course, CourseCategory};
use crate::resolver::{CandidateList, ImageResolver, PLACEHOLDER_SVG};

/// How hero images are prepared for a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPolicy {
    /// Inline source appended as the terminal fallback.
    pub placeholder: String,
    /// Append `placeholder` to hero lists that do not already end with it.
    pub append_placeholder: bool,
    /// Class attribute of the hero image.
    pub hero_class: String,
}

impl Default for AssetPolicy {
    fn default() -> Self {
        Self {
            placeholder: PLACEHOLDER_SVG.to_string(),
            append_placeholder: true,
            hero_class: "course-hero".to_string(),
        }
    }
}

impl AssetPolicy {
    /// The hero candidates of a course under this policy.
    #[must_use]
    pub fn hero_candidates(&self, course: &Course) -> CandidateList {
        if self.append_placeholder {
            course
                .hero
                .clone()
                .with_terminal_fallback(self.placeholder.clone())
        } else {
            course.hero.clone()
        }
    }

    /// A fresh resolver for a course's hero image.
    #[must_use]
    pub fn hero(&self, course: &Course) -> ImageResolver {
        ImageResolver::new(self.hero_candidates(course), course.title.clone())
            .with_class(self.hero_class.clone())
    }
}

/// Composes the introduction page of a course.
pub trait LayoutStrategy: Send + Sync {
    /// Short name, for logs.
    fn name(&self) -> &'static str;

    /// Build the page for `course`.
    fn compose(&self, course: &Course, assets: &AssetPolicy) -> IntroPage;
}

/// Category to layout mapping.
#[derive(Default)]
pub struct LayoutRegistry {
    layouts: HashMap<CourseCategory, Box<dyn LayoutStrategy>>,
}

impl std::fmt::Debug for LayoutRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut entries: Vec<_> = self
            .layouts
            .iter()
            .map(|(category, layout)| (category.as_str(), layout.name()))
            .collect();
        entries.sort_unstable();
        f.debug_struct("LayoutRegistry")
            .field("layouts", &entries)
            .finish()
    }
}

impl LayoutRegistry {
    /// An empty registry. Every category uses [`StandardLayout`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in layout for every category.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(CourseCategory::DevOps, RoadmapLayout);
        registry.register(CourseCategory::Linux, CommandReferenceLayout);
        registry.register(CourseCategory::Git, WorkflowLayout);
        registry.register(CourseCategory::General, StandardLayout);
        registry
    }

    /// Set the layout for a category, returning the one it replaces.
    pub fn register(
        &mut self,
        category: CourseCategory,
        layout: impl LayoutStrategy + 'static,
    ) -> Option<Box<dyn LayoutStrategy>> {
        self.layouts.insert(category, Box::new(layout))
    }

    /// Whether a category has its own layout.
    #[must_use]
    pub fn contains(&self, category: CourseCategory) -> bool {
        self.layouts.contains_key(&category)
    }

    /// The layout used for a category.
    #[must_use]
    pub fn layout_for(&self, category: CourseCategory) -> &dyn LayoutStrategy {
        self.layouts
            .get(&category)
            .or_else(|| self.layouts.get(&CourseCategory::General))
            .map_or(&StandardLayout as &dyn LayoutStrategy, |layout| layout.as_ref())
    }

    /// Compose the introduction page of a course.
    #[must_use]
    pub fn render_intro(&self, course: &Course, assets: &AssetPolicy) -> IntroPage {
        let category = course.category();
        let layout = self.layout_for(category);
        debug!(course = %course.slug, %category, layout = layout.name(), "composing intro page");
        let mut page = layout.compose(course, assets);
        page.category = category;
        page
    }
}
