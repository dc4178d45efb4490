//! Course, module and lesson records.

use std::collections::HashSet;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::category::CourseCategory;
use crate::error::{Error, Result};
use crate::resolver::CandidateList;

/// Lowercase alphanumeric words separated by single hyphens.
const SLUG_PATTERN: &str = r"^[a-z0-9]+(?:-[a-z0-9]+)*$";

fn slug_regex() -> &'static Regex {
    static SLUG: OnceLock<Regex> = OnceLock::new();
    SLUG.get_or_init(|| Regex::new(SLUG_PATTERN).expect("slug pattern is valid"))
}

/// Check that `slug` is a well-formed slug.
///
/// # Errors
///
/// Returns [`Error::InvalidSlug`] otherwise.
pub fn validate_slug(slug: &str) -> Result<()> {
    if slug_regex().is_match(slug) {
        Ok(())
    } else {
        Err(Error::InvalidSlug {
            slug: slug.to_string(),
        })
    }
}

/// A single lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    /// URL-safe identifier, unique within its course.
    pub slug: String,
    /// Display title.
    pub title: String,
    /// Estimated time to complete.
    pub duration_minutes: u32,
    /// Lesson body as pre-authored HTML.
    pub body_html: String,
    /// BLAKE3 hex digest of `body_html`; filled in when missing.
    #[serde(default)]
    pub content_hash: String,
    /// Last content change.
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Lesson {
    /// Create a lesson, hashing its body and stamping it with the current time.
    #[must_use]
    pub fn new(
        slug: impl Into<String>,
        title: impl Into<String>,
        duration_minutes: u32,
        body_html: impl Into<String>,
    ) -> Self {
        let body_html = body_html.into();
        Self {
            slug: slug.into(),
            title: title.into(),
            duration_minutes,
            content_hash: Self::compute_hash(&body_html),
            body_html,
            updated_at: Utc::now(),
        }
    }

    /// Compute the BLAKE3 hash of a lesson body.
    #[must_use]
    pub fn compute_hash(body_html: &str) -> String {
        blake3::hash(body_html.as_bytes()).to_hex().to_string()
    }

    /// Recompute `content_hash` if it is missing or stale.
    pub fn refresh_hash(&mut self) {
        let hash = Self::compute_hash(&self.body_html);
        if self.content_hash != hash {
            self.content_hash = hash;
        }
    }
}

/// A group of lessons within a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseModule {
    /// Identifier, unique within its course.
    pub slug: String,
    /// Display title.
    pub title: String,
    /// Lessons in teaching order.
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

impl CourseModule {
    /// Total lesson time in minutes.
    #[must_use]
    pub fn duration_minutes(&self) -> u32 {
        self.lessons.iter().map(|l| l.duration_minutes).sum()
    }
}

/// A course in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Catalog-wide unique identifier.
    pub slug: String,
    /// Display title.
    pub title: String,
    /// Explicit category; inferred from the slug when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CourseCategory>,
    /// One-paragraph description.
    #[serde(default)]
    pub summary: String,
    /// Candidate sources for the hero image, most preferred first.
    #[serde(default)]
    pub hero: CandidateList,
    /// Modules in teaching order.
    #[serde(default)]
    pub modules: Vec<CourseModule>,
}

impl Course {
    /// The course's category, inferring one from the slug if unset.
    #[must_use]
    pub fn category(&self) -> CourseCategory {
        self.category
            .unwrap_or_else(|| CourseCategory::infer(&self.slug))
    }

    /// All lessons in teaching order.
    pub fn lessons(&self) -> impl Iterator<Item = &Lesson> {
        self.modules.iter().flat_map(|m| m.lessons.iter())
    }

    /// Find a lesson by slug.
    #[must_use]
    pub fn lesson(&self, slug: &str) -> Option<&Lesson> {
        self.lessons().find(|l| l.slug == slug)
    }

    /// Total lesson time in minutes.
    #[must_use]
    pub fn duration_minutes(&self) -> u32 {
        self.modules.iter().map(CourseModule::duration_minutes).sum()
    }

    /// Listing entry for this course.
    #[must_use]
    pub fn summary(&self) -> CourseSummary {
        CourseSummary {
            slug: self.slug.clone(),
            title: self.title.clone(),
            category: self.category(),
            duration_minutes: self.duration_minutes(),
            module_count: self.modules.len(),
            lesson_count: self.lessons().count(),
        }
    }

    /// Check slugs are well-formed and unique, and fill in missing hashes.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid or duplicated slug.
    pub fn normalize(&mut self) -> Result<()> {
        validate_slug(&self.slug)?;

        let mut module_slugs = HashSet::new();
        let mut lesson_slugs = HashSet::new();
        for module in &mut self.modules {
            validate_slug(&module.slug)?;
            if !module_slugs.insert(module.slug.clone()) {
                return Err(Error::DuplicateSlug {
                    kind: "module",
                    slug: module.slug.clone(),
                });
            }
            for lesson in &mut module.lessons {
                validate_slug(&lesson.slug)?;
                // Lesson URLs are /course/lesson, so slugs are unique per course
                if !lesson_slugs.insert(lesson.slug.clone()) {
                    return Err(Error::DuplicateSlug {
                        kind: "lesson",
                        slug: lesson.slug.clone(),
                    });
                }
                lesson.refresh_hash();
            }
        }
        Ok(())
    }
}

/// Listing entry for a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseSummary {
    /// Course slug.
    pub slug: String,
    /// Display title.
    pub title: String,
    /// Effective category.
    pub category: CourseCategory,
    /// Total lesson time.
    pub duration_minutes: u32,
    /// Number of modules.
    pub module_count: usize,
    /// Number of lessons.
    pub lesson_count: usize,
}

/// A lesson matched by a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonHit {
    /// Course containing the lesson.
    pub course_slug: String,
    /// Module containing the lesson.
    pub module_slug: String,
    /// Lesson slug.
    pub lesson_slug: String,
    /// Lesson title.
    pub title: String,
}

/// Format minutes as `1h 30m` / `45m`.
#[must_use]
pub fn format_duration(minutes: u32) -> String {
    match (minutes / 60, minutes % 60) {
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h {m}m"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_course() -> Course {
        Course {
            slug: "git-essentials".to_string(),
            title: "Git Essentials".to_string(),
            category: None,
            summary: "Branches and merges.".to_string(),
            hero: CandidateList::new(["/img/git.png"]),
            modules: vec![
                CourseModule {
                    slug: "basics".to_string(),
                    title: "Basics".to_string(),
                    lessons: vec![
                        Lesson::new("init", "git init", 10, "<p>init</p>"),
                        Lesson::new("commit", "Committing", 20, "<p>commit</p>"),
                    ],
                },
                CourseModule {
                    slug: "branching".to_string(),
                    title: "Branching".to_string(),
                    lessons: vec![Lesson::new("merge", "Merging", 45, "<p>merge</p>")],
                },
            ],
        }
    }

    #[test]
    fn test_validate_slug() {
        assert!(validate_slug("linux-101").is_ok());
        assert!(validate_slug("a").is_ok());
        assert!(validate_slug("").is_err());
        assert!(validate_slug("Linux").is_err());
        assert!(validate_slug("double--hyphen").is_err());
        assert!(validate_slug("-leading").is_err());
        assert!(validate_slug("with space").is_err());
    }

    #[test]
    fn test_lesson_new_hashes_body() {
        let lesson = Lesson::new("intro", "Intro", 5, "<p>hi</p>");
        assert_eq!(lesson.content_hash, Lesson::compute_hash("<p>hi</p>"));
        assert_eq!(lesson.content_hash.len(), 64);
    }

    #[test]
    fn test_refresh_hash_after_edit() {
        let mut lesson = Lesson::new("intro", "Intro", 5, "<p>hi</p>");
        lesson.body_html = "<p>changed</p>".to_string();
        lesson.refresh_hash();
        assert_eq!(lesson.content_hash, Lesson::compute_hash("<p>changed</p>"));
    }

    #[test]
    fn test_course_category_inferred() {
        let mut course = sample_course();
        assert_eq!(course.category(), CourseCategory::Git);
        course.category = Some(CourseCategory::General);
        assert_eq!(course.category(), CourseCategory::General);
    }

    #[test]
    fn test_course_summary() {
        let summary = sample_course().summary();
        assert_eq!(summary.duration_minutes, 75);
        assert_eq!(summary.module_count, 2);
        assert_eq!(summary.lesson_count, 3);
        assert_eq!(summary.category, CourseCategory::Git);
    }

    #[test]
    fn test_course_lesson_lookup() {
        let course = sample_course();
        assert_eq!(course.lesson("merge").map(|l| l.duration_minutes), Some(45));
        assert!(course.lesson("rebase").is_none());
    }

    #[test]
    fn test_normalize_rejects_duplicate_lessons() {
        let mut course = sample_course();
        course.modules[1]
            .lessons
            .push(Lesson::new("init", "Again", 1, ""));
        let err = course.normalize().unwrap_err();
        assert!(matches!(err, Error::DuplicateSlug { kind: "lesson", .. }));
    }

    #[test]
    fn test_normalize_rejects_bad_module_slug() {
        let mut course = sample_course();
        course.modules[0].slug = "Bad Slug".to_string();
        assert!(matches!(
            course.normalize(),
            Err(Error::InvalidSlug { .. })
        ));
    }

    #[test]
    fn test_normalize_fills_missing_hash() {
        let json = r#"{
            "slug": "linux-shell",
            "title": "Shell",
            "modules": [{"slug": "m", "title": "M", "lessons": [
                {"slug": "ls", "title": "ls", "duration_minutes": 5, "body_html": "<p>ls</p>"}
            ]}]
        }"#;
        let mut course: Course = serde_json::from_str(json).unwrap();
        assert!(course.modules[0].lessons[0].content_hash.is_empty());
        course.normalize().unwrap();
        assert_eq!(
            course.modules[0].lessons[0].content_hash,
            Lesson::compute_hash("<p>ls</p>")
        );
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0m");
        assert_eq!(format_duration(45), "45m");
        assert_eq!(format_duration(60), "1h");
        assert_eq!(format_duration(95), "1h 35m");
    }
}
