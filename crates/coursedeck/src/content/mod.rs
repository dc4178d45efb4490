//! Read-only access to course content.
//!
//! Rendering code depends only on [`ContentRepository`]. The catalog can come
//! from the built-in tables ([`InMemoryRepository::builtin`]), a JSON catalog
//! file ([`CatalogFile`]) or the `SQLite` store ([`crate::storage::Storage`]).

mod builtin;
mod catalog;
mod category;
mod memory;
mod model;

pub use catalog::CatalogFile;
pub use category::CourseCategory;
pub use memory::InMemoryRepository;
pub use model::{
    format_duration, validate_slug, Course, CourseModule, CourseSummary, Lesson, LessonHit,
};

use crate::error::{Error, Result};

/// Lookup-by-key access to the course catalog.
///
/// Unknown keys are `Ok(None)`; errors are reserved for backend failures.
pub trait ContentRepository {
    /// Summaries of every course, in catalog order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn list_courses(&self) -> Result<Vec<CourseSummary>>;

    /// A full course with its modules and lessons.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn course(&self, slug: &str) -> Result<Option<Course>>;

    /// A single lesson of a course.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn lesson(&self, course: &str, lesson: &str) -> Result<Option<Lesson>> {
        Ok(self
            .course(course)?
            .and_then(|c| c.lesson(lesson).cloned()))
    }

    /// Lessons whose title or body contains `query` (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn search_lessons(&self, query: &str, limit: usize) -> Result<Vec<LessonHit>>;

    /// Like [`ContentRepository::course`], but a missing course is an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CourseNotFound`] if there is no such course.
    fn require_course(&self, slug: &str) -> Result<Course> {
        self.course(slug)?
            .ok_or_else(|| Error::course_not_found(slug))
    }

    /// Like [`ContentRepository::lesson`], but a missing lesson is an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CourseNotFound`] or [`Error::LessonNotFound`].
    fn require_lesson(&self, course: &str, lesson: &str) -> Result<Lesson> {
        let found = self.require_course(course)?.lesson(lesson).cloned();
        found.ok_or_else(|| Error::lesson_not_found(course, lesson))
    }
}

impl<T: ContentRepository + ?Sized> ContentRepository for Box<T> {
    fn list_courses(&self) -> Result<Vec<CourseSummary>> {
        (**self).list_courses()
    }

    fn course(&self, slug: &str) -> Result<Option<Course>> {
        (**self).course(slug)
    }

    fn lesson(&self, course: &str, lesson: &str) -> Result<Option<Lesson>> {
        (**self).lesson(course, lesson)
    }

    fn search_lessons(&self, query: &str, limit: usize) -> Result<Vec<LessonHit>> {
        (**self).search_lessons(query, limit)
    }
}
