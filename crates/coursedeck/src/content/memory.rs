//! In-memory content repository.

use std::collections::HashSet;

use tracing::debug;

use super::model::{Course, CourseSummary, LessonHit};
use super::ContentRepository;
use crate::error::{Error, Result};

/// A catalog held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    courses: Vec<Course>,
}

impl InMemoryRepository {
    /// Build a repository from courses, validating every slug.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid or duplicate slugs.
    pub fn new(courses: impl IntoIterator<Item = Course>) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut normalized = Vec::new();
        for mut course in courses {
            course.normalize()?;
            if !seen.insert(course.slug.clone()) {
                return Err(Error::DuplicateSlug {
                    kind: "course",
                    slug: course.slug,
                });
            }
            normalized.push(course);
        }
        debug!(courses = normalized.len(), "built in-memory catalog");
        Ok(Self {
            courses: normalized,
        })
    }

    /// The catalog that ships with the binary.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            courses: super::builtin::courses(),
        }
    }

    /// Number of courses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.courses.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// Borrow every course.
    #[must_use]
    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    /// Consume the repository, returning its courses.
    #[must_use]
    pub fn into_courses(self) -> Vec<Course> {
        self.courses
    }
}

impl ContentRepository for InMemoryRepository {
    fn list_courses(&self) -> Result<Vec<CourseSummary>> {
        Ok(self.courses.iter().map(Course::summary).collect())
    }

    fn course(&self, slug: &str) -> Result<Option<Course>> {
        Ok(self.courses.iter().find(|c| c.slug == slug).cloned())
    }

    fn search_lessons(&self, query: &str, limit: usize) -> Result<Vec<LessonHit>> {
        let needle = query.to_lowercase();
        let hits = self
            .courses
            .iter()
            .flat_map(|course| {
                course.modules.iter().flat_map(move |module| {
                    module.lessons.iter().map(move |lesson| (course, module, lesson))
                })
            })
            .filter(|(_, _, lesson)| {
                lesson.title.to_lowercase().contains(&needle)
                    || lesson.body_html.to_lowercase().contains(&needle)
            })
            .take(limit)
            .map(|(course, module, lesson)| LessonHit {
                course_slug: course.slug.clone(),
                module_slug: module.slug.clone(),
                lesson_slug: lesson.slug.clone(),
                title: lesson.title.clone(),
            })
            .collect();
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{CourseModule, Lesson};

    fn course(slug: &str) -> Course {
        Course {
            slug: slug.to_string(),
            title: slug.to_uppercase(),
            category: None,
            summary: String::new(),
            hero: crate::resolver::CandidateList::default(),
            modules: vec![CourseModule {
                slug: "one".to_string(),
                title: "One".to_string(),
                lessons: vec![
                    Lesson::new("pipes", "Pipes and redirection", 15, "<p>Use | to chain</p>"),
                    Lesson::new("grep", "Searching text", 10, "<p>grep finds PATTERNS</p>"),
                ],
            }],
        }
    }

    #[test]
    fn test_new_rejects_duplicate_courses() {
        let result = InMemoryRepository::new([course("linux-a"), course("linux-a")]);
        assert!(matches!(
            result,
            Err(Error::DuplicateSlug { kind: "course", .. })
        ));
    }

    #[test]
    fn test_new_rejects_invalid_slug() {
        assert!(InMemoryRepository::new([course("Linux A")]).is_err());
    }

    #[test]
    fn test_list_and_lookup() {
        let repo = InMemoryRepository::new([course("linux-a"), course("git-b")]).unwrap();
        let list = repo.list_courses().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].slug, "linux-a");
        assert_eq!(list[1].lesson_count, 2);

        assert!(repo.course("git-b").unwrap().is_some());
        assert!(repo.course("missing").unwrap().is_none());
    }

    #[test]
    fn test_lesson_lookup() {
        let repo = InMemoryRepository::new([course("linux-a")]).unwrap();
        let lesson = repo.lesson("linux-a", "grep").unwrap().unwrap();
        assert_eq!(lesson.title, "Searching text");
        assert!(repo.lesson("linux-a", "awk").unwrap().is_none());
        assert!(repo.lesson("nope", "grep").unwrap().is_none());
    }

    #[test]
    fn test_require_variants() {
        let repo = InMemoryRepository::new([course("linux-a")]).unwrap();
        assert!(repo.require_course("linux-a").is_ok());
        assert!(matches!(
            repo.require_course("nope"),
            Err(Error::CourseNotFound { .. })
        ));
        assert!(matches!(
            repo.require_lesson("linux-a", "awk"),
            Err(Error::LessonNotFound { .. })
        ));
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let repo = InMemoryRepository::new([course("linux-a")]).unwrap();
        let hits = repo.search_lessons("patterns", 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].lesson_slug, "grep");

        let hits = repo.search_lessons("PIPES", 10).unwrap();
        assert_eq!(hits[0].lesson_slug, "pipes");
    }

    #[test]
    fn test_search_respects_limit() {
        let repo = InMemoryRepository::new([course("linux-a"), course("linux-b")]).unwrap();
        let hits = repo.search_lessons("<p>", 3).unwrap();
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn test_boxed_repository() {
        let repo: Box<dyn ContentRepository> =
            Box::new(InMemoryRepository::new([course("linux-a")]).unwrap());
        assert_eq!(repo.list_courses().unwrap().len(), 1);
    }
}
