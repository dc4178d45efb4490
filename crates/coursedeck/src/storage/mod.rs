//! `SQLite` content store.
//!
//! Persists imported catalogs and serves them through
//! [`ContentRepository`]. Re-importing a course replaces its structure;
//! lessons whose content hash is unchanged keep their `updated_at`.

pub mod migrations;
pub mod schema;

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{params, types::Type, Connection, OptionalExtension};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::content::{
    ContentRepository, Course, CourseCategory, CourseModule, CourseSummary, Lesson, LessonHit,
};
use crate::error::{Error, Result};
use crate::resolver::CandidateList;

/// `SQLite`-backed course catalog.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

/// What an import changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    /// Course slug.
    pub course: String,
    /// Lessons that did not exist before.
    pub added: usize,
    /// Lessons whose body changed.
    pub updated: usize,
    /// Lessons with an identical content hash.
    pub unchanged: usize,
    /// Lessons no longer present in the course.
    pub removed: usize,
}

/// Statistics about the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageStats {
    /// Number of courses.
    pub courses: i64,
    /// Number of lessons across all courses.
    pub lessons: i64,
    /// Most recent lesson change.
    pub last_updated: Option<DateTime<Utc>>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}

impl Storage {
    /// Open or create a content store at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening content store at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        migrations::initialize_schema(&conn)?;

        info!("Content store opened at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert or replace a course.
    ///
    /// # Errors
    ///
    /// Returns an error if the course fails validation or the write fails.
    pub fn import_course(&self, course: &Course) -> Result<ImportReport> {
        let mut course = course.clone();
        course.normalize()?;

        let existing = self.lesson_hashes(&course.slug)?;
        let tx = self.conn.unchecked_transaction()?;

        // Re-imports keep their catalog position
        let existing_position: Option<i64> = tx
            .query_row(
                "SELECT position FROM courses WHERE slug = ?1",
                [&course.slug],
                |row| row.get(0),
            )
            .optional()?;
        let position = match existing_position {
            Some(position) => position,
            None => tx.query_row(
                "SELECT COALESCE(MAX(position) + 1, 0) FROM courses",
                [],
                |row| row.get::<_, i64>(0),
            )?,
        };

        tx.execute(
            r"
            INSERT INTO courses (slug, title, category, summary, hero_json, position, imported_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(slug) DO UPDATE SET
                title = excluded.title,
                category = excluded.category,
                summary = excluded.summary,
                hero_json = excluded.hero_json,
                imported_at = excluded.imported_at
            ",
            params![
                course.slug,
                course.title,
                course.category.map(CourseCategory::as_str),
                course.summary,
                serde_json::to_string(&course.hero)?,
                position,
                Utc::now().to_rfc3339(),
            ],
        )?;

        tx.execute("DELETE FROM modules WHERE course_slug = ?1", [&course.slug])?;
        tx.execute("DELETE FROM lessons WHERE course_slug = ?1", [&course.slug])?;

        let mut report = ImportReport {
            course: course.slug.clone(),
            ..ImportReport::default()
        };
        let mut seen = HashSet::new();

        for (module_pos, module) in course.modules.iter().enumerate() {
            tx.execute(
                "INSERT INTO modules (course_slug, slug, title, position) VALUES (?1, ?2, ?3, ?4)",
                params![course.slug, module.slug, module.title, to_i64(module_pos)],
            )?;

            for (lesson_pos, lesson) in module.lessons.iter().enumerate() {
                seen.insert(lesson.slug.as_str());
                let updated_at = match existing.get(&lesson.slug) {
                    Some((hash, stamp)) if *hash == lesson.content_hash => {
                        report.unchanged += 1;
                        stamp.clone()
                    }
                    Some(_) => {
                        report.updated += 1;
                        lesson.updated_at.to_rfc3339()
                    }
                    None => {
                        report.added += 1;
                        lesson.updated_at.to_rfc3339()
                    }
                };

                tx.execute(
                    r"
                    INSERT INTO lessons (course_slug, module_slug, slug, title, duration_minutes,
                                         body_html, content_hash, updated_at, position)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                    ",
                    params![
                        course.slug,
                        module.slug,
                        lesson.slug,
                        lesson.title,
                        lesson.duration_minutes,
                        lesson.body_html,
                        lesson.content_hash,
                        updated_at,
                        to_i64(lesson_pos),
                    ],
                )?;
            }
        }

        report.removed = existing.keys().filter(|slug| !seen.contains(slug.as_str())).count();
        tx.commit()?;

        info!(
            course = %report.course,
            added = report.added,
            updated = report.updated,
            unchanged = report.unchanged,
            removed = report.removed,
            "imported course"
        );
        Ok(report)
    }

    /// Import every course of a repository.
    ///
    /// # Errors
    ///
    /// Returns the first read or import failure.
    pub fn import_all(&self, source: &dyn ContentRepository) -> Result<Vec<ImportReport>> {
        let mut reports = Vec::new();
        for summary in source.list_courses()? {
            let course = source.require_course(&summary.slug)?;
            reports.push(self.import_course(&course)?);
        }
        Ok(reports)
    }

    /// Delete a course and its content.
    ///
    /// Returns `true` if a course was deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_course(&self, slug: &str) -> Result<bool> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM lessons WHERE course_slug = ?1", [slug])?;
        tx.execute("DELETE FROM modules WHERE course_slug = ?1", [slug])?;
        let affected = tx.execute("DELETE FROM courses WHERE slug = ?1", [slug])?;
        tx.commit()?;
        Ok(affected > 0)
    }

    /// Store statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let courses: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM courses", [], |row| row.get(0))?;
        let lessons: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM lessons", [], |row| row.get(0))?;
        let last_updated: Option<String> = self
            .conn
            .query_row("SELECT MAX(updated_at) FROM lessons", [], |row| row.get(0))?;

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageStats {
            courses,
            lessons,
            last_updated: last_updated.as_deref().and_then(parse_timestamp),
            db_size_bytes,
        })
    }

    /// Existing lesson hashes and timestamps of a course, keyed by slug.
    fn lesson_hashes(&self, course: &str) -> Result<HashMap<String, (String, String)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT slug, content_hash, updated_at FROM lessons WHERE course_slug = ?1")?;
        let rows = stmt
            .query_map([course], |row| {
                Ok((row.get::<_, String>(0)?, (row.get(1)?, row.get(2)?)))
            })?
            .collect::<std::result::Result<HashMap<_, _>, _>>()?;
        Ok(rows)
    }

    fn load_modules(&self, course: &str) -> Result<Vec<CourseModule>> {
        let mut stmt = self.conn.prepare(
            "SELECT slug, title FROM modules WHERE course_slug = ?1 ORDER BY position",
        )?;
        let mut modules = stmt
            .query_map([course], |row| {
                Ok(CourseModule {
                    slug: row.get(0)?,
                    title: row.get(1)?,
                    lessons: Vec::new(),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut stmt = self.conn.prepare(
            r"
            SELECT module_slug, slug, title, duration_minutes, body_html, content_hash, updated_at
            FROM lessons WHERE course_slug = ?1 ORDER BY position
            ",
        )?;
        let lessons = stmt
            .query_map([course], |row| {
                let module_slug: String = row.get(0)?;
                Ok((module_slug, Self::row_to_lesson(row, 1)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        for (module_slug, lesson) in lessons {
            match modules.iter_mut().find(|m| m.slug == module_slug) {
                Some(module) => module.lessons.push(lesson),
                None => warn!(course, module = %module_slug, "lesson belongs to unknown module"),
            }
        }
        Ok(modules)
    }

    /// Convert lesson columns starting at `offset` to a `Lesson`.
    fn row_to_lesson(row: &rusqlite::Row, offset: usize) -> rusqlite::Result<Lesson> {
        let updated_at: String = row.get(offset + 5)?;
        let updated_at = DateTime::parse_from_rfc3339(&updated_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(offset + 5, Type::Text, Box::new(e))
            })?;
        Ok(Lesson {
            slug: row.get(offset)?,
            title: row.get(offset + 1)?,
            duration_minutes: row.get(offset + 2)?,
            body_html: row.get(offset + 3)?,
            content_hash: row.get(offset + 4)?,
            updated_at,
        })
    }
}

impl ContentRepository for Storage {
    fn list_courses(&self) -> Result<Vec<CourseSummary>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT c.slug, c.title, c.category,
                   COALESCE(SUM(l.duration_minutes), 0),
                   (SELECT COUNT(*) FROM modules m WHERE m.course_slug = c.slug),
                   COUNT(l.slug)
            FROM courses c LEFT JOIN lessons l ON l.course_slug = c.slug
            GROUP BY c.slug
            ORDER BY c.position
            ",
        )?;
        let courses = stmt
            .query_map([], |row| {
                let slug: String = row.get(0)?;
                let category: Option<String> = row.get(2)?;
                let duration: i64 = row.get(3)?;
                let modules: i64 = row.get(4)?;
                let lessons: i64 = row.get(5)?;
                Ok(CourseSummary {
                    category: parse_category(category.as_deref(), &slug),
                    slug,
                    title: row.get(1)?,
                    duration_minutes: u32::try_from(duration).unwrap_or(u32::MAX),
                    module_count: usize::try_from(modules).unwrap_or_default(),
                    lesson_count: usize::try_from(lessons).unwrap_or_default(),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(courses)
    }

    fn course(&self, slug: &str) -> Result<Option<Course>> {
        let row = self
            .conn
            .query_row(
                "SELECT title, category, summary, hero_json FROM courses WHERE slug = ?1",
                [slug],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        let Some((title, category, summary, hero_json)) = row else {
            return Ok(None);
        };

        let hero: CandidateList = serde_json::from_str(&hero_json)?;
        Ok(Some(Course {
            slug: slug.to_string(),
            title,
            category: category.as_deref().and_then(|c| c.parse().ok()),
            summary,
            hero,
            modules: self.load_modules(slug)?,
        }))
    }

    fn lesson(&self, course: &str, lesson: &str) -> Result<Option<Lesson>> {
        let found = self
            .conn
            .query_row(
                r"
                SELECT slug, title, duration_minutes, body_html, content_hash, updated_at
                FROM lessons WHERE course_slug = ?1 AND slug = ?2
                ",
                [course, lesson],
                |row| Self::row_to_lesson(row, 0),
            )
            .optional()?;
        Ok(found)
    }

    fn search_lessons(&self, query: &str, limit: usize) -> Result<Vec<LessonHit>> {
        let pattern = format!("%{}%", escape_like(query));
        let mut stmt = self.conn.prepare(
            r"
            SELECT l.course_slug, l.module_slug, l.slug, l.title
            FROM lessons l
            JOIN courses c ON c.slug = l.course_slug
            JOIN modules m ON m.course_slug = l.course_slug AND m.slug = l.module_slug
            WHERE l.title LIKE ?1 ESCAPE '\' OR l.body_html LIKE ?1 ESCAPE '\'
            ORDER BY c.position, m.position, l.position
            LIMIT ?2
            ",
        )?;

        let limit_i64 = i64::try_from(limit).unwrap_or(i64::MAX);
        let hits = stmt
            .query_map(params![pattern, limit_i64], |row| {
                Ok(LessonHit {
                    course_slug: row.get(0)?,
                    module_slug: row.get(1)?,
                    lesson_slug: row.get(2)?,
                    title: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(hits)
    }
}

fn to_i64(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// Make `%`, `_` and `\` match literally in a `LIKE ... ESCAPE '\'` pattern.
fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for ch in query.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_category(stored: Option<&str>, slug: &str) -> CourseCategory {
    match stored.map(str::parse::<CourseCategory>) {
        Some(Ok(category)) => category,
        Some(Err(_)) => {
            warn!(course = slug, "unknown stored category, inferring from slug");
            CourseCategory::infer(slug)
        }
        None => CourseCategory::infer(slug),
    }
}
