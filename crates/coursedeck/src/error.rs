//! Error types for coursedeck.
//!
//! This module defines the error type shared by the content repository,
//! storage, configuration and rendering layers. Asset load failures are not
//! represented here: the image resolver absorbs them locally (see
//! [`crate::resolver::LoadError`]).

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for coursedeck operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Content Errors ===
    /// A course or lesson slug is not well-formed.
    #[error("invalid slug '{slug}': expected lowercase words separated by hyphens")]
    InvalidSlug {
        /// The rejected slug.
        slug: String,
    },

    /// The requested course does not exist.
    #[error("course not found: {slug}")]
    CourseNotFound {
        /// Slug that was looked up.
        slug: String,
    },

    /// The requested lesson does not exist in the course.
    #[error("lesson not found: {course}/{lesson}")]
    LessonNotFound {
        /// Course slug.
        course: String,
        /// Lesson slug.
        lesson: String,
    },

    /// A category name is not recognized.
    #[error("unknown course category: {0}")]
    UnknownCategory(String),

    /// Two entries in one catalog share a slug.
    #[error("duplicate {kind} slug: {slug}")]
    DuplicateSlug {
        /// What kind of entry was duplicated ("course", "module", "lesson").
        kind: &'static str,
        /// The duplicated slug.
        slug: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to read a catalog file.
    #[error("failed to read catalog {path}: {source}")]
    CatalogRead {
        /// Path of the catalog file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for coursedeck operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a configuration validation error.
    #[must_use]
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    /// Create a course-not-found error.
    #[must_use]
    pub fn course_not_found(slug: impl Into<String>) -> Self {
        Self::CourseNotFound { slug: slug.into() }
    }

    /// Create a lesson-not-found error.
    #[must_use]
    pub fn lesson_not_found(course: impl Into<String>, lesson: impl Into<String>) -> Self {
        Self::LessonNotFound {
            course: course.into(),
            lesson: lesson.into(),
        }
    }

    /// Check if this error means a lookup found nothing.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::CourseNotFound { .. } | Self::LessonNotFound { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::course_not_found("linux-basics");
        assert_eq!(err.to_string(), "course not found: linux-basics");

        let err = Error::internal("test error");
        assert_eq!(err.to_string(), "internal error: test error");
    }

    #[test]
    fn test_lesson_not_found_display() {
        let err = Error::lesson_not_found("git-essentials", "rebasing");
        assert_eq!(err.to_string(), "lesson not found: git-essentials/rebasing");
    }

    #[test]
    fn test_is_not_found() {
        assert!(Error::course_not_found("x").is_not_found());
        assert!(Error::lesson_not_found("x", "y").is_not_found());
        assert!(!Error::internal("boom").is_not_found());
    }

    #[test]
    fn test_invalid_slug_display() {
        let err = Error::InvalidSlug {
            slug: "Not A Slug".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Not A Slug"));
        assert!(msg.contains("hyphens"));
    }

    #[test]
    fn test_duplicate_slug_display() {
        let err = Error::DuplicateSlug {
            kind: "lesson",
            slug: "intro".to_string(),
        };
        assert_eq!(err.to_string(), "duplicate lesson slug: intro");
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::config_validation("content.path is required");
        assert!(err.to_string().contains("content.path is required"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_rusqlite_error() {
        let result = rusqlite::Connection::open_with_flags(
            "/nonexistent/path/db.sqlite",
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        );
        if let Err(sqlite_err) = result {
            let err: Error = sqlite_err.into();
            assert!(matches!(err, Error::DatabaseQuery(_)));
        }
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    #[test]
    fn test_database_migration_error_display() {
        let err = Error::DatabaseMigration {
            message: "version mismatch".to_string(),
        };
        assert!(err.to_string().contains("version mismatch"));
    }

    #[test]
    fn test_catalog_read_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = Error::CatalogRead {
            path: PathBuf::from("/tmp/catalog.json"),
            source: io_err,
        };
        assert!(err.to_string().contains("/tmp/catalog.json"));
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden"));
    }
}
