//! `SQLite` schema definitions for the content store.

/// Courses, one row per slug.
pub const CREATE_COURSES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS courses (
    slug TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    category TEXT,
    summary TEXT NOT NULL DEFAULT '',
    hero_json TEXT NOT NULL DEFAULT '[]',
    position INTEGER NOT NULL,
    imported_at TEXT NOT NULL
)
";

/// Modules, ordered within a course by `position`.
pub const CREATE_MODULES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS modules (
    course_slug TEXT NOT NULL REFERENCES courses(slug) ON DELETE CASCADE,
    slug TEXT NOT NULL,
    title TEXT NOT NULL,
    position INTEGER NOT NULL,
    PRIMARY KEY (course_slug, slug)
)
";

/// Lessons, ordered within a module by `position`.
pub const CREATE_LESSONS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS lessons (
    course_slug TEXT NOT NULL REFERENCES courses(slug) ON DELETE CASCADE,
    module_slug TEXT NOT NULL,
    slug TEXT NOT NULL,
    title TEXT NOT NULL,
    duration_minutes INTEGER NOT NULL,
    body_html TEXT NOT NULL,
    content_hash TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    position INTEGER NOT NULL,
    PRIMARY KEY (course_slug, slug)
)
";

/// Index for listing a module's lessons in order.
pub const CREATE_LESSON_ORDER_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_lessons_module ON lessons(course_slug, module_slug, position)
";

/// Index for ordering the catalog.
pub const CREATE_COURSE_ORDER_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_courses_position ON courses(position)
";

/// Key-value metadata (schema version).
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema statements in creation order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_COURSES_TABLE,
    CREATE_MODULES_TABLE,
    CREATE_LESSONS_TABLE,
    CREATE_LESSON_ORDER_INDEX,
    CREATE_COURSE_ORDER_INDEX,
    CREATE_METADATA_TABLE,
];
