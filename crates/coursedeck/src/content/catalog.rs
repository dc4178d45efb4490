//! JSON catalog files.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::memory::InMemoryRepository;
use super::model::Course;
use crate::error::{Error, Result};

/// On-disk catalog format: `{ "courses": [ ... ] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogFile {
    /// Courses in catalog order.
    #[serde(default)]
    pub courses: Vec<Course>,
}

impl CatalogFile {
    /// Read and parse a catalog file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| Error::CatalogRead {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog: Self = serde_json::from_str(&text)?;
        info!(path = %path.display(), courses = catalog.courses.len(), "loaded catalog file");
        Ok(catalog)
    }

    /// Write the catalog as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Validate the catalog and load it into memory.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid or duplicate slugs.
    pub fn into_repository(self) -> Result<InMemoryRepository> {
        InMemoryRepository::new(self.courses)
    }
}

impl InMemoryRepository {
    /// Load a JSON catalog file into memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        CatalogFile::read(path)?.into_repository()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentRepository;

    const CATALOG: &str = r#"{
        "courses": [
            {
                "slug": "linux-shell",
                "title": "The Linux Shell",
                "hero": ["/img/shell.webp", "/img/shell.png"],
                "modules": [
                    {
                        "slug": "navigation",
                        "title": "Navigation",
                        "lessons": [
                            {"slug": "cd", "title": "Changing directories", "duration_minutes": 5,
                             "body_html": "<p>cd moves around</p>"}
                        ]
                    }
                ]
            }
        ]
    }"#;

    #[test]
    fn test_read_catalog_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, CATALOG).unwrap();

        let repo = InMemoryRepository::from_json_file(&path).unwrap();
        assert_eq!(repo.len(), 1);
        let course = repo.course("linux-shell").unwrap().unwrap();
        assert_eq!(course.hero.len(), 2);
        assert!(!course.modules[0].lessons[0].content_hash.is_empty());
    }

    #[test]
    fn test_read_missing_file() {
        let result = CatalogFile::read("/nonexistent/catalog.json");
        assert!(matches!(result, Err(Error::CatalogRead { .. })));
    }

    #[test]
    fn test_read_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(CatalogFile::read(&path), Err(Error::Json(_))));
    }

    #[test]
    fn test_write_then_read_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("builtin.json");
        let catalog = CatalogFile {
            courses: InMemoryRepository::builtin().into_courses(),
        };
        catalog.write(&path).unwrap();

        let reread = CatalogFile::read(&path).unwrap();
        assert_eq!(reread.courses.len(), catalog.courses.len());
        assert!(reread.into_repository().is_ok());
    }
}
