//! Asset loaders: the host side of image resolution.
//!
//! A loader attempts to fetch and decode one source and reports success or
//! failure. The resolver only cares which of the two happened; [`LoadError`]
//! carries detail for logs.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Serialize;
use thiserror::Error;

use super::candidates::is_inline;

/// Why a candidate failed to load.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The source string was empty.
    #[error("empty source")]
    EmptySource,

    /// No loader handles this kind of source.
    #[error("unsupported source: {0}")]
    Unsupported(String),

    /// A `data:` URI could not be parsed.
    #[error("malformed data URI: {0}")]
    MalformedDataUri(String),

    /// The path escapes the asset root.
    #[error("path escapes asset root: {}", .0.display())]
    OutsideRoot(PathBuf),

    /// The file does not exist.
    #[error("not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Reading the file failed.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that was read.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The source had no bytes.
    #[error("empty payload")]
    EmptyPayload,

    /// The bytes are not a recognized image.
    #[error("not a decodable image ({0})")]
    Undecodable(String),
}

/// Image formats recognized by their leading bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// Portable Network Graphics.
    Png,
    /// JPEG.
    Jpeg,
    /// GIF87a / GIF89a.
    Gif,
    /// WebP in a RIFF container.
    Webp,
    /// SVG markup.
    Svg,
}

impl ImageFormat {
    /// Sniff the format from the first bytes of an asset.
    #[must_use]
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

        if bytes.starts_with(PNG_MAGIC) {
            return Some(Self::Png);
        }
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }
        if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            return Some(Self::Gif);
        }
        if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            return Some(Self::Webp);
        }

        // SVG is text; look for the root element near the start
        let head = &bytes[..bytes.len().min(1024)];
        let text = String::from_utf8_lossy(head);
        if text.trim_start().starts_with('<') && text.contains("<svg") {
            return Some(Self::Svg);
        }
        None
    }

    /// MIME type for the format.
    #[must_use]
    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Webp => "image/webp",
            Self::Svg => "image/svg+xml",
        }
    }
}

/// A successfully loaded asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadedAsset {
    /// Detected format.
    pub format: ImageFormat,
    /// Size of the decoded payload.
    pub byte_len: usize,
}

/// Something that can attempt to load an asset source.
#[async_trait]
pub trait AssetLoader: Send + Sync {
    /// Name of this loader (for logging).
    fn name(&self) -> &'static str;

    /// Attempt to load `source`.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] describing why the source cannot be rendered.
    async fn load(&self, source: &str) -> Result<LoadedAsset, LoadError>;
}

/// Loads inline `data:` URIs.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataUriLoader;

impl DataUriLoader {
    /// Decode a `data:[<mime>][;param]*[;base64],<payload>` URI.
    ///
    /// # Errors
    ///
    /// Returns an error for anything that is not a well-formed data URI.
    pub fn decode(source: &str) -> Result<(String, Vec<u8>), LoadError> {
        if !is_inline(source) {
            return Err(LoadError::Unsupported(source.to_string()));
        }
        let rest = &source[5..];
        let (meta, payload) = rest
            .split_once(',')
            .ok_or_else(|| LoadError::MalformedDataUri("missing ',' separator".to_string()))?;

        let mut parts = meta.split(';');
        let mime = match parts.next().map(str::trim) {
            Some(m) if !m.is_empty() => m.to_ascii_lowercase(),
            _ => "text/plain".to_string(),
        };
        let is_base64 = parts.any(|p| p.trim().eq_ignore_ascii_case("base64"));

        let bytes = if is_base64 {
            BASE64
                .decode(payload.trim())
                .map_err(|e| LoadError::MalformedDataUri(e.to_string()))?
        } else {
            urlencoding::decode_binary(payload.as_bytes()).into_owned()
        };
        Ok((mime, bytes))
    }

    /// Decode a data URI and check that it holds a recognized image.
    ///
    /// This is the whole of a data URI load; it needs no runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the URI is malformed, empty, or not an image.
    pub fn inspect(source: &str) -> Result<LoadedAsset, LoadError> {
        let (mime, bytes) = Self::decode(source)?;
        if bytes.is_empty() {
            return Err(LoadError::EmptyPayload);
        }
        if !mime.starts_with("image/") {
            return Err(LoadError::Undecodable(mime));
        }
        let format = ImageFormat::sniff(&bytes).ok_or(LoadError::Undecodable(mime))?;
        Ok(LoadedAsset {
            format,
            byte_len: bytes.len(),
        })
    }
}

#[async_trait]
impl AssetLoader for DataUriLoader {
    fn name(&self) -> &'static str {
        "data-uri"
    }

    async fn load(&self, source: &str) -> Result<LoadedAsset, LoadError> {
        Self::inspect(source)
    }
}

/// Loads files below an asset root directory.
///
/// Sources are treated as paths relative to the root; a leading `/` is
/// stripped so site-absolute paths like `/img/git.png` work.
#[derive(Debug, Clone)]
pub struct FileLoader {
    root: PathBuf,
}

impl FileLoader {
    /// Create a loader serving files under `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The asset root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a source to a path under the root.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::OutsideRoot`] if the source climbs out of the root.
    pub fn resolve_path(&self, source: &str) -> Result<PathBuf, LoadError> {
        let relative = Path::new(source.trim_start_matches('/'));
        let escapes = relative.components().any(|c| {
            matches!(
                c,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
        if escapes {
            return Err(LoadError::OutsideRoot(relative.to_path_buf()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl AssetLoader for FileLoader {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn load(&self, source: &str) -> Result<LoadedAsset, LoadError> {
        let path = self.resolve_path(source)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(LoadError::NotFound(path));
            }
            Err(source) => return Err(LoadError::Io { path, source }),
        };
        if bytes.is_empty() {
            return Err(LoadError::EmptyPayload);
        }
        let format = ImageFormat::sniff(&bytes)
            .ok_or_else(|| LoadError::Undecodable(path.display().to_string()))?;
        Ok(LoadedAsset {
            format,
            byte_len: bytes.len(),
        })
    }
}

/// Routes `data:` URIs and local paths to the matching loader.
///
/// Remote URLs are reported as unsupported, which the resolver treats like
/// any other failure.
#[derive(Debug, Clone)]
pub struct RoutingLoader {
    data: DataUriLoader,
    files: FileLoader,
}

impl RoutingLoader {
    /// Create a router serving local files from `asset_root`.
    #[must_use]
    pub fn new(asset_root: impl Into<PathBuf>) -> Self {
        Self {
            data: DataUriLoader,
            files: FileLoader::new(asset_root),
        }
    }
}

#[async_trait]
impl AssetLoader for RoutingLoader {
    fn name(&self) -> &'static str {
        "router"
    }

    async fn load(&self, source: &str) -> Result<LoadedAsset, LoadError> {
        if source.trim().is_empty() {
            return Err(LoadError::EmptySource);
        }
        if is_inline(source) {
            return self.data.load(source).await;
        }
        if source.contains("://") || source.starts_with("//") {
            return Err(LoadError::Unsupported(source.to_string()));
        }
        self.files.load(source).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::PLACEHOLDER_SVG;

    const TINY_PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    #[test]
    fn test_sniff_formats() {
        assert_eq!(ImageFormat::sniff(TINY_PNG), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::sniff(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::sniff(b"GIF89a...."), Some(ImageFormat::Gif));
        assert_eq!(ImageFormat::sniff(b"RIFF\0\0\0\0WEBPVP8 "), Some(ImageFormat::Webp));
        assert_eq!(
            ImageFormat::sniff(b"<?xml version='1.0'?>\n<svg xmlns='x'/>"),
            Some(ImageFormat::Svg)
        );
        assert_eq!(ImageFormat::sniff(b"hello world"), None);
        assert_eq!(ImageFormat::sniff(b""), None);
    }

    #[test]
    fn test_decode_base64_data_uri() {
        let uri = format!("data:image/png;base64,{}", BASE64.encode(TINY_PNG));
        let (mime, bytes) = DataUriLoader::decode(&uri).unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(bytes, TINY_PNG);
    }

    #[test]
    fn test_decode_percent_encoded_data_uri() {
        let (mime, bytes) = DataUriLoader::decode("data:image/svg+xml,%3Csvg%2F%3E").unwrap();
        assert_eq!(mime, "image/svg+xml");
        assert_eq!(bytes, b"<svg/>");
    }

    #[test]
    fn test_decode_missing_separator() {
        assert!(matches!(
            DataUriLoader::decode("data:image/png;base64"),
            Err(LoadError::MalformedDataUri(_))
        ));
    }

    #[test]
    fn test_decode_bad_base64() {
        assert!(matches!(
            DataUriLoader::decode("data:image/png;base64,***"),
            Err(LoadError::MalformedDataUri(_))
        ));
    }

    #[test]
    fn test_inspect_placeholder_and_rejects() {
        let asset = DataUriLoader::inspect(PLACEHOLDER_SVG).unwrap();
        assert_eq!(asset.format, ImageFormat::Svg);

        assert!(matches!(
            DataUriLoader::inspect("data:image/png;base64,***"),
            Err(LoadError::MalformedDataUri(_))
        ));
        assert!(matches!(
            DataUriLoader::inspect("data:image/png;base64,"),
            Err(LoadError::EmptyPayload)
        ));
        assert!(matches!(
            DataUriLoader::inspect("data:text/plain,hi"),
            Err(LoadError::Undecodable(_))
        ));
    }

    #[tokio::test]
    async fn test_placeholder_always_loads() {
        let asset = DataUriLoader.load(PLACEHOLDER_SVG).await.unwrap();
        assert_eq!(asset.format, ImageFormat::Svg);
        assert!(asset.byte_len > 0);
    }

    #[tokio::test]
    async fn test_data_uri_rejects_empty_payload() {
        assert!(matches!(
            DataUriLoader.load("data:image/png;base64,").await,
            Err(LoadError::EmptyPayload)
        ));
    }

    #[tokio::test]
    async fn test_data_uri_rejects_non_image() {
        assert!(matches!(
            DataUriLoader.load("data:text/plain,hello").await,
            Err(LoadError::Undecodable(_))
        ));
    }

    #[tokio::test]
    async fn test_data_uri_rejects_mislabelled_bytes() {
        assert!(matches!(
            DataUriLoader.load("data:image/png,not-a-png").await,
            Err(LoadError::Undecodable(_))
        ));
    }

    #[test]
    fn test_resolve_path_strips_leading_slash() {
        let loader = FileLoader::new("/srv/assets");
        assert_eq!(
            loader.resolve_path("/img/git.png").unwrap(),
            PathBuf::from("/srv/assets/img/git.png")
        );
    }

    #[test]
    fn test_resolve_path_rejects_traversal() {
        let loader = FileLoader::new("/srv/assets");
        assert!(matches!(
            loader.resolve_path("../etc/passwd"),
            Err(LoadError::OutsideRoot(_))
        ));
        assert!(matches!(
            loader.resolve_path("img/../../secret.png"),
            Err(LoadError::OutsideRoot(_))
        ));
    }

    #[tokio::test]
    async fn test_file_loader_reads_image() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("logo.png"), TINY_PNG).unwrap();

        let loader = FileLoader::new(dir.path());
        let asset = loader.load("logo.png").await.unwrap();
        assert_eq!(asset.format, ImageFormat::Png);
        assert_eq!(asset.byte_len, TINY_PNG.len());
    }

    #[tokio::test]
    async fn test_file_loader_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let loader = FileLoader::new(dir.path());
        assert!(matches!(
            loader.load("missing.png").await,
            Err(LoadError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_file_loader_empty_and_garbage_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("empty.png"), b"").unwrap();
        std::fs::write(dir.path().join("notes.png"), b"plain text").unwrap();

        let loader = FileLoader::new(dir.path());
        assert!(matches!(
            loader.load("empty.png").await,
            Err(LoadError::EmptyPayload)
        ));
        assert!(matches!(
            loader.load("notes.png").await,
            Err(LoadError::Undecodable(_))
        ));
    }

    #[tokio::test]
    async fn test_routing_loader() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.gif"), b"GIF89a\x01\0\x01\0").unwrap();
        let loader = RoutingLoader::new(dir.path());

        assert!(loader.load("/a.gif").await.is_ok());
        assert!(loader.load(PLACEHOLDER_SVG).await.is_ok());
        assert!(matches!(loader.load("").await, Err(LoadError::EmptySource)));
        assert!(matches!(
            loader.load("https://cdn.example.com/a.png").await,
            Err(LoadError::Unsupported(_))
        ));
        assert!(matches!(
            loader.load("//cdn.example.com/a.png").await,
            Err(LoadError::Unsupported(_))
        ));
    }

    #[test]
    fn test_load_error_display() {
        assert_eq!(LoadError::EmptySource.to_string(), "empty source");
        assert!(LoadError::NotFound(PathBuf::from("/x/y.png"))
            .to_string()
            .contains("/x/y.png"));
    }
}
