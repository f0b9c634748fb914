//! # Branding Assets
//!
//! Uploaded background and signature images live under the uploads directory
//! as `certificados/<md5>.<ext>`, so the same picture uploaded twice maps to
//! the same file. Templates store that relative path; a stored reference may
//! also be an absolute `http(s)` URL, fetched at render time.
//!
//! Files are never removed when the template moves to a new image.

use crate::error::AppError;
use md5::Context;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

/// Sub-directory of the uploads root holding certificate artwork.
pub const ASSET_DIR: &str = "certificados";

/// Public prefix under which the uploads root is served.
pub const PUBLIC_PREFIX: &str = "/uploads/";

const REMOTE_TIMEOUT: Duration = Duration::from_secs(10);

/// The two raster formats accepted for branding and understood by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
}

impl ImageKind {
    /// Detects the format from the leading bytes, ignoring any file name.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            Some(ImageKind::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageKind::Jpeg)
        } else {
            None
        }
    }

    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "image/png" => Some(ImageKind::Png),
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(ImageKind::Jpeg),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageKind::Png => "png",
            ImageKind::Jpeg => "jpg",
        }
    }

    pub fn image_format(&self) -> image::ImageFormat {
        match self {
            ImageKind::Png => image::ImageFormat::Png,
            ImageKind::Jpeg => image::ImageFormat::Jpeg,
        }
    }
}

fn is_remote(reference: &str) -> bool {
    reference.starts_with("http://") || reference.starts_with("https://")
}

/// Filesystem-backed store rooted at the uploads directory.
#[derive(Debug, Clone)]
pub struct AssetStore {
    root: PathBuf,
}

impl AssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Validates and saves an uploaded image, returning its stored reference.
    ///
    /// Both the declared content type (when present) and the byte signature
    /// must say PNG or JPEG.
    pub fn store(&self, content_type: Option<&str>, bytes: &[u8]) -> Result<String, AppError> {
        if let Some(declared) = content_type {
            if ImageKind::from_content_type(declared).is_none() {
                return Err(AppError::invalid(format!(
                    "Formato de imagen no soportado: {}. Use PNG o JPG",
                    declared
                )));
            }
        }
        let kind = ImageKind::sniff(bytes)
            .ok_or_else(|| AppError::invalid("El archivo no es una imagen PNG o JPG válida"))?;

        let mut hasher = Context::new();
        hasher.consume(bytes);
        let digest = format!("{:x}", hasher.finalize());
        let reference = format!("{}/{}.{}", ASSET_DIR, digest, kind.extension());

        let path = self.root.join(&reference);
        if !path.exists() {
            fs::create_dir_all(self.root.join(ASSET_DIR))?;
            fs::write(&path, bytes)?;
            log::info!("Stored branding asset {} ({} bytes)", reference, bytes.len());
        } else {
            log::debug!("Branding asset {} already stored", reference);
        }
        Ok(reference)
    }

    /// Reads the bytes behind a stored reference.
    pub fn fetch(&self, reference: &str) -> Result<Vec<u8>, AppError> {
        if is_remote(reference) {
            return fetch_remote(reference);
        }
        Ok(fs::read(self.local_path(reference)?)?)
    }

    /// Maps a stored reference (optionally prefixed with `/uploads/`) to a
    /// path under the root. Parent-directory components are rejected.
    pub fn local_path(&self, reference: &str) -> Result<PathBuf, AppError> {
        let relative = reference
            .strip_prefix(PUBLIC_PREFIX)
            .unwrap_or(reference)
            .trim_start_matches('/');
        let relative = Path::new(relative);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if relative.as_os_str().is_empty() || escapes {
            return Err(AppError::invalid(format!("Ruta de recurso inválida: {}", reference)));
        }
        Ok(self.root.join(relative))
    }
}

fn fetch_remote(url: &str) -> Result<Vec<u8>, AppError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(REMOTE_TIMEOUT)
        .build()
        .map_err(|e| AppError::Internal(format!("failed to build HTTP client: {}", e)))?;
    let response = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .map_err(|e| AppError::Internal(format!("GET {} failed: {}", url, e)))?;
    let bytes = response
        .bytes()
        .map_err(|e| AppError::Internal(format!("reading {} failed: {}", url, e)))?;
    Ok(bytes.to_vec())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Cursor;

    /// Small solid-colour PNG for tests.
    pub(crate) fn png_bytes(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb(rgb));
        let mut out = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut out, image::ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    pub(crate) fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 180, 20]));
        let mut out = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut out, image::ImageFormat::Jpeg)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn formats_are_detected_from_bytes() {
        assert_eq!(ImageKind::sniff(&png_bytes(2, 2, [0, 0, 0])), Some(ImageKind::Png));
        assert_eq!(ImageKind::sniff(&jpeg_bytes(2, 2)), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::sniff(b"RIFF\0\0\0\0WEBPVP8 "), None);
        assert_eq!(ImageKind::sniff(&[]), None);
    }

    #[test]
    fn content_types_are_normalised() {
        assert_eq!(ImageKind::from_content_type("image/PNG"), Some(ImageKind::Png));
        assert_eq!(
            ImageKind::from_content_type("image/jpeg; charset=binary"),
            Some(ImageKind::Jpeg)
        );
        assert_eq!(ImageKind::from_content_type("image/webp"), None);
    }

    #[test]
    fn identical_uploads_share_one_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = AssetStore::new(dir.path());
        let bytes = png_bytes(3, 3, [10, 20, 30]);

        let first = store.store(Some("image/png"), &bytes).unwrap();
        let second = store.store(None, &bytes).unwrap();
        assert_eq!(first, second);
        assert!(first.starts_with("certificados/") && first.ends_with(".png"));
        assert_eq!(store.fetch(&first).unwrap(), bytes);
        assert_eq!(store.fetch(&format!("/uploads/{}", first)).unwrap(), bytes);
        assert_eq!(fs::read_dir(dir.path().join(ASSET_DIR)).unwrap().count(), 1);
    }

    #[test]
    fn declared_and_actual_format_must_both_be_supported() {
        let dir = tempfile::tempdir().unwrap();
        let store = AssetStore::new(dir.path());
        let png = png_bytes(2, 2, [1, 2, 3]);

        assert!(matches!(
            store.store(Some("image/webp"), &png),
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(
            store.store(Some("image/png"), b"not an image"),
            Err(AppError::InvalidInput(_))
        ));
        let jpeg = store.store(Some("image/jpeg"), &jpeg_bytes(2, 2)).unwrap();
        assert!(jpeg.ends_with(".jpg"));
    }

    #[test]
    fn references_cannot_escape_the_root() {
        let store = AssetStore::new("/srv/uploads");
        assert!(store.local_path("../etc/passwd").is_err());
        assert!(store.local_path("certificados/../../x.png").is_err());
        assert!(store.local_path("").is_err());
        assert_eq!(
            store.local_path("certificados/a.png").unwrap(),
            PathBuf::from("/srv/uploads/certificados/a.png")
        );
    }

    #[test]
    fn missing_local_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = AssetStore::new(dir.path());
        assert!(matches!(store.fetch("certificados/none.png"), Err(AppError::Io(_))));
    }
}
