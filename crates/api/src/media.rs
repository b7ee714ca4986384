//! Product image storage under the configured media directory.
//!
//! The format is decided from the file content, never from the client's
//! file name or content type. Files are written as
//! `products/{product_id}-{uuid}.{ext}` and served under `/media`.

use std::path::Path;

use image::ImageFormat;
use uuid::Uuid;
use warehub_core::error::CoreError;
use warehub_core::types::DbId;

/// Accepted upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
    WebP,
}

impl ImageKind {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::WebP => "webp",
        }
    }
}

/// Sniff the image format from its leading bytes.
pub fn detect_image(bytes: &[u8]) -> Result<ImageKind, CoreError> {
    match image::guess_format(bytes) {
        Ok(ImageFormat::Png) => Ok(ImageKind::Png),
        Ok(ImageFormat::Jpeg) => Ok(ImageKind::Jpeg),
        Ok(ImageFormat::WebP) => Ok(ImageKind::WebP),
        Ok(other) => Err(CoreError::Validation(format!(
            "Unsupported image format {other:?}. Use PNG, JPEG or WebP"
        ))),
        Err(_) => Err(CoreError::Validation(
            "Uploaded file is not a recognised image".into(),
        )),
    }
}

/// Write an image for a product and return its path relative to `media_dir`.
pub async fn store_product_image(
    media_dir: &Path,
    product_id: DbId,
    kind: ImageKind,
    bytes: &[u8],
) -> std::io::Result<String> {
    let relative = format!(
        "products/{product_id}-{}.{}",
        Uuid::new_v4().simple(),
        kind.extension()
    );
    let full = media_dir.join(&relative);
    if let Some(parent) = full.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&full, bytes).await?;
    Ok(relative)
}

/// Remove a previously stored file. Missing files are not an error.
pub async fn remove_media_file(media_dir: &Path, relative: &str) {
    // Stored paths never contain `..`; refuse anything else.
    if relative.contains("..") {
        return;
    }
    match tokio::fs::remove_file(media_dir.join(relative)).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(error = %e, path = relative, "Failed to remove media file"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];
    const JPEG_HEADER: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10, b'J', b'F', b'I', b'F'];

    #[test]
    fn detects_png_and_jpeg_by_content() {
        assert_eq!(detect_image(PNG_HEADER).unwrap(), ImageKind::Png);
        assert_eq!(detect_image(JPEG_HEADER).unwrap(), ImageKind::Jpeg);
    }

    #[test]
    fn rejects_non_images() {
        assert!(detect_image(b"hello, this is plain text").is_err());
        assert!(detect_image(&[]).is_err());
    }

    #[tokio::test]
    async fn stores_and_removes_a_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let relative = store_product_image(dir.path(), 5, ImageKind::Png, PNG_HEADER)
            .await
            .expect("write should succeed");
        assert!(relative.starts_with("products/5-"));
        assert!(relative.ends_with(".png"));
        assert!(dir.path().join(&relative).exists());

        remove_media_file(dir.path(), &relative).await;
        assert!(!dir.path().join(&relative).exists());
        // Second removal is a no-op.
        remove_media_file(dir.path(), &relative).await;
    }
}
