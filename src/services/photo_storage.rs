// src/services/photo_storage.rs
// DOCUMENTATION: Store photo handling
// PURPOSE: Validate uploads, resize to display width, write to disk

use crate::errors::StoreError;
use actix_multipart::form::tempfile::TempFile;
use actix_web::web;
use image::imageops::FilterType;
use image::DynamicImage;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Stored photos are normalized to this width; height follows the aspect ratio
pub const TARGET_WIDTH: u32 = 800;

/// File extension for an accepted content type.
/// Only formats we can decode and re-encode are allowed through.
fn extension_from_mime(essence: &str) -> Result<&'static str, StoreError> {
    match essence {
        "image/jpeg" => Ok("jpg"),
        "image/png" => Ok("png"),
        "image/gif" => Ok("gif"),
        "image/webp" => Ok("webp"),
        "image/bmp" => Ok("bmp"),
        "image/tiff" => Ok("tiff"),
        _ => Err(StoreError::UploadError(
            "That file type isn't allowed!".to_string(),
        )),
    }
}

/// Scale to TARGET_WIDTH preserving aspect ratio (upscales small images,
/// matching the fixed display width of store cards)
fn resize_to_width(img: DynamicImage, width: u32) -> DynamicImage {
    img.resize(width, u32::MAX, FilterType::Triangle)
}

/// Resize an uploaded photo and persist it under a fresh uuid filename.
/// Returns the filename to store on the record. Decode and pixel work
/// run on the blocking pool.
pub async fn save_resized(uploads_dir: &str, photo: TempFile) -> Result<String, StoreError> {
    let essence = photo
        .content_type
        .as_ref()
        .map(|m| m.essence_str().to_string())
        .unwrap_or_default();
    let ext = extension_from_mime(&essence)?;

    let filename = format!("{}.{}", Uuid::new_v4(), ext);
    let dest: PathBuf = Path::new(uploads_dir).join(&filename);
    let tmp_path = photo.file.path().to_path_buf();

    let result = web::block(move || -> Result<(), StoreError> {
        let img = image::io::Reader::open(&tmp_path)
            .map_err(|e| StoreError::UploadError(format!("Could not open upload: {}", e)))?
            .with_guessed_format()
            .map_err(|e| StoreError::UploadError(format!("Could not open upload: {}", e)))?
            .decode()
            .map_err(|e| StoreError::UploadError(format!("Could not read that image: {}", e)))?;

        let resized = resize_to_width(img, TARGET_WIDTH);

        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::UploadError(format!("Could not store photo: {}", e)))?;
        }
        resized
            .save(&dest)
            .map_err(|e| StoreError::UploadError(format!("Could not store photo: {}", e)))
    })
    .await
    .map_err(|e| {
        log::error!("Photo processing task failed: {}", e);
        StoreError::UploadError("Image processing failed".to_string())
    })?;

    // The temp file handle stays alive until the blocking task is done.
    drop(photo);
    result?;

    log::info!("Stored resized photo {}", filename);
    Ok(filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GenericImageView;

    #[test]
    fn test_extension_from_mime_accepts_images() {
        assert_eq!(extension_from_mime("image/jpeg").unwrap(), "jpg");
        assert_eq!(extension_from_mime("image/png").unwrap(), "png");
    }

    #[test]
    fn test_extension_from_mime_rejects_non_images() {
        assert!(extension_from_mime("application/pdf").is_err());
        assert!(extension_from_mime("text/html").is_err());
        assert!(extension_from_mime("").is_err());
    }

    #[test]
    fn test_resize_to_width_preserves_aspect() {
        let img = DynamicImage::new_rgb8(1600, 1200);
        let resized = resize_to_width(img, TARGET_WIDTH);
        assert_eq!(resized.width(), 800);
        assert_eq!(resized.height(), 600);
    }

    #[test]
    fn test_resize_to_width_upscales_small_images() {
        let img = DynamicImage::new_rgb8(400, 200);
        let resized = resize_to_width(img, TARGET_WIDTH);
        assert_eq!(resized.width(), 800);
        assert_eq!(resized.height(), 400);
    }
}
