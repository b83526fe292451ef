/// Multipart form handling and image storage
///
/// The category and product forms arrive as multipart: text fields plus
/// an optional image file. This module walks the form once, collecting
/// text fields into a map and writing the image (if any) to the upload
/// directory under a generated name.
///
/// # Stored Filenames
///
/// `{epoch_millis}-{random}{ext}` — the original filename is discarded
/// apart from its extension, so uploads can never collide with or
/// overwrite each other.
///
/// # Limits
///
/// Images only (jpeg, png, gif, webp), at most 5 MiB.

use axum::extract::Multipart;
use chrono::Utc;
use mime::Mime;
use rand::Rng;
use std::collections::HashMap;
use std::path::Path;
use tokio::fs;

use crate::error::ApiError;

/// Maximum accepted image size in bytes (5 MiB)
const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// An image written to the upload directory
#[derive(Debug, Clone)]
pub struct StoredFile {
    /// Generated filename, relative to the upload directory
    pub filename: String,
}

/// A fully collected multipart form
#[derive(Debug, Default)]
pub struct FormPayload {
    /// Text fields by name
    pub fields: HashMap<String, String>,

    /// The stored image, when the file field was present
    pub file: Option<StoredFile>,
}

impl FormPayload {
    /// Text field by name, trimmed; None when absent or empty
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

/// Collects a multipart form, storing the named file field to disk
///
/// # Errors
///
/// Returns `ApiError::BadRequest` for an unreadable form, an oversized
/// image, or a non-image content type, and `ApiError::Internal` when the
/// file cannot be written.
pub async fn collect_form(
    mut multipart: Multipart,
    file_field: &str,
    upload_dir: &str,
) -> Result<FormPayload, ApiError> {
    let mut payload = FormPayload::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart form: {}", e)))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == file_field && field.file_name().is_some() {
            let original_name = field.file_name().unwrap_or("upload").to_string();
            let content_type: Option<Mime> =
                field.content_type().and_then(|ct| ct.parse().ok());

            if let Some(ct) = &content_type {
                if !is_allowed_image(ct) {
                    return Err(ApiError::BadRequest(
                        "Only jpeg, png, gif and webp images are allowed".to_string(),
                    ));
                }
            }

            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;

            if data.len() > MAX_IMAGE_BYTES {
                return Err(ApiError::BadRequest(
                    "Image exceeds the 5 MB size limit".to_string(),
                ));
            }

            let filename = generate_filename(&original_name);
            let filepath = Path::new(upload_dir).join(&filename);

            fs::create_dir_all(upload_dir)
                .await
                .map_err(|e| ApiError::Internal(format!("Failed to create upload dir: {}", e)))?;
            fs::write(&filepath, &data)
                .await
                .map_err(|e| ApiError::Internal(format!("Failed to store upload: {}", e)))?;

            payload.file = Some(StoredFile { filename });
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Malformed form field: {}", e)))?;
            payload.fields.insert(name, value);
        }
    }

    Ok(payload)
}

/// Generates a collision-free stored filename, keeping the extension
fn generate_filename(original: &str) -> String {
    let ext = Path::new(original)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default();

    let unique: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
    format!("{}-{}{}", Utc::now().timestamp_millis(), unique, ext)
}

fn is_allowed_image(ct: &Mime) -> bool {
    ct.type_() == mime::IMAGE
        && matches!(ct.subtype().as_str(), "jpeg" | "png" | "gif" | "webp")
}
