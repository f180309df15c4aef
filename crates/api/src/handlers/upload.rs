//! Multipart form reading shared by the upload endpoints.

use std::collections::HashMap;

use axum::extract::Multipart;
use tna_core::image_naming::extension_for_mime;
use tna_core::types::DbId;

use crate::error::{AppError, AppResult};

/// Image types accepted for profile pictures and produto photos.
pub(crate) const STILL_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png", "image/webp"];

/// The `file` part of an upload.
#[derive(Debug)]
pub(crate) struct UploadedFile {
    pub data: Vec<u8>,
    pub content_type: String,
}

/// A parsed multipart body: the `file` part plus every text field.
#[derive(Debug, Default)]
pub(crate) struct UploadForm {
    file: Option<UploadedFile>,
    fields: HashMap<String, String>,
}

impl UploadForm {
    pub async fn read(multipart: &mut Multipart) -> AppResult<Self> {
        let mut form = UploadForm::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
        {
            let name = field.name().unwrap_or("").to_string();
            if name == "file" {
                let content_type = field
                    .content_type()
                    .map(str::to_ascii_lowercase)
                    .unwrap_or_default();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                form.file = Some(UploadedFile {
                    data: data.to_vec(),
                    content_type,
                });
            } else if !name.is_empty() {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                form.fields.insert(name, text.trim().to_string());
            }
        }
        Ok(form)
    }

    /// A required numeric field such as `ensaio_id`.
    pub fn id(&self, name: &str) -> AppResult<DbId> {
        let raw = self
            .fields
            .get(name)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AppError::validation(format!("{name} is required")))?;
        raw.parse()
            .map_err(|_| AppError::validation(format!("{name} must be a number")))
    }

    /// The file part, non-empty and at most `max_bytes` long.
    pub fn into_file(self, max_bytes: usize) -> AppResult<UploadedFile> {
        let file = self
            .file
            .ok_or_else(|| AppError::validation("No file provided"))?;
        if file.data.is_empty() {
            return Err(AppError::validation("File is empty"));
        }
        if file.data.len() > max_bytes {
            return Err(AppError::validation(format!(
                "File exceeds the {} MB limit",
                max_bytes / (1024 * 1024)
            )));
        }
        Ok(file)
    }
}

impl UploadedFile {
    /// Extension for an image whose MIME type is in `allowed`.
    pub fn image_extension(&self, allowed: &[&str]) -> AppResult<&'static str> {
        if !allowed.contains(&self.content_type.as_str()) {
            return Err(AppError::validation(format!(
                "Unsupported file type. Accepted: {}",
                allowed.join(", ")
            )));
        }
        extension_for_mime(&self.content_type)
            .ok_or_else(|| AppError::validation("Unsupported file type"))
    }

    /// PDF documents are recognised by MIME type or by their `%PDF` header.
    pub fn is_pdf(&self) -> bool {
        self.content_type == "application/pdf" || self.data.starts_with(b"%PDF")
    }
}
