use std::io::Read;

use axum_typed_multipart::FieldData;
use tempfile::NamedTempFile;

use crate::middleware::error::{AppError, CtxResult};

const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "webp", "heic"];

pub fn sanitize_filename(file_name: &str) -> String {
    let bad_chars = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];
    let mut result = file_name.to_owned();
    for &ch in &bad_chars {
        result = result.replace(ch, "_");
    }
    result
}

#[derive(Debug)]
pub struct FileUpload {
    pub content_type: Option<String>,
    pub file_name: String,
    pub data: Vec<u8>,
    pub extension: String,
}

/// Reads a multipart image field, rejecting anything that is not a photo.
pub fn convert_field_file_data(data: FieldData<NamedTempFile>) -> CtxResult<FileUpload> {
    let content_type = data.metadata.content_type;

    let file_name = data.metadata.file_name.ok_or(AppError::Validation {
        description: "file name missing".to_string(),
    })?;

    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .filter(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
        .ok_or(AppError::Validation {
            description: format!("unsupported image type, expected one of {IMAGE_EXTENSIONS:?}"),
        })?;

    if let Some(ct) = content_type.as_deref() {
        if !ct.starts_with("image/") && ct != "application/octet-stream" {
            return Err(AppError::Validation {
                description: format!("unsupported content type {ct}"),
            }
            .into());
        }
    }

    let mut buffer = Vec::new();
    let mut file = data.contents.as_file();
    file.read_to_end(&mut buffer).map_err(|e| AppError::Generic {
        description: e.to_string(),
    })?;
    if buffer.is_empty() {
        return Err(AppError::Validation {
            description: "empty image".to_string(),
        }
        .into());
    }

    Ok(FileUpload {
        content_type,
        file_name: sanitize_filename(&file_name),
        data: buffer,
        extension,
    })
}
