use chrono::{DateTime, Utc};
use std::io;
use std::path::Path;
use thiserror::Error;
use uuid::Uuid;

/// Public path prefix under which stored photos are served.
pub const PUBLIC_PREFIX: &str = "/uploads";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoKind {
    Jpeg,
    Png,
    Webp,
}

impl PhotoKind {
    /// Accepts `image/jpeg`, `image/jpg`, `image/png` and `image/webp`,
    /// ignoring parameters and case.
    pub fn from_content_type(value: &str) -> Option<Self> {
        let mime = value.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
        match mime.as_str() {
            "image/jpeg" | "image/jpg" => Some(PhotoKind::Jpeg),
            "image/png" => Some(PhotoKind::Png),
            "image/webp" => Some(PhotoKind::Webp),
            _ => None,
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(PhotoKind::Jpeg),
            "png" => Some(PhotoKind::Png),
            "webp" => Some(PhotoKind::Webp),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            PhotoKind::Jpeg => "jpg",
            PhotoKind::Png => "png",
            PhotoKind::Webp => "webp",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            PhotoKind::Jpeg => "image/jpeg",
            PhotoKind::Png => "image/png",
            PhotoKind::Webp => "image/webp",
        }
    }
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Invalid file type. Use JPG, PNG or WebP")]
    UnsupportedType,
    #[error("File is empty")]
    Empty,
    #[error("File exceeds the {max} byte limit")]
    TooLarge { max: usize },
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub fn validate_photo(content_type: Option<&str>, len: usize, max: usize) -> Result<PhotoKind, UploadError> {
    let kind = content_type
        .and_then(PhotoKind::from_content_type)
        .ok_or(UploadError::UnsupportedType)?;
    if len == 0 {
        return Err(UploadError::Empty);
    }
    if len > max {
        return Err(UploadError::TooLarge { max });
    }
    Ok(kind)
}

/// `<user_id>-<unix millis>-<random>.<ext>`
pub fn photo_file_name(user_id: u64, now: DateTime<Utc>, kind: PhotoKind) -> String {
    format!(
        "{}-{}-{}.{}",
        user_id,
        now.timestamp_millis(),
        Uuid::new_v4().to_simple(),
        kind.extension()
    )
}

pub fn public_url(file_name: &str) -> String {
    format!("{}/{}", PUBLIC_PREFIX, file_name)
}

/// Only names this module could have produced: no separators, no leading dot.
pub fn is_safe_file_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
}

pub fn save_photo(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<(), UploadError> {
    std::fs::create_dir_all(dir)?;
    std::fs::write(dir.join(file_name), bytes)?;
    Ok(())
}

/// Reads a stored photo; `None` when the name is unsafe, unknown or not an image.
pub fn read_photo(dir: &Path, file_name: &str) -> Result<Option<(Vec<u8>, PhotoKind)>, UploadError> {
    if !is_safe_file_name(file_name) {
        return Ok(None);
    }
    let kind = match Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .and_then(PhotoKind::from_extension)
    {
        Some(kind) => kind,
        None => return Ok(None),
    };
    match std::fs::read(dir.join(file_name)) {
        Ok(bytes) => Ok(Some((bytes, kind))),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}
