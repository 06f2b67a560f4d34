//! Document domain — uploaded scans, OCR status, extracted text.

pub mod client;
pub mod convert;
pub mod wire;

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::{DocumentId, Language};

/// Server-side OCR state of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    Pending,
    Processing,
    Complete,
    OcrFailed,
}

impl ProcessingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Complete => "complete",
            Self::OcrFailed => "ocr_failed",
        }
    }

    /// Whether the backend is done with this document, successfully or not.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::OcrFailed)
    }
}

impl fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProcessingStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "complete" => Ok(Self::Complete),
            "ocr_failed" => Ok(Self::OcrFailed),
            other => Err(ValidationError::InvalidStatus(other.to_string())),
        }
    }
}

/// An uploaded document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: DocumentId,
    /// Backend-relative image path.
    pub image: String,
    pub filename: String,
    pub uploaded_at: DateTime<Utc>,
    pub processing_status: ProcessingStatus,
    /// Absolute image URL, when the backend provides one.
    pub image_url: Option<String>,
    pub extracted_text: Option<String>,
}

/// Partial update sent with `PATCH /api/documents/:id/`. Unset fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DocumentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_text: Option<String>,
}

impl DocumentUpdate {
    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn extracted_text(mut self, text: impl Into<String>) -> Self {
        self.extracted_text = Some(text.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.filename.is_none() && self.extracted_text.is_none()
    }
}

/// An image to submit for OCR.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub file_name: String,
    pub mime: String,
    pub bytes: Bytes,
    pub language: Language,
}

impl UploadRequest {
    /// Build an upload, guessing the MIME type from the file name.
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        let file_name = file_name.into();
        Self {
            mime: guess_image_mime(&file_name).to_string(),
            file_name,
            bytes: bytes.into(),
            language: Language::default(),
        }
    }

    pub fn language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = mime.into();
        self
    }
}

/// MIME type for common scan formats; `application/octet-stream` otherwise.
pub fn guess_image_mime(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        "tif" | "tiff" => "image/tiff",
        _ => "application/octet-stream",
    }
}

#[derive(Debug)]
pub enum ValidationError {
    Multiple(String, Vec<ValidationError>),
    InvalidTimestamp(String),
    InvalidStatus(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Multiple(id, errors) => {
                writeln!(f, "Document validation errors ({id}):")?;
                for err in errors {
                    writeln!(f, "  - {}", err)?;
                }
                Ok(())
            }
            ValidationError::InvalidTimestamp(raw) => write!(f, "Invalid uploaded_at: {raw}"),
            ValidationError::InvalidStatus(raw) => write!(f, "Invalid processing_status: {raw}"),
        }
    }
}

impl std::error::Error for ValidationError {}
