//! Wire types for document responses (REST).

use serde::{Deserialize, Serialize};

use crate::shared::DocumentId;

/// A document as serialized by `/api/documents/` and `/api/upload/`.
///
/// `imageUrl` is only present when the backend could build an absolute URL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentResponse {
    pub id: DocumentId,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub filename: String,
    pub uploaded_at: String,
    pub processing_status: String,
    #[serde(default, rename = "imageUrl", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, alias = "text", skip_serializing_if = "Option::is_none")]
    pub extracted_text: Option<String>,
}
