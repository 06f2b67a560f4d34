//! Conversions from wire types to domain types for documents.

use chrono::{DateTime, Utc};

use super::wire::DocumentResponse;
use super::{Document, ProcessingStatus, ValidationError};

impl TryFrom<DocumentResponse> for Document {
    type Error = ValidationError;

    fn try_from(d: DocumentResponse) -> Result<Self, Self::Error> {
        let mut errors: Vec<ValidationError> = Vec::new();

        let uploaded_at = match DateTime::parse_from_rfc3339(&d.uploaded_at) {
            Ok(ts) => Some(ts.with_timezone(&Utc)),
            Err(_) => {
                errors.push(ValidationError::InvalidTimestamp(d.uploaded_at.clone()));
                None
            }
        };
        let processing_status = match d.processing_status.parse::<ProcessingStatus>() {
            Ok(status) => Some(status),
            Err(_) => {
                errors.push(ValidationError::InvalidStatus(d.processing_status.clone()));
                None
            }
        };

        match (uploaded_at, processing_status) {
            (Some(uploaded_at), Some(processing_status)) => Ok(Document {
                id: d.id,
                image: d.image.unwrap_or_default(),
                filename: d.filename,
                uploaded_at,
                processing_status,
                image_url: d.image_url,
                extracted_text: d.extracted_text,
            }),
            _ if errors.len() == 1 => Err(errors.remove(0)),
            _ => Err(ValidationError::Multiple(d.id.to_string(), errors)),
        }
    }
}
