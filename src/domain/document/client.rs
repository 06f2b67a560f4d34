//! Documents sub-client — list, fetch, edit, delete, upload.

use std::path::Path;

use crate::client::DigitizerClient;
use crate::domain::document::wire::DocumentResponse;
use crate::domain::document::{self, Document, DocumentUpdate, UploadRequest};
use crate::error::SdkError;
use crate::http::{FormPart, RetryPolicy};
use crate::network::{document_path, DOCUMENTS_PATH, UPLOAD_PATH};
use crate::shared::{DocumentId, Language};

pub struct Documents<'a> {
    pub(crate) client: &'a DigitizerClient,
}

impl<'a> Documents<'a> {
    /// All documents owned by the current user.
    pub async fn list(&self) -> Result<Vec<Document>, SdkError> {
        let resp: Vec<DocumentResponse> = self
            .client
            .http
            .get(DOCUMENTS_PATH, RetryPolicy::Idempotent)
            .await?;
        resp.into_iter().map(to_domain).collect()
    }

    /// A single document. Missing or foreign ids surface as `HttpError::NotFound`.
    pub async fn get(&self, id: DocumentId) -> Result<Document, SdkError> {
        let resp: DocumentResponse = self
            .client
            .http
            .get(&document_path(id.get()), RetryPolicy::Idempotent)
            .await?;
        to_domain(resp)
    }

    pub async fn update(
        &self,
        id: DocumentId,
        update: &DocumentUpdate,
    ) -> Result<Document, SdkError> {
        if update.is_empty() {
            return Err(SdkError::Validation(
                "document update has no fields set".to_string(),
            ));
        }
        let resp: DocumentResponse = self
            .client
            .http
            .patch(&document_path(id.get()), update)
            .await?;
        to_domain(resp)
    }

    pub async fn delete(&self, id: DocumentId) -> Result<(), SdkError> {
        self.client.http.delete(&document_path(id.get())).await?;
        tracing::info!(document_id = %id, "Deleted document");
        Ok(())
    }

    /// Submit an image for OCR as `multipart/form-data` (`image` + `language`).
    pub async fn upload(&self, request: UploadRequest) -> Result<Document, SdkError> {
        let size = request.bytes.len();
        let parts = vec![
            FormPart::File {
                name: "image".to_string(),
                file_name: request.file_name.clone(),
                mime: request.mime,
                bytes: request.bytes,
            },
            FormPart::Text {
                name: "language".to_string(),
                value: request.language.as_str().to_string(),
            },
        ];
        let resp: DocumentResponse = self.client.http.post_multipart(UPLOAD_PATH, parts).await?;
        let doc = to_domain(resp)?;
        tracing::info!(
            document_id = %doc.id,
            file_name = %request.file_name,
            size,
            status = %doc.processing_status,
            "Uploaded document"
        );
        Ok(doc)
    }

    /// Read an image from disk and upload it.
    pub async fn upload_file(
        &self,
        path: impl AsRef<Path>,
        language: Language,
    ) -> Result<Document, SdkError> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                SdkError::Validation(format!("not a file path: {}", path.display()))
            })?
            .to_string();
        let bytes = std::fs::read(path)?;
        self.upload(UploadRequest::new(file_name, bytes).language(language))
            .await
    }
}

fn to_domain(resp: DocumentResponse) -> Result<Document, SdkError> {
    resp.try_into()
        .map_err(|e: document::ValidationError| SdkError::Validation(e.to_string()))
}
