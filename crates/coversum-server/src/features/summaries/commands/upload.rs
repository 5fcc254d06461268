use crate::forward::{ForwardError, Forwarder};
use crate::store::{NewSummary, SharedSummaryStore, StoreError};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::Serialize;

/// Maximum accepted image size: 5 MiB.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Media types accepted for cover images.
pub const ALLOWED_IMAGE_TYPES: [&str; 4] =
    ["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Fallback record name when the upload carries no filename.
pub const DEFAULT_BOOK_NAME: &str = "book-cover";

/// Check a multipart field's media type against the image allow-list.
pub fn is_allowed_image_type(content_type: &str) -> bool {
    ALLOWED_IMAGE_TYPES
        .iter()
        .any(|allowed| content_type.eq_ignore_ascii_case(allowed))
}

#[derive(Debug, Clone)]
pub struct UploadCoverCommand {
    pub book_name: String,
    pub content_type: String,
    pub content: Vec<u8>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadCoverResponse {
    pub message: String,
    pub id: i32,
}

#[derive(Debug, thiserror::Error)]
pub enum UploadCoverError {
    #[error("No file was uploaded")]
    FileMissing,

    #[error("Invalid file type '{0}': only jpeg, png, gif and webp images are accepted")]
    UnsupportedMediaType(String),

    #[error("File exceeds the 5 MiB upload limit")]
    TooLarge,

    #[error("Database error: {0}")]
    Store(#[from] StoreError),

    /// Record `id` was persisted, but the webhook call did not go
    /// through. The record stays in its processing state.
    #[error("Cover was stored but could not be dispatched for processing: {source}")]
    Forward {
        id: i32,
        #[source]
        source: ForwardError,
    },
}

impl UploadCoverCommand {
    pub fn validate(&self) -> Result<(), UploadCoverError> {
        if self.content.is_empty() {
            return Err(UploadCoverError::FileMissing);
        }
        if !is_allowed_image_type(&self.content_type) {
            return Err(UploadCoverError::UnsupportedMediaType(self.content_type.clone()));
        }
        if self.content.len() > MAX_IMAGE_BYTES {
            return Err(UploadCoverError::TooLarge);
        }
        Ok(())
    }
}

/// Accept an upload: persist the record, then forward the bytes.
///
/// The record is created before the forwarding call and is never rolled
/// back; a forwarding failure surfaces as [`UploadCoverError::Forward`]
/// carrying the already-assigned id.
#[tracing::instrument(
    skip(store, forwarder, command),
    fields(book_name = %command.book_name, content_type = %command.content_type, bytes = command.content.len())
)]
pub async fn handle(
    store: SharedSummaryStore,
    forwarder: Forwarder,
    command: UploadCoverCommand,
) -> Result<UploadCoverResponse, UploadCoverError> {
    command.validate()?;

    // Self-describing reference to the submitted bytes.
    let image_url = format!(
        "data:{};base64,{}",
        command.content_type,
        BASE64.encode(&command.content)
    );

    let summary = store
        .create(NewSummary {
            book_name: command.book_name.clone(),
            image_url,
        })
        .await?;

    tracing::info!(id = summary.id, "Cover stored, dispatching to webhook");

    if let Err(source) = forwarder
        .forward(&command.book_name, &command.content_type, command.content)
        .await
    {
        return Err(UploadCoverError::Forward {
            id: summary.id,
            source,
        });
    }

    Ok(UploadCoverResponse {
        message: "File uploaded successfully".to_string(),
        id: summary.id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(content_type: &str, content: Vec<u8>) -> UploadCoverCommand {
        UploadCoverCommand {
            book_name: "cover.png".to_string(),
            content_type: content_type.to_string(),
            content,
        }
    }

    #[test]
    fn test_validation_success() {
        let cmd = command("image/png", vec![1, 2, 3]);
        assert!(cmd.validate().is_ok());
    }

    #[test]
    fn test_validation_empty_content() {
        let cmd = command("image/png", vec![]);
        assert!(matches!(cmd.validate(), Err(UploadCoverError::FileMissing)));
    }

    #[test]
    fn test_validation_unsupported_media_type() {
        let cmd = command("text/plain", vec![1, 2, 3]);
        assert!(matches!(
            cmd.validate(),
            Err(UploadCoverError::UnsupportedMediaType(_))
        ));
    }

    #[test]
    fn test_validation_size_boundary() {
        let at_limit = command("image/jpeg", vec![0u8; MAX_IMAGE_BYTES]);
        assert!(at_limit.validate().is_ok());

        let over_limit = command("image/jpeg", vec![0u8; MAX_IMAGE_BYTES + 1]);
        assert!(matches!(over_limit.validate(), Err(UploadCoverError::TooLarge)));
    }

    #[test]
    fn test_allow_list_is_case_insensitive() {
        assert!(is_allowed_image_type("image/PNG"));
        assert!(is_allowed_image_type("image/webp"));
        assert!(!is_allowed_image_type("image/tiff"));
        assert!(!is_allowed_image_type("application/pdf"));
    }

    #[test]
    fn test_media_type_error_names_the_offender() {
        let cmd = command("text/plain", vec![1]);
        let err = cmd.validate().unwrap_err();
        assert!(err.to_string().contains("text/plain"));
        assert!(err.to_string().contains("file type"));
    }
}
