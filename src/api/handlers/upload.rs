use axum::extract::Multipart;

use crate::errors::AppError;

/// Multipart field that carries the uploaded file.
pub const FILE_FIELD: &str = "file";

/// Read the whole `file` field of a multipart upload. Other fields are skipped.
pub async fn read_file_field(mut multipart: Multipart) -> Result<Vec<u8>, AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let bytes = field.bytes().await?;
        tracing::debug!(
            file_name = file_name.as_deref().unwrap_or("-"),
            size = bytes.len(),
            "Upload received"
        );
        return Ok(bytes.to_vec());
    }

    Err(AppError::BadRequest(format!(
        "multipart field `{FILE_FIELD}` is required"
    )))
}
