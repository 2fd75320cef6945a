use axum::extract::{Multipart, State};
use axum::Json;

use super::upload::read_file_field;
use crate::errors::AppError;
use crate::inference::{binary_response, Outcome};
use crate::models::BinaryVerdict;
use crate::AppState;

/// POST /predict_malware: multipart upload of a candidate executable.
///
/// Parsing and inference are CPU-bound, so they run on the blocking pool.
pub async fn predict(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<BinaryVerdict>, AppError> {
    let bytes = read_file_field(multipart).await?;
    let pipeline = state.pipeline.clone();

    let verdict = match tokio::task::spawn_blocking(move || pipeline.classify_binary(&bytes)).await {
        Ok(verdict) => verdict,
        Err(e) => {
            tracing::error!(error = %e, "Binary classification worker failed");
            binary_response(Outcome::Aborted(e.to_string()))
        }
    };

    Ok(Json(verdict))
}
