use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::Json;

use super::upload::read_file_field;
use crate::errors::AppError;
use crate::inference::{text_response, Outcome};
use crate::models::{EmailRequest, TextVerdict};
use crate::pipeline::ClassificationPipeline;
use crate::AppState;

/// POST /predict_email_text: JSON `{ "text": ... }`.
pub async fn predict_text(
    State(state): State<AppState>,
    body: Result<Json<EmailRequest>, JsonRejection>,
) -> Result<Json<TextVerdict>, AppError> {
    let Json(request) = body?;
    let verdict = run_blocking(&state, move |pipeline| pipeline.classify_text(&request.text)).await;
    Ok(Json(verdict))
}

/// POST /predict_email_file: multipart upload of a raw email.
pub async fn predict_file(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<TextVerdict>, AppError> {
    let bytes = read_file_field(multipart).await?;
    let verdict = run_blocking(&state, move |pipeline| {
        pipeline.classify_text_from_upload(&bytes)
    })
    .await;
    Ok(Json(verdict))
}

/// Tokenising a large body is CPU-bound, so scoring runs on the blocking pool.
async fn run_blocking<F>(state: &AppState, job: F) -> TextVerdict
where
    F: FnOnce(&ClassificationPipeline) -> TextVerdict + Send + 'static,
{
    let pipeline = state.pipeline.clone();

    match tokio::task::spawn_blocking(move || job(&*pipeline)).await {
        Ok(verdict) => verdict,
        Err(e) => {
            tracing::error!(error = %e, "Text classification worker failed");
            text_response(Outcome::Aborted(e.to_string()))
        }
    }
}
