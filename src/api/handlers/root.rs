use axum::Json;
use serde_json::{json, Value};

pub const ENDPOINTS: [&str; 3] = ["/predict_email_text", "/predict_email_file", "/predict_malware"];

/// GET /: service discovery.
pub async fn index() -> Json<Value> {
    Json(json!({
        "message": "XTRA Secure API is live!",
        "health": "/health",
        "endpoints": ENDPOINTS,
    }))
}
