use axum::http::StatusCode;

/// Health check endpoint to verify API status
pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "Healthy!")
}
