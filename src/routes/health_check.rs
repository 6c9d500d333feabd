use actix_web::HttpResponse;
use serde_json::json;

/// `GET /api/health`
///
/// Liveness only; the mail server is not contacted.
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "message": "Backend is running!" }))
}
