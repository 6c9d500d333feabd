use actix_web::http::header;
use actix_web::HttpResponse;

/// `OPTIONS /api/contact`
///
/// CORS pre-flight for the browser frontend. `Access-Control-Allow-Origin` is
/// added to every response by `startup::run`, so only the method and header
/// allowances are set here.
pub async fn contact_preflight() -> HttpResponse {
    HttpResponse::NoContent()
        .insert_header((header::ACCESS_CONTROL_ALLOW_METHODS, "POST, OPTIONS"))
        .insert_header((header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"))
        .insert_header((header::ACCESS_CONTROL_MAX_AGE, "86400"))
        .finish()
}
