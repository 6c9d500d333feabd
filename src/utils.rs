use actix_web::body::EitherBody;
use actix_web::dev::ServiceResponse;
use actix_web::error::InternalError;
use actix_web::error::JsonPayloadError;
use actix_web::http::header;
use actix_web::middleware::ErrorHandlerResponse;
use actix_web::HttpRequest;
use actix_web::HttpResponse;

use crate::contract::ErrorBody;
use crate::contract::INTERNAL_ERROR;
use crate::contract::INVALID_BODY;
use crate::contract::NOT_FOUND;
use crate::contract::PAYLOAD_TOO_LARGE;

/// Print an error followed by every error in its `source` chain. Used for the
/// `Debug` impls of route errors, so that `error.cause_chain` in the logs is
/// actually a chain.
pub fn error_chain_fmt(
    e: &impl std::error::Error,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    writeln!(f, "{}\n", e)?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{}", cause)?;
        current = cause.source();
    }
    Ok(())
}

/// Body over the size limit (413), or one that isn't JSON or has fields of the
/// wrong type (400). Missing fields are -not- handled here; they deserialize
/// to `None` and are rejected by the handler.
pub fn json_error_handler(
    err: JsonPayloadError,
    _req: &HttpRequest,
) -> actix_web::Error {
    let resp = match err {
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            tracing::warn!(error.message = %err, "rejecting oversized body");
            HttpResponse::PayloadTooLarge().json(ErrorBody::new(PAYLOAD_TOO_LARGE))
        }
        _ => {
            tracing::warn!(error.message = %err, "rejecting malformed body");
            HttpResponse::BadRequest().json(ErrorBody::new(INVALID_BODY))
        }
    };
    InternalError::from_response(err, resp).into()
}

/// Catch-all for 500s that were not produced by `ContactError` (those are
/// already JSON), e.g. a failing extractor or middleware. The error body
/// is dropped.
pub fn internal_error_body<B>(
    res: ServiceResponse<B>
) -> actix_web::Result<ErrorHandlerResponse<B>> {
    let is_json = res
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.as_bytes().starts_with(b"application/json"))
        .unwrap_or(false);
    if is_json {
        return Ok(ErrorHandlerResponse::Response(res.map_into_left_body()));
    }

    tracing::error!(path = %res.request().path(), "unhandled server error");
    let (req, _) = res.into_parts();
    let resp = HttpResponse::InternalServerError().json(ErrorBody::new(INTERNAL_ERROR));
    let res: ServiceResponse<EitherBody<B>> = ServiceResponse::new(req, resp).map_into_right_body();
    Ok(ErrorHandlerResponse::Response(res))
}

/// Default service: anything not routed in `startup::run`
pub async fn not_found() -> HttpResponse { HttpResponse::NotFound().json(ErrorBody::new(NOT_FOUND)) }
