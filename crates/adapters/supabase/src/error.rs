//! Error mapping for Supabase responses

use reqwest::StatusCode;
use uos_errors::AppError;

/// Pull the human readable message out of a GoTrue or PostgREST error body
///
/// GoTrue answers with `msg` (newer) or `error_description` (older),
/// PostgREST with `message`.
pub fn extract_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;

    ["msg", "message", "error_description", "error"]
        .iter()
        .filter_map(|key| value.get(*key).and_then(|v| v.as_str()))
        .map(str::trim)
        .find(|msg| !msg.is_empty())
        .map(str::to_string)
}

fn message_or_fallback(status: StatusCode, body: &str, context: &str) -> String {
    extract_message(body).unwrap_or_else(|| format!("{}: HTTP {}", context, status.as_u16()))
}

/// Convert a non-success PostgREST response to AppError
pub fn map_rest_error(status: StatusCode, body: &str, context: &str) -> AppError {
    let message = message_or_fallback(status, body, context);

    match status {
        StatusCode::UNAUTHORIZED => AppError::unauthenticated(message),
        StatusCode::FORBIDDEN => AppError::forbidden(message),
        StatusCode::NOT_FOUND => AppError::not_found(message),
        StatusCode::CONFLICT => AppError::conflict(message),
        StatusCode::TOO_MANY_REQUESTS => AppError::resource_exhausted(message),
        // Everything else is a store rejection; surface it as-is
        _ => AppError::database(message),
    }
}

/// Convert a non-success GoTrue response to AppError
pub fn map_auth_error(status: StatusCode, body: &str, context: &str) -> AppError {
    let message = message_or_fallback(status, body, context);

    if status == StatusCode::TOO_MANY_REQUESTS {
        AppError::resource_exhausted(message)
    } else if status.is_client_error() {
        AppError::unauthenticated(message)
    } else {
        AppError::external_service(message)
    }
}

/// Convert a transport failure (connect, timeout, decode) to AppError
pub fn map_transport_error(err: reqwest::Error, context: &str) -> AppError {
    if err.is_timeout() {
        AppError::external_service(format!("{}: request timed out", context))
    } else if err.is_decode() {
        AppError::external_service(format!("{}: invalid response body: {}", context, err))
    } else {
        AppError::external_service(format!("{}: {}", context, err))
    }
}
