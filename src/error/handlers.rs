//! Standardized diagnostics for HTTP statuses and transport failures

use reqwest::StatusCode;

/// Human-readable description of a failed registry response
pub fn describe_status(status: StatusCode, body: &str, service: &str) -> String {
    match status.as_u16() {
        400 => format!("Bad request to '{}': {}", service, body),
        401 => format!("Unauthorized for '{}': {}", service, body),
        403 => format!("Forbidden: insufficient permissions for '{}': {}", service, body),
        404 => format!("Service '{}' not found: {}", service, body),
        429 => format!("Rate limited by '{}': {}", service, body),
        500 => format!("Registry server error in '{}': {}", service, body),
        502 | 503 => format!("Registry unavailable for '{}': {}", service, body),
        504 => format!("Registry gateway timeout for '{}': {}", service, body),
        _ => format!("'{}' failed (status {}): {}", service, status, body),
    }
}

/// Categorize a transport-level error with the operation it interrupted
pub fn describe_transport(error: &reqwest::Error, context: &str) -> String {
    if error.is_timeout() {
        format!("{} timeout: {}", context, error)
    } else if error.is_connect() {
        format!("Connection error during {}: {}", context, error)
    } else if error.is_decode() {
        format!("Could not decode {} response: {}", context, error)
    } else {
        format!("{} network error: {}", context, error)
    }
}
