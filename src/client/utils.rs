//! Status code classification.

use crate::error::EndpointError;

/// Check if status code indicates access denied
pub fn is_access_denied_status(status: u16) -> bool {
    matches!(status, 401 | 403)
}

/// Check if status code is accepted by `validate_http()`
pub fn is_success_status(status: u16) -> bool {
    (200..400).contains(&status)
}

/// Whether `error` is an HTTP 401 response.
pub fn is_unauthorized(error: &EndpointError) -> bool {
    error.status_code() == Some(401)
}
