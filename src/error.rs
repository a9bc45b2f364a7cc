use std::fmt;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Unauthorized(String),
    Forbidden(String),
    ServerError(String),
    ValidationError(String),
    NetworkError(reqwest::Error),
    DecodeError(String),
    AuthError(String),
    ExportError(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::ServerError(msg) => write!(f, "Server Error: {}", msg),
            ApiError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            ApiError::NetworkError(err) => write!(f, "Network Error: {}", err),
            ApiError::DecodeError(msg) => write!(f, "Decode Error: {}", msg),
            ApiError::AuthError(msg) => write!(f, "Auth Error: {}", msg),
            ApiError::ExportError(msg) => write!(f, "Export Error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::NetworkError(err)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::DecodeError(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for ApiError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        ApiError::ExportError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::ValidationError(err.to_string())
    }
}

impl ApiError {
    pub fn invalid_scan_payload(payload: &str) -> Self {
        ApiError::BadRequest(format!("Unrecognized scan payload: '{}'", payload))
    }

    pub fn session_expired() -> Self {
        ApiError::AuthError("Session expired, please log in again".to_string())
    }

    /// True for the auth family of failures that must clear the local session.
    pub fn requires_relogin(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_) | ApiError::AuthError(_))
    }
}

// Client-side validation, applied before any network call

pub fn validate_quantity(quantity: f64) -> Result<(), ApiError> {
    if !quantity.is_finite() {
        return Err(ApiError::ValidationError("Quantity must be a number".to_string()));
    }
    if quantity <= 0.0 {
        return Err(ApiError::ValidationError("Quantity must be positive".to_string()));
    }
    if quantity > 1e9 {
        return Err(ApiError::ValidationError("Quantity too large".to_string()));
    }
    Ok(())
}

pub fn validate_required(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::ValidationError(format!("{} is required", field)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1.0).is_ok());
        assert!(validate_quantity(0.001).is_ok());
        assert!(validate_quantity(0.0).is_err());
        assert!(validate_quantity(-3.0).is_err());
        assert!(validate_quantity(f64::NAN).is_err());
        assert!(validate_quantity(2e9).is_err());
    }

    #[test]
    fn test_validate_required() {
        assert!(validate_required("Name", "reagent A").is_ok());
        assert!(validate_required("Name", "").is_err());
        assert!(validate_required("Name", "   ").is_err());
    }

    #[test]
    fn test_requires_relogin() {
        assert!(ApiError::Unauthorized("bad token".into()).requires_relogin());
        assert!(ApiError::session_expired().requires_relogin());
        assert!(!ApiError::NotFound("x".into()).requires_relogin());
    }
}
