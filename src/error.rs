/// Error Handling Module
///
/// One error vocabulary for the whole service:
/// 1. Domain-specific error types (store, auth, validation)
/// 2. A unified `AppError` used for control flow with `?`
/// 3. HTTP response mapping with structured logging
/// 4. Error context for operation-scoped log lines

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::error::Error as StdError;
use std::fmt;

/// ============================================================================
/// 1. DOMAIN-SPECIFIC ERROR TYPES
/// ============================================================================

/// Input validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    EmptyField(String),
    TooLong(String, usize),
    InvalidFormat(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyField(field) => write!(f, "{} is empty", field),
            ValidationError::TooLong(field, max) => {
                write!(f, "{} is too long (maximum {} characters)", field, max)
            }
            ValidationError::InvalidFormat(field) => write!(f, "{} has invalid format", field),
        }
    }
}

impl StdError for ValidationError {}

/// Record store failures
#[derive(Debug)]
pub enum StoreError {
    /// The store file could not be read, written, or replaced
    IoFailure(String),
    /// The store file exists but does not hold a valid document
    CorruptStore(String),
    /// The in-memory document could not be encoded
    Serialization(String),
    /// No identifier is left for a new record of this kind
    IdsExhausted(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::IoFailure(msg) => write!(f, "Store I/O failure: {}", msg),
            StoreError::CorruptStore(msg) => write!(f, "Store is corrupt: {}", msg),
            StoreError::Serialization(msg) => write!(f, "Store serialization failed: {}", msg),
            StoreError::IdsExhausted(kind) => write!(f, "No {} ids left", kind),
        }
    }
}

impl StdError for StoreError {}

/// Authentication and session errors
#[derive(Debug, Clone, PartialEq)]
pub enum AuthError {
    InvalidCredentials,
    InvalidOrExpiredSession,
    InvalidSignature,
    Expired,
    Malformed,
    MissingCredential,
    InvalidApiKey,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InvalidCredentials => write!(f, "Invalid credentials"),
            AuthError::InvalidOrExpiredSession => write!(f, "Invalid or expired session"),
            AuthError::InvalidSignature => write!(f, "Token signature is invalid"),
            AuthError::Expired => write!(f, "Token has expired"),
            AuthError::Malformed => write!(f, "Token is malformed"),
            AuthError::MissingCredential => write!(f, "Missing authorization credential"),
            AuthError::InvalidApiKey => write!(f, "Invalid API key"),
        }
    }
}

impl StdError for AuthError {}

/// ============================================================================
/// 2. UNIFIED APPLICATION ERROR TYPE
/// ============================================================================

/// Central error type returned by every public operation
#[derive(Debug)]
pub enum AppError {
    Validation(ValidationError),
    Store(StoreError),
    Auth(AuthError),
    NotFound(String),
    Forbidden(String),
    Conflict(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(e) => write!(f, "{}", e),
            AppError::Store(e) => write!(f, "{}", e),
            AppError::Auth(e) => write!(f, "{}", e),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl StdError for AppError {}

// ============================================================================
// FROM IMPLEMENTATIONS
// ============================================================================

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Store(err)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Auth(err)
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Internal(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Internal(msg.to_string())
    }
}

// ============================================================================
// 3. HTTP RESPONSE MAPPING
// ============================================================================

/// Error body returned to HTTP clients
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    /// Unique error ID for correlating with server logs
    pub error_id: String,
    pub message: String,
    /// Machine-readable error code
    pub code: String,
    pub status: u16,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_id: String, message: String, code: String, status: u16) -> Self {
        Self {
            error_id,
            message,
            code,
            status,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Converts errors to HTTP responses and logs them at the right level
pub trait ErrorHandler {
    fn error_response(&self, request_id: &str) -> (StatusCode, ErrorResponse);
    fn log_error(&self, request_id: &str);
}

impl AppError {
    fn code_and_message(&self) -> (&'static str, String) {
        match self {
            AppError::Validation(e) => ("VALIDATION_ERROR", e.to_string()),
            // Store details stay in the logs
            AppError::Store(_) => ("STORE_ERROR", "Internal server error".to_string()),
            AppError::Auth(e) => match e {
                AuthError::InvalidCredentials => ("INVALID_CREDENTIALS", e.to_string()),
                AuthError::InvalidOrExpiredSession => ("SESSION_INVALID", e.to_string()),
                AuthError::InvalidSignature | AuthError::Expired | AuthError::Malformed => {
                    ("TOKEN_INVALID", "Invalid or expired token".to_string())
                }
                AuthError::MissingCredential => ("MISSING_TOKEN", e.to_string()),
                AuthError::InvalidApiKey => ("INVALID_API_KEY", e.to_string()),
            },
            AppError::NotFound(_) => ("NOT_FOUND", self.to_string()),
            AppError::Forbidden(_) => ("FORBIDDEN", self.to_string()),
            AppError::Conflict(_) => ("CONFLICT", self.to_string()),
            AppError::Internal(_) => ("INTERNAL_ERROR", "Internal server error".to_string()),
        }
    }
}

impl ErrorHandler for AppError {
    fn error_response(&self, request_id: &str) -> (StatusCode, ErrorResponse) {
        let status = self.status_code();
        let (code, message) = self.code_and_message();

        let error_response = ErrorResponse::new(
            request_id.to_string(),
            message,
            code.to_string(),
            status.as_u16(),
        );

        (status, error_response)
    }

    fn log_error(&self, request_id: &str) {
        match self {
            AppError::Validation(e) => {
                tracing::warn!(request_id = request_id, error = %e, "Validation error");
            }
            AppError::Store(e) => {
                tracing::error!(request_id = request_id, error = %e, "Store error");
            }
            AppError::Auth(e) => {
                tracing::warn!(request_id = request_id, error = %e, "Authentication error");
            }
            AppError::NotFound(_) | AppError::Forbidden(_) | AppError::Conflict(_) => {
                tracing::info!(request_id = request_id, error = %self, "Request rejected");
            }
            AppError::Internal(msg) => {
                tracing::error!(request_id = request_id, error = %msg, "Internal error");
            }
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let request_id = uuid::Uuid::new_v4().to_string();
        self.log_error(&request_id);

        let (status, error_response) = <Self as ErrorHandler>::error_response(self, &request_id);

        HttpResponse::build(status).json(error_response)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// ============================================================================
// 4. ERROR CONTEXT ENRICHMENT
// ============================================================================

/// Operation-scoped context attached to log lines
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub request_id: String,
    pub user_id: Option<String>,
    pub operation: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            user_id: None,
            operation: operation.into(),
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn with_user_id(mut self, user_id: impl ToString) -> Self {
        self.user_id = Some(user_id.to_string());
        self
    }

    /// Log `error` with this context and hand it back, for use in `map_err`
    pub fn log_error(&self, error: AppError) -> AppError {
        let context = serde_json::json!({
            "request_id": self.request_id,
            "operation": self.operation,
            "user_id": self.user_id,
            "timestamp": self.timestamp.to_rfc3339(),
        });

        match &error {
            AppError::Store(_) | AppError::Internal(_) => {
                tracing::error!(error = %error, context = ?context, "Operation failed");
            }
            _ => {
                tracing::warn!(error = %error, context = ?context, "Operation rejected");
            }
        }

        error
    }
}
