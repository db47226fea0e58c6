/// Application Error Handling
///
/// Unified error type for the authentication service, mapping each failure
/// class onto the HTTP contract:
/// - validation errors    -> 422 with the full message list
/// - bad credentials      -> 404
/// - bad refresh token    -> 422
/// - bad access token     -> 401
/// - missing identity     -> 400
/// - everything else      -> 500 with a generic message
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::error::Error as StdError;
use std::fmt;

/// Database operation errors
#[derive(Debug)]
pub enum DatabaseError {
    DuplicateEmail,
    QueryExecution(String),
    ConnectionPool(String),
}

impl fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseError::DuplicateEmail => write!(f, "duplicate email"),
            DatabaseError::QueryExecution(msg) => write!(f, "query error: {}", msg),
            DatabaseError::ConnectionPool(msg) => {
                write!(f, "database connection error: {}", msg)
            }
        }
    }
}

impl StdError for DatabaseError {}

/// Central error type all handlers return
#[derive(Debug)]
pub enum AppError {
    /// Input shape failures, collected so the caller sees every problem at once
    Validation(Vec<String>),
    /// Unknown email or wrong password; the two are indistinguishable on the wire
    InvalidCredentials,
    /// Refresh token missing from the store or past its expiry
    InvalidRefreshToken,
    /// Access token failed signature, expiry, issuer, or audience checks
    InvalidToken,
    /// Bearer token was accepted but carried no usable identity claim
    MissingIdentity,
    Database(DatabaseError),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(errors) => write!(f, "{}", errors.join(" ")),
            AppError::InvalidCredentials => write!(f, "invalid credentials"),
            AppError::InvalidRefreshToken => write!(f, "invalid or expired refresh token"),
            AppError::InvalidToken => write!(f, "invalid or expired access token"),
            AppError::MissingIdentity => write!(f, "missing identity claim"),
            AppError::Database(e) => write!(f, "{}", e),
            AppError::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl StdError for AppError {}

impl From<DatabaseError> for AppError {
    fn from(err: DatabaseError) -> Self {
        AppError::Database(err)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        let error_msg = err.to_string();

        if error_msg.contains("duplicate key") || error_msg.contains("unique constraint") {
            AppError::Database(DatabaseError::DuplicateEmail)
        } else if error_msg.contains("pool") || error_msg.contains("connect") {
            AppError::Database(DatabaseError::ConnectionPool(error_msg))
        } else {
            AppError::Database(DatabaseError::QueryExecution(error_msg))
        }
    }
}

/// Message returned for any unexpected store or signing failure. Internal
/// detail stays in the logs.
const GENERIC_FAILURE: &str = "An error occurred while processing the request.";

/// Message for a duplicate email, whether caught by the pre-check or by the
/// unique constraint on insert.
pub const DUPLICATE_EMAIL: &str = "User with the same email already exists.";

impl AppError {
    fn log_error(&self, request_id: &str) {
        match self {
            AppError::Validation(errors) => {
                tracing::warn!(
                    request_id = request_id,
                    errors = ?errors,
                    "Validation failure"
                );
            }
            AppError::InvalidCredentials => {
                tracing::warn!(request_id = request_id, "Invalid credentials attempt");
            }
            AppError::InvalidRefreshToken => {
                tracing::warn!(request_id = request_id, "Invalid or expired refresh token");
            }
            AppError::InvalidToken => {
                tracing::warn!(request_id = request_id, "Invalid or expired access token");
            }
            AppError::MissingIdentity => {
                tracing::warn!(request_id = request_id, "Missing identity claim");
            }
            AppError::Database(e) => {
                tracing::error!(request_id = request_id, error = %e, "Database error");
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

        match self {
            AppError::Validation(errors) => HttpResponse::UnprocessableEntity().json(errors),
            AppError::InvalidCredentials => {
                HttpResponse::NotFound().json("Invalid email or password. Please try again.")
            }
            AppError::InvalidRefreshToken => {
                HttpResponse::UnprocessableEntity().json("Invalid or expired refresh token.")
            }
            AppError::InvalidToken => {
                HttpResponse::Unauthorized().json("Invalid or expired token.")
            }
            AppError::MissingIdentity => HttpResponse::BadRequest().json("User not authenticated."),
            // A duplicate-email insert that slipped past the pre-check reports
            // the same way the pre-check would have.
            AppError::Database(DatabaseError::DuplicateEmail) => {
                HttpResponse::UnprocessableEntity().json(vec![DUPLICATE_EMAIL.to_string()])
            }
            AppError::Database(_) | AppError::Internal(_) => {
                HttpResponse::InternalServerError().json(GENERIC_FAILURE)
            }
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InvalidCredentials => StatusCode::NOT_FOUND,
            AppError::InvalidRefreshToken => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::MissingIdentity => StatusCode::BAD_REQUEST,
            AppError::Database(DatabaseError::DuplicateEmail) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
