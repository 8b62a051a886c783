//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::cart::CartError;
use crate::services::identity::IdentityError;
use crate::services::orders::CheckoutError;
use crate::services::reviews::ReviewError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Identity provider lookup failed.
    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    /// Review eligibility or write path failed.
    #[error("Review error: {0}")]
    Review(#[from] ReviewError),

    /// The checkout saga failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Cart pricing failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// The eligibility check itself failed (store error, not a verdict).
    #[error("Error checking review eligibility")]
    EligibilityCheck(#[source] RepositoryError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Rate limited.
    #[error("Rate limited")]
    RateLimited,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether this error should be captured to Sentry.
    const fn is_server_error(&self) -> bool {
        match self {
            Self::Database(_) | Self::Internal(_) | Self::EligibilityCheck(_) => true,
            Self::Identity(err) => matches!(err, IdentityError::Http(_) | IdentityError::InvalidPayload(_)),
            Self::Review(err) => matches!(err, ReviewError::Store(_)),
            Self::Checkout(err) => {
                matches!(
                    err,
                    CheckoutError::Store { .. } | CheckoutError::CompensationFailed { .. }
                )
            }
            Self::Cart(err) => matches!(err, CartError::Store(_)),
            _ => false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Database(_) | Self::Internal(_) | Self::EligibilityCheck(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Identity(_) => StatusCode::BAD_GATEWAY,
            Self::Review(err) => match err {
                ReviewError::NotEligible { .. } | ReviewError::NotAuthorized => {
                    StatusCode::FORBIDDEN
                }
                ReviewError::InvalidRating(_) => StatusCode::UNPROCESSABLE_ENTITY,
                ReviewError::NotFound => StatusCode::NOT_FOUND,
                ReviewError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Checkout(err) => match err {
                CheckoutError::EmptyCart | CheckoutError::TotalOverflow => {
                    StatusCode::BAD_REQUEST
                }
                CheckoutError::Store { .. } | CheckoutError::CompensationFailed { .. } => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Cart(err) => match err {
                CartError::TotalOverflow => StatusCode::BAD_REQUEST,
                CartError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Identity(_) => "External service error".to_string(),
            Self::EligibilityCheck(_) => "Error checking review eligibility".to_string(),
            Self::Review(err) => match err {
                ReviewError::Store(_) => "Internal server error".to_string(),
                other => other.to_string(),
            },
            Self::Checkout(err) => match err {
                CheckoutError::Store { .. } | CheckoutError::CompensationFailed { .. } => {
                    "Order could not be placed".to_string()
                }
                other => other.to_string(),
            },
            Self::Cart(err) => match err {
                CartError::Store(_) => "Internal server error".to_string(),
                CartError::TotalOverflow => err.to_string(),
            },
            _ => self.to_string(),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::reviews::REASON_QUOTA_REACHED;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::RateLimited),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_not_eligible_is_forbidden() {
        let err = AppError::Review(ReviewError::NotEligible {
            reason: REASON_QUOTA_REACHED,
        });
        assert_eq!(get_status(err), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_invalid_rating_is_unprocessable() {
        let err = AppError::Review(ReviewError::InvalidRating(craftloom_core::RatingError));
        assert_eq!(get_status(err), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_eligibility_store_failure_is_distinct_from_a_verdict() {
        let err = AppError::EligibilityCheck(RepositoryError::Database(
            sqlx::Error::PoolTimedOut,
        ));
        assert_eq!(get_status(err), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_empty_cart_is_bad_request() {
        let err = AppError::Checkout(CheckoutError::EmptyCart);
        assert_eq!(get_status(err), StatusCode::BAD_REQUEST);
    }
}
