//! Authentication extractors.
//!
//! Authentication is delegated to the external identity provider: each
//! request may carry an `Authorization: Bearer <token>` header, which the
//! extractors resolve to an [`Identity`] through the shared
//! [`IdentityClient`](crate::services::identity::IdentityClient).

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
};

use crate::services::identity::Identity;
use crate::state::AppState;

/// Extractor that requires an authenticated identity.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(identity): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", identity.display_name().unwrap_or("there"))
/// }
/// ```
pub struct RequireAuth(pub Identity);

/// Error returned when a bearer token is missing, invalid, or cannot be
/// verified.
pub enum AuthRejection {
    /// No usable token.
    Unauthorized,
    /// The identity provider could not be reached.
    ServiceUnavailable,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized => {
                (StatusCode::UNAUTHORIZED, "Authentication required").into_response()
            }
            Self::ServiceUnavailable => {
                (StatusCode::BAD_GATEWAY, "External service error").into_response()
            }
        }
    }
}

/// Pull the bearer token out of the Authorization header, if present.
fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AuthRejection::Unauthorized)?;

        let identity = state.identity().resolve(token).await.map_err(|e| {
            tracing::warn!(error = %e, "identity lookup failed");
            AuthRejection::ServiceUnavailable
        })?;

        let identity = identity.ok_or(AuthRejection::Unauthorized)?;
        crate::error::set_sentry_user(&identity.id, identity.email.as_ref().map(craftloom_core::Email::as_str));

        Ok(Self(identity))
    }
}

/// Extractor that optionally resolves the current identity.
///
/// Unlike `RequireAuth`, a missing or rejected token yields `None` instead
/// of failing the request. A provider outage is still an error, so callers
/// never mistake an outage for an anonymous request.
pub struct OptionalAuth(pub Option<Identity>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(parts) else {
            return Ok(Self(None));
        };

        let identity = state.identity().resolve(token).await.map_err(|e| {
            tracing::warn!(error = %e, "identity lookup failed");
            AuthRejection::ServiceUnavailable
        })?;

        if let Some(identity) = &identity {
            crate::error::set_sentry_user(&identity.id, identity.email.as_ref().map(craftloom_core::Email::as_str));
        }

        Ok(Self(identity))
    }
}
