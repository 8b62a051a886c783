//! Delegated identity lookup.
//!
//! Authentication is owned by the external backend's identity service; the
//! storefront never stores credentials. Each request carries a bearer token
//! which is resolved to an [`Identity`] via `GET {base}/auth/v1/user`.
//! The storefront only reads derived fields from the identity: the display
//! name (profile name, else email local part), the phone, and the email.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use uuid::Uuid;

use craftloom_core::{AuthorMatch, Email, PurchaserMatch};

/// Errors from identity lookups.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// HTTP request to the identity service failed.
    #[error("identity service error: {0}")]
    Http(#[from] reqwest::Error),

    /// The identity service returned an unexpected payload.
    #[error("invalid identity payload: {0}")]
    InvalidPayload(String),
}

/// An authenticated actor, as reported by the identity provider.
///
/// Phone-signup accounts have no email at all, so every derived field here
/// is optional; an identity with no profile name, no email, and no phone
/// carries nothing to match orders or reviews against.
#[derive(Debug, Clone)]
pub struct Identity {
    /// Provider-assigned stable user id.
    pub id: Uuid,
    /// Email address, absent for phone-signup accounts.
    pub email: Option<Email>,
    /// Phone number from the profile metadata, if set.
    pub phone: Option<String>,
    /// Profile name from the profile metadata, if set.
    pub name: Option<String>,
}

impl Identity {
    /// Display name: the profile name, else the email local part.
    ///
    /// `None` when neither source exists.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .or_else(|| self.email.as_ref().map(Email::local_part))
    }

    /// Matching fields for purchase verification against order snapshots.
    #[must_use]
    pub fn purchaser_match(&self) -> PurchaserMatch {
        PurchaserMatch {
            phone: self.phone.clone(),
            name: self.display_name().map(str::to_owned),
        }
    }

    /// Matching fields for review ownership and the review quota.
    #[must_use]
    pub fn author_match(&self) -> AuthorMatch {
        AuthorMatch {
            name: self.display_name().map(str::to_owned),
            email: self.email.clone(),
        }
    }
}

/// Wire shape of the identity service's user payload.
#[derive(Debug, Deserialize)]
struct UserPayload {
    id: Uuid,
    email: Option<String>,
    phone: Option<String>,
    #[serde(default)]
    user_metadata: UserMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct UserMetadata {
    name: Option<String>,
    phone: Option<String>,
}

/// HTTP client for the identity service.
#[derive(Clone)]
pub struct IdentityClient {
    http: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

impl IdentityClient {
    /// Create a new identity client.
    #[must_use]
    pub fn new(base_url: &str, api_key: SecretString) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_key,
        }
    }

    /// Resolve a bearer token to the identity it belongs to.
    ///
    /// Returns `None` for missing/expired tokens (the provider answers 401
    /// or 403); any other failure is an error.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError`] if the request fails or the payload cannot
    /// be interpreted.
    pub async fn resolve(&self, bearer_token: &str) -> Result<Option<Identity>, IdentityError> {
        let response = self
            .http
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", self.api_key.expose_secret())
            .bearer_auth(bearer_token)
            .send()
            .await?;

        if matches!(
            response.status(),
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN
        ) {
            return Ok(None);
        }

        let response = response.error_for_status()?;
        let payload: UserPayload = response.json().await?;

        // Phone-signup accounts legitimately carry no email.
        let email = payload
            .email
            .as_deref()
            .filter(|e| !e.is_empty())
            .map(Email::parse)
            .transpose()
            .map_err(|e| IdentityError::InvalidPayload(format!("bad email: {e}")))?;

        // Profile metadata wins over the account-level phone.
        let phone = payload.user_metadata.phone.or(payload.phone);

        Ok(Some(Identity {
            id: payload.id,
            email,
            phone,
            name: payload.user_metadata.name,
        }))
    }
}
