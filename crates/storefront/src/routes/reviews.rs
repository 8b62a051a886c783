//! Review route handlers.
//!
//! The write path re-checks eligibility on every submission; the
//! eligibility endpoint exists so the UI can disable the review form up
//! front, but its verdict is advisory only.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use craftloom_core::ReviewId;

use crate::db::{OrderRepository, ReviewRepository};
use crate::error::{AppError, Result};
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::{RatingSummary, Review};
use crate::routes::products::product_by_slug;
use crate::services::reviews::{
    EditReview, Eligibility, ReviewQuota, ReviewService, SubmitReview, average_rating,
};
use crate::state::AppState;

/// Reviews of one product with the computed rating summary.
#[derive(Debug, Serialize)]
pub struct ReviewsResponse {
    pub reviews: Vec<Review>,
    pub rating: RatingSummary,
}

/// Eligibility verdict for the requesting identity.
#[derive(Debug, Serialize)]
pub struct EligibilityResponse {
    pub can_review: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
    /// Quota usage, present only for signed-in requesters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quota: Option<ReviewQuota>,
}

/// A review submission body.
#[derive(Debug, Deserialize)]
pub struct SubmitReviewBody {
    /// Display name to store; defaults to the identity's display name.
    pub author_name: Option<String>,
    pub rating: u8,
    pub comment: Option<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

/// A review edit body.
#[derive(Debug, Deserialize)]
pub struct EditReviewBody {
    pub rating: u8,
    pub comment: Option<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

fn review_service(
    state: &AppState,
) -> ReviewService<OrderRepository<'_>, ReviewRepository<'_>> {
    ReviewService::new(
        OrderRepository::new(state.pool()),
        ReviewRepository::new(state.pool()),
    )
}

/// List a product's reviews, newest-first, with the rating summary.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ReviewsResponse>> {
    let product = product_by_slug(&state, &slug).await?;
    let reviews = review_service(&state).reviews_for_product(product.id).await?;
    let rating = average_rating(&reviews);

    Ok(Json(ReviewsResponse { reviews, rating }))
}

/// Report whether the caller may review this product.
///
/// A store failure here is a 500, never a not-eligible verdict.
#[instrument(skip(state, auth))]
pub async fn eligibility(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    OptionalAuth(auth): OptionalAuth,
) -> Result<Json<EligibilityResponse>> {
    let product = product_by_slug(&state, &slug).await?;
    let service = review_service(&state);

    let verdict = service
        .check_eligibility(auth.as_ref(), product.id)
        .await
        .map_err(AppError::EligibilityCheck)?;

    let quota = match &auth {
        Some(identity) => Some(
            service
                .quota(identity, product.id)
                .await
                .map_err(AppError::EligibilityCheck)?,
        ),
        None => None,
    };

    let response = match verdict {
        Eligibility::Eligible => EligibilityResponse {
            can_review: true,
            reason: None,
            quota,
        },
        Eligibility::NotEligible { reason } => EligibilityResponse {
            can_review: false,
            reason: Some(reason),
            quota,
        },
    };

    Ok(Json(response))
}

/// Submit a new review.
#[instrument(skip(state, auth, body))]
pub async fn create(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    OptionalAuth(auth): OptionalAuth,
    Json(body): Json<SubmitReviewBody>,
) -> Result<(StatusCode, Json<Review>)> {
    let product = product_by_slug(&state, &slug).await?;

    let author_name = body
        .author_name
        .or_else(|| auth.as_ref().and_then(|i| i.display_name()).map(str::to_owned))
        .unwrap_or_default();

    let review = review_service(&state)
        .submit(
            auth.as_ref(),
            SubmitReview {
                product_id: product.id,
                author_name,
                rating: body.rating,
                comment: body.comment,
                image_urls: body.image_urls,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(review)))
}

/// Edit an owned review in place.
#[instrument(skip(state, identity, body))]
pub async fn update(
    State(state): State<AppState>,
    Path(review_id): Path<ReviewId>,
    RequireAuth(identity): RequireAuth,
    Json(body): Json<EditReviewBody>,
) -> Result<Json<Review>> {
    let review = review_service(&state)
        .edit(
            &identity,
            review_id,
            EditReview {
                rating: body.rating,
                comment: body.comment,
                image_urls: body.image_urls,
            },
        )
        .await?;

    Ok(Json(review))
}
