//! Review eligibility engine and write path.
//!
//! A review may be created only by an identity that has purchased and
//! received the product (a `Delivered` order whose purchaser snapshot
//! matches by phone OR name) and that still has quota left
//! ([`MAX_REVIEWS_PER_PRODUCT`]). Eligibility never mutates state, and a
//! store failure while checking is reported as an error - never as a
//! not-eligible verdict - so callers can offer "retry" instead of "you're
//! not allowed".
//!
//! The engine talks to its stores through the [`OrderLedger`] and
//! [`ReviewStore`] seams, implemented by the sqlx repositories in
//! production and by in-memory fakes in tests.

use craftloom_core::{AuthorMatch, ProductId, Rating, RatingError, ReviewId};

use crate::db::{OrderRepository, RepositoryError, ReviewRepository};
use crate::models::{NewReview, Purchaser, RatingSummary, Review, ReviewUpdate};
use crate::services::identity::Identity;

/// Maximum number of reviews one identity may hold on a single product.
pub const MAX_REVIEWS_PER_PRODUCT: u32 = 10;

/// Reason shown when the requester is not signed in.
pub const REASON_SIGN_IN: &str = "You must be signed in to write a review";
/// Reason shown when no matchable profile field exists.
pub const REASON_CANNOT_VERIFY: &str =
    "Unable to verify purchase history. Please contact support.";
/// Reason shown when no matching delivered order exists.
pub const REASON_PURCHASE_REQUIRED: &str =
    "You can only review products you have purchased and received";
/// Reason shown when the per-product review quota is exhausted.
pub const REASON_QUOTA_REACHED: &str =
    "You have reached the maximum limit of 10 reviews for this product";

/// Outcome of an eligibility check.
///
/// Distinct from the error channel: a store failure during the check is a
/// `RepositoryError`, not a `NotEligible`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eligibility {
    /// The identity may submit another review.
    Eligible,
    /// The identity may not review this product; `reason` is display-ready.
    NotEligible {
        reason: &'static str,
    },
}

impl Eligibility {
    /// Whether the verdict allows a review.
    #[must_use]
    pub const fn can_review(&self) -> bool {
        matches!(self, Self::Eligible)
    }
}

/// Errors from the review write path.
#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    /// Eligibility failed with a display-ready reason.
    #[error("{reason}")]
    NotEligible { reason: &'static str },

    /// Rating outside 1..=5.
    #[error(transparent)]
    InvalidRating(#[from] RatingError),

    /// The review does not exist.
    #[error("review not found")]
    NotFound,

    /// The requester does not own the review.
    #[error("you can only edit your own reviews")]
    NotAuthorized,

    /// A store call failed.
    #[error(transparent)]
    Store(#[from] RepositoryError),
}

/// Order-ledger seam used by purchase verification.
pub trait OrderLedger {
    /// Purchaser snapshots of all `Delivered` orders containing a product.
    fn delivered_purchasers_of(
        &self,
        product_id: ProductId,
    ) -> impl Future<Output = Result<Vec<Purchaser>, RepositoryError>> + Send;
}

/// Review-store seam used by the quota check and the write path.
pub trait ReviewStore {
    fn count_for_author(
        &self,
        product_id: ProductId,
        author: &AuthorMatch,
    ) -> impl Future<Output = Result<u32, RepositoryError>> + Send;

    fn list_for_author(
        &self,
        product_id: ProductId,
        author: &AuthorMatch,
    ) -> impl Future<Output = Result<Vec<Review>, RepositoryError>> + Send;

    fn list_for_product(
        &self,
        product_id: ProductId,
    ) -> impl Future<Output = Result<Vec<Review>, RepositoryError>> + Send;

    fn get(
        &self,
        id: ReviewId,
    ) -> impl Future<Output = Result<Option<Review>, RepositoryError>> + Send;

    fn insert(
        &self,
        review: &NewReview,
    ) -> impl Future<Output = Result<Review, RepositoryError>> + Send;

    fn update(
        &self,
        id: ReviewId,
        update: &ReviewUpdate,
    ) -> impl Future<Output = Result<Option<Review>, RepositoryError>> + Send;
}

impl OrderLedger for OrderRepository<'_> {
    async fn delivered_purchasers_of(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<Purchaser>, RepositoryError> {
        Self::delivered_purchasers_of(self, product_id).await
    }
}

impl ReviewStore for ReviewRepository<'_> {
    async fn count_for_author(
        &self,
        product_id: ProductId,
        author: &AuthorMatch,
    ) -> Result<u32, RepositoryError> {
        Self::count_for_author(self, product_id, author).await
    }

    async fn list_for_author(
        &self,
        product_id: ProductId,
        author: &AuthorMatch,
    ) -> Result<Vec<Review>, RepositoryError> {
        Self::list_for_author(self, product_id, author).await
    }

    async fn list_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<Review>, RepositoryError> {
        Self::list_for_product(self, product_id).await
    }

    async fn get(&self, id: ReviewId) -> Result<Option<Review>, RepositoryError> {
        Self::get(self, id).await
    }

    async fn insert(&self, review: &NewReview) -> Result<Review, RepositoryError> {
        Self::insert(self, review).await
    }

    async fn update(
        &self,
        id: ReviewId,
        update: &ReviewUpdate,
    ) -> Result<Option<Review>, RepositoryError> {
        Self::update(self, id, update).await
    }
}

/// A new review as submitted by the client.
///
/// `rating` stays a raw integer until the write path validates it; the
/// image-URL cap (5) is enforced by the submitting UI and treated as
/// advisory here.
#[derive(Debug, Clone)]
pub struct SubmitReview {
    pub product_id: ProductId,
    pub author_name: String,
    pub rating: u8,
    pub comment: Option<String>,
    pub image_urls: Vec<String>,
}

/// An edit of an existing review.
#[derive(Debug, Clone)]
pub struct EditReview {
    pub rating: u8,
    pub comment: Option<String>,
    pub image_urls: Vec<String>,
}

/// Quota usage for one (identity, product) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ReviewQuota {
    pub count: u32,
    pub remaining: u32,
}

/// The review eligibility engine and write path.
pub struct ReviewService<L, S> {
    ledger: L,
    store: S,
}

impl<L: OrderLedger, S: ReviewStore> ReviewService<L, S> {
    /// Create a service over an order ledger and a review store.
    pub const fn new(ledger: L, store: S) -> Self {
        Self { ledger, store }
    }

    /// Decide whether `identity` may submit another review for the product.
    ///
    /// Read-only; see the module docs for the rule sequence.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if a ledger or store query fails. That is
    /// NOT a not-eligible verdict.
    pub async fn check_eligibility(
        &self,
        identity: Option<&Identity>,
        product_id: ProductId,
    ) -> Result<Eligibility, RepositoryError> {
        let Some(identity) = identity else {
            return Ok(Eligibility::NotEligible {
                reason: REASON_SIGN_IN,
            });
        };

        let purchaser = identity.purchaser_match();
        if !purchaser.is_verifiable() {
            return Ok(Eligibility::NotEligible {
                reason: REASON_CANNOT_VERIFY,
            });
        }

        let delivered = self.ledger.delivered_purchasers_of(product_id).await?;
        if delivered.is_empty() {
            return Ok(Eligibility::NotEligible {
                reason: REASON_PURCHASE_REQUIRED,
            });
        }

        let has_matching_order = delivered
            .iter()
            .any(|p| purchaser.matches(p.phone.as_deref(), &p.name));
        if !has_matching_order {
            return Ok(Eligibility::NotEligible {
                reason: REASON_PURCHASE_REQUIRED,
            });
        }

        let count = self
            .store
            .count_for_author(product_id, &identity.author_match())
            .await?;
        if count >= MAX_REVIEWS_PER_PRODUCT {
            return Ok(Eligibility::NotEligible {
                reason: REASON_QUOTA_REACHED,
            });
        }

        Ok(Eligibility::Eligible)
    }

    /// How many reviews the identity holds on the product, and how many
    /// remain within quota.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store query fails.
    pub async fn quota(
        &self,
        identity: &Identity,
        product_id: ProductId,
    ) -> Result<ReviewQuota, RepositoryError> {
        let count = self
            .store
            .count_for_author(product_id, &identity.author_match())
            .await?;
        Ok(ReviewQuota {
            count,
            remaining: MAX_REVIEWS_PER_PRODUCT.saturating_sub(count),
        })
    }

    /// Validate and persist a new review.
    ///
    /// Eligibility is re-checked here regardless of what any earlier page
    /// load decided.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError`] on an eligibility refusal, an out-of-range
    /// rating, or a store failure. Nothing is written on any error.
    pub async fn submit(
        &self,
        identity: Option<&Identity>,
        submission: SubmitReview,
    ) -> Result<Review, ReviewError> {
        match self
            .check_eligibility(identity, submission.product_id)
            .await?
        {
            Eligibility::Eligible => {}
            Eligibility::NotEligible { reason } => {
                return Err(ReviewError::NotEligible { reason });
            }
        }

        let rating = Rating::new(submission.rating)?;

        let review = self
            .store
            .insert(&NewReview {
                product_id: submission.product_id,
                author_name: submission.author_name,
                rating,
                comment: submission.comment,
                image_urls: submission.image_urls,
            })
            .await?;

        Ok(review)
    }

    /// Edit an existing review in place.
    ///
    /// Ownership is the loose author match: the stored author name must
    /// equal the identity's derived display name or email. The creation
    /// timestamp is preserved and no edit history is kept.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError`] if the review is missing, the requester
    /// does not own it, the rating is out of range, or a store call fails.
    pub async fn edit(
        &self,
        identity: &Identity,
        review_id: ReviewId,
        edit: EditReview,
    ) -> Result<Review, ReviewError> {
        let existing = self
            .store
            .get(review_id)
            .await?
            .ok_or(ReviewError::NotFound)?;

        if !identity.author_match().owns(&existing.author_name) {
            return Err(ReviewError::NotAuthorized);
        }

        let rating = Rating::new(edit.rating)?;

        let updated = self
            .store
            .update(
                review_id,
                &ReviewUpdate {
                    rating,
                    comment: edit.comment,
                    image_urls: edit.image_urls,
                },
            )
            .await?
            .ok_or(ReviewError::NotFound)?;

        Ok(updated)
    }

    /// All reviews of a product, newest-first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store query fails.
    pub async fn reviews_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<Review>, RepositoryError> {
        self.store.list_for_product(product_id).await
    }

    /// The identity's own reviews of a product, newest-first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store query fails.
    pub async fn reviews_by_author(
        &self,
        identity: &Identity,
        product_id: ProductId,
    ) -> Result<Vec<Review>, RepositoryError> {
        self.store
            .list_for_author(product_id, &identity.author_match())
            .await
    }
}

/// Fold a product's reviews into an average rating.
///
/// Recomputed on every read; there is no materialized running average.
/// The mean is rounded to one decimal place, and an empty slice yields
/// an average of 0.0.
#[must_use]
pub fn average_rating(reviews: &[Review]) -> RatingSummary {
    if reviews.is_empty() {
        return RatingSummary {
            average: 0.0,
            count: 0,
        };
    }

    let sum: u32 = reviews.iter().map(|r| u32::from(r.rating.value())).sum();
    #[allow(clippy::cast_precision_loss)]
    let mean = f64::from(sum) / reviews.len() as f64;
    RatingSummary {
        average: (mean * 10.0).round() / 10.0,
        count: reviews.len(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::Utc;
    use uuid::Uuid;

    use craftloom_core::Email;

    use super::*;

    struct FakeLedger {
        purchasers: Vec<Purchaser>,
        fail: bool,
    }

    impl OrderLedger for &FakeLedger {
        async fn delivered_purchasers_of(
            &self,
            _product_id: ProductId,
        ) -> Result<Vec<Purchaser>, RepositoryError> {
            if self.fail {
                return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
            }
            Ok(self.purchasers.clone())
        }
    }

    #[derive(Default)]
    struct FakeStore {
        reviews: Mutex<Vec<Review>>,
    }

    impl FakeStore {
        fn with_reviews(reviews: Vec<Review>) -> Self {
            Self {
                reviews: Mutex::new(reviews),
            }
        }

        fn len(&self) -> usize {
            self.reviews.lock().expect("lock").len()
        }
    }

    impl ReviewStore for &FakeStore {
        async fn count_for_author(
            &self,
            product_id: ProductId,
            author: &AuthorMatch,
        ) -> Result<u32, RepositoryError> {
            let count = self
                .reviews
                .lock()
                .expect("lock")
                .iter()
                .filter(|r| r.product_id == product_id && author.owns(&r.author_name))
                .count();
            Ok(u32::try_from(count).expect("fits"))
        }

        async fn list_for_author(
            &self,
            product_id: ProductId,
            author: &AuthorMatch,
        ) -> Result<Vec<Review>, RepositoryError> {
            Ok(self
                .reviews
                .lock()
                .expect("lock")
                .iter()
                .filter(|r| r.product_id == product_id && author.owns(&r.author_name))
                .cloned()
                .collect())
        }

        async fn list_for_product(
            &self,
            product_id: ProductId,
        ) -> Result<Vec<Review>, RepositoryError> {
            Ok(self
                .reviews
                .lock()
                .expect("lock")
                .iter()
                .filter(|r| r.product_id == product_id)
                .cloned()
                .collect())
        }

        async fn get(&self, id: ReviewId) -> Result<Option<Review>, RepositoryError> {
            Ok(self
                .reviews
                .lock()
                .expect("lock")
                .iter()
                .find(|r| r.id == id)
                .cloned())
        }

        async fn insert(&self, review: &NewReview) -> Result<Review, RepositoryError> {
            let stored = Review {
                id: ReviewId::random(),
                product_id: review.product_id,
                author_name: review.author_name.clone(),
                rating: review.rating,
                comment: review.comment.clone(),
                image_urls: review.image_urls.clone(),
                created_at: Utc::now(),
            };
            self.reviews.lock().expect("lock").push(stored.clone());
            Ok(stored)
        }

        async fn update(
            &self,
            id: ReviewId,
            update: &ReviewUpdate,
        ) -> Result<Option<Review>, RepositoryError> {
            let mut reviews = self.reviews.lock().expect("lock");
            let Some(review) = reviews.iter_mut().find(|r| r.id == id) else {
                return Ok(None);
            };
            review.rating = update.rating;
            review.comment.clone_from(&update.comment);
            review.image_urls.clone_from(&update.image_urls);
            Ok(Some(review.clone()))
        }
    }

    fn identity(name: Option<&str>, phone: Option<&str>) -> Identity {
        Identity {
            id: Uuid::new_v4(),
            email: Some(Email::parse("asha.k@crafts.example").expect("valid email")),
            phone: phone.map(str::to_owned),
            name: name.map(str::to_owned),
        }
    }

    fn purchaser(phone: Option<&str>, name: &str) -> Purchaser {
        Purchaser {
            phone: phone.map(str::to_owned),
            name: name.to_owned(),
        }
    }

    fn stored_review(product_id: ProductId, author_name: &str, rating: u8) -> Review {
        Review {
            id: ReviewId::random(),
            product_id,
            author_name: author_name.to_owned(),
            rating: Rating::new(rating).expect("valid rating"),
            comment: None,
            image_urls: Vec::new(),
            created_at: Utc::now(),
        }
    }

    fn submission(product_id: ProductId, rating: u8) -> SubmitReview {
        SubmitReview {
            product_id,
            author_name: "Asha K".to_owned(),
            rating,
            comment: Some("Beautiful work".to_owned()),
            image_urls: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_anonymous_is_not_eligible() {
        let ledger = FakeLedger {
            purchasers: vec![purchaser(Some("9876543210"), "Asha K")],
            fail: false,
        };
        let store = FakeStore::default();
        let service = ReviewService::new(&ledger, &store);

        let verdict = service
            .check_eligibility(None, ProductId::random())
            .await
            .expect("check");
        assert_eq!(
            verdict,
            Eligibility::NotEligible {
                reason: REASON_SIGN_IN
            }
        );
    }

    #[tokio::test]
    async fn test_identity_with_no_match_fields_cannot_be_verified() {
        // A phone-signup account with no email, no profile name, and no
        // phone has nothing to match orders against; the verdict must be
        // cannot-verify before the ledger is ever consulted.
        let ledger = FakeLedger {
            purchasers: vec![purchaser(Some("9876543210"), "Asha K")],
            fail: true,
        };
        let store = FakeStore::default();
        let service = ReviewService::new(&ledger, &store);

        let bare = Identity {
            id: Uuid::new_v4(),
            email: None,
            phone: None,
            name: None,
        };
        let verdict = service
            .check_eligibility(Some(&bare), ProductId::random())
            .await
            .expect("check");
        assert_eq!(
            verdict,
            Eligibility::NotEligible {
                reason: REASON_CANNOT_VERIFY
            }
        );
    }

    #[tokio::test]
    async fn test_no_delivered_orders_is_not_eligible() {
        let ledger = FakeLedger {
            purchasers: Vec::new(),
            fail: false,
        };
        let store = FakeStore::default();
        let service = ReviewService::new(&ledger, &store);

        let verdict = service
            .check_eligibility(Some(&identity(Some("Asha K"), None)), ProductId::random())
            .await
            .expect("check");
        assert_eq!(
            verdict,
            Eligibility::NotEligible {
                reason: REASON_PURCHASE_REQUIRED
            }
        );
    }

    #[tokio::test]
    async fn test_phone_match_alone_is_eligible() {
        // Name on the order differs; the phone matches. OR semantics pass.
        let ledger = FakeLedger {
            purchasers: vec![purchaser(Some("9876543210"), "someone else")],
            fail: false,
        };
        let store = FakeStore::default();
        let service = ReviewService::new(&ledger, &store);

        let verdict = service
            .check_eligibility(
                Some(&identity(Some("Asha K"), Some("9876543210"))),
                ProductId::random(),
            )
            .await
            .expect("check");
        assert_eq!(verdict, Eligibility::Eligible);
    }

    #[tokio::test]
    async fn test_mismatched_purchaser_is_not_eligible() {
        let ledger = FakeLedger {
            purchasers: vec![purchaser(Some("0000000000"), "Ravi")],
            fail: false,
        };
        let store = FakeStore::default();
        let service = ReviewService::new(&ledger, &store);

        let verdict = service
            .check_eligibility(
                Some(&identity(Some("Asha K"), Some("9876543210"))),
                ProductId::random(),
            )
            .await
            .expect("check");
        assert_eq!(
            verdict,
            Eligibility::NotEligible {
                reason: REASON_PURCHASE_REQUIRED
            }
        );
    }

    #[tokio::test]
    async fn test_quota_blocks_eleventh_review() {
        let product_id = ProductId::random();
        let ledger = FakeLedger {
            purchasers: vec![purchaser(None, "Asha K")],
            fail: false,
        };
        let existing = (0..MAX_REVIEWS_PER_PRODUCT)
            .map(|_| stored_review(product_id, "Asha K", 5))
            .collect();
        let store = FakeStore::with_reviews(existing);
        let service = ReviewService::new(&ledger, &store);
        let who = identity(Some("Asha K"), None);

        let verdict = service
            .check_eligibility(Some(&who), product_id)
            .await
            .expect("check");
        assert_eq!(
            verdict,
            Eligibility::NotEligible {
                reason: REASON_QUOTA_REACHED
            }
        );

        let result = service.submit(Some(&who), submission(product_id, 4)).await;
        assert!(matches!(
            result,
            Err(ReviewError::NotEligible {
                reason: REASON_QUOTA_REACHED
            })
        ));
        // The eleventh attempt wrote nothing.
        assert_eq!(store.len(), MAX_REVIEWS_PER_PRODUCT as usize);
    }

    #[tokio::test]
    async fn test_quota_counts_email_authored_reviews_too() {
        // Reviews stored under the email address count against the same
        // quota as reviews stored under the display name.
        let product_id = ProductId::random();
        let ledger = FakeLedger {
            purchasers: vec![purchaser(None, "Asha K")],
            fail: false,
        };
        let mut existing: Vec<Review> = (0..5)
            .map(|_| stored_review(product_id, "Asha K", 5))
            .collect();
        existing.extend((0..5).map(|_| stored_review(product_id, "asha.k@crafts.example", 4)));
        let store = FakeStore::with_reviews(existing);
        let service = ReviewService::new(&ledger, &store);

        let verdict = service
            .check_eligibility(Some(&identity(Some("Asha K"), None)), product_id)
            .await
            .expect("check");
        assert_eq!(
            verdict,
            Eligibility::NotEligible {
                reason: REASON_QUOTA_REACHED
            }
        );
    }

    #[tokio::test]
    async fn test_ledger_failure_is_an_error_not_a_verdict() {
        let ledger = FakeLedger {
            purchasers: Vec::new(),
            fail: true,
        };
        let store = FakeStore::default();
        let service = ReviewService::new(&ledger, &store);

        let result = service
            .check_eligibility(Some(&identity(Some("Asha K"), None)), ProductId::random())
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_submit_rejects_out_of_range_rating_without_writing() {
        let product_id = ProductId::random();
        let ledger = FakeLedger {
            purchasers: vec![purchaser(None, "Asha K")],
            fail: false,
        };
        let store = FakeStore::default();
        let service = ReviewService::new(&ledger, &store);
        let who = identity(Some("Asha K"), None);

        for rating in [0, 6, 100] {
            let result = service
                .submit(Some(&who), submission(product_id, rating))
                .await;
            assert!(matches!(result, Err(ReviewError::InvalidRating(_))));
        }
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn test_submit_persists_when_eligible() {
        let product_id = ProductId::random();
        let ledger = FakeLedger {
            purchasers: vec![purchaser(None, "Asha K")],
            fail: false,
        };
        let store = FakeStore::default();
        let service = ReviewService::new(&ledger, &store);

        let review = service
            .submit(
                Some(&identity(Some("Asha K"), None)),
                submission(product_id, 5),
            )
            .await
            .expect("submit");
        assert_eq!(review.rating.value(), 5);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_edit_by_non_owner_is_rejected_and_unchanged() {
        let product_id = ProductId::random();
        let original = stored_review(product_id, "Ravi", 2);
        let review_id = original.id;
        let ledger = FakeLedger {
            purchasers: Vec::new(),
            fail: false,
        };
        let store = FakeStore::with_reviews(vec![original]);
        let service = ReviewService::new(&ledger, &store);

        let result = service
            .edit(
                &identity(Some("Asha K"), None),
                review_id,
                EditReview {
                    rating: 5,
                    comment: Some("hijacked".to_owned()),
                    image_urls: Vec::new(),
                },
            )
            .await;
        assert!(matches!(result, Err(ReviewError::NotAuthorized)));

        let stored = ReviewStore::get(&&store, review_id)
            .await
            .expect("get")
            .expect("some");
        assert_eq!(stored.rating.value(), 2);
        assert_eq!(stored.comment, None);
    }

    #[tokio::test]
    async fn test_edit_by_owner_updates_in_place() {
        let product_id = ProductId::random();
        let original = stored_review(product_id, "asha.k@crafts.example", 3);
        let review_id = original.id;
        let created_at = original.created_at;
        let ledger = FakeLedger {
            purchasers: Vec::new(),
            fail: false,
        };
        let store = FakeStore::with_reviews(vec![original]);
        let service = ReviewService::new(&ledger, &store);

        let updated = service
            .edit(
                &identity(None, None),
                review_id,
                EditReview {
                    rating: 4,
                    comment: Some("Even better after a month".to_owned()),
                    image_urls: vec!["https://cdn.example/p.jpg".to_owned()],
                },
            )
            .await
            .expect("edit");
        assert_eq!(updated.rating.value(), 4);
        assert_eq!(updated.created_at, created_at);
    }

    #[tokio::test]
    async fn test_edit_missing_review_is_not_found() {
        let ledger = FakeLedger {
            purchasers: Vec::new(),
            fail: false,
        };
        let store = FakeStore::default();
        let service = ReviewService::new(&ledger, &store);

        let result = service
            .edit(
                &identity(Some("Asha K"), None),
                ReviewId::random(),
                EditReview {
                    rating: 4,
                    comment: None,
                    image_urls: Vec::new(),
                },
            )
            .await;
        assert!(matches!(result, Err(ReviewError::NotFound)));
    }

    #[test]
    fn test_average_rating_rounds_to_one_decimal() {
        let product_id = ProductId::random();
        let reviews = vec![
            stored_review(product_id, "a", 5),
            stored_review(product_id, "b", 4),
            stored_review(product_id, "c", 4),
        ];
        let summary = average_rating(&reviews);
        assert_eq!(summary.count, 3);
        assert!((summary.average - 4.3).abs() < f64::EPSILON);
    }

    #[test]
    fn test_average_rating_empty_is_zero() {
        let summary = average_rating(&[]);
        assert_eq!(summary.count, 0);
        assert!((summary.average - 0.0).abs() < f64::EPSILON);
    }
}
