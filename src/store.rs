use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::{IngestionError, ReviewError, ValidationError};
use crate::ingest::ImageIngestor;
use crate::models::{Category, CreateReviewDraft, Review};
use crate::validation::{check_draft_structure, check_review};

/// Source of the current calendar date
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local wall-clock date
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Always reports the same date
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

struct StoreState {
    /// Newest insertion at the front
    reviews: VecDeque<Review>,
    next_id: u64,
}

/// Authoritative in-memory review collection
pub struct ReviewStore {
    state: RwLock<StoreState>,
    ingestor: Arc<dyn ImageIngestor>,
    clock: Arc<dyn Clock>,
}

impl ReviewStore {
    pub fn new(ingestor: Arc<dyn ImageIngestor>, clock: Arc<dyn Clock>) -> Self {
        Self::from_state(ingestor, clock, VecDeque::new(), 1)
    }

    /// Start from existing reviews, kept in the given order.
    /// New ids continue after the highest one present. Every review must hold
    /// the stored-review invariants and ids must be unique.
    pub fn with_reviews(
        ingestor: Arc<dyn ImageIngestor>,
        clock: Arc<dyn Clock>,
        reviews: Vec<Review>,
    ) -> Result<Self, ValidationError> {
        let mut seen = HashSet::with_capacity(reviews.len());
        for review in &reviews {
            check_review(review).map_err(|e| {
                warn!(id = review.id, error = %e, "Rejected initial review");
                e
            })?;
            if !seen.insert(review.id) {
                return Err(ValidationError::DuplicateReviewId(review.id));
            }
        }

        let next_id = reviews.iter().map(|r| r.id).max().map_or(1, |id| id + 1);

        Ok(Self::from_state(ingestor, clock, reviews.into(), next_id))
    }

    fn from_state(
        ingestor: Arc<dyn ImageIngestor>,
        clock: Arc<dyn Clock>,
        reviews: VecDeque<Review>,
        next_id: u64,
    ) -> Self {
        debug!(count = reviews.len(), next_id, "Initialized review store");

        Self {
            state: RwLock::new(StoreState { reviews, next_id }),
            ingestor,
            clock,
        }
    }

    /// Persist a new review. Images are resolved first; if that fails nothing
    /// is stored and no id is consumed.
    pub async fn create_review(&self, draft: CreateReviewDraft) -> Result<Review, ReviewError> {
        check_draft_structure(&draft)?;

        let images = if draft.images.is_empty() {
            Vec::new()
        } else {
            let references = self.ingestor.ingest(&draft.images).await.map_err(|e| {
                warn!(error = %e, "Image ingestion failed, review not stored");
                e
            })?;
            if references.len() != draft.images.len() {
                return Err(IngestionError::CountMismatch {
                    expected: draft.images.len(),
                    actual: references.len(),
                }
                .into());
            }
            references
        };

        let categories = dedup_categories(draft.categories);
        let submitted_date = self.clock.today();

        let review = {
            let mut state = self.state.write().await;
            let id = state.next_id;
            state.next_id += 1;

            let review = Review {
                id,
                categories,
                rating: draft.rating,
                title: draft.title,
                description: draft.description,
                submitted_date,
                anonymous: true,
                images,
            };
            state.reviews.push_front(review.clone());
            review
        };

        info!(
            id = review.id,
            rating = review.rating,
            images = review.images.len(),
            "Stored review"
        );

        Ok(review)
    }

    /// Snapshot of every review in store order
    pub async fn all_reviews(&self) -> Vec<Review> {
        let state = self.state.read().await;
        state.reviews.iter().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.reviews.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }
}

fn dedup_categories(categories: Vec<Category>) -> Vec<Category> {
    let mut unique = Vec::with_capacity(categories.len());
    for category in categories {
        if !unique.contains(&category) {
            unique.push(category);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::PlaceholderIngestor;
    use crate::models::ImagePayload;
    use crate::seed::sample_reviews;
    use async_trait::async_trait;

    struct FailingIngestor;

    #[async_trait]
    impl ImageIngestor for FailingIngestor {
        async fn ingest(&self, _images: &[ImagePayload]) -> Result<Vec<String>, IngestionError> {
            Err(IngestionError::Rejected {
                index: 0,
                reason: "storage unavailable".to_string(),
            })
        }
    }

    struct ShortIngestor;

    #[async_trait]
    impl ImageIngestor for ShortIngestor {
        async fn ingest(&self, _images: &[ImagePayload]) -> Result<Vec<String>, IngestionError> {
            Ok(vec!["/only-one.png".to_string()])
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 10).unwrap()
    }

    fn store_with(ingestor: Arc<dyn ImageIngestor>) -> ReviewStore {
        ReviewStore::with_reviews(ingestor, Arc::new(FixedClock(date())), sample_reviews())
            .unwrap()
    }

    fn draft() -> CreateReviewDraft {
        CreateReviewDraft::new(
            [Category::Security, Category::Security, Category::CommonAreas],
            5,
            "Gate fixed",
            "The main gate works again.",
        )
    }

    fn photos(n: usize) -> Vec<ImagePayload> {
        (0..n)
            .map(|i| ImagePayload::new(format!("{}.jpg", i), "image/jpeg", vec![0; 8]))
            .collect()
    }

    #[tokio::test]
    async fn test_create_assigns_identity_and_prepends() {
        let store = store_with(Arc::new(PlaceholderIngestor::default()));

        let review = store.create_review(draft().with_images(photos(2))).await.unwrap();
        assert_eq!(review.id, 8);
        assert_eq!(review.submitted_date, date());
        assert!(review.anonymous);
        assert_eq!(review.categories, vec![Category::Security, Category::CommonAreas]);
        assert_eq!(review.images.len(), 2);

        let all = store.all_reviews().await;
        assert_eq!(all.len(), 8);
        assert_eq!(all[0], review);
        assert_eq!(all[1].id, 1);
    }

    #[tokio::test]
    async fn test_ids_strictly_increase() {
        let store = ReviewStore::new(
            Arc::new(PlaceholderIngestor::default()),
            Arc::new(FixedClock(date())),
        );

        let mut last = 0;
        for _ in 0..5 {
            let review = store.create_review(draft()).await.unwrap();
            assert!(review.id > last);
            last = review.id;
        }
        assert_eq!(last, 5);
    }

    #[tokio::test]
    async fn test_failed_ingestion_stores_nothing() {
        let store = store_with(Arc::new(FailingIngestor));

        let err = store
            .create_review(draft().with_images(photos(1)))
            .await
            .unwrap_err();
        assert!(err.is_ingestion());
        assert_eq!(store.len().await, 7);

        // No images means the ingestor is never consulted, and id 8 is still free.
        let review = store.create_review(draft()).await.unwrap();
        assert_eq!(review.id, 8);
    }

    #[tokio::test]
    async fn test_reference_count_mismatch_is_ingestion_failure() {
        let store = store_with(Arc::new(ShortIngestor));

        let err = store
            .create_review(draft().with_images(photos(3)))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ReviewError::Ingestion(IngestionError::CountMismatch {
                expected: 3,
                actual: 1
            })
        ));
        assert_eq!(store.len().await, 7);
    }

    #[tokio::test]
    async fn test_structural_invariants_enforced() {
        let store = store_with(Arc::new(PlaceholderIngestor::default()));

        let mut d = draft();
        d.categories.clear();
        assert!(store.create_review(d).await.unwrap_err().is_validation());

        let mut d = draft();
        d.rating = 0;
        assert!(store.create_review(d).await.unwrap_err().is_validation());

        let d = draft().with_images(photos(6));
        assert!(store.create_review(d).await.unwrap_err().is_validation());

        let mut d = draft();
        d.title = "x".repeat(300);
        assert!(matches!(
            store.create_review(d).await.unwrap_err(),
            ReviewError::Validation(ValidationError::TitleTooLong { len: 300, max: 100 })
        ));

        let mut d = draft();
        d.description = "x".repeat(1001);
        assert!(store.create_review(d).await.unwrap_err().is_validation());

        assert_eq!(store.len().await, 7);
    }

    #[test]
    fn test_initial_reviews_must_be_valid() {
        let ingestor: Arc<dyn ImageIngestor> = Arc::new(PlaceholderIngestor::default());
        let clock: Arc<dyn Clock> = Arc::new(FixedClock(date()));
        let build = |reviews: Vec<Review>| {
            ReviewStore::with_reviews(Arc::clone(&ingestor), Arc::clone(&clock), reviews)
        };

        let mut duplicated = sample_reviews();
        duplicated[3].id = duplicated[0].id;
        assert_eq!(
            build(duplicated).err(),
            Some(ValidationError::DuplicateReviewId(1))
        );

        let mut bad_rating = sample_reviews();
        bad_rating[2].rating = 9;
        assert_eq!(
            build(bad_rating).err(),
            Some(ValidationError::RatingOutOfRange(9))
        );

        let mut no_categories = sample_reviews();
        no_categories[5].categories.clear();
        assert_eq!(build(no_categories).err(), Some(ValidationError::NoCategories));

        assert!(build(sample_reviews()).is_ok());
        assert!(build(Vec::new()).is_ok());
    }

    #[tokio::test]
    async fn test_snapshot_is_detached() {
        let store = store_with(Arc::new(PlaceholderIngestor::default()));

        let mut snapshot = store.all_reviews().await;
        snapshot[0].title = "changed".to_string();
        snapshot.clear();

        let fresh = store.all_reviews().await;
        assert_eq!(fresh.len(), 7);
        assert_eq!(fresh[0].title, "Roof leaks after the rain");
    }

    #[tokio::test]
    async fn test_concurrent_creates_get_distinct_ids() {
        let store = Arc::new(ReviewStore::new(
            Arc::new(PlaceholderIngestor::default()),
            Arc::new(FixedClock(date())),
        ));

        let handles: Vec<_> = (0..20)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.create_review(draft()).await.unwrap().id })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }
        ids.sort_unstable();
        assert_eq!(ids, (1..=20).collect::<Vec<_>>());

        let stored: Vec<u64> = store.all_reviews().await.iter().map(|r| r.id).collect();
        assert_eq!(stored, (1..=20).rev().collect::<Vec<_>>());
    }
}
