pub mod memory;
pub mod remote;

pub use memory::{InMemoryReviewService, InMemoryReviewServiceBuilder};
pub use remote::HttpReviewService;

use async_trait::async_trait;

use crate::error::ReviewError;
use crate::models::{Category, CreateReviewDraft, ImagePayload, QuerySpec, Review, Stats};

/// The operations a review UI depends on.
///
/// Every call may suspend; callers must not assume operations complete in
/// the order they were issued.
#[async_trait]
pub trait ReviewService: Send + Sync {
    /// Reviews matching `query`, in the requested order
    async fn list_reviews(&self, query: &QuerySpec) -> Result<Vec<Review>, ReviewError>;

    /// Validate and store a new anonymous review
    async fn create_review(&self, draft: CreateReviewDraft) -> Result<Review, ReviewError>;

    /// Statistics over every review, ignoring any filter
    async fn get_stats(&self) -> Result<Stats, ReviewError>;

    /// Upload images ahead of submission, e.g. to show progress
    async fn ingest_images(&self, images: &[ImagePayload]) -> Result<Vec<String>, ReviewError>;

    /// Selectable categories, in display order
    fn categories(&self) -> &'static [Category] {
        &Category::ALL
    }
}
