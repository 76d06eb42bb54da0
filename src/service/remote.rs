use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use super::ReviewService;
use crate::config::Limits;
use crate::error::{IngestionError, ReviewError};
use crate::ingest::{HttpIngestor, ImageIngestor};
use crate::models::{
    Category, CategorySelection, CreateReviewDraft, ImagePayload, QuerySpec, Review, Stats,
};
use crate::validation::{validate_draft, validate_images, validate_query};

/// Review service talking to a remote REST backend
pub struct HttpReviewService {
    client: Client,
    base_url: String,
    uploader: HttpIngestor,
    limits: Limits,
}

#[derive(Debug, Serialize)]
struct NewReview<'a> {
    categories: &'a [Category],
    rating: u8,
    title: &'a str,
    description: &'a str,
    images: Vec<String>,
}

impl HttpReviewService {
    /// Images are uploaded to the same backend under `/uploads`
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::new();
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let uploader = HttpIngestor::with_client(client.clone(), base_url.clone());

        Self {
            client,
            base_url,
            uploader,
            limits: Limits::default(),
        }
    }

    /// Send images to a separate storage endpoint instead of the backend
    pub fn with_uploader(mut self, uploader: HttpIngestor) -> Self {
        self.uploader = uploader;
        self
    }

    /// Tighten the submission limits checked before any request is made
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn upload(&self, images: &[ImagePayload]) -> Result<Vec<String>, ReviewError> {
        if images.is_empty() {
            return Ok(Vec::new());
        }

        let references = self.uploader.ingest(images).await?;
        if references.len() != images.len() {
            return Err(IngestionError::CountMismatch {
                expected: images.len(),
                actual: references.len(),
            }
            .into());
        }

        Ok(references)
    }
}

/// Query-string form of a [`QuerySpec`]
fn query_params(query: &QuerySpec) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();

    if let CategorySelection::Any(categories) = &query.categories {
        if !categories.is_empty() {
            let names: Vec<&str> = categories.iter().map(|c| c.as_str()).collect();
            params.push(("categories", names.join(",")));
        }
    }
    if let Some(min) = query.min_rating {
        params.push(("min_rating", min.to_string()));
    }
    if let Some(max) = query.max_rating {
        params.push(("max_rating", max.to_string()));
    }
    params.push(("sort", query.sort_order.as_str().to_string()));

    params
}

/// Map non-success statuses to a backend error
async fn check_status(response: Response) -> Result<Response, ReviewError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    warn!(status = %status, body = %body, "Review backend returned an error");

    Err(ReviewError::Backend {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl ReviewService for HttpReviewService {
    #[instrument(skip(self, query), fields(sort = %query.sort_order))]
    async fn list_reviews(&self, query: &QuerySpec) -> Result<Vec<Review>, ReviewError> {
        validate_query(query)?;

        let response = self
            .client
            .get(self.url("/reviews"))
            .query(&query_params(query))
            .send()
            .await?;

        let reviews: Vec<Review> = check_status(response).await?.json().await?;

        debug!(count = reviews.len(), "Fetched reviews");

        Ok(reviews)
    }

    #[instrument(skip(self, draft), fields(rating = draft.rating, images = draft.images.len()))]
    async fn create_review(&self, draft: CreateReviewDraft) -> Result<Review, ReviewError> {
        validate_draft(&draft, &self.limits)?;

        let images = self.upload(&draft.images).await?;

        let body = NewReview {
            categories: &draft.categories,
            rating: draft.rating,
            title: &draft.title,
            description: &draft.description,
            images,
        };

        let response = self
            .client
            .post(self.url("/reviews"))
            .json(&body)
            .send()
            .await?;

        let review: Review = check_status(response).await?.json().await?;

        info!(id = review.id, "Review submitted");

        Ok(review)
    }

    async fn get_stats(&self) -> Result<Stats, ReviewError> {
        let response = self.client.get(self.url("/stats")).send().await?;
        Ok(check_status(response).await?.json().await?)
    }

    async fn ingest_images(&self, images: &[ImagePayload]) -> Result<Vec<String>, ReviewError> {
        validate_images(images, &self.limits)?;
        self.upload(images).await
    }
}
