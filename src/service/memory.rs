use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, info, instrument};

use super::ReviewService;
use crate::config::{Config, IngestionBackend, LatencyConfig, Limits};
use crate::error::{IngestionError, ReviewError, ValidationError};
use crate::ingest::{HttpIngestor, ImageIngestor, PlaceholderIngestor};
use crate::models::{CreateReviewDraft, ImagePayload, QuerySpec, Review, Stats};
use crate::query;
use crate::seed::sample_reviews;
use crate::store::{Clock, ReviewStore, SystemClock};
use crate::validation::{validate_draft, validate_images};

const DEFAULT_INGEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Review service backed by process memory
pub struct InMemoryReviewService {
    store: ReviewStore,
    ingestor: Arc<dyn ImageIngestor>,
    limits: Limits,
    latency: LatencyConfig,
}

impl InMemoryReviewService {
    pub fn builder() -> InMemoryReviewServiceBuilder {
        InMemoryReviewServiceBuilder::default()
    }

    /// Build a service from configuration, seeding it when `config.seed` is set
    pub fn from_config(config: &Config) -> Result<Self> {
        let ingestor: Arc<dyn ImageIngestor> = match config.ingestion.backend {
            IngestionBackend::Placeholder => {
                Arc::new(PlaceholderIngestor::new(config.ingestion.placeholder_base.clone()))
            }
            IngestionBackend::Http => {
                let endpoint = config
                    .ingestion
                    .endpoint
                    .clone()
                    .context("ingestion.endpoint is required for the http backend")?;
                Arc::new(HttpIngestor::new(endpoint))
            }
        };

        let mut builder = Self::builder()
            .ingestor(ingestor)
            .limits(config.limits.clone())
            .latency(config.service.latency)
            .ingest_timeout(config.ingestion.timeout());

        if config.seed {
            builder = builder.reviews(sample_reviews());
        }

        let service = builder.build().context("Invalid initial reviews")?;

        info!(
            backend = ?config.ingestion.backend,
            seeded = config.seed,
            "Initialized in-memory review service"
        );

        Ok(service)
    }

    /// Direct access to the underlying store
    pub fn store(&self) -> &ReviewStore {
        &self.store
    }
}

#[async_trait]
impl ReviewService for InMemoryReviewService {
    #[instrument(skip(self, query), fields(sort = %query.sort_order))]
    async fn list_reviews(&self, query: &QuerySpec) -> Result<Vec<Review>, ReviewError> {
        simulate_latency(self.latency.list()).await;

        let snapshot = self.store.all_reviews().await;
        let reviews = query::apply(&snapshot, query)?;

        debug!(count = reviews.len(), "Listed reviews");

        Ok(reviews)
    }

    #[instrument(skip(self, draft), fields(rating = draft.rating, images = draft.images.len()))]
    async fn create_review(&self, draft: CreateReviewDraft) -> Result<Review, ReviewError> {
        validate_draft(&draft, &self.limits)?;

        simulate_latency(self.latency.create()).await;

        self.store.create_review(draft).await
    }

    async fn get_stats(&self) -> Result<Stats, ReviewError> {
        simulate_latency(self.latency.list()).await;

        let snapshot = self.store.all_reviews().await;
        Ok(query::stats(&snapshot, self.store.today()))
    }

    #[instrument(skip(self, images), fields(count = images.len()))]
    async fn ingest_images(&self, images: &[ImagePayload]) -> Result<Vec<String>, ReviewError> {
        validate_images(images, &self.limits)?;

        Ok(self.ingestor.ingest(images).await?)
    }
}

/// Builder for [`InMemoryReviewService`]. Defaults to placeholder ingestion,
/// the system clock, an empty store and no simulated latency.
pub struct InMemoryReviewServiceBuilder {
    ingestor: Arc<dyn ImageIngestor>,
    clock: Arc<dyn Clock>,
    reviews: Vec<Review>,
    limits: Limits,
    latency: LatencyConfig,
    ingest_timeout: Duration,
}

impl Default for InMemoryReviewServiceBuilder {
    fn default() -> Self {
        Self {
            ingestor: Arc::new(PlaceholderIngestor::default()),
            clock: Arc::new(SystemClock),
            reviews: Vec::new(),
            limits: Limits::default(),
            latency: LatencyConfig::none(),
            ingest_timeout: DEFAULT_INGEST_TIMEOUT,
        }
    }
}

impl InMemoryReviewServiceBuilder {
    pub fn ingestor(mut self, ingestor: Arc<dyn ImageIngestor>) -> Self {
        self.ingestor = ingestor;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Initial reviews, in store order
    pub fn reviews(mut self, reviews: Vec<Review>) -> Self {
        self.reviews = reviews;
        self
    }

    pub fn limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn latency(mut self, latency: LatencyConfig) -> Self {
        self.latency = latency;
        self
    }

    pub fn ingest_timeout(mut self, timeout: Duration) -> Self {
        self.ingest_timeout = timeout;
        self
    }

    /// Fails if the initial reviews break a stored-review invariant
    pub fn build(self) -> Result<InMemoryReviewService, ValidationError> {
        let ingestor: Arc<dyn ImageIngestor> = Arc::new(SimulatedUpload {
            inner: self.ingestor,
            delay: self.latency.ingest(),
            timeout: self.ingest_timeout,
        });

        let store = ReviewStore::with_reviews(Arc::clone(&ingestor), self.clock, self.reviews)?;

        Ok(InMemoryReviewService {
            store,
            ingestor,
            limits: self.limits,
            latency: self.latency,
        })
    }
}

/// Adds the simulated upload delay and bounds the whole upload by a timeout
struct SimulatedUpload {
    inner: Arc<dyn ImageIngestor>,
    delay: Duration,
    timeout: Duration,
}

#[async_trait]
impl ImageIngestor for SimulatedUpload {
    async fn ingest(&self, images: &[ImagePayload]) -> Result<Vec<String>, IngestionError> {
        let upload = async {
            simulate_latency(self.delay).await;
            self.inner.ingest(images).await
        };

        match tokio::time::timeout(self.timeout, upload).await {
            Ok(result) => result,
            Err(_) => Err(IngestionError::TimedOut(self.timeout)),
        }
    }
}

async fn simulate_latency(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
