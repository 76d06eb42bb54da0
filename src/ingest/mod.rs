pub mod http;
pub mod placeholder;

pub use http::HttpIngestor;
pub use placeholder::PlaceholderIngestor;

use async_trait::async_trait;

use crate::error::IngestionError;
use crate::models::ImagePayload;

/// Turns raw image payloads into stable reference strings.
///
/// Implementations return exactly one reference per payload, in input order,
/// or fail the whole batch. Count, size and media type are checked by the
/// caller before ingestion runs.
#[async_trait]
pub trait ImageIngestor: Send + Sync {
    async fn ingest(&self, images: &[ImagePayload]) -> Result<Vec<String>, IngestionError>;
}
