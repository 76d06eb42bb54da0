use async_trait::async_trait;
use tracing::debug;

use super::ImageIngestor;
use crate::error::IngestionError;
use crate::models::ImagePayload;

/// Stand-in ingestor that stores nothing and hands out placeholder references
pub struct PlaceholderIngestor {
    base: String,
}

impl PlaceholderIngestor {
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    fn reference(&self, position: usize) -> String {
        format!(
            "{}?height=300&width=400&query=resident-upload-{}",
            self.base, position
        )
    }
}

impl Default for PlaceholderIngestor {
    fn default() -> Self {
        Self::new("/placeholder.svg")
    }
}

#[async_trait]
impl ImageIngestor for PlaceholderIngestor {
    async fn ingest(&self, images: &[ImagePayload]) -> Result<Vec<String>, IngestionError> {
        let references: Vec<String> = (1..=images.len()).map(|n| self.reference(n)).collect();

        debug!(count = references.len(), "Generated placeholder image references");

        Ok(references)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(name: &str) -> ImagePayload {
        ImagePayload::new(name, "image/png", vec![1, 2, 3])
    }

    #[tokio::test]
    async fn test_one_reference_per_image_in_order() {
        let ingestor = PlaceholderIngestor::default();
        let refs = ingestor
            .ingest(&[image("a.png"), image("b.png"), image("c.png")])
            .await
            .unwrap();

        assert_eq!(refs.len(), 3);
        assert_eq!(refs[0], "/placeholder.svg?height=300&width=400&query=resident-upload-1");
        assert!(refs[2].ends_with("resident-upload-3"));
    }

    #[tokio::test]
    async fn test_deterministic_and_configurable() {
        let ingestor = PlaceholderIngestor::new("https://cdn.example.com/blank.png");
        let first = ingestor.ingest(&[image("a.png")]).await.unwrap();
        let second = ingestor.ingest(&[image("a.png")]).await.unwrap();

        assert_eq!(first, second);
        assert!(first[0].starts_with("https://cdn.example.com/blank.png?"));
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let refs = PlaceholderIngestor::default().ingest(&[]).await.unwrap();
        assert!(refs.is_empty());
    }
}
