use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use super::ImageIngestor;
use crate::error::IngestionError;
use crate::models::ImagePayload;

/// Uploads images to an object-storage endpoint, one request per image
pub struct HttpIngestor {
    client: Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    url: String,
}

impl HttpIngestor {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(Client::new(), endpoint)
    }

    pub fn with_client(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        }
    }

    async fn upload(&self, index: usize, image: &ImagePayload) -> Result<String, IngestionError> {
        debug!(index, file = %image.file_name, size = image.declared_size, "Uploading image");

        let response = self
            .client
            .post(format!("{}/uploads", self.endpoint))
            .header(CONTENT_TYPE, image.media_type.as_str())
            .body(image.bytes.clone())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(index, status = %status, body = %body, "Image upload rejected");
            return Err(IngestionError::Rejected {
                index,
                reason: format!("{} {}", status, body).trim().to_string(),
            });
        }

        let upload: UploadResponse = response.json().await?;

        Ok(upload.url)
    }
}

#[async_trait]
impl ImageIngestor for HttpIngestor {
    #[instrument(skip(self, images), fields(count = images.len(), endpoint = %self.endpoint))]
    async fn ingest(&self, images: &[ImagePayload]) -> Result<Vec<String>, IngestionError> {
        let mut references = Vec::with_capacity(images.len());

        for (index, image) in images.iter().enumerate() {
            references.push(self.upload(index, image).await?);
        }

        info!(count = references.len(), "Images uploaded");

        Ok(references)
    }
}
