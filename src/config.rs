use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ValidationError;
use crate::validation::{
    MAX_DESCRIPTION_CHARS, MAX_IMAGES_PER_REVIEW, MAX_IMAGE_BYTES, MAX_TITLE_CHARS,
};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub limits: Limits,
    pub ingestion: IngestionConfig,
    /// Populate a fresh in-memory service with the sample reviews
    pub seed: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig::default(),
            limits: Limits::default(),
            ingestion: IngestionConfig::default(),
            seed: true,
        }
    }
}

/// In-memory service behaviour
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub latency: LatencyConfig,
}

/// Simulated backend latency, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatencyConfig {
    pub list_ms: u64,
    pub create_ms: u64,
    pub ingest_ms: u64,
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            list_ms: 500,
            create_ms: 2000,
            ingest_ms: 1000,
        }
    }
}

impl LatencyConfig {
    /// No artificial delay at all
    pub fn none() -> Self {
        Self {
            list_ms: 0,
            create_ms: 0,
            ingest_ms: 0,
        }
    }

    pub fn list(&self) -> Duration {
        Duration::from_millis(self.list_ms)
    }

    pub fn create(&self) -> Duration {
        Duration::from_millis(self.create_ms)
    }

    pub fn ingest(&self) -> Duration {
        Duration::from_millis(self.ingest_ms)
    }
}

/// Submission constraints checked at the service boundary.
/// Values may only be tighter than the hard ceilings in `validation`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub max_images: usize,
    pub max_image_bytes: u64,
    pub title_max_chars: usize,
    pub description_max_chars: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_images: MAX_IMAGES_PER_REVIEW,
            max_image_bytes: MAX_IMAGE_BYTES,
            title_max_chars: MAX_TITLE_CHARS,
            description_max_chars: MAX_DESCRIPTION_CHARS,
        }
    }
}

impl Limits {
    pub fn images_max(&self) -> usize {
        self.max_images.min(MAX_IMAGES_PER_REVIEW)
    }

    pub fn image_bytes_max(&self) -> u64 {
        self.max_image_bytes.min(MAX_IMAGE_BYTES)
    }

    pub fn title_max(&self) -> usize {
        self.title_max_chars.min(MAX_TITLE_CHARS)
    }

    pub fn description_max(&self) -> usize {
        self.description_max_chars.min(MAX_DESCRIPTION_CHARS)
    }

    /// Reject any limit looser than its ceiling
    pub fn check(&self) -> Result<(), ValidationError> {
        let limits = [
            ("max_images", self.max_images as u64, MAX_IMAGES_PER_REVIEW as u64),
            ("max_image_bytes", self.max_image_bytes, MAX_IMAGE_BYTES),
            ("title_max_chars", self.title_max_chars as u64, MAX_TITLE_CHARS as u64),
            (
                "description_max_chars",
                self.description_max_chars as u64,
                MAX_DESCRIPTION_CHARS as u64,
            ),
        ];

        for (name, value, max) in limits {
            if value > max {
                return Err(ValidationError::LimitAboveCeiling { name, value, max });
            }
        }

        Ok(())
    }
}

/// Where image uploads go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestionBackend {
    #[default]
    Placeholder,
    Http,
}

/// Image ingestion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestionConfig {
    pub backend: IngestionBackend,
    /// Base of generated placeholder references
    pub placeholder_base: String,
    /// Upload endpoint, required for the http backend
    pub endpoint: Option<String>,
    pub timeout_ms: u64,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            backend: IngestionBackend::Placeholder,
            placeholder_base: "/placeholder.svg".to_string(),
            endpoint: None,
            timeout_ms: 10_000,
        }
    }
}

impl IngestionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            info!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .limits
            .check()
            .with_context(|| format!("Invalid limits in config file: {}", path.display()))?;

        info!(path = %path.display(), "Loaded configuration");

        Ok(config)
    }

    /// Defaults with all simulated latency removed
    pub fn without_latency() -> Self {
        let mut config = Self::default();
        config.service.latency = LatencyConfig::none();
        config
    }
}
