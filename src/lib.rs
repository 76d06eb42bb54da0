pub mod config;
pub mod error;
pub mod ingest;
pub mod models;
pub mod query;
pub mod render;
pub mod seed;
pub mod service;
pub mod store;
pub mod validation;

pub use config::Config;
pub use error::{IngestionError, ReviewError, ValidationError};
pub use ingest::{HttpIngestor, ImageIngestor, PlaceholderIngestor};
pub use models::*;
pub use render::{render_listing, render_review};
pub use service::{HttpReviewService, InMemoryReviewService, ReviewService};
pub use store::{Clock, FixedClock, ReviewStore, SystemClock};
