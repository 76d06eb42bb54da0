use std::time::Duration;

use thiserror::Error;

/// Errors surfaced by review service operations
#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("image ingestion failed: {0}")]
    Ingestion(#[from] IngestionError),

    #[error("backend returned {status}: {body}")]
    Backend { status: u16, body: String },

    #[error("request to review backend failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ReviewError {
    pub fn is_validation(&self) -> bool {
        matches!(self, ReviewError::Validation(_))
    }

    pub fn is_ingestion(&self) -> bool {
        matches!(self, ReviewError::Ingestion(_))
    }
}

/// Caller input that breaks a submission or query constraint
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("at least one category is required")]
    NoCategories,

    #[error("rating {0} is outside 1..=5")]
    RatingOutOfRange(u8),

    #[error("title must not be empty")]
    EmptyTitle,

    #[error("title has {len} characters, maximum is {max}")]
    TitleTooLong { len: usize, max: usize },

    #[error("description must not be empty")]
    EmptyDescription,

    #[error("description has {len} characters, maximum is {max}")]
    DescriptionTooLong { len: usize, max: usize },

    #[error("{count} images submitted, maximum is {max}")]
    TooManyImages { count: usize, max: usize },

    #[error("image {index} ({file_name}) is {size} bytes, maximum is {max}")]
    ImageTooLarge {
        index: usize,
        file_name: String,
        size: u64,
        max: u64,
    },

    #[error("image {index} ({file_name}) has unsupported media type '{media_type}'")]
    UnsupportedMediaType {
        index: usize,
        file_name: String,
        media_type: String,
    },

    #[error("rating bound {0} is outside 1..=5")]
    RatingBoundOutOfRange(u8),

    #[error("minimum rating {min} is greater than maximum rating {max}")]
    InvertedRatingBounds { min: u8, max: u8 },

    #[error("unknown category '{0}'")]
    UnknownCategory(String),

    #[error("unknown sort order '{0}'")]
    UnknownSortOrder(String),

    #[error("limit {name} = {value} exceeds the maximum of {max}")]
    LimitAboveCeiling {
        name: &'static str,
        value: u64,
        max: u64,
    },

    #[error("review id {0} appears more than once")]
    DuplicateReviewId(u64),
}

/// Failure turning raw images into references
#[derive(Debug, Error)]
pub enum IngestionError {
    #[error("upload of image {index} rejected: {reason}")]
    Rejected { index: usize, reason: String },

    #[error("expected {expected} image references, got {actual}")]
    CountMismatch { expected: usize, actual: usize },

    #[error("image ingestion timed out after {0:?}")]
    TimedOut(Duration),

    #[error("upload request failed: {0}")]
    Transport(#[from] reqwest::Error),
}
