use crate::config::Limits;
use crate::error::ValidationError;
use crate::models::{Category, CreateReviewDraft, ImagePayload, QuerySpec, Review};

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

// Hard ceilings. Configured limits may tighten these, never loosen them.
pub const MAX_IMAGES_PER_REVIEW: usize = 5;
pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;
pub const MAX_TITLE_CHARS: usize = 100;
pub const MAX_DESCRIPTION_CHARS: usize = 1000;
pub const IMAGE_MEDIA_PREFIX: &str = "image/";

pub fn is_valid_rating(rating: u8) -> bool {
    (MIN_RATING..=MAX_RATING).contains(&rating)
}

/// Check a draft against every submission constraint
pub fn validate_draft(draft: &CreateReviewDraft, limits: &Limits) -> Result<(), ValidationError> {
    check_categories_and_rating(&draft.categories, draft.rating)?;
    check_text(
        &draft.title,
        &draft.description,
        limits.title_max(),
        limits.description_max(),
    )?;
    validate_images(&draft.images, limits)
}

/// Check image count, declared sizes and declared media types
pub fn validate_images(images: &[ImagePayload], limits: &Limits) -> Result<(), ValidationError> {
    check_image_count(images.len(), limits.images_max())?;

    let max_bytes = limits.image_bytes_max();
    for (index, image) in images.iter().enumerate() {
        if !image.media_type.starts_with(IMAGE_MEDIA_PREFIX) {
            return Err(ValidationError::UnsupportedMediaType {
                index,
                file_name: image.file_name.clone(),
                media_type: image.media_type.clone(),
            });
        }

        if image.declared_size > max_bytes {
            return Err(ValidationError::ImageTooLarge {
                index,
                file_name: image.file_name.clone(),
                size: image.declared_size,
                max: max_bytes,
            });
        }
    }

    Ok(())
}

/// Invariants every stored review holds, checked against the hard ceilings
pub fn check_draft_structure(draft: &CreateReviewDraft) -> Result<(), ValidationError> {
    check_categories_and_rating(&draft.categories, draft.rating)?;
    check_text(
        &draft.title,
        &draft.description,
        MAX_TITLE_CHARS,
        MAX_DESCRIPTION_CHARS,
    )?;
    check_image_count(draft.images.len(), MAX_IMAGES_PER_REVIEW)
}

/// Same invariants as [`check_draft_structure`], for an already built review
pub fn check_review(review: &Review) -> Result<(), ValidationError> {
    check_categories_and_rating(&review.categories, review.rating)?;
    check_text(
        &review.title,
        &review.description,
        MAX_TITLE_CHARS,
        MAX_DESCRIPTION_CHARS,
    )?;
    check_image_count(review.images.len(), MAX_IMAGES_PER_REVIEW)
}

fn check_categories_and_rating(
    categories: &[Category],
    rating: u8,
) -> Result<(), ValidationError> {
    if categories.is_empty() {
        return Err(ValidationError::NoCategories);
    }
    if !is_valid_rating(rating) {
        return Err(ValidationError::RatingOutOfRange(rating));
    }
    Ok(())
}

fn check_text(
    title: &str,
    description: &str,
    title_max: usize,
    description_max: usize,
) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    let len = title.chars().count();
    if len > title_max {
        return Err(ValidationError::TitleTooLong { len, max: title_max });
    }

    if description.trim().is_empty() {
        return Err(ValidationError::EmptyDescription);
    }
    let len = description.chars().count();
    if len > description_max {
        return Err(ValidationError::DescriptionTooLong {
            len,
            max: description_max,
        });
    }

    Ok(())
}

fn check_image_count(count: usize, max: usize) -> Result<(), ValidationError> {
    if count > max {
        return Err(ValidationError::TooManyImages { count, max });
    }
    Ok(())
}

/// Reject rating bounds that cannot describe a meaningful range
pub fn validate_query(spec: &QuerySpec) -> Result<(), ValidationError> {
    for bound in [spec.min_rating, spec.max_rating].into_iter().flatten() {
        if !is_valid_rating(bound) {
            return Err(ValidationError::RatingBoundOutOfRange(bound));
        }
    }

    if let (Some(min), Some(max)) = (spec.min_rating, spec.max_rating) {
        if min > max {
            return Err(ValidationError::InvertedRatingBounds { min, max });
        }
    }

    Ok(())
}
