use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::models::{QuerySpec, Review, SortOrder, Stats};
use crate::validation::validate_query;

/// Filter and order a snapshot according to `spec`
pub fn apply(snapshot: &[Review], spec: &QuerySpec) -> Result<Vec<Review>, ValidationError> {
    validate_query(spec)?;

    let mut reviews: Vec<Review> = snapshot
        .iter()
        .filter(|review| matches(review, spec))
        .cloned()
        .collect();

    sort(&mut reviews, spec.sort_order);

    Ok(reviews)
}

/// Check a single review against every filter in `spec`
pub fn matches(review: &Review, spec: &QuerySpec) -> bool {
    if !spec.categories.matches(&review.categories) {
        return false;
    }

    if let Some(min) = spec.min_rating {
        if review.rating < min {
            return false;
        }
    }

    if let Some(max) = spec.max_rating {
        if review.rating > max {
            return false;
        }
    }

    true
}

/// Stable sort; reviews with equal keys keep their relative order
pub fn sort(reviews: &mut [Review], order: SortOrder) {
    match order {
        SortOrder::Newest => reviews.sort_by(|a, b| b.submitted_date.cmp(&a.submitted_date)),
        SortOrder::Oldest => reviews.sort_by(|a, b| a.submitted_date.cmp(&b.submitted_date)),
        SortOrder::Best => reviews.sort_by(|a, b| b.rating.cmp(&a.rating)),
        SortOrder::Worst => reviews.sort_by(|a, b| a.rating.cmp(&b.rating)),
    }
}

/// Aggregate statistics over an unfiltered snapshot
pub fn stats(snapshot: &[Review], today: NaiveDate) -> Stats {
    let total = snapshot.len();
    let sum: u64 = snapshot.iter().map(|r| u64::from(r.rating)).sum();

    // Head of the newest-first ordering.
    let last_submission_date = snapshot
        .iter()
        .map(|r| r.submitted_date)
        .max()
        .unwrap_or(today);

    Stats {
        total,
        average_rating: round_tenths(sum, total as u64),
        last_submission_date,
    }
}

/// Mean of `sum / count` rounded half-up to one decimal place.
/// Computed on integers so .x5 boundaries never drift.
fn round_tenths(sum: u64, count: u64) -> f64 {
    if count == 0 {
        return 0.0;
    }

    let tenths = (sum * 20 + count) / (count * 2);
    tenths as f64 / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use crate::seed::sample_reviews;

    fn ids(reviews: &[Review]) -> Vec<u64> {
        reviews.iter().map(|r| r.id).collect()
    }

    fn review(id: u64, rating: u8, date: (i32, u32, u32)) -> Review {
        Review {
            id,
            categories: vec![Category::Services],
            rating,
            title: format!("Review {}", id),
            description: "Details".to_string(),
            submitted_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            anonymous: true,
            images: Vec::new(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn test_best_order_breaks_ties_by_store_order() {
        let snapshot = sample_reviews();
        let result = apply(&snapshot, &QuerySpec::default().sorted_by(SortOrder::Best)).unwrap();
        assert_eq!(ids(&result), vec![6, 4, 7, 3, 1, 5, 2]);
    }

    #[test]
    fn test_worst_order() {
        let snapshot = sample_reviews();
        let result = apply(&snapshot, &QuerySpec::default().sorted_by(SortOrder::Worst)).unwrap();
        assert_eq!(ids(&result), vec![2, 1, 5, 3, 4, 7, 6]);
    }

    #[test]
    fn test_date_orders() {
        let snapshot = sample_reviews();

        let newest = apply(&snapshot, &QuerySpec::default()).unwrap();
        assert_eq!(ids(&newest), vec![6, 7, 1, 2, 3, 4, 5]);

        let oldest = apply(&snapshot, &QuerySpec::default().sorted_by(SortOrder::Oldest)).unwrap();
        assert_eq!(ids(&oldest), vec![5, 4, 3, 2, 1, 7, 6]);
    }

    #[test]
    fn test_equal_dates_keep_store_order() {
        let snapshot = vec![
            review(3, 2, (2024, 1, 5)),
            review(2, 4, (2024, 1, 5)),
            review(1, 5, (2024, 1, 1)),
        ];

        let result = apply(&snapshot, &QuerySpec::default()).unwrap();
        assert_eq!(ids(&result), vec![3, 2, 1]);

        let result = apply(&snapshot, &QuerySpec::default().sorted_by(SortOrder::Oldest)).unwrap();
        assert_eq!(ids(&result), vec![1, 3, 2]);
    }

    #[test]
    fn test_category_filter_uses_intersection() {
        let snapshot = sample_reviews();
        let spec =
            QuerySpec::default().with_categories([Category::Security, Category::Construction]);
        let result = apply(&snapshot, &spec).unwrap();

        assert_eq!(ids(&result), vec![7, 1, 4, 5]);
        for review in &result {
            assert!(review
                .categories
                .iter()
                .any(|c| *c == Category::Security || *c == Category::Construction));
        }
    }

    #[test]
    fn test_rating_bounds() {
        let snapshot = sample_reviews();

        let result = apply(&snapshot, &QuerySpec::default().with_min_rating(4)).unwrap();
        assert!(result.iter().all(|r| r.rating >= 4));
        assert_eq!(result.len(), 3);

        let result = apply(&snapshot, &QuerySpec::default().with_max_rating(2)).unwrap();
        assert!(result.iter().all(|r| r.rating <= 2));
        assert_eq!(result.len(), 3);

        let spec = QuerySpec::default()
            .with_categories([Category::Services])
            .with_min_rating(2)
            .with_max_rating(4);
        let result = apply(&snapshot, &spec).unwrap();
        assert_eq!(ids(&result), vec![1]);
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let snapshot = sample_reviews();
        let spec = QuerySpec::default().with_min_rating(5).with_max_rating(1);
        assert_eq!(
            apply(&snapshot, &spec),
            Err(ValidationError::InvertedRatingBounds { min: 5, max: 1 })
        );
    }

    #[test]
    fn test_apply_is_repeatable() {
        let snapshot = sample_reviews();
        let spec = QuerySpec::default().sorted_by(SortOrder::Worst);
        assert_eq!(apply(&snapshot, &spec).unwrap(), apply(&snapshot, &spec).unwrap());
    }

    #[test]
    fn test_stats_over_samples() {
        let stats = stats(&sample_reviews(), today());
        assert_eq!(stats.total, 7);
        assert_eq!(stats.average_rating, 3.0);
        assert_eq!(
            stats.last_submission_date,
            NaiveDate::from_ymd_opt(2024, 1, 20).unwrap()
        );
    }

    #[test]
    fn test_stats_empty_snapshot() {
        let stats = stats(&[], today());
        assert_eq!(stats.total, 0);
        assert_eq!(stats.average_rating, 0.0);
        assert_eq!(stats.last_submission_date, today());
    }

    #[test]
    fn test_average_rounds_half_up() {
        assert_eq!(round_tenths(13, 4), 3.3); // 3.25
        assert_eq!(round_tenths(7, 2), 3.5);
        assert_eq!(round_tenths(10, 3), 3.3); // 3.333
        assert_eq!(round_tenths(11, 3), 3.7); // 3.666
        assert_eq!(round_tenths(5, 1), 5.0);
    }
}
