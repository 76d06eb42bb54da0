use crate::models::{Review, Stats};
use crate::validation::MAX_RATING;

/// Star bar for a rating, e.g. `★★★☆☆`
pub fn stars(rating: u8) -> String {
    let filled = rating.min(MAX_RATING) as usize;
    let empty = MAX_RATING as usize - filled;
    format!("{}{}", "★".repeat(filled), "☆".repeat(empty))
}

/// Generate a markdown entry for a single review
pub fn render_review(review: &Review) -> String {
    let mut md = String::new();

    md.push_str(&format!("#### {} `#{}`\n", review.title, review.id));

    let categories: Vec<&str> = review.categories.iter().map(|c| c.label()).collect();
    md.push_str(&format!(
        "{} ({}/5) · {} · {}\n\n",
        stars(review.rating),
        review.rating,
        review.submitted_date.format("%Y-%m-%d"),
        categories.join(", ")
    ));

    md.push_str(&format!("{}\n\n", review.description));

    match review.images.len() {
        0 => {}
        1 => md.push_str("📷 1 photo\n\n"),
        n => md.push_str(&format!("📷 {} photos\n\n", n)),
    }

    md.push_str("---\n\n");

    md
}

/// Generate a markdown listing with a stats header
pub fn render_listing(reviews: &[Review], stats: &Stats) -> String {
    let mut md = String::new();

    md.push_str("## Resident Reviews\n\n");

    md.push_str(&format!(
        "| Reviews | Average | Last submission |\n|---------|---------|-----------------|\n| {} | {:.1} | {} |\n\n",
        stats.total,
        stats.average_rating,
        stats.last_submission_date.format("%Y-%m-%d")
    ));

    if reviews.is_empty() {
        md.push_str("No reviews match the current filters.\n");
        return md;
    }

    md.push_str(&format!("Showing {} of {} reviews.\n\n", reviews.len(), stats.total));

    for review in reviews {
        md.push_str(&render_review(review));
    }

    md.push_str("All reviews are anonymous.\n");

    md
}
