use chrono::NaiveDate;

use crate::models::{Category, Review};

const PLACEHOLDER_IMAGE: &str = "/placeholder.svg?height=300&width=400";

struct Sample {
    id: u64,
    categories: &'static [Category],
    rating: u8,
    title: &'static str,
    description: &'static str,
    date: (i32, u32, u32),
    images: usize,
}

const SAMPLES: &[Sample] = &[
    Sample {
        id: 1,
        categories: &[Category::Construction, Category::Services],
        rating: 2,
        title: "Roof leaks after the rain",
        description: "Since the last storms my roof has been leaking. Several neighbours \
                      have the same problem and the builder has not given a satisfactory answer.",
        date: (2024, 1, 15),
        images: 2,
    },
    Sample {
        id: 2,
        categories: &[Category::Services],
        rating: 1,
        title: "Constant water outages",
        description: "The water supply is cut frequently, especially in the mornings. It \
                      disrupts our daily routine and we have not received a clear explanation.",
        date: (2024, 1, 12),
        images: 1,
    },
    Sample {
        id: 3,
        categories: &[Category::CommonAreas, Category::Administration],
        rating: 3,
        title: "Garden maintenance",
        description: "The green areas need better upkeep. The lawn is neglected and some \
                      trees need pruning.",
        date: (2024, 1, 10),
        images: 3,
    },
    Sample {
        id: 4,
        categories: &[Category::Security],
        rating: 4,
        title: "Good response from the security staff",
        description: "The security staff have been attentive and professional. Residents \
                      feel safe in the complex.",
        date: (2024, 1, 8),
        images: 0,
    },
    Sample {
        id: 5,
        categories: &[Category::Construction],
        rating: 2,
        title: "Cracks in the walls",
        description: "Cracks have appeared on the interior walls of my house. I am worried \
                      it is a structural problem the builder should inspect.",
        date: (2024, 1, 5),
        images: 2,
    },
    Sample {
        id: 6,
        categories: &[Category::Services, Category::Administration],
        rating: 5,
        title: "Excellent customer service",
        description: "The administration answered my request quickly and solved the problem \
                      efficiently.",
        date: (2024, 1, 20),
        images: 0,
    },
    Sample {
        id: 7,
        categories: &[Category::CommonAreas, Category::Security],
        rating: 4,
        title: "Improvements to the recreation areas",
        description: "There have been noticeable improvements to the playground and the \
                      exercise area. The children are very happy.",
        date: (2024, 1, 18),
        images: 1,
    },
];

/// The sample reviews a fresh service starts with, in store order
pub fn sample_reviews() -> Vec<Review> {
    SAMPLES
        .iter()
        .filter_map(|s| {
            let submitted_date = NaiveDate::from_ymd_opt(s.date.0, s.date.1, s.date.2)?;
            Some(Review {
                id: s.id,
                categories: s.categories.to_vec(),
                rating: s.rating,
                title: s.title.to_string(),
                description: s.description.to_string(),
                submitted_date,
                anonymous: true,
                images: vec![PLACEHOLDER_IMAGE.to_string(); s.images],
            })
        })
        .collect()
}
