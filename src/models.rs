use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Name accepted in category lists to mean "no category filter"
pub const ALL_CATEGORIES_SENTINEL: &str = "all";

/// Subject area of a review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Construction,
    Services,
    CommonAreas,
    Security,
    Administration,
}

impl Category {
    /// Every category in display order
    pub const ALL: [Category; 5] = [
        Category::Construction,
        Category::Services,
        Category::CommonAreas,
        Category::Security,
        Category::Administration,
    ];

    /// Human-readable label
    pub fn label(self) -> &'static str {
        match self {
            Category::Construction => "Construction",
            Category::Services => "Services",
            Category::CommonAreas => "Common Areas",
            Category::Security => "Security",
            Category::Administration => "Administration",
        }
    }

    /// Stable wire name
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Construction => "construction",
            Category::Services => "services",
            Category::CommonAreas => "common_areas",
            Category::Security => "security",
            Category::Administration => "administration",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    /// Accepts labels ("Common Areas"), wire names ("common_areas") and
    /// variant names ("CommonAreas"), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();

        Category::ALL
            .iter()
            .copied()
            .find(|category| {
                name.eq_ignore_ascii_case(category.label())
                    || name.eq_ignore_ascii_case(category.as_str())
                    || name.eq_ignore_ascii_case(&format!("{:?}", category))
            })
            .ok_or_else(|| ValidationError::UnknownCategory(s.to_string()))
    }
}

/// Category part of a query
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategorySelection {
    #[default]
    All,
    /// Matches reviews sharing at least one of these categories
    Any(Vec<Category>),
}

impl CategorySelection {
    pub fn any(categories: impl IntoIterator<Item = Category>) -> Self {
        let mut selected = Vec::new();
        for category in categories {
            if !selected.contains(&category) {
                selected.push(category);
            }
        }
        Self::Any(selected)
    }

    /// Parse a list of category names. Any occurrence of the "all" sentinel
    /// turns the whole selection into `All`.
    pub fn from_names<I, S>(names: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut categories = Vec::new();
        for name in names {
            let name = name.as_ref();
            if name.trim().eq_ignore_ascii_case(ALL_CATEGORIES_SENTINEL) {
                return Ok(Self::All);
            }
            categories.push(name.parse::<Category>()?);
        }

        if categories.is_empty() {
            return Ok(Self::All);
        }

        Ok(Self::any(categories))
    }

    /// True when this selection imposes no constraint
    pub fn is_unfiltered(&self) -> bool {
        match self {
            CategorySelection::All => true,
            CategorySelection::Any(wanted) => wanted.is_empty(),
        }
    }

    /// Check whether a review's categories intersect the selection
    pub fn matches(&self, categories: &[Category]) -> bool {
        match self {
            CategorySelection::All => true,
            CategorySelection::Any(wanted) => {
                wanted.is_empty() || wanted.iter().any(|c| categories.contains(c))
            }
        }
    }
}

/// Ordering applied to listed reviews
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
    Best,
    Worst,
}

impl SortOrder {
    pub const ALL: [SortOrder; 4] = [
        SortOrder::Newest,
        SortOrder::Oldest,
        SortOrder::Best,
        SortOrder::Worst,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Newest => "newest",
            SortOrder::Oldest => "oldest",
            SortOrder::Best => "best",
            SortOrder::Worst => "worst",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortOrder::ALL
            .into_iter()
            .find(|order| order.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::UnknownSortOrder(s.to_string()))
    }
}

/// A stored, anonymous review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: u64,
    pub categories: Vec<Category>,
    pub rating: u8,
    pub title: String,
    pub description: String,
    pub submitted_date: NaiveDate,
    pub anonymous: bool,
    #[serde(default)]
    pub images: Vec<String>,
}

/// A raw image as submitted by a resident
#[derive(Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub file_name: String,
    /// Media type declared by the submitter, e.g. `image/jpeg`
    pub media_type: String,
    /// Size in bytes declared by the submitter
    pub declared_size: u64,
    pub bytes: Vec<u8>,
}

impl ImagePayload {
    pub fn new(
        file_name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            media_type: media_type.into(),
            declared_size: bytes.len() as u64,
            bytes,
        }
    }
}

impl fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImagePayload")
            .field("file_name", &self.file_name)
            .field("media_type", &self.media_type)
            .field("declared_size", &self.declared_size)
            .finish_non_exhaustive()
    }
}

/// Unvalidated input for creating a review
#[derive(Debug, Clone, Default)]
pub struct CreateReviewDraft {
    pub categories: Vec<Category>,
    pub rating: u8,
    pub title: String,
    pub description: String,
    pub images: Vec<ImagePayload>,
}

impl CreateReviewDraft {
    pub fn new(
        categories: impl IntoIterator<Item = Category>,
        rating: u8,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            categories: categories.into_iter().collect(),
            rating,
            title: title.into(),
            description: description.into(),
            images: Vec::new(),
        }
    }

    pub fn with_images(mut self, images: Vec<ImagePayload>) -> Self {
        self.images = images;
        self
    }
}

/// Filter and sort request against the review collection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuerySpec {
    pub categories: CategorySelection,
    pub min_rating: Option<u8>,
    pub max_rating: Option<u8>,
    pub sort_order: SortOrder,
}

impl QuerySpec {
    pub fn with_categories(mut self, categories: impl IntoIterator<Item = Category>) -> Self {
        self.categories = CategorySelection::any(categories);
        self
    }

    pub fn with_min_rating(mut self, rating: u8) -> Self {
        self.min_rating = Some(rating);
        self
    }

    pub fn with_max_rating(mut self, rating: u8) -> Self {
        self.max_rating = Some(rating);
        self
    }

    pub fn sorted_by(mut self, order: SortOrder) -> Self {
        self.sort_order = order;
        self
    }
}

/// Aggregate summary over every stored review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub total: usize,
    pub average_rating: f64,
    pub last_submission_date: NaiveDate,
}
