// 🏷️ Category Entity - Catalog sections with slugs derived from the title
//
// "Slug is a FUNCTION of title, not a field you set"
//
// - The slug is recomputed on every save, so renaming a category always
//   moves its URL, even if someone edited the slug by hand before
// - Categories are listed alphabetically by title
// - Deleting a category keeps its products (their category becomes null)

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::slug::slugify;
use crate::validation::{FieldChecks, ValidationResult};

pub const TITLE_MAX_CHARS: usize = 255;

// ============================================================================
// CATEGORY ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Storage id, `None` until the first save
    pub id: Option<i64>,

    pub title: String,

    /// Derived from `title` at save time. Anything written here by hand is
    /// overwritten by the next save.
    pub slug: String,

    /// Ranking hint for storefront listings
    pub popularity: i64,
}

impl Category {
    pub fn new(title: impl Into<String>) -> Self {
        Category {
            id: None,
            title: title.into(),
            slug: String::new(),
            popularity: 0,
        }
    }

    pub fn with_popularity(title: impl Into<String>, popularity: i64) -> Self {
        let mut category = Self::new(title);
        category.popularity = popularity;
        category
    }

    /// Apply a title (and optionally a new popularity) to an existing category.
    /// The slug follows on the next save.
    pub fn update(&mut self, title: impl Into<String>, popularity: Option<i64>) {
        self.title = title.into();
        if let Some(popularity) = popularity {
            self.popularity = popularity;
        }
    }

    /// Pre-save hook: re-derive the slug from the current title.
    pub fn prepare_save(&mut self) {
        self.slug = slugify(&self.title);
    }

    /// Canonical storefront path, e.g. `/catalog/drinks/`
    pub fn resolve_path(&self) -> String {
        category_path(&self.slug)
    }

    pub fn validate(&self) -> ValidationResult {
        FieldChecks::new("Category")
            .required("title", &self.title)
            .max_chars("title", &self.title, TITLE_MAX_CHARS)
            .sluggable("title", &self.title)
            .at_least("popularity", self.popularity, 0)
            .finish()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

pub(crate) fn category_path(slug: &str) -> String {
    format!("/catalog/{}/", slug)
}

// ============================================================================
// CATEGORY REFERENCE
// ============================================================================

/// What a product keeps of its category: the id for the foreign key and the
/// slug for building paths. Non-owning, the category lives on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: i64,
    pub slug: String,
}

impl CategoryRef {
    pub fn resolve_path(&self) -> String {
        category_path(&self.slug)
    }
}
