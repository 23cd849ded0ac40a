// 🛒 Product Entity - Priced catalog items
//
// Business rules applied at save time:
// - price == 0 forces in_stock = false (never the other way round: a product
//   that gets a price again stays unavailable until someone restocks it)
// - discount must stay within 0..=100 percent
//
// The discounted price is derived on every read and never stored.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::entities::category::{Category, CategoryRef};
use crate::entities::tag::Tag;
use crate::error::{CatalogError, CatalogResult};
use crate::timestamps::Timestamps;
use crate::validation::{FieldChecks, ValidationResult};

pub const TITLE_MAX_CHARS: usize = 255;
pub const IMAGE_MAX_CHARS: usize = 100;

/// Directory prefix image references are stored under.
pub const IMAGE_UPLOAD_DIR: &str = "product";

pub const DEFAULT_BONUS: u32 = 1;

// ============================================================================
// PRODUCT ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    // ========================================================================
    // IDENTITY
    // ========================================================================
    /// Storage id, `None` until the first save. Listings sort by it, newest first.
    pub id: Option<i64>,

    // ========================================================================
    // DESCRIPTION
    // ========================================================================
    pub title: String,

    /// Non-owning, becomes `None` when the category is deleted
    pub category: Option<CategoryRef>,

    /// Ids of attached tags
    pub tag_ids: BTreeSet<i64>,

    /// May be empty
    pub description: String,

    /// Relative asset path, e.g. "product/cola.png"
    pub image: Option<String>,

    // ========================================================================
    // PRICING & AVAILABILITY
    // ========================================================================
    pub price: f64,

    /// Percentage, 0..=100
    pub discount: f64,

    /// Loyalty points granted per purchase
    pub bonus: u32,

    pub in_stock: bool,

    // ========================================================================
    // TIME
    // ========================================================================
    /// Set by the store on save
    pub timestamps: Option<Timestamps>,
}

impl Product {
    pub fn new(title: impl Into<String>, price: f64) -> Self {
        Product {
            id: None,
            title: title.into(),
            category: None,
            tag_ids: BTreeSet::new(),
            description: String::new(),
            image: None,
            price,
            discount: 0.0,
            bonus: DEFAULT_BONUS,
            in_stock: true,
            timestamps: None,
        }
    }

    // ------------------------------------------------------------------------
    // Relations
    // ------------------------------------------------------------------------

    pub fn set_category(&mut self, category: &Category) -> CatalogResult<()> {
        let id = category.id.ok_or(CatalogError::NotPersisted("category"))?;
        self.category = Some(CategoryRef {
            id,
            slug: category.slug.clone(),
        });
        Ok(())
    }

    pub fn clear_category(&mut self) {
        self.category = None;
    }

    pub fn add_tag(&mut self, tag: &Tag) -> CatalogResult<()> {
        let id = tag.id.ok_or(CatalogError::NotPersisted("tag"))?;
        self.tag_ids.insert(id);
        Ok(())
    }

    /// Returns whether the tag was attached.
    pub fn remove_tag(&mut self, tag: &Tag) -> bool {
        tag.id.is_some_and(|id| self.tag_ids.remove(&id))
    }

    pub fn has_tag(&self, tag: &Tag) -> bool {
        tag.id.is_some_and(|id| self.tag_ids.contains(&id))
    }

    /// Attach an uploaded image by file name; it is stored under the
    /// product upload directory.
    pub fn set_image(&mut self, file_name: &str) {
        self.image = Some(format!("{}/{}", IMAGE_UPLOAD_DIR, file_name));
    }

    // ------------------------------------------------------------------------
    // Save-time rules
    // ------------------------------------------------------------------------

    /// Pre-save hook: a free product cannot be in stock.
    pub fn prepare_save(&mut self) {
        if self.price == 0.0 {
            self.in_stock = false;
        }
    }

    pub fn validate(&self) -> ValidationResult {
        let mut checks = FieldChecks::new("Product");
        checks
            .required("title", &self.title)
            .max_chars("title", &self.title, TITLE_MAX_CHARS)
            .finite("price", self.price)
            .in_range("discount", self.discount, 0.0, 100.0);
        if let Some(image) = &self.image {
            checks.max_chars("image", image, IMAGE_MAX_CHARS);
        }
        checks.finish()
    }

    // ------------------------------------------------------------------------
    // Derived values
    // ------------------------------------------------------------------------

    /// Price after discount, rounded to cents (half-to-even on the exact
    /// binary value). Recomputed on every call.
    ///
    /// The decimal goes back through its text form so the result is the
    /// nearest `f64` to the rounded cents.
    pub fn reduced_price(&self) -> f64 {
        let raw = self.price * (1.0 - self.discount / 100.0);
        Decimal::from_f64_retain(raw)
            .map(|d| d.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven))
            .and_then(|d| d.to_string().parse::<f64>().ok())
            .unwrap_or(raw)
    }

    /// Canonical storefront path, e.g. `/catalog/drinks/7/`
    pub fn resolve_path(&self) -> CatalogResult<String> {
        let category = self.category.as_ref().ok_or(CatalogError::MissingCategory)?;
        let id = self.id.ok_or(CatalogError::NotPersisted("product"))?;
        Ok(format!("{}{}/", category.resolve_path(), id))
    }

    pub fn created_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.timestamps.map(|t| t.created_at)
    }

    pub fn updated_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.timestamps.map(|t| t.updated_at)
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn drinks() -> Category {
        let mut category = Category::new("Drinks");
        category.id = Some(3);
        category.prepare_save();
        category
    }

    #[test]
    fn test_new_product_defaults() {
        let product = Product::new("Cola", 1.5);

        assert_eq!(product.discount, 0.0);
        assert_eq!(product.bonus, 1);
        assert!(product.in_stock);
        assert!(product.category.is_none());
        assert!(product.tag_ids.is_empty());
        assert!(product.timestamps.is_none());
    }

    #[test]
    fn test_zero_price_forces_out_of_stock() {
        let mut product = Product::new("Free sample", 0.0);
        product.in_stock = true;

        product.prepare_save();

        assert!(!product.in_stock);
    }

    #[test]
    fn test_nonzero_price_does_not_restock() {
        let mut product = Product::new("Sample", 0.0);
        product.prepare_save();
        assert!(!product.in_stock);

        product.price = 10.0;
        product.prepare_save();

        assert!(!product.in_stock, "restocking is a manual decision");
    }

    #[test]
    fn test_reduced_price() {
        let mut product = Product::new("Cola", 100.0);
        product.discount = 20.0;
        assert_eq!(product.reduced_price(), 80.0);

        product.price = 99.99;
        product.discount = 33.33;
        // 99.99 * 0.6667 = 66.663333...
        assert_eq!(product.reduced_price(), 66.66);

        product.price = 19.99;
        product.discount = 15.0;
        assert_eq!(product.reduced_price(), 16.99);
    }

    #[test]
    fn test_reduced_price_follows_current_values() {
        let mut product = Product::new("Cola", 50.0);
        assert_eq!(product.reduced_price(), 50.0);

        product.discount = 10.0;
        assert_eq!(product.reduced_price(), 45.0);

        product.price = 0.0;
        assert_eq!(product.reduced_price(), 0.0);
    }

    #[test]
    fn test_reduced_price_rounds_exact_binary_value() {
        // 2.675 is stored as 2.67499999..., so it rounds down
        assert_eq!(Product::new("a", 2.675).reduced_price(), 2.67);
        // exact halves go to the even cent
        assert_eq!(Product::new("b", 0.125).reduced_price(), 0.12);
        assert_eq!(Product::new("c", 0.375).reduced_price(), 0.38);
    }

    #[test]
    fn test_resolve_path_requires_category() {
        let mut product = Product::new("Cola", 1.5);
        product.id = Some(7);

        assert!(matches!(
            product.resolve_path(),
            Err(CatalogError::MissingCategory)
        ));
    }

    #[test]
    fn test_resolve_path_with_category() {
        let mut product = Product::new("Cola", 1.5);
        product.id = Some(7);
        product.set_category(&drinks()).unwrap();

        let path = product.resolve_path().unwrap();

        assert_eq!(path, "/catalog/drinks/7/");
        assert!(path.contains("drinks") && path.contains('7'));
    }

    #[test]
    fn test_resolve_path_unsaved_product() {
        let mut product = Product::new("Cola", 1.5);
        product.set_category(&drinks()).unwrap();

        assert!(matches!(
            product.resolve_path(),
            Err(CatalogError::NotPersisted("product"))
        ));
    }

    #[test]
    fn test_relations_need_saved_entities() {
        let mut product = Product::new("Cola", 1.5);

        assert!(matches!(
            product.set_category(&Category::new("Unsaved")),
            Err(CatalogError::NotPersisted("category"))
        ));
        assert!(matches!(
            product.add_tag(&Tag::new("unsaved")),
            Err(CatalogError::NotPersisted("tag"))
        ));
    }

    #[test]
    fn test_tags_form_a_set() {
        let mut product = Product::new("Cola", 1.5);
        let mut tag = Tag::new("fizzy");
        tag.id = Some(4);

        product.add_tag(&tag).unwrap();
        product.add_tag(&tag).unwrap();
        assert_eq!(product.tag_ids.len(), 1);
        assert!(product.has_tag(&tag));

        assert!(product.remove_tag(&tag));
        assert!(!product.remove_tag(&tag));
        assert!(!product.has_tag(&tag));
    }

    #[test]
    fn test_set_image_uses_upload_dir() {
        let mut product = Product::new("Cola", 1.5);
        product.set_image("cola.png");

        assert_eq!(product.image.as_deref(), Some("product/cola.png"));
    }

    #[test]
    fn test_validate_reports_each_bad_field() {
        let mut product = Product::new("", f64::INFINITY);
        product.discount = -5.0;
        product.image = Some("x".repeat(IMAGE_MAX_CHARS + 1));

        let errors = product.validate().unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["title", "price", "discount", "image"]);
    }

    proptest! {
        #[test]
        fn prop_discount_in_range_is_valid(discount in 0.0f64..=100.0) {
            let mut product = Product::new("Cola", 10.0);
            product.discount = discount;
            prop_assert!(product.validate().is_ok());
        }

        #[test]
        fn prop_discount_out_of_range_is_rejected(
            discount in prop_oneof![-1.0e6f64..-1.0e-9, 100.0f64 + 1.0e-9..1.0e6]
        ) {
            let mut product = Product::new("Cola", 10.0);
            product.discount = discount;
            let errors = product.validate().unwrap_err();
            prop_assert_eq!(errors.len(), 1);
            prop_assert_eq!(errors[0].field.as_str(), "discount");
        }

        #[test]
        fn prop_zero_price_is_never_in_stock(in_stock in any::<bool>()) {
            let mut product = Product::new("Cola", 0.0);
            product.in_stock = in_stock;
            product.prepare_save();
            prop_assert!(!product.in_stock);
        }
    }
}
