// 💾 Catalog Store - SQLite persistence for categories, tags and products
//
// Every save runs the same steps, in order:
//   1. validate fields (nothing is written when this fails)
//   2. apply the entity's pre-save rule (slug, stock flag)
//   3. stamp timestamps
//   4. write the row (insert when id is None, update otherwise)
//
// Relationship policies live in the schema (see db.rs): deleting a category
// nulls product.category_id, deleting a tag or product drops the link rows.

pub mod categories;
pub mod products;
pub mod tags;

pub use categories::{
    count_categories, delete_category, find_category_by_title, get_category,
    get_category_by_slug, list_categories, save_category,
};
pub use products::{
    count_products, delete_product, get_product, list_products, products_in_category,
    products_with_tag, save_product,
};
pub use tags::{delete_tag, find_tag_by_name, get_tag, list_tags, save_tag, tags_for_product};

use crate::error::{CatalogError, CatalogResult};

/// Map "no row changed" on an update/delete to `NotFound`.
pub(crate) fn expect_row(affected: usize, entity: &'static str, id: i64) -> CatalogResult<()> {
    if affected == 0 {
        Err(CatalogError::NotFound { entity, id })
    } else {
        Ok(())
    }
}
