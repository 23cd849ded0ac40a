use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::BTreeSet;

use crate::entities::{CategoryRef, Product};
use crate::error::{CatalogError, CatalogResult};
use crate::store::expect_row;
use crate::timestamps::{self, Timestamps};

const PRODUCT_SELECT: &str = "SELECT p.id, p.title, p.category_id, c.slug, p.description,
                p.image, p.price, p.discount, p.bonus, p.in_stock,
                p.created_at, p.updated_at
         FROM products p
         LEFT JOIN categories c ON c.id = p.category_id";

/// Tag ids are loaded separately, see `load_tag_ids`.
fn product_from_row(row: &Row<'_>) -> rusqlite::Result<Product> {
    let category_id: Option<i64> = row.get(2)?;
    let category_slug: Option<String> = row.get(3)?;
    let created_at: String = row.get(10)?;
    let updated_at: String = row.get(11)?;

    Ok(Product {
        id: Some(row.get(0)?),
        title: row.get(1)?,
        category: category_id.map(|id| CategoryRef {
            id,
            slug: category_slug.unwrap_or_default(),
        }),
        tag_ids: BTreeSet::new(),
        description: row.get(4)?,
        image: row.get(5)?,
        price: row.get(6)?,
        discount: row.get(7)?,
        bonus: row.get(8)?,
        in_stock: row.get(9)?,
        timestamps: Some(Timestamps {
            created_at: timestamps::from_db(10, &created_at)?,
            updated_at: timestamps::from_db(11, &updated_at)?,
        }),
    })
}

fn load_tag_ids(conn: &Connection, product_id: i64) -> CatalogResult<BTreeSet<i64>> {
    let mut stmt = conn.prepare("SELECT tag_id FROM product_tags WHERE product_id = ?1")?;
    let ids = stmt
        .query_map([product_id], |row| row.get(0))?
        .collect::<Result<BTreeSet<i64>, _>>()?;
    Ok(ids)
}

fn query_products(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> CatalogResult<Vec<Product>> {
    let mut stmt = conn.prepare(sql)?;
    let mut products = stmt
        .query_map(params, product_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    for product in &mut products {
        if let Some(id) = product.id {
            product.tag_ids = load_tag_ids(conn, id)?;
        }
    }

    Ok(products)
}

// ============================================================================
// SAVE
// ============================================================================

/// Insert or update a product together with its tag set.
///
/// Validation runs first; on failure nothing is written and the product is
/// left untouched. Then the stock rule is applied, timestamps are stamped
/// (created_at is read back from storage on updates, so it cannot drift) and
/// the row plus its tag links are written in one transaction.
pub fn save_product(conn: &Connection, product: &mut Product) -> CatalogResult<()> {
    product.validate()?;
    product.prepare_save();

    let previous = match product.id {
        Some(id) => Some(stored_timestamps(conn, id)?),
        None => None,
    };
    let stamped = Timestamps::stamp(previous, Utc::now());
    let category_id = product.category.as_ref().map(|c| c.id);

    let tx = conn.unchecked_transaction()?;

    let id = match product.id {
        None => {
            tx.execute(
                "INSERT INTO products (
                    title, category_id, description, image, price, discount,
                    bonus, in_stock, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    product.title,
                    category_id,
                    product.description,
                    product.image,
                    product.price,
                    product.discount,
                    product.bonus,
                    product.in_stock,
                    timestamps::to_db(&stamped.created_at),
                    timestamps::to_db(&stamped.updated_at),
                ],
            )?;
            tx.last_insert_rowid()
        }
        Some(id) => {
            // created_at is never part of an update
            let affected = tx.execute(
                "UPDATE products SET
                    title = ?1, category_id = ?2, description = ?3, image = ?4,
                    price = ?5, discount = ?6, bonus = ?7, in_stock = ?8,
                    updated_at = ?9
                 WHERE id = ?10",
                params![
                    product.title,
                    category_id,
                    product.description,
                    product.image,
                    product.price,
                    product.discount,
                    product.bonus,
                    product.in_stock,
                    timestamps::to_db(&stamped.updated_at),
                    id,
                ],
            )?;
            expect_row(affected, "product", id)?;
            id
        }
    };

    tx.execute("DELETE FROM product_tags WHERE product_id = ?1", [id])?;
    for tag_id in &product.tag_ids {
        tx.execute(
            "INSERT INTO product_tags (product_id, tag_id) VALUES (?1, ?2)",
            params![id, tag_id],
        )?;
    }

    // the category may have been renamed since the reference was taken
    let category_slug: Option<String> = match category_id {
        Some(category_id) => tx
            .query_row(
                "SELECT slug FROM categories WHERE id = ?1",
                [category_id],
                |row| row.get(0),
            )
            .optional()?,
        None => None,
    };

    tx.commit()?;

    product.id = Some(id);
    product.timestamps = Some(stamped);
    if let (Some(category), Some(slug)) = (product.category.as_mut(), category_slug) {
        category.slug = slug;
    }

    tracing::debug!(
        product_id = id,
        category_id,
        in_stock = product.in_stock,
        tags = product.tag_ids.len(),
        "product saved"
    );
    Ok(())
}

fn stored_timestamps(conn: &Connection, id: i64) -> CatalogResult<Timestamps> {
    let row: Option<(String, String)> = conn
        .query_row(
            "SELECT created_at, updated_at FROM products WHERE id = ?1",
            [id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    let (created_at, updated_at) = row.ok_or(CatalogError::NotFound {
        entity: "product",
        id,
    })?;

    Ok(Timestamps {
        created_at: timestamps::from_db(0, &created_at)?,
        updated_at: timestamps::from_db(1, &updated_at)?,
    })
}

// ============================================================================
// QUERIES
// ============================================================================

pub fn get_product(conn: &Connection, id: i64) -> CatalogResult<Product> {
    let product = conn
        .query_row(
            &format!("{} WHERE p.id = ?1", PRODUCT_SELECT),
            [id],
            product_from_row,
        )
        .optional()?;

    let mut product = product.ok_or(CatalogError::NotFound {
        entity: "product",
        id,
    })?;
    product.tag_ids = load_tag_ids(conn, id)?;
    Ok(product)
}

/// All products, newest first.
pub fn list_products(conn: &Connection) -> CatalogResult<Vec<Product>> {
    query_products(conn, &format!("{} ORDER BY p.id DESC", PRODUCT_SELECT), [])
}

/// Products of one category (the category's "products" side), newest first.
pub fn products_in_category(conn: &Connection, category_id: i64) -> CatalogResult<Vec<Product>> {
    query_products(
        conn,
        &format!("{} WHERE p.category_id = ?1 ORDER BY p.id DESC", PRODUCT_SELECT),
        [category_id],
    )
}

pub fn products_with_tag(conn: &Connection, tag_id: i64) -> CatalogResult<Vec<Product>> {
    query_products(
        conn,
        &format!(
            "{} JOIN product_tags pt ON pt.product_id = p.id
             WHERE pt.tag_id = ?1
             ORDER BY p.id DESC",
            PRODUCT_SELECT
        ),
        [tag_id],
    )
}

pub fn delete_product(conn: &Connection, id: i64) -> CatalogResult<()> {
    let affected = conn.execute("DELETE FROM products WHERE id = ?1", [id])?;
    expect_row(affected, "product", id)?;

    tracing::info!(product_id = id, "product deleted");
    Ok(())
}

pub fn count_products(conn: &Connection) -> CatalogResult<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))?;
    Ok(count)
}
