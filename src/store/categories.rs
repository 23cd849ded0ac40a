use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::entities::Category;
use crate::error::{CatalogError, CatalogResult};
use crate::store::expect_row;

const CATEGORY_COLUMNS: &str = "id, title, slug, popularity";

fn category_from_row(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: Some(row.get(0)?),
        title: row.get(1)?,
        slug: row.get(2)?,
        popularity: row.get(3)?,
    })
}

/// Insert or update a category. The slug is always re-derived from the title.
pub fn save_category(conn: &Connection, category: &mut Category) -> CatalogResult<()> {
    category.validate()?;
    category.prepare_save();

    match category.id {
        None => {
            conn.execute(
                "INSERT INTO categories (title, slug, popularity) VALUES (?1, ?2, ?3)",
                params![category.title, category.slug, category.popularity],
            )?;
            category.id = Some(conn.last_insert_rowid());
        }
        Some(id) => {
            let affected = conn.execute(
                "UPDATE categories SET title = ?1, slug = ?2, popularity = ?3 WHERE id = ?4",
                params![category.title, category.slug, category.popularity, id],
            )?;
            expect_row(affected, "category", id)?;
        }
    }

    tracing::debug!(
        category_id = category.id,
        slug = %category.slug,
        "category saved"
    );
    Ok(())
}

pub fn get_category(conn: &Connection, id: i64) -> CatalogResult<Category> {
    conn.query_row(
        &format!("SELECT {} FROM categories WHERE id = ?1", CATEGORY_COLUMNS),
        [id],
        category_from_row,
    )
    .optional()?
    .ok_or(CatalogError::NotFound {
        entity: "category",
        id,
    })
}

/// Slugs are not unique; the oldest category wins.
pub fn get_category_by_slug(conn: &Connection, slug: &str) -> CatalogResult<Option<Category>> {
    let category = conn
        .query_row(
            &format!(
                "SELECT {} FROM categories WHERE slug = ?1 ORDER BY id LIMIT 1",
                CATEGORY_COLUMNS
            ),
            [slug],
            category_from_row,
        )
        .optional()?;
    Ok(category)
}

pub fn find_category_by_title(conn: &Connection, title: &str) -> CatalogResult<Option<Category>> {
    let category = conn
        .query_row(
            &format!(
                "SELECT {} FROM categories WHERE title = ?1 ORDER BY id LIMIT 1",
                CATEGORY_COLUMNS
            ),
            [title],
            category_from_row,
        )
        .optional()?;
    Ok(category)
}

/// All categories, alphabetically by title.
pub fn list_categories(conn: &Connection) -> CatalogResult<Vec<Category>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM categories ORDER BY title, id",
        CATEGORY_COLUMNS
    ))?;

    let categories = stmt
        .query_map([], category_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(categories)
}

/// Delete a category. Its products stay, with no category.
pub fn delete_category(conn: &Connection, id: i64) -> CatalogResult<()> {
    let affected = conn.execute("DELETE FROM categories WHERE id = ?1", [id])?;
    expect_row(affected, "category", id)?;

    tracing::info!(category_id = id, "category deleted");
    Ok(())
}

pub fn count_categories(conn: &Connection) -> CatalogResult<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))?;
    Ok(count)
}
