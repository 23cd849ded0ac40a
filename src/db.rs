use rusqlite::Connection;
use std::path::Path;

use crate::error::CatalogResult;

/// Open (or create) a catalog database file and make sure the schema exists.
pub fn open_database(path: &Path) -> CatalogResult<Connection> {
    let conn = Connection::open(path)?;

    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;
    setup_database(&conn)?;

    tracing::debug!(path = %path.display(), "catalog database opened");
    Ok(conn)
}

/// In-memory catalog, used by tests and dry runs.
pub fn open_in_memory() -> CatalogResult<Connection> {
    let conn = Connection::open_in_memory()?;
    setup_database(&conn)?;
    Ok(conn)
}

pub fn setup_database(conn: &Connection) -> CatalogResult<()> {
    // SQLite leaves foreign keys off per connection; the delete policies
    // below depend on them
    conn.pragma_update(None, "foreign_keys", "ON")?;

    // ==========================================================================
    // Categories
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            slug TEXT NOT NULL DEFAULT '',
            popularity INTEGER NOT NULL DEFAULT 0 CHECK (popularity >= 0)
        )",
        [],
    )?;

    // ==========================================================================
    // Tags
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS tags (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Products
    // Deleting a category keeps its products: category_id goes to NULL
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS products (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            category_id INTEGER REFERENCES categories(id) ON DELETE SET NULL,
            description TEXT NOT NULL DEFAULT '',
            image TEXT,
            price REAL NOT NULL,
            discount REAL NOT NULL DEFAULT 0 CHECK (discount >= 0 AND discount <= 100),
            bonus INTEGER NOT NULL DEFAULT 1 CHECK (bonus >= 0),
            in_stock INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Product ↔ Tag association
    // Either side going away removes the link, never the other side
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS product_tags (
            product_id INTEGER NOT NULL REFERENCES products(id) ON DELETE CASCADE,
            tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
            PRIMARY KEY (product_id, tag_id)
        )",
        [],
    )?;

    // ==========================================================================
    // Indexes
    // ==========================================================================
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_categories_title ON categories(title)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_categories_slug ON categories(slug)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_products_category ON products(category_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_product_tags_tag ON product_tags(tag_id)",
        [],
    )?;

    Ok(())
}
