use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::entities::Tag;
use crate::error::{CatalogError, CatalogResult};
use crate::store::expect_row;

fn tag_from_row(row: &Row<'_>) -> rusqlite::Result<Tag> {
    Ok(Tag {
        id: Some(row.get(0)?),
        name: row.get(1)?,
    })
}

pub fn save_tag(conn: &Connection, tag: &mut Tag) -> CatalogResult<()> {
    tag.validate()?;

    match tag.id {
        None => {
            conn.execute("INSERT INTO tags (name) VALUES (?1)", [&tag.name])?;
            tag.id = Some(conn.last_insert_rowid());
        }
        Some(id) => {
            let affected = conn.execute(
                "UPDATE tags SET name = ?1 WHERE id = ?2",
                params![tag.name, id],
            )?;
            expect_row(affected, "tag", id)?;
        }
    }

    tracing::debug!(tag_id = tag.id, name = %tag.name, "tag saved");
    Ok(())
}

pub fn get_tag(conn: &Connection, id: i64) -> CatalogResult<Tag> {
    conn.query_row("SELECT id, name FROM tags WHERE id = ?1", [id], tag_from_row)
        .optional()?
        .ok_or(CatalogError::NotFound { entity: "tag", id })
}

pub fn find_tag_by_name(conn: &Connection, name: &str) -> CatalogResult<Option<Tag>> {
    let tag = conn
        .query_row(
            "SELECT id, name FROM tags WHERE name = ?1 ORDER BY id LIMIT 1",
            [name],
            tag_from_row,
        )
        .optional()?;
    Ok(tag)
}

pub fn list_tags(conn: &Connection) -> CatalogResult<Vec<Tag>> {
    let mut stmt = conn.prepare("SELECT id, name FROM tags ORDER BY name, id")?;
    let tags = stmt
        .query_map([], tag_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(tags)
}

/// Tags attached to a product, by name.
pub fn tags_for_product(conn: &Connection, product_id: i64) -> CatalogResult<Vec<Tag>> {
    let mut stmt = conn.prepare(
        "SELECT t.id, t.name
         FROM tags t
         JOIN product_tags pt ON pt.tag_id = t.id
         WHERE pt.product_id = ?1
         ORDER BY t.name, t.id",
    )?;
    let tags = stmt
        .query_map([product_id], tag_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(tags)
}

/// Delete a tag. Products keep existing, minus this tag.
pub fn delete_tag(conn: &Connection, id: i64) -> CatalogResult<()> {
    let affected = conn.execute("DELETE FROM tags WHERE id = ?1", [id])?;
    expect_row(affected, "tag", id)?;

    tracing::info!(tag_id = id, "tag deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    #[test]
    fn test_save_and_rename() {
        let conn = open_in_memory().unwrap();
        let mut tag = Tag::new("vegan");
        save_tag(&conn, &mut tag).unwrap();

        tag.name = "plant-based".to_string();
        save_tag(&conn, &mut tag).unwrap();

        let stored = get_tag(&conn, tag.id.unwrap()).unwrap();
        assert_eq!(stored.name, "plant-based");
        assert_eq!(list_tags(&conn).unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_tag_rejected() {
        let conn = open_in_memory().unwrap();
        let err = save_tag(&conn, &mut Tag::new("  ")).unwrap_err();

        assert_eq!(err.invalid_fields(), vec!["name"]);
        assert!(list_tags(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_find_by_name_and_ordering() {
        let conn = open_in_memory().unwrap();
        for name in ["sugar-free", "new", "bio"] {
            save_tag(&conn, &mut Tag::new(name)).unwrap();
        }

        let names: Vec<String> = list_tags(&conn).unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["bio", "new", "sugar-free"]);

        assert!(find_tag_by_name(&conn, "new").unwrap().is_some());
        assert!(find_tag_by_name(&conn, "old").unwrap().is_none());
    }

    #[test]
    fn test_delete_missing_tag() {
        let conn = open_in_memory().unwrap();

        assert!(matches!(
            delete_tag(&conn, 9),
            Err(CatalogError::NotFound { entity: "tag", id: 9 })
        ));
    }
}
