// 📥 CSV Import - Seed the catalog from a spreadsheet export
//
// Expected headers:
//   title,category,tags,price,discount,bonus,in_stock,description,image
//
// - category is matched by title and created when missing
// - tags are ';'-separated names, created when missing
// - empty discount/bonus/in_stock fall back to the product defaults
// - rows that fail validation are reported and skipped, the rest go in

use anyhow::{Context, Result};
use rusqlite::Connection;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

use crate::entities::{Category, Product, Tag};
use crate::error::CatalogError;
use crate::store;

const TAG_SEPARATOR: char = ';';

#[derive(Debug, Deserialize)]
struct ProductRow {
    title: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    tags: String,
    price: f64,
    #[serde(default)]
    discount: Option<f64>,
    #[serde(default)]
    bonus: Option<u32>,
    #[serde(default)]
    in_stock: Option<bool>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    image: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRow {
    /// 1-based line in the CSV file (header is line 1)
    pub line: u64,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportSummary {
    pub products_created: usize,
    pub categories_created: usize,
    pub tags_created: usize,
    pub rejected: Vec<RejectedRow>,
}

pub fn import_csv(conn: &Connection, csv_path: &Path) -> Result<ImportSummary> {
    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("Failed to open CSV file {}", csv_path.display()))?;
    import_products(conn, file)
}

pub fn import_products<R: Read>(conn: &Connection, reader: R) -> Result<ImportSummary> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = rdr.headers().context("Failed to read CSV headers")?.clone();

    let mut summary = ImportSummary::default();

    for result in rdr.records() {
        let record = result.context("Failed to read CSV record")?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();

        let row: ProductRow = match record.deserialize(Some(&headers)) {
            Ok(row) => row,
            Err(e) => {
                reject(&mut summary, line, e.to_string());
                continue;
            }
        };

        match import_row(conn, row, &mut summary) {
            Ok(()) => summary.products_created += 1,
            Err(CatalogError::Validation(errors)) => {
                let reason = errors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; ");
                reject(&mut summary, line, reason);
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to import CSV line {}", line));
            }
        }
    }

    tracing::info!(
        products = summary.products_created,
        categories = summary.categories_created,
        tags = summary.tags_created,
        rejected = summary.rejected.len(),
        "catalog import finished"
    );

    Ok(summary)
}

fn reject(summary: &mut ImportSummary, line: u64, reason: String) {
    tracing::warn!(line, %reason, "skipping CSV row");
    summary.rejected.push(RejectedRow { line, reason });
}

fn import_row(
    conn: &Connection,
    row: ProductRow,
    summary: &mut ImportSummary,
) -> Result<(), CatalogError> {
    let mut product = Product::new(row.title, row.price);
    product.description = row.description;
    if let Some(discount) = row.discount {
        product.discount = discount;
    }
    if let Some(bonus) = row.bonus {
        product.bonus = bonus;
    }
    if let Some(in_stock) = row.in_stock {
        product.in_stock = in_stock;
    }
    if !row.image.is_empty() {
        product.set_image(&row.image);
    }

    let tag_names: Vec<&str> = row
        .tags
        .split(TAG_SEPARATOR)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .collect();

    // the whole row is checked before any category or tag is created for it
    product.validate()?;
    if !row.category.is_empty() {
        Category::new(row.category.as_str()).validate()?;
    }
    for name in &tag_names {
        Tag::new(*name).validate()?;
    }

    if !row.category.is_empty() {
        let category = match store::find_category_by_title(conn, &row.category)? {
            Some(category) => category,
            None => {
                let mut category = Category::new(row.category.as_str());
                store::save_category(conn, &mut category)?;
                summary.categories_created += 1;
                category
            }
        };
        product.set_category(&category)?;
    }

    for name in tag_names {
        let tag = match store::find_tag_by_name(conn, name)? {
            Some(tag) => tag,
            None => {
                let mut tag = Tag::new(name);
                store::save_tag(conn, &mut tag)?;
                summary.tags_created += 1;
                tag
            }
        };
        product.add_tag(&tag)?;
    }

    store::save_product(conn, &mut product)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use std::io::Write;

    const SAMPLE: &str = "\
title,category,tags,price,discount,bonus,in_stock,description,image
Cola,Drinks,fizzy;sweet,1.50,10,2,true,Classic cola,cola.png
Juice,Drinks,sweet,2.00,,,,,
Sample,Snacks,,0,,,true,Free taste,
";

    #[test]
    fn test_import_creates_products_categories_and_tags() {
        let conn = open_in_memory().unwrap();

        let summary = import_products(&conn, SAMPLE.as_bytes()).unwrap();

        assert_eq!(summary.products_created, 3);
        assert_eq!(summary.categories_created, 2);
        assert_eq!(summary.tags_created, 2);
        assert!(summary.rejected.is_empty());

        let products = store::list_products(&conn).unwrap();
        let titles: Vec<&str> = products.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Sample", "Juice", "Cola"]);

        let cola = &products[2];
        assert_eq!(cola.discount, 10.0);
        assert_eq!(cola.bonus, 2);
        assert_eq!(cola.tag_ids.len(), 2);
        assert_eq!(cola.image.as_deref(), Some("product/cola.png"));
        assert_eq!(cola.resolve_path().unwrap(), format!("/catalog/drinks/{}/", cola.id.unwrap()));

        let juice = &products[1];
        assert_eq!(juice.discount, 0.0);
        assert_eq!(juice.bonus, 1);
        assert!(juice.in_stock);

        // zero price wins over the explicit in_stock column
        assert!(!products[0].in_stock);
    }

    #[test]
    fn test_import_reuses_existing_category_and_tags() {
        let conn = open_in_memory().unwrap();
        import_products(&conn, SAMPLE.as_bytes()).unwrap();

        let summary = import_products(&conn, SAMPLE.as_bytes()).unwrap();

        assert_eq!(summary.products_created, 3);
        assert_eq!(summary.categories_created, 0);
        assert_eq!(summary.tags_created, 0);
        assert_eq!(store::count_categories(&conn).unwrap(), 2);
    }

    #[test]
    fn test_invalid_rows_are_reported_and_skipped() {
        let conn = open_in_memory().unwrap();
        let csv = "\
title,category,tags,price,discount
Cola,Drinks,,1.5,150
,Drinks,,1.5,
Juice,Drinks,,not-a-number,
Water,Drinks,,0.5,5
";

        let summary = import_products(&conn, csv.as_bytes()).unwrap();

        assert_eq!(summary.products_created, 1);
        let lines: Vec<u64> = summary.rejected.iter().map(|r| r.line).collect();
        assert_eq!(lines, vec![2, 3, 4]);
        assert!(summary.rejected[0].reason.contains("discount"));
        assert!(summary.rejected[1].reason.contains("title"));

        // the rejected rows created nothing on the side
        assert_eq!(store::count_categories(&conn).unwrap(), 1);
        assert_eq!(store::count_products(&conn).unwrap(), 1);
    }

    #[test]
    fn test_row_with_invalid_tag_leaves_no_category_behind() {
        let conn = open_in_memory().unwrap();
        let csv = format!(
            "title,category,tags,price\nCola,Orphaned,fizzy;{},1.5\nChips,!!!,,2.0\n",
            "x".repeat(129)
        );

        let summary = import_products(&conn, csv.as_bytes()).unwrap();

        assert_eq!(summary.products_created, 0);
        assert_eq!(summary.categories_created, 0);
        assert_eq!(summary.tags_created, 0);
        assert_eq!(summary.rejected.len(), 2);
        assert!(summary.rejected[0].reason.contains("[Tag] name"));
        assert!(summary.rejected[1].reason.contains("[Category] title"));

        assert_eq!(store::count_categories(&conn).unwrap(), 0);
        assert!(store::list_tags(&conn).unwrap().is_empty());
        assert_eq!(store::count_products(&conn).unwrap(), 0);
    }

    #[test]
    fn test_import_from_file() {
        let conn = open_in_memory().unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let summary = import_csv(&conn, file.path()).unwrap();

        assert_eq!(summary.products_created, 3);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let conn = open_in_memory().unwrap();

        let err = import_csv(&conn, Path::new("/definitely/not/here.csv")).unwrap_err();

        assert!(err.to_string().contains("Failed to open CSV file"));
    }
}
