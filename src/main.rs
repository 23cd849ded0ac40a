use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rusqlite::Connection;
use std::path::{Path, PathBuf};

use storefront_catalog::config::CatalogConfig;
use storefront_catalog::{import_csv, logging, open_database, store, Product};

/// Storefront catalog admin
#[derive(Debug, Parser)]
#[command(name = "storefront-catalog", version, about)]
struct Cli {
    /// SQLite database file (overrides CATALOG_DATABASE)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create the database schema
    Init,
    /// Import products from a CSV file
    Import { csv: PathBuf },
    /// List categories, alphabetically
    Categories,
    /// List tags
    Tags,
    /// List products, newest first
    Products {
        /// Only products in the category with this slug
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Show one product
    Product {
        id: i64,
        #[arg(long)]
        json: bool,
    },
    /// Delete a category; its products are kept without a category
    DeleteCategory { id: i64 },
    /// Delete a tag; products lose the tag
    DeleteTag { id: i64 },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = CatalogConfig::from_env();
    if let Some(database) = cli.database {
        config.database_path = database;
    }

    logging::init(&config.log_filter);

    let conn = open_database(&config.database_path).with_context(|| {
        format!(
            "Failed to open catalog database {}",
            config.database_path.display()
        )
    })?;

    match cli.command {
        Command::Init => {
            println!("✓ Catalog ready at {}", config.database_path.display());
        }
        Command::Import { csv } => run_import(&conn, &csv)?,
        Command::Categories => {
            for category in store::list_categories(&conn)? {
                println!(
                    "{:>5}  {:<40} {:<30} popularity {}",
                    category.id.unwrap_or_default(),
                    category.title,
                    category.resolve_path(),
                    category.popularity
                );
            }
        }
        Command::Tags => {
            for tag in store::list_tags(&conn)? {
                println!("{:>5}  {}", tag.id.unwrap_or_default(), tag);
            }
        }
        Command::Products { category, json } => {
            let products = match category {
                Some(slug) => {
                    let category = store::get_category_by_slug(&conn, &slug)?
                        .with_context(|| format!("No category with slug '{}'", slug))?;
                    let id = category.id.context("Stored category without id")?;
                    store::products_in_category(&conn, id)?
                }
                None => store::list_products(&conn)?,
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&products)?);
            } else {
                for product in &products {
                    print_product_line(product);
                }
            }
        }
        Command::Product { id, json } => {
            let product = store::get_product(&conn, id)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&product)?);
            } else {
                print_product_details(&conn, &product)?;
            }
        }
        Command::DeleteCategory { id } => {
            store::delete_category(&conn, id)?;
            println!("✓ Deleted category {}", id);
        }
        Command::DeleteTag { id } => {
            store::delete_tag(&conn, id)?;
            println!("✓ Deleted tag {}", id);
        }
    }

    Ok(())
}

fn run_import(conn: &Connection, csv: &Path) -> Result<()> {
    println!("📂 Importing {}...", csv.display());
    let summary = import_csv(conn, csv)?;

    println!("✓ Products created:   {}", summary.products_created);
    println!("✓ Categories created: {}", summary.categories_created);
    println!("✓ Tags created:       {}", summary.tags_created);

    if !summary.rejected.is_empty() {
        println!("⚠ Rejected rows:      {}", summary.rejected.len());
        for row in &summary.rejected {
            println!("   line {}: {}", row.line, row.reason);
        }
    }

    Ok(())
}

fn print_product_line(product: &Product) {
    let stock = if product.in_stock { "in stock" } else { "sold out" };
    println!(
        "{:>5}  {:<40} {:>10.2} {:>10.2}  {}",
        product.id.unwrap_or_default(),
        product.title,
        product.price,
        product.reduced_price(),
        stock
    );
}

fn print_product_details(conn: &Connection, product: &Product) -> Result<()> {
    println!("{}", product);
    println!("  id:          {}", product.id.unwrap_or_default());
    match product.resolve_path() {
        Ok(path) => println!("  path:        {}", path),
        Err(e) => println!("  path:        - ({})", e),
    }
    println!("  price:       {:.2}", product.price);
    println!("  discount:    {}%", product.discount);
    println!("  final price: {:.2}", product.reduced_price());
    println!("  bonus:       {}", product.bonus);
    println!("  in stock:    {}", product.in_stock);

    if let Some(id) = product.id {
        let tags: Vec<String> = store::tags_for_product(conn, id)?
            .iter()
            .map(ToString::to_string)
            .collect();
        println!("  tags:        {}", tags.join(", "));
    }
    if let Some(image) = &product.image {
        println!("  image:       {}", image);
    }
    if let Some(created_at) = product.created_at() {
        println!("  created:     {}", created_at.to_rfc3339());
    }
    if let Some(updated_at) = product.updated_at() {
        println!("  updated:     {}", updated_at.to_rfc3339());
    }
    if !product.description.is_empty() {
        println!();
        println!("{}", product.description);
    }

    Ok(())
}
