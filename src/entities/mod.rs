// Entity Models
// Category, Tag and Product plus their save-time rules

pub mod category;
pub mod product;
pub mod tag;

pub use category::{Category, CategoryRef};
pub use product::Product;
pub use tag::Tag;
