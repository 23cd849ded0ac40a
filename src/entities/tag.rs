// 🔖 Tag Entity - Free-form labels attached to products

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::validation::{FieldChecks, ValidationResult};

pub const NAME_MAX_CHARS: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: Option<i64>,
    pub name: String,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Tag {
            id: None,
            name: name.into(),
        }
    }

    pub fn validate(&self) -> ValidationResult {
        FieldChecks::new("Tag")
            .required("name", &self.name)
            .max_chars("name", &self.name, NAME_MAX_CHARS)
            .finish()
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
