// 📐 Field Validation
// Small constraint checks run by the entities before anything is written

use crate::slug::slugify;

// ============================================================================
// VALIDATION RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub context: String,
}

impl ValidationError {
    pub fn new(context: &str, field: &str, message: impl Into<String>) -> Self {
        ValidationError {
            field: field.to_string(),
            message: message.into(),
            context: context.to_string(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.context, self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<(), Vec<ValidationError>>;

// ============================================================================
// FIELD CHECKS
// ============================================================================

/// Collects errors for one entity so every offending field gets reported.
#[derive(Debug)]
pub struct FieldChecks {
    context: &'static str,
    errors: Vec<ValidationError>,
}

impl FieldChecks {
    pub fn new(context: &'static str) -> Self {
        FieldChecks {
            context,
            errors: Vec::new(),
        }
    }

    /// Non-empty after trimming whitespace.
    pub fn required(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.push(field, "Required field is empty".to_string());
        }
        self
    }

    /// Length counted in characters, not bytes.
    pub fn max_chars(&mut self, field: &str, value: &str, max: usize) -> &mut Self {
        let len = value.chars().count();
        if len > max {
            self.push(
                field,
                format!("Must be at most {} characters, got {}", max, len),
            );
        }
        self
    }

    pub fn finite(&mut self, field: &str, value: f64) -> &mut Self {
        if !value.is_finite() {
            self.push(field, format!("Must be a finite number, got {}", value));
        }
        self
    }

    /// Inclusive on both ends. NaN is never in range.
    pub fn in_range(&mut self, field: &str, value: f64, min: f64, max: f64) -> &mut Self {
        if !(min..=max).contains(&value) {
            self.push(
                field,
                format!("Must be between {} and {}, got {}", min, max, value),
            );
        }
        self
    }

    pub fn at_least(&mut self, field: &str, value: i64, min: i64) -> &mut Self {
        if value < min {
            self.push(field, format!("Must be at least {}, got {}", min, value));
        }
        self
    }

    /// A non-blank value must leave something behind once slugified,
    /// otherwise the URL segment built from it would be empty.
    pub fn sluggable(&mut self, field: &str, value: &str) -> &mut Self {
        if !value.trim().is_empty() && slugify(value).is_empty() {
            self.push(field, "Must contain at least one letter or digit".to_string());
        }
        self
    }

    pub fn finish(&mut self) -> ValidationResult {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(std::mem::take(&mut self.errors))
        }
    }

    fn push(&mut self, field: &str, message: String) {
        self.errors
            .push(ValidationError::new(self.context, field, message));
    }
}
