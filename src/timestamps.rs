// ⏱️ Record timestamps
// created_at is written once, updated_at moves on every save

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamps {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Timestamps {
    /// Timestamps for a save happening at `now`.
    ///
    /// The previous `created_at` is carried over untouched when the record
    /// already has one.
    pub fn stamp(previous: Option<Timestamps>, now: DateTime<Utc>) -> Timestamps {
        match previous {
            Some(previous) => Timestamps {
                created_at: previous.created_at,
                updated_at: now,
            },
            None => Timestamps {
                created_at: now,
                updated_at: now,
            },
        }
    }
}

/// Storage format for timestamps (same RFC 3339 text the rest of the db uses).
pub(crate) fn to_db(value: &DateTime<Utc>) -> String {
    value.to_rfc3339()
}

pub(crate) fn from_db(column: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                column,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
}
