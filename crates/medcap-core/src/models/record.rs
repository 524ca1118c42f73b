use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::field_mapping::FieldMapping;
use crate::error::AppError;

/// A persisted caption record.
///
/// `item_id` is the platform message id and the single source of identity.
/// `created_at` is assigned by the database on first insert and never changes
/// afterward; repeated writes for the same id update the other columns in
/// place.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CaptionRecord {
    pub item_id: i64,
    pub filename: String,
    pub filesize: String,
    /// The serialized field mapping, stored as a JSON document so records
    /// stay machine-parseable for later querying.
    pub caption_data: JsonValue,
    pub created_at: DateTime<Utc>,
}

impl CaptionRecord {
    /// Parse the stored field mapping back out of `caption_data`.
    pub fn fields(&self) -> Result<FieldMapping, AppError> {
        serde_json::from_value(self.caption_data.clone())
            .map_err(|err| AppError::Internal(format!("malformed caption_data: {}", err)))
    }
}
