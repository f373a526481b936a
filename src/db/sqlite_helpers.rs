//! SQLite helper utilities for type conversion
//!
//! SQLite has no UUID or array column types: ids are stored as TEXT and genre
//! lists as JSON arrays in a TEXT column.

use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

/// Generate a new record id
#[inline]
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Get current UTC timestamp as ISO8601 string for SQLite
#[inline]
pub fn now_iso8601() -> String {
    Utc::now().to_rfc3339()
}

/// Serialize a slice to a JSON array string for storage
#[inline]
pub fn vec_to_json<T: Serialize>(v: &[T]) -> String {
    serde_json::to_string(v).unwrap_or_else(|_| "[]".to_string())
}

/// Deserialize a stored JSON array (empty on malformed input)
#[inline]
pub fn json_to_vec<T: DeserializeOwned>(s: &str) -> Vec<T> {
    serde_json::from_str(s).unwrap_or_default()
}

/// SQL predicate that is true when the JSON array in `column` contains the bound value
pub fn json_array_contains_sql(column: &str) -> String {
    format!("EXISTS (SELECT 1 FROM json_each({}) WHERE value = ?)", column)
}
