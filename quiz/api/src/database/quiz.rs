use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, serde::Serialize, serde::Deserialize)]
pub struct Quiz {
	/// Assigned by the store on insert
	pub id: i32,
	pub title: String,
	/// A `NULL` column is read back as an empty string
	pub description: String,
	/// Assigned by the store on insert, rendered as RFC 3339. The column is
	/// nullable, rows written without it come back as `None`.
	pub created_at: Option<DateTime<Utc>>,
}
