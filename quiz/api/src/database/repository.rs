use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use super::Quiz;

/// `created_at` is `TIMESTAMP` in the table we create but may be `TIMESTAMPTZ`
/// in one that already existed, the cast reads both. The session runs in UTC.
const QUIZ_COLUMNS: &str = "id, title, COALESCE(description, '') AS description, created_at::timestamptz AS created_at";

#[derive(Debug, thiserror::Error)]
pub enum QuizStoreError {
	#[error("failed to insert quiz: {0}")]
	Insert(sqlx::Error),
	#[error("failed to query quizzes: {0}")]
	Query(sqlx::Error),
	#[error("failed to decode quiz row: {0}")]
	Decode(sqlx::Error),
}

/// Every statement touching the `quizzes` table goes through this trait.
#[async_trait]
pub trait QuizRepository: Send + Sync {
	/// Inserts a quiz and returns the row as the store persisted it.
	async fn create(&self, title: &str, description: &str) -> Result<Quiz, QuizStoreError>;

	/// Every quiz, newest first.
	async fn list_all(&self) -> Result<Vec<Quiz>, QuizStoreError>;
}

pub struct PgQuizRepository {
	db: PgPool,
}

impl PgQuizRepository {
	pub fn new(db: PgPool) -> Self {
		Self { db }
	}
}

#[async_trait]
impl QuizRepository for PgQuizRepository {
	async fn create(&self, title: &str, description: &str) -> Result<Quiz, QuizStoreError> {
		let query = format!("INSERT INTO quizzes (title, description) VALUES ($1, $2) RETURNING {QUIZ_COLUMNS}");

		sqlx::query_as::<_, Quiz>(&query)
			.bind(title)
			.bind(description)
			.fetch_one(&self.db)
			.await
			.map_err(QuizStoreError::Insert)
	}

	async fn list_all(&self) -> Result<Vec<Quiz>, QuizStoreError> {
		let query = format!("SELECT {QUIZ_COLUMNS} FROM quizzes ORDER BY created_at DESC NULLS LAST, id DESC");

		let rows = sqlx::query(&query)
			.fetch_all(&self.db)
			.await
			.map_err(QuizStoreError::Query)?;

		// A single bad row fails the whole listing.
		rows.iter()
			.map(Quiz::from_row)
			.collect::<Result<Vec<_>, _>>()
			.map_err(QuizStoreError::Decode)
	}
}
