use sqlx::PgPool;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS quizzes (
	id SERIAL PRIMARY KEY,
	title VARCHAR(255) NOT NULL,
	description TEXT,
	created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)";

/// Rows inserted when the table is found empty at startup.
pub const SAMPLE_QUIZZES: [(&str, &str); 3] = [
	("General Knowledge Quiz", "Test your knowledge across various topics"),
	("Science Quiz", "Explore the wonders of science"),
	("History Quiz", "Journey through time with historical facts"),
];

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
	#[error("schema transaction failed: {0}")]
	Transaction(sqlx::Error),
	#[error("failed to create quizzes table: {0}")]
	CreateTable(sqlx::Error),
	#[error("failed to count quizzes: {0}")]
	Count(sqlx::Error),
	#[error("failed to insert sample quiz: {0}")]
	Seed(sqlx::Error),
}

/// Creates the `quizzes` table if it is missing and seeds it when empty.
/// Runs in one transaction and returns how many sample rows were inserted.
pub async fn bootstrap(db: &PgPool) -> Result<u64, SchemaError> {
	let mut tx = db.begin().await.map_err(SchemaError::Transaction)?;

	sqlx::query(CREATE_TABLE)
		.execute(&mut *tx)
		.await
		.map_err(SchemaError::CreateTable)?;

	let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quizzes")
		.fetch_one(&mut *tx)
		.await
		.map_err(SchemaError::Count)?;

	let mut seeded = 0;
	if count == 0 {
		for (title, description) in SAMPLE_QUIZZES {
			sqlx::query("INSERT INTO quizzes (title, description) VALUES ($1, $2)")
				.bind(title)
				.bind(description)
				.execute(&mut *tx)
				.await
				.map_err(SchemaError::Seed)?;

			seeded += 1;
		}
	}

	tx.commit().await.map_err(SchemaError::Transaction)?;

	Ok(seeded)
}
