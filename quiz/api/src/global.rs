use std::str::FromStr;

use common::config::DatabaseConfig;
use common::context::Context;
use sqlx::postgres::PgConnectOptions;
use sqlx::{ConnectOptions, PgPool};

use crate::config::{ApiConfig, AppConfig};
use crate::database::schema::{self, SchemaError};
use crate::database::QuizRepository;

pub trait GlobalCtx {
	fn ctx(&self) -> &Context;
}

pub trait GlobalConfig {
	#[inline(always)]
	fn config<C>(&self) -> &C
	where
		Self: GlobalConfigProvider<C>,
	{
		GlobalConfigProvider::provide_config(self)
	}
}

pub trait GlobalConfigProvider<C> {
	fn provide_config(&self) -> &C;
}

pub trait QuizState {
	fn quiz_repository(&self) -> &dyn QuizRepository;
}

pub trait QuizGlobal:
	GlobalCtx + GlobalConfigProvider<ApiConfig> + GlobalConfig + QuizState + Send + Sync + 'static
{
}

impl<T> QuizGlobal for T where
	T: GlobalCtx + GlobalConfigProvider<ApiConfig> + GlobalConfig + QuizState + Send + Sync + 'static
{
}

pub struct GlobalState {
	ctx: Context,
	config: AppConfig,
	quiz_repository: Box<dyn QuizRepository>,
}

impl GlobalState {
	pub fn new(ctx: Context, config: AppConfig, quiz_repository: impl QuizRepository + 'static) -> Self {
		Self {
			ctx,
			config,
			quiz_repository: Box::new(quiz_repository),
		}
	}
}

impl GlobalCtx for GlobalState {
	#[inline(always)]
	fn ctx(&self) -> &Context {
		&self.ctx
	}
}

impl GlobalConfigProvider<ApiConfig> for GlobalState {
	#[inline(always)]
	fn provide_config(&self) -> &ApiConfig {
		&self.config.api
	}
}

impl GlobalConfig for GlobalState {}

impl QuizState for GlobalState {
	#[inline(always)]
	fn quiz_repository(&self) -> &dyn QuizRepository {
		&*self.quiz_repository
	}
}

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
	#[error("database uri is not set, provide DATABASE_URL or QUIZ_DATABASE__URI")]
	MissingDatabaseUri,
	#[error("failed to connect to database: {0}")]
	Connect(#[from] sqlx::Error),
	#[error("failed to prepare database schema: {0}")]
	Schema(#[from] SchemaError),
}

/// Connects to Postgres and makes sure the `quizzes` table exists.
pub async fn setup_database(config: &DatabaseConfig) -> Result<PgPool, StartupError> {
	if config.uri.is_empty() {
		return Err(StartupError::MissingDatabaseUri);
	}

	let options = PgConnectOptions::from_str(&config.uri)?.disable_statement_logging();
	let db = PgPool::connect_with(options).await?;

	tracing::info!("connected to database");

	let seeded = schema::bootstrap(&db).await?;
	if seeded > 0 {
		tracing::info!(count = seeded, "inserted sample quizzes");
	} else {
		tracing::debug!("quizzes table already populated");
	}

	Ok(db)
}
