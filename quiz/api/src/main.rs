use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use common::context::Context;
use common::{logging, signal};
use quiz_api::config::AppConfig;
use quiz_api::database::PgQuizRepository;
use quiz_api::global::{setup_database, GlobalState};
use tokio::signal::unix::SignalKind;
use tokio::{select, time};

async fn bootstrap() -> anyhow::Result<()> {
	// Loaded before the config so the `.env` values take part in it.
	let dotenv = dotenvy::dotenv();

	let config = AppConfig::parse()
		.map_err(|err| {
			logging::init("info", Default::default()).ok();
			err
		})
		.context("failed to parse config")?;

	logging::init(&config.logging.level, config.logging.mode).context("failed to init logging")?;

	match dotenv {
		Ok(path) => tracing::debug!(path = %path.display(), "loaded .env file"),
		Err(err) if err.not_found() => {}
		Err(err) => tracing::warn!(error = %err, "failed to load .env file"),
	}

	tracing::info!(name = %config.name, "starting up");

	if let Some(file) = &config.config_file {
		tracing::debug!(file = %file, "using config file");
	}

	tracing::debug!("config: {:#?}", config);

	let db = setup_database(&config.database).await?;

	let (ctx, handler) = Context::new();

	let global = Arc::new(GlobalState::new(ctx, config, PgQuizRepository::new(db)));

	let api_future = tokio::spawn(quiz_api::api::run(global.clone()));

	// Listen on both sigint and sigterm and cancel the context when either is received
	let mut signal_handler = signal::SignalHandler::new()
		.with_signal(SignalKind::interrupt())?
		.with_signal(SignalKind::terminate())?;

	let result = select! {
		r = api_future => match r {
			Ok(Ok(())) => Err(anyhow::anyhow!("api stopped unexpectedly")),
			Ok(Err(err)) => Err(err.context("api stopped unexpectedly")),
			Err(err) => Err(anyhow::Error::from(err).context("api task panicked")),
		},
		_ = signal_handler.recv() => {
			tracing::info!("shutting down");
			Ok(())
		},
	};

	// We cannot have a context in scope when we cancel the handler, otherwise it will deadlock.
	drop(global);

	tracing::info!("waiting for tasks to finish");

	select! {
		_ = time::sleep(Duration::from_secs(60)) => tracing::warn!("force shutting down"),
		_ = signal_handler.recv() => tracing::warn!("force shutting down"),
		_ = handler.cancel() => tracing::info!("shutdown complete"),
	}

	result
}

#[tokio::main]
pub async fn main() {
	if let Err(err) = bootstrap().await {
		tracing::error!("{:#}", err);
		std::process::exit(1);
	}
}
