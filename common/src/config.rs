use ::config::{Config, Environment, File};
pub use ::config::ConfigError;
use serde::de::DeserializeOwned;

use crate::logging;

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
	/// The log level to use, this is a tracing env filter
	pub level: String,

	/// What logging mode we should use
	pub mode: logging::Mode,
}

impl Default for LoggingConfig {
	fn default() -> Self {
		Self {
			level: "info".to_string(),
			mode: logging::Mode::Default,
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
	/// The database URL to use
	pub uri: String,
}

/// Builds a config from, in increasing priority: the serde defaults of `C`, a
/// config file, and `{prefix}_*` environment variables where `__` separates
/// nested keys (`QUIZ_API__BIND_ADDRESS` sets `api.bind_address`).
///
/// The file named by `{prefix}_CONFIG_FILE` must exist. The fallback
/// `config_file` is optional. Returns the file that was considered.
pub fn parse<C: DeserializeOwned>(prefix: &str, config_file: Option<&str>) -> Result<(C, Option<String>), ConfigError> {
	let provided = std::env::var(format!("{prefix}_CONFIG_FILE")).ok();
	let required = provided.is_some();
	let config_file = provided.or_else(|| config_file.map(str::to_owned));

	let mut builder = Config::builder();

	if let Some(path) = &config_file {
		builder = builder.add_source(File::with_name(path).required(required));
	}

	builder = builder.add_source(
		Environment::with_prefix(prefix)
			.prefix_separator("_")
			.separator("__")
			.try_parsing(true),
	);

	let config = builder.build()?.try_deserialize()?;

	Ok((config, config_file))
}
