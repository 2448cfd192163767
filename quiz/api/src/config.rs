use std::net::SocketAddr;

use common::config::{ConfigError, DatabaseConfig, LoggingConfig};

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
/// The quiz API server configuration
pub struct AppConfig {
	/// The path to the config file
	pub config_file: Option<String>,

	/// Name of this instance
	pub name: String,

	/// The logging config
	pub logging: LoggingConfig,

	/// API Config
	pub api: ApiConfig,

	/// Database Config
	pub database: DatabaseConfig,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct ApiConfig {
	/// Bind address for the API
	pub bind_address: SocketAddr,

	/// Largest request body accepted, in bytes
	pub max_body_size: usize,

	/// Cross origin settings applied to every response
	pub cors: CorsConfig,
}

impl Default for ApiConfig {
	fn default() -> Self {
		Self {
			bind_address: SocketAddr::from(([0, 0, 0, 0, 0, 0, 0, 0], 3000)),
			max_body_size: 4 * 1024 * 1024,
			cors: CorsConfig::default(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct CorsConfig {
	/// The single origin allowed to make cross origin requests, `*` allows any
	pub allow_origin: String,

	/// Value of `Access-Control-Allow-Headers`
	pub allow_headers: String,

	/// Value of `Access-Control-Allow-Methods`
	pub allow_methods: String,
}

impl Default for CorsConfig {
	fn default() -> Self {
		Self {
			allow_origin: "http://localhost:5173".to_string(),
			allow_headers: "Origin, Content-Type, Accept".to_string(),
			allow_methods: "GET, POST, HEAD, PUT, DELETE, PATCH".to_string(),
		}
	}
}

impl Default for AppConfig {
	fn default() -> Self {
		Self {
			config_file: Some("config".to_string()),
			name: "quiz-api".to_string(),
			logging: LoggingConfig::default(),
			api: ApiConfig::default(),
			database: DatabaseConfig::default(),
		}
	}
}

impl AppConfig {
	pub const ENV_PREFIX: &'static str = "QUIZ";

	pub fn parse() -> Result<Self, ConfigError> {
		let (mut config, config_file) =
			common::config::parse::<Self>(Self::ENV_PREFIX, Self::default().config_file.as_deref())?;

		config.config_file = config_file;
		config.apply_deploy_env()?;

		Ok(config)
	}

	/// `DATABASE_URL` and `PORT` are what most hosting platforms inject, they
	/// win over every other source.
	fn apply_deploy_env(&mut self) -> Result<(), ConfigError> {
		if let Some(uri) = std::env::var("DATABASE_URL").ok().filter(|uri| !uri.is_empty()) {
			self.database.uri = uri;
		}

		if let Some(port) = std::env::var("PORT").ok().filter(|port| !port.is_empty()) {
			let port = port
				.parse::<u16>()
				.map_err(|err| ConfigError::Message(format!("invalid PORT {port:?}: {err}")))?;
			self.api.bind_address.set_port(port);
		}

		Ok(())
	}
}
