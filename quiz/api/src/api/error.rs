use common::http::RouteError;

use crate::database::QuizStoreError;

pub type Result<T, E = RouteError<ApiError>> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
	#[error("failed to read http body: {0}")]
	ReadBody(#[from] hyper::Error),
	#[error("json error: {0}")]
	Json(#[from] serde_json::Error),
	#[error("request body exceeds {0} bytes")]
	BodyTooLarge(usize),
	#[error("unsupported content type: {0}")]
	UnsupportedContentType(String),
	#[error("store error: {0}")]
	Store(#[from] QuizStoreError),
	#[error("failed to upgrade ws connection: {0}")]
	WsUpgrade(#[from] hyper_tungstenite::tungstenite::error::ProtocolError),
}
