use std::sync::Arc;

use common::http::ext::{RequestGlobalExt, ResultExt};
use common::make_response;
use hyper::body::HttpBody;
use hyper::http::header;
use hyper::{Body, Request, Response, StatusCode};
use routerify::Router;
use serde_json::{Map, Value};

use super::error::{ApiError, Result};
use crate::config::ApiConfig;
use crate::global::QuizGlobal;

const INVALID_BODY: &str = "Invalid request body";
const BODY_TOO_LARGE: &str = "Request body too large";

/// The fields a client may set. `id` and `created_at` must have the right
/// type when present but are otherwise ignored, as is anything unknown.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct CreateQuizRequest {
	title: Option<String>,
	description: Option<String>,
	#[serde(rename = "id")]
	_id: Option<i64>,
	#[serde(rename = "created_at")]
	_created_at: Option<String>,
}

impl CreateQuizRequest {
	/// Only a JSON object is a valid request, arrays and scalars are rejected
	/// before the fields are looked at.
	fn from_slice(body: &[u8]) -> serde_json::Result<Self> {
		let object: Map<String, Value> = serde_json::from_slice(body)?;
		serde_json::from_value(Value::Object(object))
	}
}

pub fn routes<G: QuizGlobal>(_: &Arc<G>) -> Router<Body, common::http::RouteError<ApiError>> {
	Router::builder()
		.get("/quizes", list::<G>)
		.post("/quizes", create::<G>)
		.build()
		.expect("failed to build router")
}

fn is_json(content_type: &str) -> bool {
	let essence = content_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();

	essence == "application/json" || (essence.starts_with("application/") && essence.ends_with("+json"))
}

async fn list<G: QuizGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;

	let quizzes = global
		.quiz_repository()
		.list_all()
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch quizzes"))?;

	tracing::debug!(count = quizzes.len(), "listed quizzes");

	let body = serde_json::to_string(&quizzes).map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch quizzes"))?;

	Ok(make_response!(StatusCode::OK, body))
}

async fn create<G: QuizGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;

	let content_length = req
		.headers()
		.get(header::CONTENT_LENGTH)
		.and_then(|value| value.to_str().ok())
		.and_then(|value| value.parse::<u64>().ok());
	let limit = global.config::<ApiConfig>().max_body_size;
	if content_length.is_some_and(|length| length > limit as u64) {
		return Err((StatusCode::PAYLOAD_TOO_LARGE, BODY_TOO_LARGE, ApiError::BodyTooLarge(limit)).into());
	}

	if let Some(content_type) = req.headers().get(header::CONTENT_TYPE) {
		let content_type = content_type.to_str().unwrap_or_default();
		if !is_json(content_type) {
			return Err((
				StatusCode::BAD_REQUEST,
				INVALID_BODY,
				ApiError::UnsupportedContentType(content_type.to_string()),
			)
				.into());
		}
	}

	let body = read_body(req.into_body(), limit).await?;

	let request = CreateQuizRequest::from_slice(&body).map_err_route((StatusCode::BAD_REQUEST, INVALID_BODY))?;

	let quiz = global
		.quiz_repository()
		.create(
			request.title.as_deref().unwrap_or_default(),
			request.description.as_deref().unwrap_or_default(),
		)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "Failed to create quiz"))?;

	tracing::debug!(id = quiz.id, "created quiz");

	let body = serde_json::to_string(&quiz).map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "Failed to create quiz"))?;

	Ok(make_response!(StatusCode::CREATED, body))
}

/// Collects the body, failing as soon as it grows past `limit` bytes. Chunked
/// bodies carry no length up front so the cap is checked per chunk.
async fn read_body(mut body: Body, limit: usize) -> Result<Vec<u8>> {
	let mut buf = Vec::new();

	while let Some(chunk) = body.data().await {
		let chunk = chunk.map_err_route((StatusCode::BAD_REQUEST, INVALID_BODY))?;

		if buf.len() + chunk.len() > limit {
			return Err((StatusCode::PAYLOAD_TOO_LARGE, BODY_TOO_LARGE, ApiError::BodyTooLarge(limit)).into());
		}

		buf.extend_from_slice(&chunk);
	}

	Ok(buf)
}

#[cfg(test)]
mod tests {
	use super::{is_json, read_body, CreateQuizRequest};

	#[test]
	fn test_is_json() {
		assert!(is_json("application/json"));
		assert!(is_json("application/json; charset=utf-8"));
		assert!(is_json("Application/JSON"));
		assert!(is_json("application/merge-patch+json"));
		assert!(!is_json("text/plain"));
		assert!(!is_json("application/x-www-form-urlencoded"));
		assert!(!is_json(""));
	}

	#[test]
	fn test_request_must_be_object() {
		let request = CreateQuizRequest::from_slice(br#"{"title":"T","id":4,"created_at":"2024-01-01T00:00:00Z"}"#)
			.expect("object body should parse");
		assert_eq!(request.title.as_deref(), Some("T"));

		assert!(CreateQuizRequest::from_slice(br#"["T","D"]"#).is_err());
		assert!(CreateQuizRequest::from_slice(b"42").is_err());
		assert!(CreateQuizRequest::from_slice(b"null").is_err());
		assert!(CreateQuizRequest::from_slice(br#"{"title":"T","id":"seven"}"#).is_err());
		assert!(CreateQuizRequest::from_slice(br#"{"title":"T","created_at":12345}"#).is_err());
	}

	#[tokio::test]
	async fn test_read_body_limit() {
		let body = read_body(hyper::Body::from("a".repeat(16)), 16)
			.await
			.expect("body at the limit should be read");
		assert_eq!(body.len(), 16);

		let err = read_body(hyper::Body::from("a".repeat(17)), 16)
			.await
			.expect_err("body over the limit should fail");
		assert_eq!(err.response().status(), hyper::StatusCode::PAYLOAD_TOO_LARGE);
	}
}
