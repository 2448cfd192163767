use std::fmt;

use hyper::body::to_bytes;
use hyper::StatusCode;

use crate::http::ext::ResultExt;
use crate::http::{RouteError, ShouldLog};

#[derive(Debug)]
struct TestError(&'static str);

impl fmt::Display for TestError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl std::error::Error for TestError {}

async fn body_json(err: RouteError<TestError>) -> (StatusCode, serde_json::Value) {
	let resp = err.response();
	let status = resp.status();
	let body = to_bytes(resp.into_body()).await.expect("failed to read body");

	(status, serde_json::from_slice(&body).expect("body is not json"))
}

#[tokio::test]
async fn test_status_message() {
	let err = RouteError::<TestError>::from((StatusCode::BAD_REQUEST, "Invalid request body"));

	assert_eq!(err.should_log(), ShouldLog::No);
	assert_eq!(format!("{}", err), "RouteError: Unknown Source");

	let (status, body) = body_json(err).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body, serde_json::json!({ "error": "Invalid request body" }));
}

#[tokio::test]
async fn test_status_message_source() {
	let err = RouteError::<TestError>::from((StatusCode::NOT_FOUND, "not_found", TestError("missing")));

	assert_eq!(err.should_log(), ShouldLog::Debug);
	assert_eq!(format!("{}", err), "RouteError: missing");
	assert_eq!(format!("{:?}", err), "RouteError: TestError(\"missing\")");
	assert!(std::error::Error::source(&err).is_some());

	let (status, body) = body_json(err).await;
	assert_eq!(status, StatusCode::NOT_FOUND);
	assert_eq!(body, serde_json::json!({ "error": "not_found" }));
}

#[tokio::test]
async fn test_map_err_route() {
	let result: Result<(), TestError> = Err(TestError("database is down"));
	let err: RouteError<TestError> = result
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch quizzes"))
		.expect_err("error should be mapped");

	assert_eq!(err.should_log(), ShouldLog::Yes);
	assert_eq!(format!("{}", err), "RouteError: database is down");
	assert!(err.location().file().ends_with("http.rs"));

	let (status, body) = body_json(err).await;
	assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
	assert_eq!(body, serde_json::json!({ "error": "Failed to fetch quizzes" }));
}

#[test]
fn test_map_err_route_ok() {
	let result: Result<u32, TestError> = Ok(7);
	let value: Result<u32, RouteError<TestError>> =
		result.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "unused"));

	assert_eq!(value.ok(), Some(7));
}

#[test]
fn test_location_is_caller() {
	let err = RouteError::<TestError>::from((StatusCode::BAD_REQUEST, "bad", TestError("bad")));
	assert_eq!(err.location().file(), file!());

	let err = RouteError::<TestError>::from(hyper::Response::new(hyper::Body::empty()));
	assert_eq!(err.location().file(), file!());
	assert_eq!(err.should_log(), ShouldLog::No);
}
