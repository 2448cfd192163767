use std::time::Duration;

use common::prelude::FutureTimeout;
use futures_util::{SinkExt, StreamExt};
use http::StatusCode;
use serde_json::{json, Value};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::Message;

use crate::tests::global::{MemoryQuizRepository, TestServer};

#[tokio::test]
async fn test_ws_echo() {
	let server = TestServer::start(MemoryQuizRepository::default()).await;

	let (mut ws, resp) = tokio_tungstenite::connect_async(server.ws_url("/ws"))
		.await
		.expect("failed to connect websocket");
	assert_eq!(resp.status(), StatusCode::SWITCHING_PROTOCOLS);

	let frames = [
		Message::Text("hello".to_string()),
		Message::Binary(vec![0, 1, 2, 255]),
		Message::Text(String::new()),
	];

	for frame in frames {
		ws.send(frame.clone()).await.expect("failed to send frame");

		let echoed = ws
			.next()
			.timeout(Duration::from_secs(1))
			.await
			.expect("echo timed out")
			.expect("stream closed")
			.expect("failed to read frame");

		assert_eq!(echoed, frame);
	}

	ws.close(None).await.expect("failed to close websocket");

	// The server acknowledges the close and ends the stream.
	while let Some(Ok(msg)) = ws.next().timeout(Duration::from_secs(1)).await.expect("close timed out") {
		assert!(msg.is_close());
	}

	server.shutdown().await;
}

#[tokio::test]
async fn test_ws_connections_are_independent() {
	let server = TestServer::start(MemoryQuizRepository::default()).await;

	let (mut first, _) = tokio_tungstenite::connect_async(server.ws_url("/ws"))
		.await
		.expect("failed to connect websocket");
	let (mut second, _) = tokio_tungstenite::connect_async(server.ws_url("/ws"))
		.await
		.expect("failed to connect websocket");

	first.close(None).await.expect("failed to close websocket");
	drop(first);

	second
		.send(Message::Text("still here".to_string()))
		.await
		.expect("failed to send frame");

	let echoed = second
		.next()
		.timeout(Duration::from_secs(1))
		.await
		.expect("echo timed out")
		.expect("stream closed")
		.expect("failed to read frame");
	assert_eq!(echoed, Message::Text("still here".to_string()));

	drop(second);
	server.shutdown().await;
}

#[tokio::test]
async fn test_ws_requires_upgrade() {
	let server = TestServer::start(MemoryQuizRepository::default()).await;
	let client = reqwest::Client::new();

	let resp = client.get(server.url("/ws")).send().await.expect("failed to get /ws");

	assert_eq!(resp.status(), StatusCode::UPGRADE_REQUIRED);
	let body: Value = resp.json().await.expect("failed to read body");
	assert_eq!(body, json!({ "error": "websocket upgrade required" }));

	drop(client);
	server.shutdown().await;
}

#[tokio::test]
async fn test_ws_closed_on_shutdown() {
	let server = TestServer::start(MemoryQuizRepository::default()).await;

	let (mut ws, _) = tokio_tungstenite::connect_async(server.ws_url("/ws"))
		.await
		.expect("failed to connect websocket");

	let shutdown = tokio::spawn(server.shutdown());

	let msg = ws
		.next()
		.timeout(Duration::from_secs(1))
		.await
		.expect("close frame timed out")
		.expect("stream closed")
		.expect("failed to read frame");

	match msg {
		Message::Close(Some(frame)) => {
			assert_eq!(frame.code, CloseCode::Restart);
			assert_eq!(frame.reason, "server is restarting");
		}
		msg => panic!("expected a close frame, got {:?}", msg),
	}

	drop(ws);

	shutdown
		.timeout(Duration::from_secs(2))
		.await
		.expect("shutdown timed out")
		.expect("panic in shutdown");
}
