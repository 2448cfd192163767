use std::sync::Arc;

use common::http::ext::{RequestGlobalExt, ResultExt};
use futures_util::{SinkExt, StreamExt};
use hyper::{Body, Request, Response, StatusCode};
use hyper_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use hyper_tungstenite::tungstenite::protocol::CloseFrame;
use hyper_tungstenite::tungstenite::Message;
use hyper_tungstenite::HyperWebsocket;
use tokio::select;

use super::error::Result;
use crate::global::QuizGlobal;

/// Sends every text and binary frame back unchanged until the peer goes away
/// or the server starts shutting down.
async fn echo<G: QuizGlobal>(ws: HyperWebsocket, global: Arc<G>) {
	let mut ws = match ws.await {
		Ok(ws) => ws,
		Err(err) => {
			tracing::error!(error = %err, "failed to upgrade websocket request");
			return;
		}
	};

	tracing::debug!("websocket connected");

	loop {
		select! {
			msg = ws.next() => {
				let msg = match msg {
					Some(Ok(msg)) => msg,
					Some(Err(err)) => {
						tracing::debug!(error = %err, "websocket read failed");
						break;
					}
					None => break,
				};

				// Pings and close frames are answered by tungstenite itself.
				if msg.is_text() || msg.is_binary() {
					if let Err(err) = ws.send(msg).await {
						tracing::debug!(error = %err, "websocket write failed");
						break;
					}
				}
			}
			_ = global.ctx().done() => {
				ws.send(Message::Close(Some(CloseFrame {
					code: CloseCode::Restart,
					reason: "server is restarting".into(),
				})))
				.await
				.ok();
				break;
			}
		}
	}

	tracing::debug!("websocket disconnected");
}

pub async fn handler<G: QuizGlobal>(mut req: Request<Body>) -> Result<Response<Body>> {
	if !hyper_tungstenite::is_upgrade_request(&req) {
		return Err((StatusCode::UPGRADE_REQUIRED, "websocket upgrade required").into());
	}

	let global = req.get_global::<G>()?;

	let (response, websocket) =
		hyper_tungstenite::upgrade(&mut req, None).map_err_route((StatusCode::BAD_REQUEST, "invalid websocket handshake"))?;

	tokio::spawn(echo(websocket, global));

	Ok(response)
}
