use std::sync::Arc;

use common::http::RouteError;
use common::make_response;
use hyper::http::header;
use hyper::server::conn::Http;
use hyper::{Body, Request, Response, StatusCode};
use routerify::{RequestServiceBuilder, Router};
use serde_json::json;
use tokio::net::TcpSocket;
use tokio::select;

use self::error::Result;
use crate::config::ApiConfig;
use crate::global::QuizGlobal;

mod error;
mod middleware;
mod quiz;
mod ws;

pub use error::ApiError;

async fn hello(_: Request<Body>) -> Result<Response<Body>> {
	Ok(Response::builder()
		.status(StatusCode::OK)
		.header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
		.body(Body::from("Hello, World!"))
		.expect("failed to build response"))
}

async fn preflight(_: Request<Body>) -> Result<Response<Body>> {
	Ok(Response::builder()
		.status(StatusCode::NO_CONTENT)
		.body(Body::empty())
		.expect("failed to build response"))
}

async fn not_found(_: Request<Body>) -> Result<Response<Body>> {
	Ok(make_response!(
		StatusCode::NOT_FOUND,
		json!({
			"error": "not_found",
		})
	))
}

pub fn routes<G: QuizGlobal>(global: &Arc<G>) -> anyhow::Result<Router<Body, RouteError<ApiError>>> {
	let weak = Arc::downgrade(global);
	Router::builder()
		.data(weak)
		// The CORS middleware adds the CORS headers to the response
		.middleware(middleware::cors::cors_middleware(global)?)
		.get("/", hello)
		.scope("/api", quiz::routes(global))
		.get("/ws", ws::handler::<G>)
		.options("/*", preflight)
		.any(not_found)
		.err_handler_with_info(common::http::error_handler::<ApiError>)
		.build()
		.map_err(|err| anyhow::anyhow!("failed to build router: {err}"))
}

pub async fn run<G: QuizGlobal>(global: Arc<G>) -> anyhow::Result<()> {
	let config = global.config::<ApiConfig>();

	tracing::info!("Listening on {}", config.bind_address);
	let socket = if config.bind_address.is_ipv6() {
		TcpSocket::new_v6()?
	} else {
		TcpSocket::new_v4()?
	};

	socket.set_reuseaddr(true)?;
	socket.set_reuseport(true)?;
	socket.bind(config.bind_address)?;
	let listener = socket.listen(1024)?;

	// The router only holds a weak reference to the global state, so an idle
	// keep-alive connection does not keep the process from shutting down.
	let request_service = RequestServiceBuilder::new(routes(&global)?)
		.map_err(|err| anyhow::anyhow!("failed to build request service: {err}"))?;

	loop {
		select! {
			_ = global.ctx().done() => {
				return Ok(());
			},
			r = listener.accept() => {
				let (socket, addr) = r?;

				let service = request_service.build(addr);

				tracing::debug!("Accepted connection from {}", addr);

				tokio::spawn(async move {
					Http::new().serve_connection(
						socket,
						service,
					).with_upgrades().await.ok();
				});
			},
		}
	}
}
