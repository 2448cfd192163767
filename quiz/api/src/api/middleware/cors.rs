use std::sync::Arc;

use anyhow::Context as _;
use common::http::RouteError;
use hyper::http::header;
use hyper::http::HeaderValue;
use hyper::Body;
use routerify::Middleware;

use crate::api::error::ApiError;
use crate::config::ApiConfig;
use crate::global::QuizGlobal;

/// Adds the CORS headers to every response. The allow origin header is only
/// sent back when the request comes from the configured origin.
pub fn cors_middleware<G: QuizGlobal>(global: &Arc<G>) -> anyhow::Result<Middleware<Body, RouteError<ApiError>>> {
	let cors = &global.config::<ApiConfig>().cors;

	let allow_any = cors.allow_origin == "*";
	let allow_origin = HeaderValue::from_str(&cors.allow_origin).context("invalid cors allow origin")?;
	let allow_headers = HeaderValue::from_str(&cors.allow_headers).context("invalid cors allow headers")?;
	let allow_methods = HeaderValue::from_str(&cors.allow_methods).context("invalid cors allow methods")?;

	Ok(Middleware::post_with_info(move |mut resp, info| {
		let allowed = allow_any || info.headers().get(header::ORIGIN) == Some(&allow_origin);

		let headers = resp.headers_mut();
		if allowed {
			headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, allow_origin.clone());
		}
		headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, allow_headers.clone());
		headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, allow_methods.clone());
		headers.append(header::VARY, HeaderValue::from_static("Origin"));

		async move { Ok(resp) }
	}))
}
