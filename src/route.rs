pub mod docs;
pub mod model;
pub mod post;
pub mod user;

use std::{sync::Arc, time::Duration};

use aide::{axum::ApiRouter, openapi::OpenApi};
use axum::{
	body::Body,
	http::{Request, StatusCode},
	middleware,
	response::{IntoResponse, Response},
	Extension, Router,
};
use tower::{Layer, ServiceBuilder};
use tower_http::{
	compression::CompressionLayer,
	cors::CorsLayer,
	normalize_path::NormalizePathLayer,
	request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
	trace::TraceLayer,
};
use tracing::Span;

use crate::{error::Error, openapi, AppState};

/// Builds the application router, with OpenAPI docs and middleware applied.
///
/// Trailing slashes are trimmed before routing, so `/users/` is the same as `/users`.
pub fn router(state: AppState) -> Router {
	let app = NormalizePathLayer::trim_trailing_slash().layer(api_router(state));

	Router::new().fallback_service(app)
}

fn api_router(state: AppState) -> Router {
	let mut api = OpenApi::default();

	ApiRouter::new()
		.nest("/users", user::routes())
		.nest("/posts", post::routes())
		.nest("/docs", docs::routes())
		.finish_api_with(&mut api, openapi::docs)
		.layer(Extension(Arc::new(api)))
		.fallback(not_found)
		.layer(middleware::map_response(method_not_allowed_as_not_found))
		.layer(
			ServiceBuilder::new()
				.layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
				.layer(
					TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
						let request_id = request
							.headers()
							.get("x-request-id")
							.and_then(|value| value.to_str().ok())
							.unwrap_or_default();

						tracing::info_span!(
							"request",
							method = %request.method(),
							uri = %request.uri(),
							request_id
						)
					})
					.on_response(record_latency),
				)
				.layer(PropagateRequestIdLayer::x_request_id())
				.layer(CorsLayer::permissive())
				.layer(CompressionLayer::new()),
		)
		.with_state(state)
}

/// Logs the finished request and records its latency in the `latency_ms` histogram.
fn record_latency<B>(response: &Response<B>, latency: Duration, _span: &Span) {
	tracing::info!(
		histogram.latency_ms = latency.as_secs_f64() * 1000.0,
		status = response.status().as_u16(),
		"finished request"
	);
}

async fn not_found() -> Error {
	Error::NotFound
}

/// Unsupported methods on known paths are reported like unknown paths.
async fn method_not_allowed_as_not_found(response: Response) -> Response {
	if response.status() == StatusCode::METHOD_NOT_ALLOWED {
		Error::NotFound.into_response()
	} else {
		response
	}
}
