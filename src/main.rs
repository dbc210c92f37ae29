#![warn(clippy::pedantic)]

mod config;
mod error;
mod extract;
mod openapi;
mod route;
mod store;
mod trace;

use argon2::Argon2;

pub use error::Error;

pub type AppState = State;

/// The shared application state.
///
/// This should contain all shared dependencies that handlers need to access,
/// such as the store or a hash configuration (if it's expensive to create).
#[derive(Clone, axum::extract::FromRef)]
pub struct State {
	pub store: store::Store,
	pub hasher: Argon2<'static>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	dotenvy::dotenv().ok();

	let config = config::Config::from_env()?;
	let _guard = trace::init_tracing_subscriber(&config)?;

	let store = store::Store::new(config.storage()).with_conflict(config.user_conflict);
	store.ensure().await?;

	let state = State {
		store,
		hasher: Argon2::default(),
	};

	let listener = tokio::net::TcpListener::bind((config.host, config.port)).await?;

	tracing::info!(
		address = %listener.local_addr()?,
		database = ?config.database,
		"listening"
	);

	axum::serve(listener, route::router(state))
		.with_graceful_shutdown(shutdown_signal())
		.await?;

	Ok(())
}

async fn shutdown_signal() {
	if let Err(error) = tokio::signal::ctrl_c().await {
		tracing::error!(%error, "failed to listen for shutdown signal");
		std::future::pending::<()>().await;
	}

	tracing::info!("shutting down");
}
