use argon2::{
	password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
	Argon2,
};
use axum::extract::State;
use macros::route;

use crate::{
	error::Error,
	extract::{Created, Json, Path},
	openapi::tag,
	store::Store,
	AppState,
};

use super::model;

/// Hashes a password with Argon2 and a random salt, returning a PHC string.
///
/// Hashing runs on the blocking thread pool.
async fn hash_password(hasher: Argon2<'static>, password: String) -> Result<String, Error> {
	tokio::task::spawn_blocking(move || {
		let salt = SaltString::generate(&mut OsRng);

		Ok::<_, Error>(hasher.hash_password(password.as_bytes(), &salt)?.to_string())
	})
	.await?
}

/// Get user
/// Returns a single user by their email address.
#[route(tag = tag::USER)]
pub async fn get_user(
	State(store): State<Store>,
	Path(path): Path<model::EmailInput>,
) -> Result<Json<model::User>, Error> {
	let user = store.get_user(&path.email).await?;

	Ok(Json(user.into()))
}

/// Create user
/// Creates a new user. Depending on the server configuration, an existing user with the same email is either replaced or rejected.
#[route(tag = tag::USER, response(status = 201, description = "Created successfully.", shape = "Created<model::User>"))]
pub async fn create_user(
	State(state): State<AppState>,
	Json(input): Json<model::CreateUser>,
) -> Result<Created<model::User>, Error> {
	let password = hash_password(state.hasher, input.password).await?;
	let user = state
		.store
		.create_user(input.email, password, input.name, input.age)
		.await?;

	tracing::info!(email = %user.email, "created user");

	Ok(Created(user.into()))
}

/// Update user
/// Replaces the password, name and age of an existing user.
#[route(tag = tag::USER)]
pub async fn update_user(
	State(state): State<AppState>,
	Path(path): Path<model::EmailInput>,
	Json(input): Json<model::UpdateUserInput>,
) -> Result<Json<model::User>, Error> {
	let password = hash_password(state.hasher, input.password).await?;
	let user = state
		.store
		.update_user(&path.email, password, input.name, input.age)
		.await?;

	Ok(Json(user.into()))
}

/// Delete user
/// Deletes a user by their email address. Posts created by the user are kept.
#[route(tag = tag::USER)]
pub async fn delete_user(
	State(store): State<Store>,
	Path(path): Path<model::EmailInput>,
) -> Result<Json<model::Empty>, Error> {
	store.delete_user(&path.email).await?;

	tracing::info!(email = %path.email, "deleted user");

	Ok(Json(model::Empty::default()))
}
