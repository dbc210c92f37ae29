use axum::extract::State;
use macros::route;

use crate::{
	error::Error,
	extract::{Created, Json, Path, Query},
	openapi::tag,
	store::Store,
};

use super::model;

/// Get user posts
/// Returns every post created by a user, oldest first.
#[route(tag = tag::POST)]
pub async fn get_posts(
	State(store): State<Store>,
	Query(query): Query<model::UserPostsInput>,
) -> Result<Json<Vec<model::Post>>, Error> {
	let posts = store.get_posts(&query.user_email).await?;

	Ok(Json(posts.into_iter().map(Into::into).collect()))
}

/// Create post
/// Creates a new post for an existing user.
#[route(tag = tag::POST, response(status = 201, description = "Created successfully.", shape = "Created<model::Post>"))]
pub async fn create_post(
	State(store): State<Store>,
	Json(input): Json<model::CreatePost>,
) -> Result<Created<model::Post>, Error> {
	let post = store.create_post(input.user_email, input.text).await?;

	tracing::info!(id = %post.id, email = %post.user_email, "created post");

	Ok(Created(post.into()))
}

/// Delete post
/// Deletes a post by its unique id.
#[route(tag = tag::POST)]
pub async fn delete_post(
	State(store): State<Store>,
	Path(path): Path<model::IdInput>,
) -> Result<Json<model::Empty>, Error> {
	store.delete_post(path.id).await?;

	tracing::info!(id = %path.id, "deleted post");

	Ok(Json(model::Empty::default()))
}
