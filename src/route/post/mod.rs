use aide::axum::{
	routing::{delete_with, get_with},
	ApiRouter,
};

use crate::AppState;

pub mod model;
pub mod route;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route(
			"/",
			get_with(get_posts, get_posts_docs).post_with(create_post, create_post_docs),
		)
		.api_route("/:id", delete_with(delete_post, delete_post_docs))
}
