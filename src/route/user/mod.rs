use aide::axum::{
	routing::{get_with, post_with},
	ApiRouter,
};

use crate::AppState;

pub mod model;
pub mod route;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route("/", post_with(create_user, create_user_docs))
		.api_route(
			"/:email",
			get_with(get_user, get_user_docs)
				.put_with(update_user, update_user_docs)
				.delete_with(delete_user, delete_user_docs),
		)
}
