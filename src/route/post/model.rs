pub use crate::route::model::{Empty, IdInput};

use macros::model;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::store;

/// A single post, created by a user.
#[model(create)]
#[derive(Debug, Deserialize, Serialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Post {
	/// The unique identifier of the post.
	#[serde(skip_deserializing)]
	pub id: Uuid,
	/// The creation time of the post.
	#[serde(skip_deserializing)]
	pub created_at: chrono::DateTime<chrono::Utc>,
	/// The email of the user that created the post.
	#[validate(email(message = "userEmail must be a valid address"))]
	pub user_email: String,
	/// The content of the post.
	#[validate(length(min = 1, message = "text can't be empty"))]
	pub text: String,
}

impl From<store::Post> for Post {
	fn from(post: store::Post) -> Self {
		Self {
			id: post.id,
			created_at: post.created_at,
			user_email: post.user_email,
			text: post.text,
		}
	}
}

#[derive(Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserPostsInput {
	/// Only posts created by this user are returned.
	#[validate(email(message = "userEmail must be a valid address"))]
	pub user_email: String,
}
