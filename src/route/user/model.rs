pub use crate::route::model::{EmailInput, Empty};

use macros::model;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::store;

/// A single user.
#[model(create)]
#[derive(Debug, Deserialize, Serialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct User {
	/// The user's email address, which also identifies them.
	#[validate(email(message = "email must be a valid address"))]
	pub email: String,
	/// The user's password. Only a hash is stored, and it is never returned.
	#[serde(skip_serializing)]
	#[validate(length(min = 1, message = "password can't be empty"))]
	pub password: String,
	/// The user's display name.
	pub name: String,
	/// The user's age in years.
	#[validate(range(min = 18, message = "age must be at least 18 years old"))]
	pub age: u32,
	/// The creation time of the user.
	#[serde(skip_deserializing)]
	pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<store::User> for User {
	fn from(user: store::User) -> Self {
		Self {
			email: user.email,
			password: user.password,
			name: user.name,
			age: user.age,
			created_at: user.created_at,
		}
	}
}

/// Replaces every mutable field of a user. The email comes from the path.
#[derive(Debug, Deserialize, JsonSchema, Validate)]
pub struct UpdateUserInput {
	#[validate(length(min = 1, message = "password can't be empty"))]
	pub password: String,
	pub name: String,
	#[validate(range(min = 18, message = "age must be at least 18 years old"))]
	pub age: u32,
}
