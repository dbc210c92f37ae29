use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Everything the store persists, serialized as a single JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
	/// Users keyed by email.
	#[serde(default, deserialize_with = "null_as_default")]
	pub users: BTreeMap<String, User>,
	/// Posts keyed by id.
	#[serde(default, deserialize_with = "null_as_default")]
	pub posts: BTreeMap<Uuid, Post>,
}

/// Older files may contain `null` instead of an empty map.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: Deserializer<'de>,
	T: Default + Deserialize<'de>,
{
	Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
	pub created_at: DateTime<Utc>,
	pub email: String,
	/// Stored as given. The HTTP layer only ever passes password hashes.
	pub password: String,
	pub name: String,
	pub age: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
	pub id: Uuid,
	pub created_at: DateTime<Utc>,
	/// Not enforced after creation: deleting the user leaves the post behind.
	pub user_email: String,
	pub text: String,
}
