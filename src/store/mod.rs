//! Persistence for users and posts.
//!
//! The whole [`Document`] is loaded, modified and written back on every
//! operation. [`Storage`] abstracts where the document lives, and [`Store`]
//! implements the entity operations on top of it.

mod client;
mod file;
mod memory;
mod model;

use std::{path::PathBuf, str::FromStr};

use uuid::Uuid;

pub use client::Store;
pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use model::{Document, Post, User};

/// An error returned by the store.
///
/// `UnknownUser`, `UnknownPost` and `UserExists` are caused by the caller and
/// are safe to show to clients. The other variants describe the backing storage.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("user {0} doesn't exist")]
	UnknownUser(String),
	#[error("post {0} doesn't exist")]
	UnknownPost(Uuid),
	#[error("user {0} already exists")]
	UserExists(String),
	#[error("store at {} is unavailable: {source}", .path.display())]
	Unavailable {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error("store contents are corrupt: {0}")]
	Corrupt(#[source] serde_json::Error),
	#[error("failed to encode store contents: {0}")]
	Encode(#[source] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Where the [`Document`] lives.
///
/// Implementations only move whole documents; they do not coordinate access.
/// [`Store`] serializes calls so that a load and the following save are never
/// interleaved with another writer.
#[axum::async_trait]
pub trait Storage: Send + Sync {
	/// Creates an empty document if none exists yet. Never overwrites existing data.
	async fn ensure(&self) -> Result<()>;

	/// Reads the entire document.
	async fn load(&self) -> Result<Document>;

	/// Replaces the stored document with `document`.
	async fn save(&self, document: &Document) -> Result<()>;
}

/// What [`Store::create_user`] does when the email is already registered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UserConflict {
	/// Replace the existing user.
	#[default]
	Overwrite,
	/// Fail with [`Error::UserExists`].
	Reject,
}

impl FromStr for UserConflict {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"overwrite" => Ok(Self::Overwrite),
			"reject" => Ok(Self::Reject),
			_ => Err(format!("unknown user conflict policy {s:?}")),
		}
	}
}
