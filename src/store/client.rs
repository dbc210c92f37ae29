use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Document, Error, Post, Result, Storage, User, UserConflict};

/// The users and posts store.
///
/// Every operation reads the whole document from [`Storage`], and every
/// mutation writes the whole document back. Mutations hold an exclusive guard
/// for the full load-modify-save cycle, so concurrent requests cannot overwrite
/// each other's changes. Reads share the guard.
///
/// Operation spans only record the key of the user or post involved.
#[derive(Clone)]
pub struct Store {
	storage: Arc<dyn Storage>,
	guard: Arc<RwLock<()>>,
	conflict: UserConflict,
}

impl Store {
	pub fn new(storage: Arc<dyn Storage>) -> Self {
		Self {
			storage,
			guard: Arc::default(),
			conflict: UserConflict::default(),
		}
	}

	#[must_use]
	pub fn with_conflict(mut self, conflict: UserConflict) -> Self {
		self.conflict = conflict;
		self
	}

	/// Initializes the backing storage if it is empty.
	pub async fn ensure(&self) -> Result<()> {
		let _guard = self.guard.write().await;

		self.storage.ensure().await
	}

	/// Returns a snapshot of the whole document.
	pub async fn load(&self) -> Result<Document> {
		let _guard = self.guard.read().await;

		self.storage.load().await
	}

	/// Replaces the whole document.
	pub async fn save(&self, document: &Document) -> Result<()> {
		let _guard = self.guard.write().await;

		self.storage.save(document).await
	}

	/// Runs `f` against a freshly loaded document and saves the result.
	///
	/// Nothing is written if `f` fails.
	async fn mutate<T, F>(&self, f: F) -> Result<T>
	where
		F: FnOnce(&mut Document) -> Result<T> + Send,
		T: Send,
	{
		let _guard = self.guard.write().await;
		let mut document = self.storage.load().await?;

		let value = f(&mut document)?;

		self.storage.save(&document).await?;
		Ok(value)
	}

	#[tracing::instrument(skip_all, fields(email = %email))]
	pub async fn create_user(
		&self,
		email: String,
		password: String,
		name: String,
		age: u32,
	) -> Result<User> {
		let conflict = self.conflict;

		self.mutate(move |document| {
			if document.users.contains_key(&email) {
				match conflict {
					UserConflict::Reject => return Err(Error::UserExists(email)),
					UserConflict::Overwrite => {
						tracing::debug!("overwriting existing user");
					}
				}
			}

			let user = User {
				created_at: Utc::now(),
				email,
				password,
				name,
				age,
			};

			document.users.insert(user.email.clone(), user.clone());
			Ok(user)
		})
		.await
	}

	/// Replaces the password, name and age of an existing user.
	/// The email and creation time never change.
	#[tracing::instrument(skip_all, fields(email = %email))]
	pub async fn update_user(
		&self,
		email: &str,
		password: String,
		name: String,
		age: u32,
	) -> Result<User> {
		self.mutate(move |document| {
			let user = document
				.users
				.get_mut(email)
				.ok_or_else(|| Error::UnknownUser(email.to_owned()))?;

			user.password = password;
			user.name = name;
			user.age = age;

			Ok(user.clone())
		})
		.await
	}

	#[tracing::instrument(skip_all, fields(email = %email))]
	pub async fn get_user(&self, email: &str) -> Result<User> {
		let mut document = self.load().await?;

		document
			.users
			.remove(email)
			.ok_or_else(|| Error::UnknownUser(email.to_owned()))
	}

	/// Removes a user. Their posts are kept.
	#[tracing::instrument(skip_all, fields(email = %email))]
	pub async fn delete_user(&self, email: &str) -> Result<()> {
		self.mutate(move |document| {
			document
				.users
				.remove(email)
				.map(drop)
				.ok_or_else(|| Error::UnknownUser(email.to_owned()))
		})
		.await
	}

	/// Creates a post for an existing user.
	#[tracing::instrument(skip_all, fields(user_email = %user_email))]
	pub async fn create_post(&self, user_email: String, text: String) -> Result<Post> {
		self.mutate(move |document| {
			if !document.users.contains_key(&user_email) {
				return Err(Error::UnknownUser(user_email));
			}

			let post = Post {
				id: Uuid::new_v4(),
				created_at: Utc::now(),
				user_email,
				text,
			};

			document.posts.insert(post.id, post.clone());
			Ok(post)
		})
		.await
	}

	/// Returns the posts created with `user_email`, oldest first.
	///
	/// An unknown email is not an error, it simply has no posts.
	#[tracing::instrument(skip_all, fields(user_email = %user_email))]
	pub async fn get_posts(&self, user_email: &str) -> Result<Vec<Post>> {
		let document = self.load().await?;

		let mut posts = document
			.posts
			.into_values()
			.filter(|post| post.user_email == user_email)
			.collect::<Vec<_>>();

		posts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

		Ok(posts)
	}

	#[tracing::instrument(skip_all, fields(id = %id))]
	pub async fn delete_post(&self, id: Uuid) -> Result<()> {
		self.mutate(move |document| {
			document
				.posts
				.remove(&id)
				.map(drop)
				.ok_or(Error::UnknownPost(id))
		})
		.await
	}
}

#[cfg(test)]
mod test {
	use std::{collections::HashSet, sync::Arc};

	use chrono::{Duration, TimeZone, Utc};
	use tempfile::TempDir;
	use uuid::Uuid;

	use crate::store::{
		Document, Error, FileStorage, MemoryStorage, Post, Storage, Store, User, UserConflict,
	};

	async fn store_with(storage: impl Storage + 'static) -> Store {
		let store = Store::new(Arc::new(storage));
		store.ensure().await.unwrap();
		store
	}

	async fn memory_store() -> Store {
		store_with(MemoryStorage::new()).await
	}

	async fn file_store(dir: &TempDir) -> Store {
		store_with(FileStorage::new(dir.path().join("db.json"))).await
	}

	/// Runs every listed check once with each storage backend.
	macro_rules! storage_tests {
		($($name:ident),* $(,)?) => {
			mod memory {
				$(
					#[tokio::test]
					async fn $name() {
						super::$name(super::memory_store().await).await;
					}
				)*
			}

			mod file {
				$(
					#[tokio::test]
					async fn $name() {
						let dir = tempfile::tempdir().unwrap();
						super::$name(super::file_store(&dir).await).await;
					}
				)*
			}
		};
	}

	storage_tests!(
		test_create_then_get_user,
		test_get_unknown_user,
		test_create_existing_user_overwrites_by_default,
		test_create_existing_user_rejected,
		test_update_unknown_user,
		test_update_keeps_email_and_creation_time,
		test_delete_user_twice,
		test_delete_user_keeps_posts,
		test_create_post_for_unknown_user,
		test_get_posts_only_returns_own_posts,
		test_get_posts_ordered_by_creation_time,
		test_delete_post,
		test_save_then_load,
	);

	async fn create_ann(store: &Store) {
		store
			.create_user("a@x.com".into(), "pw".into(), "Ann".into(), 20)
			.await
			.unwrap();
	}

	fn ann() -> User {
		User {
			created_at: Utc::now(),
			email: "a@x.com".into(),
			password: "pw".into(),
			name: "Ann".into(),
			age: 20,
		}
	}

	async fn test_create_then_get_user(store: Store) {
		let created = store
			.create_user("a@x.com".into(), "pw".into(), "Ann".into(), 20)
			.await
			.unwrap();
		let fetched = store.get_user("a@x.com").await.unwrap();

		assert_eq!(created, fetched);
		assert_eq!(fetched.email, "a@x.com");
		assert_eq!(fetched.password, "pw");
		assert_eq!(fetched.name, "Ann");
		assert_eq!(fetched.age, 20);
	}

	async fn test_get_unknown_user(store: Store) {
		assert!(matches!(
			store.get_user("nobody@x.com").await,
			Err(Error::UnknownUser(email)) if email == "nobody@x.com"
		));
	}

	async fn test_create_existing_user_overwrites_by_default(store: Store) {
		create_ann(&store).await;

		store
			.create_user("a@x.com".into(), "pw2".into(), "Annie".into(), 30)
			.await
			.unwrap();

		let user = store.get_user("a@x.com").await.unwrap();
		assert_eq!(user.name, "Annie");
		assert_eq!(user.age, 30);
		assert_eq!(store.load().await.unwrap().users.len(), 1);
	}

	async fn test_create_existing_user_rejected(store: Store) {
		let store = store.with_conflict(UserConflict::Reject);
		create_ann(&store).await;

		let result = store
			.create_user("a@x.com".into(), "pw2".into(), "Annie".into(), 30)
			.await;

		assert!(matches!(result, Err(Error::UserExists(..))));
		assert_eq!(store.get_user("a@x.com").await.unwrap().name, "Ann");
	}

	async fn test_update_unknown_user(store: Store) {
		let result = store
			.update_user("a@x.com", "pw".into(), "Ann".into(), 20)
			.await;

		assert!(matches!(result, Err(Error::UnknownUser(..))));
		assert!(store.load().await.unwrap().users.is_empty());
	}

	async fn test_update_keeps_email_and_creation_time(store: Store) {
		create_ann(&store).await;
		let before = store.get_user("a@x.com").await.unwrap();

		let updated = store
			.update_user("a@x.com", "new".into(), "Anna".into(), 21)
			.await
			.unwrap();

		assert_eq!(updated.email, before.email);
		assert_eq!(updated.created_at, before.created_at);
		assert_eq!(updated.password, "new");
		assert_eq!(updated.name, "Anna");
		assert_eq!(updated.age, 21);
		assert_eq!(store.get_user("a@x.com").await.unwrap(), updated);
	}

	async fn test_delete_user_twice(store: Store) {
		create_ann(&store).await;

		store.delete_user("a@x.com").await.unwrap();

		assert!(matches!(
			store.delete_user("a@x.com").await,
			Err(Error::UnknownUser(..))
		));
	}

	async fn test_delete_user_keeps_posts(store: Store) {
		create_ann(&store).await;
		let post = store
			.create_post("a@x.com".into(), "hi".into())
			.await
			.unwrap();

		store.delete_user("a@x.com").await.unwrap();

		assert_eq!(store.get_posts("a@x.com").await.unwrap(), vec![post]);
	}

	async fn test_create_post_for_unknown_user(store: Store) {
		let result = store.create_post("a@x.com".into(), "hi".into()).await;

		assert!(matches!(result, Err(Error::UnknownUser(..))));
		assert!(store.load().await.unwrap().posts.is_empty());
	}

	async fn test_get_posts_only_returns_own_posts(store: Store) {
		create_ann(&store).await;
		store
			.create_user("b@x.com".into(), "pw".into(), "Bob".into(), 40)
			.await
			.unwrap();

		let mut own = HashSet::new();
		for text in ["one", "two", "three"] {
			let post = store
				.create_post("a@x.com".into(), text.into())
				.await
				.unwrap();
			own.insert(post.id);
		}
		store
			.create_post("b@x.com".into(), "other".into())
			.await
			.unwrap();

		let posts = store.get_posts("a@x.com").await.unwrap();

		assert_eq!(posts.len(), 3);
		assert!(posts.iter().all(|post| post.user_email == "a@x.com"));
		assert_eq!(
			posts.into_iter().map(|post| post.id).collect::<HashSet<_>>(),
			own
		);
		assert!(store.get_posts("nobody@x.com").await.unwrap().is_empty());
	}

	async fn test_get_posts_ordered_by_creation_time(store: Store) {
		let start = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
		let post = |id: u128, seconds: i64| Post {
			id: Uuid::from_u128(id),
			created_at: start + Duration::seconds(seconds),
			user_email: "a@x.com".into(),
			text: format!("post {id}"),
		};

		let mut document = Document::default();
		document.users.insert("a@x.com".into(), ann());
		// ids are chosen so that map order differs from creation order
		for post in [post(1, 20), post(2, 0), post(4, 10), post(3, 10)] {
			document.posts.insert(post.id, post);
		}
		store.save(&document).await.unwrap();

		let ids = store
			.get_posts("a@x.com")
			.await
			.unwrap()
			.into_iter()
			.map(|post| post.id.as_u128())
			.collect::<Vec<_>>();

		assert_eq!(ids, vec![2, 3, 4, 1]);
	}

	async fn test_delete_post(store: Store) {
		create_ann(&store).await;
		let post = store
			.create_post("a@x.com".into(), "hi".into())
			.await
			.unwrap();

		store.delete_post(post.id).await.unwrap();

		assert!(store.get_posts("a@x.com").await.unwrap().is_empty());
		assert!(matches!(
			store.delete_post(post.id).await,
			Err(Error::UnknownPost(id)) if id == post.id
		));
	}

	async fn test_save_then_load(store: Store) {
		let mut document = Document::default();
		document.users.insert("a@x.com".into(), ann());

		store.save(&document).await.unwrap();

		assert_eq!(store.load().await.unwrap(), document);
	}

	#[tokio::test]
	async fn test_spans_only_record_keys() {
		use std::sync::Mutex;

		use tracing::{span, Subscriber};
		use tracing_subscriber::{layer::Context, prelude::*, Layer};

		#[derive(Clone, Default)]
		struct SpanFields(Arc<Mutex<Vec<String>>>);

		impl<S: Subscriber> Layer<S> for SpanFields {
			fn on_new_span(&self, attrs: &span::Attributes<'_>, _id: &span::Id, _ctx: Context<'_, S>) {
				let mut names = self.0.lock().unwrap();
				for field in attrs.fields() {
					names.push(format!("{}.{}", attrs.metadata().name(), field.name()));
				}
			}
		}

		let fields = SpanFields::default();
		let _guard = tracing_subscriber::registry()
			.with(fields.clone())
			.set_default();

		let store = memory_store().await;
		create_ann(&store).await;
		let post = store
			.create_post("a@x.com".into(), "secret text".into())
			.await
			.unwrap();
		store.delete_post(post.id).await.unwrap();

		let mut names = fields.0.lock().unwrap().clone();
		names.sort();

		assert_eq!(
			names,
			[
				"create_post.user_email",
				"create_user.email",
				"delete_post.id",
			]
		);
	}

	#[tokio::test]
	async fn test_file_round_trip() {
		let dir = tempfile::tempdir().unwrap();

		let store = file_store(&dir).await;
		create_ann(&store).await;
		store
			.create_post("a@x.com".into(), "hi".into())
			.await
			.unwrap();
		let saved = store.load().await.unwrap();

		let reopened = file_store(&dir).await;
		let loaded = reopened.load().await.unwrap();

		assert_eq!(loaded, saved);
		assert_eq!(loaded.users.len(), 1);
		assert_eq!(loaded.posts.len(), 1);
	}

	#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
	async fn test_concurrent_writes_are_not_lost() {
		let dir = tempfile::tempdir().unwrap();
		let store = file_store(&dir).await;
		create_ann(&store).await;

		let tasks = (0..32)
			.map(|i| {
				let store = store.clone();
				tokio::spawn(async move {
					store
						.create_post("a@x.com".into(), format!("post {i}"))
						.await
						.unwrap()
						.id
				})
			})
			.collect::<Vec<_>>();

		let mut ids = HashSet::new();
		for task in tasks {
			ids.insert(task.await.unwrap());
		}

		let stored = store
			.get_posts("a@x.com")
			.await
			.unwrap()
			.into_iter()
			.map(|post| post.id)
			.collect::<HashSet<_>>();

		assert_eq!(stored.len(), 32);
		assert_eq!(stored, ids);
	}
}
