use std::io;

use tokio::sync::Mutex;

use super::{Document, Error, Result, Storage};

/// Keeps the document in memory. Nothing survives the process.
///
/// Behaves like [`FileStorage`](super::FileStorage): loading before
/// [`Storage::ensure`] fails with [`Error::Unavailable`].
#[derive(Debug, Default)]
pub struct MemoryStorage {
	document: Mutex<Option<Document>>,
}

impl MemoryStorage {
	pub fn new() -> Self {
		Self::default()
	}
}

#[axum::async_trait]
impl Storage for MemoryStorage {
	async fn ensure(&self) -> Result<()> {
		self.document.lock().await.get_or_insert_with(Document::default);
		Ok(())
	}

	async fn load(&self) -> Result<Document> {
		self.document
			.lock()
			.await
			.clone()
			.ok_or_else(|| Error::Unavailable {
				path: ":memory:".into(),
				source: io::Error::new(io::ErrorKind::NotFound, "store was never initialized"),
			})
	}

	async fn save(&self, document: &Document) -> Result<()> {
		*self.document.lock().await = Some(document.clone());
		Ok(())
	}
}
