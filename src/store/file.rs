use std::path::{Path, PathBuf};

use super::{Document, Error, Result, Storage};

/// Stores the document as a JSON file.
///
/// Saves write to a sibling `.tmp` file and rename it over the target, so a
/// crash mid-write leaves the previous document in place. The rename is atomic
/// on POSIX filesystems; network shares and FAT make no such promise.
#[derive(Debug, Clone)]
pub struct FileStorage {
	path: PathBuf,
	pretty: bool,
}

impl FileStorage {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			pretty: false,
		}
	}

	/// Indent the written JSON so the file is easier to read by hand.
	#[must_use]
	pub fn pretty(mut self, pretty: bool) -> Self {
		self.pretty = pretty;
		self
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	fn temp_path(&self) -> PathBuf {
		let ext = self
			.path
			.extension()
			.and_then(|ext| ext.to_str())
			.unwrap_or("json");

		self.path.with_extension(format!("{ext}.tmp"))
	}

	fn unavailable(&self, source: std::io::Error) -> Error {
		Error::Unavailable {
			path: self.path().to_path_buf(),
			source,
		}
	}
}

#[axum::async_trait]
impl Storage for FileStorage {
	async fn ensure(&self) -> Result<()> {
		if tokio::fs::try_exists(&self.path)
			.await
			.map_err(|e| self.unavailable(e))?
		{
			return Ok(());
		}

		if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
			tokio::fs::create_dir_all(parent)
				.await
				.map_err(|e| self.unavailable(e))?;
		}

		tracing::info!(path = %self.path.display(), "creating empty store");

		self.save(&Document::default()).await
	}

	async fn load(&self) -> Result<Document> {
		let bytes = tokio::fs::read(&self.path)
			.await
			.map_err(|e| self.unavailable(e))?;

		serde_json::from_slice(&bytes).map_err(Error::Corrupt)
	}

	async fn save(&self, document: &Document) -> Result<()> {
		let bytes = if self.pretty {
			serde_json::to_vec_pretty(document)
		} else {
			serde_json::to_vec(document)
		}
		.map_err(Error::Encode)?;

		let temp = self.temp_path();

		tokio::fs::write(&temp, &bytes)
			.await
			.map_err(|e| self.unavailable(e))?;
		tokio::fs::rename(&temp, &self.path)
			.await
			.map_err(|e| self.unavailable(e))?;

		Ok(())
	}
}
