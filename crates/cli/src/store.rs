//! JSON file storage for saved sessions.
//!
//! The whole store is one pretty-printed JSON document, rewritten after every
//! mutation. The default location follows XDG (`$XDG_DATA_HOME/spaces/sessions.json`).

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use spaces::{MemorySessionStore, SessionStore, SpacesError};
use spaces_protocol::{Session, SessionId};
use tracing::debug;

use crate::error::{CliError, Result};

pub const SCHEMA_VERSION: u32 = 1;

/// On-disk shape of the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreFile {
	pub schema: u32,
	pub next_id: i64,
	#[serde(default)]
	pub sessions: Vec<Session>,
}

impl Default for StoreFile {
	fn default() -> Self {
		Self {
			schema: SCHEMA_VERSION,
			next_id: 1,
			sessions: Vec::new(),
		}
	}
}

/// Default store path under the user's data directory.
pub fn default_store_path() -> Result<PathBuf> {
	dirs::data_dir()
		.map(|dir| dir.join("spaces").join("sessions.json"))
		.ok_or(CliError::NoDataDir)
}

/// Session store persisted to a JSON file.
///
/// Reads are served from memory; each create, update, or delete commits the
/// file before returning.
#[derive(Debug)]
pub struct FileSessionStore {
	path: PathBuf,
	inner: MemorySessionStore,
}

impl FileSessionStore {
	/// Opens the store at `path`. A missing file is an empty store.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
		let path = path.into();
		let file = match fs::read_to_string(&path) {
			Ok(content) => {
				let file: StoreFile = serde_json::from_str(&content).map_err(|source| CliError::CorruptStore {
					path: path.clone(),
					source,
				})?;
				if file.schema > SCHEMA_VERSION {
					return Err(CliError::UnsupportedSchema {
						path,
						found: file.schema,
						supported: SCHEMA_VERSION,
					});
				}
				file
			}
			Err(err) if err.kind() == std::io::ErrorKind::NotFound => StoreFile::default(),
			Err(err) => return Err(err.into()),
		};
		debug!(path = %path.display(), sessions = file.sessions.len(), "session store opened");
		Ok(Self {
			inner: MemorySessionStore::restore(file.sessions, file.next_id),
			path,
		})
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	pub fn snapshot(&self) -> StoreFile {
		StoreFile {
			schema: SCHEMA_VERSION,
			next_id: self.inner.next_id(),
			sessions: self.inner.snapshot(),
		}
	}

	fn persist(&self) -> spaces::Result<()> {
		save_json(&self.path, &self.snapshot()).map_err(|err| SpacesError::Store(err.to_string()))
	}
}

#[async_trait(?Send)]
impl SessionStore for FileSessionStore {
	async fn sessions(&self) -> spaces::Result<Vec<Session>> {
		self.inner.sessions().await
	}

	async fn session(&self, id: SessionId) -> spaces::Result<Option<Session>> {
		self.inner.session(id).await
	}

	async fn create(&self, session: Session) -> spaces::Result<Session> {
		let created = self.inner.create(session).await?;
		self.persist()?;
		Ok(created)
	}

	async fn update(&self, session: Session) -> spaces::Result<Session> {
		let updated = self.inner.update(session).await?;
		self.persist()?;
		Ok(updated)
	}

	async fn delete(&self, id: SessionId) -> spaces::Result<bool> {
		let removed = self.inner.delete(id).await?;
		if removed {
			self.persist()?;
		}
		Ok(removed)
	}
}

pub(crate) fn save_json<T: Serialize>(path: &Path, data: &T) -> Result<()> {
	if let Some(parent) = path.parent() {
		fs::create_dir_all(parent)?;
	}
	fs::write(path, serde_json::to_string_pretty(data)?)?;
	Ok(())
}
