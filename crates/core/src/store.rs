//! Persistence collaborators: the session store, the scratch store, and the
//! push notifier.

use async_trait::async_trait;
use serde_json::Value;
use spaces_protocol::{PushMessage, Session, SessionId, WindowId};

use crate::error::Result;

/// Durable session records.
///
/// Every call commits before it returns. Records handed out are copies;
/// callers re-read after suspending if they need a fresh view.
#[async_trait(?Send)]
pub trait SessionStore {
	/// All persisted sessions in natural (creation) order.
	async fn sessions(&self) -> Result<Vec<Session>>;

	async fn session(&self, id: SessionId) -> Result<Option<Session>>;

	/// Case-insensitive name lookup.
	async fn session_by_name(&self, name: &str) -> Result<Option<Session>> {
		Ok(self.sessions().await?.into_iter().find(|session| session.has_name(name)))
	}

	async fn session_by_window(&self, window_id: WindowId) -> Result<Option<Session>> {
		Ok(self
			.sessions()
			.await?
			.into_iter()
			.find(|session| session.window_id == Some(window_id)))
	}

	/// Persists a new session and returns it with its assigned id.
	async fn create(&self, session: Session) -> Result<Session>;

	/// Replaces the stored record with the same id.
	async fn update(&self, session: Session) -> Result<Session>;

	/// Returns whether a record was removed.
	async fn delete(&self, id: SessionId) -> Result<bool>;
}

/// Small persisted scalars, keyed by string.
#[async_trait(?Send)]
pub trait ScratchStore {
	async fn get(&self, key: &str) -> Result<Option<Value>>;

	async fn set(&self, key: &str, value: Value) -> Result<()>;

	async fn remove(&self, key: &str) -> Result<()>;
}

/// Fan-out to every listening UI surface.
pub trait Notifier {
	fn broadcast(&self, message: &PushMessage) -> Result<()>;
}
