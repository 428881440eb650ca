//! In-memory stores.
//!
//! Used by tests and as the working set behind file-backed stores.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use spaces_protocol::{Session, SessionId};

use crate::error::{Result, SpacesError};
use crate::store::{ScratchStore, SessionStore};

#[derive(Debug)]
pub struct MemorySessionStore {
	sessions: RefCell<Vec<Session>>,
	next_id: Cell<i64>,
}

impl Default for MemorySessionStore {
	fn default() -> Self {
		Self {
			sessions: RefCell::new(Vec::new()),
			next_id: Cell::new(1),
		}
	}
}

impl MemorySessionStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Seeds the store. Sessions without an id are assigned one.
	pub fn with_sessions(sessions: Vec<Session>) -> Self {
		let store = Self::default();
		let next = sessions.iter().filter_map(|s| s.id).map(SessionId::get).max().unwrap_or(0) + 1;
		store.next_id.set(next);
		let seeded = sessions
			.into_iter()
			.map(|mut session| {
				if session.id.is_none() {
					session.id = Some(store.allocate_id());
				}
				session
			})
			.collect();
		*store.sessions.borrow_mut() = seeded;
		store
	}

	/// Restores a store previously captured with [`snapshot`](Self::snapshot) and [`next_id`](Self::next_id).
	pub fn restore(sessions: Vec<Session>, next_id: i64) -> Self {
		let store = Self::with_sessions(sessions);
		if next_id > store.next_id.get() {
			store.next_id.set(next_id);
		}
		store
	}

	pub fn snapshot(&self) -> Vec<Session> {
		self.sessions.borrow().clone()
	}

	pub fn next_id(&self) -> i64 {
		self.next_id.get()
	}

	fn allocate_id(&self) -> SessionId {
		let id = self.next_id.get();
		self.next_id.set(id + 1);
		SessionId(id)
	}
}

#[async_trait(?Send)]
impl SessionStore for MemorySessionStore {
	async fn sessions(&self) -> Result<Vec<Session>> {
		Ok(self.snapshot())
	}

	async fn session(&self, id: SessionId) -> Result<Option<Session>> {
		Ok(self.sessions.borrow().iter().find(|s| s.id == Some(id)).cloned())
	}

	async fn create(&self, mut session: Session) -> Result<Session> {
		session.id = Some(self.allocate_id());
		self.sessions.borrow_mut().push(session.clone());
		Ok(session)
	}

	async fn update(&self, session: Session) -> Result<Session> {
		let id = session.id.ok_or_else(|| SpacesError::InvalidInput("cannot update a session without an id".into()))?;
		let mut sessions = self.sessions.borrow_mut();
		let slot = sessions
			.iter_mut()
			.find(|s| s.id == Some(id))
			.ok_or_else(|| SpacesError::session_not_found(id))?;
		*slot = session.clone();
		Ok(session)
	}

	async fn delete(&self, id: SessionId) -> Result<bool> {
		let mut sessions = self.sessions.borrow_mut();
		let before = sessions.len();
		sessions.retain(|s| s.id != Some(id));
		Ok(sessions.len() != before)
	}
}

#[derive(Debug, Default)]
pub struct MemoryScratchStore {
	values: RefCell<HashMap<String, Value>>,
}

impl MemoryScratchStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Reads a value without going through the async trait.
	pub fn peek(&self, key: &str) -> Option<Value> {
		self.values.borrow().get(key).cloned()
	}

	pub fn insert(&self, key: &str, value: Value) {
		self.values.borrow_mut().insert(key.to_string(), value);
	}
}

#[async_trait(?Send)]
impl ScratchStore for MemoryScratchStore {
	async fn get(&self, key: &str) -> Result<Option<Value>> {
		Ok(self.peek(key))
	}

	async fn set(&self, key: &str, value: Value) -> Result<()> {
		self.insert(key, value);
		Ok(())
	}

	async fn remove(&self, key: &str) -> Result<()> {
		self.values.borrow_mut().remove(key);
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use spaces_protocol::{Tab, WindowId};

	use super::*;

	#[tokio::test]
	async fn create_assigns_increasing_ids() {
		let store = MemorySessionStore::new();
		let a = store.create(Session::named("A", vec![])).await.unwrap();
		let b = store.create(Session::named("B", vec![])).await.unwrap();
		assert_eq!(a.id, Some(SessionId(1)));
		assert_eq!(b.id, Some(SessionId(2)));
	}

	#[tokio::test]
	async fn seeded_ids_do_not_collide() {
		let mut existing = Session::named("Old", vec![]);
		existing.id = Some(SessionId(7));
		let store = MemorySessionStore::with_sessions(vec![existing, Session::named("New", vec![])]);
		let ids: Vec<_> = store.snapshot().iter().filter_map(|s| s.id).collect();
		assert_eq!(ids, vec![SessionId(7), SessionId(8)]);
	}

	#[tokio::test]
	async fn lookups_by_name_and_window() {
		let mut work = Session::named("Work", vec![Tab::new("https://a.example")]);
		work.window_id = Some(WindowId(4));
		let store = MemorySessionStore::with_sessions(vec![work]);

		assert!(store.session_by_name("WORK").await.unwrap().is_some());
		assert!(store.session_by_name("Play").await.unwrap().is_none());
		assert_eq!(
			store.session_by_window(WindowId(4)).await.unwrap().and_then(|s| s.name),
			Some("Work".into())
		);
	}

	#[tokio::test]
	async fn update_of_missing_session_is_not_found() {
		let store = MemorySessionStore::new();
		let mut ghost = Session::named("Ghost", vec![]);
		ghost.id = Some(SessionId(99));
		assert!(store.update(ghost).await.unwrap_err().is_not_found());
		assert!(!store.delete(SessionId(99)).await.unwrap());
	}

	#[tokio::test]
	async fn scratch_round_trips_values() {
		let scratch = MemoryScratchStore::new();
		scratch.set("openWindowId", Value::from(12)).await.unwrap();
		assert_eq!(scratch.get("openWindowId").await.unwrap(), Some(Value::from(12)));
		scratch.remove("openWindowId").await.unwrap();
		assert_eq!(scratch.get("openWindowId").await.unwrap(), None);
	}
}
