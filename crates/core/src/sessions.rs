//! Session lifecycle: saving, renaming, deleting, importing, and loading
//! sessions into windows.

use spaces_protocol::{Session, SessionId, SessionPresence, Space, Tab, TabId, Window, WindowId};
use tracing::{debug, info};

use crate::bounds::compute_bounds_with_inset;
use crate::browser::{CreateTab, CreateWindow, TabUpdate, WindowUpdate};
use crate::engine::Engine;
use crate::error::{OptionalExt, Result, SpacesError};
use crate::import;
use crate::naming::claim_name;

impl Engine {
	pub async fn session_presence(&self, name: &str) -> Result<SessionPresence> {
		let session = self.store.session_by_name(name).await?;
		Ok(SessionPresence::of(session.as_ref()))
	}

	pub async fn current_space(&self) -> Result<Option<Space>> {
		match self.browser.current_window().await? {
			Some(window) => self.resolve_space(window.id, false).await,
			None => Ok(None),
		}
	}

	/// Detail view of a window's space. Utility windows have none.
	pub async fn window_detail(&self, window_id: WindowId) -> Result<Option<Space>> {
		if self.is_internal_window(window_id) {
			return Ok(None);
		}
		let mut space = self.resolve_space(window_id, false).await?;
		if let Some(space) = space.as_mut() {
			space.mark_duplicates();
		}
		Ok(space)
	}

	pub async fn session_detail(&self, session_id: SessionId) -> Result<Option<Space>> {
		let mut space = self.space_for_session(session_id).await?;
		if let Some(space) = space.as_mut() {
			space.mark_duplicates();
		}
		Ok(space)
	}

	pub async fn tab_detail(&self, tab_id: TabId) -> Result<Option<Tab>> {
		self.browser.tab(tab_id).await.optional()
	}

	/// Saves a live window as a new named session bound to it.
	pub async fn save_new_session(&self, window_id: WindowId, name: &str, delete_old: bool) -> Result<Session> {
		let window = self.browser.window(window_id, true).await?;
		claim_name(self.store.as_ref(), name, None, delete_old).await?;

		// A window binds at most one session.
		if let Some(mut previous) = self.store.session_by_window(window_id).await? {
			previous.window_id = None;
			self.store.update(previous).await?;
		}

		let session = Session {
			id: None,
			name: Some(name.to_string()),
			window_id: Some(window_id),
			tabs: window.tabs.iter().map(Tab::to_stored).collect(),
			history: Vec::new(),
			window_bounds: Some(window.bounds()),
			last_access: Some(self.now()),
		};
		let created = self.store.create(session).await?;
		info!(target = "spaces.sessions", name, window = %window_id, "session saved");
		Ok(created)
	}

	/// Stores a backed-up space as a new, unbound session.
	pub async fn restore_from_backup(&self, space: Space, delete_old: bool) -> Result<Session> {
		import::restore_space(self.store.as_ref(), space, delete_old, self.now()).await
	}

	pub async fn import_new_session(&self, urls: &[String]) -> Result<Session> {
		import::import_urls(self.store.as_ref(), urls, self.now()).await
	}

	pub async fn update_session_name(&self, session_id: SessionId, name: &str, delete_old: bool) -> Result<Session> {
		claim_name(self.store.as_ref(), name, Some(session_id), delete_old).await?;
		let mut session = self
			.store
			.session(session_id)
			.await?
			.ok_or_else(|| SpacesError::session_not_found(session_id))?;
		session.name = Some(name.to_string());
		self.store.update(session).await
	}

	pub async fn delete_session(&self, session_id: SessionId) -> Result<bool> {
		if self.store.session(session_id).await?.is_none() {
			debug!(target = "spaces.sessions", session = %session_id, "no session to delete");
			return Ok(false);
		}
		self.store.delete(session_id).await
	}

	/// Captures a window's bounds, then closes it.
	pub async fn close_window(&self, window_id: WindowId) -> Result<()> {
		let window = self.browser.window(window_id, false).await?;
		self.capture_bounds(window_id, window.bounds()).await?;
		self.browser.remove_window(window_id).await
	}

	/// Opens a session: focuses its window when open, otherwise restores it
	/// into a new window bound to it. `tab_url` is then focused or loaded.
	pub async fn load_session(&self, session_id: SessionId, tab_url: Option<&str>) -> Result<()> {
		let session = self
			.store
			.session(session_id)
			.await?
			.ok_or_else(|| SpacesError::session_not_found(session_id))?;

		if let Some(window_id) = session.window_id {
			if self.browser.window(window_id, false).await.optional()?.is_some() {
				return self.load_window(window_id, tab_url).await;
			}
			debug!(target = "spaces.sessions", session = %session_id, window = %window_id, "bound window is gone, restoring");
		}

		let work_area = self.target_work_area().await?;
		let bounds = compute_bounds_with_inset(&work_area, session.window_bounds.as_ref(), self.config.restore_inset);
		let window = self
			.browser
			.create_window(CreateWindow {
				urls: session.tabs.iter().map(|tab| tab.url.clone()).collect(),
				kind: None,
				bounds: Some(bounds),
				focused: None,
			})
			.await?;

		let fresh = self.store.session(session_id).await?.unwrap_or(session);
		let session = self.bind_session(fresh, window.id).await?;
		info!(target = "spaces.sessions", session = %session_id, window = %window.id, "session restored");

		for pinned in session.tabs.iter().filter(|tab| tab.pinned) {
			let target = window.tabs.iter().find(|tab| tab.effective_url() == pinned.url).and_then(|tab| tab.id);
			if let Some(tab_id) = target {
				self.browser
					.update_tab(
						tab_id,
						TabUpdate {
							pinned: Some(true),
							..Default::default()
						},
					)
					.await?;
			}
		}

		if let Some(url) = tab_url {
			self.focus_or_load(&window, url).await?;
		}
		Ok(())
	}

	/// Focuses an open window, then focuses or loads `tab_url` in it.
	pub async fn load_window(&self, window_id: WindowId, tab_url: Option<&str>) -> Result<()> {
		self.browser.update_window(window_id, WindowUpdate::focus()).await?;
		if let Some(url) = tab_url {
			let window = self.browser.window(window_id, true).await?;
			self.focus_or_load(&window, url).await?;
		}
		Ok(())
	}

	/// Activates the tab heading to `url`, or opens one.
	async fn focus_or_load(&self, window: &Window, url: &str) -> Result<()> {
		let existing = window.tabs.iter().find(|tab| tab.effective_url() == url).and_then(|tab| tab.id);
		match existing {
			Some(tab_id) => {
				self.browser
					.update_tab(
						tab_id,
						TabUpdate {
							active: Some(true),
							..Default::default()
						},
					)
					.await?;
			}
			None => {
				self.browser
					.create_tab(CreateTab {
						window_id: Some(window.id),
						url: url.to_string(),
						active: true,
					})
					.await?;
			}
		}
		Ok(())
	}

	/// Switches to a window or a session. Failures are logged only.
	pub async fn switch_to_space(&self, window_id: Option<WindowId>, session_id: Option<SessionId>) {
		let result = match (window_id, session_id) {
			(Some(window_id), _) => self.load_window(window_id, None).await,
			(None, Some(session_id)) => self.load_session(session_id, None).await,
			(None, None) => Ok(()),
		};
		if let Err(err) = result {
			debug!(target = "spaces.sessions", error = %err, "switch failed");
		}
	}
}

/// A tab as an unbound session stores it: no runtime ids.
pub(crate) fn detached_tab(tab: &Tab) -> Tab {
	Tab {
		id: None,
		..tab.to_stored()
	}
}
