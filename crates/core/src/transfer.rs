//! Moving links and tabs between windows and sessions.
//!
//! Moves that bypass the browser's tab events resynchronise the affected
//! windows directly.

use spaces_protocol::{Session, SessionId, Tab, TabId, WindowId};
use tracing::debug;

use crate::browser::CreateTab;
use crate::engine::Engine;
use crate::error::{Result, SpacesError};
use crate::sessions::detached_tab;

impl Engine {
	async fn ensure_name_free(&self, name: &str) -> Result<()> {
		if self.store.session_by_name(name).await?.is_some() {
			return Err(SpacesError::Conflict { name: name.to_string() });
		}
		Ok(())
	}

	pub async fn add_link_to_new_session(&self, url: &str, name: &str) -> Result<Session> {
		self.ensure_name_free(name).await?;
		let session = Session {
			last_access: Some(self.now()),
			..Session::named(name, vec![Tab::new(url)])
		};
		self.store.create(session).await
	}

	pub async fn move_tab_to_new_session(&self, tab_id: TabId, name: &str) -> Result<Option<Session>> {
		let Some(tab) = self.tab_detail(tab_id).await? else {
			return Ok(None);
		};
		self.ensure_name_free(name).await?;
		self.browser.remove_tab(tab_id).await?;
		let session = Session {
			last_access: Some(self.now()),
			..Session::named(name, vec![detached_tab(&tab)])
		};
		Ok(Some(self.store.create(session).await?))
	}

	/// Returns false when the session does not exist.
	pub async fn add_link_to_session(&self, url: &str, session_id: SessionId) -> Result<bool> {
		let Some(mut session) = self.store.session(session_id).await? else {
			return Ok(false);
		};
		if let Some(window_id) = session.window_id {
			self.add_link_to_window(url, window_id).await?;
			return Ok(true);
		}
		session.tabs.push(Tab::new(url));
		self.store.update(session).await?;
		Ok(true)
	}

	/// Returns false when the tab or the session does not exist.
	pub async fn move_tab_to_session(&self, tab_id: TabId, session_id: SessionId) -> Result<bool> {
		let Some(tab) = self.tab_detail(tab_id).await? else {
			return Ok(false);
		};
		let Some(mut session) = self.store.session(session_id).await? else {
			return Ok(false);
		};
		if let Some(window_id) = session.window_id {
			self.relocate_tab(&tab, window_id).await?;
			return Ok(true);
		}
		self.browser.remove_tab(tab_id).await?;
		session.tabs.push(detached_tab(&tab));
		self.store.update(session).await?;
		Ok(true)
	}

	/// Opens `url` in a background tab of `window_id`.
	pub async fn add_link_to_window(&self, url: &str, window_id: WindowId) -> Result<()> {
		self.browser
			.create_tab(CreateTab {
				window_id: Some(window_id),
				url: url.to_string(),
				active: false,
			})
			.await?;
		self.sync_window(window_id, None).await?;
		Ok(())
	}

	/// Returns false when the tab does not exist.
	pub async fn move_tab_to_window(&self, tab_id: TabId, window_id: WindowId) -> Result<bool> {
		let Some(tab) = self.tab_detail(tab_id).await? else {
			return Ok(false);
		};
		self.relocate_tab(&tab, window_id).await?;
		Ok(true)
	}

	async fn relocate_tab(&self, tab: &Tab, window_id: WindowId) -> Result<()> {
		let tab_id = tab.id.ok_or_else(|| SpacesError::InvalidInput("tab has no id".into()))?;
		self.browser.move_tab(tab_id, window_id).await?;
		if let Some(source) = tab.window_id {
			self.sync_window(source, None).await?;
		}
		self.sync_window(window_id, None).await?;
		debug!(target = "spaces.transfer", tab = %tab_id, window = %window_id, "tab moved");
		Ok(())
	}
}
