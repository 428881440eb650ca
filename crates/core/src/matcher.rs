//! Mapping live windows to persisted sessions.

use std::cmp::Ordering;

use spaces_protocol::{Session, SessionId, Space, Tab, Window, WindowId};
use tracing::info;

use crate::engine::Engine;
use crate::error::{OptionalExt, Result};

/// Whether a stored tab list and a live one hold the same URLs in the same order.
pub fn tabs_match(stored: &[Tab], live: &[Tab]) -> bool {
	stored.len() == live.len() && stored.iter().zip(live).all(|(a, b)| a.url == b.url)
}

/// Orders spaces for display: those bound to a window first, then by
/// descending last access. Spaces never accessed sort last within their group.
pub fn sort_spaces(spaces: &mut [Space]) {
	spaces.sort_by(|a, b| {
		match (a.window_id.is_some(), b.window_id.is_some()) {
			(true, false) => return Ordering::Less,
			(false, true) => return Ordering::Greater,
			_ => {}
		}
		b.last_access.unwrap_or(i64::MIN).cmp(&a.last_access.unwrap_or(i64::MIN))
	});
}

impl Engine {
	/// Finds the space for a live window.
	///
	/// A bound session wins. Otherwise, with `match_by_tabs`, the first
	/// persisted session whose tabs equal the window's is rebound to it.
	/// Failing both, a transient space is built from the window. `None` when
	/// the window does not exist.
	pub async fn resolve_space(&self, window_id: WindowId, match_by_tabs: bool) -> Result<Option<Space>> {
		if let Some(session) = self.store.session_by_window(window_id).await? {
			return Ok(Some(Space::from(&session)));
		}
		let Some(window) = self.browser.window(window_id, true).await.optional()? else {
			return Ok(None);
		};
		if match_by_tabs {
			if let Some(space) = self.match_by_tabs(&window).await? {
				return Ok(Some(space));
			}
		}
		Ok(Some(Space::from_window(&window)))
	}

	pub async fn space_for_session(&self, session_id: SessionId) -> Result<Option<Space>> {
		Ok(self.store.session(session_id).await?.as_ref().map(Space::from))
	}

	/// Rebinds the first persisted session whose tab URLs equal the window's.
	async fn match_by_tabs(&self, window: &Window) -> Result<Option<Space>> {
		let candidates: Vec<SessionId> = self
			.store
			.sessions()
			.await?
			.iter()
			.filter(|session| tabs_match(&session.tabs, &window.tabs))
			.filter_map(|session| session.id)
			.collect();

		for candidate in candidates {
			// Another handler may have bound the window while this one was suspended.
			if let Some(bound) = self.store.session_by_window(window.id).await? {
				return Ok(Some(Space::from(&bound)));
			}
			let Some(fresh) = self.store.session(candidate).await? else {
				continue;
			};
			if !tabs_match(&fresh.tabs, &window.tabs) {
				continue;
			}
			let session = self.bind_session(fresh, window.id).await?;
			info!(target = "spaces.matcher", session = %candidate, window = %window.id, "rebound session by tab content");
			return Ok(Some(Space::from(&session)));
		}
		Ok(None)
	}

	/// Points `session` at `window_id`. A no-op write is skipped.
	pub(crate) async fn bind_session(&self, mut session: Session, window_id: WindowId) -> Result<Session> {
		if session.window_id == Some(window_id) {
			return Ok(session);
		}
		session.window_id = Some(window_id);
		self.store.update(session).await
	}

	/// Persisted sessions plus transient spaces for unbound live windows,
	/// without empty spaces, in display order.
	pub async fn all_spaces(&self) -> Result<Vec<Space>> {
		let sessions = self.store.sessions().await?;
		let windows = self.browser.windows(true).await?;

		let mut spaces: Vec<Space> = sessions.iter().map(Space::from).collect();
		for window in &windows {
			if !window.is_normal() || self.is_utility_window(window) {
				continue;
			}
			if sessions.iter().any(|session| session.window_id == Some(window.id)) {
				continue;
			}
			spaces.push(Space::from_window(window));
		}
		spaces.retain(|space| !space.tabs.is_empty());
		sort_spaces(&mut spaces);
		Ok(spaces)
	}
}
