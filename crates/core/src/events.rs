//! Browser lifecycle events: filtering, session synchronisation, and the
//! ordered queue they are consumed from.

use spaces_protocol::{StoredBounds, Tab, TabId, Window, WindowId};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::engine::Engine;
use crate::error::{OptionalExt, Result};
use crate::utility::UtilityKind;

#[derive(Debug, Clone, PartialEq)]
pub enum BrowserEvent {
	/// The browser itself started; every runtime id was reassigned.
	Startup,
	TabCreated {
		tab: Tab,
	},
	TabRemoved {
		tab_id: TabId,
		window_id: WindowId,
		window_closing: bool,
	},
	TabMoved {
		tab_id: TabId,
		window_id: WindowId,
	},
	TabUpdated {
		tab: Tab,
	},
	WindowCreated {
		window: Window,
	},
	WindowRemoved {
		window_id: WindowId,
	},
	WindowFocusChanged {
		window_id: WindowId,
	},
	/// Carries the window with its new geometry.
	WindowBoundsChanged {
		window: Window,
	},
}

impl BrowserEvent {
	pub fn name(&self) -> &'static str {
		match self {
			BrowserEvent::Startup => "startup",
			BrowserEvent::TabCreated { .. } => "tab_created",
			BrowserEvent::TabRemoved { .. } => "tab_removed",
			BrowserEvent::TabMoved { .. } => "tab_moved",
			BrowserEvent::TabUpdated { .. } => "tab_updated",
			BrowserEvent::WindowCreated { .. } => "window_created",
			BrowserEvent::WindowRemoved { .. } => "window_removed",
			BrowserEvent::WindowFocusChanged { .. } => "window_focus_changed",
			BrowserEvent::WindowBoundsChanged { .. } => "window_bounds_changed",
		}
	}
}

pub type EventSender = mpsc::UnboundedSender<BrowserEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<BrowserEvent>;

/// Ordered queue feeding [`Engine::run_events`].
pub fn event_queue() -> (EventSender, EventReceiver) {
	mpsc::unbounded_channel()
}

impl Engine {
	/// Consumes events one at a time until every sender is dropped.
	pub async fn run_events(&self, mut events: EventReceiver) {
		while let Some(event) = events.recv().await {
			self.handle_event(event).await;
		}
		debug!(target = "spaces.events", "event queue closed");
	}

	/// Handles one event. Failures are logged, never propagated.
	pub async fn handle_event(&self, event: BrowserEvent) {
		let name = event.name();
		if let Err(err) = self.route_event(event).await {
			if err.is_not_found() {
				debug!(target = "spaces.events", event = name, error = %err, "event target vanished");
			} else {
				warn!(target = "spaces.events", event = name, error = %err, "event handling failed");
			}
		}
	}

	async fn route_event(&self, event: BrowserEvent) -> Result<()> {
		match event {
			BrowserEvent::Startup => self.on_browser_startup().await,
			BrowserEvent::TabCreated { tab } | BrowserEvent::TabUpdated { tab } => {
				// A utility page can report its first tab before its slot is assigned.
				if self.is_utility_tab(&tab) {
					return Ok(());
				}
				let Some(window_id) = tab.window_id else {
					return Ok(());
				};
				self.churn(window_id, None).await
			}
			BrowserEvent::TabRemoved {
				tab_id,
				window_id,
				window_closing,
			} => {
				// The session keeps its tabs when its whole window goes away.
				if window_closing {
					return Ok(());
				}
				self.churn(window_id, Some(tab_id)).await
			}
			BrowserEvent::TabMoved { window_id, .. } => self.churn(window_id, None).await,
			BrowserEvent::WindowCreated { window } => {
				if self.is_utility_window(&window) {
					return Ok(());
				}
				self.refresh_dashboard().await;
				Ok(())
			}
			BrowserEvent::WindowRemoved { window_id } => self.on_window_removed(window_id).await,
			BrowserEvent::WindowFocusChanged { window_id } => self.on_window_focused(window_id).await,
			BrowserEvent::WindowBoundsChanged { window } => {
				if self.is_internal_window(window.id) {
					return Ok(());
				}
				self.capture_bounds(window.id, window.bounds()).await
			}
		}
	}

	async fn churn(&self, window_id: WindowId, removed_tab: Option<TabId>) -> Result<()> {
		if self.is_internal_window(window_id) {
			return Ok(());
		}
		self.sync_window(window_id, removed_tab).await?;
		self.refresh_dashboard().await;
		Ok(())
	}

	/// Rewrites the bound session's tabs from the live window.
	///
	/// `removed_tab` is pushed to the front of the session's history. Returns
	/// whether a session was updated.
	pub async fn sync_window(&self, window_id: WindowId, removed_tab: Option<TabId>) -> Result<bool> {
		let Some(window) = self.browser.window(window_id, true).await.optional()? else {
			return Ok(false);
		};
		let Some(mut session) = self.store.session_by_window(window_id).await? else {
			return Ok(false);
		};

		if let Some(closed) = removed_tab.and_then(|id| session.tabs.iter().find(|tab| tab.id == Some(id)).cloned()) {
			let mut closed = closed.to_stored();
			closed.id = None;
			session.history.retain(|tab| tab.url != closed.url);
			session.history.insert(0, closed);
			session.history.truncate(self.config.history_limit);
		}
		session.tabs = window.tabs.iter().map(Tab::to_stored).collect();
		self.store.update(session).await?;
		Ok(true)
	}

	async fn on_window_removed(&self, window_id: WindowId) -> Result<()> {
		if self.state.slots.take_retired(window_id) {
			return Ok(());
		}
		if let Some(kind) = self.state.slots.kind_of(window_id) {
			debug!(target = "spaces.events", kind = kind.label(), window = %window_id, "utility window closed");
			self.clear_slot(kind).await;
			return Ok(());
		}

		if let Some(mut session) = self.store.session_by_window(window_id).await? {
			session.window_id = None;
			self.store.update(session).await?;
			self.refresh_dashboard().await;
		}
		self.close_dashboard_if_alone().await
	}

	/// Closes the dashboard when it is the last open window, so the browser can exit.
	async fn close_dashboard_if_alone(&self) -> Result<()> {
		let Some(dashboard) = self.state.slots.get(UtilityKind::Dashboard) else {
			return Ok(());
		};
		let windows = self.browser.windows(false).await?;
		if let [only] = windows.as_slice() {
			if only.id == dashboard {
				info!(target = "spaces.events", window = %dashboard, "closing dashboard left alone");
				self.close_utility(UtilityKind::Dashboard, dashboard, false).await?;
			}
		}
		Ok(())
	}

	async fn on_window_focused(&self, window_id: WindowId) -> Result<()> {
		let popup = self.state.slots.get(UtilityKind::Popup);
		if window_id == WindowId::NONE || popup == Some(window_id) {
			return Ok(());
		}
		if popup.is_some() {
			self.close_popup().await;
		}
		if let Some(mut session) = self.store.session_by_window(window_id).await? {
			session.last_access = Some(self.now());
			self.store.update(session).await?;
		}
		Ok(())
	}

	/// Persists a window's geometry on its bound session.
	pub async fn capture_bounds(&self, window_id: WindowId, bounds: StoredBounds) -> Result<()> {
		let Some(mut session) = self.store.session_by_window(window_id).await? else {
			return Ok(());
		};
		session.window_bounds = Some(bounds);
		self.store.update(session).await?;
		Ok(())
	}
}
