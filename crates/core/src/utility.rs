//! Singleton utility windows: the dashboard and the quick-action popup.
//!
//! Each kind has one slot. A slot is unset at process start, set when the
//! engine creates or rediscovers the window, and cleared when the window is
//! closed or found missing. Slots are written through to the scratch store
//! so a restarted background context can find its windows again.

use std::cell::{Cell, RefCell};

use serde_json::Value;
use spaces_protocol::{WindowId, WindowType};
use tracing::{debug, info, warn};

use crate::bounds::{dashboard_bounds, popup_bounds};
use crate::browser::{CreateTab, CreateWindow, TabUpdate, WindowUpdate};
use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::error::{OptionalExt, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UtilityKind {
	Dashboard,
	Popup,
}

impl UtilityKind {
	pub const ALL: [UtilityKind; 2] = [UtilityKind::Dashboard, UtilityKind::Popup];

	pub fn path(self, config: &EngineConfig) -> &str {
		match self {
			UtilityKind::Dashboard => &config.dashboard_path,
			UtilityKind::Popup => &config.popup_path,
		}
	}

	pub fn scratch_key(self, config: &EngineConfig) -> &str {
		match self {
			UtilityKind::Dashboard => &config.dashboard_key,
			UtilityKind::Popup => &config.popup_key,
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			UtilityKind::Dashboard => "dashboard",
			UtilityKind::Popup => "popup",
		}
	}
}

#[derive(Debug, Default)]
pub struct UtilitySlots {
	dashboard: Cell<Option<WindowId>>,
	popup: Cell<Option<WindowId>>,
	/// Utility windows the engine closed itself; their removal events are dropped.
	retired: RefCell<Vec<WindowId>>,
}

impl UtilitySlots {
	fn cell(&self, kind: UtilityKind) -> &Cell<Option<WindowId>> {
		match kind {
			UtilityKind::Dashboard => &self.dashboard,
			UtilityKind::Popup => &self.popup,
		}
	}

	pub fn get(&self, kind: UtilityKind) -> Option<WindowId> {
		self.cell(kind).get()
	}

	pub fn set(&self, kind: UtilityKind, window_id: Option<WindowId>) {
		self.cell(kind).set(window_id);
	}

	pub fn kind_of(&self, window_id: WindowId) -> Option<UtilityKind> {
		UtilityKind::ALL.into_iter().find(|kind| self.get(*kind) == Some(window_id))
	}

	pub fn retire(&self, window_id: WindowId) {
		self.retired.borrow_mut().push(window_id);
	}

	/// Consumes the retirement mark for `window_id`, if any.
	pub fn take_retired(&self, window_id: WindowId) -> bool {
		let mut retired = self.retired.borrow_mut();
		match retired.iter().position(|id| *id == window_id) {
			Some(index) => {
				retired.swap_remove(index);
				true
			}
			None => false,
		}
	}
}

impl Engine {
	pub(crate) async fn assign_slot(&self, kind: UtilityKind, window_id: WindowId) {
		self.state.slots.set(kind, Some(window_id));
		let key = kind.scratch_key(&self.config);
		if let Err(err) = self.scratch.set(key, Value::from(window_id.get())).await {
			warn!(target = "spaces.utility", kind = kind.label(), error = %err, "failed to cache window id");
		}
	}

	pub(crate) async fn clear_slot(&self, kind: UtilityKind) {
		self.state.slots.set(kind, None);
		let key = kind.scratch_key(&self.config);
		if let Err(err) = self.scratch.remove(key).await {
			warn!(target = "spaces.utility", kind = kind.label(), error = %err, "failed to clear cached window id");
		}
	}

	/// Shows the dashboard, in edit mode for `window_id` when asked.
	pub async fn show_dashboard(&self, window_id: Option<WindowId>, edit_mode: bool) -> Result<()> {
		let path = &self.config.dashboard_path;
		let url = match window_id {
			Some(id) if edit_mode => self.browser.resource_url(&format!("{path}#windowId={id}&editMode=true")),
			_ => self.browser.resource_url(path),
		};
		self.show_or_focus(UtilityKind::Dashboard, url).await
	}

	/// Shows the quick-action popup for `action` (`"move"` or `"switch"`).
	pub async fn show_popup(&self, action: &str, tab_url: Option<&str>) -> Result<()> {
		let params = self.generate_popup_params(action, tab_url).await?;
		let url = format!("{}#opener=bg&{params}", self.browser.resource_url(&self.config.popup_path));
		self.show_or_focus(UtilityKind::Popup, url).await
	}

	pub async fn show_keyboard_shortcuts(&self) -> Result<()> {
		self.browser
			.create_tab(CreateTab {
				window_id: None,
				url: self.config.shortcuts_url.clone(),
				active: true,
			})
			.await?;
		Ok(())
	}

	async fn show_or_focus(&self, kind: UtilityKind, url: String) -> Result<()> {
		if let Some(window_id) = self.state.slots.get(kind) {
			match self.browser.window(window_id, true).await.optional()? {
				// A focused popup is mid-interaction; leave it alone.
				Some(window) if kind == UtilityKind::Popup && window.focused => return Ok(()),
				Some(window) => {
					self.browser.update_window(window_id, WindowUpdate::focus()).await?;
					if let Some(tab_id) = window.tabs.first().and_then(|tab| tab.id) {
						self.browser
							.update_tab(
								tab_id,
								TabUpdate {
									url: Some(url),
									..Default::default()
								},
							)
							.await?;
					}
					return Ok(());
				}
				None => {
					debug!(target = "spaces.utility", kind = kind.label(), window = %window_id, "cached window vanished");
					self.clear_slot(kind).await;
				}
			}
		}

		let work_area = self.target_work_area().await?;
		let (bounds, focused) = match kind {
			UtilityKind::Dashboard => (dashboard_bounds(&work_area, self.config.dashboard_max_width), None),
			UtilityKind::Popup => (
				popup_bounds(&work_area, self.config.popup_width, self.config.popup_height),
				Some(true),
			),
		};
		let created = self
			.browser
			.create_window(CreateWindow {
				urls: vec![url],
				kind: Some(WindowType::Popup),
				bounds: Some(bounds),
				focused,
			})
			.await?;

		// Another caller may have filled the slot while the window was being created.
		if let Some(existing) = self.state.slots.get(kind) {
			if existing != created.id {
				info!(target = "spaces.utility", kind = kind.label(), duplicate = %created.id, "closing duplicate utility window");
				self.state.slots.retire(created.id);
				self.browser.remove_window(created.id).await?;
				return Ok(());
			}
		}
		self.assign_slot(kind, created.id).await;
		info!(target = "spaces.utility", kind = kind.label(), window = %created.id, "utility window created");
		Ok(())
	}

	/// Closes the popup and scrubs it from history. Failures are logged and
	/// leave the slot as it was.
	pub async fn close_popup(&self) {
		let Some(window_id) = self.state.slots.get(UtilityKind::Popup) else {
			return;
		};
		if let Err(err) = self.close_utility(UtilityKind::Popup, window_id, true).await {
			debug!(target = "spaces.utility", window = %window_id, error = %err, "failed to close popup");
		}
	}

	pub(crate) async fn close_utility(&self, kind: UtilityKind, window_id: WindowId, scrub_history: bool) -> Result<()> {
		let window = self.browser.window(window_id, true).await?;
		if scrub_history {
			if let Some(url) = window.tabs.first().map(|tab| tab.url.as_str()).filter(|url| !url.is_empty()) {
				self.browser.delete_history_url(url).await?;
			}
		}
		self.state.slots.retire(window_id);
		if let Err(err) = self.browser.remove_window(window_id).await {
			self.state.slots.take_retired(window_id);
			return Err(err);
		}
		self.clear_slot(kind).await;
		Ok(())
	}

	/// Query string describing the active tab, for the popup's URL hash.
	///
	/// Empty when there is no active tab or it sits in a utility window.
	pub async fn generate_popup_params(&self, action: &str, tab_url: Option<&str>) -> Result<String> {
		let Some(tab) = self.browser.active_tab().await? else {
			return Ok(String::new());
		};
		let Some(window_id) = tab.window_id else {
			return Ok(String::new());
		};
		if self.is_internal_window(window_id) {
			return Ok(String::new());
		}

		let name = self
			.store
			.session_by_window(window_id)
			.await?
			.and_then(|session| session.name)
			.unwrap_or_default();
		let mut params = format!("action={action}&windowId={window_id}&sessionName={name}");
		match (tab_url, tab.id) {
			(Some(url), _) => {
				params.push_str("&url=");
				params.push_str(&urlencoding::encode(url));
			}
			(None, Some(tab_id)) => params.push_str(&format!("&tabId={tab_id}")),
			(None, None) => {}
		}
		Ok(params)
	}
}
