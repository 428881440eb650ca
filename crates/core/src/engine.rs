//! The engine: collaborators, owned state, and lifecycle entry points.

use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use spaces_protocol::{Tab, Window, WindowBounds, WindowId};
use tracing::{debug, info};

use crate::bounds::select_work_area;
use crate::browser::Browser;
use crate::config::EngineConfig;
use crate::error::{Result, SpacesError};
use crate::refresh::RefreshGate;
use crate::store::{Notifier, ScratchStore, SessionStore};
use crate::utility::{UtilityKind, UtilitySlots};

/// Milliseconds since the Unix epoch.
pub type Clock = fn() -> i64;

fn system_clock() -> i64 {
	SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.map(|elapsed| elapsed.as_millis() as i64)
		.unwrap_or_default()
}

/// Mutable state owned by one engine instance.
///
/// Only the engine writes it, and the engine runs on one logical thread.
#[derive(Debug, Default)]
pub struct EngineState {
	pub slots: UtilitySlots,
	pub refresh: RefreshGate,
}

/// Window-session reconciliation engine.
///
/// Cheap to clone; clones share collaborators and state.
#[derive(Clone)]
pub struct Engine {
	pub(crate) browser: Rc<dyn Browser>,
	pub(crate) store: Rc<dyn SessionStore>,
	pub(crate) scratch: Rc<dyn ScratchStore>,
	pub(crate) notifier: Rc<dyn Notifier>,
	pub(crate) config: Rc<EngineConfig>,
	pub(crate) state: Rc<EngineState>,
	clock: Clock,
}

impl Engine {
	pub fn new(
		browser: Rc<dyn Browser>,
		store: Rc<dyn SessionStore>,
		scratch: Rc<dyn ScratchStore>,
		notifier: Rc<dyn Notifier>,
	) -> Self {
		Self {
			browser,
			store,
			scratch,
			notifier,
			config: Rc::new(EngineConfig::default()),
			state: Rc::new(EngineState::default()),
			clock: system_clock,
		}
	}

	pub fn with_config(mut self, config: EngineConfig) -> Self {
		self.config = Rc::new(config);
		self
	}

	/// Shares state with another engine, or injects prepared state in tests.
	pub fn with_state(mut self, state: Rc<EngineState>) -> Self {
		self.state = state;
		self
	}

	pub fn with_clock(mut self, clock: Clock) -> Self {
		self.clock = clock;
		self
	}

	pub fn config(&self) -> &EngineConfig {
		&self.config
	}

	pub fn state(&self) -> &EngineState {
		&self.state
	}

	pub fn store(&self) -> &dyn SessionStore {
		self.store.as_ref()
	}

	pub(crate) fn now(&self) -> i64 {
		(self.clock)()
	}

	/// Process start: recover the utility window ids.
	pub async fn initialize(&self) -> Result<()> {
		self.rediscover_all().await?;
		info!(
			target = "spaces.engine",
			dashboard = ?self.state.slots.get(UtilityKind::Dashboard),
			popup = ?self.state.slots.get(UtilityKind::Popup),
			"engine initialised"
		);
		Ok(())
	}

	/// Browser start: every runtime window id was reassigned, so drop all
	/// session bindings, then rediscover the utility windows.
	pub async fn on_browser_startup(&self) -> Result<()> {
		let mut cleared = 0usize;
		for mut session in self.store.sessions().await? {
			if session.window_id.take().is_some() {
				self.store.update(session).await?;
				cleared += 1;
			}
		}
		debug!(target = "spaces.engine", cleared, "cleared window associations");
		self.rediscover_all().await
	}

	/// Work area of the display new windows should open on.
	pub(crate) async fn target_work_area(&self) -> Result<WindowBounds> {
		let displays = self.browser.displays().await?;
		let focused = match self.browser.current_window().await {
			Ok(window) => window,
			Err(err) => {
				debug!(target = "spaces.engine", error = %err, "no current window for display selection");
				None
			}
		};
		select_work_area(&displays, focused.as_ref()).ok_or_else(|| SpacesError::Browser("no display attached".into()))
	}

	/// Whether `tab` shows one of the utility pages, judged by URL alone.
	pub(crate) fn is_utility_tab(&self, tab: &Tab) -> bool {
		UtilityKind::ALL.iter().any(|kind| {
			let prefix = self.browser.resource_url(kind.path(&self.config));
			tab_points_at(tab, &prefix)
		})
	}

	/// Whether `window` is a utility window, by slot or by first tab URL.
	pub(crate) fn is_utility_window(&self, window: &Window) -> bool {
		self.state.slots.kind_of(window.id).is_some() || window.tabs.first().is_some_and(|tab| self.is_utility_tab(tab))
	}

	pub(crate) fn is_internal_window(&self, window_id: WindowId) -> bool {
		self.state.slots.kind_of(window_id).is_some()
	}
}

/// Whether the tab's committed or pending URL starts with `prefix`.
pub(crate) fn tab_points_at(tab: &Tab, prefix: &str) -> bool {
	tab.url.starts_with(prefix) || tab.pending_url.as_deref().is_some_and(|url| url.starts_with(prefix))
}
