//! Test doubles for driving the engine without a browser.
//!
//! [`FakeBrowser`] keeps windows and tabs in memory and yields to the
//! scheduler at the start of every call, so concurrently awaited engine
//! operations interleave the way they do against a real window manager.
//!
//! ```ignore
//! let harness = Harness::new();
//! let work = harness.browser.open_window(&["https://a.example"]);
//! let reply = harness.dispatch(json!({ "action": "requestSpaceFromWindowId", "windowId": work.get() })).await;
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use async_trait::async_trait;
use serde_json::Value;
use spaces_protocol::{
	DisplayInfo, MessageSender, PushMessage, Reply, Session, Space, Tab, TabId, Window, WindowBounds, WindowId, WindowType,
};

use crate::browser::{Browser, CreateTab, CreateWindow, TabUpdate, WindowUpdate};
use crate::engine::Engine;
use crate::error::{Result, SpacesError};
use crate::memory::{MemoryScratchStore, MemorySessionStore};
use crate::store::Notifier;

/// Resource origin used by [`FakeBrowser::resource_url`].
pub const FAKE_ORIGIN: &str = "chrome-extension://spaces/";

const NEW_TAB_URL: &str = "chrome://newtab/";

/// In-memory window manager.
#[derive(Debug)]
pub struct FakeBrowser {
	windows: RefCell<Vec<Window>>,
	next_window: Cell<i64>,
	next_tab: Cell<i64>,
	focused: Cell<Option<WindowId>>,
	displays: RefCell<Vec<DisplayInfo>>,
	deleted_history: RefCell<Vec<String>>,
	created_windows: Cell<usize>,
	broken: Cell<bool>,
}

impl Default for FakeBrowser {
	fn default() -> Self {
		Self {
			windows: RefCell::new(Vec::new()),
			next_window: Cell::new(1),
			next_tab: Cell::new(100),
			focused: Cell::new(None),
			displays: RefCell::new(vec![DisplayInfo {
				id: "primary".into(),
				is_primary: true,
				work_area: WindowBounds::new(0, 0, 1920, 1080),
			}]),
			deleted_history: RefCell::new(Vec::new()),
			created_windows: Cell::new(0),
			broken: Cell::new(false),
		}
	}
}

impl FakeBrowser {
	pub fn new() -> Self {
		Self::default()
	}

	/// Opens a focused normal window holding `urls`, bypassing the engine.
	pub fn open_window(&self, urls: &[&str]) -> WindowId {
		let urls = urls.iter().map(|url| url.to_string()).collect();
		self.insert_window(urls, Some(WindowType::Normal), None, true).id
	}

	/// Opens a popup-type window, as a previous background context would have.
	pub fn open_popup_window(&self, url: &str) -> WindowId {
		self.insert_window(vec![url.to_string()], Some(WindowType::Popup), None, false).id
	}

	/// Removes a window as if the user closed it. No event is emitted.
	pub fn close_externally(&self, window_id: WindowId) {
		self.windows.borrow_mut().retain(|window| window.id != window_id);
		if self.focused.get() == Some(window_id) {
			self.focused.set(None);
		}
	}

	pub fn focus(&self, window_id: WindowId) {
		self.focused.set(Some(window_id));
		for window in self.windows.borrow_mut().iter_mut() {
			window.focused = window.id == window_id;
		}
	}

	/// Snapshot of a window with its tabs.
	pub fn snapshot(&self, window_id: WindowId) -> Option<Window> {
		self.windows.borrow().iter().find(|window| window.id == window_id).cloned()
	}

	pub fn window_ids(&self) -> Vec<WindowId> {
		self.windows.borrow().iter().map(|window| window.id).collect()
	}

	/// Windows whose first tab shows `url_prefix`.
	pub fn windows_showing(&self, url_prefix: &str) -> Vec<WindowId> {
		self.windows
			.borrow()
			.iter()
			.filter(|window| window.tabs.first().is_some_and(|tab| tab.url.starts_with(url_prefix)))
			.map(|window| window.id)
			.collect()
	}

	/// Marks a tab as still loading `pending_url`, with an empty committed URL.
	pub fn set_loading(&self, tab_id: TabId, pending_url: &str) {
		self.with_tab(tab_id, |tab| {
			tab.url.clear();
			tab.pending_url = Some(pending_url.to_string());
			tab.status = Some("loading".into());
		});
	}

	pub fn set_displays(&self, displays: Vec<DisplayInfo>) {
		*self.displays.borrow_mut() = displays;
	}

	pub fn set_bounds(&self, window_id: WindowId, bounds: WindowBounds) {
		for window in self.windows.borrow_mut().iter_mut().filter(|window| window.id == window_id) {
			window.left = Some(bounds.left);
			window.top = Some(bounds.top);
			window.width = Some(bounds.width);
			window.height = Some(bounds.height);
		}
	}

	/// Makes every subsequent call fail with a browser fault.
	pub fn set_broken(&self, broken: bool) {
		self.broken.set(broken);
	}

	pub fn deleted_history(&self) -> Vec<String> {
		self.deleted_history.borrow().clone()
	}

	/// Number of windows created through [`Browser::create_window`].
	pub fn created_windows(&self) -> usize {
		self.created_windows.get()
	}

	async fn enter(&self) -> Result<()> {
		tokio::task::yield_now().await;
		if self.broken.get() {
			return Err(SpacesError::Browser("window manager unavailable".into()));
		}
		Ok(())
	}

	fn allocate_tab(&self, window_id: WindowId, url: String) -> Tab {
		let id = self.next_tab.get();
		self.next_tab.set(id + 1);
		Tab {
			id: Some(TabId(id)),
			window_id: Some(window_id),
			url,
			status: Some("complete".into()),
			..Default::default()
		}
	}

	fn insert_window(&self, urls: Vec<String>, kind: Option<WindowType>, bounds: Option<WindowBounds>, focused: bool) -> Window {
		let id = WindowId(self.next_window.get());
		self.next_window.set(id.get() + 1);
		let urls = if urls.is_empty() { vec![NEW_TAB_URL.to_string()] } else { urls };
		let mut tabs: Vec<Tab> = urls.into_iter().map(|url| self.allocate_tab(id, url)).collect();
		if let Some(first) = tabs.first_mut() {
			first.active = true;
		}
		let bounds = bounds.unwrap_or(WindowBounds::new(10, 10, 800, 600));
		let window = Window {
			id,
			focused: false,
			left: Some(bounds.left),
			top: Some(bounds.top),
			width: Some(bounds.width),
			height: Some(bounds.height),
			kind,
			tabs,
		};
		self.windows.borrow_mut().push(window);
		self.reindex(id);
		if focused {
			self.focus(id);
		}
		self.snapshot(id).unwrap_or_default()
	}

	fn reindex(&self, window_id: WindowId) {
		for window in self.windows.borrow_mut().iter_mut().filter(|window| window.id == window_id) {
			for (index, tab) in window.tabs.iter_mut().enumerate() {
				tab.index = Some(index as u32);
			}
		}
	}

	fn with_tab<T>(&self, tab_id: TabId, f: impl FnOnce(&mut Tab) -> T) -> Option<T> {
		self.windows
			.borrow_mut()
			.iter_mut()
			.flat_map(|window| window.tabs.iter_mut())
			.find(|tab| tab.id == Some(tab_id))
			.map(f)
	}

	/// Detaches a tab; a window left empty closes, like a real browser.
	fn take_tab(&self, tab_id: TabId) -> Result<Tab> {
		let mut windows = self.windows.borrow_mut();
		let (window_index, tab_index) = windows
			.iter()
			.enumerate()
			.find_map(|(w, window)| window.tabs.iter().position(|tab| tab.id == Some(tab_id)).map(|t| (w, t)))
			.ok_or_else(|| SpacesError::tab_not_found(tab_id))?;
		let tab = windows[window_index].tabs.remove(tab_index);
		if windows[window_index].tabs.is_empty() {
			let removed = windows.remove(window_index);
			if self.focused.get() == Some(removed.id) {
				self.focused.set(None);
			}
		}
		Ok(tab)
	}

	fn shaped(window: &Window, populate: bool) -> Window {
		let mut window = window.clone();
		if !populate {
			window.tabs.clear();
		}
		window
	}
}

#[async_trait(?Send)]
impl Browser for FakeBrowser {
	async fn window(&self, id: WindowId, populate: bool) -> Result<Window> {
		self.enter().await?;
		self.windows
			.borrow()
			.iter()
			.find(|window| window.id == id)
			.map(|window| Self::shaped(window, populate))
			.ok_or_else(|| SpacesError::window_not_found(id))
	}

	async fn windows(&self, populate: bool) -> Result<Vec<Window>> {
		self.enter().await?;
		Ok(self.windows.borrow().iter().map(|window| Self::shaped(window, populate)).collect())
	}

	async fn current_window(&self) -> Result<Option<Window>> {
		self.enter().await?;
		Ok(self.focused.get().and_then(|id| self.snapshot(id)))
	}

	async fn create_window(&self, options: CreateWindow) -> Result<Window> {
		self.enter().await?;
		self.created_windows.set(self.created_windows.get() + 1);
		Ok(self.insert_window(options.urls, options.kind, options.bounds, options.focused != Some(false)))
	}

	async fn update_window(&self, id: WindowId, update: WindowUpdate) -> Result<Window> {
		self.enter().await?;
		if self.snapshot(id).is_none() {
			return Err(SpacesError::window_not_found(id));
		}
		if update.focused == Some(true) {
			self.focus(id);
		}
		self.snapshot(id).ok_or_else(|| SpacesError::window_not_found(id))
	}

	async fn remove_window(&self, id: WindowId) -> Result<()> {
		self.enter().await?;
		if self.snapshot(id).is_none() {
			return Err(SpacesError::window_not_found(id));
		}
		self.close_externally(id);
		Ok(())
	}

	async fn tab(&self, id: TabId) -> Result<Tab> {
		self.enter().await?;
		self.with_tab(id, |tab| tab.clone()).ok_or_else(|| SpacesError::tab_not_found(id))
	}

	async fn active_tab(&self) -> Result<Option<Tab>> {
		self.enter().await?;
		Ok(self
			.focused
			.get()
			.and_then(|id| self.snapshot(id))
			.and_then(|window| window.tabs.into_iter().find(|tab| tab.active)))
	}

	async fn create_tab(&self, options: CreateTab) -> Result<Tab> {
		self.enter().await?;
		let window_id = options
			.window_id
			.or(self.focused.get())
			.ok_or_else(|| SpacesError::Browser("no window to open the tab in".into()))?;
		let mut tab = self.allocate_tab(window_id, options.url);
		tab.active = options.active;
		{
			let mut windows = self.windows.borrow_mut();
			let window = windows
				.iter_mut()
				.find(|window| window.id == window_id)
				.ok_or_else(|| SpacesError::window_not_found(window_id))?;
			if tab.active {
				window.tabs.iter_mut().for_each(|other| other.active = false);
			}
			window.tabs.push(tab.clone());
		}
		self.reindex(window_id);
		self.with_tab(tab.id.unwrap_or(TabId(0)), |tab| tab.clone())
			.ok_or_else(|| SpacesError::Browser("tab vanished after creation".into()))
	}

	async fn update_tab(&self, id: TabId, update: TabUpdate) -> Result<Tab> {
		self.enter().await?;
		if update.active == Some(true) {
			let window_id = self.with_tab(id, |tab| tab.window_id).flatten();
			for window in self.windows.borrow_mut().iter_mut().filter(|window| Some(window.id) == window_id) {
				window.tabs.iter_mut().for_each(|tab| tab.active = tab.id == Some(id));
			}
		}
		self.with_tab(id, |tab| {
			if let Some(url) = update.url {
				tab.url = url;
				tab.pending_url = None;
			}
			if let Some(pinned) = update.pinned {
				tab.pinned = pinned;
			}
			tab.clone()
		})
		.ok_or_else(|| SpacesError::tab_not_found(id))
	}

	async fn remove_tab(&self, id: TabId) -> Result<()> {
		self.enter().await?;
		self.take_tab(id).map(drop)
	}

	async fn move_tab(&self, id: TabId, window_id: WindowId) -> Result<Tab> {
		self.enter().await?;
		if self.snapshot(window_id).is_none() {
			return Err(SpacesError::window_not_found(window_id));
		}
		let mut tab = self.take_tab(id)?;
		tab.window_id = Some(window_id);
		tab.active = false;
		for window in self.windows.borrow_mut().iter_mut().filter(|window| window.id == window_id) {
			window.tabs.push(tab.clone());
		}
		self.reindex(window_id);
		self.with_tab(id, |tab| tab.clone()).ok_or_else(|| SpacesError::tab_not_found(id))
	}

	async fn displays(&self) -> Result<Vec<DisplayInfo>> {
		self.enter().await?;
		Ok(self.displays.borrow().clone())
	}

	async fn delete_history_url(&self, url: &str) -> Result<()> {
		self.enter().await?;
		self.deleted_history.borrow_mut().push(url.to_string());
		Ok(())
	}

	fn resource_url(&self, path: &str) -> String {
		format!("{FAKE_ORIGIN}{path}")
	}
}

/// Keeps every broadcast message.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
	messages: RefCell<Vec<PushMessage>>,
}

impl RecordingNotifier {
	pub fn messages(&self) -> Vec<PushMessage> {
		self.messages.borrow().clone()
	}

	pub fn count(&self) -> usize {
		self.messages.borrow().len()
	}

	/// Spaces carried by the most recent broadcast.
	pub fn last_spaces(&self) -> Option<Vec<Space>> {
		self.messages.borrow().last().map(|PushMessage::UpdateSpaces { spaces }| spaces.clone())
	}
}

impl Notifier for RecordingNotifier {
	fn broadcast(&self, message: &PushMessage) -> Result<()> {
		self.messages.borrow_mut().push(message.clone());
		Ok(())
	}
}

thread_local! {
	static TICKS: Cell<i64> = const { Cell::new(1_000) };
}

/// Strictly increasing clock, one tick per reading.
pub fn tick_clock() -> i64 {
	TICKS.with(|ticks| {
		let now = ticks.get() + 1;
		ticks.set(now);
		now
	})
}

/// An engine wired to in-memory collaborators, with handles to each.
pub struct Harness {
	pub engine: Engine,
	pub browser: Rc<FakeBrowser>,
	pub store: Rc<MemorySessionStore>,
	pub scratch: Rc<MemoryScratchStore>,
	pub notifier: Rc<RecordingNotifier>,
}

impl Default for Harness {
	fn default() -> Self {
		Self::with_sessions(Vec::new())
	}
}

impl Harness {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_sessions(sessions: Vec<Session>) -> Self {
		Self::with_parts(Rc::new(FakeBrowser::new()), Rc::new(MemorySessionStore::with_sessions(sessions)))
	}

	/// A fresh engine over existing collaborators, as after a background restart.
	pub fn with_parts(browser: Rc<FakeBrowser>, store: Rc<MemorySessionStore>) -> Self {
		Self::assemble(browser, store, Rc::new(MemoryScratchStore::new()))
	}

	pub fn assemble(browser: Rc<FakeBrowser>, store: Rc<MemorySessionStore>, scratch: Rc<MemoryScratchStore>) -> Self {
		let notifier = Rc::new(RecordingNotifier::default());
		let engine = Engine::new(browser.clone(), store.clone(), scratch.clone(), notifier.clone()).with_clock(tick_clock);
		Self {
			engine,
			browser,
			store,
			scratch,
			notifier,
		}
	}

	/// Restarts the background context: same browser and stores, new engine state.
	pub fn restart(&self) -> Self {
		Self::assemble(self.browser.clone(), self.store.clone(), self.scratch.clone())
	}

	pub async fn dispatch(&self, message: Value) -> Reply {
		self.engine.dispatch(&message, &MessageSender::default()).await
	}

	/// Dispatches and unwraps the reply value, `None` for a silent reply.
	pub async fn ask(&self, message: Value) -> Option<Value> {
		self.dispatch(message).await.into_value()
	}

	pub fn dashboard_url(&self) -> String {
		self.browser.resource_url(&self.engine.config().dashboard_path)
	}

	pub fn popup_url(&self) -> String {
		self.browser.resource_url(&self.engine.config().popup_path)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn moving_the_last_tab_closes_its_window() {
		let browser = FakeBrowser::new();
		let source = browser.open_window(&["https://a.example"]);
		let target = browser.open_window(&["https://b.example"]);
		let tab = browser.snapshot(source).unwrap().tabs[0].id.unwrap();

		browser.move_tab(tab, target).await.unwrap();

		assert!(browser.snapshot(source).is_none());
		let urls: Vec<String> = browser.snapshot(target).unwrap().tab_urls().map(str::to_string).collect();
		assert_eq!(urls, ["https://b.example", "https://a.example"]);
	}

	#[tokio::test]
	async fn missing_windows_are_not_found() {
		let browser = FakeBrowser::new();
		let err = browser.window(WindowId(42), false).await.unwrap_err();
		assert!(err.is_not_found());
		browser.set_broken(true);
		assert!(!browser.windows(false).await.unwrap_err().is_not_found());
	}

	#[test]
	fn tick_clock_advances() {
		let first = tick_clock();
		assert!(tick_clock() > first);
	}
}
