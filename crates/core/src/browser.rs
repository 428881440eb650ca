//! Window manager collaborator.
//!
//! Option structs serialize in the shape the browser's window and tab APIs
//! accept, so hosts can pass them through without remapping.

use async_trait::async_trait;
use serde::Serialize;
use spaces_protocol::{DisplayInfo, Tab, TabId, Window, WindowBounds, WindowId, WindowType};

use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWindow {
	#[serde(rename = "url")]
	pub urls: Vec<String>,
	#[serde(rename = "type", skip_serializing_if = "Option::is_none")]
	pub kind: Option<WindowType>,
	#[serde(flatten)]
	pub bounds: Option<WindowBounds>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub focused: Option<bool>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct WindowUpdate {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub focused: Option<bool>,
}

impl WindowUpdate {
	pub fn focus() -> Self {
		Self { focused: Some(true) }
	}
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTab {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub window_id: Option<WindowId>,
	pub url: String,
	pub active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TabUpdate {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub url: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub active: Option<bool>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub pinned: Option<bool>,
}

/// The browser's window and tab manager.
///
/// Lookups of windows or tabs that no longer exist fail with
/// [`SpacesError::NotFound`](crate::SpacesError::NotFound); every other
/// failure is a fault.
#[async_trait(?Send)]
pub trait Browser {
	/// Fetches one window, with its tabs when `populate` is set.
	async fn window(&self, id: WindowId, populate: bool) -> Result<Window>;

	async fn windows(&self, populate: bool) -> Result<Vec<Window>>;

	/// The window the user last focused, if there is one.
	async fn current_window(&self) -> Result<Option<Window>>;

	/// Creates a window. The returned window includes its tabs.
	async fn create_window(&self, options: CreateWindow) -> Result<Window>;

	async fn update_window(&self, id: WindowId, update: WindowUpdate) -> Result<Window>;

	async fn remove_window(&self, id: WindowId) -> Result<()>;

	async fn tab(&self, id: TabId) -> Result<Tab>;

	/// Active tab of the current window.
	async fn active_tab(&self) -> Result<Option<Tab>>;

	async fn create_tab(&self, options: CreateTab) -> Result<Tab>;

	async fn update_tab(&self, id: TabId, update: TabUpdate) -> Result<Tab>;

	async fn remove_tab(&self, id: TabId) -> Result<()>;

	/// Moves a tab to the end of another window.
	async fn move_tab(&self, id: TabId, window_id: WindowId) -> Result<Tab>;

	async fn displays(&self) -> Result<Vec<DisplayInfo>>;

	/// Removes every visit to `url` from navigation history.
	async fn delete_history_url(&self, url: &str) -> Result<()>;

	/// Absolute URL of a resource bundled with the extension.
	fn resource_url(&self, path: &str) -> String;
}
