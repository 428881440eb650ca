//! Session, space, window, and tab shapes.

use serde::{Deserialize, Deserializer, Serialize};

use crate::ids::{SessionId, TabId, WindowId};
use crate::or_false;

/// A tab, as reported by the window manager or as stored in a session.
///
/// Stored tabs only carry `url`, `title`, `favIconUrl`, and `pinned`; the
/// remaining fields are populated for live tabs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<TabId>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub window_id: Option<WindowId>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub index: Option<u32>,
	#[serde(default)]
	pub url: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub pending_url: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub status: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub title: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub fav_icon_url: Option<String>,
	#[serde(default, skip_serializing_if = "std::ops::Not::not")]
	pub pinned: bool,
	#[serde(default, skip_serializing_if = "std::ops::Not::not")]
	pub active: bool,
	/// Display hint: another tab in the same space shares this title.
	#[serde(default, skip_serializing_if = "std::ops::Not::not")]
	pub duplicate: bool,
}

impl Tab {
	pub fn new(url: impl Into<String>) -> Self {
		Self {
			url: url.into(),
			..Default::default()
		}
	}

	pub fn is_loading(&self) -> bool {
		self.status.as_deref() == Some("loading")
	}

	/// URL the tab is heading to: the pending URL while loading, otherwise the committed one.
	pub fn effective_url(&self) -> &str {
		match &self.pending_url {
			Some(pending) if self.is_loading() => pending,
			_ => &self.url,
		}
	}

	/// Strips runtime-only fields, keeping what a session persists.
	///
	/// The tab id is kept so a later removal can be attributed to this entry.
	pub fn to_stored(&self) -> Tab {
		let url = if self.url.is_empty() {
			self.pending_url.clone().unwrap_or_default()
		} else {
			self.url.clone()
		};
		Tab {
			id: self.id,
			url,
			title: self.title.clone(),
			fav_icon_url: self.fav_icon_url.clone(),
			pinned: self.pinned,
			..Default::default()
		}
	}
}

/// Screen rectangle in window manager units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowBounds {
	pub left: i32,
	pub top: i32,
	pub width: i32,
	pub height: i32,
}

impl WindowBounds {
	pub fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
		Self { left, top, width, height }
	}

	pub fn right(&self) -> i64 {
		i64::from(self.left) + i64::from(self.width)
	}

	pub fn bottom(&self) -> i64 {
		i64::from(self.top) + i64::from(self.height)
	}

	/// Whether `other` lies entirely within `self`, edges inclusive.
	pub fn contains(&self, other: &WindowBounds) -> bool {
		other.left >= self.left && other.top >= self.top && other.right() <= self.right() && other.bottom() <= self.bottom()
	}

	/// Half-open containment: the right and bottom edges belong to the neighbour.
	pub fn contains_point(&self, x: f64, y: f64) -> bool {
		x >= f64::from(self.left) && x < self.right() as f64 && y >= f64::from(self.top) && y < self.bottom() as f64
	}

	pub fn center(&self) -> (f64, f64) {
		(
			f64::from(self.left) + f64::from(self.width) / 2.0,
			f64::from(self.top) + f64::from(self.height) / 2.0,
		)
	}
}

/// Window geometry as persisted alongside a session.
///
/// Persisted data is untrusted: any field that is missing or not a number
/// deserializes as `None` instead of failing the whole record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredBounds {
	#[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
	pub left: Option<i32>,
	#[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
	pub top: Option<i32>,
	#[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
	pub width: Option<i32>,
	#[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
	pub height: Option<i32>,
}

impl StoredBounds {
	/// Returns the rectangle if all four fields are present.
	pub fn complete(&self) -> Option<WindowBounds> {
		Some(WindowBounds {
			left: self.left?,
			top: self.top?,
			width: self.width?,
			height: self.height?,
		})
	}
}

impl From<WindowBounds> for StoredBounds {
	fn from(bounds: WindowBounds) -> Self {
		Self {
			left: Some(bounds.left),
			top: Some(bounds.top),
			width: Some(bounds.width),
			height: Some(bounds.height),
		}
	}
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
	D: Deserializer<'de>,
{
	let value = serde_json::Value::deserialize(deserializer)?;
	Ok(match value {
		serde_json::Value::Number(number) => number
			.as_i64()
			.and_then(|n| i32::try_from(n).ok())
			.or_else(|| number.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i32)),
		_ => None,
	})
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowType {
	Normal,
	Popup,
	Panel,
	App,
	Devtools,
}

/// A live window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Window {
	pub id: WindowId,
	#[serde(default)]
	pub focused: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub left: Option<i32>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub top: Option<i32>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub width: Option<i32>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub height: Option<i32>,
	#[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
	pub kind: Option<WindowType>,
	/// Only populated when the window was fetched with its tabs.
	#[serde(default)]
	pub tabs: Vec<Tab>,
}

impl Window {
	pub fn bounds(&self) -> StoredBounds {
		StoredBounds {
			left: self.left,
			top: self.top,
			width: self.width,
			height: self.height,
		}
	}

	pub fn is_normal(&self) -> bool {
		matches!(self.kind, None | Some(WindowType::Normal))
	}

	pub fn tab_urls(&self) -> impl Iterator<Item = &str> {
		self.tabs.iter().map(|tab| tab.url.as_str())
	}
}

/// A display attached to the system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayInfo {
	#[serde(default)]
	pub id: String,
	#[serde(default)]
	pub is_primary: bool,
	/// Usable area, excluding task bars and docks.
	pub work_area: WindowBounds,
}

/// Durable record of a named group of tabs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
	/// Absent until the store persists the session.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<SessionId>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	/// Present while the session is open in a live window.
	#[serde(default, with = "or_false")]
	pub window_id: Option<WindowId>,
	#[serde(default)]
	pub tabs: Vec<Tab>,
	/// Previously closed tabs, most recent first.
	#[serde(default)]
	pub history: Vec<Tab>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub window_bounds: Option<StoredBounds>,
	/// Milliseconds since the Unix epoch.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub last_access: Option<i64>,
}

impl Session {
	pub fn named(name: impl Into<String>, tabs: Vec<Tab>) -> Self {
		Self {
			name: Some(name.into()),
			tabs,
			..Default::default()
		}
	}

	pub fn is_open(&self) -> bool {
		self.window_id.is_some()
	}

	pub fn has_name(&self, candidate: &str) -> bool {
		self.name.as_deref().is_some_and(|name| names_equal(name, candidate))
	}
}

/// Case-insensitive session name comparison.
pub fn names_equal(a: &str, b: &str) -> bool {
	a.to_lowercase() == b.to_lowercase()
}

/// Read model handed to UI surfaces.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Space {
	#[serde(default, with = "or_false")]
	pub session_id: Option<SessionId>,
	#[serde(default, with = "or_false")]
	pub window_id: Option<WindowId>,
	#[serde(default, with = "or_false")]
	pub name: Option<String>,
	#[serde(default)]
	pub tabs: Vec<Tab>,
	/// `false` for a space synthesised from a window with no session.
	#[serde(default, with = "or_false")]
	pub history: Option<Vec<Tab>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub last_access: Option<i64>,
}

impl Space {
	/// Builds a transient space directly from a live window.
	pub fn from_window(window: &Window) -> Self {
		Self {
			session_id: None,
			window_id: Some(window.id),
			name: None,
			tabs: window.tabs.clone(),
			history: None,
			last_access: None,
		}
	}

	/// Marks tabs sharing a title; a missing title falls back to the URL.
	pub fn mark_duplicates(&mut self) {
		let mut counts = std::collections::HashMap::<String, usize>::new();
		for tab in &mut self.tabs {
			if tab.title.as_deref().is_none_or(str::is_empty) {
				tab.title = Some(tab.url.clone());
			}
			*counts.entry(tab.title.clone().unwrap_or_default()).or_default() += 1;
		}
		for tab in &mut self.tabs {
			tab.duplicate = tab.title.as_ref().is_some_and(|title| counts.get(title).copied().unwrap_or(0) > 1);
		}
	}
}

impl From<&Session> for Space {
	fn from(session: &Session) -> Self {
		Self {
			session_id: session.id,
			window_id: session.window_id,
			name: session.name.clone(),
			tabs: session.tabs.clone(),
			history: Some(session.history.clone()),
			last_access: session.last_access,
		}
	}
}

/// Answer to a session presence query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPresence {
	pub exists: bool,
	pub is_open: bool,
	#[serde(default, with = "or_false")]
	pub session_name: Option<String>,
}

impl SessionPresence {
	pub fn of(session: Option<&Session>) -> Self {
		Self {
			exists: session.is_some(),
			is_open: session.is_some_and(Session::is_open),
			session_name: session.and_then(|s| s.name.clone()).filter(|name| !name.is_empty()),
		}
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn effective_url_prefers_pending_while_loading() {
		let mut tab = Tab::new("https://old.example");
		tab.pending_url = Some("https://new.example".into());
		assert_eq!(tab.effective_url(), "https://old.example");

		tab.status = Some("loading".into());
		assert_eq!(tab.effective_url(), "https://new.example");
	}

	#[test]
	fn stored_bounds_tolerate_wrong_types() {
		let bounds: StoredBounds = serde_json::from_value(json!({ "left": "10", "top": 5, "width": null, "height": 600 })).unwrap();
		assert_eq!(bounds.left, None);
		assert_eq!(bounds.top, Some(5));
		assert_eq!(bounds.width, None);
		assert!(bounds.complete().is_none());
	}

	#[test]
	fn containment_is_edge_inclusive() {
		let display = WindowBounds::new(0, 0, 1920, 1080);
		assert!(display.contains(&WindowBounds::new(0, 0, 1920, 1080)));
		assert!(!display.contains(&WindowBounds::new(1, 0, 1920, 1080)));
		assert!(!display.contains(&WindowBounds::new(-1, 10, 100, 100)));
	}

	#[test]
	fn point_containment_is_half_open() {
		let display = WindowBounds::new(0, 0, 100, 100);
		assert!(display.contains_point(0.0, 0.0));
		assert!(!display.contains_point(100.0, 50.0));
	}

	#[test]
	fn space_encodes_absent_fields_as_false() {
		let window = Window {
			id: WindowId(4),
			tabs: vec![Tab::new("https://a.example")],
			..Default::default()
		};
		let value = serde_json::to_value(Space::from_window(&window)).unwrap();
		assert_eq!(value["sessionId"], json!(false));
		assert_eq!(value["name"], json!(false));
		assert_eq!(value["history"], json!(false));
		assert_eq!(value["windowId"], json!(4));
	}

	#[test]
	fn presence_reports_open_state() {
		let mut session = Session::named("Work", vec![]);
		assert_eq!(
			SessionPresence::of(Some(&session)),
			SessionPresence {
				exists: true,
				is_open: false,
				session_name: Some("Work".into())
			}
		);
		session.window_id = Some(WindowId(3));
		assert!(SessionPresence::of(Some(&session)).is_open);
		assert!(!SessionPresence::of(None).exists);
	}

	#[test]
	fn duplicates_are_marked_by_title() {
		let mut space = Space {
			tabs: vec![
				Tab {
					title: Some("Docs".into()),
					..Tab::new("https://a.example")
				},
				Tab {
					title: Some("Docs".into()),
					..Tab::new("https://b.example")
				},
				Tab::new("https://c.example"),
			],
			..Default::default()
		};
		space.mark_duplicates();
		assert!(space.tabs[0].duplicate);
		assert!(space.tabs[1].duplicate);
		assert!(!space.tabs[2].duplicate);
		assert_eq!(space.tabs[2].title.as_deref(), Some("https://c.example"));
	}
}
