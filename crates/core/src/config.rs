/// Engine settings. The defaults match the bundled extension resources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
	/// Dashboard page, relative to the extension root.
	pub dashboard_path: String,
	/// Quick-action popup page, relative to the extension root.
	pub popup_path: String,
	/// Scratch-store key caching the dashboard window id.
	pub dashboard_key: String,
	/// Scratch-store key caching the popup window id.
	pub popup_key: String,
	pub popup_width: i32,
	pub popup_height: i32,
	pub dashboard_max_width: i32,
	/// Shrinks the work area when stored bounds cannot be used.
	pub restore_inset: i32,
	/// Closed tabs remembered per session.
	pub history_limit: usize,
	/// Page opened by the keyboard-shortcuts action.
	pub shortcuts_url: String,
}

impl Default for EngineConfig {
	fn default() -> Self {
		Self {
			dashboard_path: "spaces.html".into(),
			popup_path: "popup.html".into(),
			dashboard_key: "openWindowId".into(),
			popup_key: "popupWindowId".into(),
			popup_width: 310,
			popup_height: 450,
			dashboard_max_width: 1000,
			restore_inset: 100,
			history_limit: 200,
			shortcuts_url: "chrome://extensions/configureCommands".into(),
		}
	}
}
