//! Popup URL hash parameters.
//!
//! The popup is opened with `popup.html#opener=bg&action=...&windowId=...`;
//! these helpers read that hash back.

use crate::ids::WindowId;
use crate::param::parse_int;

/// Returns the raw value of `key` in the URL's `#` fragment.
pub fn hash_variable<'a>(key: &str, url: &'a str) -> Option<&'a str> {
	let (_, fragment) = url.split_once('#')?;
	fragment.split('&').find_map(|pair| {
		let (name, value) = pair.split_once('=')?;
		(name == key).then_some(value)
	})
}

/// Picks the window a popup acts on.
///
/// The `windowId` hash parameter wins (quick-switch mode passes the window the
/// popup was summoned from); otherwise the popup's current window is used.
/// Only positive integers are valid.
pub fn window_id_from_context(url: &str, current_window: Option<WindowId>) -> Option<WindowId> {
	let candidate = match hash_variable("windowId", url) {
		Some(raw) if !raw.is_empty() && raw != "false" => parse_int(raw),
		_ => current_window.map(WindowId::get),
	};
	candidate.filter(|id| *id > 0).map(WindowId)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn hash_window_id_wins() {
		assert_eq!(window_id_from_context("popup.html#windowId=456&action=switch", Some(WindowId(100))), Some(WindowId(456)));
		assert_eq!(
			window_id_from_context("popup.html#action=switch&tabId=10&windowId=777&sessionName=test", Some(WindowId(100))),
			Some(WindowId(777))
		);
	}

	#[test]
	fn falls_back_to_current_window() {
		assert_eq!(window_id_from_context("popup.html#action=switch", Some(WindowId(100))), Some(WindowId(100)));
		assert_eq!(window_id_from_context("popup.html#windowId=false", Some(WindowId(100))), Some(WindowId(100)));
		assert_eq!(window_id_from_context("popup.html", Some(WindowId(100))), Some(WindowId(100)));
		assert_eq!(window_id_from_context("popup.html", None), None);
	}

	#[test]
	fn rejects_non_positive_and_malformed_ids() {
		assert_eq!(window_id_from_context("popup.html#windowId=abc", Some(WindowId(100))), None);
		assert_eq!(window_id_from_context("popup.html#windowId=-5", Some(WindowId(100))), None);
		assert_eq!(window_id_from_context("popup.html#windowId=0", Some(WindowId(100))), None);
	}

	#[test]
	fn hash_variable_reads_fragment_only() {
		assert_eq!(hash_variable("action", "popup.html?action=no#action=move"), Some("move"));
		assert_eq!(hash_variable("missing", "popup.html#action=move"), None);
	}
}
