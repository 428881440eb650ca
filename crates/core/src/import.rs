//! Import, backup, and export formats.
//!
//! Import text is either a JSON backup (`[{name, tabs: [{url, ...}]}]`) or a
//! list of URLs, one per line. Backups are the lean `{name, tabs}` shape with
//! suspended-tab URLs unwrapped.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use spaces_protocol::or_false;
use spaces_protocol::{Session, Space, Tab};
use thiserror::Error;

use crate::error::Result;
use crate::naming::{claim_name, first_free_name};
use crate::sessions::detached_tab;
use crate::store::SessionStore;

pub const IMPORTED_NAME_PREFIX: &str = "Imported space: ";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImportError {
	#[error("No content to import")]
	Empty,
	#[error("backup must be an array of spaces")]
	NotAnArray,
	#[error("backup contains no spaces")]
	NoSpaces,
	#[error("every space in a backup needs name and tabs")]
	MissingFields,
	#[error("No valid URLs or JSON backup found")]
	Unrecognised,
}

/// Tab entry of a backup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupTab {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub title: Option<String>,
	pub url: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub fav_icon_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackupSpace {
	#[serde(default, with = "or_false")]
	pub name: Option<String>,
	#[serde(default)]
	pub tabs: Vec<BackupTab>,
}

impl From<BackupSpace> for Space {
	fn from(backup: BackupSpace) -> Self {
		Space {
			name: backup.name,
			tabs: backup
				.tabs
				.into_iter()
				.map(|tab| Tab {
					title: tab.title,
					fav_icon_url: tab.fav_icon_url,
					..Tab::new(tab.url)
				})
				.collect(),
			..Default::default()
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImportPayload {
	Backup(Vec<BackupSpace>),
	Urls(Vec<String>),
}

/// Classifies and validates import text.
pub fn parse_import(text: &str) -> std::result::Result<ImportPayload, ImportError> {
	if text.trim().is_empty() {
		return Err(ImportError::Empty);
	}
	match serde_json::from_str::<Value>(text) {
		Ok(value) => parse_backup(value).map(ImportPayload::Backup),
		Err(_) => {
			let urls = parse_url_list(text);
			if urls.is_empty() {
				Err(ImportError::Unrecognised)
			} else {
				Ok(ImportPayload::Urls(urls))
			}
		}
	}
}

fn parse_backup(value: Value) -> std::result::Result<Vec<BackupSpace>, ImportError> {
	let Value::Array(entries) = value else {
		// A bare number parses as JSON but is neither format.
		return Err(if value.is_number() {
			ImportError::Unrecognised
		} else {
			ImportError::NotAnArray
		});
	};
	if entries.is_empty() {
		return Err(ImportError::NoSpaces);
	}
	let well_formed = entries
		.iter()
		.all(|entry| entry.get("name").is_some_and(|name| !name.is_null()) && entry.get("tabs").is_some_and(Value::is_array));
	if !well_formed {
		return Err(ImportError::MissingFields);
	}
	entries
		.into_iter()
		.map(|entry| serde_json::from_value(entry).map_err(|_| ImportError::MissingFields))
		.collect()
}

/// Lines that look like URLs (contain `://` after the first character), trimmed.
pub fn parse_url_list(text: &str) -> Vec<String> {
	text.split(['\n', '\r'])
		.map(str::trim)
		.filter(|line| line.find("://").is_some_and(|at| at > 0))
		.map(str::to_string)
		.collect()
}

/// Unwraps tab-suspender URLs (`.../suspended.html?...uri=<original>`).
pub fn normalise_tab_url(url: &str) -> &str {
	match (url.find("suspended.html"), url.find("uri=")) {
		(Some(suspended), Some(uri)) if suspended > 0 && uri > 0 => &url[uri + 4..],
		_ => url,
	}
}

/// Lean backup of every space.
pub fn backup_spaces(spaces: &[Space]) -> Vec<BackupSpace> {
	spaces
		.iter()
		.map(|space| BackupSpace {
			name: space.name.clone(),
			tabs: space
				.tabs
				.iter()
				.map(|tab| BackupTab {
					title: tab.title.clone(),
					url: normalise_tab_url(&tab.url).to_string(),
					fav_icon_url: tab.fav_icon_url.clone(),
				})
				.collect(),
		})
		.collect()
}

/// One normalised URL per line.
pub fn export_urls(space: &Space) -> String {
	space
		.tabs
		.iter()
		.map(|tab| format!("{}\n", normalise_tab_url(&tab.url)))
		.collect()
}

/// File name an export of `space` is saved under.
pub fn export_file_name(space: &Space) -> String {
	format!("{}.txt", space.name.as_deref().filter(|name| !name.is_empty()).unwrap_or("untitled"))
}

/// Stores a backed-up space as a new, unbound session.
pub async fn restore_space(store: &dyn SessionStore, space: Space, delete_old: bool, now: i64) -> Result<Session> {
	if let Some(name) = space.name.as_deref() {
		claim_name(store, name, None, delete_old).await?;
	}
	let session = Session {
		name: space.name,
		tabs: space.tabs.iter().map(detached_tab).collect(),
		last_access: Some(now),
		..Default::default()
	};
	store.create(session).await
}

/// Stores a URL list as a session named `"Imported space: N"` with the first free `N`.
pub async fn import_urls(store: &dyn SessionStore, urls: &[String], now: i64) -> Result<Session> {
	let name = first_free_name(store, IMPORTED_NAME_PREFIX).await?;
	let session = Session {
		tabs: urls.iter().map(Tab::new).collect(),
		last_access: Some(now),
		..Session::named(name, Vec::new())
	};
	store.create(session).await
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::memory::MemorySessionStore;

	#[test]
	fn empty_input_is_rejected() {
		assert_eq!(parse_import(""), Err(ImportError::Empty));
		assert_eq!(parse_import("   \n  \t  "), Err(ImportError::Empty));
	}

	#[test]
	fn json_backups_are_validated() {
		let backup = json!([{ "name": "Test Space", "tabs": [{ "title": "Tab 1", "url": "https://example.com" }] }]);
		match parse_import(&backup.to_string()).unwrap() {
			ImportPayload::Backup(spaces) => {
				assert_eq!(spaces.len(), 1);
				assert_eq!(spaces[0].name.as_deref(), Some("Test Space"));
			}
			other => panic!("expected backup, got {other:?}"),
		}

		assert_eq!(parse_import(r#"{"name": "x", "tabs": []}"#), Err(ImportError::NotAnArray));
		assert_eq!(parse_import("[]"), Err(ImportError::NoSpaces));
		assert_eq!(parse_import(r#"[{"tabs": []}]"#), Err(ImportError::MissingFields));
		assert_eq!(parse_import(r#"[{"name": "x"}]"#), Err(ImportError::MissingFields));
		assert!(parse_import(r#"[{"name": "Empty", "tabs": []}]"#).is_ok());
	}

	#[test]
	fn url_lists_keep_only_urls() {
		assert_eq!(
			parse_import("  https://example.com  \ntest.com\n\n\rftp://files.com\r\n").unwrap(),
			ImportPayload::Urls(vec!["https://example.com".into(), "ftp://files.com".into()])
		);
		assert_eq!(parse_import("{ invalid json }"), Err(ImportError::Unrecognised));
		assert_eq!(parse_import("example.com\ntest.com"), Err(ImportError::Unrecognised));
		assert_eq!(parse_import("12345"), Err(ImportError::Unrecognised));
	}

	#[test]
	fn suspended_urls_are_unwrapped() {
		assert_eq!(
			normalise_tab_url("chrome-extension://abc/suspended.html?uri=https://example.com"),
			"https://example.com"
		);
		assert_eq!(normalise_tab_url("https://example.com/?uri=x"), "https://example.com/?uri=x");
	}

	#[test]
	fn backup_and_export_use_normalised_urls() {
		let space = Space {
			name: Some("Work".into()),
			tabs: vec![
				Tab {
					title: Some("Mail".into()),
					..Tab::new("chrome-extension://abc/suspended.html#ttl=x&uri=https://mail.example")
				},
				Tab::new("https://docs.example"),
			],
			..Default::default()
		};
		let backup = backup_spaces(std::slice::from_ref(&space));
		assert_eq!(
			serde_json::to_value(&backup).unwrap(),
			json!([{
				"name": "Work",
				"tabs": [
					{ "title": "Mail", "url": "https://mail.example" },
					{ "url": "https://docs.example" },
				],
			}])
		);
		assert_eq!(export_urls(&space), "https://mail.example\nhttps://docs.example\n");
		assert_eq!(export_file_name(&Space::default()), "untitled.txt");
	}

	#[tokio::test]
	async fn imported_sessions_get_numbered_names() {
		let store = MemorySessionStore::new();
		let first = import_urls(&store, &["https://a.example".into()], 1).await.unwrap();
		let second = import_urls(&store, &["https://b.example".into()], 2).await.unwrap();
		assert_eq!(first.name.as_deref(), Some("Imported space: 1"));
		assert_eq!(second.name.as_deref(), Some("Imported space: 2"));
		assert_eq!(second.tabs[0].url, "https://b.example");
	}

	#[tokio::test]
	async fn restore_respects_existing_names() {
		let store = MemorySessionStore::with_sessions(vec![Session::named("Work", vec![])]);
		let space = Space {
			name: Some("work".into()),
			tabs: vec![Tab::new("https://a.example")],
			..Default::default()
		};
		assert!(restore_space(&store, space.clone(), false, 0).await.is_err());
		let restored = restore_space(&store, space, true, 0).await.unwrap();
		assert_eq!(store.snapshot().len(), 1);
		assert_eq!(restored.window_id, None);
	}
}
