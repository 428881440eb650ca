//! Replies and push messages exchanged with UI surfaces.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::{TabId, WindowId};
use crate::model::Space;

/// Answer produced by the dispatcher for one request.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
	/// Send this value back to the caller.
	Value(Value),
	/// Send nothing; the caller's response callback is never invoked.
	Silent,
}

impl Reply {
	pub fn value<T: Serialize>(value: &T) -> serde_json::Result<Self> {
		Ok(Reply::Value(serde_json::to_value(value)?))
	}

	pub fn bool(flag: bool) -> Self {
		Reply::Value(Value::Bool(flag))
	}

	pub fn null() -> Self {
		Reply::Value(Value::Null)
	}

	pub fn is_silent(&self) -> bool {
		matches!(self, Reply::Silent)
	}

	/// Whether the reply reads as success: not silent, `false`, `null`, or `""`.
	pub fn is_truthy(&self) -> bool {
		match self {
			Reply::Silent => false,
			Reply::Value(Value::Null | Value::Bool(false)) => false,
			Reply::Value(Value::String(text)) => !text.is_empty(),
			Reply::Value(_) => true,
		}
	}

	pub fn into_value(self) -> Option<Value> {
		match self {
			Reply::Value(value) => Some(value),
			Reply::Silent => None,
		}
	}
}

/// Opaque context describing who sent a request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSender {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub url: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tab_id: Option<TabId>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub window_id: Option<WindowId>,
}

/// Unsolicited message broadcast to every listening UI surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum PushMessage {
	/// The dashboard's data may be stale; here is a fresh copy.
	UpdateSpaces { spaces: Vec<Space> },
}
