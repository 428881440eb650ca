//! Runtime and durable identifiers.
//!
//! Window and tab ids are assigned by the window manager and are only valid
//! for the lifetime of the browser process. Session ids are assigned by the
//! session store and survive restarts.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! numeric_id {
	($(#[$meta:meta])* $name:ident) => {
		$(#[$meta])*
		#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(pub i64);

		impl $name {
			pub fn get(self) -> i64 {
				self.0
			}
		}

		impl From<i64> for $name {
			fn from(value: i64) -> Self {
				Self(value)
			}
		}

		impl From<$name> for i64 {
			fn from(id: $name) -> Self {
				id.0
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				self.0.fmt(f)
			}
		}
	};
}

numeric_id!(
	/// Runtime window identifier, reassigned when the browser restarts.
	WindowId
);

numeric_id!(
	/// Runtime tab identifier.
	TabId
);

numeric_id!(
	/// Durable session identifier owned by the session store.
	SessionId
);

impl WindowId {
	/// Sentinel the window manager reports when focus leaves every window.
	pub const NONE: WindowId = WindowId(-1);
}

impl Default for WindowId {
	fn default() -> Self {
		WindowId::NONE
	}
}
