//! Recovering utility window ids after the background context restarts.
//!
//! Verification of the cached id comes first; a content search over live
//! windows second. Never creates a window.

use serde_json::Value;
use spaces_protocol::WindowId;
use tracing::{debug, info};

use crate::engine::{Engine, tab_points_at};
use crate::error::Result;
use crate::utility::UtilityKind;

fn cached_window_id(value: &Value) -> Option<WindowId> {
	value.as_i64().filter(|id| *id > 0).map(WindowId)
}

impl Engine {
	/// Finds the live window for `kind`, refreshing the scratch cache.
	pub async fn rediscover(&self, kind: UtilityKind) -> Result<Option<WindowId>> {
		let key = kind.scratch_key(&self.config);

		if let Some(cached) = self.scratch.get(key).await?.as_ref().and_then(cached_window_id) {
			match self.browser.window(cached, false).await {
				Ok(_) => {
					debug!(target = "spaces.rediscovery", kind = kind.label(), window = %cached, "cached window verified");
					return Ok(Some(cached));
				}
				Err(err) => {
					debug!(target = "spaces.rediscovery", kind = kind.label(), window = %cached, error = %err, "dropping stale cached window");
					self.scratch.remove(key).await?;
				}
			}
		}

		let prefix = self.browser.resource_url(kind.path(&self.config));
		let windows = self.browser.windows(true).await?;
		let found = windows
			.iter()
			.find(|window| window.tabs.first().is_some_and(|tab| tab_points_at(tab, &prefix)))
			.map(|window| window.id);

		if let Some(window_id) = found {
			self.scratch.set(key, Value::from(window_id.get())).await?;
			info!(target = "spaces.rediscovery", kind = kind.label(), window = %window_id, "utility window rediscovered");
		}
		Ok(found)
	}

	/// Rediscovers both utility windows and fills their slots.
	///
	/// A slot that was assigned while the search was suspended is not
	/// overwritten with "not found".
	pub async fn rediscover_all(&self) -> Result<()> {
		for kind in UtilityKind::ALL {
			let found = self.rediscover(kind).await?;
			if found.is_some() || self.state.slots.get(kind).is_none() {
				self.state.slots.set(kind, found);
			}
		}
		Ok(())
	}
}
