//! Dashboard refresh with coalescing.
//!
//! One refresh runs at a time. Requests arriving while it runs collapse into
//! a single follow-up pass.

use std::cell::Cell;

use spaces_protocol::PushMessage;
use tracing::{debug, warn};

use crate::engine::Engine;
use crate::error::{OptionalExt, Result};
use crate::utility::UtilityKind;

#[derive(Debug, Default)]
pub struct RefreshGate {
	in_flight: Cell<bool>,
	pending: Cell<bool>,
}

impl RefreshGate {
	/// Enters the gate, or records a pending follow-up if a refresh is running.
	pub fn try_enter(&self) -> Option<RefreshGuard<'_>> {
		if self.in_flight.get() {
			self.pending.set(true);
			return None;
		}
		self.in_flight.set(true);
		Some(RefreshGuard { gate: self })
	}

	fn take_pending(&self) -> bool {
		self.pending.replace(false)
	}

	pub fn is_in_flight(&self) -> bool {
		self.in_flight.get()
	}
}

/// Leaves the gate when dropped.
pub struct RefreshGuard<'a> {
	gate: &'a RefreshGate,
}

impl Drop for RefreshGuard<'_> {
	fn drop(&mut self) {
		self.gate.in_flight.set(false);
	}
}

impl Engine {
	/// Pushes a fresh space list to the dashboard, if one is open.
	pub async fn refresh_dashboard(&self) {
		let Some(_guard) = self.state.refresh.try_enter() else {
			debug!(target = "spaces.refresh", "refresh coalesced");
			return;
		};
		loop {
			if let Err(err) = self.push_spaces().await {
				warn!(target = "spaces.refresh", error = %err, "dashboard refresh failed");
			}
			if !self.state.refresh.take_pending() {
				break;
			}
		}
	}

	async fn push_spaces(&self) -> Result<()> {
		if self.state.slots.get(UtilityKind::Dashboard).is_none() {
			self.rediscover_all().await?;
		}
		let Some(dashboard) = self.state.slots.get(UtilityKind::Dashboard) else {
			return Ok(());
		};
		if self.browser.window(dashboard, false).await.optional()?.is_none() {
			debug!(target = "spaces.refresh", window = %dashboard, "dashboard window gone");
			self.clear_slot(UtilityKind::Dashboard).await;
			return Ok(());
		}
		let spaces = self.all_spaces().await?;
		debug!(target = "spaces.refresh", count = spaces.len(), "broadcasting spaces");
		self.notifier.broadcast(&PushMessage::UpdateSpaces { spaces })
	}
}
