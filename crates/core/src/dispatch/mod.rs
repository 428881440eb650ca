//! Message dispatch: maps tagged requests from the dashboard and popup onto engine
//! operations and shapes the reply.
//!
//! Every action answers with its own failure sentinel when it cannot succeed;
//! handler errors and panics never escape this module.

pub mod def;
mod load;
mod manage;
mod popup;
mod query;
pub mod registry;
pub mod request;
mod transfer;

use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;
use serde_json::Value;
use spaces_protocol::{MessageSender, Reply};
use tracing::{debug, error, warn};

pub use def::{ActionTraits, Sentinel};
pub use registry::{ActionId, action_name, action_traits, lookup_action};
pub use request::RawRequest;

use crate::engine::Engine;

impl Engine {
	/// Handles one request object of the form `{action, ...params}`.
	///
	/// Unknown or missing actions get no response.
	pub async fn dispatch(&self, message: &Value, sender: &MessageSender) -> Reply {
		let request = RawRequest::new(message);
		let Some(action) = request.action() else {
			debug!(target = "spaces.dispatch", "request without action ignored");
			return Reply::Silent;
		};
		let Some(id) = lookup_action(action) else {
			debug!(target = "spaces.dispatch", action, "unknown action ignored");
			return Reply::Silent;
		};
		let traits = action_traits(id);

		let outcome = AssertUnwindSafe(registry::run_action(id, self, &request, sender))
			.catch_unwind()
			.await;

		let reply = match outcome {
			Ok(None) => {
				debug!(target = "spaces.dispatch", action, "invalid parameters");
				return traits.failure.reply();
			}
			Ok(Some(Ok(reply))) => reply,
			Ok(Some(Err(err))) => {
				if err.is_not_found() {
					debug!(target = "spaces.dispatch", action, error = %err, "action failed");
				} else {
					warn!(target = "spaces.dispatch", action, error = %err, "action failed");
				}
				traits.failure.reply()
			}
			Err(_) => {
				error!(target = "spaces.dispatch", action, "action panicked");
				traits.failure.reply()
			}
		};

		if traits.closes_popup {
			self.close_popup().await;
		}
		if traits.mutating && reply.is_truthy() {
			self.refresh_dashboard().await;
		}
		reply
	}
}
