//! Action plumbing: parse + execute contract and failure sentinels.

use std::future::Future;
use std::pin::Pin;

use serde::Serialize;
use serde_json::Value;
use spaces_protocol::{MessageSender, Reply};

use super::request::RawRequest;
use crate::engine::Engine;
use crate::error::Result;

/// Boxing alias: async in trait without `async_trait`.
pub type BoxFut<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// What an action answers when it cannot succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentinel {
	False,
	True,
	Null,
	EmptyString,
	EmptyList,
	/// Send no response at all.
	Silent,
}

impl Sentinel {
	pub fn reply(self) -> Reply {
		match self {
			Sentinel::False => Reply::bool(false),
			Sentinel::True => Reply::bool(true),
			Sentinel::Null => Reply::null(),
			Sentinel::EmptyString => Reply::Value(Value::String(String::new())),
			Sentinel::EmptyList => Reply::Value(Value::Array(Vec::new())),
			Sentinel::Silent => Reply::Silent,
		}
	}
}

/// Static facts about an action, read by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionTraits {
	pub failure: Sentinel,
	/// A truthy reply means stored sessions changed; the dashboard is refreshed.
	pub mutating: bool,
	/// Issued from the popup, which is closed once the handler has run.
	pub closes_popup: bool,
}

/// Canonical action trait. Each action becomes
/// `pub struct XxxAction; impl ActionDef for XxxAction { ... }`
pub trait ActionDef: 'static {
	const FAILURE: Sentinel;
	const MUTATING: bool = false;
	const CLOSES_POPUP: bool = false;

	type Params;

	/// Extracts parameters. `None` when a required one is missing or malformed;
	/// the handler then never runs.
	fn parse(request: &RawRequest<'_>) -> Option<Self::Params>;

	fn execute<'a>(engine: &'a Engine, params: Self::Params, sender: &'a MessageSender) -> BoxFut<'a, Result<Reply>>;
}

/// Serializes `value`, or answers `absent` when there is none.
pub(crate) fn reply_or<T: Serialize>(value: Option<T>, absent: Sentinel) -> Result<Reply> {
	match value {
		Some(value) => Ok(Reply::value(&value)?),
		None => Ok(absent.reply()),
	}
}
