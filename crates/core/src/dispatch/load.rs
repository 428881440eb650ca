//! Actions that open, focus, or close windows.

use spaces_protocol::{MessageSender, Reply, SessionId, WindowId};

use super::def::{ActionDef, BoxFut, Sentinel};
use super::request::RawRequest;
use crate::engine::Engine;
use crate::error::Result;

pub struct LoadSessionAction;

impl ActionDef for LoadSessionAction {
	const FAILURE: Sentinel = Sentinel::Silent;

	type Params = (SessionId, Option<String>);

	fn parse(request: &RawRequest<'_>) -> Option<Self::Params> {
		Some((request.id("sessionId")?, request.text("tabUrl")))
	}

	fn execute<'a>(engine: &'a Engine, (session_id, tab_url): Self::Params, _sender: &'a MessageSender) -> BoxFut<'a, Result<Reply>> {
		Box::pin(async move {
			engine.load_session(session_id, tab_url.as_deref()).await?;
			Ok(Reply::bool(true))
		})
	}
}

pub struct LoadWindowAction;

impl ActionDef for LoadWindowAction {
	const FAILURE: Sentinel = Sentinel::Silent;

	type Params = (WindowId, Option<String>);

	fn parse(request: &RawRequest<'_>) -> Option<Self::Params> {
		Some((request.id("windowId")?, request.text("tabUrl")))
	}

	fn execute<'a>(engine: &'a Engine, (window_id, tab_url): Self::Params, _sender: &'a MessageSender) -> BoxFut<'a, Result<Reply>> {
		Box::pin(async move {
			engine.load_window(window_id, tab_url.as_deref()).await?;
			Ok(Reply::bool(true))
		})
	}
}

/// Like [`LoadSessionAction`], but the tab URL is required.
pub struct LoadTabInSessionAction;

impl ActionDef for LoadTabInSessionAction {
	const FAILURE: Sentinel = Sentinel::Silent;

	type Params = (SessionId, String);

	fn parse(request: &RawRequest<'_>) -> Option<Self::Params> {
		Some((request.id("sessionId")?, request.text("tabUrl")?))
	}

	fn execute<'a>(engine: &'a Engine, (session_id, tab_url): Self::Params, _sender: &'a MessageSender) -> BoxFut<'a, Result<Reply>> {
		Box::pin(async move {
			engine.load_session(session_id, Some(&tab_url)).await?;
			Ok(Reply::bool(true))
		})
	}
}

pub struct LoadTabInWindowAction;

impl ActionDef for LoadTabInWindowAction {
	const FAILURE: Sentinel = Sentinel::Silent;

	type Params = (WindowId, String);

	fn parse(request: &RawRequest<'_>) -> Option<Self::Params> {
		Some((request.id("windowId")?, request.text("tabUrl")?))
	}

	fn execute<'a>(engine: &'a Engine, (window_id, tab_url): Self::Params, _sender: &'a MessageSender) -> BoxFut<'a, Result<Reply>> {
		Box::pin(async move {
			engine.load_window(window_id, Some(&tab_url)).await?;
			Ok(Reply::bool(true))
		})
	}
}

pub struct CloseWindowAction;

impl ActionDef for CloseWindowAction {
	const FAILURE: Sentinel = Sentinel::False;

	type Params = WindowId;

	fn parse(request: &RawRequest<'_>) -> Option<Self::Params> {
		request.id("windowId")
	}

	fn execute<'a>(engine: &'a Engine, window_id: Self::Params, _sender: &'a MessageSender) -> BoxFut<'a, Result<Reply>> {
		Box::pin(async move {
			engine.close_window(window_id).await?;
			Ok(Reply::bool(true))
		})
	}
}

/// Always answers `true`, whether or not the switch worked.
pub struct SwitchToSpaceAction;

impl ActionDef for SwitchToSpaceAction {
	const FAILURE: Sentinel = Sentinel::True;

	type Params = (Option<WindowId>, Option<SessionId>);

	fn parse(request: &RawRequest<'_>) -> Option<Self::Params> {
		Some((request.id("windowId"), request.id("sessionId")))
	}

	fn execute<'a>(
		engine: &'a Engine,
		(window_id, session_id): Self::Params,
		_sender: &'a MessageSender,
	) -> BoxFut<'a, Result<Reply>> {
		Box::pin(async move {
			engine.switch_to_space(window_id, session_id).await;
			Ok(Reply::bool(true))
		})
	}
}
