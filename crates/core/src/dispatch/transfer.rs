//! Popup actions that move links and tabs into spaces.

use spaces_protocol::{MessageSender, Reply, SessionId, TabId, WindowId};

use super::def::{ActionDef, BoxFut, Sentinel, reply_or};
use super::request::RawRequest;
use crate::engine::Engine;
use crate::error::Result;

pub struct AddLinkToNewSessionAction;

impl ActionDef for AddLinkToNewSessionAction {
	const FAILURE: Sentinel = Sentinel::Null;
	const MUTATING: bool = true;
	const CLOSES_POPUP: bool = true;

	type Params = (String, String);

	fn parse(request: &RawRequest<'_>) -> Option<Self::Params> {
		Some((request.text("url")?, request.text("sessionName")?))
	}

	fn execute<'a>(engine: &'a Engine, (url, name): Self::Params, _sender: &'a MessageSender) -> BoxFut<'a, Result<Reply>> {
		Box::pin(async move { Ok(Reply::value(&engine.add_link_to_new_session(&url, &name).await?)?) })
	}
}

pub struct MoveTabToNewSessionAction;

impl ActionDef for MoveTabToNewSessionAction {
	const FAILURE: Sentinel = Sentinel::Null;
	const MUTATING: bool = true;
	const CLOSES_POPUP: bool = true;

	type Params = (TabId, String);

	fn parse(request: &RawRequest<'_>) -> Option<Self::Params> {
		Some((request.id("tabId")?, request.text("sessionName")?))
	}

	fn execute<'a>(engine: &'a Engine, (tab_id, name): Self::Params, _sender: &'a MessageSender) -> BoxFut<'a, Result<Reply>> {
		Box::pin(async move { reply_or(engine.move_tab_to_new_session(tab_id, &name).await?, Self::FAILURE) })
	}
}

pub struct AddLinkToSessionAction;

impl ActionDef for AddLinkToSessionAction {
	const FAILURE: Sentinel = Sentinel::False;
	const MUTATING: bool = true;
	const CLOSES_POPUP: bool = true;

	type Params = (String, SessionId);

	fn parse(request: &RawRequest<'_>) -> Option<Self::Params> {
		Some((request.text("url")?, request.id("sessionId")?))
	}

	fn execute<'a>(engine: &'a Engine, (url, session_id): Self::Params, _sender: &'a MessageSender) -> BoxFut<'a, Result<Reply>> {
		Box::pin(async move { Ok(Reply::bool(engine.add_link_to_session(&url, session_id).await?)) })
	}
}

pub struct MoveTabToSessionAction;

impl ActionDef for MoveTabToSessionAction {
	const FAILURE: Sentinel = Sentinel::False;
	const MUTATING: bool = true;
	const CLOSES_POPUP: bool = true;

	type Params = (TabId, SessionId);

	fn parse(request: &RawRequest<'_>) -> Option<Self::Params> {
		Some((request.id("tabId")?, request.id("sessionId")?))
	}

	fn execute<'a>(engine: &'a Engine, (tab_id, session_id): Self::Params, _sender: &'a MessageSender) -> BoxFut<'a, Result<Reply>> {
		Box::pin(async move { Ok(Reply::bool(engine.move_tab_to_session(tab_id, session_id).await?)) })
	}
}

pub struct AddLinkToWindowAction;

impl ActionDef for AddLinkToWindowAction {
	const FAILURE: Sentinel = Sentinel::False;
	const MUTATING: bool = true;
	const CLOSES_POPUP: bool = true;

	type Params = (String, WindowId);

	fn parse(request: &RawRequest<'_>) -> Option<Self::Params> {
		Some((request.text("url")?, request.id("windowId")?))
	}

	fn execute<'a>(engine: &'a Engine, (url, window_id): Self::Params, _sender: &'a MessageSender) -> BoxFut<'a, Result<Reply>> {
		Box::pin(async move {
			engine.add_link_to_window(&url, window_id).await?;
			Ok(Reply::bool(true))
		})
	}
}

pub struct MoveTabToWindowAction;

impl ActionDef for MoveTabToWindowAction {
	const FAILURE: Sentinel = Sentinel::False;
	const MUTATING: bool = true;
	const CLOSES_POPUP: bool = true;

	type Params = (TabId, WindowId);

	fn parse(request: &RawRequest<'_>) -> Option<Self::Params> {
		Some((request.id("tabId")?, request.id("windowId")?))
	}

	fn execute<'a>(engine: &'a Engine, (tab_id, window_id): Self::Params, _sender: &'a MessageSender) -> BoxFut<'a, Result<Reply>> {
		Box::pin(async move { Ok(Reply::bool(engine.move_tab_to_window(tab_id, window_id).await?)) })
	}
}
