//! Read-only actions used by the dashboard and the popup.

use spaces_protocol::{MessageSender, Reply, SessionId, TabId, WindowId};

use super::def::{ActionDef, BoxFut, Sentinel, reply_or};
use super::request::RawRequest;
use crate::engine::Engine;
use crate::error::Result;

pub struct SessionPresenceAction;

impl ActionDef for SessionPresenceAction {
	const FAILURE: Sentinel = Sentinel::False;

	type Params = String;

	fn parse(request: &RawRequest<'_>) -> Option<Self::Params> {
		Some(request.text("sessionName").unwrap_or_default())
	}

	fn execute<'a>(engine: &'a Engine, name: Self::Params, _sender: &'a MessageSender) -> BoxFut<'a, Result<Reply>> {
		Box::pin(async move { Ok(Reply::value(&engine.session_presence(&name).await?)?) })
	}
}

pub struct SpaceFromWindowAction;

impl ActionDef for SpaceFromWindowAction {
	const FAILURE: Sentinel = Sentinel::False;

	type Params = (WindowId, bool);

	fn parse(request: &RawRequest<'_>) -> Option<Self::Params> {
		Some((request.id("windowId")?, request.flag("matchByTabs")))
	}

	fn execute<'a>(
		engine: &'a Engine,
		(window_id, match_by_tabs): Self::Params,
		_sender: &'a MessageSender,
	) -> BoxFut<'a, Result<Reply>> {
		Box::pin(async move { reply_or(engine.resolve_space(window_id, match_by_tabs).await?, Self::FAILURE) })
	}
}

pub struct CurrentSpaceAction;

impl ActionDef for CurrentSpaceAction {
	const FAILURE: Sentinel = Sentinel::False;

	type Params = ();

	fn parse(_request: &RawRequest<'_>) -> Option<Self::Params> {
		Some(())
	}

	fn execute<'a>(engine: &'a Engine, _params: Self::Params, _sender: &'a MessageSender) -> BoxFut<'a, Result<Reply>> {
		Box::pin(async move { reply_or(engine.current_space().await?, Self::FAILURE) })
	}
}

pub enum DetailTarget {
	Window(WindowId),
	Session(SessionId),
}

pub struct SpaceDetailAction;

impl ActionDef for SpaceDetailAction {
	const FAILURE: Sentinel = Sentinel::False;

	type Params = DetailTarget;

	fn parse(request: &RawRequest<'_>) -> Option<Self::Params> {
		request
			.id("windowId")
			.map(DetailTarget::Window)
			.or_else(|| request.id("sessionId").map(DetailTarget::Session))
	}

	fn execute<'a>(engine: &'a Engine, target: Self::Params, _sender: &'a MessageSender) -> BoxFut<'a, Result<Reply>> {
		Box::pin(async move {
			match target {
				DetailTarget::Window(window_id) => reply_or(engine.window_detail(window_id).await?, Sentinel::False),
				DetailTarget::Session(session_id) => reply_or(engine.session_detail(session_id).await?, Sentinel::Null),
			}
		})
	}
}

pub struct AllSpacesAction;

impl ActionDef for AllSpacesAction {
	const FAILURE: Sentinel = Sentinel::EmptyList;

	type Params = ();

	fn parse(_request: &RawRequest<'_>) -> Option<Self::Params> {
		Some(())
	}

	fn execute<'a>(engine: &'a Engine, _params: Self::Params, _sender: &'a MessageSender) -> BoxFut<'a, Result<Reply>> {
		Box::pin(async move { Ok(Reply::value(&engine.all_spaces().await?)?) })
	}
}

pub struct TabDetailAction;

impl ActionDef for TabDetailAction {
	const FAILURE: Sentinel = Sentinel::Null;

	type Params = TabId;

	fn parse(request: &RawRequest<'_>) -> Option<Self::Params> {
		request.id("tabId")
	}

	fn execute<'a>(engine: &'a Engine, tab_id: Self::Params, _sender: &'a MessageSender) -> BoxFut<'a, Result<Reply>> {
		Box::pin(async move {
			match engine.tab_detail(tab_id).await? {
				Some(tab) => Ok(Reply::value(&tab)?),
				None => {
					// The popup asked about a tab that is gone; it has nothing left to show.
					engine.close_popup().await;
					Ok(Reply::null())
				}
			}
		})
	}
}
