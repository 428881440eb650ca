//! Actions that show or hide the utility windows. None of them answer.

use spaces_protocol::{MessageSender, Reply, WindowId};

use super::def::{ActionDef, BoxFut, Sentinel};
use super::request::RawRequest;
use crate::engine::Engine;
use crate::error::Result;

pub struct PopupParamsAction;

impl ActionDef for PopupParamsAction {
	const FAILURE: Sentinel = Sentinel::EmptyString;

	type Params = (String, Option<String>);

	fn parse(request: &RawRequest<'_>) -> Option<Self::Params> {
		Some((request.text("popupAction")?, request.text("tabUrl")))
	}

	fn execute<'a>(engine: &'a Engine, (action, tab_url): Self::Params, _sender: &'a MessageSender) -> BoxFut<'a, Result<Reply>> {
		Box::pin(async move { Ok(Reply::value(&engine.generate_popup_params(&action, tab_url.as_deref()).await?)?) })
	}
}

pub struct ShowSpacesAction;

impl ActionDef for ShowSpacesAction {
	const FAILURE: Sentinel = Sentinel::Silent;

	type Params = (Option<WindowId>, bool);

	fn parse(request: &RawRequest<'_>) -> Option<Self::Params> {
		Some((request.id("windowId"), request.flag("edit")))
	}

	fn execute<'a>(engine: &'a Engine, (window_id, edit): Self::Params, _sender: &'a MessageSender) -> BoxFut<'a, Result<Reply>> {
		Box::pin(async move {
			engine.show_dashboard(window_id, edit).await?;
			Ok(Reply::Silent)
		})
	}
}

pub struct ShowSwitcherAction;

impl ActionDef for ShowSwitcherAction {
	const FAILURE: Sentinel = Sentinel::Silent;

	type Params = ();

	fn parse(_request: &RawRequest<'_>) -> Option<Self::Params> {
		Some(())
	}

	fn execute<'a>(engine: &'a Engine, _params: Self::Params, _sender: &'a MessageSender) -> BoxFut<'a, Result<Reply>> {
		Box::pin(async move {
			engine.show_popup("switch", None).await?;
			Ok(Reply::Silent)
		})
	}
}

pub struct ShowMoverAction;

impl ActionDef for ShowMoverAction {
	const FAILURE: Sentinel = Sentinel::Silent;

	type Params = ();

	fn parse(_request: &RawRequest<'_>) -> Option<Self::Params> {
		Some(())
	}

	fn execute<'a>(engine: &'a Engine, _params: Self::Params, _sender: &'a MessageSender) -> BoxFut<'a, Result<Reply>> {
		Box::pin(async move {
			engine.show_popup("move", None).await?;
			Ok(Reply::Silent)
		})
	}
}

pub struct ShowShortcutsAction;

impl ActionDef for ShowShortcutsAction {
	const FAILURE: Sentinel = Sentinel::Silent;

	type Params = ();

	fn parse(_request: &RawRequest<'_>) -> Option<Self::Params> {
		Some(())
	}

	fn execute<'a>(engine: &'a Engine, _params: Self::Params, _sender: &'a MessageSender) -> BoxFut<'a, Result<Reply>> {
		Box::pin(async move {
			engine.show_keyboard_shortcuts().await?;
			Ok(Reply::Silent)
		})
	}
}

pub struct CloseAction;

impl ActionDef for CloseAction {
	const FAILURE: Sentinel = Sentinel::Silent;

	type Params = ();

	fn parse(_request: &RawRequest<'_>) -> Option<Self::Params> {
		Some(())
	}

	fn execute<'a>(engine: &'a Engine, _params: Self::Params, _sender: &'a MessageSender) -> BoxFut<'a, Result<Reply>> {
		Box::pin(async move {
			engine.close_popup().await;
			Ok(Reply::Silent)
		})
	}
}
