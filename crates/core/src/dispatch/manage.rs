//! Actions that create, rename, or delete sessions.

use spaces_protocol::{MessageSender, Reply, SessionId, Space, WindowId};

use super::def::{ActionDef, BoxFut, Sentinel};
use super::request::RawRequest;
use crate::engine::Engine;
use crate::error::Result;

pub struct SaveNewSessionAction;

impl ActionDef for SaveNewSessionAction {
	const FAILURE: Sentinel = Sentinel::False;
	const MUTATING: bool = true;

	type Params = (WindowId, String, bool);

	fn parse(request: &RawRequest<'_>) -> Option<Self::Params> {
		Some((request.id("windowId")?, request.text("sessionName")?, request.flag("deleteOld")))
	}

	fn execute<'a>(
		engine: &'a Engine,
		(window_id, name, delete_old): Self::Params,
		_sender: &'a MessageSender,
	) -> BoxFut<'a, Result<Reply>> {
		Box::pin(async move { Ok(Reply::value(&engine.save_new_session(window_id, &name, delete_old).await?)?) })
	}
}

pub struct ImportNewSessionAction;

impl ActionDef for ImportNewSessionAction {
	const FAILURE: Sentinel = Sentinel::Null;
	const MUTATING: bool = true;

	type Params = Vec<String>;

	fn parse(request: &RawRequest<'_>) -> Option<Self::Params> {
		request.decode("urlList")
	}

	fn execute<'a>(engine: &'a Engine, urls: Self::Params, _sender: &'a MessageSender) -> BoxFut<'a, Result<Reply>> {
		Box::pin(async move { Ok(Reply::value(&engine.import_new_session(&urls).await?)?) })
	}
}

pub struct RestoreFromBackupAction;

impl ActionDef for RestoreFromBackupAction {
	const FAILURE: Sentinel = Sentinel::Null;
	const MUTATING: bool = true;

	type Params = (Space, bool);

	fn parse(request: &RawRequest<'_>) -> Option<Self::Params> {
		Some((request.decode("space")?, request.flag("deleteOld")))
	}

	fn execute<'a>(engine: &'a Engine, (space, delete_old): Self::Params, _sender: &'a MessageSender) -> BoxFut<'a, Result<Reply>> {
		Box::pin(async move { Ok(Reply::value(&engine.restore_from_backup(space, delete_old).await?)?) })
	}
}

pub struct DeleteSessionAction;

impl ActionDef for DeleteSessionAction {
	const FAILURE: Sentinel = Sentinel::False;
	const MUTATING: bool = true;

	type Params = SessionId;

	fn parse(request: &RawRequest<'_>) -> Option<Self::Params> {
		request.id("sessionId")
	}

	fn execute<'a>(engine: &'a Engine, session_id: Self::Params, _sender: &'a MessageSender) -> BoxFut<'a, Result<Reply>> {
		Box::pin(async move { Ok(Reply::bool(engine.delete_session(session_id).await?)) })
	}
}

pub struct UpdateSessionNameAction;

impl ActionDef for UpdateSessionNameAction {
	const FAILURE: Sentinel = Sentinel::False;
	const MUTATING: bool = true;

	type Params = (SessionId, String, bool);

	fn parse(request: &RawRequest<'_>) -> Option<Self::Params> {
		Some((request.id("sessionId")?, request.text("sessionName")?, request.flag("deleteOld")))
	}

	fn execute<'a>(
		engine: &'a Engine,
		(session_id, name, delete_old): Self::Params,
		_sender: &'a MessageSender,
	) -> BoxFut<'a, Result<Reply>> {
		Box::pin(async move { Ok(Reply::value(&engine.update_session_name(session_id, &name, delete_old).await?)?) })
	}
}
