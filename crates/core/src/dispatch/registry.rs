//! Action registry and generated dispatch glue.

use spaces_protocol::{MessageSender, Reply};

use super::def::{ActionDef, ActionTraits};
use super::request::RawRequest;
use crate::engine::Engine;
use crate::error::Result;

/// The registry macro: generates an `ActionId` enum, `lookup_action`, `action_traits`,
/// and `run_action`.
///
/// ```ignore
/// action_registry! {
///   LoadSession => super::load::LoadSessionAction { name: "loadSession" },
/// }
/// ```
macro_rules! action_registry {
	(
		$(
			$id:ident => $ty:path { name: $name:literal }
		),+ $(,)?
	) => {
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
		pub enum ActionId { $($id),+ }

		impl ActionId {
			pub const ALL: &'static [ActionId] = &[$(ActionId::$id),+];
		}

		pub fn lookup_action(name: &str) -> Option<ActionId> {
			match name {
				$( $name => Some(ActionId::$id), )+
				_ => None,
			}
		}

		pub fn action_name(id: ActionId) -> &'static str {
			match id {
				$( ActionId::$id => $name, )+
			}
		}

		pub fn action_traits(id: ActionId) -> ActionTraits {
			match id {
				$(
					ActionId::$id => {
						type Action = $ty;
						ActionTraits {
							failure: <Action as ActionDef>::FAILURE,
							mutating: <Action as ActionDef>::MUTATING,
							closes_popup: <Action as ActionDef>::CLOSES_POPUP,
						}
					}
				)+
			}
		}

		/// Runs an action by `ActionId`.
		///
		/// `None` means the parameters did not parse and the handler was never called.
		pub(crate) async fn run_action(
			id: ActionId,
			engine: &Engine,
			request: &RawRequest<'_>,
			sender: &MessageSender,
		) -> Option<Result<Reply>> {
			match id {
				$(
					ActionId::$id => {
						type Action = $ty;
						let params = <Action as ActionDef>::parse(request)?;
						Some(<Action as ActionDef>::execute(engine, params, sender).await)
					}
				)+
			}
		}
	};
}

action_registry! {
	SessionPresence => super::query::SessionPresenceAction { name: "requestSessionPresence" },
	SpaceFromWindowId => super::query::SpaceFromWindowAction { name: "requestSpaceFromWindowId" },
	CurrentSpace => super::query::CurrentSpaceAction { name: "requestCurrentSpace" },
	SpaceDetail => super::query::SpaceDetailAction { name: "requestSpaceDetail" },
	AllSpaces => super::query::AllSpacesAction { name: "requestAllSpaces" },
	TabDetail => super::query::TabDetailAction { name: "requestTabDetail" },
	PopupParams => super::popup::PopupParamsAction { name: "generatePopupParams" },
	ShowSpaces => super::popup::ShowSpacesAction { name: "requestShowSpaces" },
	ShowSwitcher => super::popup::ShowSwitcherAction { name: "requestShowSwitcher" },
	ShowMover => super::popup::ShowMoverAction { name: "requestShowMover" },
	ShowKeyboardShortcuts => super::popup::ShowShortcutsAction { name: "requestShowKeyboardShortcuts" },
	Close => super::popup::CloseAction { name: "requestClose" },
	LoadSession => super::load::LoadSessionAction { name: "loadSession" },
	LoadWindow => super::load::LoadWindowAction { name: "loadWindow" },
	LoadTabInSession => super::load::LoadTabInSessionAction { name: "loadTabInSession" },
	LoadTabInWindow => super::load::LoadTabInWindowAction { name: "loadTabInWindow" },
	CloseWindow => super::load::CloseWindowAction { name: "closeWindow" },
	SwitchToSpace => super::load::SwitchToSpaceAction { name: "switchToSpace" },
	SaveNewSession => super::manage::SaveNewSessionAction { name: "saveNewSession" },
	ImportNewSession => super::manage::ImportNewSessionAction { name: "importNewSession" },
	RestoreFromBackup => super::manage::RestoreFromBackupAction { name: "restoreFromBackup" },
	DeleteSession => super::manage::DeleteSessionAction { name: "deleteSession" },
	UpdateSessionName => super::manage::UpdateSessionNameAction { name: "updateSessionName" },
	AddLinkToNewSession => super::transfer::AddLinkToNewSessionAction { name: "addLinkToNewSession" },
	MoveTabToNewSession => super::transfer::MoveTabToNewSessionAction { name: "moveTabToNewSession" },
	AddLinkToSession => super::transfer::AddLinkToSessionAction { name: "addLinkToSession" },
	MoveTabToSession => super::transfer::MoveTabToSessionAction { name: "moveTabToSession" },
	AddLinkToWindow => super::transfer::AddLinkToWindowAction { name: "addLinkToWindow" },
	MoveTabToWindow => super::transfer::MoveTabToWindowAction { name: "moveTabToWindow" },
}
