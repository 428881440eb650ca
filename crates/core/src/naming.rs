//! Case-insensitive session name uniqueness.

use spaces_protocol::{Session, SessionId};
use tracing::info;

use crate::error::{Result, SpacesError};
use crate::store::SessionStore;

/// Outcome of checking a candidate name against the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameResolution {
	/// Nobody holds the name.
	Free,
	/// The holder is the session being renamed; only letter casing changes.
	SelfRename,
	/// Another session holds the name and overwriting is allowed.
	Replace(SessionId),
	/// Another session holds the name and overwriting is not allowed.
	Rejected(SessionId),
}

impl NameResolution {
	pub fn proceed(self) -> bool {
		!matches!(self, NameResolution::Rejected(_))
	}

	/// Session the caller must delete before writing.
	pub fn existing_to_delete(self) -> Option<SessionId> {
		match self {
			NameResolution::Replace(id) => Some(id),
			_ => None,
		}
	}
}

/// Decides what happens when `existing` already holds the candidate name.
pub fn resolve_name(existing: Option<&Session>, renaming: Option<SessionId>, allow_overwrite: bool) -> NameResolution {
	let Some(existing_id) = existing.and_then(|session| session.id) else {
		return NameResolution::Free;
	};
	if renaming == Some(existing_id) {
		NameResolution::SelfRename
	} else if allow_overwrite {
		NameResolution::Replace(existing_id)
	} else {
		NameResolution::Rejected(existing_id)
	}
}

pub async fn resolve_conflict(
	store: &dyn SessionStore,
	candidate: &str,
	renaming: Option<SessionId>,
	allow_overwrite: bool,
) -> Result<NameResolution> {
	let existing = store.session_by_name(candidate).await?;
	Ok(resolve_name(existing.as_ref(), renaming, allow_overwrite))
}

/// Clears the way for writing `candidate`.
///
/// Deletes the current holder when overwriting is allowed and fails with
/// [`SpacesError::Conflict`] when it is not.
pub async fn claim_name(
	store: &dyn SessionStore,
	candidate: &str,
	renaming: Option<SessionId>,
	allow_overwrite: bool,
) -> Result<NameResolution> {
	let resolution = resolve_conflict(store, candidate, renaming, allow_overwrite).await?;
	match resolution {
		NameResolution::Rejected(_) => Err(SpacesError::Conflict {
			name: candidate.to_string(),
		}),
		NameResolution::Replace(existing) => {
			info!(target = "spaces.naming", name = candidate, session = %existing, "replacing session holding name");
			store.delete(existing).await?;
			Ok(resolution)
		}
		NameResolution::Free | NameResolution::SelfRename => Ok(resolution),
	}
}

/// First free `"{prefix}{n}"` for `n` counting up from 1.
pub async fn first_free_name(store: &dyn SessionStore, prefix: &str) -> Result<String> {
	let sessions = store.sessions().await?;
	let mut count = 1usize;
	loop {
		let candidate = format!("{prefix}{count}");
		if !sessions.iter().any(|session| session.has_name(&candidate)) {
			return Ok(candidate);
		}
		count += 1;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::memory::MemorySessionStore;

	fn stored(id: i64, name: &str) -> Session {
		Session {
			id: Some(SessionId(id)),
			..Session::named(name, vec![])
		}
	}

	#[test]
	fn resolution_rules() {
		let work = stored(1, "Work");
		assert_eq!(resolve_name(None, None, false), NameResolution::Free);
		assert_eq!(resolve_name(Some(&work), Some(SessionId(1)), false), NameResolution::SelfRename);
		assert_eq!(resolve_name(Some(&work), Some(SessionId(2)), false), NameResolution::Rejected(SessionId(1)));
		assert_eq!(resolve_name(Some(&work), None, true), NameResolution::Replace(SessionId(1)));
		assert!(!NameResolution::Rejected(SessionId(1)).proceed());
		assert_eq!(NameResolution::SelfRename.existing_to_delete(), None);
	}

	#[tokio::test]
	async fn claim_deletes_the_holder_when_overwriting() {
		let store = MemorySessionStore::with_sessions(vec![stored(1, "Work"), stored(2, "Play")]);

		let err = claim_name(&store, "work", Some(SessionId(2)), false).await.unwrap_err();
		assert!(matches!(err, SpacesError::Conflict { .. }));
		assert_eq!(store.snapshot().len(), 2);

		let resolution = claim_name(&store, "WORK", Some(SessionId(2)), true).await.unwrap();
		assert_eq!(resolution, NameResolution::Replace(SessionId(1)));
		assert_eq!(store.snapshot().len(), 1);
	}

	#[tokio::test]
	async fn first_free_name_skips_taken_numbers() {
		let store = MemorySessionStore::with_sessions(vec![stored(1, "Imported space: 1"), stored(2, "imported SPACE: 2")]);
		assert_eq!(first_free_name(&store, "Imported space: ").await.unwrap(), "Imported space: 3");
	}
}
