use thiserror::Error;

pub type Result<T> = std::result::Result<T, SpacesError>;

#[derive(Debug, Error)]
pub enum SpacesError {
	/// A window, tab, or session no longer exists. A normal negative result.
	#[error("{kind} {id} not found")]
	NotFound { kind: &'static str, id: i64 },

	#[error("a session named \"{name}\" already exists")]
	Conflict { name: String },

	#[error("invalid input: {0}")]
	InvalidInput(String),

	#[error("browser call failed: {0}")]
	Browser(String),

	#[error("session store failed: {0}")]
	Store(String),

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Json(#[from] serde_json::Error),
}

impl SpacesError {
	pub fn window_not_found(id: impl Into<i64>) -> Self {
		SpacesError::NotFound { kind: "window", id: id.into() }
	}

	pub fn tab_not_found(id: impl Into<i64>) -> Self {
		SpacesError::NotFound { kind: "tab", id: id.into() }
	}

	pub fn session_not_found(id: impl Into<i64>) -> Self {
		SpacesError::NotFound { kind: "session", id: id.into() }
	}

	pub fn is_not_found(&self) -> bool {
		matches!(self, SpacesError::NotFound { .. })
	}
}

/// Turns a `NotFound` error into `Ok(None)`, passing other errors through.
pub trait OptionalExt<T> {
	fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for Result<T> {
	fn optional(self) -> Result<Option<T>> {
		match self {
			Ok(value) => Ok(Some(value)),
			Err(err) if err.is_not_found() => Ok(None),
			Err(err) => Err(err),
		}
	}
}
