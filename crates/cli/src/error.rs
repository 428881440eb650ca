use std::path::PathBuf;

use spaces::SpacesError;
use spaces::import::ImportError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
	#[error("no session named \"{0}\"")]
	UnknownSession(String),

	#[error("a session named \"{0}\" already exists (use --force to replace it)")]
	NameTaken(String),

	#[error("store file {} is not a session store", path.display())]
	CorruptStore {
		path: PathBuf,
		#[source]
		source: serde_json::Error,
	},

	#[error("store file {} has schema {found}, newer than this tool understands ({supported})", path.display())]
	UnsupportedSchema { path: PathBuf, found: u32, supported: u32 },

	#[error("no default data directory; pass --store")]
	NoDataDir,

	#[error(transparent)]
	Import(#[from] ImportError),

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Json(#[from] serde_json::Error),

	#[error(transparent)]
	Spaces(SpacesError),
}

impl From<SpacesError> for CliError {
	fn from(err: SpacesError) -> Self {
		match err {
			SpacesError::Conflict { name } => CliError::NameTaken(name),
			other => CliError::Spaces(other),
		}
	}
}

impl CliError {
	/// Process exit code: 2 for problems with the user's request, 1 otherwise.
	pub fn exit_code(&self) -> i32 {
		match self {
			CliError::UnknownSession(_) | CliError::NameTaken(_) | CliError::Import(_) => 2,
			_ => 1,
		}
	}
}
