#[cfg(test)]
mod tests;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::styles::cli_styles;

/// Manage saved spaces outside the browser.
#[derive(Parser, Debug)]
#[command(name = "spaces")]
#[command(about = "Spaces - list, rename, import, and back up saved browser spaces")]
#[command(version)]
#[command(styles = cli_styles())]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Session store file (defaults to the user data directory)
	#[arg(long, global = true, value_name = "FILE", env = "SPACES_STORE")]
	pub store: Option<PathBuf>,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
	/// List saved spaces, most recently used first.
	List,
	/// Show the tabs and closed-tab history of one space.
	Show {
		/// Space name (case-insensitive)
		name: String,
	},
	/// Rename a space.
	Rename(RenameArgs),
	/// Delete a space.
	Delete {
		/// Space name (case-insensitive)
		name: String,
	},
	/// Import a JSON backup or a file of URLs, one per line.
	Import(ImportArgs),
	/// Write a JSON backup of every space.
	Backup {
		/// Output file; stdout when omitted
		#[arg(long, short, value_name = "FILE")]
		out: Option<PathBuf>,
	},
	/// Export one space's URLs, one per line.
	Export {
		/// Space name (case-insensitive)
		name: String,
		/// Directory to write `<name>.txt` into; stdout when omitted
		#[arg(long, short, value_name = "DIR")]
		out: Option<PathBuf>,
	},
}

#[derive(Args, Debug, Clone)]
pub struct RenameArgs {
	/// Current name
	pub from: String,
	/// New name
	pub to: String,
	/// Replace a different space already holding the new name
	#[arg(long)]
	pub force: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ImportArgs {
	/// File holding a backup or a URL list
	#[arg(value_name = "FILE")]
	pub file: PathBuf,
	/// Replace existing spaces whose names collide with imported ones
	#[arg(long)]
	pub force: bool,
}
