//! Subcommand implementations.
//!
//! Each command renders its report into a `String` so the binary decides where
//! it goes and tests can inspect it directly.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use colored::Colorize;
use spaces::SessionStore;
use spaces::import::{self, ImportPayload};
use spaces::matcher::sort_spaces;
use spaces_protocol::{Session, Space};
use tracing::info;

use crate::cli::{Commands, ImportArgs, RenameArgs};
use crate::error::{CliError, Result};
use crate::store::{FileSessionStore, save_json};

/// Runs one subcommand against `store` and returns what should be printed.
pub async fn execute(command: Commands, store: &FileSessionStore) -> Result<String> {
	match command {
		Commands::List => list(store).await,
		Commands::Show { name } => show(store, &name).await,
		Commands::Rename(args) => rename(store, args).await,
		Commands::Delete { name } => delete(store, &name).await,
		Commands::Import(args) => import_file(store, args).await,
		Commands::Backup { out } => backup(store, out.as_deref()).await,
		Commands::Export { name, out } => export(store, &name, out.as_deref()).await,
	}
}

fn now_millis() -> i64 {
	SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.map(|elapsed| elapsed.as_millis() as i64)
		.unwrap_or_default()
}

async fn find(store: &FileSessionStore, name: &str) -> Result<Session> {
	store
		.session_by_name(name)
		.await?
		.ok_or_else(|| CliError::UnknownSession(name.to_string()))
}

async fn sorted_spaces(store: &FileSessionStore) -> Result<Vec<Space>> {
	let mut spaces: Vec<Space> = store.sessions().await?.iter().map(Space::from).collect();
	sort_spaces(&mut spaces);
	Ok(spaces)
}

fn display_name(space: &Space) -> &str {
	space.name.as_deref().filter(|name| !name.is_empty()).unwrap_or("(unnamed)")
}

async fn list(store: &FileSessionStore) -> Result<String> {
	let spaces = sorted_spaces(store).await?;
	if spaces.is_empty() {
		return Ok(format!("no saved spaces in {}\n", store.path().display()));
	}

	let mut out = String::new();
	for space in &spaces {
		let marker = if space.window_id.is_some() { "●".green() } else { "○".dimmed() };
		let tabs = match space.tabs.len() {
			1 => "1 tab".to_string(),
			n => format!("{n} tabs"),
		};
		let _ = writeln!(out, "{marker} {} {}", display_name(space).bold(), format!("({tabs})").dimmed());
	}
	Ok(out)
}

async fn show(store: &FileSessionStore, name: &str) -> Result<String> {
	let session = find(store, name).await?;
	let mut space = Space::from(&session);
	space.mark_duplicates();

	let mut out = String::new();
	let _ = writeln!(out, "{}", display_name(&space).bold());
	for tab in &space.tabs {
		let title = tab.title.as_deref().unwrap_or(&tab.url);
		let pin = if tab.pinned { " [pinned]".cyan() } else { "".normal() };
		let _ = writeln!(out, "  {title}{pin}\n    {}", tab.url.dimmed());
	}
	if !session.history.is_empty() {
		let _ = writeln!(out, "{}", "recently closed".yellow());
		for tab in &session.history {
			let _ = writeln!(out, "  {}", tab.url.dimmed());
		}
	}
	Ok(out)
}

async fn rename(store: &FileSessionStore, args: RenameArgs) -> Result<String> {
	let mut session = find(store, &args.from).await?;
	spaces::naming::claim_name(store, &args.to, session.id, args.force).await?;
	let old = session.name.replace(args.to.clone()).unwrap_or_default();
	store.update(session).await?;
	info!(target = "spaces.cli", from = %old, to = %args.to, "renamed session");
	Ok(format!("renamed \"{old}\" to \"{}\"\n", args.to))
}

async fn delete(store: &FileSessionStore, name: &str) -> Result<String> {
	let session = find(store, name).await?;
	if let Some(id) = session.id {
		store.delete(id).await?;
	}
	Ok(format!("deleted \"{}\"\n", session.name.unwrap_or_default()))
}

async fn import_file(store: &FileSessionStore, args: ImportArgs) -> Result<String> {
	let text = fs::read_to_string(&args.file)?;
	let now = now_millis();

	let created = match import::parse_import(&text)? {
		ImportPayload::Backup(spaces) => {
			let mut created = Vec::with_capacity(spaces.len());
			for space in spaces {
				created.push(import::restore_space(store, space.into(), args.force, now).await?);
			}
			created
		}
		ImportPayload::Urls(urls) => vec![import::import_urls(store, &urls, now).await?],
	};

	let mut out = String::new();
	for session in &created {
		let _ = writeln!(
			out,
			"imported \"{}\" ({} tabs)",
			session.name.as_deref().unwrap_or_default(),
			session.tabs.len()
		);
	}
	Ok(out)
}

async fn backup(store: &FileSessionStore, out: Option<&Path>) -> Result<String> {
	let spaces = sorted_spaces(store).await?;
	let backup = import::backup_spaces(&spaces);
	match out {
		Some(path) => {
			save_json(path, &backup)?;
			Ok(format!("wrote {} spaces to {}\n", backup.len(), path.display()))
		}
		None => Ok(format!("{}\n", serde_json::to_string_pretty(&backup)?)),
	}
}

async fn export(store: &FileSessionStore, name: &str, out: Option<&Path>) -> Result<String> {
	let space = Space::from(&find(store, name).await?);
	let urls = import::export_urls(&space);
	match out {
		Some(dir) => {
			fs::create_dir_all(dir)?;
			let path = dir.join(import::export_file_name(&space));
			fs::write(&path, urls)?;
			Ok(format!("wrote {}\n", path.display()))
		}
		None => Ok(urls),
	}
}

#[cfg(test)]
mod tests {
	use spaces_protocol::{SessionId, Tab, WindowId};
	use tempfile::TempDir;

	use super::*;

	fn plain() {
		colored::control::set_override(false);
	}

	async fn seeded(tmp: &TempDir) -> FileSessionStore {
		let store = FileSessionStore::open(tmp.path().join("sessions.json")).unwrap();
		store
			.create(Session {
				last_access: Some(10),
				..Session::named(
					"Work",
					vec![
						Tab::new("https://docs.example"),
						Tab::new("chrome-extension://abc/suspended.html#ttl=x&uri=https://mail.example"),
					],
				)
			})
			.await
			.unwrap();
		store
			.create(Session {
				last_access: Some(20),
				window_id: Some(WindowId(4)),
				..Session::named("Home", vec![Tab::new("https://news.example")])
			})
			.await
			.unwrap();
		store
	}

	#[tokio::test]
	async fn list_puts_open_spaces_first() {
		plain();
		let tmp = TempDir::new().unwrap();
		let store = seeded(&tmp).await;
		let out = execute(Commands::List, &store).await.unwrap();
		let lines: Vec<_> = out.lines().collect();
		assert_eq!(lines.len(), 2);
		assert!(lines[0].contains("Home") && lines[0].contains("1 tab"));
		assert!(lines[1].contains("Work") && lines[1].contains("2 tabs"));
	}

	#[tokio::test]
	async fn list_of_an_empty_store_names_the_file() {
		plain();
		let tmp = TempDir::new().unwrap();
		let store = FileSessionStore::open(tmp.path().join("sessions.json")).unwrap();
		let out = execute(Commands::List, &store).await.unwrap();
		assert!(out.contains("no saved spaces"));
		assert!(out.contains("sessions.json"));
	}

	#[tokio::test]
	async fn show_is_case_insensitive() {
		plain();
		let tmp = TempDir::new().unwrap();
		let store = seeded(&tmp).await;
		let out = execute(Commands::Show { name: "work".into() }, &store).await.unwrap();
		assert!(out.starts_with("Work"));
		assert!(out.contains("https://docs.example"));
	}

	#[tokio::test]
	async fn unknown_names_are_user_errors() {
		let tmp = TempDir::new().unwrap();
		let store = seeded(&tmp).await;
		let err = execute(Commands::Delete { name: "Nope".into() }, &store).await.unwrap_err();
		assert!(matches!(err, CliError::UnknownSession(_)));
		assert_eq!(err.exit_code(), 2);
	}

	#[tokio::test]
	async fn rename_refuses_a_taken_name_without_force() {
		let tmp = TempDir::new().unwrap();
		let store = seeded(&tmp).await;
		let args = RenameArgs {
			from: "Work".into(),
			to: "home".into(),
			force: false,
		};
		let err = execute(Commands::Rename(args), &store).await.unwrap_err();
		assert!(matches!(err, CliError::NameTaken(_)));
		assert_eq!(store.sessions().await.unwrap().len(), 2);
	}

	#[tokio::test]
	async fn forced_rename_replaces_the_holder() {
		let tmp = TempDir::new().unwrap();
		let store = seeded(&tmp).await;
		let args = RenameArgs {
			from: "Work".into(),
			to: "Home".into(),
			force: true,
		};
		execute(Commands::Rename(args), &store).await.unwrap();

		let reopened = FileSessionStore::open(store.path()).unwrap();
		let sessions = reopened.snapshot().sessions;
		assert_eq!(sessions.len(), 1);
		assert_eq!(sessions[0].id, Some(SessionId(1)));
		assert_eq!(sessions[0].name.as_deref(), Some("Home"));
	}

	#[tokio::test]
	async fn renaming_only_the_case_is_allowed() {
		let tmp = TempDir::new().unwrap();
		let store = seeded(&tmp).await;
		let args = RenameArgs {
			from: "work".into(),
			to: "WORK".into(),
			force: false,
		};
		execute(Commands::Rename(args), &store).await.unwrap();
		assert!(store.session_by_name("WORK").await.unwrap().is_some());
	}

	#[tokio::test]
	async fn export_strips_suspender_wrappers() {
		let tmp = TempDir::new().unwrap();
		let store = seeded(&tmp).await;
		let out = execute(
			Commands::Export {
				name: "Work".into(),
				out: None,
			},
			&store,
		)
		.await
		.unwrap();
		assert_eq!(out, "https://docs.example\nhttps://mail.example\n");

		let dir = tmp.path().join("exports");
		execute(
			Commands::Export {
				name: "Work".into(),
				out: Some(dir.clone()),
			},
			&store,
		)
		.await
		.unwrap();
		assert_eq!(fs::read_to_string(dir.join("Work.txt")).unwrap(), out);
	}

	#[tokio::test]
	async fn backup_then_import_into_a_fresh_store() {
		let tmp = TempDir::new().unwrap();
		let store = seeded(&tmp).await;
		let file = tmp.path().join("backup.json");
		execute(Commands::Backup { out: Some(file.clone()) }, &store).await.unwrap();

		let fresh = FileSessionStore::open(tmp.path().join("fresh.json")).unwrap();
		let out = execute(Commands::Import(ImportArgs { file, force: false }), &fresh)
			.await
			.unwrap();
		assert!(out.contains("\"Home\""));
		assert!(out.contains("\"Work\""));

		let work = fresh.session_by_name("Work").await.unwrap().unwrap();
		assert_eq!(work.window_id, None, "restored sessions are never bound");
		assert_eq!(work.tabs[1].url, "https://mail.example");
	}

	#[tokio::test]
	async fn importing_a_backup_over_existing_names_needs_force() {
		let tmp = TempDir::new().unwrap();
		let store = seeded(&tmp).await;
		let file = tmp.path().join("backup.json");
		fs::write(&file, r#"[{"name":"Work","tabs":[{"url":"https://new.example"}]}]"#).unwrap();

		let err = execute(
			Commands::Import(ImportArgs {
				file: file.clone(),
				force: false,
			}),
			&store,
		)
		.await
		.unwrap_err();
		assert!(matches!(err, CliError::NameTaken(_)));

		execute(Commands::Import(ImportArgs { file, force: true }), &store)
			.await
			.unwrap();
		let work = store.session_by_name("Work").await.unwrap().unwrap();
		assert_eq!(work.tabs.len(), 1);
		assert_eq!(work.tabs[0].url, "https://new.example");
	}

	#[tokio::test]
	async fn url_lists_get_a_generated_name() {
		let tmp = TempDir::new().unwrap();
		let store = seeded(&tmp).await;
		let file = tmp.path().join("urls.txt");
		fs::write(&file, "https://a.example\nnot a url\nhttps://b.example\n").unwrap();

		let out = execute(Commands::Import(ImportArgs { file, force: false }), &store)
			.await
			.unwrap();
		assert!(out.contains("Imported space: 1"));
		let imported = store.session_by_name("Imported space: 1").await.unwrap().unwrap();
		assert_eq!(imported.tabs.len(), 2);
	}

	#[tokio::test]
	async fn empty_imports_are_rejected() {
		let tmp = TempDir::new().unwrap();
		let store = seeded(&tmp).await;
		let file = tmp.path().join("empty.txt");
		fs::write(&file, "   \n").unwrap();
		let err = execute(Commands::Import(ImportArgs { file, force: false }), &store)
			.await
			.unwrap_err();
		assert!(matches!(err, CliError::Import(_)));
	}
}
