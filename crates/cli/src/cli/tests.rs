use clap::Parser;

use super::{Cli, Commands};

#[test]
fn verbosity_counts_and_store_is_global() {
	let cli = Cli::try_parse_from(["spaces", "list", "-vv", "--store", "/tmp/s.json"]).unwrap();
	assert_eq!(cli.verbose, 2);
	assert_eq!(cli.store.as_deref(), Some(std::path::Path::new("/tmp/s.json")));
	assert!(matches!(cli.command, Commands::List));
}

#[test]
fn rename_takes_force() {
	let cli = Cli::try_parse_from(["spaces", "rename", "work", "Work", "--force"]).unwrap();
	match cli.command {
		Commands::Rename(args) => {
			assert_eq!(args.from, "work");
			assert_eq!(args.to, "Work");
			assert!(args.force);
		}
		other => panic!("expected rename, got {other:?}"),
	}
}

#[test]
fn export_requires_a_name() {
	assert!(Cli::try_parse_from(["spaces", "export"]).is_err());
	let cli = Cli::try_parse_from(["spaces", "export", "Work", "-o", "out"]).unwrap();
	assert!(matches!(cli.command, Commands::Export { ref name, .. } if name == "Work"));
}
