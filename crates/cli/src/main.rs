use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use spaces_cli::cli::Cli;
use spaces_cli::error::CliError;
use spaces_cli::store::{FileSessionStore, default_store_path};
use spaces_cli::{commands, logging};

#[tokio::main(flavor = "current_thread")]
async fn main() {
	let cli = Cli::parse();
	logging::init_logging(cli.verbose);

	match run(cli).await {
		Ok(report) => print!("{report}"),
		Err(err) => {
			eprintln!("{} {err:#}", "error:".red().bold());
			let code = err.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
			std::process::exit(code);
		}
	}
}

async fn run(cli: Cli) -> anyhow::Result<String> {
	let path = match cli.store {
		Some(path) => path,
		None => default_store_path()?,
	};
	let store = FileSessionStore::open(&path).with_context(|| format!("opening {}", path.display()))?;
	Ok(commands::execute(cli.command, &store).await?)
}
