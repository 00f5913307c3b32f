//! `investec-agent` binary: answers one question about your Investec accounts.

// crates.io
use clap::Parser;
use color_eyre::Result;
// self
use investec_agent::cli::{self, Cli};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let cli = Cli::parse();

	cli.load_env_file()?;
	cli::init_tracing(cli.log_format)?;

	let answer = cli::run(&cli).await?;

	println!("{answer}");

	Ok(())
}
