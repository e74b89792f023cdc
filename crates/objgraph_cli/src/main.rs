#![allow(missing_docs)]

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd;

#[derive(Parser)]
#[command(name = "objgraph", about = "Object-graph stream inspection tools")]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Print stream version, envelope and frame statistics.
	Info(cmd::info::Args),
	/// Print the frame tree of a stream.
	Outline(cmd::outline::Args),
	/// Wrap a stream in a zstd envelope.
	Pack(cmd::pack::Args),
}

fn main() {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
		.with_writer(std::io::stderr)
		.with_target(false)
		.init();

	if let Err(err) = run() {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn run() -> objgraph::serial::Result<()> {
	let cli = Cli::parse();

	match cli.command {
		Commands::Info(args) => cmd::info::run(args),
		Commands::Outline(args) => cmd::outline::run(args),
		Commands::Pack(args) => cmd::pack::run(args),
	}
}
