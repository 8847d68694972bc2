//! Clan tag host binary.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use clantag_tags::TagsConfig;
use tracing::info;

/// Host command line arguments.
#[derive(Parser, Debug)]
#[command(name = "clantag-host")]
#[command(about = "Drive the clan tag registry against a simulated engine")]
struct Args {
	/// TOML configuration file
	#[arg(short, long, global = true, value_name = "PATH")]
	config: Option<PathBuf>,

	/// Verbose logging
	#[arg(short, long, global = true)]
	verbose: bool,

	#[command(subcommand)]
	command: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
	/// Run a script deterministically, applying display updates on `tick` lines
	Replay {
		/// Script file to execute
		script: PathBuf,
	},
	/// Read commands from stdin while the display pump ticks on its own
	Live,
}

/// Handle to process stdout shared by the pump and the command loop.
///
/// `write_all` holds the stdout lock for the whole buffer, so each line the
/// host emits lands in one piece.
#[derive(Debug, Clone, Copy)]
struct SharedStdout;

impl Write for SharedStdout {
	fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
		std::io::stdout().lock().write(buf)
	}

	fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()> {
		std::io::stdout().lock().write_all(buf)
	}

	fn flush(&mut self) -> std::io::Result<()> {
		std::io::stdout().lock().flush()
	}
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	setup_tracing(args.verbose);

	let config = match &args.config {
		Some(path) => TagsConfig::load(path)?,
		None => TagsConfig::default(),
	};
	info!(policy = ?config.display.policy, tick_ms = config.display.tick_interval_ms, "starting clantag-host");

	match args.command {
		Mode::Replay { script } => {
			let source = std::fs::read_to_string(&script).with_context(|| format!("reading {}", script.display()))?;
			let commands = clantag_host::parse_script(&source)?;
			clantag_host::replay(commands, &config, std::io::stdout().lock())?;
		}
		Mode::Live => {
			let stdin = tokio::io::BufReader::new(tokio::io::stdin());
			clantag_host::live(stdin, &config, SharedStdout).await?;
		}
	}

	Ok(())
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_env("CLANTAG_LOG").unwrap_or_else(|_| {
		if verbose {
			EnvFilter::new("clantag_tags=trace,clantag_worker=debug,clantag_host=debug,info")
		} else {
			EnvFilter::new("info")
		}
	});

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(true)
		.init();
}
