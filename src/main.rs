mod cli;

use anyhow::Result;
use clap::Parser;
use cli::Args;

fn main() -> Result<()> {
	let args = Args::parse();

	let subscriber = tracing_subscriber::fmt()
		.compact()
		.with_file(false)
		.with_line_number(false)
		.with_max_level(args.level())
		.with_thread_ids(false)
		.with_thread_names(false)
		.with_writer(std::io::stderr)
		.finish();
	tracing::subscriber::set_global_default(subscriber)?;

	args.execute()
}
