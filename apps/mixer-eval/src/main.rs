// crates.io
use clap::Parser;
// self
use mixer_eval::Args;

fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = Args::parse();

	mixer_eval::run(args)
}
