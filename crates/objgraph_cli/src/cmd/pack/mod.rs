use std::path::PathBuf;

use objgraph::serial::{Compression, Result, ScanOptions, compress, scan_frames};

use crate::cmd::util::read_stream;

#[derive(clap::Args)]
pub struct Args {
	pub input: PathBuf,
	pub output: PathBuf,
	#[arg(long, default_value_t = 3)]
	pub level: i32,
}

/// Validate a stream and write it wrapped in a zstd envelope.
pub fn run(args: Args) -> Result<()> {
	let Args { input, output, level } = args;

	let (compression, bytes) = read_stream(&input)?;
	if compression == Compression::Zstd {
		tracing::warn!(path = %input.display(), "input already enveloped, repacking inner stream");
	}
	let report = scan_frames(&bytes, &ScanOptions::default())?;

	let packed = compress(&bytes, level)?;
	std::fs::write(&output, &packed)?;

	println!("version: {}", report.version);
	println!("stream_bytes: {}", bytes.len());
	println!("packed_bytes: {}", packed.len());
	println!("output: {}", output.display());
	Ok(())
}
