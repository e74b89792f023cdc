use std::path::PathBuf;

use objgraph::serial::{Result, ScanOptions, scan_frames};

use crate::cmd::util::{emit_json, read_stream};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long)]
	pub json: bool,
}

/// Print version, envelope and frame statistics for one stream.
pub fn run(args: Args) -> Result<()> {
	let Args { path, json } = args;

	let (compression, bytes) = read_stream(&path)?;
	let report = scan_frames(&bytes, &ScanOptions::default())?;

	if json {
		let payload = InfoJson {
			path: path.display().to_string(),
			compression: compression.as_str(),
			version: report.version.tag(),
			bytes: report.bytes,
			definitions: report.definitions,
			back_refs: report.back_refs,
			max_depth: report.max_depth,
			frames: report.frames.iter().map(|(kind, count)| FrameCountJson { kind: kind.as_str(), count: *count }).collect(),
			types: report.types.iter().map(|(type_id, count)| TypeCountJson { type_id: type_id.clone(), count: *count }).collect(),
		};
		return emit_json(&payload);
	}

	println!("path: {}", path.display());
	println!("compression: {}", compression.as_str());
	println!("version: {}", report.version);
	println!("bytes: {}", report.bytes);
	println!("definitions: {}", report.definitions);
	println!("back_refs: {}", report.back_refs);
	println!("max_depth: {}", report.max_depth);

	println!("frames:");
	for (kind, count) in &report.frames {
		println!("  {}: {}", kind.as_str(), count);
	}

	if !report.types.is_empty() {
		println!("types:");
		for (type_id, count) in &report.types {
			println!("  {type_id}: {count}");
		}
	}

	Ok(())
}

#[derive(serde::Serialize)]
struct FrameCountJson {
	kind: &'static str,
	count: usize,
}

#[derive(serde::Serialize)]
struct TypeCountJson {
	type_id: String,
	count: usize,
}

#[derive(serde::Serialize)]
struct InfoJson {
	path: String,
	compression: &'static str,
	version: &'static str,
	bytes: usize,
	definitions: usize,
	back_refs: usize,
	max_depth: u32,
	frames: Vec<FrameCountJson>,
	types: Vec<TypeCountJson>,
}
