use std::path::PathBuf;

use objgraph::serial::{FrameNode, Result, ScanOptions, scan_frames};

use crate::cmd::util::{emit_json, read_stream};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long, default_value_t = 256)]
	pub max_nodes: usize,
	#[arg(long)]
	pub json: bool,
}

/// Print the frame tree of one stream.
pub fn run(args: Args) -> Result<()> {
	let Args { path, max_nodes, json } = args;

	let (_, bytes) = read_stream(&path)?;
	let opt = ScanOptions {
		outline: true,
		max_nodes,
		..ScanOptions::default()
	};
	let report = scan_frames(&bytes, &opt)?;

	if json {
		let payload = OutlineJson {
			version: report.version.tag(),
			truncated: report.outline_truncated,
			root: report.outline.as_ref().map(node_json),
		};
		return emit_json(&payload);
	}

	println!("version: {}", report.version);
	if let Some(root) = &report.outline {
		print_node(root, 0);
	}
	if report.outline_truncated {
		println!("... truncated at {max_nodes} nodes");
	}

	Ok(())
}

fn print_node(node: &FrameNode, depth: usize) {
	let mut line = format!("{:indent$}", "", indent = depth * 2);
	if let Some(field) = &node.field {
		line.push_str(field);
		line.push_str(": ");
	}
	line.push_str(node.kind.as_str());
	if let Some(ref_id) = node.ref_id {
		line.push_str(&format!(" &{ref_id}"));
	}
	if let Some(label) = &node.label {
		line.push_str(&format!(" {label:?}"));
	}
	line.push_str(&format!(" @{}", node.offset));
	println!("{line}");

	for child in &node.children {
		print_node(child, depth + 1);
	}
}

fn node_json(node: &FrameNode) -> FrameNodeJson {
	FrameNodeJson {
		kind: node.kind.as_str(),
		offset: node.offset,
		ref_id: node.ref_id,
		field: node.field.clone(),
		label: node.label.clone(),
		children: node.children.iter().map(node_json).collect(),
	}
}

#[derive(serde::Serialize)]
struct FrameNodeJson {
	kind: &'static str,
	offset: usize,
	ref_id: Option<u32>,
	field: Option<String>,
	label: Option<String>,
	children: Vec<FrameNodeJson>,
}

#[derive(serde::Serialize)]
struct OutlineJson {
	version: &'static str,
	truncated: bool,
	root: Option<FrameNodeJson>,
}
