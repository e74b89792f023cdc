use std::path::PathBuf;
use std::process::{Command, Output};
use std::sync::OnceLock;

use objgraph::serial::{Composite, FieldPolicy, FormatVersion, Heap, TypeRegistry, encode};
use objgraph_testkit::{parse_json, scratch_path, target_dir as workspace_target_dir};

static OBJGRAPH_BIN: OnceLock<PathBuf> = OnceLock::new();

pub(crate) fn run_objgraph(args: &[&str]) -> Output {
	Command::new(objgraph_bin()).args(args).output().expect("objgraph command executes")
}

pub(crate) fn run_objgraph_json(args: &[&str]) -> serde_json::Value {
	let output = run_objgraph(args);
	assert!(
		output.status.success(),
		"objgraph command failed with status={}: {}",
		output.status,
		String::from_utf8_lossy(&output.stderr)
	);
	parse_json(&output.stdout)
}

/// Write a `Pair` self-reference stream plus a shared string list and return its path.
pub(crate) fn sample_stream(name: &str, version: FormatVersion) -> String {
	let mut registry = TypeRegistry::new();
	registry.register("Pair", FieldPolicy::All, None, None);

	let mut heap = Heap::new();
	let label = heap.alloc_str("label");
	let list = heap.alloc_seq(vec![label.clone(), label]);
	let pair = heap.alloc_composite(Composite::new("Pair").with("a", 1_i64).with("list", list));
	heap.composite_mut(&pair).expect("composite").set("b", pair.clone());

	let bytes = encode(&mut heap, &registry, &pair, version).expect("sample encodes");
	let path = scratch_path(name);
	std::fs::write(&path, bytes).expect("sample writes");
	path.to_string_lossy().into_owned()
}

fn objgraph_bin() -> &'static PathBuf {
	OBJGRAPH_BIN.get_or_init(resolve_objgraph_bin)
}

fn resolve_objgraph_bin() -> PathBuf {
	if let Ok(path) = std::env::var("CARGO_BIN_EXE_objgraph") {
		return PathBuf::from(path);
	}

	let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
	let target_dir = workspace_target_dir();

	let mut bin = target_dir.join("debug");
	bin.push(if cfg!(windows) { "objgraph.exe" } else { "objgraph" });

	let status = Command::new("cargo")
		.current_dir(&manifest_dir)
		.args(["build", "--quiet", "--bin", "objgraph"])
		.status()
		.expect("cargo build executes");
	assert!(status.success(), "failed to build objgraph binary at {}", bin.display());

	bin
}
