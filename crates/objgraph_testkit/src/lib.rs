//! Shared test helpers for workspace crates.

use std::path::{Path, PathBuf};

/// Resolve the workspace root path.
pub fn workspace_root() -> PathBuf {
	let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
	manifest_dir
		.join("..")
		.join("..")
		.canonicalize()
		.unwrap_or_else(|_| manifest_dir.join("..").join(".."))
}

/// Resolve the workspace target directory.
pub fn target_dir() -> PathBuf {
	std::env::var_os("CARGO_TARGET_DIR")
		.map(PathBuf::from)
		.unwrap_or_else(|| workspace_root().join("target"))
}

/// Fresh per-process scratch file path under the target directory.
///
/// The parent directory is created; any file left from an earlier run is removed.
pub fn scratch_path(name: &str) -> PathBuf {
	let dir = target_dir().join("objgraph-scratch").join(std::process::id().to_string());
	std::fs::create_dir_all(&dir).unwrap_or_else(|err| panic!("create scratch dir {}: {err}", dir.display()));
	let path = dir.join(name);
	let _ = std::fs::remove_file(&path);
	path
}

/// Parse command stdout as a JSON document.
pub fn parse_json(stdout: &[u8]) -> serde_json::Value {
	serde_json::from_slice(stdout).unwrap_or_else(|err| panic!("stdout is not JSON ({err}): {}", String::from_utf8_lossy(stdout)))
}
