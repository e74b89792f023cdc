use std::path::Path;

use objgraph::serial::{Compression, Result, decode_bytes};
use serde::Serialize;

/// Read a stream file, stripping any envelope.
pub(crate) fn read_stream(path: &Path) -> Result<(Compression, Vec<u8>)> {
	let raw = std::fs::read(path)?;
	tracing::debug!(path = %path.display(), bytes = raw.len(), "read stream file");
	decode_bytes(raw)
}

/// Print a pretty JSON document on stdout.
pub(crate) fn emit_json<T: Serialize>(payload: &T) -> Result<()> {
	let text = serde_json::to_string_pretty(payload).map_err(std::io::Error::from)?;
	println!("{text}");
	Ok(())
}
