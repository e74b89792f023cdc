use thiserror::Error;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, SerialError>;

/// Boxed error returned by lifecycle hooks.
pub type HookError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors produced while encoding, decoding, or scanning object-graph streams.
#[derive(Debug, Error)]
pub enum SerialError {
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// Stream referenced a composite type absent from the registry.
	#[error("unknown type {type_id:?} at offset {at}")]
	UnknownType {
		/// Type identifier read from the stream.
		type_id: String,
		/// Byte offset of the composite frame.
		at: usize,
	},
	/// Encode reached a composite whose type was never registered.
	#[error("type {type_id:?} is not registered")]
	NotRegistered {
		/// Composite type identifier.
		type_id: String,
	},
	/// Stream or caller named a format version without a ruleset.
	#[error("unsupported format version {tag:?}")]
	UnsupportedVersion {
		/// Version tag as read or requested.
		tag: String,
	},
	/// Value kind cannot be expressed by the selected format version.
	#[error("{kind} values are not supported by format version {version}")]
	UnsupportedKind {
		/// Logical value kind.
		kind: &'static str,
		/// Target version tag.
		version: &'static str,
	},
	/// Back-reference to a ref id that was never defined.
	#[error("dangling reference to ref id {ref_id} at offset {at}")]
	DanglingReference {
		/// Referenced id.
		ref_id: u32,
		/// Byte offset of the back-reference frame.
		at: usize,
	},
	/// Frame tag, flag, or payload is inconsistent.
	#[error("malformed frame at offset {at}: {reason}")]
	MalformedFrame {
		/// Byte offset where the inconsistency was detected.
		at: usize,
		/// Short description of the violation.
		reason: &'static str,
	},
	/// Not enough bytes remained for a frame.
	#[error("truncated frame at offset {at}, need {need} bytes, remaining {rem}")]
	TruncatedFrame {
		/// Byte offset where the read was attempted.
		at: usize,
		/// Requested bytes.
		need: usize,
		/// Bytes still available.
		rem: usize,
	},
	/// Recursion depth exceeded configured limit.
	#[error("depth exceeded (max={max_depth})")]
	DepthExceeded {
		/// Configured depth ceiling.
		max_depth: u32,
	},
	/// Declared element count exceeded configured limit.
	#[error("collection too large at offset {at}: count={count}, max={max}")]
	CollectionTooLarge {
		/// Byte offset of the count field.
		at: usize,
		/// Declared element count.
		count: u64,
		/// Maximum permitted element count.
		max: usize,
	},
	/// Bytes remained after the root frame.
	#[error("trailing bytes after root frame at offset {at}: leftover={leftover}")]
	TrailingBytes {
		/// Offset just past the root frame.
		at: usize,
		/// Unconsumed bytes.
		leftover: usize,
	},
	/// A `Value::Ref` handle does not name a node of the expected kind.
	#[error("invalid handle #{node}: expected {expected}")]
	InvalidHandle {
		/// Raw node index.
		node: u32,
		/// Expected node kind.
		expected: &'static str,
	},
	/// Declared field default is not a scalar.
	#[error("field default for {type_id}.{field} must be a scalar")]
	InvalidDefault {
		/// Composite type identifier.
		type_id: String,
		/// Field name.
		field: String,
	},
	/// A registered lifecycle hook failed.
	#[error("hook for {type_id} failed: {source}")]
	Hook {
		/// Composite type identifier whose hook failed.
		type_id: String,
		/// Error returned by the hook.
		#[source]
		source: HookError,
	},
	/// A pre-encode hook rewrote the composite's type identifier.
	#[error("pre-encode hook changed type {type_id} to {changed_to}")]
	TypeChanged {
		/// Type identifier the composite was encoded under.
		type_id: String,
		/// Type identifier the hook left behind.
		changed_to: String,
	},
	/// Decompression output exceeded configured safety limit.
	#[error("decompressed output exceeded limit {limit} bytes")]
	DecompressedTooLarge {
		/// Maximum allowed output bytes.
		limit: usize,
	},
	/// Leading bytes are neither a zstd frame nor a stream header.
	#[error("unknown envelope (first bytes={magic:?})")]
	UnknownEnvelope {
		/// First up-to-4 bytes of the input.
		magic: [u8; 4],
	},
}

impl SerialError {
	/// Whether this error reports a corrupt or inconsistent stream.
	pub fn is_malformed(&self) -> bool {
		matches!(self, Self::MalformedFrame { .. } | Self::TruncatedFrame { .. } | Self::TrailingBytes { .. })
	}
}
