use crate::serial::{DecodeOptions, Decoded, EncodeOptions, FormatVersion, Heap, Result, TypeRegistry, Value, decode_with, encode_with};

/// Encoder/decoder pair bound to one registry and one set of options.
///
/// Holds no per-call state, so a shared `&Codec` can serve calls on several
/// threads at once.
#[derive(Debug, Clone)]
pub struct Codec<'r> {
	registry: &'r TypeRegistry,
	/// Options applied by [`Codec::encode`].
	pub encode: EncodeOptions,
	/// Options applied by [`Codec::decode`].
	pub decode: DecodeOptions,
}

impl<'r> Codec<'r> {
	/// Codec with default options.
	pub fn new(registry: &'r TypeRegistry) -> Self {
		Self {
			registry,
			encode: EncodeOptions::default(),
			decode: DecodeOptions::default(),
		}
	}

	/// Registry backing this codec.
	pub fn registry(&self) -> &'r TypeRegistry {
		self.registry
	}

	/// Encode the graph reachable from `root`.
	pub fn encode(&self, heap: &mut Heap, root: &Value, version: FormatVersion) -> Result<Vec<u8>> {
		encode_with(heap, self.registry, root, version, &self.encode)
	}

	/// Encode, naming the target version by its tag.
	pub fn encode_tagged(&self, heap: &mut Heap, root: &Value, version: &str) -> Result<Vec<u8>> {
		self.encode(heap, root, FormatVersion::from_tag(version)?)
	}

	/// Decode a stream.
	pub fn decode(&self, bytes: &[u8]) -> Result<Decoded> {
		decode_with(bytes, self.registry, &self.decode)
	}
}
