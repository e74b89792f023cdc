use tracing::{debug, trace, warn};

use crate::serial::bytes::Cursor;
use crate::serial::identity::DecodeTable;
use crate::serial::version::dispatch;
use crate::serial::wire::{FrameKind, WireRules};
use crate::serial::{FormatVersion, Heap, Node, Result, SerialError, TypeRegistry, Value};

/// Runtime limits and behavior switches for decoding.
#[derive(Debug, Clone)]
pub struct DecodeOptions {
	/// Maximum nesting depth of frames.
	pub max_depth: u32,
	/// Maximum element count, entry count, or string byte length of one frame.
	pub max_collection_len: usize,
	/// Accept bytes after the root frame instead of failing.
	pub allow_trailing_bytes: bool,
}

impl Default for DecodeOptions {
	fn default() -> Self {
		Self {
			max_depth: 256,
			max_collection_len: 1 << 24,
			allow_trailing_bytes: false,
		}
	}
}

impl DecodeOptions {
	/// Preset tuned for untrusted input.
	pub fn strict() -> Self {
		Self {
			max_depth: 64,
			max_collection_len: 1 << 16,
			allow_trailing_bytes: false,
		}
	}
}

/// Decoded object graph.
#[derive(Debug, Clone)]
pub struct Decoded {
	/// Arena owning every materialized node.
	pub heap: Heap,
	/// Root value.
	pub root: Value,
	/// Version tag the stream was written with.
	pub version: FormatVersion,
}

/// Decode a stream using default options.
pub fn decode(bytes: &[u8], registry: &TypeRegistry) -> Result<Decoded> {
	decode_with(bytes, registry, &DecodeOptions::default())
}

/// Decode a stream. On failure no partial graph is returned.
pub fn decode_with(bytes: &[u8], registry: &TypeRegistry, opt: &DecodeOptions) -> Result<Decoded> {
	let (rules, cursor) = dispatch(bytes)?;
	debug!(version = rules.version.tag(), bytes = bytes.len(), "decode start");

	let mut decoder = Decoder {
		registry,
		rules,
		opt,
		cursor,
		table: DecodeTable::new(),
		heap: Heap::new(),
	};
	let root = decoder.value(0)?;

	let leftover = decoder.cursor.remaining();
	if leftover > 0 && !opt.allow_trailing_bytes {
		return Err(SerialError::TrailingBytes {
			at: decoder.cursor.pos(),
			leftover,
		});
	}

	debug!(version = rules.version.tag(), definitions = decoder.table.len(), nodes = decoder.heap.len(), "decode done");
	Ok(Decoded {
		heap: decoder.heap,
		root,
		version: rules.version,
	})
}

struct Decoder<'a, 'r> {
	registry: &'r TypeRegistry,
	rules: WireRules,
	opt: &'r DecodeOptions,
	cursor: Cursor<'a>,
	table: DecodeTable,
	heap: Heap,
}

impl<'a> Decoder<'a, '_> {
	fn value(&mut self, depth: u32) -> Result<Value> {
		if depth >= self.opt.max_depth {
			return Err(SerialError::DepthExceeded { max_depth: self.opt.max_depth });
		}

		let at = self.cursor.pos();
		let kind = self.rules.read_kind(&mut self.cursor)?;
		let value = match kind {
			FrameKind::Null => Value::Null,
			FrameKind::Bool => Value::Bool(self.rules.read_bool(&mut self.cursor)?),
			FrameKind::Int => Value::Int(self.rules.read_int(&mut self.cursor)?),
			FrameKind::Float => Value::Float(self.cursor.read_f64_le()?),
			FrameKind::Symbol => Value::Symbol(self.text()?.into()),
			FrameKind::Range => {
				let start = self.rules.read_int(&mut self.cursor)?;
				let end = self.rules.read_int(&mut self.cursor)?;
				Value::Range { start, end }
			}
			FrameKind::KeyString => {
				let text = self.text()?.to_owned();
				self.heap.alloc_str(text)
			}
			FrameKind::String => {
				let ref_id = self.begin_definition()?;
				let text = self.text()?.to_owned();
				self.bind(ref_id, at, Node::Str(text))?
			}
			FrameKind::Sequence => self.sequence(at, depth)?,
			FrameKind::Mapping => self.mapping(at, depth)?,
			FrameKind::Composite => self.composite(at, depth)?,
			FrameKind::BackRef => {
				let ref_id = self.rules.read_ref(&mut self.cursor)?;
				Value::Ref(self.table.lookup(ref_id, at)?)
			}
		};
		Ok(value)
	}

	fn sequence(&mut self, at: usize, depth: u32) -> Result<Value> {
		let ref_id = self.begin_definition()?;
		let count = self.len()?;
		let handle = self.bind(ref_id, at, Node::Seq(Vec::with_capacity(count.min(1024))))?;

		for _ in 0..count {
			let item = self.value(depth + 1)?;
			self.heap.seq_mut(&handle)?.push(item);
		}
		Ok(handle)
	}

	fn mapping(&mut self, at: usize, depth: u32) -> Result<Value> {
		let ref_id = self.begin_definition()?;
		let count = self.len()?;
		let handle = self.bind(ref_id, at, Node::Map(Vec::with_capacity(count.min(1024))))?;

		for _ in 0..count {
			let key = self.value(depth + 1)?;
			let value = self.value(depth + 1)?;
			self.heap.map_mut(&handle)?.push((key, value));
		}
		Ok(handle)
	}

	fn composite(&mut self, at: usize, depth: u32) -> Result<Value> {
		let ref_id = self.begin_definition()?;
		let type_id = self.text()?;
		let registry = self.registry;
		let schema = registry.get(type_id).ok_or_else(|| SerialError::UnknownType {
			type_id: type_id.to_owned(),
			at,
		})?;

		// Bound before the fields are read so self-references resolve.
		let handle = self.bind(ref_id, at, Node::Composite(schema.instantiate()))?;

		let count = self.len()?;
		for _ in 0..count {
			let name = self.text()?;
			let value = self.value(depth + 1)?;
			if !schema.policy().includes(name) {
				warn!(type_id = schema.type_id(), field = name, "discarding field excluded by policy");
				continue;
			}
			self.heap.composite_mut(&handle)?.set(name, value);
		}

		schema.run_post_decode(self.heap.composite_mut(&handle)?)?;
		Ok(handle)
	}

	fn begin_definition(&mut self) -> Result<u32> {
		let ref_id = self.table.reserve();
		self.rules.read_def_id(&mut self.cursor, ref_id)?;
		Ok(ref_id)
	}

	fn bind(&mut self, ref_id: u32, at: usize, node: Node) -> Result<Value> {
		trace!(ref_id, kind = node.kind(), "definition");
		let id = self.heap.alloc(node);
		self.table.bind(ref_id, id, at)?;
		Ok(Value::Ref(id))
	}

	fn len(&mut self) -> Result<usize> {
		self.rules.read_len(&mut self.cursor, self.opt.max_collection_len)
	}

	fn text(&mut self) -> Result<&'a str> {
		self.rules.read_text(&mut self.cursor, self.opt.max_collection_len)
	}
}

#[cfg(test)]
mod tests;
