use tracing::{debug, trace};

use crate::serial::bytes::ByteWriter;
use crate::serial::identity::EncodeTable;
use crate::serial::version::write_header;
use crate::serial::wire::{WireRules, tag};
use crate::serial::{Field, FormatVersion, Heap, Node, NodeId, Result, SerialError, TypeRegistry, Value};

/// How strings in mapping-key position are shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyPolicy {
	/// Key strings are written by value and decode as fresh, unshared strings.
	#[default]
	ByValue,
	/// Key strings keep identity like strings anywhere else.
	Shared,
}

/// Runtime limits and behavior switches for encoding.
#[derive(Debug, Clone)]
pub struct EncodeOptions {
	/// Maximum nesting depth of the value graph.
	pub max_depth: u32,
	/// Sharing rule for strings used as mapping keys.
	pub string_keys: KeyPolicy,
}

impl Default for EncodeOptions {
	fn default() -> Self {
		Self {
			max_depth: 256,
			string_keys: KeyPolicy::ByValue,
		}
	}
}

/// Encode the graph reachable from `root` using default options.
///
/// Pre-encode hooks may mutate composites in `heap`.
pub fn encode(heap: &mut Heap, registry: &TypeRegistry, root: &Value, version: FormatVersion) -> Result<Vec<u8>> {
	encode_with(heap, registry, root, version, &EncodeOptions::default())
}

/// Encode the graph reachable from `root`.
pub fn encode_with(heap: &mut Heap, registry: &TypeRegistry, root: &Value, version: FormatVersion, opt: &EncodeOptions) -> Result<Vec<u8>> {
	debug!(version = version.tag(), nodes = heap.len(), "encode start");

	let mut encoder = Encoder {
		heap,
		registry,
		rules: version.rules(),
		opt,
		table: EncodeTable::new(),
		out: ByteWriter::new(),
	};
	write_header(&mut encoder.out, version);
	encoder.value(root, Position::Value, 0)?;

	let definitions = encoder.table.len();
	let bytes = encoder.out.into_bytes();
	debug!(version = version.tag(), bytes = bytes.len(), definitions, "encode done");
	Ok(bytes)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
	Value,
	Key,
}

struct Encoder<'a> {
	heap: &'a mut Heap,
	registry: &'a TypeRegistry,
	rules: WireRules,
	opt: &'a EncodeOptions,
	table: EncodeTable,
	out: ByteWriter,
}

impl Encoder<'_> {
	fn value(&mut self, value: &Value, position: Position, depth: u32) -> Result<()> {
		if depth >= self.opt.max_depth {
			return Err(SerialError::DepthExceeded { max_depth: self.opt.max_depth });
		}

		match value {
			Value::Null => self.out.put_u8(tag::NULL),
			Value::Bool(flag) => {
				self.out.put_u8(tag::BOOL);
				self.rules.write_bool(&mut self.out, *flag);
			}
			Value::Int(number) => {
				self.out.put_u8(tag::INT);
				self.rules.write_int(&mut self.out, *number);
			}
			Value::Float(number) => {
				self.out.put_u8(tag::FLOAT);
				self.out.put_f64_le(*number);
			}
			Value::Symbol(name) => {
				self.out.put_u8(tag::SYMBOL);
				self.rules.write_text(&mut self.out, name)?;
			}
			Value::Range { start, end } => {
				if !self.rules.range {
					return Err(SerialError::UnsupportedKind {
						kind: "Range",
						version: self.rules.version.tag(),
					});
				}
				self.out.put_u8(tag::RANGE);
				self.rules.write_int(&mut self.out, *start);
				self.rules.write_int(&mut self.out, *end);
			}
			Value::Ref(id) => self.node(*id, position, depth)?,
		}
		Ok(())
	}

	fn node(&mut self, id: NodeId, position: Position, depth: u32) -> Result<()> {
		let node = self.heap.node(id).ok_or(SerialError::InvalidHandle {
			node: id.index(),
			expected: "node",
		})?;

		if position == Position::Key && self.opt.string_keys == KeyPolicy::ByValue {
			if let Node::Str(text) = node {
				self.out.put_u8(tag::KEY_STRING);
				return self.rules.write_text(&mut self.out, text);
			}
		}

		let (ref_id, first) = self.table.intern(id);
		if !first {
			self.out.put_u8(tag::BACKREF);
			self.rules.write_ref(&mut self.out, ref_id);
			return Ok(());
		}
		trace!(ref_id, kind = node.kind(), "definition");

		match node {
			Node::Str(text) => {
				self.out.put_u8(tag::STRING);
				self.rules.write_def_id(&mut self.out, ref_id);
				self.rules.write_text(&mut self.out, text)?;
			}
			Node::Seq(items) => {
				let items = items.clone();
				self.out.put_u8(tag::SEQUENCE);
				self.rules.write_def_id(&mut self.out, ref_id);
				self.rules.write_len(&mut self.out, items.len())?;
				for item in &items {
					self.value(item, Position::Value, depth + 1)?;
				}
			}
			Node::Map(entries) => {
				let entries = entries.clone();
				self.out.put_u8(tag::MAPPING);
				self.rules.write_def_id(&mut self.out, ref_id);
				self.rules.write_len(&mut self.out, entries.len())?;
				for (key, value) in &entries {
					self.value(key, Position::Key, depth + 1)?;
					self.value(value, Position::Value, depth + 1)?;
				}
			}
			Node::Composite(_) => self.composite(id, ref_id, depth)?,
		}
		Ok(())
	}

	fn composite(&mut self, id: NodeId, ref_id: u32, depth: u32) -> Result<()> {
		let handle = Value::Ref(id);
		let type_id = self.heap.composite(&handle)?.type_id.clone();
		let registry = self.registry;
		let schema = registry.resolve(&type_id)?;

		let item = self.heap.composite_mut(&handle)?;
		schema.run_pre_encode(item)?;
		if item.type_id != type_id {
			return Err(SerialError::TypeChanged {
				type_id: type_id.into(),
				changed_to: item.type_id.as_ref().to_owned(),
			});
		}
		let fields: Vec<Field> = item.fields.iter().filter(|field| schema.policy().includes(&field.name)).cloned().collect();

		self.out.put_u8(tag::COMPOSITE);
		self.rules.write_def_id(&mut self.out, ref_id);
		self.rules.write_text(&mut self.out, &type_id)?;
		self.rules.write_len(&mut self.out, fields.len())?;
		for field in &fields {
			self.rules.write_text(&mut self.out, &field.name)?;
			self.value(&field.value, Position::Value, depth + 1)?;
		}
		Ok(())
	}
}
