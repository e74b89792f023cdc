//! Per-version frame tags, numeric encoding, and length framing.
//!
//! Every frame starts with a one-byte tag. Scalars carry their payload inline;
//! definitions of identity-tracked values carry a ref id (explicit in version 1,
//! implied by stream order in version 2) followed by their children.

use crate::serial::bytes::{ByteWriter, Cursor};
use crate::serial::{FormatVersion, Result, SerialError};

/// Frame tag bytes shared by all versions.
pub mod tag {
	/// Null scalar.
	pub const NULL: u8 = 0x00;
	/// Boolean scalar, one payload byte.
	pub const BOOL: u8 = 0x01;
	/// Integer scalar.
	pub const INT: u8 = 0x03;
	/// 8-byte float scalar.
	pub const FLOAT: u8 = 0x04;
	/// Symbol scalar, length-prefixed UTF-8.
	pub const SYMBOL: u8 = 0x05;
	/// Identity-tracked string definition.
	pub const STRING: u8 = 0x06;
	/// Sequence definition.
	pub const SEQUENCE: u8 = 0x07;
	/// Mapping definition.
	pub const MAPPING: u8 = 0x08;
	/// Composite definition.
	pub const COMPOSITE: u8 = 0x09;
	/// Back-reference to an earlier definition.
	pub const BACKREF: u8 = 0x0A;
	/// Mapping-key string carried by value, without identity.
	pub const KEY_STRING: u8 = 0x0B;
	/// Inclusive integer range (version 2+).
	pub const RANGE: u8 = 0x0C;
}

/// Encoding of integers, lengths, and ref ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntEncoding {
	/// Fixed-width little-endian (`i64` values, `u32` lengths and ids).
	Fixed,
	/// LEB128 (signed values, unsigned lengths and ids).
	Varint,
}

/// Decoded meaning of a frame tag under one ruleset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FrameKind {
	/// Null scalar.
	Null,
	/// Boolean scalar.
	Bool,
	/// Integer scalar.
	Int,
	/// Float scalar.
	Float,
	/// Symbol scalar.
	Symbol,
	/// Inclusive integer range scalar.
	Range,
	/// Identity-tracked string definition.
	String,
	/// Mapping-key string without identity.
	KeyString,
	/// Sequence definition.
	Sequence,
	/// Mapping definition.
	Mapping,
	/// Composite definition.
	Composite,
	/// Back-reference to an earlier definition.
	BackRef,
}

impl FrameKind {
	/// Tag byte for this frame kind.
	pub fn tag(self) -> u8 {
		match self {
			Self::Null => tag::NULL,
			Self::Bool => tag::BOOL,
			Self::Int => tag::INT,
			Self::Float => tag::FLOAT,
			Self::Symbol => tag::SYMBOL,
			Self::Range => tag::RANGE,
			Self::String => tag::STRING,
			Self::KeyString => tag::KEY_STRING,
			Self::Sequence => tag::SEQUENCE,
			Self::Mapping => tag::MAPPING,
			Self::Composite => tag::COMPOSITE,
			Self::BackRef => tag::BACKREF,
		}
	}

	/// Stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Null => "null",
			Self::Bool => "bool",
			Self::Int => "int",
			Self::Float => "float",
			Self::Symbol => "symbol",
			Self::Range => "range",
			Self::String => "string",
			Self::KeyString => "key_string",
			Self::Sequence => "sequence",
			Self::Mapping => "mapping",
			Self::Composite => "composite",
			Self::BackRef => "backref",
		}
	}

	/// Whether this frame defines an identity-tracked value.
	pub fn is_definition(self) -> bool {
		matches!(self, Self::String | Self::Sequence | Self::Mapping | Self::Composite)
	}
}

/// Framing ruleset bound to one format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireRules {
	/// Version these rules implement.
	pub version: FormatVersion,
	/// Numeric encoding.
	pub ints: IntEncoding,
	/// Definitions carry their ref id on the wire.
	pub explicit_ref_ids: bool,
	/// Range scalars are representable.
	pub range: bool,
}

impl WireRules {
	/// Classify a tag byte read at offset `at`.
	pub fn frame_kind(&self, byte: u8, at: usize) -> Result<FrameKind> {
		let kind = match byte {
			tag::NULL => FrameKind::Null,
			tag::BOOL => FrameKind::Bool,
			tag::INT => FrameKind::Int,
			tag::FLOAT => FrameKind::Float,
			tag::SYMBOL => FrameKind::Symbol,
			tag::STRING => FrameKind::String,
			tag::SEQUENCE => FrameKind::Sequence,
			tag::MAPPING => FrameKind::Mapping,
			tag::COMPOSITE => FrameKind::Composite,
			tag::BACKREF => FrameKind::BackRef,
			tag::KEY_STRING => FrameKind::KeyString,
			tag::RANGE if self.range => FrameKind::Range,
			_ => {
				return Err(SerialError::MalformedFrame {
					at,
					reason: "unknown frame tag for this version",
				});
			}
		};
		Ok(kind)
	}

	/// Read and classify the next tag.
	pub fn read_kind(&self, cursor: &mut Cursor<'_>) -> Result<FrameKind> {
		let at = cursor.pos();
		let byte = cursor.read_u8()?;
		self.frame_kind(byte, at)
	}

	/// Write an integer payload.
	pub fn write_int(&self, out: &mut ByteWriter, value: i64) {
		match self.ints {
			IntEncoding::Fixed => out.put_i64_le(value),
			IntEncoding::Varint => out.put_sleb128(value),
		}
	}

	/// Read an integer payload.
	pub fn read_int(&self, cursor: &mut Cursor<'_>) -> Result<i64> {
		match self.ints {
			IntEncoding::Fixed => cursor.read_i64_le(),
			IntEncoding::Varint => cursor.read_sleb128(),
		}
	}

	/// Write a boolean payload.
	pub fn write_bool(&self, out: &mut ByteWriter, value: bool) {
		out.put_u8(u8::from(value));
	}

	/// Read a boolean payload; only `0` and `1` are valid.
	pub fn read_bool(&self, cursor: &mut Cursor<'_>) -> Result<bool> {
		let at = cursor.pos();
		match cursor.read_u8()? {
			0 => Ok(false),
			1 => Ok(true),
			_ => Err(SerialError::MalformedFrame {
				at,
				reason: "boolean payload must be 0 or 1",
			}),
		}
	}

	/// Write a length or element count.
	pub fn write_len(&self, out: &mut ByteWriter, len: usize) -> Result<()> {
		match self.ints {
			IntEncoding::Fixed => {
				let fixed = u32::try_from(len).map_err(|_| SerialError::CollectionTooLarge {
					at: out.len(),
					count: len as u64,
					max: u32::MAX as usize,
				})?;
				out.put_u32_le(fixed);
			}
			IntEncoding::Varint => out.put_uleb128(len as u64),
		}
		Ok(())
	}

	/// Read a length or element count, bounded by `max`.
	pub fn read_len(&self, cursor: &mut Cursor<'_>, max: usize) -> Result<usize> {
		let at = cursor.pos();
		let count = match self.ints {
			IntEncoding::Fixed => u64::from(cursor.read_u32_le()?),
			IntEncoding::Varint => cursor.read_uleb128()?,
		};
		match usize::try_from(count) {
			Ok(len) if len <= max => Ok(len),
			_ => Err(SerialError::CollectionTooLarge { at, count, max }),
		}
	}

	/// Write the ref id carried by a definition frame, when this version has one.
	pub fn write_def_id(&self, out: &mut ByteWriter, ref_id: u32) {
		if self.explicit_ref_ids {
			out.put_u32_le(ref_id);
		}
	}

	/// Check the ref id carried by a definition frame against the reserved one.
	pub fn read_def_id(&self, cursor: &mut Cursor<'_>, reserved: u32) -> Result<()> {
		if !self.explicit_ref_ids {
			return Ok(());
		}
		let at = cursor.pos();
		if cursor.read_u32_le()? != reserved {
			return Err(SerialError::MalformedFrame {
				at,
				reason: "definition ref id out of sequence",
			});
		}
		Ok(())
	}

	/// Write the target of a back-reference.
	pub fn write_ref(&self, out: &mut ByteWriter, ref_id: u32) {
		match self.ints {
			IntEncoding::Fixed => out.put_u32_le(ref_id),
			IntEncoding::Varint => out.put_uleb128(u64::from(ref_id)),
		}
	}

	/// Read the target of a back-reference.
	pub fn read_ref(&self, cursor: &mut Cursor<'_>) -> Result<u32> {
		let at = cursor.pos();
		match self.ints {
			IntEncoding::Fixed => cursor.read_u32_le(),
			IntEncoding::Varint => u32::try_from(cursor.read_uleb128()?).map_err(|_| SerialError::MalformedFrame {
				at,
				reason: "back-reference id exceeds 32 bits",
			}),
		}
	}

	/// Write length-prefixed UTF-8 text.
	pub fn write_text(&self, out: &mut ByteWriter, text: &str) -> Result<()> {
		self.write_len(out, text.len())?;
		out.put_bytes(text.as_bytes());
		Ok(())
	}

	/// Read length-prefixed UTF-8 text of at most `max` bytes.
	pub fn read_text<'a>(&self, cursor: &mut Cursor<'a>, max: usize) -> Result<&'a str> {
		let len = self.read_len(cursor, max)?;
		cursor.read_utf8(len)
	}
}
