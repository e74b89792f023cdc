use std::fmt;
use std::str::FromStr;

use crate::serial::bytes::{ByteWriter, Cursor};
use crate::serial::wire::{IntEncoding, WireRules};
use crate::serial::{Result, SerialError};

/// Longest accepted version tag, in bytes.
pub const MAX_VERSION_TAG_LEN: usize = 16;

/// Wire-format versions this build can write and read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FormatVersion {
	/// Fixed-width numerics with explicit ref ids on every definition.
	V1,
	/// LEB128 numerics, implicit definition ids, and range scalars.
	V2,
}

impl FormatVersion {
	/// Every supported version, oldest first.
	pub const ALL: [Self; 2] = [Self::V1, Self::V2];
	/// Newest supported version.
	pub const LATEST: Self = Self::V2;

	/// Version tag written at the start of a stream.
	pub fn tag(self) -> &'static str {
		match self {
			Self::V1 => "1",
			Self::V2 => "2",
		}
	}

	/// Parse a version tag.
	pub fn from_tag(tag: &str) -> Result<Self> {
		match tag {
			"1" => Ok(Self::V1),
			"2" => Ok(Self::V2),
			_ => Err(SerialError::UnsupportedVersion { tag: tag.to_owned() }),
		}
	}

	/// Framing ruleset for this version.
	pub fn rules(self) -> WireRules {
		match self {
			Self::V1 => WireRules {
				version: self,
				ints: IntEncoding::Fixed,
				explicit_ref_ids: true,
				range: false,
			},
			Self::V2 => WireRules {
				version: self,
				ints: IntEncoding::Varint,
				explicit_ref_ids: false,
				range: true,
			},
		}
	}
}

impl fmt::Display for FormatVersion {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.tag())
	}
}

impl FromStr for FormatVersion {
	type Err = SerialError;

	fn from_str(tag: &str) -> Result<Self> {
		Self::from_tag(tag)
	}
}

/// Write the stream header for `version`.
pub fn write_header(out: &mut ByteWriter, version: FormatVersion) {
	let tag = version.tag();
	out.put_u8(tag.len() as u8);
	out.put_bytes(tag.as_bytes());
}

/// Read the stream header and bind the matching ruleset.
///
/// Fails before any frame is parsed when the version has no ruleset.
pub fn read_header(cursor: &mut Cursor<'_>) -> Result<WireRules> {
	let at = cursor.pos();
	let len = usize::from(cursor.read_u8()?);
	if len == 0 || len > MAX_VERSION_TAG_LEN {
		return Err(SerialError::MalformedFrame {
			at,
			reason: "version tag length out of range",
		});
	}

	let raw = cursor.read_exact(len)?;
	if !raw.iter().all(u8::is_ascii_graphic) {
		return Err(SerialError::MalformedFrame {
			at: at + 1,
			reason: "version tag is not printable ASCII",
		});
	}

	let tag = String::from_utf8_lossy(raw);
	Ok(FormatVersion::from_tag(&tag)?.rules())
}

/// Open a stream: returns the bound ruleset and a cursor positioned at the root frame.
pub fn dispatch(bytes: &[u8]) -> Result<(WireRules, Cursor<'_>)> {
	let mut cursor = Cursor::new(bytes);
	let rules = read_header(&mut cursor)?;
	Ok((rules, cursor))
}

/// Whether `bytes` start with something shaped like a stream header.
pub fn looks_like_header(bytes: &[u8]) -> bool {
	let Some(&len) = bytes.first() else {
		return false;
	};
	let len = usize::from(len);
	(1..=MAX_VERSION_TAG_LEN).contains(&len) && bytes.get(1..=len).is_some_and(|tag| tag.iter().all(u8::is_ascii_graphic))
}
