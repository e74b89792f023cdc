use crate::serial::{Result, SerialError};

/// Simple bounded cursor over an immutable byte slice.
#[derive(Debug)]
pub struct Cursor<'a> {
	bytes: &'a [u8],
	pos: usize,
}

impl<'a> Cursor<'a> {
	/// Create a cursor at position 0.
	pub fn new(bytes: &'a [u8]) -> Self {
		Self { bytes, pos: 0 }
	}

	/// Return current byte offset.
	pub fn pos(&self) -> usize {
		self.pos
	}

	/// Return remaining unread bytes.
	pub fn remaining(&self) -> usize {
		self.bytes.len().saturating_sub(self.pos)
	}

	/// Read exactly `n` bytes and advance cursor.
	pub fn read_exact(&mut self, n: usize) -> Result<&'a [u8]> {
		if n > self.remaining() {
			return Err(SerialError::TruncatedFrame {
				at: self.pos,
				need: n,
				rem: self.remaining(),
			});
		}

		let start = self.pos;
		self.pos += n;
		Ok(&self.bytes[start..self.pos])
	}

	/// Read one byte.
	pub fn read_u8(&mut self) -> Result<u8> {
		Ok(self.read_exact(1)?[0])
	}

	/// Read a little-endian `u32`.
	pub fn read_u32_le(&mut self) -> Result<u32> {
		let raw = self.read_exact(4)?;
		let mut buf = [0_u8; 4];
		buf.copy_from_slice(raw);
		Ok(u32::from_le_bytes(buf))
	}

	/// Read a little-endian `i64`.
	pub fn read_i64_le(&mut self) -> Result<i64> {
		let raw = self.read_exact(8)?;
		let mut buf = [0_u8; 8];
		buf.copy_from_slice(raw);
		Ok(i64::from_le_bytes(buf))
	}

	/// Read a little-endian IEEE-754 `f64`.
	pub fn read_f64_le(&mut self) -> Result<f64> {
		let raw = self.read_exact(8)?;
		let mut buf = [0_u8; 8];
		buf.copy_from_slice(raw);
		Ok(f64::from_le_bytes(buf))
	}

	/// Read an unsigned LEB128 integer.
	pub fn read_uleb128(&mut self) -> Result<u64> {
		let start = self.pos;
		let mut value = 0_u64;
		let mut shift = 0_u32;
		for i in 0..10 {
			let byte = self.read_u8()?;
			let payload = byte & 0x7f;
			if i == 9 && payload > 1 {
				return Err(SerialError::MalformedFrame {
					at: start,
					reason: "unsigned varint overflows 64 bits",
				});
			}
			value |= u64::from(payload) << shift;
			if byte & 0x80 == 0 {
				return Ok(value);
			}
			shift += 7;
		}
		Err(SerialError::MalformedFrame {
			at: start,
			reason: "unterminated unsigned varint",
		})
	}

	/// Read a signed LEB128 integer.
	pub fn read_sleb128(&mut self) -> Result<i64> {
		let start = self.pos;
		let mut value = 0_i64;
		let mut shift = 0_u32;
		let mut last = 0_u8;

		for i in 0..10 {
			let byte = self.read_u8()?;
			last = byte;
			let payload = byte & 0x7f;
			if i == 9 && payload != 0x00 && payload != 0x7f {
				return Err(SerialError::MalformedFrame {
					at: start,
					reason: "signed varint overflows 64 bits",
				});
			}
			value |= i64::from(payload) << shift;
			shift += 7;
			if byte & 0x80 == 0 {
				break;
			}
		}

		if last & 0x80 != 0 {
			return Err(SerialError::MalformedFrame {
				at: start,
				reason: "unterminated signed varint",
			});
		}

		// Sign extend from the last payload byte.
		if shift < 64 && last & 0x40 != 0 {
			value |= (!0_i64) << shift;
		}
		Ok(value)
	}

	/// Read `len` bytes and validate them as UTF-8.
	pub fn read_utf8(&mut self, len: usize) -> Result<&'a str> {
		let at = self.pos;
		let raw = self.read_exact(len)?;
		std::str::from_utf8(raw).map_err(|_| SerialError::MalformedFrame {
			at,
			reason: "string payload is not valid UTF-8",
		})
	}
}

/// Append-only byte sink used by the encoder.
#[derive(Debug, Default)]
pub struct ByteWriter {
	buf: Vec<u8>,
}

impl ByteWriter {
	/// Create an empty writer.
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of bytes written so far.
	pub fn len(&self) -> usize {
		self.buf.len()
	}

	/// Whether nothing was written yet.
	pub fn is_empty(&self) -> bool {
		self.buf.is_empty()
	}

	/// Append one byte.
	pub fn put_u8(&mut self, byte: u8) {
		self.buf.push(byte);
	}

	/// Append raw bytes.
	pub fn put_bytes(&mut self, bytes: &[u8]) {
		self.buf.extend_from_slice(bytes);
	}

	/// Append a little-endian `u32`.
	pub fn put_u32_le(&mut self, value: u32) {
		self.buf.extend_from_slice(&value.to_le_bytes());
	}

	/// Append a little-endian `i64`.
	pub fn put_i64_le(&mut self, value: i64) {
		self.buf.extend_from_slice(&value.to_le_bytes());
	}

	/// Append a little-endian `f64`.
	pub fn put_f64_le(&mut self, value: f64) {
		self.buf.extend_from_slice(&value.to_le_bytes());
	}

	/// Append an unsigned LEB128 integer.
	pub fn put_uleb128(&mut self, mut value: u64) {
		loop {
			let mut byte = (value & 0x7f) as u8;
			value >>= 7;
			if value != 0 {
				byte |= 0x80;
			}
			self.buf.push(byte);
			if value == 0 {
				break;
			}
		}
	}

	/// Append a signed LEB128 integer.
	pub fn put_sleb128(&mut self, mut value: i64) {
		loop {
			let byte = (value & 0x7f) as u8;
			let sign = byte & 0x40 != 0;
			value >>= 7;
			if (value == 0 && !sign) || (value == -1 && sign) {
				self.buf.push(byte);
				break;
			}
			self.buf.push(byte | 0x80);
		}
	}

	/// Consume the writer and return the bytes.
	pub fn into_bytes(self) -> Vec<u8> {
		self.buf
	}
}
