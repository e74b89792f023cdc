use std::collections::HashMap;

use crate::serial::{NodeId, Result, SerialError};

/// Encode-side identity table: node identity to compact ref id.
///
/// Scoped to one encode call.
#[derive(Debug, Default)]
pub struct EncodeTable {
	ids: HashMap<NodeId, u32>,
}

impl EncodeTable {
	/// Create an empty table.
	pub fn new() -> Self {
		Self::default()
	}

	/// Return `(ref_id, first_occurrence)` for `node`, assigning the next id on first sight.
	pub fn intern(&mut self, node: NodeId) -> (u32, bool) {
		let next = self.ids.len() as u32;
		match self.ids.get(&node) {
			Some(ref_id) => (*ref_id, false),
			None => {
				self.ids.insert(node, next);
				(next, true)
			}
		}
	}

	/// Number of assigned ref ids.
	pub fn len(&self) -> usize {
		self.ids.len()
	}

	/// Whether no id has been assigned.
	pub fn is_empty(&self) -> bool {
		self.ids.is_empty()
	}
}

/// Decode-side identity table: ref id to materialized node.
///
/// Ids are reserved in stream order before a definition's children are read, so a
/// back-reference from inside its own definition already resolves.
#[derive(Debug, Default)]
pub struct DecodeTable {
	slots: Vec<Option<NodeId>>,
}

impl DecodeTable {
	/// Create an empty table.
	pub fn new() -> Self {
		Self::default()
	}

	/// Allocate the next ref id with no node bound yet.
	pub fn reserve(&mut self) -> u32 {
		self.slots.push(None);
		(self.slots.len() - 1) as u32
	}

	/// Bind a reserved ref id to its node; `at` is the definition frame offset.
	pub fn bind(&mut self, ref_id: u32, node: NodeId, at: usize) -> Result<()> {
		match self.slots.get_mut(ref_id as usize) {
			Some(slot) if slot.is_none() => {
				*slot = Some(node);
				Ok(())
			}
			Some(_) => Err(SerialError::MalformedFrame {
				at,
				reason: "ref id bound twice",
			}),
			None => Err(SerialError::MalformedFrame {
				at,
				reason: "ref id bound before it was reserved",
			}),
		}
	}

	/// Resolve a back-reference read at byte offset `at`.
	pub fn lookup(&self, ref_id: u32, at: usize) -> Result<NodeId> {
		self.slots
			.get(ref_id as usize)
			.copied()
			.flatten()
			.ok_or(SerialError::DanglingReference { ref_id, at })
	}

	/// Number of reserved ref ids.
	pub fn len(&self) -> usize {
		self.slots.len()
	}

	/// Whether no id has been reserved.
	pub fn is_empty(&self) -> bool {
		self.slots.is_empty()
	}
}
