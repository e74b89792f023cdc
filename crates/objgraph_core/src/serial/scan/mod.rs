use std::collections::BTreeMap;

use crate::serial::bytes::Cursor;
use crate::serial::version::dispatch;
use crate::serial::wire::{FrameKind, WireRules};
use crate::serial::{FormatVersion, Result, SerialError};

/// Limits and switches for registry-free frame scans.
#[derive(Debug, Clone)]
pub struct ScanOptions {
	/// Maximum nesting depth of frames.
	pub max_depth: u32,
	/// Maximum element count or string byte length of one frame.
	pub max_collection_len: usize,
	/// Build a [`FrameNode`] outline tree.
	pub outline: bool,
	/// Maximum number of outline nodes before truncation.
	pub max_nodes: usize,
}

impl Default for ScanOptions {
	fn default() -> Self {
		Self {
			max_depth: 256,
			max_collection_len: 1 << 24,
			outline: false,
			max_nodes: 256,
		}
	}
}

/// Summary of one stream's framing.
#[derive(Debug, Clone)]
pub struct FrameReport {
	/// Stream version.
	pub version: FormatVersion,
	/// Total stream length in bytes.
	pub bytes: usize,
	/// Frame count per kind.
	pub frames: BTreeMap<FrameKind, usize>,
	/// Identity-tracked definitions.
	pub definitions: usize,
	/// Back-reference frames.
	pub back_refs: usize,
	/// Deepest frame nesting seen (root is 0).
	pub max_depth: u32,
	/// Composite type identifiers and how many definitions each has.
	pub types: BTreeMap<String, usize>,
	/// Outline tree when requested.
	pub outline: Option<FrameNode>,
	/// Outline stopped growing at `max_nodes`.
	pub outline_truncated: bool,
}

/// One frame in an outline tree.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameNode {
	/// Frame kind.
	pub kind: FrameKind,
	/// Byte offset of the frame tag.
	pub offset: usize,
	/// Ref id defined or referenced by this frame.
	pub ref_id: Option<u32>,
	/// Field name when this frame is a composite field value.
	pub field: Option<String>,
	/// Scalar rendering, string text, or composite type id.
	pub label: Option<String>,
	/// Child frames in stream order.
	pub children: Vec<FrameNode>,
}

/// Walk a stream without a registry, validating framing and back-references.
pub fn scan_frames(bytes: &[u8], opt: &ScanOptions) -> Result<FrameReport> {
	let (rules, cursor) = dispatch(bytes)?;
	let mut scanner = Scanner {
		rules,
		opt,
		cursor,
		defined: 0,
		nodes: 0,
		report: FrameReport {
			version: rules.version,
			bytes: bytes.len(),
			frames: BTreeMap::new(),
			definitions: 0,
			back_refs: 0,
			max_depth: 0,
			types: BTreeMap::new(),
			outline: None,
			outline_truncated: false,
		},
	};

	let root = scanner.frame(0, opt.outline)?;
	if scanner.cursor.remaining() > 0 {
		return Err(SerialError::TrailingBytes {
			at: scanner.cursor.pos(),
			leftover: scanner.cursor.remaining(),
		});
	}

	scanner.report.outline = root;
	Ok(scanner.report)
}

struct Scanner<'a, 'o> {
	rules: WireRules,
	opt: &'o ScanOptions,
	cursor: Cursor<'a>,
	defined: u32,
	nodes: usize,
	report: FrameReport,
}

impl<'a> Scanner<'a, '_> {
	fn frame(&mut self, depth: u32, build: bool) -> Result<Option<FrameNode>> {
		if depth >= self.opt.max_depth {
			return Err(SerialError::DepthExceeded { max_depth: self.opt.max_depth });
		}
		self.report.max_depth = self.report.max_depth.max(depth);

		let offset = self.cursor.pos();
		let kind = self.rules.read_kind(&mut self.cursor)?;
		*self.report.frames.entry(kind).or_insert(0) += 1;

		let build = build && self.claim_node();
		let mut node = FrameNode {
			kind,
			offset,
			ref_id: None,
			field: None,
			label: None,
			children: Vec::new(),
		};

		match kind {
			FrameKind::Null => {}
			FrameKind::Bool => node.label = Some(self.rules.read_bool(&mut self.cursor)?.to_string()),
			FrameKind::Int => node.label = Some(self.rules.read_int(&mut self.cursor)?.to_string()),
			FrameKind::Float => node.label = Some(self.cursor.read_f64_le()?.to_string()),
			FrameKind::Symbol | FrameKind::KeyString => node.label = Some(self.text()?.to_owned()),
			FrameKind::Range => {
				let start = self.rules.read_int(&mut self.cursor)?;
				let end = self.rules.read_int(&mut self.cursor)?;
				node.label = Some(format!("{start}..={end}"));
			}
			FrameKind::String => {
				node.ref_id = Some(self.begin_definition()?);
				node.label = Some(self.text()?.to_owned());
			}
			FrameKind::Sequence => {
				node.ref_id = Some(self.begin_definition()?);
				let count = self.len()?;
				for _ in 0..count {
					self.child(&mut node, depth, build, None)?;
				}
			}
			FrameKind::Mapping => {
				node.ref_id = Some(self.begin_definition()?);
				let count = self.len()?;
				for _ in 0..count {
					self.child(&mut node, depth, build, None)?;
					self.child(&mut node, depth, build, None)?;
				}
			}
			FrameKind::Composite => {
				node.ref_id = Some(self.begin_definition()?);
				let type_id = self.text()?;
				*self.report.types.entry(type_id.to_owned()).or_insert(0) += 1;
				node.label = Some(type_id.to_owned());
				let count = self.len()?;
				for _ in 0..count {
					let name = self.text()?;
					self.child(&mut node, depth, build, Some(name))?;
				}
			}
			FrameKind::BackRef => {
				let ref_id = self.rules.read_ref(&mut self.cursor)?;
				if ref_id >= self.defined {
					return Err(SerialError::DanglingReference { ref_id, at: offset });
				}
				self.report.back_refs += 1;
				node.ref_id = Some(ref_id);
			}
		}

		Ok(build.then_some(node))
	}

	fn child(&mut self, parent: &mut FrameNode, depth: u32, build: bool, field: Option<&str>) -> Result<()> {
		if let Some(mut child) = self.frame(depth + 1, build)? {
			child.field = field.map(str::to_owned);
			parent.children.push(child);
		}
		Ok(())
	}

	fn claim_node(&mut self) -> bool {
		if self.nodes >= self.opt.max_nodes {
			self.report.outline_truncated = true;
			return false;
		}
		self.nodes += 1;
		true
	}

	fn begin_definition(&mut self) -> Result<u32> {
		let ref_id = self.defined;
		self.rules.read_def_id(&mut self.cursor, ref_id)?;
		self.defined += 1;
		self.report.definitions += 1;
		Ok(ref_id)
	}

	fn len(&mut self) -> Result<usize> {
		self.rules.read_len(&mut self.cursor, self.opt.max_collection_len)
	}

	fn text(&mut self) -> Result<&'a str> {
		self.rules.read_text(&mut self.cursor, self.opt.max_collection_len)
	}
}
