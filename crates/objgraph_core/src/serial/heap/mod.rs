use std::collections::HashMap;

use crate::serial::{Composite, Node, NodeId, Result, SerialError, Value};

/// Arena owning every identity-carrying node of one object graph.
///
/// A [`NodeId`] is the identity key: binding the same id in two places shares the
/// node, while two structurally equal nodes allocated separately stay distinct.
#[derive(Debug, Clone, Default)]
pub struct Heap {
	nodes: Vec<Node>,
}

impl Heap {
	/// Create an empty heap.
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of allocated nodes.
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	/// Whether no node has been allocated.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Allocate a node and return its id.
	pub fn alloc(&mut self, node: Node) -> NodeId {
		let id = NodeId(self.nodes.len() as u32);
		self.nodes.push(node);
		id
	}

	/// Allocate a string node.
	pub fn alloc_str(&mut self, text: impl Into<String>) -> Value {
		Value::Ref(self.alloc(Node::Str(text.into())))
	}

	/// Allocate a sequence node.
	pub fn alloc_seq(&mut self, items: Vec<Value>) -> Value {
		Value::Ref(self.alloc(Node::Seq(items)))
	}

	/// Allocate a mapping node.
	pub fn alloc_map(&mut self, entries: Vec<(Value, Value)>) -> Value {
		Value::Ref(self.alloc(Node::Map(entries)))
	}

	/// Allocate a composite node.
	pub fn alloc_composite(&mut self, composite: Composite) -> Value {
		Value::Ref(self.alloc(Node::Composite(composite)))
	}

	/// Borrow a node.
	pub fn node(&self, id: NodeId) -> Option<&Node> {
		self.nodes.get(id.0 as usize)
	}

	/// Mutably borrow a node.
	pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
		self.nodes.get_mut(id.0 as usize)
	}

	/// Borrow the node behind `value`, failing on scalars and unknown ids.
	pub fn resolve(&self, value: &Value) -> Result<&Node> {
		let id = expect_ref(value, "node")?;
		self.node(id).ok_or(SerialError::InvalidHandle {
			node: id.0,
			expected: "node",
		})
	}

	/// Borrow a string node's text.
	pub fn str(&self, value: &Value) -> Result<&str> {
		match self.resolve(value) {
			Ok(Node::Str(text)) => Ok(text),
			_ => Err(invalid(value, "String")),
		}
	}

	/// Borrow a sequence node's items.
	pub fn seq(&self, value: &Value) -> Result<&[Value]> {
		match self.resolve(value) {
			Ok(Node::Seq(items)) => Ok(items),
			_ => Err(invalid(value, "Sequence")),
		}
	}

	/// Mutably borrow a sequence node's items.
	pub fn seq_mut(&mut self, value: &Value) -> Result<&mut Vec<Value>> {
		let id = expect_ref(value, "Sequence")?;
		match self.node_mut(id) {
			Some(Node::Seq(items)) => Ok(items),
			_ => Err(invalid(value, "Sequence")),
		}
	}

	/// Borrow a mapping node's entries.
	pub fn map(&self, value: &Value) -> Result<&[(Value, Value)]> {
		match self.resolve(value) {
			Ok(Node::Map(entries)) => Ok(entries),
			_ => Err(invalid(value, "Mapping")),
		}
	}

	/// Mutably borrow a mapping node's entries.
	pub fn map_mut(&mut self, value: &Value) -> Result<&mut Vec<(Value, Value)>> {
		let id = expect_ref(value, "Mapping")?;
		match self.node_mut(id) {
			Some(Node::Map(entries)) => Ok(entries),
			_ => Err(invalid(value, "Mapping")),
		}
	}

	/// Borrow a composite node.
	pub fn composite(&self, value: &Value) -> Result<&Composite> {
		match self.resolve(value) {
			Ok(Node::Composite(item)) => Ok(item),
			_ => Err(invalid(value, "Composite")),
		}
	}

	/// Mutably borrow a composite node.
	pub fn composite_mut(&mut self, value: &Value) -> Result<&mut Composite> {
		let id = expect_ref(value, "Composite")?;
		match self.node_mut(id) {
			Some(Node::Composite(item)) => Ok(item),
			_ => Err(invalid(value, "Composite")),
		}
	}

	/// Look up a mapping entry whose key is the string `key`.
	pub fn map_get_str(&self, map: &Value, key: &str) -> Result<Option<&Value>> {
		let entries = self.map(map)?;
		Ok(entries
			.iter()
			.find(|(candidate, _)| self.str(candidate).is_ok_and(|text| text == key))
			.map(|(_, value)| value))
	}

	/// Compare two rooted graphs, possibly living in different heaps.
	///
	/// Scalars and strings compare by value; floats compare by bit pattern, so NaN
	/// matches itself.
	///
	/// Sequences, mappings, and composites must also have the same sharing shape:
	/// every container on the left maps to exactly one container on the right, so
	/// cycles and shared children must line up, not just the printed structure.
	pub fn graph_eq(left: &Heap, a: &Value, right: &Heap, b: &Value) -> bool {
		let mut pairing = GraphPairing::default();
		pairing.values_eq(left, a, right, b)
	}
}

#[derive(Default)]
struct GraphPairing {
	forward: HashMap<NodeId, NodeId>,
	backward: HashMap<NodeId, NodeId>,
}

impl GraphPairing {
	fn values_eq(&mut self, left: &Heap, a: &Value, right: &Heap, b: &Value) -> bool {
		let (Value::Ref(ia), Value::Ref(ib)) = (a, b) else {
			return match (a, b) {
				(Value::Float(x), Value::Float(y)) => x.to_bits() == y.to_bits(),
				_ => a == b,
			};
		};
		let (Some(na), Some(nb)) = (left.node(*ia), right.node(*ib)) else {
			return false;
		};

		if let (Node::Str(sa), Node::Str(sb)) = (na, nb) {
			return sa == sb;
		}

		match (self.forward.get(ia), self.backward.get(ib)) {
			(Some(mapped), _) => return mapped == ib,
			(None, Some(_)) => return false,
			(None, None) => {}
		}
		self.forward.insert(*ia, *ib);
		self.backward.insert(*ib, *ia);

		match (na, nb) {
			(Node::Seq(xs), Node::Seq(ys)) => xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| self.values_eq(left, x, right, y)),
			(Node::Map(xs), Node::Map(ys)) => {
				xs.len() == ys.len()
					&& xs
						.iter()
						.zip(ys)
						.all(|((kx, vx), (ky, vy))| self.values_eq(left, kx, right, ky) && self.values_eq(left, vx, right, vy))
			}
			(Node::Composite(x), Node::Composite(y)) => {
				x.type_id == y.type_id
					&& x.fields.len() == y.fields.len()
					&& x
						.fields
						.iter()
						.zip(&y.fields)
						.all(|(fx, fy)| fx.name == fy.name && self.values_eq(left, &fx.value, right, &fy.value))
			}
			_ => false,
		}
	}
}

fn expect_ref(value: &Value, expected: &'static str) -> Result<NodeId> {
	value.as_ref_id().ok_or(SerialError::InvalidHandle { node: u32::MAX, expected })
}

fn invalid(value: &Value, expected: &'static str) -> SerialError {
	SerialError::InvalidHandle {
		node: value.as_ref_id().map_or(u32::MAX, NodeId::index),
		expected,
	}
}
