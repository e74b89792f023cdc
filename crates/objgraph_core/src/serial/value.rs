use std::fmt;

/// Arena index of an identity-carrying node inside a [`crate::serial::Heap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
	/// Raw arena index.
	pub fn index(self) -> u32 {
		self.0
	}
}

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// Runtime value: inline scalars, or a reference to a heap node.
///
/// Two `Ref` values compare equal only when they name the same node.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	/// Explicit null marker.
	Null,
	/// Boolean scalar.
	Bool(bool),
	/// Signed 64-bit integer.
	Int(i64),
	/// IEEE-754 double.
	Float(f64),
	/// Interned name, copied by value.
	Symbol(Box<str>),
	/// Inclusive integer range.
	Range {
		/// First value.
		start: i64,
		/// Last value, inclusive.
		end: i64,
	},
	/// Reference to a heap node.
	Ref(NodeId),
}

impl Value {
	/// Build a symbol scalar.
	pub fn symbol(name: impl Into<Box<str>>) -> Self {
		Self::Symbol(name.into())
	}

	/// Whether this value is encoded by value (never identity-tracked).
	pub fn is_scalar(&self) -> bool {
		!matches!(self, Self::Ref(_))
	}

	/// Return the referenced node, if any.
	pub fn as_ref_id(&self) -> Option<NodeId> {
		match self {
			Self::Ref(id) => Some(*id),
			_ => None,
		}
	}

	/// Return the integer payload, if any.
	pub fn as_int(&self) -> Option<i64> {
		match self {
			Self::Int(value) => Some(*value),
			_ => None,
		}
	}

	/// Return the boolean payload, if any.
	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Self::Bool(value) => Some(*value),
			_ => None,
		}
	}

	/// Stable kind label used in diagnostics.
	pub fn kind(&self) -> &'static str {
		match self {
			Self::Null => "Null",
			Self::Bool(_) => "Bool",
			Self::Int(_) => "Int",
			Self::Float(_) => "Float",
			Self::Symbol(_) => "Symbol",
			Self::Range { .. } => "Range",
			Self::Ref(_) => "Ref",
		}
	}
}

impl From<bool> for Value {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl From<i64> for Value {
	fn from(value: i64) -> Self {
		Self::Int(value)
	}
}

impl From<f64> for Value {
	fn from(value: f64) -> Self {
		Self::Float(value)
	}
}

impl From<NodeId> for Value {
	fn from(value: NodeId) -> Self {
		Self::Ref(value)
	}
}

/// Named, field-structured record.
#[derive(Debug, Clone, PartialEq)]
pub struct Composite {
	/// Registered type identifier.
	pub type_id: Box<str>,
	/// Fields in insertion order.
	pub fields: Vec<Field>,
}

/// One named field of a composite.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
	/// Field name.
	pub name: Box<str>,
	/// Field value.
	pub value: Value,
}

impl Composite {
	/// Create a composite with no fields.
	pub fn new(type_id: impl Into<Box<str>>) -> Self {
		Self {
			type_id: type_id.into(),
			fields: Vec::new(),
		}
	}

	/// Builder-style field setter.
	pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
		self.set(name, value);
		self
	}

	/// Look up a field by name.
	pub fn get(&self, name: &str) -> Option<&Value> {
		self.fields.iter().find(|field| field.name.as_ref() == name).map(|field| &field.value)
	}

	/// Set a field, replacing an existing value or appending a new field.
	pub fn set(&mut self, name: &str, value: impl Into<Value>) {
		let value = value.into();
		match self.fields.iter_mut().find(|field| field.name.as_ref() == name) {
			Some(field) => field.value = value,
			None => self.fields.push(Field { name: name.into(), value }),
		}
	}

	/// Remove a field, returning its value.
	pub fn remove(&mut self, name: &str) -> Option<Value> {
		let pos = self.fields.iter().position(|field| field.name.as_ref() == name)?;
		Some(self.fields.remove(pos).value)
	}

	/// Field names in order.
	pub fn field_names(&self) -> impl Iterator<Item = &str> {
		self.fields.iter().map(|field| field.name.as_ref())
	}
}

/// Identity-carrying heap node.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
	/// Mutable string.
	Str(String),
	/// Ordered element list.
	Seq(Vec<Value>),
	/// Ordered key/value entries; keys are values themselves.
	Map(Vec<(Value, Value)>),
	/// Registered record type.
	Composite(Composite),
}

impl Node {
	/// Stable kind label used in diagnostics.
	pub fn kind(&self) -> &'static str {
		match self {
			Self::Str(_) => "String",
			Self::Seq(_) => "Sequence",
			Self::Map(_) => "Mapping",
			Self::Composite(_) => "Composite",
		}
	}
}
