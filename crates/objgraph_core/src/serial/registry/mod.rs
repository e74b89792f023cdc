use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::serial::{Composite, HookError, Result, SerialError, Value};

/// Result returned by lifecycle hooks.
pub type HookResult = std::result::Result<(), HookError>;

/// Lifecycle hook invoked on a composite right before encode or right after decode.
pub type Hook = Arc<dyn Fn(&mut Composite) -> HookResult + Send + Sync>;

/// Per-type rule selecting which fields participate in serialization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldPolicy {
	/// Every field is serialized.
	#[default]
	All,
	/// Every field except the listed ones.
	ExcludeFields(BTreeSet<Box<str>>),
	/// Only the listed fields.
	IncludeOnlyFields(BTreeSet<Box<str>>),
}

impl FieldPolicy {
	/// Deny-list policy.
	pub fn exclude<I, S>(names: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<Box<str>>,
	{
		Self::ExcludeFields(names.into_iter().map(Into::into).collect())
	}

	/// Allow-list policy.
	pub fn include_only<I, S>(names: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<Box<str>>,
	{
		Self::IncludeOnlyFields(names.into_iter().map(Into::into).collect())
	}

	/// Whether `name` is written to and expected on the wire.
	pub fn includes(&self, name: &str) -> bool {
		match self {
			Self::All => true,
			Self::ExcludeFields(names) => !names.contains(name),
			Self::IncludeOnlyFields(names) => names.contains(name),
		}
	}
}

/// Serialization schema registered for one composite type.
#[derive(Clone)]
pub struct TypeSchema {
	type_id: Box<str>,
	policy: FieldPolicy,
	defaults: Vec<(Box<str>, Value)>,
	pre_encode: Option<Hook>,
	post_decode: Option<Hook>,
}

impl fmt::Debug for TypeSchema {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TypeSchema")
			.field("type_id", &self.type_id)
			.field("policy", &self.policy)
			.field("defaults", &self.defaults)
			.field("pre_encode", &self.pre_encode.is_some())
			.field("post_decode", &self.post_decode.is_some())
			.finish()
	}
}

impl TypeSchema {
	/// Start building a schema for `type_id`.
	pub fn builder(type_id: impl Into<Box<str>>) -> TypeSchemaBuilder {
		TypeSchemaBuilder {
			schema: Self {
				type_id: type_id.into(),
				policy: FieldPolicy::All,
				defaults: Vec::new(),
				pre_encode: None,
				post_decode: None,
			},
		}
	}

	/// Registered type identifier.
	pub fn type_id(&self) -> &str {
		&self.type_id
	}

	/// Field inclusion policy.
	pub fn policy(&self) -> &FieldPolicy {
		&self.policy
	}

	/// Declared field defaults, in declaration order.
	pub fn defaults(&self) -> &[(Box<str>, Value)] {
		&self.defaults
	}

	/// Fresh composite holding only the declared defaults.
	pub fn instantiate(&self) -> Composite {
		let mut item = Composite::new(self.type_id.clone());
		for (name, value) in &self.defaults {
			item.set(name, value.clone());
		}
		item
	}

	/// Run the pre-encode hook, if any.
	pub fn run_pre_encode(&self, item: &mut Composite) -> Result<()> {
		self.run_hook(self.pre_encode.as_ref(), item)
	}

	/// Run the post-decode hook, if any.
	pub fn run_post_decode(&self, item: &mut Composite) -> Result<()> {
		self.run_hook(self.post_decode.as_ref(), item)
	}

	fn run_hook(&self, hook: Option<&Hook>, item: &mut Composite) -> Result<()> {
		let Some(hook) = hook else {
			return Ok(());
		};
		hook(item).map_err(|source| SerialError::Hook {
			type_id: self.type_id.to_string(),
			source,
		})
	}
}

/// Builder for [`TypeSchema`].
#[derive(Debug)]
pub struct TypeSchemaBuilder {
	schema: TypeSchema,
}

impl TypeSchemaBuilder {
	/// Serialize every field except `names`.
	///
	/// Repeated calls accumulate; switching from include-only starts a fresh list.
	pub fn exclude<I, S>(mut self, names: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<Box<str>>,
	{
		match &mut self.schema.policy {
			FieldPolicy::ExcludeFields(set) => set.extend(names.into_iter().map(Into::into)),
			policy => *policy = FieldPolicy::exclude(names),
		}
		self
	}

	/// Serialize only `names`.
	///
	/// Repeated calls accumulate; switching from exclude starts a fresh list.
	pub fn include_only<I, S>(mut self, names: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<Box<str>>,
	{
		match &mut self.schema.policy {
			FieldPolicy::IncludeOnlyFields(set) => set.extend(names.into_iter().map(Into::into)),
			policy => *policy = FieldPolicy::include_only(names),
		}
		self
	}

	/// Replace the field policy.
	pub fn policy(mut self, policy: FieldPolicy) -> Self {
		self.schema.policy = policy;
		self
	}

	/// Declare the value a decoded composite starts with for `name`.
	pub fn field_default(mut self, name: impl Into<Box<str>>, value: impl Into<Value>) -> Self {
		let name = name.into();
		let value = value.into();
		match self.schema.defaults.iter_mut().find(|(existing, _)| *existing == name) {
			Some(slot) => slot.1 = value,
			None => self.schema.defaults.push((name, value)),
		}
		self
	}

	/// Hook run on the composite before its fields are extracted for encode.
	pub fn pre_encode<F>(mut self, hook: F) -> Self
	where
		F: Fn(&mut Composite) -> HookResult + Send + Sync + 'static,
	{
		self.schema.pre_encode = Some(Arc::new(hook));
		self
	}

	/// Hook run on the composite after its fields are decoded.
	pub fn post_decode<F>(mut self, hook: F) -> Self
	where
		F: Fn(&mut Composite) -> HookResult + Send + Sync + 'static,
	{
		self.schema.post_decode = Some(Arc::new(hook));
		self
	}

	/// Validate and finish the schema.
	pub fn build(self) -> Result<TypeSchema> {
		if let Some((name, _)) = self.schema.defaults.iter().find(|(_, value)| !value.is_scalar()) {
			return Err(SerialError::InvalidDefault {
				type_id: self.schema.type_id.to_string(),
				field: name.to_string(),
			});
		}
		Ok(self.schema)
	}
}

/// Registry mapping type identifiers to their schemas.
///
/// Register every type before sharing the registry; lookups only need `&self`
/// so one registry can back concurrent encode and decode calls.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
	types: HashMap<Box<str>, Arc<TypeSchema>>,
}

impl TypeRegistry {
	/// Create an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Register a built schema, replacing any previous one for the same type.
	pub fn insert(&mut self, schema: TypeSchema) -> Option<Arc<TypeSchema>> {
		self.types.insert(schema.type_id.clone(), Arc::new(schema))
	}

	/// Register a type with a field policy and optional hooks.
	pub fn register(&mut self, type_id: &str, policy: FieldPolicy, pre_encode: Option<Hook>, post_decode: Option<Hook>) {
		let mut schema = TypeSchema::builder(type_id).policy(policy).schema;
		schema.pre_encode = pre_encode;
		schema.post_decode = post_decode;
		self.insert(schema);
	}

	/// Look up the schema for `type_id`.
	pub fn resolve(&self, type_id: &str) -> Result<&Arc<TypeSchema>> {
		self.types.get(type_id).ok_or_else(|| SerialError::NotRegistered { type_id: type_id.to_owned() })
	}

	/// Look up the schema for `type_id`, if registered.
	pub fn get(&self, type_id: &str) -> Option<&Arc<TypeSchema>> {
		self.types.get(type_id)
	}

	/// Whether `type_id` is registered.
	pub fn contains(&self, type_id: &str) -> bool {
		self.types.contains_key(type_id)
	}

	/// Number of registered types.
	pub fn len(&self) -> usize {
		self.types.len()
	}

	/// Whether no type is registered.
	pub fn is_empty(&self) -> bool {
		self.types.is_empty()
	}

	/// Registered type identifiers, sorted.
	pub fn type_ids(&self) -> Vec<&str> {
		let mut ids: Vec<&str> = self.types.keys().map(AsRef::as_ref).collect();
		ids.sort_unstable();
		ids
	}
}

#[cfg(test)]
mod tests;
