use crate::serial::{Composite, FieldPolicy, SerialError, TypeRegistry, TypeSchema, Value};

#[test]
fn policies_select_fields() {
	let all = FieldPolicy::All;
	let deny = FieldPolicy::exclude(["secret"]);
	let allow = FieldPolicy::include_only(["a", "b"]);

	assert!(all.includes("secret"));
	assert!(!deny.includes("secret"));
	assert!(deny.includes("a"));
	assert!(allow.includes("b"));
	assert!(!allow.includes("c"));
}

#[test]
fn reregistration_overwrites() {
	let mut registry = TypeRegistry::new();
	registry.register("Pair", FieldPolicy::All, None, None);
	registry.register("Pair", FieldPolicy::exclude(["b"]), None, None);

	assert_eq!(registry.len(), 1);
	let schema = registry.resolve("Pair").expect("registered");
	assert!(!schema.policy().includes("b"));
}

#[test]
fn resolve_unknown_type_fails() {
	let registry = TypeRegistry::new();
	let err = registry.resolve("Missing").expect_err("nothing registered");
	assert!(matches!(err, SerialError::NotRegistered { ref type_id } if type_id == "Missing"));
}

#[test]
fn builder_keeps_last_policy_and_defaults() {
	let schema = TypeSchema::builder("Point")
		.exclude(["cache"])
		.include_only(["x", "y"])
		.field_default("x", 0_i64)
		.field_default("y", 0_i64)
		.field_default("x", 5_i64)
		.build()
		.expect("scalar defaults are valid");

	assert_eq!(schema.policy(), &FieldPolicy::include_only(["x", "y"]));
	let item = schema.instantiate();
	assert_eq!(item.field_names().collect::<Vec<_>>(), vec!["x", "y"]);
	assert_eq!(item.get("x"), Some(&Value::Int(5)));
}

#[test]
fn repeated_exclusions_accumulate() {
	let schema = TypeSchema::builder("T").exclude(["a"]).exclude(["b", "a"]).build().expect("schema builds");
	assert_eq!(schema.policy(), &FieldPolicy::exclude(["a", "b"]));

	let schema = TypeSchema::builder("T")
		.include_only(["x"])
		.include_only(["y"])
		.build()
		.expect("schema builds");
	assert_eq!(schema.policy(), &FieldPolicy::include_only(["x", "y"]));
}

#[test]
fn repeated_exclusions_hold_across_a_round_trip() {
	use crate::serial::{FormatVersion, Heap, decode, encode};

	let mut registry = TypeRegistry::new();
	registry.insert(TypeSchema::builder("T").exclude(["a"]).exclude(["b"]).build().expect("schema builds"));

	let mut heap = Heap::new();
	let root = heap.alloc_composite(Composite::new("T").with("a", 1_i64).with("b", 2_i64).with("c", 3_i64));
	let bytes = encode(&mut heap, &registry, &root, FormatVersion::V2).expect("encodes");
	let decoded = decode(&bytes, &registry).expect("decodes");

	let item = decoded.heap.composite(&decoded.root).expect("composite");
	assert_eq!(item.field_names().collect::<Vec<_>>(), vec!["c"]);
	assert_eq!(item.get("a"), None);
}

#[test]
fn heap_default_is_rejected() {
	let mut heap = crate::serial::Heap::new();
	let list = heap.alloc_seq(Vec::new());
	let err = TypeSchema::builder("Bag").field_default("items", list).build().expect_err("ref default");
	assert!(matches!(err, SerialError::InvalidDefault { ref field, .. } if field == "items"));
}

#[test]
fn hook_failure_carries_type_and_source() {
	let schema = TypeSchema::builder("Flaky")
		.post_decode(|_item: &mut Composite| Err("refused".into()))
		.build()
		.expect("schema builds");

	let mut item = schema.instantiate();
	let err = schema.run_post_decode(&mut item).expect_err("hook fails");
	match err {
		SerialError::Hook { type_id, source } => {
			assert_eq!(type_id, "Flaky");
			assert_eq!(source.to_string(), "refused");
		}
		other => panic!("unexpected error: {other}"),
	}
}

#[test]
fn type_ids_are_sorted() {
	let mut registry = TypeRegistry::new();
	for id in ["b", "c", "a"] {
		registry.register(id, FieldPolicy::All, None, None);
	}
	assert_eq!(registry.type_ids(), vec!["a", "b", "c"]);
	assert!(registry.contains("c"));
}
