use super::{DecodeOptions, decode, decode_with};
use crate::serial::wire::tag;
use crate::serial::{Composite, FieldPolicy, FormatVersion, Heap, SerialError, TypeRegistry, TypeSchema, Value};

fn v2(frames: &[u8]) -> Vec<u8> {
	let mut bytes = vec![0x01, b'2'];
	bytes.extend_from_slice(frames);
	bytes
}

fn composite_frame(type_id: &str, fields: &[(&str, &[u8])]) -> Vec<u8> {
	let mut out = vec![tag::COMPOSITE, type_id.len() as u8];
	out.extend_from_slice(type_id.as_bytes());
	out.push(fields.len() as u8);
	for (name, value) in fields {
		out.push(name.len() as u8);
		out.extend_from_slice(name.as_bytes());
		out.extend_from_slice(value);
	}
	out
}

#[test]
fn self_referential_pair_from_v1_bytes() {
	let mut registry = TypeRegistry::new();
	registry.register("Pair", FieldPolicy::All, None, None);

	let mut bytes = vec![0x01, b'1', tag::COMPOSITE, 0, 0, 0, 0, 4, 0, 0, 0];
	bytes.extend_from_slice(b"Pair");
	bytes.extend_from_slice(&[2, 0, 0, 0, 1, 0, 0, 0, b'a', tag::INT]);
	bytes.extend_from_slice(&1_i64.to_le_bytes());
	bytes.extend_from_slice(&[1, 0, 0, 0, b'b', tag::BACKREF, 0, 0, 0, 0]);

	let decoded = decode(&bytes, &registry).expect("decodes");
	assert_eq!(decoded.version, FormatVersion::V1);
	let pair = decoded.heap.composite(&decoded.root).expect("composite");
	assert_eq!(pair.type_id.as_ref(), "Pair");
	assert_eq!(pair.get("a"), Some(&Value::Int(1)));
	assert_eq!(pair.get("b"), Some(&decoded.root), "b is the pair itself");
}

#[test]
fn unknown_version_yields_no_graph() {
	let registry = TypeRegistry::new();
	let err = decode(&[0x01, b'7', tag::NULL], &registry).expect_err("version 7 has no ruleset");
	assert!(matches!(err, SerialError::UnsupportedVersion { ref tag } if tag == "7"));
}

#[test]
fn backref_to_undefined_id_is_dangling() {
	let registry = TypeRegistry::new();
	let bytes = v2(&[tag::SEQUENCE, 1, tag::BACKREF, 5]);
	let err = decode(&bytes, &registry).expect_err("id 5 never defined");
	assert!(matches!(err, SerialError::DanglingReference { ref_id: 5, at: 4 }));
}

#[test]
fn unknown_type_is_fatal() {
	let registry = TypeRegistry::new();
	let bytes = v2(&composite_frame("Ghost", &[]));
	let err = decode(&bytes, &registry).expect_err("Ghost is not registered");
	assert!(matches!(err, SerialError::UnknownType { ref type_id, at: 2 } if type_id == "Ghost"));
}

#[test]
fn truncated_stream_is_reported() {
	let registry = TypeRegistry::new();
	let bytes = v2(&[tag::SEQUENCE, 3, tag::INT, 1]);
	let err = decode(&bytes, &registry).expect_err("two elements missing");
	assert!(matches!(err, SerialError::TruncatedFrame { at: 6, need: 1, rem: 0 }));
}

#[test]
fn trailing_bytes_need_opt_in() {
	let registry = TypeRegistry::new();
	let bytes = v2(&[tag::NULL, 0xEE]);

	let err = decode(&bytes, &registry).expect_err("junk after root");
	assert!(matches!(err, SerialError::TrailingBytes { at: 3, leftover: 1 }));

	let lenient = DecodeOptions {
		allow_trailing_bytes: true,
		..DecodeOptions::default()
	};
	let decoded = decode_with(&bytes, &registry, &lenient).expect("trailing bytes allowed");
	assert_eq!(decoded.root, Value::Null);
}

#[test]
fn oversized_count_is_rejected_before_allocation() {
	let registry = TypeRegistry::new();
	let bytes = v2(&[tag::SEQUENCE, 0xff, 0xff, 0xff, 0xff, 0x0f]);
	let err = decode_with(&bytes, &registry, &DecodeOptions::strict()).expect_err("count too large");
	assert!(matches!(err, SerialError::CollectionTooLarge { at: 3, count: 0xffff_ffff, .. }));
}

#[test]
fn v1_definition_ids_must_follow_stream_order() {
	let registry = TypeRegistry::new();
	let bytes = [0x01, b'1', tag::SEQUENCE, 1, 0, 0, 0, 0, 0, 0, 0];
	let err = decode(&bytes, &registry).expect_err("first definition must be id 0");
	assert!(matches!(err, SerialError::MalformedFrame { at: 3, .. }));
}

#[test]
fn nesting_beyond_limit_fails_cleanly() {
	let registry = TypeRegistry::new();
	let mut frames = Vec::new();
	for _ in 0..100 {
		frames.extend_from_slice(&[tag::SEQUENCE, 1]);
	}
	frames.push(tag::NULL);

	let err = decode_with(&v2(&frames), &registry, &DecodeOptions::strict()).expect_err("too deep");
	assert!(matches!(err, SerialError::DepthExceeded { max_depth: 64 }));
}

#[test]
fn defaults_fill_fields_missing_from_stream() {
	let mut registry = TypeRegistry::new();
	registry.insert(
		TypeSchema::builder("Account")
			.exclude(["secret"])
			.field_default("secret", Value::Null)
			.field_default("login", 0_i64)
			.build()
			.expect("schema builds"),
	);

	let bytes = v2(&composite_frame("Account", &[("login", &[tag::INT, 7])]));
	let decoded = decode(&bytes, &registry).expect("decodes");
	let account = decoded.heap.composite(&decoded.root).expect("composite");
	assert_eq!(account.get("secret"), Some(&Value::Null));
	assert_eq!(account.get("login"), Some(&Value::Int(7)));
	assert_eq!(account.field_names().collect::<Vec<_>>(), vec!["secret", "login"]);
}

#[test]
fn excluded_field_in_stream_is_discarded() {
	let mut registry = TypeRegistry::new();
	registry.register("Account", FieldPolicy::exclude(["secret"]), None, None);

	let bytes = v2(&composite_frame("Account", &[("secret", &[tag::INT, 9]), ("login", &[tag::INT, 1])]));
	let decoded = decode(&bytes, &registry).expect("decodes");
	let account = decoded.heap.composite(&decoded.root).expect("composite");
	assert_eq!(account.get("secret"), None);
	assert_eq!(account.get("login"), Some(&Value::Int(1)));
}

#[test]
fn post_decode_hook_sees_decoded_fields() {
	let mut registry = TypeRegistry::new();
	registry.insert(
		TypeSchema::builder("Loaded")
			.exclude(["loaded", "seen"])
			.post_decode(|item: &mut Composite| {
				let seen = item.fields.len() as i64;
				item.set("loaded", true);
				item.set("seen", seen);
				Ok(())
			})
			.build()
			.expect("schema builds"),
	);

	let bytes = v2(&composite_frame("Loaded", &[("x", &[tag::INT, 2]), ("y", &[tag::INT, 4])]));
	let decoded = decode(&bytes, &registry).expect("decodes");
	let item = decoded.heap.composite(&decoded.root).expect("composite");
	assert_eq!(item.get("loaded"), Some(&Value::Bool(true)));
	assert_eq!(item.get("seen"), Some(&Value::Int(2)));
}

#[test]
fn hook_error_aborts_decode() {
	let mut registry = TypeRegistry::new();
	registry.insert(
		TypeSchema::builder("Strict")
			.post_decode(|item: &mut Composite| match item.get("ok") {
				Some(Value::Bool(true)) => Ok(()),
				_ => Err("missing ok flag".into()),
			})
			.build()
			.expect("schema builds"),
	);

	let bytes = v2(&composite_frame("Strict", &[]));
	let err = decode(&bytes, &registry).expect_err("hook rejects");
	assert!(matches!(err, SerialError::Hook { ref type_id, .. } if type_id == "Strict"));
}

#[test]
fn key_strings_decode_as_fresh_nodes() {
	let registry = TypeRegistry::new();
	let bytes = v2(&[
		tag::SEQUENCE,
		2,
		tag::MAPPING,
		1,
		tag::KEY_STRING,
		1,
		b'k',
		tag::NULL,
		tag::MAPPING,
		1,
		tag::KEY_STRING,
		1,
		b'k',
		tag::NULL,
	]);

	let decoded = decode(&bytes, &registry).expect("decodes");
	let maps = decoded.heap.seq(&decoded.root).expect("sequence");
	let first_key = decoded.heap.map(&maps[0]).expect("mapping")[0].0.clone();
	let second_key = decoded.heap.map(&maps[1]).expect("mapping")[0].0.clone();
	assert_ne!(first_key, second_key);
	assert_eq!(decoded.heap.str(&first_key).expect("string"), "k");
	assert_eq!(decoded.heap.str(&second_key).expect("string"), "k");
}

#[test]
fn range_scalar_decodes_in_v2_only() {
	let registry = TypeRegistry::new();
	let decoded = decode(&v2(&[tag::RANGE, 42, 0xc0, 0x00]), &registry).expect("v2 range");
	assert_eq!(decoded.root, Value::Range { start: 42, end: 64 });
	assert!(decoded.heap.is_empty());

	let err = decode(&[0x01, b'1', tag::RANGE], &registry).expect_err("v1 has no range tag");
	assert!(matches!(err, SerialError::MalformedFrame { at: 2, .. }));
}

#[test]
fn float_payload_is_bit_exact() {
	let registry = TypeRegistry::new();
	let mut frames = vec![tag::FLOAT];
	frames.extend_from_slice(&1.23456_f64.to_le_bytes());
	let decoded = decode(&v2(&frames), &registry).expect("decodes");
	assert_eq!(decoded.root, Value::Float(1.23456));
	assert!(Heap::graph_eq(&decoded.heap, &decoded.root, &Heap::new(), &Value::Float(1.23456)));
}
