#![allow(missing_docs)]

use objgraph::serial::{
	Composite, Compression, DecodeOptions, FieldPolicy, FormatVersion, Heap, ScanOptions, SerialError, TypeRegistry, Value,
	compress, decode, decode_bytes, decode_with, encode, scan_frames,
};
use objgraph_testkit::scratch_path;

fn sample(heap: &mut Heap) -> Value {
	let shared = heap.alloc_str("shared");
	let items = heap.alloc_seq((0..64).map(Value::Int).chain([shared.clone(), shared]).collect());
	heap.alloc_composite(Composite::new("Bag").with("items", items.clone()).with("again", items))
}

fn registry() -> TypeRegistry {
	let mut registry = TypeRegistry::new();
	registry.register("Bag", FieldPolicy::All, None, None);
	registry
}

#[test]
fn zstd_envelope_survives_a_file_round_trip() {
	let registry = registry();
	let mut heap = Heap::new();
	let root = sample(&mut heap);

	let stream = encode(&mut heap, &registry, &root, FormatVersion::V2).expect("encodes");
	let path = scratch_path("envelope.objgraph.zst");
	std::fs::write(&path, compress(&stream, 3).expect("compresses")).expect("writes scratch file");

	let raw = std::fs::read(&path).expect("reads scratch file");
	let (mode, bytes) = decode_bytes(raw).expect("envelope strips");
	assert_eq!(mode, Compression::Zstd);
	assert_eq!(bytes, stream);

	let decoded = decode(&bytes, &registry).expect("decodes");
	assert!(Heap::graph_eq(&heap, &root, &decoded.heap, &decoded.root));
}

#[test]
fn raw_stream_passes_through_envelope_detection() {
	let registry = registry();
	let mut heap = Heap::new();
	let root = sample(&mut heap);

	let stream = encode(&mut heap, &registry, &root, FormatVersion::V1).expect("encodes");
	let (mode, bytes) = decode_bytes(stream.clone()).expect("raw stream accepted");
	assert_eq!(mode, Compression::None);
	assert_eq!(bytes, stream);
}

#[test]
fn scan_and_decode_agree_on_shape() {
	let registry = registry();
	let mut heap = Heap::new();
	let root = sample(&mut heap);
	let stream = encode(&mut heap, &registry, &root, FormatVersion::V2).expect("encodes");

	let report = scan_frames(&stream, &ScanOptions::default()).expect("scans");
	assert_eq!(report.version, FormatVersion::V2);
	assert_eq!(report.bytes, stream.len());
	assert_eq!(report.types.get("Bag"), Some(&1));
	assert_eq!(report.back_refs, 2, "repeated string and repeated sequence");
	assert_eq!(report.definitions, 3);
}

#[test]
fn deep_nesting_is_bounded() {
	let registry = TypeRegistry::new();
	let mut heap = Heap::new();
	let mut root = heap.alloc_seq(Vec::new());
	for _ in 0..100 {
		root = heap.alloc_seq(vec![root]);
	}

	let stream = encode(&mut heap, &registry, &root, FormatVersion::V2).expect("encodes");
	decode(&stream, &registry).expect("default depth admits 100 levels");

	let err = decode_with(&stream, &registry, &DecodeOptions::strict()).expect_err("strict depth rejects");
	assert!(matches!(err, SerialError::DepthExceeded { max_depth: 64 }));
}
