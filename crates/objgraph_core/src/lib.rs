//! Public library API for encoding typed, possibly cyclic object graphs into a
//! versioned binary stream and decoding them back.

/// Heap/value model, type registry, identity tables, wire rules, and the codec.
pub mod serial;
