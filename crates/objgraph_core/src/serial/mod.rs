mod bytes;
mod codec;
mod compression;
mod decode;
mod encode;
mod error;
mod heap;
mod identity;
mod registry;
mod scan;
mod value;
mod version;
pub mod wire;

/// Frame kinds as classified by a wire ruleset.
pub use wire::FrameKind;

/// Registry-bound encoder/decoder pair.
pub use codec::Codec;
/// Optional zstd envelope helpers.
pub use compression::{Compression, ZSTD_MAGIC, compress, decode_bytes};
/// Decoding entry points and options.
pub use decode::{DecodeOptions, Decoded, decode, decode_with};
/// Encoding entry points and options.
pub use encode::{EncodeOptions, KeyPolicy, encode, encode_with};
/// Error and result aliases.
pub use error::{HookError, Result, SerialError};
/// Arena holding identity-carrying nodes.
pub use heap::Heap;
/// Per-call identity tables.
pub use identity::{DecodeTable, EncodeTable};
/// Type registration and schemas.
pub use registry::{FieldPolicy, Hook, HookResult, TypeRegistry, TypeSchema, TypeSchemaBuilder};
/// Registry-free stream inspection.
pub use scan::{FrameNode, FrameReport, ScanOptions, scan_frames};
/// Runtime value types.
pub use value::{Composite, Field, Node, NodeId, Value};
/// Format versions and header dispatch.
pub use version::{FormatVersion, MAX_VERSION_TAG_LEN, looks_like_header};
