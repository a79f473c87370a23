//! Wirebound: version-aware decoding of length-framed wire protocol records
//!
//! This crate decodes one length-bounded protocol message body (a *frame*)
//! into a structured record, where the exact field layout depends on a
//! negotiated protocol version. Record types describe themselves through
//! static descriptors; the plan compiler turns a descriptor plus a version
//! into an ordered list of decode operations, caches it, and replays it for
//! every subsequent frame of that (type, version) pair.
//!
//! # Frame Model
//!
//! ```text
//! byte source ──▶ [ Decoder: budget = frame length, sticky error ]
//!                     │ read_i32 / read_string / read_bytes / ...
//!                     ▼
//!                 [ Plan for (record type, version) ]  ── cached
//!                     │ field-by-field, declared order
//!                     ▼
//!                 destination record (via Value write handles)
//! ```
//!
//! Decoding never reads past the frame's declared length, and whatever the
//! plan leaves unread is drained before the decode call returns — success or
//! failure — so the source is always positioned at the start of the next
//! frame.
//!
//! # Features
//!
//! - Hard per-frame byte budget with automatic drain of leftover bytes
//! - Sticky first-error semantics: after a failure, reads become no-ops
//! - Fixed (16/32-bit length prefix) and compact (zigzag varint prefix)
//!   variable-length encodings
//! - Per-field version intervals: fields absent at a version are skipped
//! - Compiled decode plans, cached per (record type, version)
//! - Self-decoding escape hatch for types with layouts the generic field
//!   model cannot express
//!
//! # Example
//!
//! ```rust
//! use std::io::Cursor;
//! use wirebound::{
//!     decode_frame, FieldDescriptor, FieldKind, Record, RecordDescriptor, Value, VersionTag,
//! };
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Heartbeat {
//!     generation: i32,
//!     member: String,
//! }
//!
//! impl Value for Heartbeat {
//!     fn field_mut(&mut self, index: usize) -> &mut dyn Value {
//!         match index {
//!             0 => &mut self.generation,
//!             1 => &mut self.member,
//!             _ => panic!("Heartbeat has no field {index}"),
//!         }
//!     }
//! }
//!
//! impl Record for Heartbeat {
//!     fn descriptor() -> &'static RecordDescriptor {
//!         static DESC: RecordDescriptor = RecordDescriptor {
//!             name: "Heartbeat",
//!             self_decoding: false,
//!             fields: &[
//!                 FieldDescriptor {
//!                     name: "generation",
//!                     kind: FieldKind::Int32,
//!                     tags: &[VersionTag::new(0, i16::MAX)],
//!                 },
//!                 FieldDescriptor {
//!                     name: "member",
//!                     kind: FieldKind::String,
//!                     tags: &[VersionTag::new(0, i16::MAX)],
//!                 },
//!             ],
//!         };
//!         &DESC
//!     }
//! }
//!
//! // 4-byte generation, then a 16-bit length-prefixed member id.
//! let frame = [0x00, 0x00, 0x00, 0x2A, 0x00, 0x02, b'o', b'k'];
//! let mut source = Cursor::new(&frame[..]);
//! let hb: Heartbeat = decode_frame(&mut source, frame.len(), 0)?;
//! assert_eq!(hb.generation, 42);
//! assert_eq!(hb.member, "ok");
//! # Ok::<(), wirebound::Error>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod decoder;
pub mod error;
pub mod plan;
pub mod schema;
pub mod source;
pub mod value;
pub mod varint;

// Re-export main types
pub use decoder::Decoder;
pub use error::{Error, Result};
pub use plan::{decode_frame, decode_frame_into, plan_for, Plan};
pub use schema::{Encoding, FieldDescriptor, FieldKind, Record, RecordDescriptor, VersionTag};
pub use source::ByteSource;
pub use value::{SelfDecodable, Value};
pub use varint::MAX_VARINT_LEN;
