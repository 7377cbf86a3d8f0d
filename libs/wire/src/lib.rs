//! Type-driven marshaling for the crashd bus protocol.
//!
//! The bus protocol is self-describing: every message body carries a
//! signature string naming the types of its arguments. This crate maps
//! Rust types onto that model - [`Wire`] computes signatures from static
//! types, [`Encode`] appends typed values to an outbound body, and
//! [`Decode`] reads them back through a validating [`ArgCursor`].
//!
//! Supported types are the scalar kinds (bool, i32, u32, i64, u64,
//! strings), `Vec<E>` for any supported `E`, and `BTreeMap<K, V>` with a
//! scalar key. Anything else fails to compile rather than at runtime.

pub mod body;
pub mod builder;
pub mod error;
pub mod parser;
pub mod signature;

pub use body::{Arg, Body};
pub use builder::Encode;
pub use error::{WireError, WireResult};
pub use parser::{ArgCursor, Decode, Fields};
pub use signature::{signature_of, BasicWire, Tag, Wire};
