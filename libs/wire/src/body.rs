//! In-memory argument model for message bodies.
//!
//! This is the decoded-argument view the bus library exposes for a
//! message: an ordered list of tagged elements. Containers nest -
//! a sequence is an `Array` of elements, a mapping is an `Array` of
//! `DictEntry` elements holding key then value. `DictEntry` keeps its
//! fields as a plain list so a malformed entry (missing value, extra
//! fields) is representable and gets rejected by the decoder instead of
//! being unconstructible.

use crate::signature::Tag;
use crate::builder::Encode;
use crate::parser::ArgCursor;

/// One message argument or container element.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Bool(bool),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Str(String),
    Array(Vec<Arg>),
    DictEntry(Vec<Arg>),
}

impl Arg {
    /// Wire tag of this element.
    pub fn tag(&self) -> Tag {
        match self {
            Arg::Bool(_) => Tag::Bool,
            Arg::Int32(_) => Tag::Int32,
            Arg::UInt32(_) => Tag::UInt32,
            Arg::Int64(_) => Tag::Int64,
            Arg::UInt64(_) => Tag::UInt64,
            Arg::Str(_) => Tag::Str,
            Arg::Array(_) => Tag::Array,
            Arg::DictEntry(_) => Tag::DictEntry,
        }
    }
}

/// An ordered argument list plus its accumulated signature.
///
/// The signature grows as arguments are appended and is carried on the
/// wire for self-description; it plays no role in decoding, which
/// validates per-element tags instead.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Body {
    signature: String,
    args: Vec<Arg>,
}

impl Body {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one typed argument, extending the body signature.
    pub fn push<T: Encode + ?Sized>(&mut self, value: &T) -> &mut Self {
        T::signature(&mut self.signature);
        value.store(&mut self.args);
        self
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Cursor over the argument list, positioned at the first argument.
    pub fn cursor(&self) -> ArgCursor<'_> {
        ArgCursor::new(&self.args)
    }
}
