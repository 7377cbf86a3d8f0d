//! Validating decoder for inbound message bodies.
//!
//! Every read checks the wire tag of the current element against the
//! expected type, loads the value, and advances the cursor. The return
//! value reports whether another argument follows ([`Fields::More`]) or
//! the list is exhausted ([`Fields::Last`]); handlers use that to
//! enforce exact argument arity. After an error or `Last`, the cursor
//! must not be read again without reinitializing.

use std::collections::BTreeMap;

use tracing::error;

use crate::body::Arg;
use crate::error::{WireError, WireResult};
use crate::signature::{BasicWire, Tag, Wire};

/// Whether a further argument remains after a completed read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fields {
    More,
    Last,
}

/// Iterator over one argument list (a message body or the contents of a
/// container element).
#[derive(Debug)]
pub struct ArgCursor<'a> {
    args: &'a [Arg],
    pos: usize,
}

impl<'a> ArgCursor<'a> {
    pub fn new(args: &'a [Arg]) -> Self {
        Self { args, pos: 0 }
    }

    /// Element under the cursor, if any.
    fn peek(&self) -> Option<&'a Arg> {
        self.args.get(self.pos)
    }

    /// Step past the current element.
    fn advance(&mut self) -> Fields {
        self.pos += 1;
        if self.pos < self.args.len() {
            Fields::More
        } else {
            Fields::Last
        }
    }

    /// Current element validated against `expected`, without advancing.
    fn expect(&self, expected: Tag) -> WireResult<&'a Arg> {
        let arg = self.peek().ok_or_else(|| {
            error!("{expected} expected in bus message, but the argument list is exhausted");
            WireError::Truncated { expected }
        })?;
        if arg.tag() != expected {
            let found = arg.tag();
            error!("{expected} expected in bus message, but found {found}");
            return Err(WireError::TypeMismatch { expected, found });
        }
        Ok(arg)
    }
}

/// Read one value of `Self` from the cursor, validating its wire tag,
/// and advance past it.
pub trait Decode: Wire + Sized {
    fn load(cur: &mut ArgCursor<'_>) -> WireResult<(Self, Fields)>;
}

macro_rules! scalar_decode {
    ($ty:ty, $variant:ident) => {
        impl Decode for $ty {
            fn load(cur: &mut ArgCursor<'_>) -> WireResult<(Self, Fields)> {
                let arg = cur.expect(<$ty as Wire>::TAG)?;
                let Arg::$variant(value) = arg else {
                    unreachable!("tag validated by expect");
                };
                let value = value.clone();
                Ok((value, cur.advance()))
            }
        }
    };
}

scalar_decode!(bool, Bool);
scalar_decode!(i32, Int32);
scalar_decode!(u32, UInt32);
scalar_decode!(i64, Int64);
scalar_decode!(u64, UInt64);
scalar_decode!(String, Str);

impl<E: Decode> Decode for Vec<E> {
    fn load(cur: &mut ArgCursor<'_>) -> WireResult<(Self, Fields)> {
        let arg = cur.expect(Tag::Array)?;
        let Arg::Array(items) = arg else {
            unreachable!("tag validated by expect");
        };

        let mut out = Vec::with_capacity(items.len());
        // An empty container yields zero elements, not an error.
        if !items.is_empty() {
            let mut sub = ArgCursor::new(items);
            loop {
                let (elem, fields) = E::load(&mut sub)?;
                out.push(elem);
                if fields == Fields::Last {
                    break;
                }
            }
        }

        Ok((out, cur.advance()))
    }
}

impl<K: Decode + BasicWire + Ord, V: Decode> Decode for BTreeMap<K, V> {
    fn load(cur: &mut ArgCursor<'_>) -> WireResult<(Self, Fields)> {
        let arg = cur.expect(Tag::Array)?;
        let Arg::Array(entries) = arg else {
            unreachable!("tag validated by expect");
        };

        let mut out = BTreeMap::new();
        for entry in entries {
            let Arg::DictEntry(fields) = entry else {
                let found = entry.tag();
                error!("map element is not a dict-entry ({found})");
                return Err(WireError::NotADictEntry { found });
            };

            let mut sub = ArgCursor::new(fields);
            let (key, after_key) = K::load(&mut sub)?;
            if after_key != Fields::More {
                error!("malformed map entry in bus message: value is missing");
                return Err(WireError::DictEntryMissingValue);
            }
            let (value, after_value) = V::load(&mut sub)?;
            if after_value != Fields::Last {
                error!("malformed map entry in bus message: extra fields after the value");
                return Err(WireError::DictEntryExtraFields);
            }

            // Duplicate keys keep the last value seen; peers rely on it.
            out.insert(key, value);
        }

        Ok((out, cur.advance()))
    }
}
