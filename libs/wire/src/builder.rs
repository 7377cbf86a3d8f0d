//! Value encoder: appending typed values to an outbound body.
//!
//! Encoding mirrors the signature structure depth-first: scalars push a
//! single tagged element, a sequence opens a container and encodes its
//! elements in order, a mapping opens a container of dict-entries and
//! encodes key then value per entry. Mapping entry order on the wire is
//! not part of the contract and consumers must not depend on it.
//!
//! There is no error path. Growing the outbound buffer can only fail on
//! memory exhaustion, which aborts the process - the fail-fast policy
//! for resource exhaustion, shared with the rest of the daemon.

use std::collections::BTreeMap;

use crate::body::Arg;
use crate::signature::{BasicWire, Wire};

/// Append `self` to an open output container.
pub trait Encode: Wire {
    fn store(&self, out: &mut Vec<Arg>);
}

macro_rules! scalar_encode {
    ($ty:ty, $variant:ident) => {
        impl Encode for $ty {
            fn store(&self, out: &mut Vec<Arg>) {
                out.push(Arg::$variant(*self));
            }
        }
    };
}

scalar_encode!(bool, Bool);
scalar_encode!(i32, Int32);
scalar_encode!(u32, UInt32);
scalar_encode!(i64, Int64);
scalar_encode!(u64, UInt64);

impl Encode for String {
    fn store(&self, out: &mut Vec<Arg>) {
        out.push(Arg::Str(self.clone()));
    }
}

impl Encode for str {
    fn store(&self, out: &mut Vec<Arg>) {
        out.push(Arg::Str(self.to_owned()));
    }
}

impl Encode for &str {
    fn store(&self, out: &mut Vec<Arg>) {
        out.push(Arg::Str((*self).to_owned()));
    }
}

impl<E: Encode> Encode for Vec<E> {
    fn store(&self, out: &mut Vec<Arg>) {
        let mut items = Vec::with_capacity(self.len());
        for elem in self {
            elem.store(&mut items);
        }
        out.push(Arg::Array(items));
    }
}

impl<K: Encode + BasicWire, V: Encode> Encode for BTreeMap<K, V> {
    fn store(&self, out: &mut Vec<Arg>) {
        let mut entries = Vec::with_capacity(self.len());
        for (key, value) in self {
            let mut fields = Vec::with_capacity(2);
            key.store(&mut fields);
            value.store(&mut fields);
            entries.push(Arg::DictEntry(fields));
        }
        out.push(Arg::Array(entries));
    }
}
