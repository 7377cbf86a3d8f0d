//! Marshaling errors for bus message bodies

use crate::signature::Tag;
use thiserror::Error;

/// Decode-side protocol errors.
///
/// Every variant names what was expected and what the message actually
/// carried, so a rejected call can be diagnosed from the log alone.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WireError {
    #[error("{expected} expected in bus message, but found {found}")]
    TypeMismatch { expected: Tag, found: Tag },

    #[error("{expected} expected in bus message, but the argument list is exhausted")]
    Truncated { expected: Tag },

    #[error("map element is not a dict-entry ({found})")]
    NotADictEntry { found: Tag },

    #[error("malformed map entry: value is missing")]
    DictEntryMissingValue,

    #[error("malformed map entry: extra fields after the value")]
    DictEntryExtraFields,
}

/// Result type for marshaling operations
pub type WireResult<T> = std::result::Result<T, WireError>;
