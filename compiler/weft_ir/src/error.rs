//! Language definition errors.
//!
//! These indicate a bug in a language definition, not a runtime condition,
//! and are raised when the offending [`Language`](crate::Language) is built.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LanguageError {
    #[error("language defines no token ids")]
    EmptyTokenIdSet,

    #[error("token id with ordinal {ordinal} has an empty name")]
    EmptyName { ordinal: u16 },

    #[error("token id name {name:?} is used twice")]
    DuplicateName { name: &'static str },

    #[error("token ids {first:?} and {second:?} share ordinal {ordinal}")]
    DuplicateOrdinal {
        ordinal: u16,
        first: &'static str,
        second: &'static str,
    },

    #[error("ordinal {ordinal} of token id {name:?} is outside 0..{len}")]
    OrdinalOutOfRange {
        name: &'static str,
        ordinal: u16,
        len: usize,
    },

    #[error("malformed MIME type {0:?}")]
    MalformedMimeType(String),
}
