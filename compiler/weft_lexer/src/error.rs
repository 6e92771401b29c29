//! Token list errors.

/// Failures of token list operations that depend on caller input.
///
/// Index misuse and reads of removed lists are contract violations and
/// panic instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenListError {
    /// The hierarchy was modified after the view was created.
    #[error("stale token list view: created at modification {expected}, hierarchy is at {actual}")]
    StaleView { expected: u64, actual: u64 },

    #[error("token hierarchy was created over immutable input")]
    ImmutableInput,

    #[error("edit at {offset} removing {removed} characters exceeds the input length {len}")]
    EditOutOfBounds { offset: u32, removed: u32, len: u32 },

    #[error("no language registered for MIME type {mime:?}")]
    LanguageNotFound { mime: String },
}
