//! Low-level lexing primitives for weft.
//!
//! This crate holds everything a language plugin needs to write a lexer,
//! and the per-token bookkeeping a token list keeps next to the tokens:
//!
//! - [`Lexer`], [`LexedToken`], [`TokenId`], [`LexerState`]: the pull-style
//!   lexer contract. A lexer is always created from an explicit restart
//!   state and never suspended.
//! - [`LexerInput`]: the character cursor handed to a lexer. It reads a
//!   bounded window of a [`CharSequence`], optionally through a
//!   [`CharPreprocessor`], and converts finished tokens to outermost raw
//!   offsets.
//! - [`CharPreprocessor`], [`UnicodeEscapes`]: on-the-fly folding of
//!   multi-character escape sequences into single logical characters.
//! - [`PreprocessedTextStorage`]: immutable logical text with a raw length
//!   shift table.
//! - [`LaState`]: compact lookahead/state store that re-encodes itself into
//!   a wider physical representation when a value outgrows the current one.
//!
//! # Coordinates
//!
//! Every offset handed out of this crate is in *raw* characters of the
//! outermost source text, relative to the start of the sequence being lexed.
//! Logical offsets (after preprocessing) stay internal to [`LexerInput`] and
//! [`PreprocessedTextStorage`].

mod input;
mod la_state;
mod lexer;
mod preprocess;
mod preprocessed_text;
mod span;
mod text;

pub use input::{FinishedToken, LexerInput};
pub use la_state::{LaState, LaStateKind};
pub use lexer::{LexedToken, Lexer, LexerState, TokenId};
pub use preprocess::{
    contains_sensitive_chars, CharPreprocessor, PreprocessError, PreprocessErrorKind,
    PreprocessorInput, UnicodeEscapes, REPLACEMENT_CHAR,
};
pub use preprocessed_text::{ExtraPreprocessedChars, PreprocessedTextStorage, ShiftWidth};
pub use span::Span;
pub use text::CharSequence;
