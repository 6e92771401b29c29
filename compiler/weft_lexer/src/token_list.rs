//! The token list contract.

use std::sync::Arc;

use weft_ir::{Language, LanguagePath, Token};
use weft_lexer_core::{LexerState, PreprocessError};

use crate::EmbeddedTokenList;

/// Sentinel modification count of lists over immutable input.
pub const IMMUTABLE_MOD_COUNT: u64 = u64::MAX;

/// Ordered, lazily materialized tokens over a contiguous range of input.
///
/// Offsets are absolute raw offsets into the root text. Reading tokens
/// lexes as far as needed, strictly left to right; the `_current` queries
/// never lex. Any read of a removed list panics.
pub trait TokenList {
    fn language_path(&self) -> &LanguagePath;

    fn language(&self) -> &Arc<Language> {
        self.language_path().inner_language()
    }

    /// Token at `index`, or `None` past the end.
    fn token(&mut self, index: usize) -> Option<&Token>;

    /// Absolute raw offset of token `index`.
    ///
    /// # Panics
    ///
    /// Panics if there is no token `index`.
    fn token_offset(&mut self, index: usize) -> u32;

    /// Number of tokens, lexing the whole range.
    fn token_count(&mut self) -> usize;

    /// Number of tokens lexed so far.
    fn token_count_current(&self) -> usize;

    /// Index of the first token ending after `offset`, or the token count.
    fn index_at(&mut self, offset: u32) -> usize;

    /// Index of the token containing `offset`.
    fn token_index(&mut self, offset: u32) -> Option<usize> {
        let index = self.index_at(offset);
        self.token(index)?;
        (self.token_offset(index) <= offset).then_some(index)
    }

    /// Offset where the first token starts.
    fn start_offset(&mut self) -> u32;

    /// Offset where the last token ends.
    fn end_offset(&mut self) -> u32;

    /// Changes whenever the input under this list is structurally modified.
    fn mod_count(&self) -> u64;

    fn is_removed(&self) -> bool;

    /// Characters the lexer read past the end of materialized token `index`.
    fn lookahead(&self, index: usize) -> u32;

    /// Lexer state after materialized token `index`, when states are kept.
    fn state(&self, index: usize) -> Option<LexerState>;

    /// Logical text of token `index`.
    fn token_text(&mut self, index: usize) -> Option<String>;

    /// Embedded token list of token `index`, created on first request.
    fn embedded(&mut self, index: usize) -> Option<&mut EmbeddedTokenList>;

    /// Store the flyweight at `index` as a regular, positioned token.
    /// Returns `false` if it already was one.
    fn replace_fly_token(&mut self, index: usize) -> bool;

    /// Preprocessing errors of the materialized tokens.
    fn preprocess_errors(&self) -> Vec<PreprocessError>;
}

/// Implements [`TokenList`] by forwarding to a `store` field.
macro_rules! forward_token_list {
    ($ty:ty) => {
        impl $crate::TokenList for $ty {
            fn language_path(&self) -> &weft_ir::LanguagePath {
                &self.store.path
            }

            fn token(&mut self, index: usize) -> Option<&weft_ir::Token> {
                self.store.token(index)
            }

            fn token_offset(&mut self, index: usize) -> u32 {
                self.store.token_offset(index)
            }

            fn token_count(&mut self) -> usize {
                self.store.token_count()
            }

            fn token_count_current(&self) -> usize {
                self.store.entries.len()
            }

            fn index_at(&mut self, offset: u32) -> usize {
                self.store.index_at(offset)
            }

            fn start_offset(&mut self) -> u32 {
                self.store.start_offset()
            }

            fn end_offset(&mut self) -> u32 {
                self.store.end_offset()
            }

            fn mod_count(&self) -> u64 {
                self.store.mod_count
            }

            fn is_removed(&self) -> bool {
                self.store.removed
            }

            fn lookahead(&self, index: usize) -> u32 {
                self.store.lookahead(index)
            }

            fn state(&self, index: usize) -> Option<weft_lexer_core::LexerState> {
                self.store.state(index)
            }

            fn token_text(&mut self, index: usize) -> Option<String> {
                self.store.token_text(index)
            }

            fn embedded(&mut self, index: usize) -> Option<&mut $crate::EmbeddedTokenList> {
                self.store.embedded(index)
            }

            fn replace_fly_token(&mut self, index: usize) -> bool {
                self.store.replace_fly_token(index)
            }

            fn preprocess_errors(&self) -> Vec<weft_lexer_core::PreprocessError> {
                self.store.preprocess_errors()
            }
        }
    };
}

pub(crate) use forward_token_list;
