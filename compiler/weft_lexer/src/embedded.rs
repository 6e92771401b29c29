//! Token lists of embedded languages.

use weft_ir::{Language, LanguageEmbedding};
use weft_lexer_core::LexerState;

use crate::store::TokenStore;
use crate::token_list::forward_token_list;

/// Tokens of an embedded language inside one parent token.
///
/// The list lexes the parent token's text without the embedding's start
/// and end skips. A joined section starts from the final lexer state of the
/// previous section of the same language in the same parent list.
pub struct EmbeddedTokenList {
    pub(crate) store: TokenStore,
    embedding: LanguageEmbedding,
}

impl EmbeddedTokenList {
    pub(crate) fn new(store: TokenStore, embedding: LanguageEmbedding) -> Self {
        EmbeddedTokenList { store, embedding }
    }

    pub fn embedding(&self) -> &LanguageEmbedding {
        &self.embedding
    }

    pub fn is_joined(&self) -> bool {
        self.embedding.join_sections
    }

    /// Lexer state after the last token, lexing the whole section.
    pub fn final_state(&mut self) -> Option<LexerState> {
        self.store.check_live();
        self.store.materialize_all();
        self.store.final_state.clone()
    }

    /// Offset where the section ends, without lexing it.
    pub fn window_end_offset(&self) -> u32 {
        self.store.window_end_offset()
    }

    pub(crate) fn joins(&self, language: &Language) -> bool {
        self.embedding.join_sections && self.embedding.language.id() == language.id()
    }
}

forward_token_list!(EmbeddedTokenList);
