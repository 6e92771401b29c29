//! Language identity and shared token caches for weft.
//!
//! - [`Language`] wraps a [`LanguageHierarchy`] (token ids, lexer factory,
//!   preprocessor, embedding queries) with a process-wide [`LanguageId`] and
//!   its per-language caches.
//! - [`LanguageIds`] are canonical sets of language ids, compared by
//!   identity. A [`WrapTokenId`] pairs a token id with the set of languages
//!   whose embedding already failed for it.
//! - [`FlyToken`]s share fixed-text tokens; [`FlyTokenCache`] keeps two per
//!   token id.
//! - [`LanguageManager`] maps MIME types to languages, resolves embeddings and
//!   discovers [`LanguagePath`]s with [`find_language_paths`].

mod error;
mod language;
mod language_ids;
mod language_path;
mod manager;
mod token;
mod token_ids;
mod wrap_id;

pub use error::LanguageError;
pub use language::{EmbeddingQuery, EmbeddingSpec, Language, LanguageHierarchy, LanguageId};
pub use language_ids::LanguageIds;
pub use language_path::LanguagePath;
pub use manager::{find_language_paths, LanguageEmbedding, LanguageManager};
pub use token::{FlyToken, FlyTokenCache, RegularToken, Token};
pub use token_ids::{TokenIdDef, TokenIdSet};
pub use wrap_id::{WrapTokenId, WrapTokenIdCache, MAX_WRAP_ID_VARIANTS};

/// Lexer primitives, re-exported for language plugins.
pub use weft_lexer_core::{LexerState, TokenId};
