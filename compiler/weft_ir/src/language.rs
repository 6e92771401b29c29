//! Languages and the hierarchy a language plugs in through.

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;

use weft_lexer_core::{CharPreprocessor, Lexer, LexerState, TokenId};

use crate::token::{FlyToken, FlyTokenCache};
use crate::wrap_id::{WrapTokenId, WrapTokenIdCache};
use crate::{LanguageError, TokenIdDef, TokenIdSet};

/// Process-wide small integer identifying a [`Language`].
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LanguageId(u16);

impl LanguageId {
    #[inline]
    pub const fn from_raw(raw: u16) -> Self {
        LanguageId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u16 {
        self.0
    }
}

impl fmt::Debug for LanguageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LanguageId({})", self.0)
    }
}

static NEXT_LANGUAGE_ID: AtomicU16 = AtomicU16::new(0);

fn next_language_id() -> LanguageId {
    let raw = NEXT_LANGUAGE_ID.fetch_add(1, Ordering::Relaxed);
    assert!(raw < u16::MAX, "language id space exhausted");
    LanguageId(raw)
}

/// A token as seen by an embedding query.
///
/// `text` is empty unless the hierarchy reported that embedding of this
/// token id depends on the text.
#[derive(Clone, Copy, Debug)]
pub struct EmbeddingQuery<'a> {
    pub id: TokenId,
    pub text: &'a str,
}

/// Embedding answer of a hierarchy, naming the target by MIME type.
///
/// The skips are counted in characters of the parent token text and are
/// excluded from the embedded token stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmbeddingSpec {
    pub mime_type: Cow<'static, str>,
    pub start_skip: u32,
    pub end_skip: u32,
    /// Lex all sections of this language in one parent list as one stream.
    pub join_sections: bool,
}

impl EmbeddingSpec {
    pub fn new(mime_type: impl Into<Cow<'static, str>>) -> Self {
        EmbeddingSpec {
            mime_type: mime_type.into(),
            start_skip: 0,
            end_skip: 0,
            join_sections: false,
        }
    }

    #[must_use]
    pub fn with_skips(mut self, start_skip: u32, end_skip: u32) -> Self {
        self.start_skip = start_skip;
        self.end_skip = end_skip;
        self
    }

    #[must_use]
    pub fn joined(mut self) -> Self {
        self.join_sections = true;
        self
    }
}

/// What a language provides to the engine.
pub trait LanguageHierarchy: Send + Sync {
    /// MIME type, e.g. `text/x-script`.
    fn mime_type(&self) -> &str;

    /// Token ids, numbered densely from zero.
    fn token_ids(&self) -> Vec<TokenIdDef>;

    /// A lexer restarting after a token that reported `state`.
    fn create_lexer(&self, state: Option<LexerState>) -> Box<dyn Lexer>;

    /// Preprocessor applied to the input before the lexer sees it.
    fn preprocessor(&self) -> Option<&dyn CharPreprocessor> {
        None
    }

    /// Embedded language of a token, if any.
    fn embedding(&self, query: &EmbeddingQuery<'_>) -> Option<EmbeddingSpec> {
        let _ = query;
        None
    }

    /// Whether [`embedding`](Self::embedding) looks at the token text for
    /// `id`. Answers for other ids are cached per token id.
    fn embedding_depends_on_text(&self, id: TokenId) -> bool {
        let _ = id;
        false
    }
}

/// A registered language: its hierarchy plus the per-language caches.
pub struct Language {
    id: LanguageId,
    mime_type: Box<str>,
    token_ids: TokenIdSet,
    hierarchy: Box<dyn LanguageHierarchy>,
    wrap_ids: WrapTokenIdCache,
    fly_tokens: FlyTokenCache,
}

impl Language {
    /// Validate `hierarchy` and assign the language a fresh id.
    pub fn new(hierarchy: impl LanguageHierarchy + 'static) -> Result<Arc<Language>, LanguageError> {
        let mime_type = hierarchy.mime_type();
        if !is_valid_mime_type(mime_type) {
            return Err(LanguageError::MalformedMimeType(mime_type.to_owned()));
        }
        let token_ids = TokenIdSet::new(&hierarchy.token_ids())?;
        let id = next_language_id();
        tracing::debug!(?id, mime_type, token_ids = token_ids.len(), "language created");
        Ok(Arc::new(Language {
            id,
            mime_type: mime_type.into(),
            wrap_ids: WrapTokenIdCache::new(id, &token_ids),
            fly_tokens: FlyTokenCache::new(token_ids.len()),
            token_ids,
            hierarchy: Box::new(hierarchy),
        }))
    }

    #[inline]
    pub fn id(&self) -> LanguageId {
        self.id
    }

    #[inline]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    #[inline]
    pub fn token_ids(&self) -> &TokenIdSet {
        &self.token_ids
    }

    #[inline]
    pub fn hierarchy(&self) -> &dyn LanguageHierarchy {
        &*self.hierarchy
    }

    pub fn create_lexer(&self, state: Option<LexerState>) -> Box<dyn Lexer> {
        self.hierarchy.create_lexer(state)
    }

    pub fn preprocessor(&self) -> Option<&dyn CharPreprocessor> {
        self.hierarchy.preprocessor()
    }

    /// Canonical wrap id of `id` with no failed embeddings.
    #[inline]
    pub fn wrap_id(&self, id: TokenId) -> WrapTokenId {
        self.wrap_ids.plain(id)
    }

    /// Variant of `wrap_id` that also records a failed embedding of
    /// `language`.
    pub fn wrap_id_with_failed(&self, wrap_id: &WrapTokenId, language: LanguageId) -> WrapTokenId {
        self.wrap_ids
            .with_failed(wrap_id.id(), &wrap_id.failed_embeddings().with(language))
    }

    #[inline]
    pub fn wrap_id_cache(&self) -> &WrapTokenIdCache {
        &self.wrap_ids
    }

    /// Shared flyweight token for `id` with fixed `text`.
    pub fn fly_token(&self, id: TokenId, text: &'static str) -> Arc<FlyToken> {
        self.fly_tokens.get(&self.wrap_ids.plain(id), text)
    }

    #[inline]
    pub fn fly_token_cache(&self) -> &FlyTokenCache {
        &self.fly_tokens
    }
}

impl PartialEq for Language {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Language {}

impl Hash for Language {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Language")
            .field("id", &self.id)
            .field("mime_type", &self.mime_type)
            .finish_non_exhaustive()
    }
}

/// `type/subtype` with RFC 6838 restricted-name characters.
fn is_valid_mime_type(mime_type: &str) -> bool {
    let valid_part = |part: &str| {
        !part.is_empty()
            && part
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || "!#$&-^_.+".contains(c))
    };
    match mime_type.split_once('/') {
        Some((kind, subtype)) => valid_part(kind) && valid_part(subtype),
        None => false,
    }
}
