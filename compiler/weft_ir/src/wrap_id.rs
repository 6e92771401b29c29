//! Token ids wrapped with the embeddings that already failed for them.
//!
//! A token whose embedding into language L was attempted and failed keeps a
//! wrap id whose failed set contains L, so the next attempt short-circuits.
//! The plain variant (nothing failed) exists once per token id; a few other
//! variants are kept per id, most recently used first.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use smallvec::SmallVec;
use weft_lexer_core::TokenId;

use crate::{LanguageId, LanguageIds, TokenIdSet};

/// Variants with a non-empty failed set kept per token id.
pub const MAX_WRAP_ID_VARIANTS: usize = 4;

struct WrapInner {
    id: TokenId,
    language: LanguageId,
    failed: LanguageIds,
}

/// Immutable, shared token id plus failed-embedding set.
#[derive(Clone)]
pub struct WrapTokenId(Arc<WrapInner>);

impl WrapTokenId {
    fn new(id: TokenId, language: LanguageId, failed: LanguageIds) -> Self {
        WrapTokenId(Arc::new(WrapInner {
            id,
            language,
            failed,
        }))
    }

    #[inline]
    pub fn id(&self) -> TokenId {
        self.0.id
    }

    /// Language the token id belongs to.
    #[inline]
    pub fn language(&self) -> LanguageId {
        self.0.language
    }

    #[inline]
    pub fn failed_embeddings(&self) -> &LanguageIds {
        &self.0.failed
    }

    #[inline]
    pub fn has_failed(&self, language: LanguageId) -> bool {
        self.0.failed.contains(language)
    }
}

impl PartialEq for WrapTokenId {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
            || (self.0.id == other.0.id
                && self.0.language == other.0.language
                && self.0.failed == other.0.failed)
    }
}

impl Eq for WrapTokenId {}

impl fmt::Debug for WrapTokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.failed.is_empty() {
            write!(f, "{:?}", self.0.id)
        } else {
            write!(f, "{:?}!{:?}", self.0.id, self.0.failed)
        }
    }
}

/// Per-language wrap id table.
pub struct WrapTokenIdCache {
    language: LanguageId,
    plain: Box<[WrapTokenId]>,
    variants: Mutex<Box<[SmallVec<[WrapTokenId; MAX_WRAP_ID_VARIANTS]>]>>,
}

impl WrapTokenIdCache {
    pub(crate) fn new(language: LanguageId, token_ids: &TokenIdSet) -> Self {
        let plain = token_ids
            .ids()
            .map(|id| WrapTokenId::new(id, language, LanguageIds::empty()))
            .collect();
        WrapTokenIdCache {
            language,
            plain,
            variants: Mutex::new(vec![SmallVec::new(); token_ids.len()].into_boxed_slice()),
        }
    }

    /// The variant of `id` with nothing failed.
    #[inline]
    pub fn plain(&self, id: TokenId) -> WrapTokenId {
        self.plain[id.index()].clone()
    }

    /// The variant of `id` whose failed set is `failed`.
    pub fn with_failed(&self, id: TokenId, failed: &LanguageIds) -> WrapTokenId {
        if failed.is_empty() {
            return self.plain(id);
        }
        let mut variants = self.variants.lock();
        let slot = &mut variants[id.index()];
        if let Some(pos) = slot.iter().position(|w| w.failed_embeddings() == failed) {
            let hit = slot.remove(pos);
            slot.insert(0, hit.clone());
            return hit;
        }
        let created = WrapTokenId::new(id, self.language, failed.clone());
        slot.insert(0, created.clone());
        slot.truncate(MAX_WRAP_ID_VARIANTS);
        created
    }

    /// Number of cached non-plain variants of `id`.
    pub fn variant_count(&self, id: TokenId) -> usize {
        self.variants.lock()[id.index()].len()
    }
}
