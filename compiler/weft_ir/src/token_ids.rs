//! Token id sets.
//!
//! A language numbers its token ids densely from zero. Per-id tables
//! (wrap ids, flyweights, embedding results) index by that ordinal.

use rustc_hash::FxHashMap;
use weft_lexer_core::TokenId;

use crate::LanguageError;

/// Definition of one token id: name, ordinal, optional category.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TokenIdDef {
    pub name: &'static str,
    pub ordinal: u16,
    pub category: Option<&'static str>,
}

impl TokenIdDef {
    pub const fn new(name: &'static str, ordinal: u16) -> Self {
        TokenIdDef {
            name,
            ordinal,
            category: None,
        }
    }

    #[must_use]
    pub const fn with_category(mut self, category: &'static str) -> Self {
        self.category = Some(category);
        self
    }

    #[inline]
    pub const fn id(&self) -> TokenId {
        TokenId(self.ordinal)
    }
}

/// Validated, densely numbered token ids of one language.
#[derive(Clone, Debug)]
pub struct TokenIdSet {
    defs: Box<[TokenIdDef]>,
    by_name: FxHashMap<&'static str, TokenId>,
}

impl TokenIdSet {
    /// Validate `defs` and index them by ordinal.
    pub fn new(defs: &[TokenIdDef]) -> Result<Self, LanguageError> {
        if defs.is_empty() {
            return Err(LanguageError::EmptyTokenIdSet);
        }
        let len = defs.len();
        let mut slots: Vec<Option<TokenIdDef>> = vec![None; len];
        let mut by_name = FxHashMap::default();
        for def in defs {
            if def.name.is_empty() {
                return Err(LanguageError::EmptyName {
                    ordinal: def.ordinal,
                });
            }
            let Some(slot) = slots.get_mut(usize::from(def.ordinal)) else {
                return Err(LanguageError::OrdinalOutOfRange {
                    name: def.name,
                    ordinal: def.ordinal,
                    len,
                });
            };
            if let Some(first) = slot {
                return Err(LanguageError::DuplicateOrdinal {
                    ordinal: def.ordinal,
                    first: first.name,
                    second: def.name,
                });
            }
            if by_name.insert(def.name, def.id()).is_some() {
                return Err(LanguageError::DuplicateName { name: def.name });
            }
            *slot = Some(*def);
        }
        // `len` distinct ordinals below `len` fill every slot.
        let defs = slots.into_iter().flatten().collect();
        Ok(TokenIdSet { defs, by_name })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    #[inline]
    pub fn contains(&self, id: TokenId) -> bool {
        id.index() < self.defs.len()
    }

    /// Definition of `id`. Panics for ids outside the set.
    #[inline]
    pub fn def(&self, id: TokenId) -> &TokenIdDef {
        &self.defs[id.index()]
    }

    #[inline]
    pub fn name(&self, id: TokenId) -> &'static str {
        self.def(id).name
    }

    pub fn find(&self, name: &str) -> Option<TokenId> {
        self.by_name.get(name).copied()
    }

    /// All ids in ordinal order.
    pub fn ids(&self) -> impl Iterator<Item = TokenId> + '_ {
        self.defs.iter().map(TokenIdDef::id)
    }
}
