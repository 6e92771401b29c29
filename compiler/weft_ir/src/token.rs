//! Tokens as stored in token lists, and the flyweight cache.
//!
//! A regular token belongs to exactly one list and knows its raw offset
//! there. A flyweight token has fixed text (a keyword, an operator) and no
//! offset, so a single instance can stand at many positions in many lists.

use std::sync::Arc;

use parking_lot::Mutex;
use weft_lexer_core::{PreprocessedTextStorage, TokenId};

use crate::WrapTokenId;

/// Shared, position-independent token.
#[derive(Debug)]
pub struct FlyToken {
    wrap_id: WrapTokenId,
    text: &'static str,
    length: u32,
}

impl FlyToken {
    #[inline]
    pub fn wrap_id(&self) -> &WrapTokenId {
        &self.wrap_id
    }

    #[inline]
    pub fn id(&self) -> TokenId {
        self.wrap_id.id()
    }

    #[inline]
    pub fn text(&self) -> &'static str {
        self.text
    }

    /// Length in characters.
    #[inline]
    pub fn length(&self) -> u32 {
        self.length
    }
}

/// A token owned by one list.
#[derive(Clone, Debug)]
pub struct RegularToken {
    pub wrap_id: WrapTokenId,
    /// Raw offset relative to the owning list's base offset.
    pub offset: u32,
    /// Raw length.
    pub length: u32,
    /// Logical text when preprocessing changed it.
    pub text: Option<Arc<PreprocessedTextStorage>>,
}

#[derive(Clone, Debug)]
pub enum Token {
    Regular(RegularToken),
    Fly(Arc<FlyToken>),
}

impl Token {
    #[inline]
    pub fn wrap_id(&self) -> &WrapTokenId {
        match self {
            Token::Regular(token) => &token.wrap_id,
            Token::Fly(token) => &token.wrap_id,
        }
    }

    #[inline]
    pub fn id(&self) -> TokenId {
        self.wrap_id().id()
    }

    /// Raw length.
    #[inline]
    pub fn length(&self) -> u32 {
        match self {
            Token::Regular(token) => token.length,
            Token::Fly(token) => token.length,
        }
    }

    #[inline]
    pub fn is_flyweight(&self) -> bool {
        matches!(self, Token::Fly(_))
    }

    /// Stored offset; flyweights have none.
    #[inline]
    pub fn stored_offset(&self) -> Option<u32> {
        match self {
            Token::Regular(token) => Some(token.offset),
            Token::Fly(_) => None,
        }
    }

    /// Logical text of a preprocessed token.
    pub fn preprocessed_text(&self) -> Option<&Arc<PreprocessedTextStorage>> {
        match self {
            Token::Regular(token) => token.text.as_ref(),
            Token::Fly(_) => None,
        }
    }

    /// Fixed text of a flyweight.
    pub fn fly_text(&self) -> Option<&'static str> {
        match self {
            Token::Regular(_) => None,
            Token::Fly(token) => Some(token.text),
        }
    }
}

/// Per-language flyweight table: the two most recently used texts per id.
pub struct FlyTokenCache {
    entries: Mutex<Box<[[Option<Arc<FlyToken>>; 2]]>>,
}

impl FlyTokenCache {
    pub(crate) fn new(token_count: usize) -> Self {
        FlyTokenCache {
            entries: Mutex::new(vec![[None, None]; token_count].into_boxed_slice()),
        }
    }

    /// The cached flyweight for `text`, created if neither cached entry has
    /// that text. Creating evicts the less recently used entry.
    pub fn get(&self, wrap_id: &WrapTokenId, text: &'static str) -> Arc<FlyToken> {
        let mut entries = self.entries.lock();
        let slot = &mut entries[wrap_id.id().index()];
        for i in 0..2 {
            if let Some(token) = &slot[i] {
                if same_text(token.text, text) {
                    let hit = Arc::clone(token);
                    if i == 1 {
                        slot.swap(0, 1);
                    }
                    return hit;
                }
            }
        }
        let created = Arc::new(FlyToken {
            wrap_id: wrap_id.clone(),
            text,
            length: u32::try_from(text.chars().count()).unwrap_or(u32::MAX),
        });
        slot[1] = slot[0].take();
        slot[0] = Some(Arc::clone(&created));
        created
    }

    /// Number of flyweights cached for `id`.
    pub fn cached(&self, id: TokenId) -> usize {
        self.entries.lock()[id.index()].iter().flatten().count()
    }
}

#[inline]
fn same_text(cached: &'static str, text: &'static str) -> bool {
    std::ptr::eq(cached, text) || cached == text
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests;
