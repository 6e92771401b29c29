//! Offset-bounded views of a token list.

use weft_ir::{LanguagePath, Token};
use weft_lexer_core::{LexerState, PreprocessError};

use crate::{EmbeddedTokenList, TokenList};

/// The tokens of `base` overlapping `[start, end)`.
///
/// A token straddling a bound belongs to the view whole. Index bounds are
/// computed once, at construction, through the base list's own index
/// lookup; every index passed to the view is shifted by the start index
/// before it reaches the base list.
pub struct SubSequenceTokenList<'a, L: TokenList + ?Sized> {
    base: &'a mut L,
    start: u32,
    end: u32,
    start_index: usize,
    end_index: usize,
}

impl<'a, L: TokenList + ?Sized> SubSequenceTokenList<'a, L> {
    pub fn new(base: &'a mut L, start: u32, end: u32) -> Self {
        let start_index = base.index_at(start);
        let end_index = if end <= start {
            start_index
        } else {
            // Tokens starting before `end`.
            let last = base.index_at(end - 1);
            if base.token(last).is_some() && base.token_offset(last) < end {
                last + 1
            } else {
                last
            }
        };
        SubSequenceTokenList {
            base,
            start,
            end,
            start_index,
            end_index: end_index.max(start_index),
        }
    }

    /// Index in the base list of the view's first token.
    #[inline]
    pub fn start_index(&self) -> usize {
        self.start_index
    }

    /// Index in the base list after the view's last token.
    #[inline]
    pub fn end_index(&self) -> usize {
        self.end_index
    }

    #[inline]
    pub fn bounds(&self) -> (u32, u32) {
        (self.start, self.end)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.end_index - self.start_index
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn base_index(&self, index: usize) -> usize {
        assert!(
            index < self.len(),
            "token index {index} out of range ({} tokens in view)",
            self.len()
        );
        self.start_index + index
    }
}

impl<L: TokenList + ?Sized> TokenList for SubSequenceTokenList<'_, L> {
    fn language_path(&self) -> &LanguagePath {
        self.base.language_path()
    }

    fn token(&mut self, index: usize) -> Option<&Token> {
        if index < self.len() {
            self.base.token(self.start_index + index)
        } else {
            None
        }
    }

    fn token_offset(&mut self, index: usize) -> u32 {
        let index = self.base_index(index);
        self.base.token_offset(index)
    }

    fn token_count(&mut self) -> usize {
        self.len()
    }

    fn token_count_current(&self) -> usize {
        self.len()
    }

    fn index_at(&mut self, offset: u32) -> usize {
        let index = self.base.index_at(offset);
        index.clamp(self.start_index, self.end_index) - self.start_index
    }

    fn start_offset(&mut self) -> u32 {
        if self.is_empty() {
            self.start
        } else {
            self.base.token_offset(self.start_index)
        }
    }

    fn end_offset(&mut self) -> u32 {
        if self.is_empty() {
            return self.start;
        }
        let last = self.end_index - 1;
        let length = self.base.token(last).map_or(0, Token::length);
        self.base.token_offset(last) + length
    }

    fn mod_count(&self) -> u64 {
        self.base.mod_count()
    }

    fn is_removed(&self) -> bool {
        self.base.is_removed()
    }

    fn lookahead(&self, index: usize) -> u32 {
        self.base.lookahead(self.base_index(index))
    }

    fn state(&self, index: usize) -> Option<LexerState> {
        self.base.state(self.base_index(index))
    }

    fn token_text(&mut self, index: usize) -> Option<String> {
        if index < self.len() {
            self.base.token_text(self.start_index + index)
        } else {
            None
        }
    }

    fn embedded(&mut self, index: usize) -> Option<&mut EmbeddedTokenList> {
        if index < self.len() {
            self.base.embedded(self.start_index + index)
        } else {
            None
        }
    }

    fn replace_fly_token(&mut self, index: usize) -> bool {
        let index = self.base_index(index);
        self.base.replace_fly_token(index)
    }

    fn preprocess_errors(&self) -> Vec<PreprocessError> {
        self.base
            .preprocess_errors()
            .into_iter()
            .filter(|error| error.span.start < self.end && error.span.end > self.start)
            .collect()
    }
}
