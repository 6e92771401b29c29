//! Character sequences a lexer can read from.

use std::sync::Arc;

/// Random-access character sequence.
///
/// Plain text is its own raw text. A preprocessed sequence (see
/// [`PreprocessedTextStorage`](crate::PreprocessedTextStorage)) reports how
/// many *outermost raw* characters its logical prefixes occupy, which is what
/// lets a nested preprocessing layer translate offsets all the way back to
/// the source text.
pub trait CharSequence {
    /// Number of characters.
    fn len(&self) -> usize;

    /// Character at `index`. Panics when `index >= len()`.
    fn char_at(&self, index: usize) -> char;

    /// Returns `true` if the sequence has no characters.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Outermost raw length of the first `len` characters.
    fn raw_length(&self, len: usize) -> usize {
        len
    }

    /// Outermost raw characters this sequence was built from.
    ///
    /// `raw_chars()[self.raw_length(i)..self.raw_length(j)]` is the raw text
    /// of the characters `i..j`.
    fn raw_chars(&self) -> &[char];

    /// Copy `start..end` into a `String`.
    fn text(&self, start: usize, end: usize) -> String {
        (start..end).map(|i| self.char_at(i)).collect()
    }
}

impl CharSequence for [char] {
    #[inline]
    fn len(&self) -> usize {
        <[char]>::len(self)
    }

    #[inline]
    fn char_at(&self, index: usize) -> char {
        self[index]
    }

    fn raw_chars(&self) -> &[char] {
        self
    }
}

impl CharSequence for Vec<char> {
    #[inline]
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    #[inline]
    fn char_at(&self, index: usize) -> char {
        self[index]
    }

    fn raw_chars(&self) -> &[char] {
        self
    }
}

impl CharSequence for Arc<[char]> {
    #[inline]
    fn len(&self) -> usize {
        (**self).len()
    }

    #[inline]
    fn char_at(&self, index: usize) -> char {
        self[index]
    }

    fn raw_chars(&self) -> &[char] {
        self
    }
}
