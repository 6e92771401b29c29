//! The character cursor a lexer reads from.
//!
//! [`LexerInput`] serves two audiences. A [`Lexer`](crate::Lexer) sees
//! `read`/`backup`/`read_length` and creates tokens from what it read. The
//! token list driving the lexer calls [`LexerInput::finish_token`] after each
//! token to convert it into outermost raw coordinates, collect its lookahead
//! and build its logical text when preprocessing changed it.
//!
//! Three coordinate spaces meet here:
//!
//! - *logical*: characters the lexer sees, counted from the window start;
//! - *source*: indices into the [`CharSequence`] being lexed;
//! - *raw*: characters of the outermost source text, as reported by
//!   [`CharSequence::raw_length`].
//!
//! Without a preprocessor logical and source indices differ only by the
//! window start. Raw and source indices differ when the sequence itself is
//! the logical text of an enclosing preprocessing layer.

use std::sync::Arc;

use crate::preprocess::{self, to_u32, PreprocessError};
use crate::{
    CharPreprocessor, CharSequence, ExtraPreprocessedChars, LexedToken, PreprocessedTextStorage,
    Span, TokenId,
};

/// A lexed token in raw coordinates relative to the start of the sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FinishedToken {
    pub id: TokenId,
    pub offset: u32,
    /// Raw length.
    pub length: u32,
    /// Raw characters read past the token's end, the end of input counting
    /// as one.
    pub lookahead: u32,
    /// Set only when the token's raw text equals the flyweight text.
    pub fly_text: Option<&'static str>,
    /// Logical text, present when preprocessing changed the token.
    pub text: Option<Arc<PreprocessedTextStorage>>,
    pub errors: Vec<PreprocessError>,
}

/// Logical characters produced by a preprocessor, from the current token on.
struct Prepared<'a> {
    preprocessor: &'a dyn CharPreprocessor,
    /// Logical index of `chars[0]`.
    base: usize,
    /// Source index where `chars[0]` starts.
    base_src: usize,
    chars: Vec<char>,
    /// Source index after each character.
    src_ends: Vec<usize>,
    /// Whether each character came out of an escape sequence.
    preprocessed: Vec<bool>,
    /// Errors keyed by the logical index of the character they belong to.
    errors: Vec<(usize, PreprocessError)>,
}

impl Prepared<'_> {
    #[inline]
    fn produced(&self) -> usize {
        self.base + self.chars.len()
    }

    #[inline]
    fn src_start(&self, index: usize) -> usize {
        if index == self.base {
            self.base_src
        } else {
            self.src_ends[index - 1 - self.base]
        }
    }

    /// Preprocess one more character. Returns `false` at the window end.
    fn produce(&mut self, source: &dyn CharSequence, end: usize, touched: &mut usize) -> bool {
        let cursor = self.src_start(self.produced());
        if cursor >= end {
            return false;
        }
        let step = preprocess::step(self.preprocessor, source, cursor, end);
        *touched = (*touched).max(step.touched);
        let index = self.produced();
        self.errors
            .extend(step.errors.into_iter().map(|error| (index, error)));
        self.chars.push(step.ch);
        self.src_ends.push(cursor + step.consumed);
        self.preprocessed.push(step.preprocessed);
        true
    }

    /// Drop characters before logical `index`.
    fn discard_before(&mut self, index: usize) {
        let count = index - self.base;
        if count == 0 {
            return;
        }
        self.base_src = self.src_start(index);
        self.chars.drain(..count);
        self.src_ends.drain(..count);
        self.preprocessed.drain(..count);
        self.errors.retain(|(i, _)| *i >= index);
        self.base = index;
    }

    /// Token-relative bounds of the characters this layer preprocessed.
    fn own_window(&self, start: usize, end: usize) -> Option<(usize, usize)> {
        let flags = &self.preprocessed[start - self.base..end - self.base];
        let first = flags.iter().position(|p| *p)?;
        let last = flags.iter().rposition(|p| *p)?;
        Some((first, last + 1))
    }
}

enum Provider<'a> {
    Text,
    Preprocessed(Prepared<'a>),
}

/// Cursor over the window `[start, end)` of a character sequence.
pub struct LexerInput<'a> {
    source: &'a dyn CharSequence,
    start: usize,
    end: usize,
    provider: Provider<'a>,
    /// Logical start of the token being lexed.
    token_start: usize,
    /// Logical read position.
    pos: usize,
    eof_read: bool,
    /// Exclusive source bound of everything read so far, `end + 1` once the
    /// end of input was read.
    touched: usize,
}

impl<'a> LexerInput<'a> {
    /// Input over `source[start..end]`, folded through `preprocessor` if set.
    ///
    /// # Panics
    ///
    /// Panics if the window does not fit into `source`.
    pub fn new(
        source: &'a dyn CharSequence,
        start: usize,
        end: usize,
        preprocessor: Option<&'a dyn CharPreprocessor>,
    ) -> Self {
        assert!(
            start <= end && end <= source.len(),
            "input window {start}..{end} out of bounds (len {})",
            source.len()
        );
        let provider = match preprocessor {
            None => Provider::Text,
            Some(preprocessor) => Provider::Preprocessed(Prepared {
                preprocessor,
                base: 0,
                base_src: start,
                chars: Vec::new(),
                src_ends: Vec::new(),
                preprocessed: Vec::new(),
                errors: Vec::new(),
            }),
        };
        LexerInput {
            source,
            start,
            end,
            provider,
            token_start: 0,
            pos: 0,
            eof_read: false,
            touched: start,
        }
    }

    // === Lexer side ===

    /// Next character, or `None` at the end of the window.
    pub fn read(&mut self) -> Option<char> {
        if self.eof_read {
            return None;
        }
        let ch = match &mut self.provider {
            Provider::Text => {
                let src = self.start + self.pos;
                if src < self.end {
                    self.touched = self.touched.max(src + 1);
                    Some(self.source.char_at(src))
                } else {
                    None
                }
            }
            Provider::Preprocessed(prepared) => {
                if self.pos < prepared.produced()
                    || prepared.produce(self.source, self.end, &mut self.touched)
                {
                    Some(prepared.chars[self.pos - prepared.base])
                } else {
                    None
                }
            }
        };
        match ch {
            Some(_) => self.pos += 1,
            None => {
                self.eof_read = true;
                self.touched = self.touched.max(self.end + 1);
            }
        }
        ch
    }

    /// Un-read the last `count` reads. Reading the end of input counts as a
    /// read but moves nothing back.
    pub fn backup(&mut self, count: usize) {
        let mut count = count;
        if count > 0 && self.eof_read {
            self.eof_read = false;
            count -= 1;
        }
        assert!(
            count <= self.read_length(),
            "backup({count}) past the token start (read length {})",
            self.read_length()
        );
        self.pos -= count;
    }

    /// Characters read for the current token.
    #[inline]
    pub fn read_length(&self) -> usize {
        self.pos - self.token_start
    }

    /// Character `index` of the current token, which must already be read.
    pub fn read_existing(&self, index: usize) -> char {
        assert!(
            index < self.read_length(),
            "read_existing({index}) past the read length {}",
            self.read_length()
        );
        self.logical_char(self.token_start + index)
    }

    /// Whether the characters read for the current token spell `text`.
    pub fn read_text_eq(&self, text: &str) -> bool {
        let mut expected = text.chars();
        (self.token_start..self.pos).all(|i| expected.next() == Some(self.logical_char(i)))
            && expected.next().is_none()
    }

    /// The current token text as read so far.
    pub fn read_text(&self) -> String {
        (self.token_start..self.pos)
            .map(|i| self.logical_char(i))
            .collect()
    }

    /// Create a token covering everything read.
    pub fn token(&self, id: TokenId) -> LexedToken {
        LexedToken {
            id,
            length: to_u32(self.read_length()),
            fly_text: None,
        }
    }

    /// Create a token whose text is always `text`, so it may be shared.
    pub fn fly_token(&self, id: TokenId, text: &'static str) -> LexedToken {
        debug_assert!(
            self.read_text_eq(text),
            "flyweight text {text:?} differs from the read text {:?}",
            self.read_text()
        );
        LexedToken {
            id,
            length: to_u32(self.read_length()),
            fly_text: Some(text),
        }
    }

    // === Driver side ===

    /// Whether every character of the window belongs to a finished token.
    pub fn is_exhausted(&self) -> bool {
        self.src_start(self.token_start) >= self.end
    }

    /// Index into the source sequence where the next token begins.
    pub fn next_token_source_index(&self) -> usize {
        self.src_start(self.token_start)
    }

    /// Raw offset relative to the sequence start where the next token begins.
    pub fn next_token_offset(&self) -> u32 {
        to_u32(self.source.raw_length(self.src_start(self.token_start)))
    }

    /// Convert `token` to raw coordinates and move past it.
    ///
    /// # Panics
    ///
    /// Panics if the token is empty or longer than what was read.
    pub fn finish_token(&mut self, token: &LexedToken) -> FinishedToken {
        let length = token.length as usize;
        assert!(length > 0, "lexer returned an empty token {:?}", token.id);
        assert!(
            length <= self.read_length(),
            "token {:?} of length {length} exceeds the read length {}",
            token.id,
            self.read_length()
        );
        let token_start = self.token_start;
        let token_end = token_start + length;
        let offset = self.source.raw_length(self.src_start(token_start));
        let end = self.source.raw_length(self.src_start(token_end));
        let lookahead = self.raw_touched().saturating_sub(end);

        let text = (end - offset != length)
            .then(|| Arc::new(self.build_storage(token_start, token_end, offset, end)));
        let errors = match &self.provider {
            Provider::Text => Vec::new(),
            Provider::Preprocessed(prepared) => prepared
                .errors
                .iter()
                .filter(|(i, _)| (token_start..token_end).contains(i))
                .map(|(_, error)| self.to_raw_error(error))
                .collect(),
        };

        self.token_start = token_end;
        self.pos = token_end;
        self.eof_read = false;
        if let Provider::Preprocessed(prepared) = &mut self.provider {
            prepared.discard_before(token_end);
        }

        FinishedToken {
            id: token.id,
            offset: to_u32(offset),
            length: to_u32(end - offset),
            lookahead: to_u32(lookahead),
            fly_text: token.fly_text.filter(|_| text.is_none()),
            text,
            errors,
        }
    }

    // === Internals ===

    fn logical_char(&self, index: usize) -> char {
        match &self.provider {
            Provider::Text => self.source.char_at(self.start + index),
            Provider::Preprocessed(prepared) => prepared.chars[index - prepared.base],
        }
    }

    fn src_start(&self, index: usize) -> usize {
        match &self.provider {
            Provider::Text => self.start + index,
            Provider::Preprocessed(prepared) => prepared.src_start(index),
        }
    }

    /// Raw offset of a source index, counting one past the window end for a
    /// read of the end of input.
    fn raw_of(&self, src: usize) -> usize {
        if src > self.end {
            self.source.raw_length(self.end) + (src - self.end)
        } else {
            self.source.raw_length(src)
        }
    }

    fn raw_touched(&self) -> usize {
        self.raw_of(self.touched)
    }

    fn to_raw_error(&self, error: &PreprocessError) -> PreprocessError {
        let range = error.span.to_range();
        PreprocessError {
            span: Span::new(
                to_u32(self.raw_of(range.start)),
                to_u32(self.raw_of(range.end)),
            ),
            kind: error.kind.clone(),
        }
    }

    /// Logical text of the token `[start, end)` whose raw extent is
    /// `raw_start..raw_end`.
    fn build_storage(
        &self,
        start: usize,
        end: usize,
        raw_start: usize,
        raw_end: usize,
    ) -> PreprocessedTextStorage {
        let chars: Vec<char> = (start..end).map(|i| self.logical_char(i)).collect();
        let mut prev = raw_start;
        let extras: Vec<usize> = (start..end)
            .map(|i| {
                let char_end = self.source.raw_length(self.src_start(i + 1));
                let extra = char_end - prev - 1;
                prev = char_end;
                extra
            })
            .collect();

        let own = match &self.provider {
            Provider::Text => None,
            Provider::Preprocessed(prepared) => prepared.own_window(start, end),
        };
        let (prep_start, prep_end) = own.unwrap_or_else(|| {
            let first = extras.iter().position(|x| *x > 0).unwrap_or(chars.len());
            (first, first)
        });
        let extra = collect_extra_preprocessed_chars(&chars, &extras, prep_start, prep_end);
        let raw: Arc<[char]> = self.source.raw_chars()[raw_start..raw_end].into();
        PreprocessedTextStorage::create_with_extra(
            raw,
            &chars[prep_start..prep_end],
            prep_start,
            &cumulative(&extras[prep_start..prep_end]),
            &extra,
        )
    }
}

/// Characters an enclosing layer preprocessed around `[prep_start,
/// prep_end)`, the run this layer preprocessed itself.
///
/// Only the minimal context is taken: from the first character with extra
/// raw length before the run, to the last one after it.
fn collect_extra_preprocessed_chars(
    chars: &[char],
    extras: &[usize],
    prep_start: usize,
    prep_end: usize,
) -> ExtraPreprocessedChars {
    let pre_from = extras[..prep_start]
        .iter()
        .position(|x| *x > 0)
        .unwrap_or(prep_start);
    let post_to = extras[prep_end..]
        .iter()
        .rposition(|x| *x > 0)
        .map_or(prep_end, |k| prep_end + k + 1);
    ExtraPreprocessedChars {
        pre: chars[pre_from..prep_start].to_vec(),
        pre_shifts: cumulative(&extras[pre_from..prep_start]),
        post: chars[prep_end..post_to].to_vec(),
        post_shifts: cumulative(&extras[prep_end..post_to]),
    }
}

fn cumulative(extras: &[usize]) -> Vec<usize> {
    extras
        .iter()
        .scan(0, |total, extra| {
            *total += extra;
            Some(*total)
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests;
