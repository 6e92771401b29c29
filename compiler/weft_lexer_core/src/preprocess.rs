//! Character preprocessing.
//!
//! A [`CharPreprocessor`] sits between the raw text and a lexer and folds
//! multi-character escape sequences into single logical characters. The
//! lexer never sees the escape: it reads the folded character, and the
//! input keeps track of how many raw characters each logical character
//! consumed so token offsets stay in raw coordinates.
//!
//! Preprocessing never fails. A malformed sequence produces
//! [`REPLACEMENT_CHAR`] and an error is reported through
//! [`PreprocessorInput::notify_error`]; the error travels with the token it
//! ended up in.

use memchr::{memchr, memchr2, memchr3};

use crate::{CharSequence, Span};

/// Substitute for a malformed escape sequence.
pub const REPLACEMENT_CHAR: char = '\u{FFFF}';

/// What went wrong inside an escape sequence.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PreprocessErrorKind {
    /// A non-hexadecimal character where a hex digit was required.
    #[error("invalid hexadecimal digit {found:?} in unicode escape")]
    InvalidHexDigit { found: char },
    /// The input ended inside the escape.
    #[error("unicode escape ended prematurely")]
    PrematureEnd,
    /// The escape decodes to a lone surrogate, which is not a character.
    #[error("unicode escape \\u{value:04X} is a surrogate")]
    SurrogateEscape { value: u32 },
}

/// A recoverable preprocessing error with its raw character range.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at {span}")]
pub struct PreprocessError {
    pub span: Span,
    pub kind: PreprocessErrorKind,
}

/// Folds escape sequences into logical characters, one call per character.
///
/// Each call to [`preprocess_char`](Self::preprocess_char) must read at
/// least one character and then emit exactly one logical character, either
/// with [`PreprocessorInput::output_original`] (exactly one character
/// consumed) or with [`PreprocessorInput::output_preprocessed`]
/// (`extra_input_length + 1` characters consumed). It is never called at the
/// end of the input.
pub trait CharPreprocessor: Send + Sync {
    fn preprocess_char(&self, input: &mut PreprocessorInput<'_>);

    /// Whether `ch` can start a preprocessed sequence.
    ///
    /// Text without sensitive characters is never changed by this
    /// preprocessor.
    fn is_sensitive_char(&self, ch: char) -> bool;

    /// How many characters past a sequence the preprocessor may read.
    fn max_lookahead(&self) -> usize;
}

/// Raw-character cursor handed to a [`CharPreprocessor`] for one logical
/// character.
pub struct PreprocessorInput<'a> {
    source: &'a dyn CharSequence,
    start: usize,
    pos: usize,
    end: usize,
    eof_read: bool,
    /// Exclusive bound of the characters read, `end + 1` once EOF was read.
    touched: usize,
    output: Option<(char, usize)>,
    errors: Vec<PreprocessError>,
}

impl<'a> PreprocessorInput<'a> {
    pub(crate) fn new(source: &'a dyn CharSequence, start: usize, end: usize) -> Self {
        PreprocessorInput {
            source,
            start,
            pos: start,
            end,
            eof_read: false,
            touched: start,
            output: None,
            errors: Vec::new(),
        }
    }

    /// Next raw character, or `None` at the end of the input.
    pub fn read(&mut self) -> Option<char> {
        if self.eof_read {
            return None;
        }
        if self.pos < self.end {
            let ch = self.source.char_at(self.pos);
            self.pos += 1;
            self.touched = self.touched.max(self.pos);
            Some(ch)
        } else {
            self.eof_read = true;
            self.touched = self.touched.max(self.end + 1);
            None
        }
    }

    /// Un-read the last `count` reads. A read that hit the end of the input
    /// counts as one read but moves nothing back.
    pub fn backup(&mut self, count: usize) {
        let mut count = count;
        if count > 0 && self.eof_read {
            self.eof_read = false;
            count -= 1;
        }
        assert!(
            count <= self.read_length(),
            "backup({count}) past the start of the character (read length {})",
            self.read_length()
        );
        self.pos -= count;
    }

    /// Raw characters consumed for the current logical character.
    #[inline]
    pub fn read_length(&self) -> usize {
        self.pos - self.start
    }

    /// Emit `ch` unchanged. Exactly one character must have been consumed.
    pub fn output_original(&mut self, ch: char) {
        self.emit(ch, 0);
    }

    /// Emit `ch` standing for `extra_input_length + 1` consumed characters.
    pub fn output_preprocessed(&mut self, ch: char, extra_input_length: usize) {
        assert!(
            extra_input_length > 0,
            "preprocessed character {ch:?} must consume extra input"
        );
        self.emit(ch, extra_input_length);
    }

    /// Report a malformed sequence covering the characters read so far.
    pub fn notify_error(&mut self, kind: PreprocessErrorKind) {
        self.errors.push(PreprocessError {
            span: Span::new(to_u32(self.start), to_u32(self.pos)),
            kind,
        });
    }

    fn emit(&mut self, ch: char, extra: usize) {
        assert!(
            self.output.is_none(),
            "preprocessor emitted more than one character at {}",
            self.start
        );
        self.output = Some((ch, extra));
    }
}

/// One logical character produced by a preprocessor.
pub(crate) struct Step {
    pub(crate) ch: char,
    /// Characters of the input consumed for `ch`.
    pub(crate) consumed: usize,
    pub(crate) preprocessed: bool,
    pub(crate) touched: usize,
    pub(crate) errors: Vec<PreprocessError>,
}

/// Run `preprocessor` once at `start`, checking its contract.
pub(crate) fn step(
    preprocessor: &dyn CharPreprocessor,
    source: &dyn CharSequence,
    start: usize,
    end: usize,
) -> Step {
    debug_assert!(start < end, "preprocessing at the end of the input");
    let mut input = PreprocessorInput::new(source, start, end);
    preprocessor.preprocess_char(&mut input);
    let consumed = input.read_length();
    let (ch, extra) = match input.output {
        Some(output) => output,
        None => panic!("preprocessor produced no character at {start}"),
    };
    assert_eq!(
        consumed,
        extra + 1,
        "preprocessor consumed {consumed} characters for {ch:?} but reported {}",
        extra + 1
    );
    Step {
        ch,
        consumed,
        preprocessed: extra > 0,
        touched: input.touched,
        errors: input.errors,
    }
}

/// Folds `\uXXXX` escapes into the character they name.
///
/// A backslash not followed by `u` is left alone, as is the character after
/// it. Invalid or truncated escapes become [`REPLACEMENT_CHAR`] covering the
/// characters that were part of the escape.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UnicodeEscapes;

impl CharPreprocessor for UnicodeEscapes {
    fn preprocess_char(&self, input: &mut PreprocessorInput<'_>) {
        let Some(ch) = input.read() else {
            return;
        };
        if ch != '\\' {
            input.output_original(ch);
            return;
        }
        if input.read() != Some('u') {
            input.backup(1);
            input.output_original('\\');
            return;
        }

        let mut value = 0u32;
        for digits in 0..4 {
            let next = input.read();
            if let Some(digit) = next.and_then(|c| c.to_digit(16)) {
                value = value * 16 + digit;
                continue;
            }
            input.backup(1);
            input.notify_error(match next {
                Some(found) => PreprocessErrorKind::InvalidHexDigit { found },
                None => PreprocessErrorKind::PrematureEnd,
            });
            input.output_preprocessed(REPLACEMENT_CHAR, 1 + digits);
            return;
        }

        match char::from_u32(value) {
            Some(decoded) => input.output_preprocessed(decoded, 5),
            None => {
                input.notify_error(PreprocessErrorKind::SurrogateEscape { value });
                input.output_preprocessed(REPLACEMENT_CHAR, 5);
            }
        }
    }

    #[inline]
    fn is_sensitive_char(&self, ch: char) -> bool {
        ch == '\\'
    }

    fn max_lookahead(&self) -> usize {
        1
    }
}

/// Whether `text` contains a character `preprocessor` is sensitive to.
///
/// Text without one preprocesses to itself, so callers can skip
/// preprocessing entirely.
pub fn contains_sensitive_chars(text: &str, preprocessor: &dyn CharPreprocessor) -> bool {
    let ascii: Vec<u8> = (0u8..0x80)
        .filter(|b| preprocessor.is_sensitive_char(char::from(*b)))
        .collect();
    let bytes = text.as_bytes();
    let found_ascii = match ascii.as_slice() {
        [] => false,
        [a] => memchr(*a, bytes).is_some(),
        [a, b] => memchr2(*a, *b, bytes).is_some(),
        [a, b, c] => memchr3(*a, *b, *c, bytes).is_some(),
        _ => bytes.iter().any(|b| ascii.contains(b)),
    };
    found_ascii
        || (!text.is_ascii()
            && text
                .chars()
                .any(|c| !c.is_ascii() && preprocessor.is_sensitive_char(c)))
}

#[inline]
#[allow(
    clippy::cast_possible_truncation,
    reason = "input offsets bounded by u32, texts over 4 GiB are unsupported"
)]
pub(crate) fn to_u32(value: usize) -> u32 {
    debug_assert!(u32::try_from(value).is_ok(), "offset {value} exceeds u32");
    value as u32
}
