//! Immutable logical text produced by preprocessing.
//!
//! The storage keeps the raw text plus one contiguous run of logical
//! characters that differ from it. Before the run logical and raw text
//! coincide; after it they coincide again, offset by the total shift.
//!
//! ```text
//! raw:     a \ u 0 0 6 2 c
//! logical: a b c
//! start = 1, chars = [b], shifts = [5]
//! ```
//!
//! `shifts[k]` is the number of extra raw characters consumed up to and
//! including logical character `start + k`. Shifts never decrease.

use std::fmt;
use std::sync::Arc;

use crate::preprocess::{self, PreprocessError};
use crate::{CharPreprocessor, CharSequence};

/// Integer width chosen for the shift table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ShiftWidth {
    U8,
    U16,
    U32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum ShiftTable {
    U8(Box<[u8]>),
    U16(Box<[u16]>),
    U32(Box<[u32]>),
}

impl ShiftTable {
    fn new(shifts: &[usize]) -> Self {
        let max = shifts.iter().copied().max().unwrap_or(0);
        if u8::try_from(max).is_ok() {
            ShiftTable::U8(
                shifts
                    .iter()
                    .map(|s| u8::try_from(*s).unwrap_or(u8::MAX))
                    .collect(),
            )
        } else if u16::try_from(max).is_ok() {
            ShiftTable::U16(
                shifts
                    .iter()
                    .map(|s| u16::try_from(*s).unwrap_or(u16::MAX))
                    .collect(),
            )
        } else {
            assert!(
                u32::try_from(max).is_ok(),
                "raw length shift {max} exceeds u32"
            );
            ShiftTable::U32(
                shifts
                    .iter()
                    .map(|s| u32::try_from(*s).unwrap_or(u32::MAX))
                    .collect(),
            )
        }
    }

    #[inline]
    fn get(&self, index: usize) -> usize {
        match self {
            ShiftTable::U8(t) => usize::from(t[index]),
            ShiftTable::U16(t) => usize::from(t[index]),
            ShiftTable::U32(t) => t[index] as usize,
        }
    }

    fn len(&self) -> usize {
        match self {
            ShiftTable::U8(t) => t.len(),
            ShiftTable::U16(t) => t.len(),
            ShiftTable::U32(t) => t.len(),
        }
    }

    fn width(&self) -> ShiftWidth {
        match self {
            ShiftTable::U8(_) => ShiftWidth::U8,
            ShiftTable::U16(_) => ShiftWidth::U16,
            ShiftTable::U32(_) => ShiftWidth::U32,
        }
    }
}

/// Preprocessed characters contributed by an enclosing preprocessing layer
/// around a token's own preprocessed run.
///
/// `pre` sits right before the run and `post` right after it. Each shift
/// list is cumulative within its own segment.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtraPreprocessedChars {
    pub pre: Vec<char>,
    pub pre_shifts: Vec<usize>,
    pub post: Vec<char>,
    pub post_shifts: Vec<usize>,
}

impl ExtraPreprocessedChars {
    pub fn is_empty(&self) -> bool {
        self.pre.is_empty() && self.post.is_empty()
    }
}

/// Logical character sequence over raw text with a raw length shift table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreprocessedTextStorage {
    raw: Arc<[char]>,
    start: usize,
    chars: Box<[char]>,
    shifts: ShiftTable,
    total_shift: usize,
}

impl PreprocessedTextStorage {
    /// Build the storage from `raw` and the preprocessed run starting at
    /// logical index `start`.
    ///
    /// `shifts[k]` is the cumulative raw length shift through
    /// `preprocessed[k]`.
    ///
    /// # Panics
    ///
    /// Panics if the lengths disagree or the run does not fit into `raw`.
    pub fn create(
        raw: Arc<[char]>,
        preprocessed: &[char],
        start: usize,
        shifts: &[usize],
    ) -> Self {
        assert_eq!(
            preprocessed.len(),
            shifts.len(),
            "one shift per preprocessed character"
        );
        let total_shift = shifts.last().copied().unwrap_or(0);
        assert!(
            start + preprocessed.len() + total_shift <= raw.len(),
            "preprocessed run {start}+{} with shift {total_shift} exceeds raw length {}",
            preprocessed.len(),
            raw.len()
        );
        let storage = PreprocessedTextStorage {
            raw,
            start,
            chars: preprocessed.into(),
            shifts: ShiftTable::new(shifts),
            total_shift,
        };
        debug_assert_eq!(storage.check_consistency(), None);
        storage
    }

    /// Like [`create`](Self::create), widening the run by characters an
    /// enclosing layer preprocessed just before and after it.
    pub fn create_with_extra(
        raw: Arc<[char]>,
        preprocessed: &[char],
        start: usize,
        shifts: &[usize],
        extra: &ExtraPreprocessedChars,
    ) -> Self {
        if extra.is_empty() {
            return PreprocessedTextStorage::create(raw, preprocessed, start, shifts);
        }
        assert!(
            extra.pre.len() <= start,
            "{} pre-context characters before run start {start}",
            extra.pre.len()
        );
        let pre_total = extra.pre_shifts.last().copied().unwrap_or(0);
        let main_total = shifts.last().copied().unwrap_or(0);

        let mut chars = Vec::with_capacity(extra.pre.len() + preprocessed.len() + extra.post.len());
        chars.extend_from_slice(&extra.pre);
        chars.extend_from_slice(preprocessed);
        chars.extend_from_slice(&extra.post);

        let mut merged = Vec::with_capacity(chars.len());
        merged.extend_from_slice(&extra.pre_shifts);
        merged.extend(shifts.iter().map(|s| s + pre_total));
        merged.extend(extra.post_shifts.iter().map(|s| s + pre_total + main_total));

        PreprocessedTextStorage::create(raw, &chars, start - extra.pre.len(), &merged)
    }

    /// Run `preprocessor` over the whole of `raw`.
    pub fn from_preprocessor(
        raw: Arc<[char]>,
        preprocessor: &dyn CharPreprocessor,
    ) -> (Self, Vec<PreprocessError>) {
        let mut chars = Vec::new();
        let mut shifts = Vec::new();
        let mut errors = Vec::new();
        let mut run_start = None;
        let mut logical = 0;
        let mut cursor = 0;
        let mut total = 0;
        while cursor < raw.len() {
            let step = preprocess::step(preprocessor, &raw, cursor, raw.len());
            cursor += step.consumed;
            total += step.consumed - 1;
            errors.extend(step.errors);
            if step.preprocessed && run_start.is_none() {
                run_start = Some(logical);
            }
            if run_start.is_some() {
                chars.push(step.ch);
                shifts.push(total);
            }
            logical += 1;
        }
        // Originals after the last preprocessed character live in `raw`.
        while shifts.len() >= 2 && shifts[shifts.len() - 1] == shifts[shifts.len() - 2] {
            shifts.pop();
            chars.pop();
        }
        let storage = PreprocessedTextStorage::create(raw, &chars, run_start.unwrap_or(0), &shifts);
        (storage, errors)
    }

    /// Number of logical characters.
    #[inline]
    pub fn len(&self) -> usize {
        self.raw.len() - self.total_shift
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Logical character at `index`.
    pub fn char_at(&self, index: usize) -> char {
        assert!(
            index < self.len(),
            "index {index} out of bounds (len {})",
            self.len()
        );
        if index < self.start {
            self.raw[index]
        } else if index - self.start < self.chars.len() {
            self.chars[index - self.start]
        } else {
            self.raw[index + self.total_shift]
        }
    }

    /// Extra raw characters consumed through logical character `index`.
    pub fn raw_length_shift(&self, index: usize) -> usize {
        if index < self.start {
            0
        } else if index - self.start < self.shifts.len() {
            self.shifts.get(index - self.start)
        } else {
            self.total_shift
        }
    }

    /// Raw characters covered by the first `len` logical characters.
    pub fn raw_length(&self, len: usize) -> usize {
        assert!(
            len <= self.len(),
            "length {len} out of bounds (len {})",
            self.len()
        );
        if len <= self.start {
            len
        } else {
            len + self.raw_length_shift(len - 1)
        }
    }

    /// Raw offset where logical character `index` starts.
    #[inline]
    pub fn raw_offset(&self, index: usize) -> usize {
        self.raw_length(index)
    }

    /// The raw text.
    #[inline]
    pub fn raw_text(&self) -> &[char] {
        &self.raw
    }

    /// First logical index of the preprocessed run.
    #[inline]
    pub fn preprocessed_start(&self) -> usize {
        self.start
    }

    /// Length of the preprocessed run.
    #[inline]
    pub fn preprocessed_len(&self) -> usize {
        self.chars.len()
    }

    #[inline]
    pub fn total_shift(&self) -> usize {
        self.total_shift
    }

    pub fn shift_width(&self) -> ShiftWidth {
        self.shifts.width()
    }

    /// First run index whose shift is lower than its predecessor's, `None`
    /// when the table is consistent.
    pub fn check_consistency(&self) -> Option<usize> {
        (1..self.shifts.len()).find(|&k| self.shifts.get(k) < self.shifts.get(k - 1))
    }
}

impl CharSequence for PreprocessedTextStorage {
    #[inline]
    fn len(&self) -> usize {
        PreprocessedTextStorage::len(self)
    }

    #[inline]
    fn char_at(&self, index: usize) -> char {
        PreprocessedTextStorage::char_at(self, index)
    }

    #[inline]
    fn raw_length(&self, len: usize) -> usize {
        PreprocessedTextStorage::raw_length(self, len)
    }

    fn raw_chars(&self) -> &[char] {
        &self.raw
    }
}

impl fmt::Display for PreprocessedTextStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use fmt::Write;
        for i in 0..self.len() {
            f.write_char(self.char_at(i))?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests;
