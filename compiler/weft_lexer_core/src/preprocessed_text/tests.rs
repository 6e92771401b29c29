use std::sync::Arc;

use pretty_assertions::assert_eq;

use super::*;
use crate::UnicodeEscapes;

fn chars(text: &str) -> Arc<[char]> {
    text.chars().collect()
}

#[test]
fn text_without_escapes_is_raw() {
    let (storage, errors) = PreprocessedTextStorage::from_preprocessor(chars("plain"), &UnicodeEscapes);
    assert!(errors.is_empty());
    assert_eq!(storage.preprocessed_len(), 0);
    assert_eq!(storage.total_shift(), 0);
    assert_eq!(storage.to_string(), "plain");
    assert_eq!(storage.raw_length(5), 5);
}

#[test]
fn run_covers_first_to_last_escape() {
    let raw = chars(r"ab\u0063\u0064\u0065fg");
    let (storage, _) = PreprocessedTextStorage::from_preprocessor(raw, &UnicodeEscapes);
    assert_eq!(storage.to_string(), "abcdefg");
    assert_eq!(storage.preprocessed_start(), 2);
    assert_eq!(storage.preprocessed_len(), 3);
    assert_eq!(storage.total_shift(), 15);
    assert_eq!(storage.raw_offset(3), 8);
    assert_eq!(storage.raw_offset(5), 20);
    assert_eq!(storage.char_at(6), 'g');
}

#[test]
fn create_matches_the_documented_example() {
    let storage = PreprocessedTextStorage::create(chars(r"a\u0062c"), &['b'], 1, &[5]);
    assert_eq!(storage.len(), 3);
    assert_eq!(storage.to_string(), "abc");
    assert_eq!(storage.raw_length(1), 1);
    assert_eq!(storage.raw_length(2), 7);
    assert_eq!(storage.raw_length(3), 8);
    assert_eq!(storage.shift_width(), ShiftWidth::U8);
}

#[test]
fn extra_chars_widen_the_run() {
    let extra = ExtraPreprocessedChars {
        pre: vec!['A'],
        pre_shifts: vec![5],
        post: vec!['C'],
        post_shifts: vec![5],
    };
    let storage = PreprocessedTextStorage::create_with_extra(
        chars(r"\u0041b\u0043"),
        &['b'],
        1,
        &[0],
        &extra,
    );
    assert_eq!(storage.to_string(), "AbC");
    assert_eq!(storage.preprocessed_start(), 0);
    assert_eq!(
        (0..3).map(|i| storage.raw_length_shift(i)).collect::<Vec<_>>(),
        vec![5, 5, 10]
    );
    assert_eq!(storage.raw_length(2), 7);
    assert_eq!(storage.raw_length(3), 13);
    assert_eq!(storage.check_consistency(), None);
}

#[test]
fn wide_shifts_pick_a_wider_table() {
    let raw: Arc<[char]> = std::iter::repeat('x').take(400).collect();
    let storage = PreprocessedTextStorage::create(raw.clone(), &['y'], 0, &[300]);
    assert_eq!(storage.shift_width(), ShiftWidth::U16);
    assert_eq!(storage.len(), 100);
    assert_eq!(storage.char_at(0), 'y');
    assert_eq!(storage.char_at(1), 'x');
    assert_eq!(storage.raw_length(1), 301);

    let raw: Arc<[char]> = std::iter::repeat('x').take(70_000).collect();
    let storage = PreprocessedTextStorage::create(raw, &['y'], 0, &[66_000]);
    assert_eq!(storage.shift_width(), ShiftWidth::U32);
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "left == right")]
fn decreasing_shifts_are_rejected() {
    let _ = PreprocessedTextStorage::create(chars("0123456789"), &['a', 'b'], 0, &[5, 3]);
}

#[test]
#[should_panic(expected = "exceeds raw length")]
fn run_must_fit_into_raw_text() {
    let _ = PreprocessedTextStorage::create(chars("abc"), &['a'], 0, &[5]);
}

#[test]
fn char_sequence_reports_raw_lengths() {
    let (storage, _) = PreprocessedTextStorage::from_preprocessor(chars(r"\u0041z"), &UnicodeEscapes);
    let seq: &dyn CharSequence = &storage;
    assert_eq!(seq.len(), 2);
    assert_eq!(seq.text(0, 2), "Az");
    assert_eq!(seq.raw_length(1), 6);
    assert_eq!(seq.raw_chars().len(), 7);
}

mod proptest_storage {
    use std::sync::Arc;

    use super::super::*;
    use crate::{UnicodeEscapes, REPLACEMENT_CHAR};
    use proptest::prelude::*;

    /// Independent decoder: (logical char, raw chars consumed).
    fn decode(raw: &[char]) -> Vec<(char, usize)> {
        let mut out = Vec::new();
        let mut i = 0;
        while i < raw.len() {
            if raw[i] == '\\' && raw.get(i + 1) == Some(&'u') {
                let digits = raw[i + 2..]
                    .iter()
                    .take(4)
                    .take_while(|c| c.is_ascii_hexdigit())
                    .count();
                if digits == 4 {
                    let hex: String = raw[i + 2..i + 6].iter().collect();
                    let value = u32::from_str_radix(&hex, 16).unwrap();
                    out.push((char::from_u32(value).unwrap_or(REPLACEMENT_CHAR), 6));
                    i += 6;
                } else {
                    out.push((REPLACEMENT_CHAR, 2 + digits));
                    i += 2 + digits;
                }
            } else {
                out.push((raw[i], 1));
                i += 1;
            }
        }
        out
    }

    fn raw_text() -> impl Strategy<Value = Vec<char>> {
        proptest::collection::vec(
            prop_oneof![
                Just('a'),
                Just('\\'),
                Just('u'),
                Just('0'),
                Just('4'),
                Just('F'),
                Just('d'),
                Just('g'),
            ],
            0..64,
        )
    }

    proptest! {
        #[test]
        fn logical_chars_and_raw_lengths_round_trip(raw in raw_text()) {
            let expected = decode(&raw);
            let raw: Arc<[char]> = raw.into();
            let (storage, _) = PreprocessedTextStorage::from_preprocessor(raw.clone(), &UnicodeEscapes);
            prop_assert_eq!(storage.len(), expected.len());
            let mut consumed = 0;
            for (i, (ch, len)) in expected.iter().enumerate() {
                prop_assert_eq!(storage.raw_offset(i), consumed);
                prop_assert_eq!(storage.char_at(i), *ch);
                consumed += len;
                prop_assert_eq!(storage.raw_length(i + 1), consumed);
            }
            prop_assert_eq!(storage.raw_length(storage.len()), raw.len());
        }

        #[test]
        fn shifts_never_decrease(raw in raw_text()) {
            let (storage, _) = PreprocessedTextStorage::from_preprocessor(raw.into(), &UnicodeEscapes);
            prop_assert_eq!(storage.check_consistency(), None);
            for i in 1..storage.len() {
                prop_assert!(storage.raw_length_shift(i - 1) <= storage.raw_length_shift(i));
            }
        }
    }
}
