use std::sync::Arc;

use pretty_assertions::assert_eq;

use super::*;
use crate::{Lexer, LexerState, PreprocessErrorKind, UnicodeEscapes, REPLACEMENT_CHAR};

const WORD: TokenId = TokenId(1);
const SPACE: TokenId = TokenId(2);
const OTHER: TokenId = TokenId(3);
const PLUS: TokenId = TokenId(4);

fn class(c: char) -> TokenId {
    if c == '+' {
        PLUS
    } else if c.is_alphabetic() {
        WORD
    } else if c.is_whitespace() {
        SPACE
    } else {
        OTHER
    }
}

/// Runs of letters or whitespace, everything else one character at a time.
struct Words;

impl Lexer for Words {
    fn next_token(&mut self, input: &mut LexerInput<'_>) -> Option<LexedToken> {
        let first = input.read()?;
        let id = class(first);
        if id == PLUS {
            return Some(input.fly_token(PLUS, "+"));
        }
        if id != OTHER {
            while let Some(c) = input.read() {
                if class(c) != id {
                    input.backup(1);
                    break;
                }
            }
        }
        Some(input.token(id))
    }

    fn state(&self) -> Option<LexerState> {
        None
    }
}

fn lex_window(
    source: &dyn CharSequence,
    start: usize,
    end: usize,
    preprocessor: Option<&dyn CharPreprocessor>,
) -> Vec<FinishedToken> {
    let mut input = LexerInput::new(source, start, end, preprocessor);
    let mut lexer = Words;
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token(&mut input) {
        tokens.push(input.finish_token(&token));
    }
    assert!(input.is_exhausted());
    tokens
}

fn lex(source: &dyn CharSequence, preprocessor: Option<&dyn CharPreprocessor>) -> Vec<FinishedToken> {
    lex_window(source, 0, source.len(), preprocessor)
}

/// `(id, offset, length, lookahead)` per token.
fn extents(tokens: &[FinishedToken]) -> Vec<(u16, u32, u32, u32)> {
    tokens
        .iter()
        .map(|t| (t.id.0, t.offset, t.length, t.lookahead))
        .collect()
}

fn chars(text: &str) -> Arc<[char]> {
    text.chars().collect()
}

// === Plain text ===

#[test]
fn plain_tokens_and_lookahead() {
    let source = chars("ab cd");
    let tokens = lex(&source, None);
    assert_eq!(
        extents(&tokens),
        vec![(1, 0, 2, 1), (2, 2, 1, 1), (1, 3, 2, 1)]
    );
    assert!(tokens.iter().all(|t| t.text.is_none() && t.errors.is_empty()));
}

#[test]
fn single_char_token_without_peek_has_no_lookahead() {
    let source = chars("!?");
    let tokens = lex(&source, None);
    assert_eq!(extents(&tokens), vec![(3, 0, 1, 0), (3, 1, 1, 0)]);
}

#[test]
fn window_offsets_are_relative_to_the_sequence() {
    let source = chars("ab cde fg");
    let tokens = lex_window(&source, 3, 6, None);
    assert_eq!(extents(&tokens), vec![(1, 3, 3, 1)]);
}

#[test]
fn backup_treats_end_of_input_as_one_read() {
    let source = chars("ab");
    let mut input = LexerInput::new(&source, 0, 2, None);
    assert_eq!(input.read(), Some('a'));
    assert_eq!(input.read(), Some('b'));
    assert_eq!(input.read(), None);
    input.backup(1);
    assert_eq!(input.read_length(), 2);
    input.backup(1);
    assert_eq!(input.read_length(), 1);
    assert_eq!(input.read(), Some('b'));
    assert!(input.read_text_eq("ab"));
    assert!(!input.read_text_eq("a"));
    assert_eq!(input.read_text(), "ab");
}

#[test]
fn read_existing_sees_logical_chars() {
    let source = chars(r"a\u0042c");
    let mut input = LexerInput::new(&source, 0, source.len(), Some(&UnicodeEscapes));
    assert_eq!(input.read(), Some('a'));
    assert_eq!(input.read(), Some('B'));
    assert_eq!(input.read_existing(1), 'B');
    assert_eq!(input.read_existing(0), 'a');
}

#[test]
#[should_panic(expected = "past the read length")]
fn read_existing_past_the_read_length_panics() {
    let source = chars("ab");
    let mut input = LexerInput::new(&source, 0, 2, None);
    input.read();
    input.read_existing(1);
}

#[test]
#[should_panic(expected = "past the token start")]
fn backup_before_token_start_panics() {
    let source = chars("ab");
    let mut input = LexerInput::new(&source, 0, 2, None);
    input.read();
    input.backup(2);
}

#[test]
#[should_panic(expected = "empty token")]
fn empty_token_is_rejected() {
    let source = chars("ab");
    let mut input = LexerInput::new(&source, 0, 2, None);
    let token = input.token(WORD);
    let _ = input.finish_token(&token);
}

#[test]
fn next_token_offset_follows_finished_tokens() {
    let source = chars("ab cd");
    let mut input = LexerInput::new(&source, 0, 5, None);
    assert_eq!(input.next_token_offset(), 0);
    let token = Words.next_token(&mut input).unwrap();
    input.finish_token(&token);
    assert_eq!(input.next_token_offset(), 2);
    assert_eq!(input.next_token_source_index(), 2);
    assert!(!input.is_exhausted());
}

// === Preprocessed input ===

#[test]
fn escape_inside_a_word() {
    let source = chars(r"x\u0041y z");
    let tokens = lex(&source, Some(&UnicodeEscapes));
    assert_eq!(
        extents(&tokens),
        vec![(1, 0, 8, 1), (2, 8, 1, 1), (1, 9, 1, 1)]
    );
    let text = tokens[0].text.as_ref().unwrap();
    assert_eq!(text.to_string(), "xAy");
    assert_eq!(text.raw_length(2), 7);
    assert!(tokens[1].text.is_none());
}

#[test]
fn truncated_escape_reports_error_with_raw_span() {
    let source = chars(r"\u00");
    let tokens = lex(&source, Some(&UnicodeEscapes));
    assert_eq!(extents(&tokens), vec![(3, 0, 4, 1)]);
    assert_eq!(
        tokens[0].errors,
        vec![PreprocessError {
            span: Span::new(0, 4),
            kind: PreprocessErrorKind::PrematureEnd,
        }]
    );
    let text = tokens[0].text.as_ref().unwrap();
    assert_eq!(text.char_at(0), REPLACEMENT_CHAR);
}

#[test]
fn errors_stay_with_their_token() {
    let source = chars(r"a \u00g1 b");
    let tokens = lex(&source, Some(&UnicodeEscapes));
    let with_errors: Vec<u32> = tokens
        .iter()
        .filter(|t| !t.errors.is_empty())
        .map(|t| t.offset)
        .collect();
    assert_eq!(with_errors, vec![2]);
    assert_eq!(tokens[2].errors[0].span, Span::new(2, 6));
}

#[test]
fn fly_text_dropped_when_text_is_preprocessed() {
    let source = chars(r"+\u002b");
    let tokens = lex(&source, Some(&UnicodeEscapes));
    assert_eq!(extents(&tokens), vec![(4, 0, 1, 0), (4, 1, 6, 0)]);
    assert_eq!(tokens[0].fly_text, Some("+"));
    assert_eq!(tokens[1].fly_text, None);
    assert_eq!(tokens[1].text.as_ref().unwrap().to_string(), "+");
}

// === Nested preprocessing ===

#[test]
fn escape_of_an_escape() {
    let (parent, _) =
        PreprocessedTextStorage::from_preprocessor(chars(r"\u005cu0041!"), &UnicodeEscapes);
    assert_eq!(parent.to_string(), r"\u0041!");

    let tokens = lex(&parent, Some(&UnicodeEscapes));
    assert_eq!(extents(&tokens), vec![(1, 0, 11, 1), (3, 11, 1, 0)]);
    let text = tokens[0].text.as_ref().unwrap();
    assert_eq!(text.to_string(), "A");
    assert_eq!(text.raw_length(1), 11);
}

#[test]
fn parent_escape_without_child_preprocessor() {
    let (parent, _) =
        PreprocessedTextStorage::from_preprocessor(chars(r"a\u0062c d"), &UnicodeEscapes);
    let tokens = lex(&parent, None);
    assert_eq!(
        extents(&tokens),
        vec![(1, 0, 8, 1), (2, 8, 1, 1), (1, 9, 1, 1)]
    );
    let text = tokens[0].text.as_ref().unwrap();
    assert_eq!(text.to_string(), "abc");
    assert_eq!(text.preprocessed_start(), 1);
    assert_eq!(text.raw_length(2), 7);
}

#[test]
fn extra_context_is_minimal() {
    let chars = ['a', 'b', 'c', 'd', 'e'];
    let extras = [0, 3, 0, 2, 0];
    let extra = collect_extra_preprocessed_chars(&chars, &extras, 2, 3);
    assert_eq!(
        extra,
        ExtraPreprocessedChars {
            pre: vec!['b'],
            pre_shifts: vec![3],
            post: vec!['d'],
            post_shifts: vec![2],
        }
    );
}
