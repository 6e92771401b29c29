//! Edits of mutable input relex only the damaged tokens.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use weft_langs::{sample_manager, script};
use weft_lexer::{LexerConfig, TokenHierarchy, TokenList};
use weft_lexer_core::{LexerState, TokenId};

fn script_hierarchy(text: &str, mutable: bool) -> TokenHierarchy {
    let (manager, _) = sample_manager().unwrap();
    TokenHierarchy::for_mime_type(text, script::MIME_TYPE, manager, LexerConfig::default(), mutable)
        .unwrap()
}

/// `(id, offset, text)` of every token.
fn dump(list: &mut dyn TokenList) -> Vec<(TokenId, u32, String)> {
    (0..list.token_count())
        .map(|i| {
            (
                list.token(i).unwrap().id(),
                list.token_offset(i),
                list.token_text(i).unwrap(),
            )
        })
        .collect()
}

fn fresh(text: &str) -> Vec<(TokenId, u32, String)> {
    dump(script_hierarchy(text, false).root())
}

#[test]
fn replaced_identifier_resynchronizes() {
    let mut hierarchy = script_hierarchy("let x = 1;", true);
    assert_eq!(hierarchy.root().token_count(), 8);

    let result = hierarchy.modify(4, 1, "yy").unwrap();
    assert_eq!(result.relexed, 1..3);
    assert_eq!(result.removed_tokens, 2);
    assert!(result.removed_lists.is_empty());
    assert_eq!(hierarchy.text(), "let yy = 1;");

    let tokens = dump(hierarchy.root());
    let offsets: Vec<u32> = tokens.iter().map(|(_, offset, _)| *offset).collect();
    assert_eq!(offsets, [0, 3, 4, 6, 7, 8, 9, 10]);
    assert_eq!(tokens[2], (script::IDENTIFIER, 4, "yy".to_owned()));
    assert_eq!(tokens, fresh("let yy = 1;"));
}

#[test]
fn appending_relexes_the_last_token() {
    let mut hierarchy = script_hierarchy("let x", true);
    assert_eq!(hierarchy.root().token_count(), 3);

    let result = hierarchy.modify(5, 0, "y;").unwrap();
    assert_eq!(result.relexed, 2..4);
    assert_eq!(result.removed_tokens, 1);
    assert_eq!(dump(hierarchy.root()), fresh("let xy;"));
}

#[test]
fn deleting_everything_leaves_no_tokens() {
    let mut hierarchy = script_hierarchy("let x", true);
    assert_eq!(hierarchy.root().token_count(), 3);

    let result = hierarchy.modify(0, 5, "").unwrap();
    assert_eq!(result.relexed, 0..0);
    assert_eq!(result.removed_tokens, 3);
    let root = hierarchy.root();
    assert_eq!(root.token_count(), 0);
    assert_eq!(root.end_offset(), 0);
    assert_eq!(hierarchy.mod_count(), 1);
}

#[test]
fn edit_past_the_lexed_frontier_is_deferred() {
    let mut hierarchy = script_hierarchy("let x = 1;", true);
    assert_eq!(hierarchy.root().token(0).unwrap().id(), script::LET);
    assert_eq!(hierarchy.root().token_count_current(), 1);

    let result = hierarchy.modify(8, 1, "22").unwrap();
    assert_eq!(result.relexed, 1..1);
    assert_eq!(result.removed_tokens, 0);
    assert_eq!(dump(hierarchy.root()), fresh("let x = 22;"));
}

#[test]
fn unterminating_a_comment_swallows_the_rest() {
    let mut hierarchy = script_hierarchy("x /* a */ y", true);
    assert_eq!(hierarchy.root().token_count(), 5);

    hierarchy.modify(7, 2, "").unwrap();
    let root = hierarchy.root();
    assert_eq!(
        dump(root),
        [
            (script::IDENTIFIER, 0, "x".to_owned()),
            (script::WHITESPACE, 1, " ".to_owned()),
            (script::BLOCK_COMMENT, 2, "/* a  y".to_owned()),
        ]
    );
    assert_eq!(root.state(2), Some(LexerState::Int(script::IN_BLOCK_COMMENT)));
}

#[test]
fn completing_an_escape_joins_tokens() {
    let mut hierarchy = script_hierarchy("a\\u006 x", true);
    hierarchy.root().token_count();

    hierarchy.modify(6, 0, "2").unwrap();
    let tokens = dump(hierarchy.root());
    assert_eq!(tokens[0], (script::IDENTIFIER, 0, "ab".to_owned()));
    assert_eq!(tokens, fresh("a\\u0062 x"));
}

#[test]
fn successive_edits_count_modifications() {
    let mut hierarchy = script_hierarchy("f(a)", true);
    hierarchy.modify(2, 1, "b, c").unwrap();
    hierarchy.modify(0, 0, "fn ").unwrap();
    assert_eq!(hierarchy.mod_count(), 2);
    assert_eq!(hierarchy.text(), "fn f(b, c)");
    assert_eq!(dump(hierarchy.root()), fresh("fn f(b, c)"));
}

const ALPHABET: [char; 13] = ['a', 'b', '1', 'u', '0', ' ', '=', ';', '/', '*', '\\', '"', '\n'];

fn script_text(max: usize) -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(ALPHABET.to_vec()), 0..max)
        .prop_map(|chars| chars.into_iter().collect())
}

proptest! {
    #[test]
    fn incremental_lexing_matches_fresh_lexing(
        text in script_text(30),
        inserted in script_text(6),
        at in any::<prop::sample::Index>(),
        removed in 0usize..6,
        lexed in 0usize..40,
    ) {
        let len = text.chars().count();
        let offset = at.index(len + 1);
        let removed = removed.min(len - offset);

        let mut hierarchy = script_hierarchy(&text, true);
        // Lex only a prefix so some edits land past the frontier.
        hierarchy.root().token(lexed);

        let offset = u32::try_from(offset).unwrap();
        let removed = u32::try_from(removed).unwrap();
        hierarchy.modify(offset, removed, &inserted).unwrap();

        let edited = hierarchy.text();
        let mut expected: Vec<char> = text.chars().collect();
        expected.splice(offset as usize..(offset + removed) as usize, inserted.chars());
        prop_assert_eq!(&edited, &expected.into_iter().collect::<String>());
        prop_assert_eq!(dump(hierarchy.root()), fresh(&edited));
    }
}
