use super::*;
use crate::test_support::lex;
use pretty_assertions::assert_eq;
use weft_ir::Language;

fn tokens(text: &str) -> Vec<(&'static str, String)> {
    let language = Language::new(MarkupLanguage).unwrap();
    lex(&language, text)
}

fn owned(tokens: &[(&'static str, &str)]) -> Vec<(&'static str, String)> {
    tokens.iter().map(|(id, text)| (*id, (*text).to_owned())).collect()
}

#[test]
fn text_tags_and_sections() {
    assert_eq!(
        tokens("a<b>\n<?x = 1;?>c d"),
        owned(&[
            ("text", "a"),
            ("tag", "<b>"),
            ("newline", "\n"),
            ("script", "<?x = 1;?>"),
            ("text", "c d"),
        ])
    );
}

#[test]
fn unterminated_constructs_run_to_the_end() {
    assert_eq!(tokens("<?x\ny"), owned(&[("script", "<?x\ny")]));
    assert_eq!(tokens("<a b"), owned(&[("tag", "<a b")]));
    assert_eq!(tokens("a<"), owned(&[("text", "a"), ("text", "<")]));
}

#[test]
fn question_mark_of_the_opener_does_not_close() {
    assert_eq!(tokens("<?>a?>b"), owned(&[("script", "<?>a?>"), ("text", "b")]));
    assert_eq!(tokens("<??>"), owned(&[("script", "<??>")]));
}

#[test]
fn script_sections_embed_script_joined() {
    let query = |id, text| MarkupLanguage.embedding(&EmbeddingQuery { id, text });

    let closed = query(SCRIPT, "<?x?>").unwrap();
    assert_eq!(closed.mime_type, crate::script::MIME_TYPE);
    assert_eq!((closed.start_skip, closed.end_skip), (2, 2));
    assert!(closed.join_sections);

    let open = query(SCRIPT, "<?x").unwrap();
    assert_eq!((open.start_skip, open.end_skip), (2, 0));
    assert_eq!(query(SCRIPT, "<?>").unwrap().end_skip, 0);
    assert_eq!(query(TEXT, "x"), None);
    assert!(MarkupLanguage.embedding_depends_on_text(SCRIPT));
    assert!(!MarkupLanguage.embedding_depends_on_text(TAG));
}
