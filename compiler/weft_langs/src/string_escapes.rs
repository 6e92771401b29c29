//! `text/x-string-escapes`: the content of a script string literal.

use weft_ir::{LanguageHierarchy, TokenIdDef};
use weft_lexer_core::{LexedToken, Lexer, LexerInput, LexerState, TokenId};

pub const MIME_TYPE: &str = "text/x-string-escapes";

pub const TEXT: TokenId = TokenId(0);
pub const ESCAPE: TokenId = TokenId(1);
/// A backslash at the end of the content.
pub const INVALID_ESCAPE: TokenId = TokenId(2);

pub struct StringEscapesLanguage;

impl LanguageHierarchy for StringEscapesLanguage {
    fn mime_type(&self) -> &str {
        MIME_TYPE
    }

    fn token_ids(&self) -> Vec<TokenIdDef> {
        vec![
            TokenIdDef::new("text", TEXT.0),
            TokenIdDef::new("escape", ESCAPE.0).with_category("escape"),
            TokenIdDef::new("invalid-escape", INVALID_ESCAPE.0).with_category("error"),
        ]
    }

    fn create_lexer(&self, _state: Option<LexerState>) -> Box<dyn Lexer> {
        Box::new(StringEscapesLexer)
    }
}

struct StringEscapesLexer;

impl Lexer for StringEscapesLexer {
    fn next_token(&mut self, input: &mut LexerInput<'_>) -> Option<LexedToken> {
        if input.read()? != '\\' {
            while !matches!(input.read(), Some('\\') | None) {}
            input.backup(1);
            return Some(input.token(TEXT));
        }
        let token = match input.read() {
            Some('n') => input.fly_token(ESCAPE, "\\n"),
            Some('t') => input.fly_token(ESCAPE, "\\t"),
            Some('"') => input.fly_token(ESCAPE, "\\\""),
            Some('\\') => input.fly_token(ESCAPE, "\\\\"),
            Some(_) => input.token(ESCAPE),
            None => {
                input.backup(1);
                input.token(INVALID_ESCAPE)
            }
        };
        Some(token)
    }

    fn state(&self) -> Option<LexerState> {
        None
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use crate::test_support::lex;
    use pretty_assertions::assert_eq;
    use weft_ir::Language;

    #[test]
    fn splits_text_and_escapes() {
        let language = Language::new(super::StringEscapesLanguage).unwrap();
        assert_eq!(
            lex(&language, r#"a\n\q bc\"\"#),
            vec![
                ("text", "a".to_owned()),
                ("escape", r"\n".to_owned()),
                ("escape", r"\q".to_owned()),
                ("text", " bc".to_owned()),
                ("escape", r#"\""#.to_owned()),
                ("invalid-escape", r"\".to_owned()),
            ]
        );
    }

    #[test]
    fn common_escapes_are_flyweights() {
        use weft_lexer_core::LexerInput;

        let language = Language::new(super::StringEscapesLanguage).unwrap();
        let chars: Vec<char> = r"\t\x".chars().collect();
        let mut input = LexerInput::new(&chars, 0, chars.len(), None);
        let mut lexer = language.create_lexer(None);
        let tab = lexer.next_token(&mut input).unwrap();
        assert_eq!(tab.fly_text(), Some("\\t"));
        input.finish_token(&tab);
        let other = lexer.next_token(&mut input).unwrap();
        assert_eq!(other.fly_text(), None);
        assert_eq!(other.length(), 2);
    }
}
