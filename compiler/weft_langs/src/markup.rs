//! `text/x-markup`: text with tags and embedded script sections.

use weft_ir::{EmbeddingQuery, EmbeddingSpec, LanguageHierarchy, TokenIdDef};
use weft_lexer_core::{LexedToken, Lexer, LexerInput, LexerState, TokenId};

pub const MIME_TYPE: &str = "text/x-markup";

pub const TEXT: TokenId = TokenId(0);
pub const NEWLINE: TokenId = TokenId(1);
pub const TAG: TokenId = TokenId(2);
pub const SCRIPT: TokenId = TokenId(3);

const SCRIPT_CLOSE: &str = "?>";

pub struct MarkupLanguage;

impl LanguageHierarchy for MarkupLanguage {
    fn mime_type(&self) -> &str {
        MIME_TYPE
    }

    fn token_ids(&self) -> Vec<TokenIdDef> {
        vec![
            TokenIdDef::new("text", TEXT.0),
            TokenIdDef::new("newline", NEWLINE.0).with_category("whitespace"),
            TokenIdDef::new("tag", TAG.0),
            TokenIdDef::new("script", SCRIPT.0).with_category("embedded"),
        ]
    }

    fn create_lexer(&self, _state: Option<LexerState>) -> Box<dyn Lexer> {
        Box::new(MarkupLexer)
    }

    /// Script sections embed the script language without their delimiters.
    /// An unterminated section keeps everything after `<?`.
    fn embedding(&self, query: &EmbeddingQuery<'_>) -> Option<EmbeddingSpec> {
        if query.id != SCRIPT {
            return None;
        }
        let closed = query.text.chars().count() >= 4 && query.text.ends_with(SCRIPT_CLOSE);
        Some(
            EmbeddingSpec::new(crate::script::MIME_TYPE)
                .with_skips(2, if closed { 2 } else { 0 })
                .joined(),
        )
    }

    fn embedding_depends_on_text(&self, id: TokenId) -> bool {
        id == SCRIPT
    }
}

/// Stateless: every token boundary is a clean restart point.
struct MarkupLexer;

impl Lexer for MarkupLexer {
    fn next_token(&mut self, input: &mut LexerInput<'_>) -> Option<LexedToken> {
        let token = match input.read()? {
            '\n' => input.fly_token(NEWLINE, "\n"),
            '<' => match input.read() {
                Some('?') => {
                    let mut previous = '?';
                    // The `?` of `<?` does not close the section.
                    let mut first = true;
                    while let Some(ch) = input.read() {
                        if ch == '>' && previous == '?' && !first {
                            break;
                        }
                        previous = ch;
                        first = false;
                    }
                    input.token(SCRIPT)
                }
                Some('>') => input.token(TAG),
                Some(_) => {
                    while !matches!(input.read(), Some('>') | None) {}
                    input.token(TAG)
                }
                None => {
                    input.backup(1);
                    input.token(TEXT)
                }
            },
            _ => {
                while !matches!(input.read(), Some('<' | '\n') | None) {}
                input.backup(1);
                input.token(TEXT)
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
mod tests;
