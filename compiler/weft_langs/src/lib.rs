//! Sample languages for weft.
//!
//! Three small languages that between them exercise every seam of the
//! engine:
//!
//! - [`markup`]: text, tags and `<? ... ?>` script sections. Sections embed
//!   the script language and are joined, so a block comment may run from one
//!   section into the next.
//! - [`script`]: a C-like language read through [`UnicodeEscapes`]. Keywords
//!   and punctuation are flyweights; unterminated block comments carry over
//!   in the lexer state; string literals embed the string-escape language.
//! - [`string_escapes`]: the inside of a string literal.
//!
//! [`UnicodeEscapes`]: weft_lexer_core::UnicodeEscapes

use std::sync::Arc;

use weft_ir::{Language, LanguageError, LanguageManager};

pub mod markup;
pub mod script;
pub mod string_escapes;

/// One instance of each sample language.
#[derive(Clone, Debug)]
pub struct SampleLanguages {
    pub markup: Arc<Language>,
    pub script: Arc<Language>,
    pub string_escapes: Arc<Language>,
}

impl SampleLanguages {
    pub fn new() -> Result<Self, LanguageError> {
        Ok(SampleLanguages {
            markup: Language::new(markup::MarkupLanguage)?,
            script: Language::new(script::ScriptLanguage)?,
            string_escapes: Language::new(string_escapes::StringEscapesLanguage)?,
        })
    }

    /// Register all three with `manager`, replacing earlier registrations
    /// of the same MIME types.
    pub fn register(&self, manager: &LanguageManager) {
        for language in self.all() {
            manager.register(Arc::clone(language));
        }
    }

    pub fn all(&self) -> [&Arc<Language>; 3] {
        [&self.markup, &self.script, &self.string_escapes]
    }
}

/// A fresh manager with the sample languages registered.
pub fn sample_manager() -> Result<(Arc<LanguageManager>, SampleLanguages), LanguageError> {
    let languages = SampleLanguages::new()?;
    let manager = Arc::new(LanguageManager::new());
    languages.register(&manager);
    Ok((manager, languages))
}

#[cfg(test)]
pub(crate) mod test_support {
    use weft_ir::Language;
    use weft_lexer_core::{LexerInput, LexerState, TokenId};

    /// One finished token: id name, raw text, state after it.
    pub(crate) type Lexed = (&'static str, String, Option<LexerState>);

    /// Lex `text` completely, starting from `state`.
    pub(crate) fn lex_from(language: &Language, text: &str, state: Option<LexerState>) -> Vec<Lexed> {
        let chars: Vec<char> = text.chars().collect();
        let mut input = LexerInput::new(&chars, 0, chars.len(), language.preprocessor());
        let mut lexer = language.create_lexer(state);
        let mut tokens = Vec::new();
        while let Some(token) = lexer.next_token(&mut input) {
            let finished = input.finish_token(&token);
            let start = finished.offset as usize;
            let raw: String = chars[start..start + finished.length as usize].iter().collect();
            tokens.push((name(language, finished.id), raw, lexer.state()));
        }
        assert!(input.is_exhausted(), "lexer stopped early on {text:?}");
        tokens
    }

    pub(crate) fn lex(language: &Language, text: &str) -> Vec<(&'static str, String)> {
        lex_from(language, text, None)
            .into_iter()
            .map(|(name, raw, _)| (name, raw))
            .collect()
    }

    pub(crate) fn name(language: &Language, id: TokenId) -> &'static str {
        language.token_ids().name(id)
    }
}
