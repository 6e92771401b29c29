//! Token hierarchies: a root list and everything embedded in it.

use std::sync::Arc;

use weft_ir::{Language, LanguageManager, LanguagePath};

use crate::root::{RelexResult, RootTokenList};
use crate::store::{ListContext, ListSource, TokenStore};
use crate::{
    EmbeddedTokenList, LexerConfig, TokenList, TokenListError, TokenListList, TokenSequenceList,
    IMMUTABLE_MOD_COUNT,
};

/// The token lists of one input.
///
/// Lists are addressed by the chain of token indices leading to them from
/// the root: `[]` is the root list, `[3]` the list embedded in root token 3,
/// `[3, 0]` the list embedded in its first token.
pub struct TokenHierarchy {
    root: RootTokenList,
    ctx: Arc<ListContext>,
}

impl TokenHierarchy {
    /// Hierarchy over input that never changes.
    pub fn batch(
        text: &str,
        language: Arc<Language>,
        manager: Arc<LanguageManager>,
        config: LexerConfig,
    ) -> Self {
        Self::create(text, language, manager, config, false)
    }

    /// Hierarchy over input edited through [`modify`](Self::modify).
    pub fn mutable(
        text: &str,
        language: Arc<Language>,
        manager: Arc<LanguageManager>,
        config: LexerConfig,
    ) -> Self {
        Self::create(text, language, manager, config, true)
    }

    /// Hierarchy of the language registered for `mime_type`.
    pub fn for_mime_type(
        text: &str,
        mime_type: &str,
        manager: Arc<LanguageManager>,
        config: LexerConfig,
        mutable: bool,
    ) -> Result<Self, TokenListError> {
        let language =
            manager
                .find_language(mime_type)
                .ok_or_else(|| TokenListError::LanguageNotFound {
                    mime: mime_type.to_owned(),
                })?;
        Ok(Self::create(text, language, manager, config, mutable))
    }

    fn create(
        text: &str,
        language: Arc<Language>,
        manager: Arc<LanguageManager>,
        config: LexerConfig,
        mutable: bool,
    ) -> Self {
        let chars: Arc<[char]> = text.chars().collect();
        let ctx = Arc::new(ListContext { manager, config });
        tracing::debug!(
            language = language.mime_type(),
            len = chars.len(),
            mutable,
            "token hierarchy created"
        );
        let store = TokenStore::new(
            Arc::clone(&ctx),
            LanguagePath::root(language),
            ListSource::Text(Arc::clone(&chars)),
            0,
            0,
            chars.len(),
            None,
            mutable || config.maintain_la_state,
            if mutable { 0 } else { IMMUTABLE_MOD_COUNT },
        );
        TokenHierarchy {
            root: RootTokenList::new(store, chars, mutable),
            ctx,
        }
    }

    #[inline]
    pub fn root(&mut self) -> &mut RootTokenList {
        &mut self.root
    }

    pub fn language_path(&self) -> &LanguagePath {
        self.root.language_path()
    }

    pub fn mod_count(&self) -> u64 {
        self.root.mod_count()
    }

    pub fn is_mutable(&self) -> bool {
        self.root.is_mutable()
    }

    pub fn config(&self) -> &LexerConfig {
        &self.ctx.config
    }

    pub fn manager(&self) -> &Arc<LanguageManager> {
        &self.ctx.manager
    }

    /// Current input text.
    pub fn text(&self) -> String {
        self.root.text().iter().collect()
    }

    /// Replace `removed` characters at `offset` by `inserted`, relexing
    /// only the damaged tokens.
    ///
    /// Embedded lists of relexed tokens come back marked removed; they are
    /// rebuilt on the next request.
    #[tracing::instrument(level = "debug", skip(self, inserted), fields(inserted = inserted.len()))]
    pub fn modify(
        &mut self,
        offset: u32,
        removed: u32,
        inserted: &str,
    ) -> Result<RelexResult, TokenListError> {
        if !self.root.is_mutable() {
            return Err(TokenListError::ImmutableInput);
        }
        let len = self.root.text().len();
        if (offset as usize).saturating_add(removed as usize) > len {
            return Err(TokenListError::EditOutOfBounds {
                offset,
                removed,
                len: u32::try_from(len).unwrap_or(u32::MAX),
            });
        }
        let result = self.root.apply_edit(offset, removed, inserted);
        self.root.store.mod_count += 1;
        tracing::debug!(mod_count = self.root.store.mod_count, ?result, "edit applied");
        Ok(result)
    }

    /// The list at `address`, creating embeddings on the way.
    pub fn token_list(&mut self, address: &[usize]) -> Option<&mut dyn TokenList> {
        let Some((first, rest)) = address.split_first() else {
            return Some(&mut self.root);
        };
        let list: &mut dyn TokenList = self.embedded_list(*first, rest)?;
        Some(list)
    }

    fn embedded_list(&mut self, first: usize, rest: &[usize]) -> Option<&mut EmbeddedTokenList> {
        let mut list = self.root.store.embedded(first)?;
        for index in rest {
            list = list.store.embedded(*index)?;
        }
        Some(list)
    }

    /// Every list of `path`, in text order.
    ///
    /// Lexes the whole input on every level of `path`.
    pub fn token_list_list(&mut self, path: &LanguagePath) -> TokenListList {
        TokenListList::build(self, path)
    }

    /// Tokens of the lists of `path` overlapping `[start, end)`.
    ///
    /// Lists are located lazily: tokens starting at or past `end` are not
    /// lexed, so a window near the start of a large input stays cheap.
    pub fn token_sequence_list(
        &mut self,
        path: &LanguagePath,
        start: u32,
        end: u32,
    ) -> TokenSequenceList {
        TokenSequenceList::new(TokenListList::build_until(self, path, end), start, end)
    }

    pub(crate) fn root_store(&mut self) -> &mut TokenStore {
        &mut self.root.store
    }
}
