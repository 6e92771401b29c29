//! Lazily materialized tokens of one list.
//!
//! Every list kind keeps its tokens in a [`TokenStore`]: the tokens lexed so
//! far, their lookaheads and states, and the lexer frontier. Lexing resumes
//! by creating a fresh [`LexerInput`] at the frontier; the lexer itself is
//! kept between calls or recreated from the stored state of the last token.

use std::sync::Arc;

use weft_ir::{
    Language, LanguageEmbedding, LanguageManager, LanguagePath, RegularToken, Token,
};
use weft_lexer_core::{
    CharSequence, FinishedToken, LaState, Lexer, LexerInput, LexerState, PreprocessError,
    PreprocessedTextStorage, Span,
};

use crate::{EmbeddedTokenList, LexerConfig};

/// What every list of one hierarchy shares.
pub(crate) struct ListContext {
    pub(crate) manager: Arc<LanguageManager>,
    pub(crate) config: LexerConfig,
}

/// Text a list lexes: the root text or the logical text of a preprocessed
/// parent token.
#[derive(Clone)]
pub(crate) enum ListSource {
    Text(Arc<[char]>),
    Preprocessed(Arc<PreprocessedTextStorage>),
}

impl ListSource {
    pub(crate) fn chars(&self) -> &dyn CharSequence {
        match self {
            ListSource::Text(text) => text,
            ListSource::Preprocessed(storage) => &**storage,
        }
    }
}

/// Smallest source index whose raw length reaches `raw`.
pub(crate) fn source_index(chars: &dyn CharSequence, raw: usize) -> usize {
    let (mut lo, mut hi) = (0, chars.len());
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if chars.raw_length(mid) < raw {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    lo
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "offsets are bounded by the u32 token offset space"
)]
#[inline]
pub(crate) fn to_u32(value: usize) -> u32 {
    value as u32
}

/// A root text edit, for moving everything behind it.
pub(crate) struct Shift {
    pub(crate) text: Arc<[char]>,
    pub(crate) removed: u32,
    pub(crate) inserted: u32,
}

impl Shift {
    /// New position of an old offset at or after the removed range.
    #[inline]
    pub(crate) fn apply(&self, offset: u32) -> u32 {
        offset - self.removed + self.inserted
    }

    #[inline]
    pub(crate) fn apply_index(&self, index: usize) -> usize {
        index - self.removed as usize + self.inserted as usize
    }
}

pub(crate) struct Entry {
    pub(crate) token: Token,
    pub(crate) embedding: Option<Box<EmbeddedTokenList>>,
    /// Preprocessing errors, spans relative to the list base.
    pub(crate) errors: Box<[PreprocessError]>,
}

/// Source range covered by one token, as the input of an embedded list.
struct Window {
    source: ListSource,
    base: u32,
    start: usize,
    end: usize,
}

pub(crate) struct TokenStore {
    pub(crate) ctx: Arc<ListContext>,
    pub(crate) path: LanguagePath,
    pub(crate) source: ListSource,
    /// Absolute raw offset of the source's first raw character. Regular
    /// token offsets are relative to it.
    pub(crate) base: u32,
    pub(crate) src_start: usize,
    pub(crate) src_end: usize,
    pub(crate) entries: Vec<Entry>,
    pub(crate) la: LaState,
    pub(crate) store_states: bool,
    /// Source index where the next token starts.
    pub(crate) src_pos: usize,
    pub(crate) lexer: Option<Box<dyn Lexer>>,
    pub(crate) start_state: Option<LexerState>,
    pub(crate) complete: bool,
    pub(crate) final_state: Option<LexerState>,
    /// Consecutive flyweights at the end of `entries`.
    pub(crate) fly_run: usize,
    pub(crate) mod_count: u64,
    pub(crate) removed: bool,
}

impl TokenStore {
    #[allow(clippy::too_many_arguments, reason = "private constructor")]
    pub(crate) fn new(
        ctx: Arc<ListContext>,
        path: LanguagePath,
        source: ListSource,
        base: u32,
        src_start: usize,
        src_end: usize,
        start_state: Option<LexerState>,
        store_states: bool,
        mod_count: u64,
    ) -> Self {
        TokenStore {
            ctx,
            path,
            source,
            base,
            src_start,
            src_end,
            entries: Vec::new(),
            la: LaState::empty(),
            store_states,
            src_pos: src_start,
            lexer: None,
            start_state,
            complete: false,
            final_state: None,
            fly_run: 0,
            mod_count,
            removed: false,
        }
    }

    #[inline]
    pub(crate) fn language(&self) -> &Arc<Language> {
        self.path.inner_language()
    }

    pub(crate) fn check_live(&self) {
        assert!(!self.removed, "token list {} was removed", self.path);
    }

    // === Materialization ===

    /// State to restart lexing at the frontier.
    fn resume_state(&self) -> Option<LexerState> {
        match self.entries.len() {
            0 => self.start_state.clone(),
            len => self.la.state(len - 1),
        }
    }

    /// Lex while `more` holds and input remains.
    pub(crate) fn materialize_while(&mut self, mut more: impl FnMut(&Self) -> bool) {
        if self.complete || !more(self) {
            return;
        }
        let source = self.source.clone();
        let language = Arc::clone(self.language());
        let mut input = LexerInput::new(
            source.chars(),
            self.src_pos,
            self.src_end,
            language.preprocessor(),
        );
        let mut lexer = match self.lexer.take() {
            Some(lexer) => lexer,
            None => language.create_lexer(self.resume_state()),
        };
        loop {
            if let Some(token) = lexer.next_token(&mut input) {
                let finished = input.finish_token(&token);
                self.push(&language, finished, lexer.state());
                if !more(self) {
                    break;
                }
            } else {
                if !input.is_exhausted() {
                    tracing::warn!(
                        language = language.mime_type(),
                        offset = self.base + input.next_token_offset(),
                        "lexer stopped before the end of its input"
                    );
                }
                self.complete = true;
                self.final_state = lexer.state();
                tracing::trace!(path = %self.path, tokens = self.entries.len(), "token list complete");
                break;
            }
        }
        self.src_pos = input.next_token_source_index();
        if !self.complete {
            self.lexer = Some(lexer);
        }
    }

    fn push(&mut self, language: &Language, finished: FinishedToken, state: Option<LexerState>) {
        tracing::trace!(
            index = self.entries.len(),
            id = ?finished.id,
            offset = self.base + finished.offset,
            length = finished.length,
            lookahead = finished.lookahead,
            "token"
        );
        let token = match finished.fly_text {
            Some(text) if self.ctx.config.allows_flyweight(self.fly_run) => {
                self.fly_run += 1;
                Token::Fly(language.fly_token(finished.id, text))
            }
            _ => {
                self.fly_run = 0;
                Token::Regular(RegularToken {
                    wrap_id: language.wrap_id(finished.id),
                    offset: finished.offset,
                    length: finished.length,
                    text: finished.text,
                })
            }
        };
        let state = if self.store_states { state } else { None };
        self.la.add(finished.lookahead, state);
        self.entries.push(Entry {
            token,
            embedding: None,
            errors: finished.errors.into_boxed_slice(),
        });
    }

    /// Whether token `index` exists, lexing up to it if needed.
    pub(crate) fn ensure(&mut self, index: usize) -> bool {
        self.materialize_while(|store| store.entries.len() <= index);
        index < self.entries.len()
    }

    pub(crate) fn materialize_all(&mut self) {
        self.materialize_while(|_| true);
    }

    // === Reads ===

    pub(crate) fn token(&mut self, index: usize) -> Option<&Token> {
        self.check_live();
        if self.ensure(index) {
            Some(&self.entries[index].token)
        } else {
            None
        }
    }

    pub(crate) fn token_count(&mut self) -> usize {
        self.check_live();
        self.materialize_all();
        self.entries.len()
    }

    /// Absolute raw offset where the window starts.
    pub(crate) fn start_offset(&self) -> u32 {
        self.base + to_u32(self.source.chars().raw_length(self.src_start))
    }

    /// Absolute raw offset where the window ends.
    pub(crate) fn window_end_offset(&self) -> u32 {
        self.base + to_u32(self.source.chars().raw_length(self.src_end))
    }

    pub(crate) fn token_offset(&mut self, index: usize) -> u32 {
        self.check_live();
        assert!(
            self.ensure(index),
            "token index {index} out of range ({} tokens)",
            self.entries.len()
        );
        self.offset_of(index)
    }

    /// Absolute offset of a materialized token.
    ///
    /// Flyweights carry no offset; the walk back to the nearest regular
    /// token is bounded by the maximum flyweight run.
    pub(crate) fn offset_of(&self, index: usize) -> u32 {
        let mut i = index;
        let mut distance = 0;
        loop {
            match &self.entries[i].token {
                Token::Regular(token) => return self.base + token.offset + distance,
                Token::Fly(_) if i == 0 => return self.start_offset() + distance,
                Token::Fly(_) => {
                    i -= 1;
                    distance += self.entries[i].token.length();
                }
            }
        }
    }

    pub(crate) fn end_of(&self, index: usize) -> u32 {
        self.offset_of(index) + self.entries[index].token.length()
    }

    pub(crate) fn end_offset(&mut self) -> u32 {
        self.check_live();
        self.materialize_all();
        match self.entries.len() {
            0 => self.start_offset(),
            len => self.end_of(len - 1),
        }
    }

    /// Index of the first token ending after `offset`, or the token count.
    ///
    /// Binary search over the materialized prefix, lexing forward only
    /// until the frontier passes `offset`.
    pub(crate) fn index_at(&mut self, offset: u32) -> usize {
        self.check_live();
        self.materialize_while(|store| match store.entries.len() {
            0 => true,
            len => store.end_of(len - 1) <= offset,
        });
        let (mut lo, mut hi) = (0, self.entries.len());
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.end_of(mid) <= offset {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        lo
    }

    pub(crate) fn lookahead(&self, index: usize) -> u32 {
        self.check_live();
        self.la.lookahead(index)
    }

    pub(crate) fn state(&self, index: usize) -> Option<LexerState> {
        self.check_live();
        self.la.state(index)
    }

    pub(crate) fn preprocess_errors(&self) -> Vec<PreprocessError> {
        self.entries
            .iter()
            .flat_map(|entry| entry.errors.iter())
            .map(|error| PreprocessError {
                span: Span::new(self.base + error.span.start, self.base + error.span.end),
                kind: error.kind.clone(),
            })
            .collect()
    }

    /// Store the flyweight at `index` as a regular token at its offset.
    pub(crate) fn replace_fly_token(&mut self, index: usize) -> bool {
        self.check_live();
        if !self.ensure(index) {
            return false;
        }
        let Token::Fly(fly) = &self.entries[index].token else {
            return false;
        };
        let regular = Token::Regular(RegularToken {
            wrap_id: fly.wrap_id().clone(),
            offset: self.offset_of(index) - self.base,
            length: fly.length(),
            text: None,
        });
        self.entries[index].token = regular;
        true
    }

    pub(crate) fn token_text(&mut self, index: usize) -> Option<String> {
        self.check_live();
        self.ensure(index).then(|| self.text_of(index))
    }

    /// Logical text of a materialized token.
    fn text_of(&self, index: usize) -> String {
        match &self.entries[index].token {
            Token::Fly(fly) => fly.text().to_owned(),
            Token::Regular(RegularToken {
                text: Some(storage),
                ..
            }) => storage.to_string(),
            Token::Regular(_) => {
                let window = self.window_of(index);
                window.source.chars().text(window.start, window.end)
            }
        }
    }

    fn window_of(&self, index: usize) -> Window {
        match &self.entries[index].token {
            Token::Regular(RegularToken {
                text: Some(storage),
                offset,
                ..
            }) => Window {
                source: ListSource::Preprocessed(Arc::clone(storage)),
                base: self.base + offset,
                start: 0,
                end: storage.len(),
            },
            token => {
                let offset = (self.offset_of(index) - self.base) as usize;
                let chars = self.source.chars();
                Window {
                    source: self.source.clone(),
                    base: self.base,
                    start: source_index(chars, offset),
                    end: source_index(chars, offset + token.length() as usize),
                }
            }
        }
    }

    // === Embeddings ===

    pub(crate) fn embedded(&mut self, index: usize) -> Option<&mut EmbeddedTokenList> {
        self.check_live();
        if !self.ensure(index) {
            return None;
        }
        if self.entries[index].embedding.is_none() {
            let list = self.create_embedding(index)?;
            self.entries[index].embedding = Some(Box::new(list));
        }
        self.entries[index].embedding.as_deref_mut()
    }

    /// Embedding of token `index`, unless it already failed for the target.
    fn find_embedding(&self, index: usize) -> Option<LanguageEmbedding> {
        let language = self.language();
        let token = &self.entries[index].token;
        let id = token.id();
        let text = if language.hierarchy().embedding_depends_on_text(id) {
            self.text_of(index)
        } else {
            String::new()
        };
        let embedding = self.ctx.manager.find_embedding(language, id, &text)?;
        (!token.wrap_id().has_failed(embedding.language.id())).then_some(embedding)
    }

    fn create_embedding(&mut self, index: usize) -> Option<EmbeddedTokenList> {
        let embedding = self.find_embedding(index)?;
        self.replace_fly_token(index);
        let window = self.window_of(index);
        let skips = embedding.start_skip as usize + embedding.end_skip as usize;
        if skips > window.end - window.start {
            let language = Arc::clone(self.language());
            if let Token::Regular(token) = &mut self.entries[index].token {
                token.wrap_id = language.wrap_id_with_failed(&token.wrap_id, embedding.language.id());
            }
            tracing::debug!(
                index,
                embedded = embedding.language.mime_type(),
                "embedding does not fit the token"
            );
            return None;
        }
        let start_state = if embedding.join_sections {
            self.joined_start_state(index, &embedding.language)
        } else {
            None
        };
        let path = self.path.embedded(&embedding.language);
        tracing::debug!(%path, index, offset = self.offset_of(index), "embedding created");
        let store = TokenStore::new(
            Arc::clone(&self.ctx),
            path,
            window.source,
            window.base,
            window.start + embedding.start_skip as usize,
            window.end - embedding.end_skip as usize,
            start_state,
            self.ctx.config.maintain_la_state,
            self.mod_count,
        );
        Some(EmbeddedTokenList::new(store, embedding))
    }

    /// Final lexer state of the previous joined section of `target`.
    ///
    /// Sections between the last created one and `index` are created first,
    /// oldest first, so each starts from its predecessor.
    fn joined_start_state(&mut self, index: usize, target: &Arc<Language>) -> Option<LexerState> {
        let mut pending = Vec::new();
        for j in (0..index).rev() {
            match &self.entries[j].embedding {
                Some(list) if list.joins(target) => break,
                Some(_) => {}
                None => {
                    let joins = self.find_embedding(j).is_some_and(|embedding| {
                        embedding.join_sections && embedding.language == *target
                    });
                    if joins {
                        pending.push(j);
                    }
                }
            }
        }
        for j in pending.into_iter().rev() {
            self.embedded(j);
        }
        let previous = (0..index).rev().find(|j| {
            self.entries[*j]
                .embedding
                .as_ref()
                .is_some_and(|list| list.joins(target))
        })?;
        self.entries[previous]
            .embedding
            .as_deref_mut()
            .and_then(EmbeddedTokenList::final_state)
    }

    /// Store flyweights from `from` on as regular tokens where the run
    /// reaching into them exceeds the configured maximum.
    pub(crate) fn bound_fly_run(&mut self, from: usize) {
        let mut run = trailing_flyweights(&self.entries[..from]);
        for index in from..self.entries.len() {
            if !self.entries[index].token.is_flyweight() {
                return;
            }
            if !self.ctx.config.allows_flyweight(run) {
                self.replace_fly_token(index);
                return;
            }
            run += 1;
        }
    }

    // === Invalidation ===

    /// Mark this list and everything embedded in it removed.
    pub(crate) fn mark_removed(&mut self) {
        self.removed = true;
        self.lexer = None;
        for entry in &mut self.entries {
            if let Some(list) = &mut entry.embedding {
                list.store.mark_removed();
            }
        }
    }

    /// Move a list lying wholly behind a root edit.
    pub(crate) fn shift(&mut self, shift: &Shift) {
        match self.source {
            ListSource::Text(_) => {
                self.source = ListSource::Text(Arc::clone(&shift.text));
                self.src_start = shift.apply_index(self.src_start);
                self.src_end = shift.apply_index(self.src_end);
                self.src_pos = shift.apply_index(self.src_pos);
                self.shift_entries(0, shift);
            }
            // Offsets are relative to a parent token that moved as a whole.
            ListSource::Preprocessed(_) => {
                self.base = shift.apply(self.base);
                for entry in &mut self.entries {
                    if let Some(list) = &mut entry.embedding {
                        list.store.shift(shift);
                    }
                }
            }
        }
    }

    /// Move the entries from `from` on, which lie behind a root edit in a
    /// list whose offsets are absolute.
    pub(crate) fn shift_entries(&mut self, from: usize, shift: &Shift) {
        for entry in &mut self.entries[from..] {
            if let Token::Regular(token) = &mut entry.token {
                token.offset = shift.apply(token.offset);
            }
            for error in entry.errors.iter_mut() {
                error.span = Span::new(shift.apply(error.span.start), shift.apply(error.span.end));
            }
            if let Some(list) = &mut entry.embedding {
                list.store.shift(shift);
            }
        }
    }
}

pub(crate) fn trailing_flyweights(entries: &[Entry]) -> usize {
    entries
        .iter()
        .rev()
        .take_while(|entry| entry.token.is_flyweight())
        .count()
}
