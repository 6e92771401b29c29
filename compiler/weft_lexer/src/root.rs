//! The root token list and incremental relexing.

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use weft_ir::{RegularToken, Token};
use weft_lexer_core::{LaState, LexerInput, LexerState};

use crate::store::{to_u32, trailing_flyweights, Entry, ListSource, Shift, TokenStore};
use crate::token_list::forward_token_list;
use crate::EmbeddedTokenList;

/// Tokens of the root language over the whole input.
///
/// Over immutable input this is a batch list: lookaheads only (states when
/// configured) and a constant modification count. Over mutable input every
/// token's lexer state is kept so lexing can restart after any token.
pub struct RootTokenList {
    pub(crate) store: TokenStore,
    text: Arc<[char]>,
    mutable: bool,
}

/// Outcome of one edit of the root list.
#[derive(Default)]
pub struct RelexResult {
    /// Indices of the newly lexed tokens in the updated list.
    pub relexed: Range<usize>,
    /// Number of old tokens they replaced.
    pub removed_tokens: usize,
    /// Embedded lists of replaced tokens and joined sections behind the
    /// edit, all marked removed.
    pub removed_lists: Vec<Box<EmbeddedTokenList>>,
}

impl fmt::Debug for RelexResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelexResult")
            .field("relexed", &self.relexed)
            .field("removed_tokens", &self.removed_tokens)
            .field("removed_lists", &self.removed_lists.len())
            .finish()
    }
}

/// Tokens lexed by one relex pass, not yet spliced in.
struct Relexed {
    entries: Vec<Entry>,
    la: LaState,
    /// Old index whose token survives, when lexing resynchronized.
    matched: Option<usize>,
    next_src: usize,
    complete: bool,
    final_state: Option<LexerState>,
}

impl RootTokenList {
    pub(crate) fn new(store: TokenStore, text: Arc<[char]>, mutable: bool) -> Self {
        RootTokenList {
            store,
            text,
            mutable,
        }
    }

    #[inline]
    pub fn is_mutable(&self) -> bool {
        self.mutable
    }

    /// Current root text.
    #[inline]
    pub fn text(&self) -> &Arc<[char]> {
        &self.text
    }

    /// First token to relex for an edit at `offset`: the first token whose
    /// lexer read at or past `offset`, moved back while the characters the
    /// preprocessor may look through before it hold a sensitive character.
    fn restart_index(&self, offset: u32) -> usize {
        let store = &self.store;
        let len = store.entries.len();
        let mut index = (0..len)
            .find(|i| store.end_of(*i) + store.la.lookahead(*i) > offset)
            .unwrap_or(len);
        if let Some(preprocessor) = store.language().preprocessor() {
            let reach = preprocessor.max_lookahead() + 1;
            while index > 0 {
                let start = if index < len {
                    store.offset_of(index) as usize
                } else {
                    store.src_pos
                };
                let before = &self.text[start.saturating_sub(reach)..start];
                if !before.iter().any(|c| preprocessor.is_sensitive_char(*c)) {
                    break;
                }
                index -= 1;
            }
        }
        index
    }

    /// Replace `removed` characters at `offset` by `inserted` and relex the
    /// damaged tokens.
    pub(crate) fn apply_edit(&mut self, offset: u32, removed: u32, inserted: &str) -> RelexResult {
        let at = offset as usize;
        let inserted: Vec<char> = inserted.chars().collect();
        let mut chars = Vec::with_capacity(self.text.len() - removed as usize + inserted.len());
        chars.extend_from_slice(&self.text[..at]);
        chars.extend_from_slice(&inserted);
        chars.extend_from_slice(&self.text[at + removed as usize..]);
        let shift = Shift {
            text: chars.into(),
            removed,
            inserted: to_u32(inserted.len()),
        };

        let restart = self.restart_index(offset);
        self.text = Arc::clone(&shift.text);
        let store = &mut self.store;
        store.source = ListSource::Text(Arc::clone(&shift.text));
        store.src_end = shift.apply_index(store.src_end);

        if restart == store.entries.len() && !store.complete {
            // The lexer never read the edited text.
            tracing::trace!(restart, "edit behind the lexed frontier");
            return RelexResult {
                relexed: restart..restart,
                ..RelexResult::default()
            };
        }

        let relexed = relex(store, restart, offset + removed, &shift);
        let resume_at = relexed.matched.unwrap_or(store.entries.len());

        let mut removed_lists = Vec::new();
        for (i, entry) in store.entries.iter_mut().enumerate().skip(restart) {
            let dropped = i < resume_at || entry.embedding.as_ref().is_some_and(|list| list.is_joined());
            if dropped {
                if let Some(mut list) = entry.embedding.take() {
                    list.store.mark_removed();
                    removed_lists.push(list);
                }
            }
        }

        let fresh = relexed.entries.len();
        store.shift_entries(resume_at, &shift);
        let removed_tokens = store.entries.splice(restart..resume_at, relexed.entries).count();
        store.la.remove(restart, removed_tokens);
        store.la.insert_all(restart, &relexed.la, 0, fresh);

        if relexed.matched.is_some() {
            store.src_pos = shift.apply_index(store.src_pos);
            store.bound_fly_run(restart + fresh);
        } else {
            store.src_pos = relexed.next_src;
            store.complete = relexed.complete;
            store.final_state = relexed.final_state;
            if store.complete {
                store.lexer = None;
            }
        }
        store.fly_run = trailing_flyweights(&store.entries);
        tracing::debug!(
            restart,
            relexed = fresh,
            removed = removed_tokens,
            resynchronized = relexed.matched.is_some(),
            "tokens relexed"
        );
        RelexResult {
            relexed: restart..restart + fresh,
            removed_tokens,
            removed_lists,
        }
    }
}

/// Lex from token `restart` over the edited text until a new token ends on
/// a surviving old token boundary with the same lexer state, the old lexed
/// frontier is passed, or the input ends.
///
/// The lexer left in `store` is replaced when lexing stops without
/// resynchronizing.
fn relex(store: &mut TokenStore, restart: usize, edit_end: u32, shift: &Shift) -> Relexed {
    let old_len = store.entries.len();
    let old_complete = store.complete;
    let old_frontier = to_u32(store.src_pos);
    let restart_offset = if restart < old_len {
        store.offset_of(restart)
    } else {
        old_frontier
    };
    let restart_state = match restart {
        0 => store.start_state.clone(),
        i => store.la.state(i - 1),
    };
    tracing::trace!(restart, restart_offset, ?restart_state, "relex");

    let language = Arc::clone(store.language());
    let source = store.source.clone();
    let mut input = LexerInput::new(
        source.chars(),
        restart_offset as usize,
        store.src_end,
        language.preprocessor(),
    );
    let mut lexer = language.create_lexer(restart_state);
    let mut relexed = Relexed {
        entries: Vec::new(),
        la: LaState::empty(),
        matched: None,
        next_src: 0,
        complete: false,
        final_state: None,
    };
    let mut fly_run = trailing_flyweights(&store.entries[..restart]);
    let mut old_index = restart;

    loop {
        let Some(token) = lexer.next_token(&mut input) else {
            relexed.complete = true;
            relexed.final_state = lexer.state();
            break;
        };
        let finished = input.finish_token(&token);
        let end = finished.offset + finished.length;
        let state = lexer.state();
        let token = match finished.fly_text {
            Some(text) if store.ctx.config.allows_flyweight(fly_run) => {
                fly_run += 1;
                Token::Fly(language.fly_token(finished.id, text))
            }
            _ => {
                fly_run = 0;
                Token::Regular(RegularToken {
                    wrap_id: language.wrap_id(finished.id),
                    offset: finished.offset,
                    length: finished.length,
                    text: finished.text,
                })
            }
        };
        relexed.la.add(finished.lookahead, state.clone());
        relexed.entries.push(Entry {
            token,
            embedding: None,
            errors: finished.errors.into_boxed_slice(),
        });

        // First old token behind the edit not starting before `end`.
        while old_index < old_len {
            let old_start = store.offset_of(old_index);
            if old_start >= edit_end && shift.apply(old_start) >= end {
                break;
            }
            old_index += 1;
        }
        if old_index < old_len {
            let on_boundary = shift.apply(store.offset_of(old_index)) == end;
            let old_state = match old_index {
                0 => store.start_state.clone(),
                i => store.la.state(i - 1),
            };
            if on_boundary && old_state == state {
                relexed.matched = Some(old_index);
                break;
            }
        } else if !old_complete && end >= shift.apply(old_frontier.max(edit_end)) {
            // The rest is lexed lazily.
            break;
        }
    }
    relexed.next_src = input.next_token_source_index();
    if relexed.matched.is_none() && !relexed.complete {
        store.lexer = Some(lexer);
    }
    relexed
}

forward_token_list!(RootTokenList);
