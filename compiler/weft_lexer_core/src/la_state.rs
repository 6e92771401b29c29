//! Lookahead/state store kept index-aligned with a token list.
//!
//! For every token a list remembers how many characters the lexer read past
//! the token's end (the lookahead) and the state the lexer reported after
//! the token. Both are needed to restart lexing after an edit, and the store
//! holds one entry per token, so the physical encoding matters:
//!
//! | kind | per entry | holds |
//! |------|-----------|-------|
//! | `NoState` | 1 byte | lookahead `<= 127`, never a state |
//! | `ByteState` | 2 bytes | lookahead `<= 127`, state `Int(0..=127)` or none |
//! | `LargeState` | entry struct | any lookahead, any state |
//!
//! A store starts as `NoState` and re-encodes itself into the smallest kind
//! that fits a value it cannot hold. It never narrows again: capacity and
//! width only grow, matching the append-mostly workload.

use crate::LexerState;

mod gap;

use gap::GapBuffer;

/// Largest lookahead (and small state) the byte encodings hold.
const BYTE_MAX: u32 = 127;

/// State byte standing for "no state" in the `ByteState` encoding.
const NULL_STATE: u8 = 0xFF;

/// Physical encoding of a [`LaState`], ordered from narrowest to widest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LaStateKind {
    NoState,
    ByteState,
    LargeState,
}

impl LaStateKind {
    /// Narrowest kind able to hold the pair.
    pub fn required_for(lookahead: u32, state: Option<&LexerState>) -> LaStateKind {
        if lookahead > BYTE_MAX {
            return LaStateKind::LargeState;
        }
        match state {
            None => LaStateKind::NoState,
            Some(s) if s.as_small().is_some() => LaStateKind::ByteState,
            Some(_) => LaStateKind::LargeState,
        }
    }
}

#[derive(Clone, Debug, Default)]
struct LargeEntry {
    lookahead: u32,
    state: Option<LexerState>,
}

#[derive(Clone, Debug)]
enum Repr {
    NoState(GapBuffer<u8>),
    ByteState(GapBuffer<[u8; 2]>),
    LargeState(GapBuffer<LargeEntry>),
}

/// Growable lookahead/state store (see the module docs for encodings).
#[derive(Clone, Debug)]
pub struct LaState {
    repr: Repr,
}

impl Default for LaState {
    fn default() -> Self {
        LaState::empty()
    }
}

impl LaState {
    /// Empty store in the narrowest encoding.
    pub fn empty() -> Self {
        LaState {
            repr: Repr::NoState(GapBuffer::with_capacity(0)),
        }
    }

    /// Empty store with room for `capacity` entries, starting at `kind`.
    pub fn with_capacity(kind: LaStateKind, capacity: usize) -> Self {
        let repr = match kind {
            LaStateKind::NoState => Repr::NoState(GapBuffer::with_capacity(capacity)),
            LaStateKind::ByteState => Repr::ByteState(GapBuffer::with_capacity(capacity)),
            LaStateKind::LargeState => Repr::LargeState(GapBuffer::with_capacity(capacity)),
        };
        LaState { repr }
    }

    /// Current physical encoding.
    pub fn kind(&self) -> LaStateKind {
        match self.repr {
            Repr::NoState(_) => LaStateKind::NoState,
            Repr::ByteState(_) => LaStateKind::ByteState,
            Repr::LargeState(_) => LaStateKind::LargeState,
        }
    }

    pub fn len(&self) -> usize {
        match &self.repr {
            Repr::NoState(buf) => buf.len(),
            Repr::ByteState(buf) => buf.len(),
            Repr::LargeState(buf) => buf.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Allocated entries, including the gap.
    pub fn capacity(&self) -> usize {
        match &self.repr {
            Repr::NoState(buf) => buf.capacity(),
            Repr::ByteState(buf) => buf.capacity(),
            Repr::LargeState(buf) => buf.capacity(),
        }
    }

    /// Lookahead of the entry at `index`.
    pub fn lookahead(&self, index: usize) -> u32 {
        match &self.repr {
            Repr::NoState(buf) => u32::from(*buf.get(index)),
            Repr::ByteState(buf) => u32::from(buf.get(index)[0]),
            Repr::LargeState(buf) => buf.get(index).lookahead,
        }
    }

    /// Lexer state of the entry at `index`.
    pub fn state(&self, index: usize) -> Option<LexerState> {
        match &self.repr {
            Repr::NoState(buf) => {
                let _ = buf.get(index);
                None
            }
            Repr::ByteState(buf) => decode_state(buf.get(index)[1]),
            Repr::LargeState(buf) => buf.get(index).state.clone(),
        }
    }

    /// Append an entry.
    pub fn add(&mut self, lookahead: u32, state: Option<LexerState>) {
        let len = self.len();
        self.insert(len, lookahead, state);
    }

    /// Insert an entry at `index`, re-encoding first if the pair does not
    /// fit the current encoding.
    pub fn insert(&mut self, index: usize, lookahead: u32, state: Option<LexerState>) {
        self.widen_to(LaStateKind::required_for(lookahead, state.as_ref()), 1);
        match &mut self.repr {
            Repr::NoState(buf) => buf.insert(index, encode_byte(lookahead)),
            Repr::ByteState(buf) => {
                buf.insert(index, [encode_byte(lookahead), encode_state(state.as_ref())]);
            }
            Repr::LargeState(buf) => buf.insert(index, LargeEntry { lookahead, state }),
        }
    }

    /// Append the entries `start..end` of `other`.
    pub fn add_all(&mut self, other: &LaState, start: usize, end: usize) {
        let len = self.len();
        self.insert_all(len, other, start, end);
    }

    /// Insert the entries `start..end` of `other` at `index`.
    pub fn insert_all(&mut self, index: usize, other: &LaState, start: usize, end: usize) {
        let entries: Vec<(u32, Option<LexerState>)> =
            (start..end).map(|i| (other.lookahead(i), other.state(i))).collect();
        let required = entries
            .iter()
            .map(|(la, st)| LaStateKind::required_for(*la, st.as_ref()))
            .max()
            .unwrap_or(LaStateKind::NoState);
        self.widen_to(required, entries.len());
        let entries = entries.into_iter();
        match &mut self.repr {
            Repr::NoState(buf) => {
                buf.insert_all(index, entries.map(|(la, _)| encode_byte(la)));
            }
            Repr::ByteState(buf) => buf.insert_all(
                index,
                entries.map(|(la, st)| [encode_byte(la), encode_state(st.as_ref())]),
            ),
            Repr::LargeState(buf) => buf.insert_all(
                index,
                entries.map(|(lookahead, state)| LargeEntry { lookahead, state }),
            ),
        }
    }

    /// Remove `count` entries starting at `index`.
    pub fn remove(&mut self, index: usize, count: usize) {
        match &mut self.repr {
            Repr::NoState(buf) => buf.remove(index, count),
            Repr::ByteState(buf) => buf.remove(index, count),
            Repr::LargeState(buf) => buf.remove(index, count),
        }
    }

    /// Release the gap. Query results are unaffected.
    pub fn trim_to_size(&mut self) {
        match &mut self.repr {
            Repr::NoState(buf) => buf.trim_to_size(),
            Repr::ByteState(buf) => buf.trim_to_size(),
            Repr::LargeState(buf) => buf.trim_to_size(),
        }
    }

    /// Re-encode into `kind` if it is wider than the current encoding,
    /// leaving room for `extra` more entries.
    fn widen_to(&mut self, kind: LaStateKind, extra: usize) {
        if kind <= self.kind() {
            return;
        }
        let spare = self.capacity().saturating_sub(self.len()).max(extra);
        let repr = match (&self.repr, kind) {
            (Repr::NoState(buf), LaStateKind::ByteState) => Repr::ByteState(GapBuffer::from_items(
                buf.iter().map(|la| [*la, NULL_STATE]),
                spare,
            )),
            (Repr::NoState(buf), _) => Repr::LargeState(GapBuffer::from_items(
                buf.iter().map(|la| LargeEntry {
                    lookahead: u32::from(*la),
                    state: None,
                }),
                spare,
            )),
            (Repr::ByteState(buf), _) => Repr::LargeState(GapBuffer::from_items(
                buf.iter().map(|[la, st]| LargeEntry {
                    lookahead: u32::from(*la),
                    state: decode_state(*st),
                }),
                spare,
            )),
            (Repr::LargeState(_), _) => return,
        };
        self.repr = repr;
    }
}

#[inline]
#[allow(
    clippy::cast_possible_truncation,
    reason = "callers widen to LargeState before storing lookahead > 127"
)]
fn encode_byte(lookahead: u32) -> u8 {
    debug_assert!(lookahead <= BYTE_MAX);
    lookahead as u8
}

#[inline]
fn encode_state(state: Option<&LexerState>) -> u8 {
    state.and_then(LexerState::as_small).unwrap_or(NULL_STATE)
}

#[inline]
fn decode_state(byte: u8) -> Option<LexerState> {
    if byte == NULL_STATE {
        None
    } else {
        Some(LexerState::Int(i32::from(byte)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests;
