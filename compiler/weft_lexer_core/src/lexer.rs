//! The lexer contract.

use std::fmt;
use std::sync::Arc;

use crate::LexerInput;

/// Language-local token identifier (the ordinal in the language's token-id set).
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct TokenId(pub u16);

impl TokenId {
    /// The ordinal as an index into per-id tables.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenId({})", self.0)
    }
}

/// Opaque state a lexer reports after each token so it can be restarted
/// right after that token.
///
/// `Int` covers the common "current mode" case; values `0..=127` are stored
/// in a single byte by [`LaState`](crate::LaState). `Stack` carries
/// structured state such as a stack of nested modes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum LexerState {
    Int(i32),
    Stack(Arc<[i32]>),
}

impl LexerState {
    /// The integer value for `Int` states.
    #[inline]
    pub fn as_int(&self) -> Option<i32> {
        match self {
            LexerState::Int(v) => Some(*v),
            LexerState::Stack(_) => None,
        }
    }

    /// The value as a byte when it fits the compact `0..=127` encoding.
    #[inline]
    pub fn as_small(&self) -> Option<u8> {
        match self {
            LexerState::Int(v) => u8::try_from(*v).ok().filter(|b| *b <= 127),
            LexerState::Stack(_) => None,
        }
    }
}

/// A token recognized by a lexer but not yet placed into a token list.
///
/// Created through [`LexerInput::token`] or [`LexerInput::fly_token`], which
/// capture the current read length, so a lexer cannot report a length it
/// did not read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LexedToken {
    pub(crate) id: TokenId,
    /// Length in logical characters of the lexer input.
    pub(crate) length: u32,
    pub(crate) fly_text: Option<&'static str>,
}

impl LexedToken {
    #[inline]
    pub fn id(&self) -> TokenId {
        self.id
    }

    /// Length in characters as seen by the lexer (after preprocessing).
    #[inline]
    pub fn length(&self) -> u32 {
        self.length
    }

    /// Fixed text for tokens eligible to be shared as flyweights.
    #[inline]
    pub fn fly_text(&self) -> Option<&'static str> {
        self.fly_text
    }
}

/// Pull-style lexer for one language.
///
/// A lexer is created from a restart state (the state the previous token
/// reported, or `None` at the start of the input) and asked for one token at
/// a time. Returning `None` means the input window is exhausted; every
/// character of the window must have been consumed by then.
pub trait Lexer {
    /// Recognize the next token, reading from `input`.
    ///
    /// The token must cover at least one character.
    fn next_token(&mut self, input: &mut LexerInput<'_>) -> Option<LexedToken>;

    /// State to restart this lexer right after the last returned token.
    fn state(&self) -> Option<LexerState>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_state_boundaries() {
        assert_eq!(LexerState::Int(0).as_small(), Some(0));
        assert_eq!(LexerState::Int(127).as_small(), Some(127));
        assert_eq!(LexerState::Int(128).as_small(), None);
        assert_eq!(LexerState::Int(-1).as_small(), None);
        assert_eq!(LexerState::Stack(Arc::from([1, 2])).as_small(), None);
    }

    #[test]
    fn token_id_index() {
        assert_eq!(TokenId(7).index(), 7);
    }
}
