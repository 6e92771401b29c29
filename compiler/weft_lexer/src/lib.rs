//! Token lists for weft.
//!
//! A [`TokenHierarchy`] owns the token lists of one input:
//!
//! - the [`RootTokenList`] of the input's language, lexed lazily, and
//!   relexed incrementally after [`TokenHierarchy::modify`] when the input
//!   is mutable;
//! - an [`EmbeddedTokenList`] per token that embeds another language,
//!   created on first request and owned by its parent token.
//!
//! Every list implements [`TokenList`]. [`SubSequenceTokenList`] bounds a
//! list by offsets; [`TokenListList`] and [`TokenSequenceList`] gather the
//! lists of one [`LanguagePath`](weft_ir::LanguagePath) across the whole
//! hierarchy and detect modification of the hierarchy behind them.
//!
//! All offsets are raw character offsets into the root text.

mod config;
mod embedded;
mod error;
mod hierarchy;
mod list_list;
mod root;
mod sequence;
mod store;
mod sub_sequence;
mod token_list;

pub use config::{LexerConfig, DEFAULT_MAX_FLY_SEQUENCE, MAINTAIN_LA_STATE_ENV, MAX_FLY_SEQUENCE_ENV};
pub use embedded::EmbeddedTokenList;
pub use error::TokenListError;
pub use hierarchy::TokenHierarchy;
pub use list_list::{ListAddress, TokenListList};
pub use root::{RelexResult, RootTokenList};
pub use sequence::{SequenceToken, TokenSequenceList};
pub use sub_sequence::SubSequenceTokenList;
pub use token_list::{TokenList, IMMUTABLE_MOD_COUNT};
