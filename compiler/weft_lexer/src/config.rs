//! Token list configuration.

/// Default maximum run of consecutive flyweight tokens.
pub const DEFAULT_MAX_FLY_SEQUENCE: usize = 5;

/// Environment variable enabling [`LexerConfig::maintain_la_state`].
pub const MAINTAIN_LA_STATE_ENV: &str = "WEFT_MAINTAIN_LA_STATE";

/// Environment variable overriding [`LexerConfig::max_fly_sequence`].
pub const MAX_FLY_SEQUENCE_ENV: &str = "WEFT_MAX_FLY_SEQUENCE";

/// Configuration shared by every list of a token hierarchy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LexerConfig {
    /// Store lexer states next to lookaheads even in lists that are never
    /// relexed, so tests and diagnostics can inspect them.
    pub maintain_la_state: bool,
    /// Longest run of consecutive flyweight tokens. The token after a full
    /// run is stored as a regular token, which bounds the offset walk.
    pub max_fly_sequence: usize,
    /// Share fixed-text tokens at all.
    pub flyweight_tokens: bool,
}

impl Default for LexerConfig {
    fn default() -> Self {
        LexerConfig {
            maintain_la_state: false,
            max_fly_sequence: DEFAULT_MAX_FLY_SEQUENCE,
            flyweight_tokens: true,
        }
    }
}

impl LexerConfig {
    /// Defaults overridden by `WEFT_MAINTAIN_LA_STATE` and
    /// `WEFT_MAX_FLY_SEQUENCE`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by the variables `lookup` returns.
    ///
    /// Unparsable values are ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = LexerConfig::default();
        if let Some(value) = lookup(MAINTAIN_LA_STATE_ENV) {
            match value.trim() {
                "1" | "true" => config.maintain_la_state = true,
                "0" | "false" => config.maintain_la_state = false,
                other => tracing::warn!(value = other, "ignoring {MAINTAIN_LA_STATE_ENV}"),
            }
        }
        if let Some(value) = lookup(MAX_FLY_SEQUENCE_ENV) {
            match value.trim().parse() {
                Ok(max) => config.max_fly_sequence = max,
                Err(_) => tracing::warn!(value = %value, "ignoring {MAX_FLY_SEQUENCE_ENV}"),
            }
        }
        config
    }

    #[must_use]
    pub fn with_maintain_la_state(mut self, maintain: bool) -> Self {
        self.maintain_la_state = maintain;
        self
    }

    #[must_use]
    pub fn with_max_fly_sequence(mut self, max: usize) -> Self {
        self.max_fly_sequence = max;
        self
    }

    #[must_use]
    pub fn with_flyweight_tokens(mut self, enabled: bool) -> Self {
        self.flyweight_tokens = enabled;
        self
    }

    /// Whether the next token may be a flyweight after `run` flyweights.
    #[inline]
    pub(crate) fn allows_flyweight(&self, run: usize) -> bool {
        self.flyweight_tokens && run < self.max_fly_sequence
    }
}
