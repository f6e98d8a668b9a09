//! Identifiers

use std::fmt;

use uuid::Uuid;

/// Customer identifier. Zero is never a valid owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CustomerId(u64);

impl CustomerId {
    /// Wrap a raw customer number.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw customer number.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Product identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProductId(u32);

impl ProductId {
    /// Wrap a raw product number.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw product number.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Parse a catalog key. Zero and non-numeric input are rejected.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        raw.trim()
            .parse::<u32>()
            .ok()
            .filter(|id| *id >= 1)
            .map(Self)
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Cart identity.
///
/// The transactional store hands out surrogate integers from its
/// auto-increment column; the single-table store generates opaque tokens
/// before writing. An identity never changes once assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CartId {
    /// Store-assigned surrogate key (always `>= 1`).
    Sequential(u64),

    /// Locally generated random token.
    Token(Uuid),
}

impl CartId {
    /// Parse a surrogate cart key. Zero and non-numeric input are rejected.
    #[must_use]
    pub fn parse_sequential(raw: &str) -> Option<Self> {
        raw.trim()
            .parse::<u64>()
            .ok()
            .filter(|id| *id >= 1)
            .map(Self::Sequential)
    }

    /// Parse an opaque cart token.
    #[must_use]
    pub fn parse_token(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw.trim()).ok().map(Self::Token)
    }
}

impl fmt::Display for CartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequential(id) => id.fmt(f),
            Self::Token(token) => token.hyphenated().fmt(f),
        }
    }
}
