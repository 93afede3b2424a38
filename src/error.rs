//! Error types raised across the crate's public surface.

use thiserror::Error;

/// Errors raised while parsing the external character-class text syntax
/// (see [`crate::charclass::parse_char_set`]).
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum CharClassError {
    #[error("character class ends with a dangling escape character")]
    DanglingEscape,
    #[error("truncated \\{kind} escape, expected {expected} hex digits")]
    TruncatedHexEscape { kind: &'static str, expected: usize },
    #[error("invalid hex digits in \\{kind} escape")]
    InvalidHexEscape { kind: &'static str },
    #[error("hex escape \\{kind} encodes an invalid code point")]
    InvalidCodePoint { kind: &'static str },
    #[error("inverted range {start:?}-{end:?} (start above end)")]
    InvertedRange { start: char, end: char },
}

/// Errors raised while building a [`crate::dfa::Dfa`] from a set of patterns.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum LexerError {
    /// A reachable state would accept more than one pattern and the chosen
    /// resolver refused to pick a winner.
    #[error("conflicting patterns at a reachable state: {0:?}")]
    ConflictingPatterns(Vec<String>),
}

/// Errors raised while scanning input against a built [`crate::dfa::Dfa`].
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum ScanError {
    /// The scanner reached a state with no viable transition and no
    /// remembered accept to fall back to.
    #[error("unrecognised input at byte offset {offset}")]
    UnrecognisedInput { offset: usize },
}
