//! A lexer generator built on Brzozowski/Antimirov derivatives of regular
//! expressions: compile a set of named patterns into a DFA ([`dfa`]), scan
//! input against it at runtime, and emit it to Graphviz `dot` or a
//! self-contained C header ([`emit`]).
//!
//! The algebra (`regex`, `vector`, `partition`) and the DFA it drives
//! ([`dfa::build`], [`dfa::runtime`]) operate over a fixed byte alphabet,
//! `0..256`. Patterns written against Unicode scalar values go through
//! [`builder`] and [`utf8`], which expand a codepoint range into the union of
//! byte sequences that encode it.

pub mod builder;
pub mod charclass;
pub mod dfa;
pub mod dot;
pub mod emit;
pub mod error;
pub mod partition;
pub mod regex;
pub mod utf8;
pub mod vector;

pub use error::{CharClassError, LexerError, ScanError};
